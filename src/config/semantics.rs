//! Semantic validation of tokenized config lines.
//!
//! The validator turns ordered token lines into a key/value mapping against
//! a fixed set of required keys: exactly one line per key, exactly one value
//! token per line, no extras. [`validate_with_order`] additionally extracts
//! the declared module order. The mapping is built once and never mutated
//! afterwards; errors here are terminal for the run.

use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error};

/// Validate `lines` against `required` keys and build the config mapping.
///
/// The file must contain exactly one line per required key and nothing else.
pub fn validate(path: &Path, lines: &[Vec<String>], required: &[&str]) -> Result<HashMap<String, String>> {
    if lines.len() != required.len() {
        return Err(semantic(
            path,
            format!("wrong number of tokens: expected {}, found {}", required.len(), lines.len()),
        ));
    }
    fill_map(path, lines, required)
}

/// Validate `lines` against `required` keys plus an optional `order_key` line.
///
/// When an order line is present it must carry at least one module name after
/// the key, and the total line count must be `required.len() + 1`; otherwise
/// the count must match `required.len()` exactly. Lines may appear in any
/// order in the file.
pub fn validate_with_order(
    path: &Path,
    lines: &[Vec<String>],
    required: &[&str],
    order_key: &str,
) -> Result<(HashMap<String, String>, Option<Vec<String>>)> {
    let mut order: Option<Vec<String>> = None;
    let mut rest: Vec<Vec<String>> = Vec::with_capacity(lines.len());

    for line in lines {
        if line.first().map(String::as_str) == Some(order_key) {
            if order.is_some() {
                return Err(semantic(path, format!("duplicate {order_key} token")));
            }
            if line.len() < 2 {
                error!(path = %path.display(), "order line declares no modules");
                return Err(semantic(path, format!("{order_key} must declare at least one module")));
            }
            order = Some(line[1..].to_vec());
        } else {
            rest.push(line.clone());
        }
    }

    let expected = required.len() + usize::from(order.is_some());
    if lines.len() != expected {
        return Err(semantic(
            path,
            format!("wrong number of tokens: expected {expected}, found {}", lines.len()),
        ));
    }

    let map = fill_map(path, &rest, required)?;
    Ok((map, order))
}

fn fill_map(path: &Path, lines: &[Vec<String>], required: &[&str]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::with_capacity(required.len());
    for line in lines {
        let Some(key) = line.first() else {
            return Err(semantic(path, "blank line".to_string()));
        };
        if !required.contains(&key.as_str()) {
            return Err(semantic(path, format!("invalid token {key}")));
        }
        if line.len() != 2 {
            return Err(semantic(path, format!("token {key} has more than one value")));
        }
        if map.insert(key.clone(), line[1].clone()).is_some() {
            return Err(semantic(path, format!("duplicate token {key}")));
        }
    }

    // The scans above already reject extras; this names any key still missing.
    if map.len() != required.len() {
        let missing = required
            .iter()
            .find(|key| !map.contains_key(**key))
            .copied()
            .unwrap_or("?");
        return Err(semantic(path, format!("missing token {missing}")));
    }
    debug!(path = %path.display(), tokens = map.len(), "config tokens are valid");
    Ok(map)
}

/// Extract `key` from a validated mapping as a positive integer (>= 1).
pub fn positive_int(path: &Path, map: &HashMap<String, String>, key: &str) -> Result<usize> {
    let raw = map
        .get(key)
        .ok_or_else(|| semantic(path, format!("missing token {key}")))?;
    let value: usize = raw
        .parse()
        .map_err(|_| semantic(path, format!("invalid {key} value: {raw}")))?;
    if value < 1 {
        return Err(semantic(path, format!("invalid {key} value: {raw}")));
    }
    Ok(value)
}

fn semantic(path: &Path, reason: String) -> PipelineError {
    error!(path = %path.display(), %reason, "config rejected");
    PipelineError::ConfigSemantic {
        path: path.to_path_buf(),
        reason,
    }
}
