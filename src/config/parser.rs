//! Reading config files into token lines.

use crate::error::{PipelineError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Read `path` line by line and split every line into tokens.
///
/// Each line is first split on `delimiter`, then every segment is split on
/// whitespace, and empty tokens are dropped, so `KEY = VALUE`, `KEY=VALUE`
/// and `KEY VALUE` all tokenize to `[KEY, VALUE]`. Line order is preserved.
///
/// An unreadable file is a grammar error; nothing is retained after return.
pub fn read_token_lines(path: &Path, delimiter: &str) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).map_err(|source| PipelineError::ConfigGrammar {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|source| PipelineError::ConfigGrammar {
            path: path.to_path_buf(),
            source,
        })?;
        lines.push(tokenize(&line, delimiter));
    }
    debug!(path = %path.display(), lines = lines.len(), "config file read");
    Ok(lines)
}

fn tokenize(line: &str, delimiter: &str) -> Vec<String> {
    line.split(delimiter)
        .flat_map(str::split_whitespace)
        .map(str::to_owned)
        .collect()
}
