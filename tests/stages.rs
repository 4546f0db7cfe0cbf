//! Tests for the per-stage execution protocol.

use rotopipe::{
    Direction, Message, MetricsCollector, PipelineError, Sink, SinkConfig, Source, SourceConfig,
    Stage, StageKind, Transform, TransformConfig,
};
use rotopipe::transform::{SHIFT_AMOUNT, SHIFT_DIRECTION};
use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

/// Terminal stage that records everything pushed into it.
#[derive(Default)]
struct Recorder {
    messages: Vec<Message>,
}

impl Stage for Recorder {
    fn execute(&mut self, message: Message) -> rotopipe::Result<()> {
        self.messages.push(message);
        Ok(())
    }
}

/// Terminal stage that fails on every message.
struct FailingStage;

impl Stage for FailingStage {
    fn execute(&mut self, _message: Message) -> rotopipe::Result<()> {
        Err(PipelineError::WriteFailed(io::Error::other("downstream failure")))
    }
}

/// Writer that counts physical (non-empty) writes.
#[derive(Default)]
struct CountingWriter {
    data: Vec<u8>,
    writes: usize,
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !buf.is_empty() {
            self.writes += 1;
        }
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("bad device"))
    }
}

// ---------------- direction & rotation ----------------

#[test]
fn direction_parses_word_and_numeric_forms() {
    assert_eq!(Direction::parse("left"), Some(Direction::Left));
    assert_eq!(Direction::parse("LEFT"), Some(Direction::Left));
    assert_eq!(Direction::parse("Right"), Some(Direction::Right));
    assert_eq!(Direction::parse("-1"), Some(Direction::Left));
    assert_eq!(Direction::parse("1"), Some(Direction::Right));
    assert_eq!(Direction::parse("up"), None);
    assert_eq!(Direction::parse("2"), None);
    assert_eq!(Direction::parse(""), None);
}

#[test]
fn rotation_known_values() {
    assert_eq!(Direction::Left.rotate(0x01, 1), 0x02);
    assert_eq!(Direction::Left.rotate(0x80, 1), 0x01);
    assert_eq!(Direction::Left.rotate(0xFF, 1), 0xFF);
    assert_eq!(Direction::Right.rotate(0x01, 1), 0x80);
    assert_eq!(Direction::Right.rotate(0x02, 1), 0x01);
}

#[test]
fn rotation_is_invertible() {
    for amount in 1..=16 {
        for byte in 0..=255u8 {
            let there = Direction::Left.rotate(byte, amount);
            assert_eq!(Direction::Right.rotate(there, amount), byte);
        }
    }
}

#[test]
fn rotation_amount_is_modulo_eight() {
    for amount in 0..=16 {
        for byte in [0x00u8, 0x01, 0x5A, 0x80, 0xFF] {
            assert_eq!(
                Direction::Left.rotate(byte, amount),
                Direction::Left.rotate(byte, amount % 8)
            );
            assert_eq!(
                Direction::Right.rotate(byte, amount),
                Direction::Right.rotate(byte, amount % 8)
            );
        }
    }
}

// ---------------- transform ----------------

fn transform_map(amount: &str, direction: &str) -> HashMap<String, String> {
    [(SHIFT_AMOUNT, amount), (SHIFT_DIRECTION, direction)]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn transform_config_rejects_bad_direction() {
    let map = transform_map("3", "sideways");
    let err = TransformConfig::from_map(Path::new("executor.cfg"), &map).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigSemantic { .. }));
}

#[test]
fn transform_config_rejects_non_positive_amount() {
    for bad in ["0", "-2", "eight"] {
        let map = transform_map(bad, "left");
        let err = TransformConfig::from_map(Path::new("executor.cfg"), &map).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigSemantic { .. }));
    }
}

#[test]
fn transform_rotates_chunks_and_forwards_end() {
    let config = TransformConfig::from_map(Path::new("executor.cfg"), &transform_map("1", "left")).unwrap();
    let mut transform = Transform::new(config, Recorder::default());

    transform.execute(Message::Chunk(vec![0x01, 0x80, 0xFF])).unwrap();
    transform.execute(Message::End).unwrap();

    let recorder = transform.into_consumer();
    assert_eq!(
        recorder.messages,
        vec![Message::Chunk(vec![0x02, 0x01, 0xFF]), Message::End]
    );
}

#[test]
fn transform_propagates_consumer_failure() {
    let config = TransformConfig::from_map(Path::new("executor.cfg"), &transform_map("2", "right")).unwrap();
    let mut transform = Transform::new(config, FailingStage);

    let err = transform.execute(Message::Chunk(vec![0xAB])).unwrap_err();
    assert!(matches!(err, PipelineError::WriteFailed(_)));
}

// ---------------- sink ----------------

fn sink(capacity: usize) -> Sink<CountingWriter> {
    Sink::new(
        SinkConfig { size_to_write: capacity },
        CountingWriter::default(),
        MetricsCollector::new(),
    )
}

#[test]
fn sink_rebuffers_across_chunk_boundaries() {
    let mut sink = sink(4);

    sink.execute(Message::Chunk(vec![1, 2, 3, 4, 5, 6])).unwrap();
    sink.execute(Message::Chunk(vec![7, 8, 9, 10])).unwrap();
    sink.execute(Message::End).unwrap();

    assert_eq!(sink.buffered(), 0);
    let writer = sink.into_output();
    assert_eq!(writer.data, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    // ceil(10 / 4): two full flushes plus the 2-byte remainder at end-of-stream
    assert_eq!(writer.writes, 3);
}

#[test]
fn sink_skips_the_final_flush_on_exact_multiples() {
    let mut sink = sink(4);

    sink.execute(Message::Chunk(vec![1, 2, 3, 4, 5, 6, 7, 8])).unwrap();
    sink.execute(Message::End).unwrap();

    let writer = sink.into_output();
    assert_eq!(writer.data.len(), 8);
    assert_eq!(writer.writes, 2);
}

#[test]
fn sink_flushes_nothing_for_empty_streams() {
    let mut sink = sink(8);

    sink.execute(Message::End).unwrap();

    let writer = sink.into_output();
    assert!(writer.data.is_empty());
    assert_eq!(writer.writes, 0);
}

#[test]
fn sink_records_metrics() {
    let metrics = MetricsCollector::new();
    let mut sink = Sink::new(
        SinkConfig { size_to_write: 4 },
        CountingWriter::default(),
        metrics.clone(),
    );

    sink.execute(Message::Chunk(vec![0; 10])).unwrap();
    sink.execute(Message::End).unwrap();

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.bytes_written, 10);
    assert_eq!(snapshot.flushes, 3);
}

#[test]
fn sink_propagates_flush_failure() {
    let mut sink = Sink::new(
        SinkConfig { size_to_write: 1 },
        FailingWriter,
        MetricsCollector::new(),
    );

    let err = sink.execute(Message::Chunk(vec![0x42])).unwrap_err();
    assert!(matches!(err, PipelineError::WriteFailed(_)));
}

// ---------------- source ----------------

#[test]
fn source_pushes_full_chunks_then_end() {
    let metrics = MetricsCollector::new();
    let mut source = Source::new(
        SourceConfig { size_to_read: 2 },
        Cursor::new(vec![1, 2, 3, 4]),
        Recorder::default(),
        metrics.clone(),
    );

    source.run().unwrap();

    let (_, recorder) = source.into_parts();
    assert_eq!(
        recorder.messages,
        vec![
            Message::Chunk(vec![1, 2]),
            Message::Chunk(vec![3, 4]),
            Message::End,
        ]
    );
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.bytes_read, 4);
    assert_eq!(snapshot.chunks, 2);
}

#[test]
fn source_signals_end_immediately_on_empty_input() {
    let mut source = Source::new(
        SourceConfig { size_to_read: 8 },
        Cursor::new(Vec::new()),
        Recorder::default(),
        MetricsCollector::new(),
    );

    source.run().unwrap();

    let (_, recorder) = source.into_parts();
    assert_eq!(recorder.messages, vec![Message::End]);
}

#[test]
fn source_pushes_a_partial_final_chunk() {
    let metrics = MetricsCollector::new();
    let mut source = Source::new(
        SourceConfig { size_to_read: 2 },
        Cursor::new(vec![1, 2, 3]),
        Recorder::default(),
        metrics.clone(),
    );

    source.run().unwrap();

    let (_, recorder) = source.into_parts();
    assert_eq!(
        recorder.messages,
        vec![
            Message::Chunk(vec![1, 2]),
            Message::Chunk(vec![3]),
            Message::End,
        ]
    );
    assert_eq!(metrics.snapshot().bytes_read, 3);
}

#[test]
fn source_stops_on_consumer_failure() {
    let mut source = Source::new(
        SourceConfig { size_to_read: 2 },
        Cursor::new(vec![1, 2, 3, 4]),
        FailingStage,
        MetricsCollector::new(),
    );

    let err = source.run().unwrap_err();
    assert!(matches!(err, PipelineError::WriteFailed(_)));
}

#[test]
fn source_reports_read_failures() {
    let mut source = Source::new(
        SourceConfig { size_to_read: 2 },
        FailingReader,
        Recorder::default(),
        MetricsCollector::new(),
    );

    let err = source.run().unwrap_err();
    assert!(matches!(err, PipelineError::ReadFailed(_)));
}

// ---------------- stage names ----------------

#[test]
fn stage_kind_matches_names_case_insensitively() {
    assert_eq!(StageKind::from_name("reader"), Some(StageKind::Source));
    assert_eq!(StageKind::from_name("EXECUTOR"), Some(StageKind::Transform));
    assert_eq!(StageKind::from_name("Writer"), Some(StageKind::Sink));
    assert_eq!(StageKind::from_name("mixer"), None);
}
