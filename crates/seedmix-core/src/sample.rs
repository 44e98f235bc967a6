//! Pointer samples and the sources that produce them.
//!
//! The accumulator never captures input events itself. Hosts (a UI event
//! loop, a recorded trace, a test) implement [`SampleSource`] or call
//! [`EntropyAccumulator::add_sample`](crate::EntropyAccumulator::add_sample)
//! directly with [`PointerSample`] records.

use std::io::BufRead;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Serialized size of one pointer sample in bytes (8 + 4 + 4).
pub const SAMPLE_LEN: usize = 16;

/// One pointer-movement observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerSample {
    /// Monotonic timestamp in whatever unit the host uses.
    pub timestamp: u64,
    pub x: i32,
    pub y: i32,
}

impl PointerSample {
    pub fn new(timestamp: u64, x: i32, y: i32) -> Self {
        Self { timestamp, x, y }
    }

    /// Fixed little-endian layout: timestamp, then x, then y.
    ///
    /// The layout does not depend on host endianness, so a given sequence of
    /// samples hashes identically on every platform.
    pub fn to_bytes(&self) -> [u8; SAMPLE_LEN] {
        let mut buf = [0u8; SAMPLE_LEN];
        buf[..8].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[8..12].copy_from_slice(&self.x.to_le_bytes());
        buf[12..].copy_from_slice(&self.y.to_le_bytes());
        buf
    }
}

impl FromStr for PointerSample {
    type Err = String;

    /// Parse `timestamp x y`; fields may be separated by whitespace or commas.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let fields: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != 3 {
            return Err(format!("expected 3 fields, found {}", fields.len()));
        }
        let timestamp = fields[0]
            .parse::<u64>()
            .map_err(|e| format!("timestamp '{}': {e}", fields[0]))?;
        let x = fields[1]
            .parse::<i32>()
            .map_err(|e| format!("x '{}': {e}", fields[1]))?;
        let y = fields[2]
            .parse::<i32>()
            .map_err(|e| format!("y '{}': {e}", fields[2]))?;
        Ok(Self { timestamp, x, y })
    }
}

/// Read samples in text form, one per line.
///
/// Blank lines and lines starting with `#` are skipped. The first malformed
/// line aborts the read with [`Error::InvalidSample`] carrying its 1-based
/// line number. Use [`ReaderSource`] to hash a trace without holding it in
/// memory.
pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<PointerSample>> {
    let mut source = ReaderSource::new(reader);
    let samples = std::iter::from_fn(|| source.next_sample()).collect();
    source.finish()?;
    Ok(samples)
}

/// Metadata about a sample source.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Unique identifier (e.g. `"replay"`).
    pub name: &'static str,
    /// One-line human-readable description.
    pub description: &'static str,
}

/// Anything that yields pointer samples on demand.
pub trait SampleSource {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;

    /// Next sample, or `None` once the source is exhausted.
    fn next_sample(&mut self) -> Option<PointerSample>;

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}

/// Replays a recorded sequence of samples in order.
pub struct ReplaySource {
    info: SourceInfo,
    samples: std::vec::IntoIter<PointerSample>,
}

impl ReplaySource {
    pub fn new(samples: Vec<PointerSample>) -> Self {
        Self {
            info: SourceInfo {
                name: "replay",
                description: "recorded pointer samples replayed in order",
            },
            samples: samples.into_iter(),
        }
    }

    /// Samples not yet handed out.
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl SampleSource for ReplaySource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn next_sample(&mut self) -> Option<PointerSample> {
        self.samples.next()
    }
}

/// Parses samples from a text stream one line at a time.
///
/// Nothing is read ahead: a consumer that stops early leaves the rest of
/// the stream untouched. The first I/O or parse error ends the stream and
/// is kept for [`finish`](Self::finish).
pub struct ReaderSource<R> {
    info: SourceInfo,
    lines: std::io::Lines<R>,
    line_no: usize,
    error: Option<Error>,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            info: SourceInfo {
                name: "reader",
                description: "pointer samples parsed from text, one per line",
            },
            lines: reader.lines(),
            line_no: 0,
            error: None,
        }
    }

    /// Lines consumed so far, including skipped ones.
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    /// The error that ended the stream, if any.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<R: BufRead> SampleSource for ReaderSource<R> {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn next_sample(&mut self) -> Option<PointerSample> {
        if self.error.is_some() {
            return None;
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.error = Some(e.into());
                    return None;
                }
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match trimmed.parse::<PointerSample>() {
                Ok(sample) => return Some(sample),
                Err(reason) => {
                    log::warn!("line {}: {reason}", self.line_no);
                    self.error = Some(Error::InvalidSample {
                        line: self.line_no,
                        reason,
                    });
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    #[test]
    fn test_to_bytes_layout() {
        let s = PointerSample::new(1000, 5, 5);
        assert_eq!(hex::encode(s.to_bytes()), "e8030000000000000500000005000000");
    }

    #[test]
    fn test_to_bytes_negative_coordinates() {
        let s = PointerSample::new(1, -1, 2);
        assert_eq!(hex::encode(s.to_bytes()), "0100000000000000ffffffff02000000");
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_whitespace_and_commas() {
        assert_eq!(
            "1000 5 5".parse::<PointerSample>().unwrap(),
            PointerSample::new(1000, 5, 5)
        );
        assert_eq!(
            "1000, -6,\t7".parse::<PointerSample>().unwrap(),
            PointerSample::new(1000, -6, 7)
        );
    }

    #[test]
    fn test_parse_wrong_field_count() {
        let err = "1 2".parse::<PointerSample>().unwrap_err();
        assert!(err.contains("expected 3 fields"));
    }

    #[test]
    fn test_parse_negative_timestamp_rejected() {
        assert!("-1 0 0".parse::<PointerSample>().is_err());
    }

    #[test]
    fn test_read_samples_skips_comments_and_blanks() {
        let text = "# recorded trace\n\n1000 5 5\n  \n1000 6 5\n";
        let samples = read_samples(text.as_bytes()).unwrap();
        assert_eq!(
            samples,
            vec![PointerSample::new(1000, 5, 5), PointerSample::new(1000, 6, 5)]
        );
    }

    #[test]
    fn test_read_samples_reports_line_number() {
        let text = "1 2 3\n# ok\nnot a sample\n";
        match read_samples(text.as_bytes()) {
            Err(Error::InvalidSample { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected InvalidSample, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // Sources
    // -----------------------------------------------------------------------

    #[test]
    fn test_replay_source_yields_in_order() {
        let mut src = ReplaySource::new(vec![
            PointerSample::new(1, 1, 1),
            PointerSample::new(2, 2, 2),
        ]);
        assert_eq!(src.name(), "replay");
        assert_eq!(src.remaining(), 2);
        assert_eq!(src.next_sample(), Some(PointerSample::new(1, 1, 1)));
        assert_eq!(src.next_sample(), Some(PointerSample::new(2, 2, 2)));
        assert_eq!(src.next_sample(), None);
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn test_reader_source_stops_at_first_error() {
        let text = "1 1 1\nbad\n2 2 2\n";
        let mut src = ReaderSource::new(text.as_bytes());
        assert_eq!(src.name(), "reader");
        assert_eq!(src.next_sample(), Some(PointerSample::new(1, 1, 1)));
        assert_eq!(src.next_sample(), None);
        assert_eq!(src.next_sample(), None);
        assert_eq!(src.lines_read(), 2);
        assert!(matches!(src.finish(), Err(Error::InvalidSample { line: 2, .. })));
    }

    #[test]
    fn test_reader_source_reads_lazily() {
        let text = "# header\n1 1 1\n2 2 2\nnot a sample\n";
        let mut src = ReaderSource::new(text.as_bytes());
        assert_eq!(src.next_sample(), Some(PointerSample::new(1, 1, 1)));
        assert_eq!(src.lines_read(), 2);
        src.finish().unwrap();
    }
}
