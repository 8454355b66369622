// 📂 Row Source - Tabular input, one record at a time
// Wraps csv::Reader; the header row is consumed by the reader itself

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// READ MODE
// ============================================================================

/// How a source reacts to a malformed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// A malformed row ends the stream like EOF; a row with a bad value is
    /// skipped. Nothing is reported upstream.
    #[default]
    Lenient,
    /// Any bad row is a fatal error naming the file and line
    Strict,
}

impl ReadMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ReadMode::Strict
        } else {
            ReadMode::Lenient
        }
    }
}

// ============================================================================
// SOURCE ROW
// ============================================================================

/// SourceRow - One data record plus where it came from
#[derive(Debug, Clone)]
pub struct SourceRow {
    /// 1-based line in the original file (header is line 1)
    pub line: u64,
    pub record: StringRecord,
}

impl SourceRow {
    /// Column `index`, or an error if the row is too short
    pub fn field(&self, index: usize) -> Result<&str> {
        self.record
            .get(index)
            .ok_or_else(|| anyhow!("line {}: missing column {}", self.line, index))
    }
}

// ============================================================================
// CSV SOURCE
// ============================================================================

/// CsvSource - Header row followed by data rows
pub struct CsvSource<R: Read> {
    name: String,
    reader: csv::Reader<R>,
}

impl CsvSource<File> {
    /// Open a file. Failing here is fatal for the whole run.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;

        Ok(Self::from_reader(path.display().to_string(), file))
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(name: impl Into<String>, reader: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        CsvSource {
            name: name.into(),
            reader,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<R: Read> Iterator for CsvSource<R> {
    type Item = Result<SourceRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                Some(Ok(SourceRow { line, record }))
            }
            Ok(false) => None,
            Err(e) => Some(Err(anyhow::Error::new(e))),
        }
    }
}

// ============================================================================
// DRAIN
// ============================================================================

/// Parsed - What a row parser made of one structurally sound row
#[derive(Debug)]
pub enum Parsed<T> {
    /// Forward to the sink
    Row(T),
    /// Consumed on purpose, not forwarded
    Filtered,
    /// A field holds a bad value; the row is skipped, later rows still count
    Invalid(anyhow::Error),
}

/// What happened while draining a source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Data rows read (header excluded)
    pub rows: usize,
    /// Rows handed to the sink
    pub forwarded: usize,
    /// Rows read but filtered out by the parser
    pub filtered: usize,
    /// Rows dropped because a field value was invalid
    pub skipped: usize,
    /// Why the source stopped before EOF, if it did
    pub stopped_early: Option<String>,
}

/// Read every row, parse it, and hand the result to `sink`.
///
/// `sink` returns `false` once nobody is listening anymore; that ends the
/// stream quietly. In lenient mode a read error or a parser `Err` (missing
/// column) ends the stream like EOF, and a `Parsed::Invalid` row is skipped.
/// In strict mode both are returned as errors.
pub fn drain<R, T, P, S>(source: CsvSource<R>, mode: ReadMode, parse: P, mut sink: S) -> Result<SourceStats>
where
    R: Read,
    P: Fn(&SourceRow) -> Result<Parsed<T>>,
    S: FnMut(T) -> bool,
{
    let name = source.name().to_string();
    let mut stats = SourceStats::default();

    for result in source {
        let parsed = result
            .and_then(|row| {
                stats.rows += 1;
                match parse(&row)? {
                    Parsed::Invalid(e) => Ok(Parsed::Invalid(e.context(format!("line {}", row.line)))),
                    other => Ok(other),
                }
            })
            .with_context(|| format!("Malformed row in {}", name));

        let item = match parsed {
            Ok(Parsed::Row(item)) => item,
            Ok(Parsed::Filtered) => {
                stats.filtered += 1;
                continue;
            }
            Ok(Parsed::Invalid(e)) => {
                let e = e.context(format!("Invalid row in {}", name));
                if mode == ReadMode::Strict {
                    return Err(e);
                }
                let reason = format!("{:#}", e);
                warn!(source = %name, error = %reason, "skipping row");
                stats.skipped += 1;
                continue;
            }
            Err(e) if mode == ReadMode::Strict => return Err(e),
            Err(e) => {
                let reason = format!("{:#}", e);
                warn!(source = %name, error = %reason, "stopping source early");
                stats.stopped_early = Some(reason);
                break;
            }
        };

        if !sink(item) {
            debug!(source = %name, "receiver dropped, stopping source");
            break;
        }
        stats.forwarded += 1;
    }

    debug!(
        source = %name,
        rows = stats.rows,
        forwarded = stats.forwarded,
        filtered = stats.filtered,
        skipped = stats.skipped,
        "source drained"
    );

    Ok(stats)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn source(data: &str) -> CsvSource<&[u8]> {
        CsvSource::from_reader("test.csv", data.as_bytes())
    }

    fn first_column(row: &SourceRow) -> Result<Parsed<String>> {
        Ok(Parsed::Row(row.field(0)?.to_string()))
    }

    fn numeric_second_column(row: &SourceRow) -> Result<Parsed<u32>> {
        let v = row.field(1)?;
        Ok(match v.parse::<u32>() {
            Ok(n) => Parsed::Row(n),
            Err(e) => Parsed::Invalid(anyhow!("bad number {:?}: {}", v, e)),
        })
    }

    #[test]
    fn test_header_is_skipped() {
        let rows: Vec<SourceRow> = source("zipcode,rate\n40813,\n64148,\n")
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field(0).unwrap(), "40813");
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn test_header_only_yields_nothing() {
        assert_eq!(source("zipcode,rate\n").count(), 0);
        assert_eq!(source("").count(), 0);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let row = source("a,b\n1,2\n").next().unwrap().unwrap();
        assert_eq!(row.field(1).unwrap(), "2");
        assert!(row.field(4).is_err());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = CsvSource::open(Path::new("definitely/not/here.csv"));
        assert!(result.is_err());
        let msg = format!("{:#}", result.err().unwrap());
        assert!(msg.contains("not/here.csv"));
    }

    #[test]
    fn test_drain_forwards_all_rows() {
        let mut seen = Vec::new();
        let stats = drain(source("h\na\nb\nc\n"), ReadMode::Lenient, first_column, |v| {
            seen.push(v);
            true
        })
        .unwrap();

        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.forwarded, 3);
        assert_eq!(stats.stopped_early, None);
    }

    #[test]
    fn test_drain_counts_filtered_rows() {
        let parse = |row: &SourceRow| -> Result<Parsed<String>> {
            let v = row.field(0)?;
            Ok(if v == "skip" { Parsed::Filtered } else { Parsed::Row(v.to_string()) })
        };
        let mut seen = Vec::new();
        let stats = drain(source("h\na\nskip\nb\n"), ReadMode::Lenient, parse, |v| {
            seen.push(v);
            true
        })
        .unwrap();

        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(stats.filtered, 1);
    }

    #[test]
    fn test_drain_lenient_stops_at_bad_row() {
        let mut seen = Vec::new();
        let stats = drain(
            source("a,b\n1,x\n2\n3,y\n"),
            ReadMode::Lenient,
            |row: &SourceRow| Ok(Parsed::Row(row.field(1)?.to_string())),
            |v| {
                seen.push(v);
                true
            },
        )
        .unwrap();

        assert_eq!(seen, vec!["x"], "rows after the bad one are not read");
        assert!(stats.stopped_early.is_some());
    }

    #[test]
    fn test_drain_strict_reports_bad_row() {
        let result = drain(
            source("a,b\n1,x\n2\n"),
            ReadMode::Strict,
            |row: &SourceRow| Ok(Parsed::Row(row.field(1)?.to_string())),
            |_: String| true,
        );

        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains("test.csv"));
        assert!(msg.contains("line 3"));
    }

    #[test]
    fn test_drain_stops_when_sink_closes() {
        let mut taken = 0;
        let stats = drain(source("h\na\nb\nc\n"), ReadMode::Strict, first_column, |_| {
            taken += 1;
            taken < 2
        })
        .unwrap();

        assert_eq!(stats.forwarded, 1);
        assert_eq!(stats.stopped_early, None);
    }

    #[test]
    fn test_drain_lenient_skips_invalid_value() {
        let mut seen = Vec::new();
        let stats = drain(source("a,b\nx,1\ny,N/A\nz,3\n"), ReadMode::Lenient, numeric_second_column, |v| {
            seen.push(v);
            true
        })
        .unwrap();

        assert_eq!(seen, vec![1, 3], "rows after the invalid one are still read");
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.stopped_early, None);
    }

    #[test]
    fn test_drain_strict_rejects_invalid_value() {
        let result = drain(source("a,b\nx,1\ny,N/A\n"), ReadMode::Strict, numeric_second_column, |_| true);

        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains("test.csv"));
        assert!(msg.contains("line 3"));
        assert!(msg.contains("N/A"));
    }
}
