use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, instrument};

use crate::adstxt::tools::error::RowError;
use crate::adstxt::tools::io::authorities::AuthorityTable;
use crate::adstxt::tools::io::diagnostics::{Diagnostic, DiagnosticSink};
use crate::adstxt::tools::io::fragments::{LineKind, classify_line, parse_row};
use crate::adstxt::tools::model::{Record, RecordKey};

/// Effect of a single line on the merge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line or plain comment.
    Ignored,
    VersionTag,
    Inserted,
    /// An entry with the same key existed and was overwritten.
    Replaced,
}

/// Per-file counters returned by [`Merger::ingest_reader`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub lines: usize,
    pub merged: usize,
    pub rejected: usize,
}

/// Accumulates fragment lines into one entry per [`RecordKey`]. The last line
/// seen for a key wins.
#[derive(Debug)]
pub struct Merger<'a> {
    authorities: &'a AuthorityTable,
    version_prefix: &'a str,
    records: HashMap<RecordKey, Record>,
    version_tags: Vec<String>,
}

impl<'a> Merger<'a> {
    pub fn new(authorities: &'a AuthorityTable, version_prefix: &'a str) -> Self {
        Self {
            authorities,
            version_prefix,
            records: HashMap::new(),
            version_tags: Vec::new(),
        }
    }

    pub fn ingest_line(&mut self, line: &str) -> std::result::Result<LineOutcome, RowError> {
        match classify_line(line, self.version_prefix) {
            LineKind::Blank | LineKind::Comment => Ok(LineOutcome::Ignored),
            LineKind::VersionTag(tag) => {
                if !self.version_tags.iter().any(|known| known == tag) {
                    self.version_tags.push(tag.to_string());
                }
                Ok(LineOutcome::VersionTag)
            }
            LineKind::Entry(entry) => {
                let parsed = parse_row(entry)?;
                let authority = self.authorities.lookup(&parsed.advertiser);
                let record = parsed.into_record(authority);
                match self.records.insert(record.key(), record) {
                    Some(_) => Ok(LineOutcome::Replaced),
                    None => Ok(LineOutcome::Inserted),
                }
            }
        }
    }

    /// Feeds every line of `reader`. Bytes that are not valid UTF-8 are
    /// replaced rather than failing the file. Unparseable lines go to `sink`;
    /// only read failures are returned as errors.
    #[instrument(level = "debug", skip(self, reader, sink), fields(source = %source.display()))]
    pub fn ingest_reader<R, S>(
        &mut self,
        source: &Path,
        mut reader: R,
        sink: &mut S,
    ) -> std::io::Result<IngestStats>
    where
        R: BufRead,
        S: DiagnosticSink + ?Sized,
    {
        let mut stats = IngestStats::default();
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            stats.lines += 1;
            let line_number = stats.lines;
            let line = String::from_utf8_lossy(trim_line_ending(&buffer));
            match self.ingest_line(&line) {
                Ok(LineOutcome::Inserted | LineOutcome::Replaced) => stats.merged += 1,
                Ok(_) => {}
                Err(error) => {
                    stats.rejected += 1;
                    debug!(line_number, fields = error.fields, "skipping line");
                    sink.report(Diagnostic {
                        source: source.to_path_buf(),
                        line_number,
                        raw: line.into_owned(),
                        error,
                    });
                }
            }
        }
        Ok(stats)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> MergedSet {
        let mut rows: Vec<String> = self.records.values().map(Record::row).collect();
        rows.sort_unstable();
        MergedSet {
            rows,
            version_tags: self.version_tags,
        }
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Final merge result, ready to be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedSet {
    rows: Vec<String>,
    version_tags: Vec<String>,
}

impl MergedSet {
    /// Serialised entries in byte order.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Version tag comments in the order they were first seen.
    pub fn version_tags(&self) -> &[String] {
        &self.version_tags
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adstxt::tools::io::fragments::VERSION_TAG_PREFIX;

    fn table(entries: &[(&str, &str)]) -> AuthorityTable {
        entries
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect()
    }

    #[test]
    fn last_line_wins_per_key() {
        let authorities = table(&[]);
        let mut merger = Merger::new(&authorities, VERSION_TAG_PREFIX);
        assert_eq!(merger.ingest_line("foo.com,1,DIRECT,first"), Ok(LineOutcome::Inserted));
        assert_eq!(merger.ingest_line("foo.com,1,DIRECT,second"), Ok(LineOutcome::Replaced));
        assert_eq!(merger.finish().rows(), ["foo.com,1,DIRECT,second"]);
    }

    #[test]
    fn advertiser_case_collides() {
        let authorities = table(&[]);
        let mut merger = Merger::new(&authorities, VERSION_TAG_PREFIX);
        merger.ingest_line("Foo.com,123,DIRECT").expect("parsed");
        merger.ingest_line("foo.com,123,DIRECT").expect("parsed");
        assert_eq!(merger.len(), 1);
    }

    #[test]
    fn account_and_relationship_stay_case_sensitive() {
        let authorities = table(&[]);
        let mut merger = Merger::new(&authorities, VERSION_TAG_PREFIX);
        merger.ingest_line("foo.com,abc,DIRECT").expect("parsed");
        merger.ingest_line("foo.com,ABC,DIRECT").expect("parsed");
        merger.ingest_line("foo.com,abc,direct").expect("parsed");
        assert_eq!(merger.len(), 3);
    }

    #[test]
    fn table_authority_applies_without_and_over_fourth_field() {
        let authorities = table(&[("foo.com", "f-123")]);
        let mut merger = Merger::new(&authorities, VERSION_TAG_PREFIX);
        merger.ingest_line("foo.com,1,DIRECT").expect("parsed");
        merger.ingest_line("FOO.com,2,RESELLER,explicit").expect("parsed");
        merger.ingest_line("bar.com,3,DIRECT,explicit").expect("parsed");
        assert_eq!(
            merger.finish().rows(),
            [
                "bar.com,3,DIRECT,explicit",
                "foo.com,1,DIRECT,f-123",
                "foo.com,2,RESELLER,f-123",
            ]
        );
    }

    #[test]
    fn rows_sort_by_full_line() {
        let authorities = table(&[]);
        let mut merger = Merger::new(&authorities, VERSION_TAG_PREFIX);
        for line in ["b.com,1,DIRECT", "a.com,2,RESELLER", "a.com,10,DIRECT", "A-b.com,1,DIRECT"] {
            merger.ingest_line(line).expect("parsed");
        }
        assert_eq!(
            merger.finish().rows(),
            [
                "a-b.com,1,DIRECT",
                "a.com,10,DIRECT",
                "a.com,2,RESELLER",
                "b.com,1,DIRECT",
            ]
        );
    }

    #[test]
    fn reader_reports_bad_lines_and_keeps_going() {
        let authorities = table(&[]);
        let mut merger = Merger::new(&authorities, VERSION_TAG_PREFIX);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let input = "# header\n\nfoo.com,123\nbar.com,2,RESELLER\na,b,c,d,e\n# version 3\n";

        let stats = merger
            .ingest_reader(Path::new("part.txt"), input.as_bytes(), &mut sink)
            .expect("read succeeded");

        assert_eq!(stats, IngestStats { lines: 6, merged: 1, rejected: 2 });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].line_number, 3);
        assert_eq!(sink[0].to_string(), "failed parsing line: foo.com,123");
        assert_eq!(sink[1].line_number, 5);

        let merged = merger.finish();
        assert_eq!(merged.rows(), ["bar.com,2,RESELLER"]);
        assert_eq!(merged.version_tags(), ["# version 3"]);
    }

    #[test]
    fn invalid_utf8_does_not_abort_the_file() {
        let authorities = table(&[]);
        let mut merger = Merger::new(&authorities, VERSION_TAG_PREFIX);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let input: &[u8] =
            b"# Caf\xE9 partner\r\nfoo.com,1,DIRECT\r\ncaf\xE9.com,2\nbar.com,2,DIRECT";

        let stats = merger
            .ingest_reader(Path::new("part.txt"), input, &mut sink)
            .expect("read succeeded");

        assert_eq!(stats, IngestStats { lines: 4, merged: 2, rejected: 1 });
        assert_eq!(sink[0].line_number, 3);
        assert_eq!(sink[0].raw, "caf\u{FFFD}.com,2");
        assert_eq!(merger.finish().rows(), ["bar.com,2,DIRECT", "foo.com,1,DIRECT"]);
    }

    #[test]
    fn repeated_version_tags_are_collapsed() {
        let authorities = table(&[]);
        let mut merger = Merger::new(&authorities, VERSION_TAG_PREFIX);
        merger.ingest_line("# version 1").expect("tag");
        merger.ingest_line("  # version 1  ").expect("tag");
        merger.ingest_line("# version 2").expect("tag");
        let merged = merger.finish();
        assert_eq!(merged.version_tags(), ["# version 1", "# version 2"]);
        assert!(merged.is_empty());
    }
}
