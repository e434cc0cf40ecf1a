use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, instrument};

use crate::adstxt::tools::error::{Result, ToolError};

/// Advertiser name to authority id mapping, keyed exactly as the names appear
/// in the source table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityTable {
    entries: HashMap<String, String>,
}

impl AuthorityTable {
    /// Loads the table from a CSV file on disk.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        debug!(entries = table.len(), "authority table loaded");
        Ok(table)
    }

    /// Reads headerless `advertiser,authority_id[,...]` rows. Columns past the
    /// second are ignored and a later row for the same advertiser replaces an
    /// earlier one. A stray quote inside an unquoted field is kept as a
    /// literal character.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for (index, row) in csv_reader.records().enumerate() {
            let row = row?;
            let line = row
                .position()
                .map(|position| position.line())
                .unwrap_or(index as u64 + 1);
            match (row.get(0), row.get(1)) {
                (Some(advertiser), Some(authority)) => {
                    entries.insert(advertiser.to_string(), authority.to_string());
                }
                _ => {
                    return Err(ToolError::MalformedAuthority {
                        line,
                        fields: row.len(),
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn lookup(&self, advertiser: &str) -> Option<&str> {
        self.entries.get(advertiser).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for AuthorityTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_columns_are_ignored() {
        let input = "foo.com,f-123,ignored,also\nbar.com,b-9\n";
        let table = AuthorityTable::from_reader(input.as_bytes()).expect("table parsed");
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("foo.com"), Some("f-123"));
        assert_eq!(table.lookup("bar.com"), Some("b-9"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let table =
            AuthorityTable::from_reader("Foo.com,f-123\n".as_bytes()).expect("table parsed");
        assert_eq!(table.lookup("Foo.com"), Some("f-123"));
        assert_eq!(table.lookup("foo.com"), None);
    }

    #[test]
    fn bare_quote_is_kept_literally() {
        let table = AuthorityTable::from_reader("foo.com,f\"1\n\"bar.com\",\"b,2\"\n".as_bytes())
            .expect("table parsed");
        assert_eq!(table.lookup("foo.com"), Some("f\"1"));
        assert_eq!(table.lookup("bar.com"), Some("b,2"));
    }

    #[test]
    fn single_column_row_is_fatal() {
        let error = AuthorityTable::from_reader("foo.com,f-123\nbar.com\n".as_bytes())
            .expect_err("malformed row rejected");
        match error {
            ToolError::MalformedAuthority { line, fields } => {
                assert_eq!(line, 2);
                assert_eq!(fields, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_reported() {
        let error =
            AuthorityTable::load(Path::new("does/not/exist.csv")).expect_err("missing file");
        assert!(matches!(error, ToolError::MissingInput(_)));
    }
}
