use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::adstxt::tools::error::Result;
use crate::adstxt::tools::merge::MergedSet;

/// Contact lines written when none are configured.
pub const DEFAULT_CONTACTS: [&str; 2] = [
    "contact=sales@wasdmedia.de",
    "contact=https://wasdmedia.de/",
];

/// Comment separating the header block from the entries.
pub const SEPARATOR: &str = "# ---";

/// Fixed block written above the merged entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub generated_at: DateTime<Utc>,
    pub contacts: Vec<String>,
}

impl Header {
    /// Header stamped with the current time.
    pub fn new(contacts: Vec<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            contacts,
        }
    }

    pub fn timestamp_line(&self) -> String {
        format!(
            "# ads.txt:{}",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Writes the header, version tags, separator and every merged row.
pub fn write_ads_txt<W: Write>(writer: &mut W, header: &Header, merged: &MergedSet) -> Result<()> {
    writeln!(writer, "{}", header.timestamp_line())?;
    for contact in &header.contacts {
        writeln!(writer, "{contact}")?;
    }
    for tag in merged.version_tags() {
        writeln!(writer, "{tag}")?;
    }
    writeln!(writer, "{SEPARATOR}")?;
    for row in merged.rows() {
        writeln!(writer, "{row}")?;
    }
    writer.flush()?;
    Ok(())
}
