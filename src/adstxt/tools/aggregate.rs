use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::adstxt::tools::error::{Result, ToolError};
use crate::adstxt::tools::io::authorities::AuthorityTable;
use crate::adstxt::tools::io::diagnostics::DiagnosticSink;
use crate::adstxt::tools::io::fragments::{VERSION_TAG_PREFIX, list_fragments};
use crate::adstxt::tools::io::output::{DEFAULT_CONTACTS, Header, write_ads_txt};
use crate::adstxt::tools::merge::{MergedSet, Merger};

/// Inputs of a single aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateConfig {
    /// Headerless `advertiser,authority_id` CSV file.
    pub authorities: PathBuf,
    /// Directory holding the fragment files.
    pub parts: PathBuf,
    pub contacts: Vec<String>,
    pub version_prefix: String,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            authorities: PathBuf::from("authorities.csv"),
            parts: PathBuf::from("./parts"),
            contacts: DEFAULT_CONTACTS.iter().map(|line| line.to_string()).collect(),
            version_prefix: VERSION_TAG_PREFIX.to_string(),
        }
    }
}

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    pub merged: MergedSet,
    /// Fragment files read, in processing order.
    pub fragments: Vec<PathBuf>,
    /// Lines skipped because they could not be parsed.
    pub rejected: usize,
}

/// Loads the authority table and merges every fragment file. Nothing is
/// written; any fatal error aborts before output exists.
#[instrument(
    level = "info",
    skip_all,
    fields(authorities = %config.authorities.display(), parts = %config.parts.display())
)]
pub fn run<S>(config: &AggregateConfig, sink: &mut S) -> Result<AggregateReport>
where
    S: DiagnosticSink + ?Sized,
{
    let authorities = AuthorityTable::load(&config.authorities)?;
    info!(entries = authorities.len(), "loaded authority table");

    let fragments = list_fragments(&config.parts)?;
    info!(file_count = fragments.len(), "listed fragment files");

    let mut merger = Merger::new(&authorities, &config.version_prefix);
    let mut rejected = 0;
    for path in &fragments {
        let file = File::open(path).map_err(|source| ToolError::Fragment {
            path: path.clone(),
            source,
        })?;
        let stats = merger
            .ingest_reader(path, BufReader::new(file), sink)
            .map_err(|source| ToolError::Fragment {
                path: path.clone(),
                source,
            })?;
        debug!(
            path = %path.display(),
            lines = stats.lines,
            merged = stats.merged,
            rejected = stats.rejected,
            "fragment merged"
        );
        rejected += stats.rejected;
    }

    let merged = merger.finish();
    info!(record_count = merged.len(), rejected, "merge complete");
    Ok(AggregateReport {
        merged,
        fragments,
        rejected,
    })
}

/// Writes a finished report with a freshly stamped header.
pub fn render<W: Write>(
    writer: &mut W,
    config: &AggregateConfig,
    report: &AggregateReport,
) -> Result<()> {
    let header = Header::new(config.contacts.clone());
    write_ads_txt(writer, &header, &report.merged)
}
