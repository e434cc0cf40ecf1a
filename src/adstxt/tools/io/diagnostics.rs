use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::adstxt::tools::error::RowError;

/// A fragment line that was skipped because it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: PathBuf,
    /// One-based line number inside `source`.
    pub line_number: usize,
    /// The line exactly as it was read.
    pub raw: String,
    pub error: RowError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.raw)
    }
}

/// Receives diagnostics for skipped lines.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Writes one `<error>: <raw line>` line per diagnostic.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn report(&mut self, diagnostic: Diagnostic) {
        debug!(
            source = %diagnostic.source.display(),
            line_number = diagnostic.line_number,
            "reporting skipped line"
        );
        if let Err(error) = writeln!(self.writer, "{diagnostic}") {
            warn!(%error, "failed to write diagnostic");
        }
    }
}
