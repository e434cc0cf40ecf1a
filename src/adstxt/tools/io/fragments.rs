use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::adstxt::tools::error::{Result, RowError, ToolError};
use crate::adstxt::tools::model::ParsedRow;

/// Literal prefix of comment lines that are copied into the output header.
pub const VERSION_TAG_PREFIX: &str = "# version";

/// What a raw fragment line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    /// A comment starting with the version tag prefix, trimmed.
    VersionTag(&'a str),
    /// Anything else, trimmed. Still needs [`parse_row`].
    Entry(&'a str),
}

pub fn classify_line<'a>(line: &'a str, version_prefix: &str) -> LineKind<'a> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed.starts_with('#') {
        if !version_prefix.is_empty() && trimmed.starts_with(version_prefix) {
            LineKind::VersionTag(trimmed)
        } else {
            LineKind::Comment
        }
    } else {
        LineKind::Entry(trimmed)
    }
}

/// Drops the first `#` and everything after it, along with the whitespace
/// in front of it.
pub fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => line[..index].trim_end(),
        None => line,
    }
}

/// Parses `advertiser,account,relationship[,authority]`.
pub fn parse_row(line: &str) -> std::result::Result<ParsedRow, RowError> {
    let content = strip_comment(line.trim()).trim();
    let fields: Vec<&str> = content.split(',').collect();

    let (advertiser, account_id, relationship, authority_id) = match fields.as_slice() {
        [advertiser, account, relationship] => (advertiser, account, relationship, None),
        [advertiser, account, relationship, authority] => {
            (advertiser, account, relationship, Some(authority.trim().to_string()))
        }
        _ => {
            return Err(RowError {
                fields: fields.len(),
            });
        }
    };

    Ok(ParsedRow {
        advertiser: advertiser.to_lowercase().trim().to_string(),
        account_id: account_id.trim().to_string(),
        relationship: relationship.trim().to_string(),
        authority_id,
    })
}

/// Lists every non-directory entry of the fragment directory, sorted by file
/// name so that later-wins merging is reproducible. Symlinks are listed
/// unless they point at a directory; a dangling one fails later when opened.
#[instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
pub fn list_fragments(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ToolError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        let is_dir = if file_type.is_symlink() {
            fs::metadata(&path).is_ok_and(|metadata| metadata.is_dir())
        } else {
            file_type.is_dir()
        };
        if is_dir {
            debug!(path = %path.display(), "skipping directory");
        } else {
            files.push(path);
        }
    }

    files.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));
    Ok(files)
}
