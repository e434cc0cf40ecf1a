//! Core library for the adstxt-tools command line application.
//!
//! The library merges a directory of `ads.txt` fragment files into a single
//! deduplicated, sorted document. IO adapters live under
//! [`adstxt::tools::io`], the record representation inside
//! [`adstxt::tools::model`], the deduplication logic in
//! [`adstxt::tools::merge`], and the end-to-end pipeline under
//! [`adstxt::tools::aggregate`].

pub mod adstxt;

pub use adstxt::tools::{Result, ToolError, aggregate, error, io, merge, model};
