//! FILENAME: report-engine/src/error.rs
//! PURPOSE: Error types for report configuration.
//! CONTEXT: Only configuration problems surface as errors: they are caught
//! at registry construction or engine init, before any page is produced.
//! Data-level problems (bad formulas, missing columns) render as blank
//! cells instead and never reach this type.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("report has no active sections")]
    EmptyRegistry,

    #[error("report must have exactly one detail section, found {0}")]
    DetailCount(usize),

    #[error("group header/footer counts do not match: {headers} headers, {footers} footers")]
    GroupMismatch { headers: usize, footers: usize },

    #[error("duplicate section name: {0}")]
    DuplicateSection(String),

    #[error("more than one {0} section")]
    DuplicateSingleton(&'static str),

    #[error("no data source configured")]
    MissingDataSource,
}
