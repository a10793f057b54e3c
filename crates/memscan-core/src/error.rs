//! Hard failures that abort a single image's run.
//!
//! Per-plugin failures are deliberately not represented here: an engine that
//! cannot run a plugin, or an adapter statistic that cannot be computed, is
//! recovered locally and reported through the `PluginError` list so the rest
//! of the run can still produce a best-effort record.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The caller cancelled the in-flight run. No dataset row is written.
    #[error("extraction cancelled")]
    Cancelled,

    /// The record's key set cannot be reconciled with the dataset's
    /// established header. Writing anyway would silently misalign columns.
    #[error("dataset schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    /// I/O failure persisting a row. Fatal for this image's run.
    #[error("failed to write dataset {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
