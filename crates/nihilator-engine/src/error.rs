use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by the loader, the texture wrapper and the orchestrator.
///
/// Every variant is logged at the point of failure; callers only decide
/// whether to carry on (asset failures) or abort (init failures).
#[derive(Debug, Error)]
pub enum Error {
    /// File missing, corrupt, or in a format the selected decoder rejects.
    #[error("unable to load image {}: {reason}", path.display())]
    DecodeFailed { path: PathBuf, reason: String },

    /// GPU texture could not be created from a decoded surface.
    #[error("unable to create texture from {}: {reason}", path.display())]
    UploadFailed { path: PathBuf, reason: String },

    /// Platform, window, renderer or image subsystem could not start.
    #[error("{stage} could not be initialized: {reason}")]
    InitFailed { stage: &'static str, reason: String },
}

impl Error {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DecodeFailed { path: path.into(), reason: reason.to_string() }
    }

    pub(crate) fn upload(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UploadFailed { path: path.into(), reason: reason.to_string() }
    }

    pub(crate) fn init(stage: &'static str, reason: impl ToString) -> Self {
        Self::InitFailed { stage, reason: reason.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
