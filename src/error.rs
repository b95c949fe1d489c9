use thiserror::Error;

use crate::crs::Crs;

/// Coarse classification of a [`FieldError`], used by reports and the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedFormat,
    MalformedContainer,
    ProjectionUnavailable,
    DegenerateResult,
    RepairFailure,
    Read,
}

/// Failures surfaced by the library. Every variant is recoverable: it is
/// isolated to one file, one feature or one comparison region.
#[derive(Debug, Error)]
pub enum FieldError {
    /// File extension does not name a supported vector format.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Archive opened fine but does not contain the expected inner file.
    #[error("{name} does not contain a {expected} file")]
    MalformedContainer { name: String, expected: &'static str },

    /// Every candidate of the planar fallback chain failed for this CRS.
    #[error("no projection available from {crs} (tried EPSG {tried:?})")]
    ProjectionUnavailable { crs: Crs, tried: Vec<u32> },

    /// A set-algebra result collapsed to nothing polygonal.
    #[error("{0} is empty")]
    DegenerateResult(String),

    /// Repair left no positive-area ring.
    #[error("feature {0} has no positive-area ring after repair")]
    RepairFailure(String),

    /// The file could not be opened or parsed.
    #[error("failed to read {name}: {reason:#}")]
    Read { name: String, reason: anyhow::Error },
}

impl FieldError {
    /// Tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::MalformedContainer { .. } => ErrorKind::MalformedContainer,
            Self::ProjectionUnavailable { .. } => ErrorKind::ProjectionUnavailable,
            Self::DegenerateResult(_) => ErrorKind::DegenerateResult,
            Self::RepairFailure(_) => ErrorKind::RepairFailure,
            Self::Read { .. } => ErrorKind::Read,
        }
    }

    /// Wrap a collaborator failure for the file `name`.
    pub(crate) fn read(name: impl Into<String>, reason: anyhow::Error) -> Self {
        Self::Read { name: name.into(), reason }
    }
}
