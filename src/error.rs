use std::path::PathBuf;
use thiserror::Error;

use crate::model::AnnotationSessionId;
use crate::report::SourceKind;
use crate::store::StoreError;

/// The main error type for report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("A source (volume or project) is required to generate a report")]
    InvalidSource,

    #[error("Unknown report type '{name}' for {source_kind} reports")]
    UnknownReportType {
        source_kind: SourceKind,
        name: String,
    },

    #[error("Label trees and users cannot be separated in the same report")]
    ConflictingRestrictions,

    #[error("Annotation session {0} does not exist")]
    UnknownAnnotationSession(AnnotationSessionId),

    #[error("Invalid report options: {source}")]
    InvalidOptions {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse catalog JSON from {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid catalog {path}: {message}")]
    CatalogInvalid { path: PathBuf, message: String },

    #[error("Failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to create output directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write staged file {path}: {source}")]
    StagedWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Renderer script '{script}' failed ({status}): {stderr}")]
    Render {
        script: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReportError {
    /// Returns true for errors raised while producing rows or rendering.
    ///
    /// These are the failures that trigger cleanup of staged files. All
    /// other kinds are configuration errors detected before any side effect.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            ReportError::Io(_)
                | ReportError::CreateDirectory { .. }
                | ReportError::StagedWrite { .. }
                | ReportError::Render { .. }
                | ReportError::Store(_)
        )
    }
}
