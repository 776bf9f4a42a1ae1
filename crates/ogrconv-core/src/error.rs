//! Custom error types for ogrconv operations.
//!
//! This module provides structured error handling using `thiserror`, with
//! domain-specific error types that preserve context and enable better error
//! messages and recovery strategies. Failures during form mutations never
//! abort the parameter model: they clear the dependent fields and surface
//! here for the presentation layer to display.

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::{SourceKind, TargetKind};

/// Main error type for ogrconv operations.
///
/// This is the root error type that encompasses all domain-specific errors.
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum OgrConvError {
    /// Dataset inspection errors (source could not be opened or scanned)
    #[error(transparent)]
    Inspection(#[from] InspectionError),

    /// Catalog lookup errors (unknown formats, projections, combinations)
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Conversion tool execution errors
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Generic errors from dependencies (for boundary glue)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Dataset inspection errors.
///
/// These occur when a candidate source location cannot be opened or a source
/// folder cannot be scanned. They are recovered locally: the dependent fields
/// are cleared and the model stays usable.
#[derive(Debug, Error)]
pub enum InspectionError {
    /// The inspector could not open the candidate source
    #[error("Unable to open source '{location}': {reason}")]
    OpenFailed {
        /// The location that was inspected
        location: String,
        /// What the inspector reported
        reason: String,
    },

    /// A source folder could not be scanned for matching files
    #[error("Failed to scan folder '{path}': {source}")]
    FolderScan {
        /// The folder path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Catalog lookup errors.
///
/// These occur when a name or code does not resolve against the static
/// format or projection catalogs. The model state is left untouched.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Format name is not in the catalog slice for the given kind
    #[error("Unknown {kind} format '{name}'")]
    UnknownFormat {
        /// The requested format name
        name: String,
        /// The source or target kind whose slice was searched
        kind: String,
    },

    /// Projection text or code matched no catalog entry
    #[error("Unknown projection '{text}'")]
    UnknownProjection {
        /// The code or text that failed to resolve
        text: String,
    },

    /// The requested target kind is not allowed for the current source
    #[error("A {source_kind} source cannot write to a {target} target")]
    TargetNotAllowed {
        /// The requested target kind
        target: TargetKind,
        /// The current source kind
        source_kind: SourceKind,
    },
}

/// Conversion tool execution errors.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The parameter model is not ready to execute
    #[error("Not ready to execute: {reason}")]
    NotReady {
        /// What is still missing
        reason: String,
    },

    /// The conversion tool executable was not found
    #[error("Conversion tool not found: {tool}")]
    ToolNotFound {
        /// The tool path or name that was launched
        tool: String,
    },

    /// The conversion tool could not be launched
    #[error("Failed to launch '{tool}': {source}")]
    Launch {
        /// The tool path or name
        tool: String,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The conversion tool exited with a non-zero code
    #[error("Conversion failed with exit code {code}: {stderr}")]
    ProcessFailed {
        /// The exit code
        code: i32,
        /// Standard error output
        stderr: String,
    },
}

/// Type alias for Results using `OgrConvError`.
pub type Result<T> = std::result::Result<T, OgrConvError>;

impl OgrConvError {
    /// Get a user-friendly error message with suggestions.
    ///
    /// This formats the error in a way that's helpful for end users,
    /// including context and actionable information.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Inspection(e) => e.user_message(),
            Self::Catalog(e) => e.to_string(),
            Self::Execution(e) => e.user_message(),
            Self::Other(e) => format!("Error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    ///
    /// Returns helpful suggestions on how to fix or work around the error.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Inspection(e) => e.recovery_suggestion(),
            Self::Catalog(e) => e.recovery_suggestion(),
            Self::Execution(e) => e.recovery_suggestion(),
            Self::Other(_) => None,
        }
    }
}

impl InspectionError {
    fn user_message(&self) -> String {
        match self {
            Self::OpenFailed { location, .. } => {
                format!("Unable to open source: {location}")
            },
            Self::FolderScan { path, .. } => {
                format!("Failed to scan folder: {}", path.display())
            },
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::OpenFailed { .. } => Some(
                "Check that the location exists and the selected format matches the data."
                    .to_string(),
            ),
            Self::FolderScan { .. } => {
                Some("Check that the folder exists and is readable.".to_string())
            },
        }
    }
}

impl CatalogError {
    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::UnknownFormat { .. } => {
                Some("Run 'ogrconv formats' to see all known formats.".to_string())
            },
            Self::UnknownProjection { .. } => {
                Some("Run 'ogrconv projections' to see the EPSG catalog.".to_string())
            },
            Self::TargetNotAllowed { .. } => {
                Some("Pick one of the target kinds allowed for this source.".to_string())
            },
        }
    }
}

impl ExecutionError {
    fn user_message(&self) -> String {
        match self {
            Self::ProcessFailed { code, .. } => {
                format!("Conversion tool exited with code {code}")
            },
            _ => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::ToolNotFound { .. } => {
                Some("Check that GDAL is installed and ogr2ogr is on PATH.".to_string())
            },
            Self::NotReady { .. } => {
                Some("Choose a source and a target location first.".to_string())
            },
            Self::ProcessFailed { .. } => {
                Some("Inspect the captured stderr for the tool's own diagnostics.".to_string())
            },
            Self::Launch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_not_allowed_message() {
        let err = OgrConvError::from(CatalogError::TargetNotAllowed {
            target: TargetKind::Folder,
            source_kind: SourceKind::File,
        });
        assert_eq!(
            err.to_string(),
            "A file source cannot write to a folder target"
        );
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_process_failed_user_message() {
        let err = OgrConvError::from(ExecutionError::ProcessFailed {
            code: 2,
            stderr: "FAILURE: Unable to open datasource".to_string(),
        });
        assert_eq!(err.user_message(), "Conversion tool exited with code 2");
    }

    #[test]
    fn test_open_failed_keeps_location() {
        let err = InspectionError::OpenFailed {
            location: "/data/missing.shp".to_string(),
            reason: "no such file".to_string(),
        };
        assert!(err.to_string().contains("/data/missing.shp"));
    }
}
