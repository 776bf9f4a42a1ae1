//! Dataset inspection: opening a candidate source and reporting what it is.
//!
//! The inspector is a synchronous, blocking collaborator called once per
//! concrete single-entry source location. It reports the dataset's
//! coordinate reference system and, for single files, a suggested SQL query
//! over the first layer. Inspection failure is recoverable: the model clears
//! the dependent fields and stays usable.

use std::process::Command;

use log::{debug, warn};

use crate::error::InspectionError;

/// What an inspection found out about a source dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    /// Detected EPSG code of the dataset's coordinate reference system.
    pub epsg: Option<u32>,
    /// Suggested query over the dataset's first layer.
    pub suggested_query: Option<String>,
}

/// Opens a candidate source location and reports its coordinate system and
/// suggested query.
pub trait DatasetInspector: Send + Sync {
    /// Inspects `location`.
    ///
    /// # Errors
    ///
    /// Returns [`InspectionError::OpenFailed`] when the location cannot be
    /// opened as a dataset.
    fn inspect(&self, location: &str) -> Result<SourceReport, InspectionError>;
}

/// Inspector that accepts every location and reports nothing.
///
/// Used when no GDAL tooling is available or inspection is not wanted; the
/// detected projection and suggested query simply stay empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInspector;

impl DatasetInspector for NoopInspector {
    fn inspect(&self, _location: &str) -> Result<SourceReport, InspectionError> {
        Ok(SourceReport::default())
    }
}

/// Inspector that shells out to GDAL's `ogrinfo` and scrapes its summary.
///
/// Runs `ogrinfo -ro -so -al <location>` synchronously and extracts the last
/// EPSG authority code from the coordinate system dump plus the first layer
/// name, turned into a `SELECT * FROM <layer>` suggestion.
#[derive(Debug, Clone)]
pub struct OgrInfoInspector {
    tool: String,
}

impl Default for OgrInfoInspector {
    fn default() -> Self {
        Self::new("ogrinfo")
    }
}

impl OgrInfoInspector {
    /// Creates an inspector launching the given `ogrinfo` executable.
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

impl DatasetInspector for OgrInfoInspector {
    fn inspect(&self, location: &str) -> Result<SourceReport, InspectionError> {
        debug!("Inspecting source with {}: {location}", self.tool);

        let output = Command::new(&self.tool)
            .args(["-ro", "-so", "-al", location])
            .output()
            .map_err(|e| InspectionError::OpenFailed {
                location: location.to_string(),
                reason: format!("failed to launch {}: {e}", self.tool),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Inspection of '{location}' failed: {}", stderr.trim());
            return Err(InspectionError::OpenFailed {
                location: location.to_string(),
                reason: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_ogrinfo_summary(&stdout))
    }
}

/// Scrapes an `ogrinfo` summary dump into a [`SourceReport`].
///
/// The coordinate system WKT nests authorities; the dataset's own CRS is the
/// last `AUTHORITY["EPSG","<code>"]` in the dump. The first `Layer name:`
/// line becomes the suggested query.
#[must_use]
pub fn parse_ogrinfo_summary(output: &str) -> SourceReport {
    let mut epsg = None;
    let mut suggested_query = None;

    for line in output.lines() {
        if let Some(rest) = line.trim().strip_prefix("Layer name:") {
            if suggested_query.is_none() {
                let layer = rest.trim();
                if !layer.is_empty() {
                    suggested_query = Some(format!("SELECT * FROM {layer}"));
                }
            }
        }

        // Keep scanning: later authorities belong to the outermost CRS.
        let mut rest = line;
        while let Some(pos) = rest.find("AUTHORITY[\"EPSG\",\"") {
            let after = &rest[pos + "AUTHORITY[\"EPSG\",\"".len()..];
            if let Some(end) = after.find('"') {
                if let Ok(code) = after[..end].parse::<u32>() {
                    epsg = Some(code);
                }
                rest = &after[end..];
            } else {
                break;
            }
        }
    }

    SourceReport {
        epsg,
        suggested_query,
    }
}
