//! The conversion parameter model.
//!
//! A reactive state holder for one conversion: it keeps the user's source
//! and target selections, reacts to every mutation by recomputing the
//! derived command-line string, and exposes that string for display and for
//! execution. The derived string is a pure function of the selections at
//! every instant; it is never edited independently, only rebuilt.
//!
//! The model is UI-toolkit independent: a presentation layer calls the
//! mutation methods below and observes recomputes through a single watch
//! channel.

use std::fs;

use log::{info, warn};
use tokio::sync::watch;
use url::Url;

use crate::catalog::{self, Format, SourceKind, TargetKind};
use crate::command::{CommandSpec, WriteMode, build_arguments};
use crate::error::{CatalogError, ExecutionError, InspectionError, Result};
use crate::inspect::DatasetInspector;
use crate::projection::{self, Projection};
use crate::run::{EntryOutcome, ProcessRunner, RunReport};

/// The user's source selections.
#[derive(Debug, Clone)]
pub struct SourceSelection {
    /// Where the data comes from.
    pub kind: SourceKind,
    /// Index into the catalog slice valid for `kind`.
    pub format_index: usize,
    /// Path, connection string, or URI as entered.
    pub location: String,
    /// Resolved entries: file names for a folder, synthetic per-table
    /// locations for a database, the location itself otherwise.
    pub entries: Vec<String>,
    /// Projection catalog index detected by inspection, if any.
    pub detected_projection: Option<usize>,
    /// SQL restriction on the source dataset.
    pub query: String,
}

/// The user's target selections.
#[derive(Debug, Clone)]
pub struct TargetSelection {
    /// Where the converted data goes.
    pub kind: TargetKind,
    /// Index into the writable catalog slice valid for `kind`.
    pub format_index: usize,
    /// Path or connection string as entered.
    pub location: String,
    /// Projection catalog index; 0 means no reprojection.
    pub projection_index: usize,
    /// How an existing target is treated.
    pub write_mode: WriteMode,
}

/// A source location as handed over by the presentation layer.
///
/// Each variant implies a source kind; passing a variant that does not match
/// the current kind switches the kind first.
#[derive(Debug, Clone)]
pub enum SourceInput {
    /// A single file path, `file://` URIs included.
    Path(String),
    /// A directory whose contents are filtered by the current format's
    /// extension.
    Folder(String),
    /// A connection descriptor plus the chosen table names.
    Database {
        /// Connection string, a trailing `tables=` clause included.
        connection: String,
        /// Tables to convert; empty means the connection string itself is
        /// the single entry.
        tables: Vec<String>,
    },
    /// A web-service URI.
    Uri(String),
}

impl SourceInput {
    /// The source kind this input implies.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceInput::Path(_) => SourceKind::File,
            SourceInput::Folder(_) => SourceKind::Folder,
            SourceInput::Database { .. } => SourceKind::Database,
            SourceInput::Uri(_) => SourceKind::WebService,
        }
    }
}

/// Derived enablement state for presentation controls.
#[derive(Debug, Clone, Copy)]
pub struct Controls {
    /// Target kinds selectable for the current source.
    pub allowed_targets: &'static [TargetKind],
    /// Whether the target projection input applies. Projection is
    /// per-dataset, so it is ambiguous across multiple entries.
    pub projection_enabled: bool,
    /// Whether the source query input applies; same per-dataset rule.
    pub query_enabled: bool,
    /// Whether a conversion can be launched.
    pub execute_enabled: bool,
}

/// One concrete conversion job expanded from the selections.
#[derive(Debug, Clone)]
pub struct ConversionTask {
    /// Resolved source dataset name, protocol token included.
    pub source: String,
    /// Target location.
    pub target: String,
    /// Fully built argument string for this entry.
    pub arguments: String,
}

const FILE_TARGETS: [TargetKind; 2] = [TargetKind::File, TargetKind::Database];
const FOLDER_TARGETS: [TargetKind; 2] = [TargetKind::Folder, TargetKind::Database];

/// The compatibility matrix over source and target kinds.
///
/// A multi-entry database source fans out into several outputs, so it is
/// treated like a folder source.
#[must_use]
pub fn allowed_targets(kind: SourceKind, multi_entry: bool) -> &'static [TargetKind] {
    match kind {
        SourceKind::File => &FILE_TARGETS,
        SourceKind::Folder | SourceKind::WebService => &FOLDER_TARGETS,
        SourceKind::Database => {
            if multi_entry {
                &FOLDER_TARGETS
            } else {
                &FILE_TARGETS
            }
        },
    }
}

/// Reactive state holder for one conversion.
pub struct ConversionModel {
    source: SourceSelection,
    target: TargetSelection,
    extra_args: String,
    command_line: String,
    inspector: Box<dyn DatasetInspector>,
    recomputed: watch::Sender<String>,
}

impl ConversionModel {
    /// Creates a model with form-open defaults: File source, File target,
    /// Overwrite, first catalog format on both sides, everything else empty.
    #[must_use]
    pub fn new(inspector: Box<dyn DatasetInspector>) -> Self {
        let (recomputed, _) = watch::channel(String::new());
        let mut model = Self {
            source: SourceSelection {
                kind: SourceKind::File,
                format_index: 0,
                location: String::new(),
                entries: Vec::new(),
                detected_projection: None,
                query: String::new(),
            },
            target: TargetSelection {
                kind: TargetKind::File,
                format_index: 0,
                location: String::new(),
                projection_index: 0,
                write_mode: WriteMode::Overwrite,
            },
            extra_args: String::new(),
            command_line: String::new(),
            inspector,
            recomputed,
        };
        model.recompute();
        model
    }

    /// The current source selections.
    #[must_use]
    pub fn source(&self) -> &SourceSelection {
        &self.source
    }

    /// The current target selections.
    #[must_use]
    pub fn target(&self) -> &TargetSelection {
        &self.target
    }

    /// The free-text block appended verbatim to the command line.
    #[must_use]
    pub fn extra_args(&self) -> &str {
        &self.extra_args
    }

    /// The derived command-line string, rebuilt after every mutation.
    #[must_use]
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Observes recomputes of the derived command line.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.recomputed.subscribe()
    }

    /// The catalog record of the currently selected source format.
    #[must_use]
    pub fn source_format(&self) -> &'static Format {
        &catalog::formats_for(self.source.kind)[self.source.format_index]
    }

    /// The catalog record of the currently selected target format.
    #[must_use]
    pub fn target_format(&self) -> &'static Format {
        &catalog::writable_formats_for(self.target.kind)[self.target.format_index]
    }

    /// The projection detected on the source, if inspection found one.
    #[must_use]
    pub fn detected_projection(&self) -> Option<&'static Projection> {
        self.source
            .detected_projection
            .map(|i| &projection::projections()[i])
    }

    /// The selected target projection, or `None` for the reserved entry.
    #[must_use]
    pub fn target_projection(&self) -> Option<&'static Projection> {
        if self.target.projection_index == 0 {
            None
        } else {
            Some(&projection::projections()[self.target.projection_index])
        }
    }

    /// Switches the source kind.
    ///
    /// Resets the source format slice, location, entries, detected
    /// projection, and query; keeps the current target kind when it is still
    /// allowed for `kind` and otherwise selects the first allowed one.
    /// Calling this twice with the same kind is equivalent to calling it
    /// once.
    pub fn set_source_kind(&mut self, kind: SourceKind) {
        self.source.kind = kind;
        self.source.format_index = 0;
        self.source.location.clear();
        self.source.entries.clear();
        self.source.detected_projection = None;
        self.source.query.clear();
        self.fix_target_kind();
        self.recompute();
    }

    /// Switches the target kind.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TargetNotAllowed`] when the compatibility
    /// matrix forbids `kind` for the current source; the state is left
    /// untouched.
    pub fn set_target_kind(&mut self, kind: TargetKind) -> Result<()> {
        if !self.allowed_targets().contains(&kind) {
            return Err(CatalogError::TargetNotAllowed {
                target: kind,
                source_kind: self.source.kind,
            }
            .into());
        }
        self.apply_target_kind(kind);
        self.recompute();
        Ok(())
    }

    /// Selects the source format by name (case-insensitive).
    ///
    /// Clears the location, entries, detected projection, and query, since
    /// they were resolved against the previous format.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownFormat`] when the name is not in the
    /// slice valid for the current source kind; the state is left untouched.
    pub fn set_source_format(&mut self, name: &str) -> Result<()> {
        let formats = catalog::formats_for(self.source.kind);
        let index = catalog::find_format(formats, name).ok_or_else(|| {
            CatalogError::UnknownFormat {
                name: name.to_string(),
                kind: self.source.kind.to_string(),
            }
        })?;
        self.source.format_index = index;
        self.source.location.clear();
        self.source.entries.clear();
        self.source.detected_projection = None;
        self.source.query.clear();
        self.recompute();
        Ok(())
    }

    /// Selects the target format by name (case-insensitive) and clears the
    /// target location.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownFormat`] when the name is not in the
    /// writable slice valid for the current target kind.
    pub fn set_target_format(&mut self, name: &str) -> Result<()> {
        let formats = catalog::writable_formats_for(self.target.kind);
        let index = catalog::find_format(formats, name).ok_or_else(|| {
            CatalogError::UnknownFormat {
                name: name.to_string(),
                kind: self.target.kind.to_string(),
            }
        })?;
        self.target.format_index = index;
        self.target.location.clear();
        self.recompute();
        Ok(())
    }

    /// Resolves a source location into the entry list and inspects the
    /// single resolved entry when one exists.
    ///
    /// The input variant implies a source kind; a differing kind is switched
    /// first. Folder inputs are scanned for files matching the current
    /// format's extension, database inputs expand into one synthetic
    /// location per chosen table, and web-service URIs stay a single entry
    /// with the protocol token prepended wherever they are used as a dataset
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`InspectionError::FolderScan`] when a folder cannot be read
    /// and [`InspectionError::OpenFailed`] when the single entry cannot be
    /// inspected. Either way the dependent fields are cleared and the model
    /// stays usable.
    pub fn set_source_location(&mut self, input: &SourceInput) -> Result<()> {
        if input.kind() != self.source.kind {
            self.set_source_kind(input.kind());
        }

        self.source.detected_projection = None;
        self.source.query.clear();

        match input {
            SourceInput::Path(raw) => {
                let path = normalize_path_input(raw);
                self.source.entries = vec![path.clone()];
                self.source.location = path;
            },
            SourceInput::Folder(dir) => {
                self.source.location = dir.clone();
                match scan_folder(dir, self.source_format().tag) {
                    Ok(entries) => self.source.entries = entries,
                    Err(e) => {
                        self.source.entries.clear();
                        self.fix_target_kind();
                        self.recompute();
                        return Err(e.into());
                    },
                }
            },
            SourceInput::Database { connection, tables } => {
                self.source.location = connection.clone();
                self.source.entries = expand_tables(connection, tables);
            },
            SourceInput::Uri(uri) => {
                self.source.location = uri.clone();
                self.source.entries = vec![uri.clone()];
            },
        }

        self.fix_target_kind();

        let mut inspection_failure = None;
        if self.source.entries.len() == 1 {
            let name = self.resolved_entry(0);
            match self.inspector.inspect(&name) {
                Ok(report) => {
                    self.source.detected_projection =
                        report.epsg.and_then(projection::find_by_code);
                    if self.source.kind == SourceKind::File {
                        self.source.query = report.suggested_query.unwrap_or_default();
                    }
                },
                Err(e) => {
                    warn!("Inspection of '{name}' failed: {e}");
                    self.source.detected_projection = None;
                    self.source.query.clear();
                    inspection_failure = Some(e);
                },
            }
        }

        self.recompute();
        match inspection_failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Stores the target location.
    pub fn set_target_location(&mut self, text: &str) {
        self.target.location = text.to_string();
        self.recompute();
    }

    /// Stores the source query.
    pub fn set_source_query(&mut self, text: &str) {
        self.source.query = text.to_string();
        self.recompute();
    }

    /// Stores the free-text block appended verbatim to the command line.
    pub fn set_extra_args(&mut self, text: &str) {
        self.extra_args = text.to_string();
        self.recompute();
    }

    /// Stores the write mode.
    pub fn set_write_mode(&mut self, mode: WriteMode) {
        self.target.write_mode = mode;
        self.recompute();
    }

    /// Selects the target projection by exact EPSG code.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProjection`] when the code is not in
    /// the catalog; the selection is left unchanged.
    pub fn set_target_projection_code(&mut self, code: u32) -> Result<()> {
        let index = projection::find_by_code(code).ok_or_else(|| {
            CatalogError::UnknownProjection {
                text: code.to_string(),
            }
        })?;
        self.target.projection_index = index;
        self.recompute();
        Ok(())
    }

    /// Resolves typed projection text against the catalog's code column with
    /// a starts-with match. Empty text clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProjection`] when nothing matches; the
    /// selection is left unchanged.
    pub fn set_target_projection_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            self.clear_target_projection();
            return Ok(());
        }
        let index = projection::resolve_prefix(text).ok_or_else(|| {
            CatalogError::UnknownProjection {
                text: text.to_string(),
            }
        })?;
        self.target.projection_index = index;
        self.recompute();
        Ok(())
    }

    /// Clears the target projection back to the reserved entry.
    pub fn clear_target_projection(&mut self) {
        self.target.projection_index = 0;
        self.recompute();
    }

    /// Derived enablement state for presentation controls.
    #[must_use]
    pub fn controls(&self) -> Controls {
        let single_entry = self.source.entries.len() <= 1;
        Controls {
            allowed_targets: self.allowed_targets(),
            projection_enabled: single_entry,
            query_enabled: single_entry,
            execute_enabled: !self.target.location.is_empty() && !self.source.entries.is_empty(),
        }
    }

    /// Advisory messages about the current selections.
    ///
    /// A write-mode/target-kind mismatch is reported here, never rejected:
    /// Append and Update are meaningful mainly for database and
    /// existing-file targets.
    #[must_use]
    pub fn advisories(&self) -> Vec<String> {
        let mut advisories = Vec::new();
        if self.target.kind == TargetKind::Folder
            && matches!(self.target.write_mode, WriteMode::Append | WriteMode::Update)
        {
            advisories.push(format!(
                "Write mode '{}' is meant for database or existing-file targets; \
                 a folder target usually wants 'overwrite'.",
                self.target.write_mode
            ));
        }
        advisories
    }

    /// Expands the selections into one conversion task per entry, each with
    /// its own fully built argument string.
    #[must_use]
    pub fn tasks(&self) -> Vec<ConversionTask> {
        (0..self.source.entries.len())
            .map(|i| {
                let source = self.resolved_entry(i);
                let arguments = build_arguments(&self.spec_for(&source));
                ConversionTask {
                    source,
                    target: self.target.location.clone(),
                    arguments,
                }
            })
            .collect()
    }

    /// Runs every task sequentially through `runner`, waiting for each
    /// process to exit. One failing entry never aborts the remaining queued
    /// entries; the report carries an outcome per entry with the real exit
    /// code and captured stderr.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::NotReady`] when no target location has been
    /// chosen or no source entry resolved.
    pub async fn execute(&self, runner: &dyn ProcessRunner, tool: &str) -> Result<RunReport> {
        if !self.controls().execute_enabled {
            let reason = if self.target.location.is_empty() {
                "no target location chosen"
            } else {
                "no source entries resolved"
            };
            return Err(ExecutionError::NotReady {
                reason: reason.to_string(),
            }
            .into());
        }

        let mut report = RunReport::default();
        for task in self.tasks() {
            info!("Converting {} > {}", task.source, task.target);
            let result = runner.run(tool, &task.arguments).await;
            if let Err(e) = &result {
                warn!("Entry '{}' failed: {e}", task.source);
            }
            report.outcomes.push(EntryOutcome {
                source: task.source,
                target: task.target,
                result,
            });
        }
        Ok(report)
    }

    fn allowed_targets(&self) -> &'static [TargetKind] {
        allowed_targets(self.source.kind, self.source.entries.len() > 1)
    }

    fn fix_target_kind(&mut self) {
        let allowed = self.allowed_targets();
        if !allowed.contains(&self.target.kind) {
            self.apply_target_kind(allowed[0]);
        }
    }

    fn apply_target_kind(&mut self, kind: TargetKind) {
        self.target.kind = kind;
        self.target.format_index = 0;
        self.target.location.clear();
    }

    /// The entry at `index` resolved into a dataset name the tool accepts.
    fn resolved_entry(&self, index: usize) -> String {
        let entry = &self.source.entries[index];
        match self.source.kind {
            SourceKind::File | SourceKind::Database => entry.clone(),
            SourceKind::Folder => format!("{}/{}", self.source.location, entry),
            SourceKind::WebService => format!("{}{}", self.source_format().tag, entry),
        }
    }

    fn spec_for<'a>(&'a self, source: &'a str) -> CommandSpec<'a> {
        CommandSpec {
            target_format: self.target_format().name,
            target_location: &self.target.location,
            source,
            projection_code: self.target_projection().map(|p| p.code),
            query: &self.source.query,
            write_mode: self.target.write_mode,
            extra_args: &self.extra_args,
        }
    }

    fn recompute(&mut self) {
        let source = match self.source.kind {
            SourceKind::WebService => {
                format!("{}{}", self.source_format().tag, self.source.location)
            },
            _ => self.source.location.clone(),
        };
        let line = build_arguments(&self.spec_for(&source));
        self.command_line = line.clone();
        self.recomputed.send_replace(line);
    }
}

impl std::fmt::Debug for ConversionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionModel")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("extra_args", &self.extra_args)
            .field("command_line", &self.command_line)
            .finish_non_exhaustive()
    }
}

impl Default for ConversionModel {
    fn default() -> Self {
        Self::new(Box::new(crate::inspect::NoopInspector))
    }
}

fn normalize_path_input(raw: &str) -> String {
    if let Ok(url) = Url::parse(raw) {
        if url.scheme() == "file" {
            if let Ok(path) = url.to_file_path() {
                return path.to_string_lossy().into_owned();
            }
        }
    }
    raw.to_string()
}

/// Scans `dir` for files with the given extension, case-insensitive, in
/// deterministic name order.
fn scan_folder(dir: &str, extension: &str) -> std::result::Result<Vec<String>, InspectionError> {
    let suffix = format!(".{}", extension.to_ascii_lowercase());
    let mut entries = Vec::new();
    let read_dir = fs::read_dir(dir).map_err(|e| InspectionError::FolderScan {
        path: dir.into(),
        source: e,
    })?;
    for entry in read_dir {
        let entry = entry.map_err(|e| InspectionError::FolderScan {
            path: dir.into(),
            source: e,
        })?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.to_ascii_lowercase().ends_with(&suffix) {
            entries.push(name);
        }
    }
    entries.sort_unstable();
    Ok(entries)
}

/// Expands a connection string into one synthetic location per table.
///
/// Everything from the connection's last `tables=` marker on is replaced; a
/// connection without one keeps its full text and gets the clause appended
/// after a separating space. No tables means the connection string itself is
/// the single entry.
fn expand_tables(connection: &str, tables: &[String]) -> Vec<String> {
    if tables.is_empty() {
        return vec![connection.to_string()];
    }
    let prefix = match connection.rfind("tables=") {
        Some(pos) => connection[..pos].to_string(),
        None if connection.is_empty() => String::new(),
        None => format!("{connection} "),
    };
    tables
        .iter()
        .map(|table| format!("{prefix}tables={table}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::{NoopInspector, SourceReport};
    use crate::run::RunStatus;
    use async_trait::async_trait;
    use std::fs::File;
    use std::sync::Mutex;

    fn model() -> ConversionModel {
        ConversionModel::new(Box::new(NoopInspector))
    }

    struct FixedInspector(SourceReport);

    impl DatasetInspector for FixedInspector {
        fn inspect(&self, _location: &str) -> std::result::Result<SourceReport, InspectionError> {
            Ok(self.0.clone())
        }
    }

    struct FailingInspector;

    impl DatasetInspector for FailingInspector {
        fn inspect(&self, location: &str) -> std::result::Result<SourceReport, InspectionError> {
            Err(InspectionError::OpenFailed {
                location: location.to_string(),
                reason: "not a dataset".to_string(),
            })
        }
    }

    #[test]
    fn test_defaults_at_form_open() {
        let m = model();
        assert_eq!(m.source().kind, SourceKind::File);
        assert_eq!(m.target().kind, TargetKind::File);
        assert_eq!(m.target().write_mode, WriteMode::Overwrite);
        assert_eq!(m.source_format().name, "ESRI Shapefile");
        assert!(!m.controls().execute_enabled);
    }

    #[test]
    fn test_spec_example_file_to_geojson() {
        let mut m = model();
        m.set_source_location(&SourceInput::Path("/data/a.shp".into()))
            .unwrap();
        m.set_target_format("GeoJSON").unwrap();
        m.set_target_location("/out/a.geojson");
        assert_eq!(
            m.command_line(),
            r#"-f "GeoJSON" "/out/a.geojson" "/data/a.shp" -overwrite"#
        );
    }

    #[test]
    fn test_web_service_source_gets_protocol_token() {
        let mut m = model();
        m.set_source_location(&SourceInput::Uri("http://host/wfs".into()))
            .unwrap();
        assert_eq!(m.source().kind, SourceKind::WebService);
        assert!(m.command_line().contains(r#""WFS:http://host/wfs""#));
        // File targets are not selectable for a web-service source.
        assert_eq!(m.target().kind, TargetKind::Folder);
    }

    #[test]
    fn test_sql_query_verbatim_in_command_line() {
        let mut m = model();
        m.set_source_location(&SourceInput::Path("/data/a.shp".into()))
            .unwrap();
        m.set_source_query("SELECT * FROM t WHERE id>1");
        assert!(
            m.command_line()
                .contains(r#"-sql "SELECT * FROM t WHERE id>1""#)
        );
    }

    #[test]
    fn test_set_source_kind_is_idempotent() {
        let mut m = model();
        m.set_source_kind(SourceKind::Folder);
        let once_entries = m.source().entries.clone();
        let once_line = m.command_line().to_string();
        m.set_source_kind(SourceKind::Folder);
        assert_eq!(m.source().entries, once_entries);
        assert_eq!(m.command_line(), once_line);
    }

    #[test]
    fn test_compatibility_matrix() {
        assert_eq!(allowed_targets(SourceKind::File, false), &[
            TargetKind::File,
            TargetKind::Database
        ]);
        assert_eq!(allowed_targets(SourceKind::Folder, true), &[
            TargetKind::Folder,
            TargetKind::Database
        ]);
        assert_eq!(allowed_targets(SourceKind::Database, false), &[
            TargetKind::File,
            TargetKind::Database
        ]);
        assert_eq!(allowed_targets(SourceKind::Database, true), &[
            TargetKind::Folder,
            TargetKind::Database
        ]);
        assert_eq!(allowed_targets(SourceKind::WebService, false), &[
            TargetKind::Folder,
            TargetKind::Database
        ]);
    }

    #[test]
    fn test_invalid_target_kind_is_replaced_on_source_switch() {
        let mut m = model();
        assert_eq!(m.target().kind, TargetKind::File);
        m.set_source_kind(SourceKind::WebService);
        assert_eq!(m.target().kind, TargetKind::Folder);
        // Database stays valid across the switch back.
        m.set_target_kind(TargetKind::Database).unwrap();
        m.set_source_kind(SourceKind::File);
        assert_eq!(m.target().kind, TargetKind::Database);
    }

    #[test]
    fn test_disallowed_target_kind_is_rejected() {
        let mut m = model();
        let err = m.set_target_kind(TargetKind::Folder).unwrap_err();
        assert!(err.to_string().contains("cannot write"));
        assert_eq!(m.target().kind, TargetKind::File);
    }

    #[test]
    fn test_folder_with_three_files_disables_per_dataset_inputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.shp", "b.shp", "c.shp", "notes.txt"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let mut m = model();
        m.set_source_location(&SourceInput::Folder(
            dir.path().to_string_lossy().into_owned(),
        ))
        .unwrap();

        assert_eq!(m.source().entries, ["a.shp", "b.shp", "c.shp"]);
        let controls = m.controls();
        assert!(!controls.projection_enabled);
        assert!(!controls.query_enabled);
        assert_eq!(m.target().kind, TargetKind::Folder);
    }

    #[test]
    fn test_folder_scan_failure_clears_entries_and_reports() {
        let mut m = model();
        let err = m
            .set_source_location(&SourceInput::Folder("/no/such/folder".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::OgrConvError::Inspection(InspectionError::FolderScan { .. })
        ));
        assert!(m.source().entries.is_empty());
        // The model stays usable.
        m.set_target_location("/out");
        assert!(m.command_line().contains("/out"));
    }

    #[test]
    fn test_database_tables_expand_into_synthetic_locations() {
        let mut m = model();
        m.set_source_location(&SourceInput::Database {
            connection: "PG:host=localhost dbname=gis tables=old".into(),
            tables: vec!["roads".into(), "rivers".into()],
        })
        .unwrap();
        assert_eq!(m.source().entries, [
            "PG:host=localhost dbname=gis tables=roads",
            "PG:host=localhost dbname=gis tables=rivers"
        ]);
        // Multi-table forbids File targets.
        assert_eq!(m.target().kind, TargetKind::Folder);
    }

    #[test]
    fn test_database_connection_without_marker_gets_clause_appended() {
        assert_eq!(
            expand_tables("PG:host=localhost dbname=gis", &["roads".into()]),
            ["PG:host=localhost dbname=gis tables=roads"]
        );
    }

    #[test]
    fn test_database_without_tables_is_single_entry() {
        let mut m = model();
        m.set_source_location(&SourceInput::Database {
            connection: "PG:host=localhost dbname=gis".into(),
            tables: Vec::new(),
        })
        .unwrap();
        assert_eq!(m.source().entries, ["PG:host=localhost dbname=gis"]);
        assert_eq!(m.target().kind, TargetKind::File);
    }

    #[test]
    fn test_file_uri_is_translated_to_plain_path() {
        let mut m = model();
        m.set_source_location(&SourceInput::Path("file:///data/a.shp".into()))
            .unwrap();
        assert_eq!(m.source().location, "/data/a.shp");
    }

    #[test]
    fn test_inspection_fills_projection_and_query_for_file_source() {
        let mut m = ConversionModel::new(Box::new(FixedInspector(SourceReport {
            epsg: Some(4326),
            suggested_query: Some("SELECT * FROM roads".into()),
        })));
        m.set_source_location(&SourceInput::Path("/data/roads.shp".into()))
            .unwrap();
        assert_eq!(m.detected_projection().map(|p| p.code), Some(4326));
        assert_eq!(m.source().query, "SELECT * FROM roads");
    }

    #[test]
    fn test_inspection_query_suggestion_is_file_only() {
        let mut m = ConversionModel::new(Box::new(FixedInspector(SourceReport {
            epsg: Some(4326),
            suggested_query: Some("SELECT * FROM roads".into()),
        })));
        m.set_source_location(&SourceInput::Uri("http://host/wfs".into()))
            .unwrap();
        assert_eq!(m.detected_projection().map(|p| p.code), Some(4326));
        assert!(m.source().query.is_empty());
    }

    #[test]
    fn test_inspection_failure_clears_fields_but_keeps_location() {
        let mut m = ConversionModel::new(Box::new(FailingInspector));
        let err = m
            .set_source_location(&SourceInput::Path("/data/bad.shp".into()))
            .unwrap_err();
        assert!(err.to_string().contains("Unable to open source"));
        assert!(m.detected_projection().is_none());
        assert!(m.source().query.is_empty());
        assert_eq!(m.source().location, "/data/bad.shp");
        assert_eq!(m.source().entries, ["/data/bad.shp"]);
    }

    #[test]
    fn test_projection_code_round_trip() {
        let mut m = model();
        m.set_target_projection_code(4326).unwrap();
        let selected = m.target_projection().unwrap();
        assert_eq!(selected.code, 4326);
        assert_eq!(selected.display(), "4326 : WGS 84");
        assert!(m.command_line().contains("-T_SRS EPSG:4326"));
    }

    #[test]
    fn test_projection_text_prefix_and_miss() {
        let mut m = model();
        m.set_target_projection_text("4326").unwrap();
        assert_eq!(m.target_projection().unwrap().code, 4326);
        // A miss reports the failure and leaves the selection unchanged.
        assert!(m.set_target_projection_text("77777").is_err());
        assert_eq!(m.target_projection().unwrap().code, 4326);
        // Empty text clears it.
        m.set_target_projection_text("").unwrap();
        assert!(m.target_projection().is_none());
    }

    #[test]
    fn test_append_on_folder_target_is_advisory_only() {
        let mut m = model();
        m.set_source_kind(SourceKind::Folder);
        m.set_write_mode(WriteMode::Append);
        assert_eq!(m.advisories().len(), 1);
        assert!(m.command_line().contains("-append"));
        m.set_write_mode(WriteMode::Overwrite);
        assert!(m.advisories().is_empty());
    }

    #[test]
    fn test_watch_channel_observes_recomputes() {
        let mut m = model();
        let rx = m.subscribe();
        m.set_target_location("/out/a.geojson");
        assert!(rx.borrow().contains("/out/a.geojson"));
    }

    #[test]
    fn test_tasks_expand_folder_entries() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.shp", "b.shp"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let mut m = model();
        m.set_source_location(&SourceInput::Folder(
            dir.path().to_string_lossy().into_owned(),
        ))
        .unwrap();
        m.set_target_location("/out");

        let tasks = m.tasks();
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].source.ends_with("/a.shp"));
        assert!(tasks[1].source.ends_with("/b.shp"));
        assert!(tasks[0].arguments.contains(&tasks[0].source));
        assert!(tasks[1].arguments.contains(&tasks[1].source));
    }

    struct ScriptedRunner {
        fail_on: usize,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(
            &self,
            _tool: &str,
            _arguments: &str,
        ) -> std::result::Result<RunStatus, ExecutionError> {
            let mut calls = self.calls.lock().unwrap();
            let index = *calls;
            *calls += 1;
            if index == self.fail_on {
                Err(ExecutionError::ProcessFailed {
                    code: 1,
                    stderr: "FAILURE".to_string(),
                })
            } else {
                Ok(RunStatus {
                    exit_code: 0,
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_execute_continues_past_failing_entry() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.shp", "b.shp", "c.shp"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let mut m = model();
        m.set_source_location(&SourceInput::Folder(
            dir.path().to_string_lossy().into_owned(),
        ))
        .unwrap();
        m.set_target_location("/out");

        let runner = ScriptedRunner {
            fail_on: 1,
            calls: Mutex::new(0),
        };
        let report = m.execute(&runner, "ogr2ogr").await.unwrap();
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.failed(), 1);
        assert!(report.outcomes[0].succeeded());
        assert!(!report.outcomes[1].succeeded());
        assert!(report.outcomes[2].succeeded());
    }

    #[tokio::test]
    async fn test_execute_requires_target_and_entries() {
        let m = model();
        let runner = ScriptedRunner {
            fail_on: usize::MAX,
            calls: Mutex::new(0),
        };
        let err = m.execute(&runner, "ogr2ogr").await.unwrap_err();
        assert!(err.to_string().contains("Not ready"));
    }
}
