//! Command-line interface for ogrconv, a parameter model and launcher for
//! `ogr2ogr` vector conversions.
//!
//! This binary is the reference presentation layer over the
//! [`ogrconv_core`] parameter model: it maps command-line flags onto model
//! mutations, prints the derived tool invocation, and launches conversions
//! through the process runner.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for
//! structured logging. Every subcommand drives the same model the way a
//! desktop form would: mutate a selection, let the model recompute, read the
//! derived state back.
//!
//! # Available Commands
//!
//! - `formats` - List the format catalogs
//! - `projections` - List the EPSG projection catalog
//! - `inspect` - Open a source dataset and report what it is
//! - `preview` - Print the derived tool invocation without running it
//! - `run` - Launch the conversion tool, one invocation per entry

use anyhow::{Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{Level, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use ogrconv_core::catalog::{self, SourceKind, TargetKind};
use ogrconv_core::command::WriteMode;
use ogrconv_core::error::OgrConvError;
use ogrconv_core::inspect::{DatasetInspector, NoopInspector, OgrInfoInspector};
use ogrconv_core::model::{ConversionModel, SourceInput};
use ogrconv_core::projection;
use ogrconv_core::run::ToolRunner;

mod display;

#[derive(Parser)]
#[command(
    name = "ogrconv",
    version,
    about = "Parameter model and launcher for ogr2ogr conversions",
    long_about = "ogrconv assembles ogr2ogr invocations from source/target selections\n\
                  and launches the tool, one invocation per resolved source entry."
)]
/// Command-line arguments and options for the ogrconv CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the ogrconv CLI.
#[derive(Subcommand)]
enum Commands {
    /// Lists the format catalogs: vector file formats, database backends,
    /// and web-service backends.
    Formats {
        /// Restrict the listing to one catalog.
        #[arg(long, value_enum)]
        kind: Option<CatalogKind>,
    },

    /// Lists the EPSG projection catalog.
    Projections {
        /// Substring filter on code or description.
        #[arg(value_name = "FILTER")]
        filter: Option<String>,
    },

    /// Opens a source dataset and reports its coordinate system and
    /// suggested query.
    Inspect {
        /// Path, connection string, or URI of the dataset.
        #[arg(value_name = "LOCATION")]
        location: String,

        /// Treat the location as a web-service URI for the named backend.
        #[arg(long, value_name = "NAME")]
        web_service: Option<String>,
    },

    /// Prints the derived tool invocation per entry without running it.
    Preview {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Launches the conversion tool, one invocation per resolved entry.
    ///
    /// One failing entry never aborts the remaining queued entries; the exit
    /// code is non-zero when at least one entry failed.
    Run {
        #[command(flatten)]
        selection: SelectionArgs,

        /// The conversion tool executable to launch.
        #[arg(long, value_name = "PATH", default_value = "ogr2ogr")]
        tool: String,
    },
}

/// Which format catalog to list.
#[derive(Clone, Copy, ValueEnum)]
enum CatalogKind {
    File,
    Database,
    WebService,
}

/// Source kinds as command-line values.
#[derive(Clone, Copy, ValueEnum)]
enum SourceKindArg {
    File,
    Folder,
    Database,
    WebService,
}

impl From<SourceKindArg> for SourceKind {
    fn from(value: SourceKindArg) -> Self {
        match value {
            SourceKindArg::File => SourceKind::File,
            SourceKindArg::Folder => SourceKind::Folder,
            SourceKindArg::Database => SourceKind::Database,
            SourceKindArg::WebService => SourceKind::WebService,
        }
    }
}

/// Target kinds as command-line values.
#[derive(Clone, Copy, ValueEnum)]
enum TargetKindArg {
    File,
    Folder,
    Database,
}

impl From<TargetKindArg> for TargetKind {
    fn from(value: TargetKindArg) -> Self {
        match value {
            TargetKindArg::File => TargetKind::File,
            TargetKindArg::Folder => TargetKind::Folder,
            TargetKindArg::Database => TargetKind::Database,
        }
    }
}

/// Write modes as command-line values.
#[derive(Clone, Copy, ValueEnum)]
enum WriteModeArg {
    Overwrite,
    Append,
    Update,
}

impl From<WriteModeArg> for WriteMode {
    fn from(value: WriteModeArg) -> Self {
        match value {
            WriteModeArg::Overwrite => WriteMode::Overwrite,
            WriteModeArg::Append => WriteMode::Append,
            WriteModeArg::Update => WriteMode::Update,
        }
    }
}

/// Shared selection flags mapped onto the parameter model.
#[derive(Args)]
struct SelectionArgs {
    /// Source kind.
    #[arg(long, value_enum, default_value = "file")]
    from: SourceKindArg,

    /// Source path, connection string, or URI.
    #[arg(long, value_name = "LOCATION")]
    source: Option<String>,

    /// Database table to convert; repeat for several tables.
    #[arg(long, value_name = "NAME")]
    table: Vec<String>,

    /// Source format name.
    #[arg(long, value_name = "FORMAT")]
    source_format: Option<String>,

    /// SQL restriction on the source dataset.
    #[arg(long, value_name = "SQL")]
    query: Option<String>,

    /// Target kind.
    #[arg(long, value_enum)]
    to: Option<TargetKindArg>,

    /// Target path or connection string.
    #[arg(long, value_name = "LOCATION")]
    target: Option<String>,

    /// Target format name.
    #[arg(long, value_name = "FORMAT")]
    target_format: Option<String>,

    /// Reproject to this EPSG code (resolved against the catalog).
    #[arg(long, value_name = "CODE")]
    t_srs: Option<String>,

    /// How an existing target is treated.
    #[arg(long, value_enum)]
    mode: Option<WriteModeArg>,

    /// Free-text arguments appended verbatim to the tool invocation.
    #[arg(long, value_name = "TEXT")]
    extra: Option<String>,

    /// Inspect the source with ogrinfo to detect its projection and a
    /// suggested query.
    #[arg(long)]
    inspect: bool,
}

/// Entry point for the ogrconv command-line interface.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system
/// cannot be initialized.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true) // Show module paths for better context
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Formats { kind } => {
            handle_formats(kind);
        },
        Commands::Projections { filter } => {
            handle_projections(filter.as_deref());
        },
        Commands::Inspect {
            location,
            web_service,
        } => {
            handle_inspect(&location, web_service.as_deref())?;
        },
        Commands::Preview { selection } => {
            handle_preview(&selection)?;
        },
        Commands::Run { selection, tool } => {
            info!("Running conversion through {tool}");
            handle_run(&selection, &tool).await?;
        },
    }

    Ok(())
}

fn handle_formats(kind: Option<CatalogKind>) {
    match kind {
        Some(CatalogKind::File) => {
            display::display_formats("Vector file formats", catalog::vector_formats());
        },
        Some(CatalogKind::Database) => {
            display::display_formats("Database backends", catalog::database_backends());
        },
        Some(CatalogKind::WebService) => {
            display::display_formats("Web services", catalog::web_services());
        },
        None => {
            display::display_formats("Vector file formats", catalog::vector_formats());
            display::display_formats("Database backends", catalog::database_backends());
            display::display_formats("Web services", catalog::web_services());
        },
    }
}

fn handle_projections(filter: Option<&str>) {
    let filter = filter.map(str::to_ascii_lowercase);
    let entries: Vec<_> = projection::projections()
        .iter()
        .skip(1) // reserved "no projection" entry
        .filter(|p| {
            filter.as_deref().is_none_or(|f| {
                p.code.to_string().contains(f) || p.description.to_ascii_lowercase().contains(f)
            })
        })
        .collect();

    display::display_projections(&entries);
}

fn handle_inspect(location: &str, web_service: Option<&str>) -> Result<()> {
    let name = match web_service {
        Some(service) => {
            let services = catalog::web_services();
            let index = catalog::find_format(services, service)
                .ok_or_else(|| anyhow!("Unknown web-service backend '{service}'"))?;
            format!("{}{location}", services[index].tag)
        },
        None => location.to_string(),
    };

    let inspector = OgrInfoInspector::default();
    let report = inspector.inspect(&name).map_err(|e| {
        let e = OgrConvError::from(e);
        match e.recovery_suggestion() {
            Some(suggestion) => anyhow!("{}\n{suggestion}", e.user_message()),
            None => anyhow!("{}", e.user_message()),
        }
    })?;

    display::display_inspection(&name, &report);
    Ok(())
}

/// Drives the parameter model from the shared selection flags.
///
/// Catalog misses abort with the model's message; inspection failures are
/// printed and the flow continues with the dependent fields cleared.
fn build_model(selection: &SelectionArgs) -> Result<ConversionModel> {
    let inspector: Box<dyn DatasetInspector> = if selection.inspect {
        Box::new(OgrInfoInspector::default())
    } else {
        Box::new(NoopInspector)
    };
    let mut model = ConversionModel::new(inspector);

    model.set_source_kind(selection.from.into());

    if let Some(format) = &selection.source_format {
        model.set_source_format(format).map_err(user_error)?;
    }

    if let Some(source) = &selection.source {
        let input = match model.source().kind {
            SourceKind::File => SourceInput::Path(source.clone()),
            SourceKind::Folder => SourceInput::Folder(source.clone()),
            SourceKind::Database => SourceInput::Database {
                connection: source.clone(),
                tables: selection.table.clone(),
            },
            SourceKind::WebService => SourceInput::Uri(source.clone()),
        };
        if let Err(e) = model.set_source_location(&input) {
            eprintln!("{}", e.user_message());
            if let Some(suggestion) = e.recovery_suggestion() {
                eprintln!("{suggestion}");
            }
        }
    }

    if let Some(query) = &selection.query {
        model.set_source_query(query);
    }

    if let Some(to) = selection.to {
        model.set_target_kind(to.into()).map_err(user_error)?;
    }

    if let Some(format) = &selection.target_format {
        model.set_target_format(format).map_err(user_error)?;
    }

    if let Some(target) = &selection.target {
        model.set_target_location(target);
    }

    if let Some(code) = &selection.t_srs {
        model.set_target_projection_text(code).map_err(user_error)?;
    }

    if let Some(mode) = selection.mode {
        model.set_write_mode(mode.into());
    }

    if let Some(extra) = &selection.extra {
        model.set_extra_args(extra);
    }

    Ok(model)
}

fn user_error(e: OgrConvError) -> anyhow::Error {
    match e.recovery_suggestion() {
        Some(suggestion) => anyhow!("{}\n{suggestion}", e.user_message()),
        None => anyhow!("{}", e.user_message()),
    }
}

fn print_advisories(model: &ConversionModel) {
    for advisory in model.advisories() {
        eprintln!("advisory: {advisory}");
    }
}

fn handle_preview(selection: &SelectionArgs) -> Result<()> {
    let model = build_model(selection)?;
    print_advisories(&model);

    let tasks = model.tasks();
    if tasks.is_empty() {
        println!("ogr2ogr {}", model.command_line());
    } else {
        for task in &tasks {
            println!("ogr2ogr {}", task.arguments);
        }
    }

    Ok(())
}

async fn handle_run(selection: &SelectionArgs, tool: &str) -> Result<()> {
    let model = build_model(selection)?;
    print_advisories(&model);

    let report = model
        .execute(&ToolRunner, tool)
        .await
        .map_err(user_error)?;
    display::display_report(&report);

    if !report.all_succeeded() {
        bail!(
            "{} of {} entries failed",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_selection() -> SelectionArgs {
        SelectionArgs {
            from: SourceKindArg::File,
            source: None,
            table: Vec::new(),
            source_format: None,
            query: None,
            to: None,
            target: None,
            target_format: None,
            t_srs: None,
            mode: None,
            extra: None,
            inspect: false,
        }
    }

    #[test]
    fn test_build_model_defaults() {
        let model = build_model(&empty_selection()).unwrap();
        assert_eq!(model.source().kind, SourceKind::File);
        assert_eq!(model.target().kind, TargetKind::File);
    }

    #[test]
    fn test_build_model_full_selection() {
        let selection = SelectionArgs {
            source: Some("/data/a.shp".to_string()),
            target: Some("/out/a.geojson".to_string()),
            target_format: Some("GeoJSON".to_string()),
            t_srs: Some("4326".to_string()),
            mode: Some(WriteModeArg::Append),
            ..empty_selection()
        };
        let model = build_model(&selection).unwrap();
        assert_eq!(
            model.command_line(),
            r#"-f "GeoJSON" "/out/a.geojson" "/data/a.shp" -T_SRS EPSG:4326 -append"#
        );
    }

    #[test]
    fn test_build_model_rejects_unknown_format() {
        let selection = SelectionArgs {
            target_format: Some("NoSuchFormat".to_string()),
            ..empty_selection()
        };
        let err = build_model(&selection).unwrap_err();
        assert!(err.to_string().contains("Unknown"));
    }

    #[test]
    fn test_build_model_rejects_disallowed_target() {
        let selection = SelectionArgs {
            from: SourceKindArg::WebService,
            to: Some(TargetKindArg::File),
            ..empty_selection()
        };
        let err = build_model(&selection).unwrap_err();
        assert!(err.to_string().contains("cannot write"));
    }

    #[tokio::test]
    async fn test_handle_run_not_ready() {
        let err = handle_run(&empty_selection(), "ogr2ogr").await.unwrap_err();
        assert!(err.to_string().contains("Not ready"));
    }
}
