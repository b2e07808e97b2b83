//! Annoreport: restricted annotation reports for image volumes and projects.
//!
//! Annoreport reads annotations, labels and image labels through an
//! [`store::AnnotationStore`], narrows them by a set of restrictions (export
//! area, annotation session, newest label, label subset), optionally splits
//! them by label tree or user, and renders the result through a
//! [`report::Renderer`].
//!
//! # Modules
//!
//! - [`model`]: Entities and newtype IDs (Volume, Annotation, Label, etc.)
//! - [`store`]: The store trait and the in-memory JSON catalog
//! - [`restriction`]: Report options, restriction predicates, export area filter
//! - [`query`]: Restricted row streams, label hierarchies, grouping, naming
//! - [`report`]: Report types, registry, generation lifecycle, renderers
//! - [`config`]: Runtime configuration
//! - [`error`]: Error types for annoreport operations

pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod report;
pub mod restriction;
pub mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use error::ReportError;

use config::Config;
use model::{ProjectId, VolumeId};
use report::{registry, CsvRenderer, GenerateContext, Renderer, Source, SourceKind};
use restriction::ReportOptions;
use store::{io_json, AnnotationStore};

/// The annoreport CLI application.
#[derive(Parser)]
#[command(name = "annoreport")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, env = "ANNOREPORT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the available report types.
    Types(TypesArgs),
    /// Generate a report for a volume or a project.
    Generate(GenerateArgs),
    /// Print the annotations a volume's export area excludes.
    SkipIds(SkipIdsArgs),
}

#[derive(clap::Args)]
struct TypesArgs {
    /// Print as JSON.
    #[arg(long)]
    json: bool,
}

/// Arguments for the generate subcommand.
#[derive(clap::Args)]
struct GenerateArgs {
    /// Catalog JSON file.
    #[arg(long)]
    catalog: PathBuf,

    /// Volume to report on.
    #[arg(long, conflicts_with = "project")]
    volume: Option<u64>,

    /// Project to report on.
    #[arg(long)]
    project: Option<u64>,

    /// Report type name (see `annoreport types`).
    #[arg(long = "type")]
    report_type: String,

    /// Report options as a JSON object, e.g. '{"exportArea": true}'.
    #[arg(long)]
    options: Option<String>,

    /// How staged files are turned into the finished document.
    #[arg(long, value_enum, default_value_t = RendererKind::Script)]
    renderer: RendererKind,

    /// Path of the finished document.
    #[arg(long)]
    output: PathBuf,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RendererKind {
    /// Run the report's Python script.
    Script,
    /// Concatenate the staged CSV files.
    Csv,
}

#[derive(clap::Args)]
struct SkipIdsArgs {
    /// Catalog JSON file.
    #[arg(long)]
    catalog: PathBuf,

    /// Volume whose export area is applied.
    #[arg(long)]
    volume: u64,
}

/// Run the annoreport CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ReportError> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Types(args)) => run_types(args),
        Some(Commands::Generate(args)) => run_generate(args, &config),
        Some(Commands::SkipIds(args)) => run_skip_ids(args, &config),
        None => {
            println!("annoreport {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Restricted annotation reports for volumes and projects.");
            println!();
            println!("Run 'annoreport --help' for usage information.");
            Ok(())
        }
    }
}

fn run_types(args: TypesArgs) -> Result<(), ReportError> {
    if args.json {
        let entries: Vec<serde_json::Value> = registry::DECLARED
            .iter()
            .map(|(kind, report_type)| {
                serde_json::json!({
                    "source": kind,
                    "type": report_type.name(),
                    "name": report_type.base_name(),
                    "extension": report_type.extension(),
                })
            })
            .collect();
        println!("{:#}", serde_json::Value::Array(entries));
        return Ok(());
    }

    for (kind, report_type) in registry::DECLARED {
        println!(
            "{:<8} {:<22} {} (.{})",
            kind,
            report_type.name(),
            report_type.base_name(),
            report_type.extension()
        );
    }
    Ok(())
}

fn run_generate(args: GenerateArgs, config: &Config) -> Result<(), ReportError> {
    let source_kind = if args.project.is_some() {
        SourceKind::Project
    } else {
        SourceKind::Volume
    };
    let factory = registry::require(source_kind, &args.report_type)?;
    let options = match &args.options {
        Some(json) => ReportOptions::from_json_str(json)?,
        None => ReportOptions::default(),
    };
    let generator = factory.build(&options)?;

    let catalog = io_json::read_catalog_json(&args.catalog)?;
    let source = match (args.volume, args.project) {
        (Some(id), _) => catalog.volume(VolumeId::new(id))?.map(Source::Volume),
        (None, Some(id)) => catalog.project(ProjectId::new(id))?.map(Source::Project),
        (None, None) => None,
    };

    let script = config.script_renderer();
    let renderer: &dyn Renderer = match args.renderer {
        RendererKind::Script => &script,
        RendererKind::Csv => &CsvRenderer,
    };
    let cx = GenerateContext::new(&catalog, renderer)
        .with_staging_dir(config.staging_dir())
        .with_export_area(config.export_area_filter());

    let name = generator.name(&catalog)?;
    let path = generator.generate(&cx, source.as_ref(), &args.output)?;

    if args.json {
        let result = serde_json::json!({
            "type": factory.report_type().name(),
            "source": source_kind,
            "name": name,
            "filename": generator.full_filename(&catalog)?,
            "path": path.display().to_string(),
        });
        println!("{:#}", result);
    } else {
        println!("Generated {} at {}", name, path.display());
    }
    Ok(())
}

fn run_skip_ids(args: SkipIdsArgs, config: &Config) -> Result<(), ReportError> {
    let catalog = io_json::read_catalog_json(&args.catalog)?;
    let volume = catalog
        .volume(VolumeId::new(args.volume))?
        .ok_or(ReportError::InvalidSource)?;

    let mut ids: Vec<_> = config
        .export_area_filter()
        .skip_ids(&catalog, &volume)?
        .into_iter()
        .collect();
    ids.sort_unstable();

    for id in ids {
        println!("{}", id);
    }
    Ok(())
}
