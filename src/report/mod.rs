//! Report generation.
//!
//! A [`ReportGenerator`] is resolved through the [`registry`] from a source
//! kind and a report type name, then run against a [`Source`]. Each
//! generation stages its rows in temporary tabular files, hands them to a
//! [`Renderer`] and removes them again.
//!
//! ```no_run
//! use annoreport::report::{registry, CsvRenderer, GenerateContext, Source, SourceKind};
//! use annoreport::restriction::ReportOptions;
//! use annoreport::store::{io_json, AnnotationStore};
//! use annoreport::model::VolumeId;
//! use std::path::Path;
//!
//! let catalog = io_json::read_catalog_json(Path::new("catalog.json"))?;
//! let volume = catalog.volume(VolumeId::new(1))?.expect("volume exists");
//!
//! let generator = registry::require(SourceKind::Volume, "annotations-csv")?
//!     .build(&ReportOptions::default())?;
//! let cx = GenerateContext::new(&catalog, &CsvRenderer);
//! generator.generate(&cx, Some(&Source::Volume(volume)), Path::new("out/report.csv"))?;
//! # Ok::<(), annoreport::ReportError>(())
//! ```

mod generator;
mod kinds;
pub mod registry;
mod render;
mod staged;

pub use generator::{GenerateContext, ReportGenerator, Source};
pub use registry::{GeneratorFactory, ReportType, SourceKind};
pub use render::{CsvRenderer, RenderRequest, Renderer, ScriptRenderer};
pub use staged::{StagedFile, StagedTabularWriter, Staging};
