//! Report types and the registry resolving them to generators.

use std::fmt;

use serde::Serialize;

use crate::error::ReportError;
use crate::restriction::ReportOptions;

use super::generator::ReportGenerator;

/// The kind of source a report is generated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Volume,
    Project,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::Volume, SourceKind::Project];

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Volume => "volume",
            SourceKind::Project => "project",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The report types. Each variant produces its own rows; see
/// [`ReportType::name`] for the identifiers callers select them by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    /// Label counts: name, color, count.
    AnnotationsBasic,
    /// Annotation counts per image and label.
    AnnotationsExtended,
    /// One row per annotation label with shape, points and image attributes.
    AnnotationsFull,
    /// Every column of every annotation label.
    AnnotationsCsv,
    /// The labels of each image.
    ImageLabelsBasic,
    /// Every column of every image label.
    ImageLabelsCsv,
    /// Position and labels of each image with a known location.
    ImageLabelsLocation,
}

impl ReportType {
    pub const ALL: [ReportType; 7] = [
        ReportType::AnnotationsBasic,
        ReportType::AnnotationsExtended,
        ReportType::AnnotationsFull,
        ReportType::AnnotationsCsv,
        ReportType::ImageLabelsBasic,
        ReportType::ImageLabelsCsv,
        ReportType::ImageLabelsLocation,
    ];

    /// Identifier of the report type, e.g. `annotations-basic`.
    pub fn name(&self) -> &'static str {
        match self {
            ReportType::AnnotationsBasic => "annotations-basic",
            ReportType::AnnotationsExtended => "annotations-extended",
            ReportType::AnnotationsFull => "annotations-full",
            ReportType::AnnotationsCsv => "annotations-csv",
            ReportType::ImageLabelsBasic => "image-labels-basic",
            ReportType::ImageLabelsCsv => "image-labels-csv",
            ReportType::ImageLabelsLocation => "image-labels-location",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Name of the report for use in text.
    pub fn base_name(&self) -> &'static str {
        match self {
            ReportType::AnnotationsBasic => "basic annotation report",
            ReportType::AnnotationsExtended => "extended annotation report",
            ReportType::AnnotationsFull => "full annotation report",
            ReportType::AnnotationsCsv => "CSV annotation report",
            ReportType::ImageLabelsBasic => "basic image label report",
            ReportType::ImageLabelsCsv => "CSV image label report",
            ReportType::ImageLabelsLocation => "image location image label report",
        }
    }

    /// Name of the report for use as (part of) a filename.
    pub fn base_filename(&self) -> &'static str {
        match self {
            ReportType::AnnotationsBasic => "basic_annotation_report",
            ReportType::AnnotationsExtended => "extended_annotation_report",
            ReportType::AnnotationsFull => "full_annotation_report",
            ReportType::AnnotationsCsv => "csv_annotation_report",
            ReportType::ImageLabelsBasic => "basic_image_label_report",
            ReportType::ImageLabelsCsv => "csv_image_label_report",
            ReportType::ImageLabelsLocation => "image_location_image_label_report",
        }
    }

    /// File extension of the finished document.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportType::AnnotationsBasic => "pdf",
            ReportType::AnnotationsExtended
            | ReportType::AnnotationsFull
            | ReportType::ImageLabelsBasic => "xlsx",
            ReportType::AnnotationsCsv | ReportType::ImageLabelsCsv => "csv",
            ReportType::ImageLabelsLocation => "ndjson",
        }
    }

    /// Token the renderer uses to pick its script.
    pub fn script(&self) -> &'static str {
        match self {
            ReportType::AnnotationsBasic => "basic_report",
            ReportType::AnnotationsExtended => "extended_report",
            ReportType::AnnotationsFull => "full_report",
            ReportType::AnnotationsCsv | ReportType::ImageLabelsCsv => "csv_report",
            ReportType::ImageLabelsBasic => "basic_image_label_report",
            ReportType::ImageLabelsLocation => "image_location_report",
        }
    }

    /// Whether export area, session and newest label restrictions apply.
    pub fn reports_annotations(&self) -> bool {
        matches!(
            self,
            ReportType::AnnotationsBasic
                | ReportType::AnnotationsExtended
                | ReportType::AnnotationsFull
                | ReportType::AnnotationsCsv
        )
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every (source kind, report type) pair a generator exists for.
pub const DECLARED: [(SourceKind, ReportType); 14] = [
    (SourceKind::Volume, ReportType::AnnotationsBasic),
    (SourceKind::Volume, ReportType::AnnotationsExtended),
    (SourceKind::Volume, ReportType::AnnotationsFull),
    (SourceKind::Volume, ReportType::AnnotationsCsv),
    (SourceKind::Volume, ReportType::ImageLabelsBasic),
    (SourceKind::Volume, ReportType::ImageLabelsCsv),
    (SourceKind::Volume, ReportType::ImageLabelsLocation),
    (SourceKind::Project, ReportType::AnnotationsBasic),
    (SourceKind::Project, ReportType::AnnotationsExtended),
    (SourceKind::Project, ReportType::AnnotationsFull),
    (SourceKind::Project, ReportType::AnnotationsCsv),
    (SourceKind::Project, ReportType::ImageLabelsBasic),
    (SourceKind::Project, ReportType::ImageLabelsCsv),
    (SourceKind::Project, ReportType::ImageLabelsLocation),
];

/// Builds the generator of one declared report type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorFactory {
    source_kind: SourceKind,
    report_type: ReportType,
}

impl GeneratorFactory {
    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Creates a generator with the restrictions derived from `options`.
    ///
    /// # Errors
    /// [`ReportError::ConflictingRestrictions`] if the options request both
    /// label tree and user separation.
    pub fn build(&self, options: &ReportOptions) -> Result<ReportGenerator, ReportError> {
        Ok(ReportGenerator::new(
            self.source_kind,
            self.report_type,
            options.restrictions()?,
        ))
    }
}

/// Resolves a report type name for a source kind.
///
/// Returns `None` for names or pairs that are not declared. Callers treat
/// that as a configuration error.
pub fn resolve(source_kind: SourceKind, name: &str) -> Option<GeneratorFactory> {
    let report_type = ReportType::from_name(name)?;
    DECLARED
        .contains(&(source_kind, report_type))
        .then_some(GeneratorFactory {
            source_kind,
            report_type,
        })
}

/// Like [`resolve`], but turns a miss into [`ReportError::UnknownReportType`].
pub fn require(source_kind: SourceKind, name: &str) -> Result<GeneratorFactory, ReportError> {
    resolve(source_kind, name).ok_or_else(|| ReportError::UnknownReportType {
        source_kind,
        name: name.to_string(),
    })
}
