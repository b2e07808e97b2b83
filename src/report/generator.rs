//! The generation lifecycle shared by every report type.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::model::{Project, Volume};
use crate::query::{describe_restrictions, RestrictionLabels};
use crate::restriction::{ExportAreaFilter, Restrictions};
use crate::store::AnnotationStore;

use super::kinds::{self, Job};
use super::registry::{ReportType, SourceKind};
use super::render::{RenderRequest, Renderer};
use super::staged::Staging;

/// What a report is generated for.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Volume(Volume),
    Project(Project),
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Volume(_) => SourceKind::Volume,
            Source::Project(_) => SourceKind::Project,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Source::Volume(volume) => &volume.name,
            Source::Project(project) => &project.name,
        }
    }
}

/// The collaborators of one generation.
pub struct GenerateContext<'a> {
    pub store: &'a dyn AnnotationStore,
    pub renderer: &'a dyn Renderer,
    /// Directory staged files are created in.
    pub staging_dir: PathBuf,
    pub export_area: ExportAreaFilter,
}

impl<'a> GenerateContext<'a> {
    pub fn new(store: &'a dyn AnnotationStore, renderer: &'a dyn Renderer) -> Self {
        Self {
            store,
            renderer,
            staging_dir: std::env::temp_dir(),
            export_area: ExportAreaFilter::default(),
        }
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_export_area(mut self, filter: ExportAreaFilter) -> Self {
        self.export_area = filter;
        self
    }
}

/// A report type bound to a source kind and a restriction set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportGenerator {
    source_kind: SourceKind,
    report_type: ReportType,
    restrictions: Restrictions,
}

impl ReportGenerator {
    pub fn new(
        source_kind: SourceKind,
        report_type: ReportType,
        restrictions: Restrictions,
    ) -> Self {
        Self {
            source_kind,
            report_type,
            restrictions,
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn restrictions(&self) -> &Restrictions {
        &self.restrictions
    }

    /// The restrictions that appear in this report's name. Image label
    /// reports ignore the annotation restrictions and never mention them.
    pub fn restriction_labels(
        &self,
        store: &dyn AnnotationStore,
    ) -> Result<RestrictionLabels, ReportError> {
        if !self.report_type.reports_annotations() {
            return Ok(RestrictionLabels::default());
        }
        describe_restrictions(store, &self.restrictions)
    }

    /// Display name, e.g. `basic annotation report (restricted to export area)`.
    pub fn name(&self, store: &dyn AnnotationStore) -> Result<String, ReportError> {
        Ok(self
            .restriction_labels(store)?
            .name(self.report_type.base_name()))
    }

    /// Filename without extension, e.g. `basic_annotation_report_restricted_to_export_area`.
    pub fn filename(&self, store: &dyn AnnotationStore) -> Result<String, ReportError> {
        Ok(self
            .restriction_labels(store)?
            .filename(self.report_type.base_filename()))
    }

    pub fn full_filename(&self, store: &dyn AnnotationStore) -> Result<String, ReportError> {
        Ok(format!(
            "{}.{}",
            self.filename(store)?,
            self.report_type.extension()
        ))
    }

    /// Generates the report for `source` and writes it to `path`.
    ///
    /// Configuration errors (a missing or mismatched source, an unknown
    /// annotation session) are returned before anything touches the
    /// filesystem. After that the parent directory of `path` is created if
    /// needed, rows are staged and the renderer is invoked. Staged files are
    /// deleted whether or not generation succeeds; errors are returned
    /// unchanged.
    pub fn generate(
        &self,
        cx: &GenerateContext<'_>,
        source: Option<&Source>,
        path: &Path,
    ) -> Result<PathBuf, ReportError> {
        let source = source.ok_or(ReportError::InvalidSource)?;
        if source.kind() != self.source_kind {
            return Err(ReportError::InvalidSource);
        }
        let name = self.name(cx.store)?;
        tracing::debug!(
            report = self.report_type.name(),
            source = source.name(),
            name = %name,
            "generating report"
        );

        ensure_parent_dir(path)?;

        let mut staging = Staging::new(&cx.staging_dir);
        let result = self
            .stage(cx, source, &mut staging)
            .and_then(|()| self.render(cx, &name, path, &staging));

        let staged = staging.len();
        let removed = staging.cleanup();
        match &result {
            Ok(written) => tracing::info!(
                report = self.report_type.name(),
                source = source.name(),
                path = %written.display(),
                staged,
                "report generated"
            ),
            Err(e) => tracing::warn!(
                report = self.report_type.name(),
                source = source.name(),
                error = %e,
                removed,
                "report generation failed"
            ),
        }
        result
    }

    fn stage(
        &self,
        cx: &GenerateContext<'_>,
        source: &Source,
        staging: &mut Staging,
    ) -> Result<(), ReportError> {
        match source {
            Source::Volume(volume) => {
                let job = self.job(cx, None);
                kinds::produce(self.report_type, &job, volume, staging)
            }
            Source::Project(project) => {
                let volumes = cx.store.project_volumes(project.id)?;
                tracing::debug!(
                    project = %project.id,
                    volumes = volumes.len(),
                    "staging project report"
                );
                for volume in &volumes {
                    let job = self.job(cx, Some(volume.name.as_str()));
                    kinds::produce(self.report_type, &job, volume, staging)?;
                }
                Ok(())
            }
        }
    }

    fn job<'a>(&'a self, cx: &GenerateContext<'a>, title_prefix: Option<&'a str>) -> Job<'a> {
        Job {
            store: cx.store,
            restrictions: &self.restrictions,
            export_area: cx.export_area,
            title_prefix,
        }
    }

    fn render(
        &self,
        cx: &GenerateContext<'_>,
        name: &str,
        path: &Path,
        staging: &Staging,
    ) -> Result<PathBuf, ReportError> {
        cx.renderer.render(&RenderRequest {
            script: self.report_type.script(),
            title: name,
            target: path,
            files: staging.paths(),
        })
    }
}

/// Creates the parent directory of `path` unless it already exists.
fn ensure_parent_dir(path: &Path) -> Result<(), ReportError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|source| ReportError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_parent_dir_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("a").join("b").join("report.pdf");

        ensure_parent_dir(&target).expect("first");
        ensure_parent_dir(&target).expect("second");
        assert!(target.parent().expect("parent").is_dir());
    }

    #[test]
    fn test_bare_filename_needs_no_dir() {
        ensure_parent_dir(Path::new("report.pdf")).expect("no parent");
    }

    #[test]
    fn test_source_kind() {
        let volume = Source::Volume(Volume::new(1u64, "v"));
        assert_eq!(volume.kind(), SourceKind::Volume);
        assert_eq!(volume.name(), "v");
    }
}
