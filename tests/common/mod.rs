#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use annoreport::model::{
    Annotation, AnnotationId, AnnotationLabel, AnnotationLabelId, AnnotationSession,
    AnnotationSessionId, ExportArea, Image, ImageId, ImageLabel, ImageLabelId, Label, LabelId,
    LabelTree, LabelTreeId, Project, ProjectId, ShapeKind, Timestamp, User, UserId, Volume,
    VolumeId,
};
use annoreport::report::{RenderRequest, Renderer};
use annoreport::store::{
    AnnotationGeometry, AnnotationLabelRow, AnnotationStore, Catalog, CatalogData, ImageLabelRow,
    RowStream, StoreError,
};
use annoreport::ReportError;
use chrono::{TimeZone, Utc};

pub const ROOT: LabelId = LabelId(1);
pub const CHILD: LabelId = LabelId(2);
pub const GRANDCHILD: LabelId = LabelId(3);
pub const OTHER: LabelId = LabelId(4);
pub const SAND: LabelId = LabelId(10);

pub const JOE: UserId = UserId(1);
pub const JANE: UserId = UserId(2);

pub const DIVE_1: VolumeId = VolumeId(1);
pub const DIVE_2: VolumeId = VolumeId(2);
pub const SURVEY: ProjectId = ProjectId(1);

pub fn at(minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, minute, 0).unwrap()
}

/// Builds catalogs for integration tests.
///
/// The base catalog has two label trees ("Animals" with Root > Child >
/// Grandchild plus Other, and "Habitat" with Sand), two users, and a project
/// "survey" with volumes "dive 1" (images a.jpg, b.jpg) and "dive 2"
/// (image c.jpg). Annotations and labels are added per test.
pub struct Fixture {
    pub data: CatalogData,
    next_annotation: u64,
    next_annotation_label: u64,
    next_image_label: u64,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        let data = CatalogData {
            projects: vec![Project::new(1u64, "survey", [DIVE_1, DIVE_2])],
            volumes: vec![Volume::new(1u64, "dive 1"), Volume::new(2u64, "dive 2")],
            images: vec![
                Image::new(1u64, 1u64, "a.jpg"),
                Image::new(2u64, 1u64, "b.jpg"),
                Image::new(3u64, 2u64, "c.jpg"),
            ],
            label_trees: vec![
                LabelTree {
                    id: LabelTreeId(1),
                    name: "Animals".into(),
                },
                LabelTree {
                    id: LabelTreeId(2),
                    name: "Habitat".into(),
                },
            ],
            labels: vec![
                Label::new(ROOT, "Root", "ff0000", 1u64),
                Label::new(CHILD, "Child", "00ff00", 1u64).with_parent(ROOT),
                Label::new(GRANDCHILD, "Grandchild", "0000ff", 1u64).with_parent(CHILD),
                Label::new(OTHER, "Other", "cccccc", 1u64),
                Label::new(SAND, "Sand", "c2b280", 2u64),
            ],
            users: vec![
                User {
                    id: JOE,
                    firstname: "Joe".into(),
                    lastname: "User".into(),
                },
                User {
                    id: JANE,
                    firstname: "Jane".into(),
                    lastname: "Doe".into(),
                },
            ],
            ..Default::default()
        };

        Self {
            data,
            next_annotation: 1,
            next_annotation_label: 1,
            next_image_label: 1,
        }
    }

    pub fn export_area(mut self, volume: VolumeId, area: ExportArea) -> Self {
        for v in &mut self.data.volumes {
            if v.id == volume {
                v.export_area = Some(area);
            }
        }
        self
    }

    /// Places `image` at the given longitude and latitude.
    pub fn locate(mut self, image: u64, lng: f64, lat: f64) -> Self {
        for i in &mut self.data.images {
            if i.id == ImageId(image) {
                *i = i.clone().with_location(lng, lat);
            }
        }
        self
    }

    pub fn annotation(&mut self, image: u64, points: &[f64]) -> AnnotationId {
        self.shaped_annotation(image, ShapeKind::Point, points, at(0))
    }

    pub fn shaped_annotation(
        &mut self,
        image: u64,
        shape: ShapeKind,
        points: &[f64],
        created_at: Timestamp,
    ) -> AnnotationId {
        let id = AnnotationId(self.next_annotation);
        self.next_annotation += 1;
        self.data.annotations.push(Annotation {
            id,
            image_id: ImageId(image),
            shape,
            points: points.to_vec(),
            created_at,
        });
        id
    }

    pub fn label(
        &mut self,
        annotation: AnnotationId,
        label: LabelId,
        user: UserId,
        created_at: Timestamp,
    ) -> AnnotationLabelId {
        let id = AnnotationLabelId(self.next_annotation_label);
        self.next_annotation_label += 1;
        self.data.annotation_labels.push(AnnotationLabel {
            id,
            annotation_id: annotation,
            label_id: label,
            user_id: user,
            created_at,
        });
        id
    }

    /// Adds a point annotation on `image` with one label by Joe.
    pub fn labeled(&mut self, image: u64, label: LabelId) -> AnnotationId {
        let annotation = self.annotation(image, &[5.0, 5.0]);
        self.label(annotation, label, JOE, at(1));
        annotation
    }

    pub fn image_label(&mut self, image: u64, label: LabelId, user: UserId) -> ImageLabelId {
        let id = ImageLabelId(self.next_image_label);
        self.next_image_label += 1;
        self.data.image_labels.push(ImageLabel {
            id,
            image_id: ImageId(image),
            label_id: label,
            user_id: user,
            created_at: at(2),
        });
        id
    }

    pub fn session(
        &mut self,
        id: u64,
        name: &str,
        window: (Timestamp, Timestamp),
        users: &[UserId],
    ) -> AnnotationSessionId {
        let id = AnnotationSessionId(id);
        self.data.annotation_sessions.push(AnnotationSession {
            id,
            volume_id: DIVE_1,
            name: name.into(),
            starts_at: window.0,
            ends_at: window.1,
            users: users.iter().copied().collect(),
        });
        id
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.data.clone()).expect("fixture catalog is consistent")
    }
}

/// Delegates to a catalog but fails the annotation label stream after
/// `fail_after` rows, for every volume or only for `volume`.
pub struct FailingStore {
    pub inner: Catalog,
    pub fail_after: usize,
    pub volume: Option<VolumeId>,
}

impl AnnotationStore for FailingStore {
    fn volume(&self, id: VolumeId) -> Result<Option<Volume>, StoreError> {
        self.inner.volume(id)
    }

    fn project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        self.inner.project(id)
    }

    fn project_volumes(&self, id: ProjectId) -> Result<Vec<Volume>, StoreError> {
        self.inner.project_volumes(id)
    }

    fn annotation_geometry_chunk(
        &self,
        volume: VolumeId,
        after: Option<AnnotationId>,
        limit: usize,
    ) -> Result<Vec<AnnotationGeometry>, StoreError> {
        self.inner.annotation_geometry_chunk(volume, after, limit)
    }

    fn annotation_label_rows(&self, volume: VolumeId) -> RowStream<'_, AnnotationLabelRow> {
        if self.volume.is_some_and(|v| v != volume) {
            return self.inner.annotation_label_rows(volume);
        }
        let failure = std::iter::once(Err(StoreError::new("connection reset")));
        Box::new(
            self.inner
                .annotation_label_rows(volume)
                .take(self.fail_after)
                .chain(failure),
        )
    }

    fn image_label_rows(&self, volume: VolumeId) -> RowStream<'_, ImageLabelRow> {
        self.inner.image_label_rows(volume)
    }

    fn labels(&self, ids: &[LabelId]) -> Result<Vec<Label>, StoreError> {
        self.inner.labels(ids)
    }

    fn child_labels(&self, parents: &[LabelId]) -> Result<Vec<Label>, StoreError> {
        self.inner.child_labels(parents)
    }

    fn label_trees(&self, ids: &[LabelTreeId]) -> Result<Vec<LabelTree>, StoreError> {
        self.inner.label_trees(ids)
    }

    fn users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        self.inner.users(ids)
    }

    fn annotation_session(
        &self,
        id: AnnotationSessionId,
    ) -> Result<Option<AnnotationSession>, StoreError> {
        self.inner.annotation_session(id)
    }
}

/// A rendered report as seen by [`RecordingRenderer`].
#[derive(Clone, Debug, Default)]
pub struct Rendered {
    pub script: String,
    pub title: String,
    /// Parsed rows of each staged file, in rendering order.
    pub files: Vec<Vec<Vec<String>>>,
    pub paths: Vec<PathBuf>,
}

impl Rendered {
    /// Title row of each staged file.
    pub fn titles(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|rows| rows.first().and_then(|r| r.first()).cloned().unwrap_or_default())
            .collect()
    }
}

/// Captures the staged files and writes a placeholder document.
#[derive(Default)]
pub struct RecordingRenderer {
    pub last: RefCell<Option<Rendered>>,
    pub calls: Cell<usize>,
}

impl RecordingRenderer {
    pub fn rendered(&self) -> Rendered {
        self.last.borrow().clone().expect("renderer was called")
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<PathBuf, ReportError> {
        let files = request.files.iter().map(|p| read_rows(p)).collect();
        self.last.replace(Some(Rendered {
            script: request.script.to_string(),
            title: request.title.to_string(),
            files,
            paths: request.files.iter().map(|p| p.to_path_buf()).collect(),
        }));
        self.calls.set(self.calls.get() + 1);
        fs::write(request.target, b"rendered")?;
        Ok(request.target.to_path_buf())
    }
}

/// Always fails like a crashing report script.
pub struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<PathBuf, ReportError> {
        Err(ReportError::Render {
            script: request.script.to_string(),
            status: "exit status: 1".to_string(),
            stderr: "Traceback (most recent call last)".to_string(),
        })
    }
}

pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .expect("staged file is readable");
    reader
        .records()
        .map(|r| r.expect("valid row").iter().map(str::to_string).collect())
        .collect()
}

pub fn dir_is_empty(path: &Path) -> bool {
    fs::read_dir(path).map(|mut d| d.next().is_none()).unwrap_or(true)
}
