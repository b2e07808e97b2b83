//! Access to the persisted annotation store.
//!
//! The report engine never owns the data it reports on. Everything it reads
//! goes through [`AnnotationStore`], which hands out joined rows as lazy,
//! ordered streams and annotation geometry in bounded chunks.
//! [`Catalog`] is an in-memory implementation loaded from a JSON document.

mod catalog;
pub mod io_json;

pub use catalog::{Catalog, CatalogData};

use thiserror::Error;

use crate::model::{
    AnnotationId, AnnotationLabelId, AnnotationSession, AnnotationSessionId, ImageId,
    ImageLabelId, Label, LabelId, LabelTree, LabelTreeId, Project, ProjectId, ShapeKind,
    Timestamp, User, UserId, Volume, VolumeId,
};

/// Failure reported by a store backend.
#[derive(Debug, Error)]
#[error("annotation store failure: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A lazy stream of rows. Rows are produced one at a time; a backend error
/// ends the stream.
pub type RowStream<'a, T> = Box<dyn Iterator<Item = Result<T, StoreError>> + 'a>;

/// Identifier and geometry of one annotation, as read by the export area scan.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationGeometry {
    pub id: AnnotationId,
    pub points: Vec<f64>,
}

/// One annotation label joined with its annotation, label and image.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationLabelRow {
    pub annotation_label_id: AnnotationLabelId,
    pub annotation_id: AnnotationId,
    pub annotation_created_at: Timestamp,
    pub shape: ShapeKind,
    pub points: Vec<f64>,
    pub image_id: ImageId,
    pub filename: String,
    pub image_attrs: Option<serde_json::Value>,
    pub label_id: LabelId,
    pub label_name: String,
    pub label_color: String,
    pub label_tree_id: LabelTreeId,
    pub user_id: UserId,
    pub created_at: Timestamp,
}

/// One image label joined with its label and image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLabelRow {
    pub image_label_id: ImageLabelId,
    pub image_id: ImageId,
    pub filename: String,
    /// `(longitude, latitude)` of the image, if known.
    pub image_location: Option<(f64, f64)>,
    pub label_id: LabelId,
    pub label_name: String,
    pub label_color: String,
    pub label_tree_id: LabelTreeId,
    pub user_id: UserId,
    pub created_at: Timestamp,
}

/// Rows that carry a label assigned by a user.
///
/// Label filtering and grouping work the same for annotation labels and
/// image labels through this trait.
pub trait LabeledRow {
    fn label_id(&self) -> LabelId;
    fn label_tree_id(&self) -> LabelTreeId;
    fn user_id(&self) -> UserId;
}

impl LabeledRow for AnnotationLabelRow {
    fn label_id(&self) -> LabelId {
        self.label_id
    }

    fn label_tree_id(&self) -> LabelTreeId {
        self.label_tree_id
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl LabeledRow for ImageLabelRow {
    fn label_id(&self) -> LabelId {
        self.label_id
    }

    fn label_tree_id(&self) -> LabelTreeId {
        self.label_tree_id
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Read access to the annotation store.
///
/// Ordering is part of the contract: the report engine relies on it to
/// de-duplicate labels and to emit rows deterministically.
pub trait AnnotationStore {
    fn volume(&self, id: VolumeId) -> Result<Option<Volume>, StoreError>;

    fn project(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;

    /// Volumes of a project in ascending ID order.
    fn project_volumes(&self, id: ProjectId) -> Result<Vec<Volume>, StoreError>;

    /// At most `limit` annotations of the volume with an ID greater than
    /// `after`, in ascending ID order.
    fn annotation_geometry_chunk(
        &self,
        volume: VolumeId,
        after: Option<AnnotationId>,
        limit: usize,
    ) -> Result<Vec<AnnotationGeometry>, StoreError>;

    /// All annotation labels of the volume, ordered by annotation ID and then
    /// annotation label ID.
    fn annotation_label_rows(&self, volume: VolumeId) -> RowStream<'_, AnnotationLabelRow>;

    /// All image labels of the volume, ordered by image ID and then image
    /// label ID.
    fn image_label_rows(&self, volume: VolumeId) -> RowStream<'_, ImageLabelRow>;

    /// The labels with the given IDs. Unknown IDs are skipped.
    fn labels(&self, ids: &[LabelId]) -> Result<Vec<Label>, StoreError>;

    /// Direct children of the given labels.
    fn child_labels(&self, parents: &[LabelId]) -> Result<Vec<Label>, StoreError>;

    fn label_trees(&self, ids: &[LabelTreeId]) -> Result<Vec<LabelTree>, StoreError>;

    fn users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;

    fn annotation_session(
        &self,
        id: AnnotationSessionId,
    ) -> Result<Option<AnnotationSession>, StoreError>;
}
