//! In-memory annotation store.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AnnotationGeometry, AnnotationLabelRow, AnnotationStore, ImageLabelRow, RowStream,
    StoreError,
};
use crate::error::ReportError;
use crate::model::{
    Annotation, AnnotationId, AnnotationLabel, AnnotationSession, AnnotationSessionId, Image,
    ImageId, ImageLabel, Label, LabelId, LabelTree, LabelTreeId, Project, ProjectId, User, UserId,
    Volume, VolumeId,
};

/// The serialized form of a catalog: flat lists of every record kind.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub label_trees: Vec<LabelTree>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub annotation_labels: Vec<AnnotationLabel>,
    #[serde(default)]
    pub image_labels: Vec<ImageLabel>,
    #[serde(default)]
    pub annotation_sessions: Vec<AnnotationSession>,
}

/// An indexed, read-only annotation store held in memory.
///
/// Indexes are sorted once on construction so that every row stream is lazy
/// and honors the ordering contract of [`AnnotationStore`].
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    projects: BTreeMap<ProjectId, Project>,
    volumes: BTreeMap<VolumeId, Volume>,
    images: HashMap<ImageId, Image>,
    label_trees: BTreeMap<LabelTreeId, LabelTree>,
    labels: BTreeMap<LabelId, Label>,
    children: HashMap<LabelId, Vec<LabelId>>,
    users: BTreeMap<UserId, User>,
    annotations: HashMap<AnnotationId, Annotation>,
    sessions: BTreeMap<AnnotationSessionId, AnnotationSession>,
    // volume -> annotation IDs, ascending
    volume_annotations: HashMap<VolumeId, Vec<AnnotationId>>,
    // volume -> image IDs, ascending
    volume_images: HashMap<VolumeId, Vec<ImageId>>,
    // annotation -> its labels, ascending by ID
    annotation_labels: HashMap<AnnotationId, Vec<AnnotationLabel>>,
    // image -> its labels, ascending by ID
    image_labels: HashMap<ImageId, Vec<ImageLabel>>,
}

impl Catalog {
    /// Builds a catalog from its serialized form, checking references.
    pub fn new(data: CatalogData) -> Result<Self, ReportError> {
        Self::build(data, Path::new("<memory>"))
    }

    pub(super) fn build(data: CatalogData, path: &Path) -> Result<Self, ReportError> {
        let invalid = |message: String| ReportError::CatalogInvalid {
            path: path.to_path_buf(),
            message,
        };

        let mut catalog = Catalog::default();

        for volume in data.volumes {
            if catalog.volumes.insert(volume.id, volume.clone()).is_some() {
                return Err(invalid(format!("duplicate volume ID {}", volume.id)));
            }
        }

        for project in data.projects {
            if let Some(missing) = project
                .volumes
                .iter()
                .find(|id| !catalog.volumes.contains_key(id))
            {
                return Err(invalid(format!(
                    "project {} references non-existent volume {}",
                    project.id, missing
                )));
            }
            let id = project.id;
            if catalog.projects.insert(id, project).is_some() {
                return Err(invalid(format!("duplicate project ID {}", id)));
            }
        }

        for image in data.images {
            if !catalog.volumes.contains_key(&image.volume_id) {
                return Err(invalid(format!(
                    "image {} references non-existent volume {}",
                    image.id, image.volume_id
                )));
            }
            let (id, volume_id) = (image.id, image.volume_id);
            if catalog.images.insert(id, image).is_some() {
                return Err(invalid(format!("duplicate image ID {}", id)));
            }
            catalog.volume_images.entry(volume_id).or_default().push(id);
        }

        for tree in data.label_trees {
            let id = tree.id;
            if catalog.label_trees.insert(id, tree).is_some() {
                return Err(invalid(format!("duplicate label tree ID {}", id)));
            }
        }

        for label in &data.labels {
            if !catalog.label_trees.contains_key(&label.label_tree_id) {
                return Err(invalid(format!(
                    "label {} references non-existent label tree {}",
                    label.id, label.label_tree_id
                )));
            }
            if catalog.labels.insert(label.id, label.clone()).is_some() {
                return Err(invalid(format!("duplicate label ID {}", label.id)));
            }
        }
        for label in data.labels {
            if let Some(parent) = label.parent_id {
                if !catalog.labels.contains_key(&parent) {
                    return Err(invalid(format!(
                        "label {} references non-existent parent {}",
                        label.id, parent
                    )));
                }
                catalog.children.entry(parent).or_default().push(label.id);
            }
        }

        for user in data.users {
            let id = user.id;
            if catalog.users.insert(id, user).is_some() {
                return Err(invalid(format!("duplicate user ID {}", id)));
            }
        }

        for annotation in data.annotations {
            let image = catalog.images.get(&annotation.image_id).ok_or_else(|| {
                invalid(format!(
                    "annotation {} references non-existent image {}",
                    annotation.id, annotation.image_id
                ))
            })?;
            let (id, volume_id) = (annotation.id, image.volume_id);
            if catalog.annotations.insert(id, annotation).is_some() {
                return Err(invalid(format!("duplicate annotation ID {}", id)));
            }
            catalog.volume_annotations.entry(volume_id).or_default().push(id);
        }

        let mut seen = HashSet::new();
        for annotation_label in data.annotation_labels {
            if !seen.insert(annotation_label.id) {
                return Err(invalid(format!(
                    "duplicate annotation label ID {}",
                    annotation_label.id
                )));
            }
            if !catalog.annotations.contains_key(&annotation_label.annotation_id) {
                return Err(invalid(format!(
                    "annotation label {} references non-existent annotation {}",
                    annotation_label.id, annotation_label.annotation_id
                )));
            }
            catalog.check_label_and_user(
                annotation_label.label_id,
                annotation_label.user_id,
                &invalid,
            )?;
            catalog
                .annotation_labels
                .entry(annotation_label.annotation_id)
                .or_default()
                .push(annotation_label);
        }

        let mut seen = HashSet::new();
        for image_label in data.image_labels {
            if !seen.insert(image_label.id) {
                return Err(invalid(format!("duplicate image label ID {}", image_label.id)));
            }
            if !catalog.images.contains_key(&image_label.image_id) {
                return Err(invalid(format!(
                    "image label {} references non-existent image {}",
                    image_label.id, image_label.image_id
                )));
            }
            catalog.check_label_and_user(image_label.label_id, image_label.user_id, &invalid)?;
            catalog
                .image_labels
                .entry(image_label.image_id)
                .or_default()
                .push(image_label);
        }

        for session in data.annotation_sessions {
            let id = session.id;
            if catalog.sessions.insert(id, session).is_some() {
                return Err(invalid(format!("duplicate annotation session ID {}", id)));
            }
        }

        for ids in catalog.volume_annotations.values_mut() {
            ids.sort_unstable();
        }
        for ids in catalog.volume_images.values_mut() {
            ids.sort_unstable();
        }
        for labels in catalog.annotation_labels.values_mut() {
            labels.sort_by_key(|al| al.id);
        }
        for labels in catalog.image_labels.values_mut() {
            labels.sort_by_key(|il| il.id);
        }
        for children in catalog.children.values_mut() {
            children.sort_unstable();
        }

        Ok(catalog)
    }

    fn check_label_and_user(
        &self,
        label: LabelId,
        user: UserId,
        invalid: &dyn Fn(String) -> ReportError,
    ) -> Result<(), ReportError> {
        if !self.labels.contains_key(&label) {
            return Err(invalid(format!("reference to non-existent label {}", label)));
        }
        if !self.users.contains_key(&user) {
            return Err(invalid(format!("reference to non-existent user {}", user)));
        }
        Ok(())
    }

    fn annotation_row(&self, al: &AnnotationLabel) -> Option<AnnotationLabelRow> {
        let annotation = self.annotations.get(&al.annotation_id)?;
        let image = self.images.get(&annotation.image_id)?;
        let label = self.labels.get(&al.label_id)?;

        Some(AnnotationLabelRow {
            annotation_label_id: al.id,
            annotation_id: annotation.id,
            annotation_created_at: annotation.created_at,
            shape: annotation.shape,
            points: annotation.points.clone(),
            image_id: image.id,
            filename: image.filename.clone(),
            image_attrs: image.attrs.clone(),
            label_id: label.id,
            label_name: label.name.clone(),
            label_color: label.color.clone(),
            label_tree_id: label.label_tree_id,
            user_id: al.user_id,
            created_at: al.created_at,
        })
    }

    fn image_row(&self, il: &ImageLabel) -> Option<ImageLabelRow> {
        let image = self.images.get(&il.image_id)?;
        let label = self.labels.get(&il.label_id)?;

        Some(ImageLabelRow {
            image_label_id: il.id,
            image_id: image.id,
            filename: image.filename.clone(),
            image_location: image.location(),
            label_id: label.id,
            label_name: label.name.clone(),
            label_color: label.color.clone(),
            label_tree_id: label.label_tree_id,
            user_id: il.user_id,
            created_at: il.created_at,
        })
    }
}

impl AnnotationStore for Catalog {
    fn volume(&self, id: VolumeId) -> Result<Option<Volume>, StoreError> {
        Ok(self.volumes.get(&id).cloned())
    }

    fn project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.get(&id).cloned())
    }

    fn project_volumes(&self, id: ProjectId) -> Result<Vec<Volume>, StoreError> {
        let Some(project) = self.projects.get(&id) else {
            return Ok(Vec::new());
        };
        let mut volumes: Vec<Volume> = project
            .volumes
            .iter()
            .filter_map(|id| self.volumes.get(id).cloned())
            .collect();
        volumes.sort_by_key(|v| v.id);
        volumes.dedup_by_key(|v| v.id);
        Ok(volumes)
    }

    fn annotation_geometry_chunk(
        &self,
        volume: VolumeId,
        after: Option<AnnotationId>,
        limit: usize,
    ) -> Result<Vec<AnnotationGeometry>, StoreError> {
        let Some(ids) = self.volume_annotations.get(&volume) else {
            return Ok(Vec::new());
        };
        let start = match after {
            Some(after) => ids.partition_point(|id| *id <= after),
            None => 0,
        };

        Ok(ids[start..]
            .iter()
            .take(limit)
            .filter_map(|id| self.annotations.get(id))
            .map(|a| AnnotationGeometry {
                id: a.id,
                points: a.points.clone(),
            })
            .collect())
    }

    fn annotation_label_rows(&self, volume: VolumeId) -> RowStream<'_, AnnotationLabelRow> {
        let ids = self
            .volume_annotations
            .get(&volume)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Box::new(
            ids.iter()
                .filter_map(move |id| self.annotation_labels.get(id))
                .flatten()
                .filter_map(move |al| self.annotation_row(al))
                .map(Ok),
        )
    }

    fn image_label_rows(&self, volume: VolumeId) -> RowStream<'_, ImageLabelRow> {
        let ids = self
            .volume_images
            .get(&volume)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Box::new(
            ids.iter()
                .filter_map(move |id| self.image_labels.get(id))
                .flatten()
                .filter_map(move |il| self.image_row(il))
                .map(Ok),
        )
    }

    fn labels(&self, ids: &[LabelId]) -> Result<Vec<Label>, StoreError> {
        let wanted: BTreeSet<LabelId> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| self.labels.get(&id).cloned())
            .collect())
    }

    fn child_labels(&self, parents: &[LabelId]) -> Result<Vec<Label>, StoreError> {
        Ok(parents
            .iter()
            .filter_map(|id| self.children.get(id))
            .flatten()
            .filter_map(|id| self.labels.get(id).cloned())
            .collect())
    }

    fn label_trees(&self, ids: &[LabelTreeId]) -> Result<Vec<LabelTree>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.label_trees.get(id).cloned())
            .collect())
    }

    fn users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).cloned())
            .collect())
    }

    fn annotation_session(
        &self,
        id: AnnotationSessionId,
    ) -> Result<Option<AnnotationSession>, StoreError> {
        Ok(self.sessions.get(&id).cloned())
    }
}
