//! Composition of restricted row streams for one volume.

use std::collections::BTreeSet;

use crate::error::ReportError;
use crate::model::{AnnotationSession, LabelId, Volume};
use crate::restriction::{label_subset, ExportAreaFilter, Predicate, Restrictions};
use crate::store::{AnnotationLabelRow, AnnotationStore, ImageLabelRow, RowStream};

use super::hierarchy::LabelHierarchy;
use super::naming::RestrictionLabels;

/// The restricted annotation label rows of one volume.
///
/// Predicates are applied in a fixed order:
/// export area, annotation session, newest label, label subset.
/// The newest label is therefore picked among the labels that survived the
/// session restriction, not among all labels of an annotation.
pub struct AnnotationQuery<'a> {
    store: &'a dyn AnnotationStore,
    volume: Volume,
    restrictions: &'a Restrictions,
    export_area: ExportAreaFilter,
    session: Option<AnnotationSession>,
    label_filter: Option<BTreeSet<LabelId>>,
}

impl<'a> AnnotationQuery<'a> {
    /// Resolves the session and label restrictions against the store.
    ///
    /// # Errors
    /// [`ReportError::UnknownAnnotationSession`] if the restricted session
    /// does not exist.
    pub fn new(
        store: &'a dyn AnnotationStore,
        volume: &Volume,
        restrictions: &'a Restrictions,
        export_area: ExportAreaFilter,
    ) -> Result<Self, ReportError> {
        let session = resolve_session(store, restrictions)?;
        let label_filter = resolve_label_filter(store, restrictions)?;

        Ok(Self {
            store,
            volume: volume.clone(),
            restrictions,
            export_area,
            session,
            label_filter,
        })
    }

    /// The label IDs rows are filtered by, including descendants when child
    /// labels are aggregated.
    pub fn label_filter(&self) -> Option<&BTreeSet<LabelId>> {
        self.label_filter.as_ref()
    }

    /// The active predicates in application order.
    pub fn predicates(&self) -> Result<Vec<Predicate>, ReportError> {
        let mut predicates = Vec::with_capacity(4);

        if self.restrictions.export_area() {
            let skip = self.export_area.skip_ids(self.store, &self.volume)?;
            predicates.push(Predicate::ExportArea(skip));
        }
        if let Some(session) = &self.session {
            predicates.push(Predicate::AnnotationSession(session.clone()));
        }
        if self.restrictions.newest_label() {
            predicates.push(Predicate::NewestLabel);
        }
        if let Some(ids) = &self.label_filter {
            predicates.push(Predicate::LabelSubset(ids.iter().copied().collect()));
        }

        Ok(predicates)
    }

    /// Returns the lazy, restricted row stream in ascending annotation order.
    pub fn rows(&self) -> Result<RowStream<'a, AnnotationLabelRow>, ReportError> {
        let store: &'a dyn AnnotationStore = self.store;
        let mut rows = store.annotation_label_rows(self.volume.id);

        for predicate in self.predicates()? {
            tracing::trace!(
                volume = %self.volume.id,
                predicate = predicate.name(),
                "applying restriction"
            );
            rows = predicate.apply(rows);
        }

        Ok(rows)
    }
}

/// The restricted image label rows of one volume.
///
/// Only the label subset restriction applies to image labels.
pub struct ImageLabelQuery<'a> {
    store: &'a dyn AnnotationStore,
    volume: Volume,
    label_filter: Option<BTreeSet<LabelId>>,
}

impl<'a> ImageLabelQuery<'a> {
    pub fn new(
        store: &'a dyn AnnotationStore,
        volume: &Volume,
        restrictions: &Restrictions,
    ) -> Result<Self, ReportError> {
        Ok(Self {
            store,
            volume: volume.clone(),
            label_filter: resolve_label_filter(store, restrictions)?,
        })
    }

    /// Returns the lazy, restricted row stream in ascending image order.
    pub fn rows(&self) -> RowStream<'a, ImageLabelRow> {
        let store: &'a dyn AnnotationStore = self.store;
        let rows = store.image_label_rows(self.volume.id);

        match &self.label_filter {
            Some(ids) => label_subset(rows, ids.iter().copied().collect()),
            None => rows,
        }
    }
}

/// Resolves the restrictions that appear in the report name.
pub fn describe_restrictions(
    store: &dyn AnnotationStore,
    restrictions: &Restrictions,
) -> Result<RestrictionLabels, ReportError> {
    Ok(RestrictionLabels {
        export_area: restrictions.export_area(),
        annotation_session: resolve_session(store, restrictions)?.map(|s| s.name),
        newest_label: restrictions.newest_label(),
    })
}

fn resolve_session(
    store: &dyn AnnotationStore,
    restrictions: &Restrictions,
) -> Result<Option<AnnotationSession>, ReportError> {
    match restrictions.annotation_session() {
        Some(id) => store
            .annotation_session(id)?
            .map(Some)
            .ok_or(ReportError::UnknownAnnotationSession(id)),
        None => Ok(None),
    }
}

fn resolve_label_filter(
    store: &dyn AnnotationStore,
    restrictions: &Restrictions,
) -> Result<Option<BTreeSet<LabelId>>, ReportError> {
    let Some(selected) = restrictions.labels() else {
        return Ok(None);
    };
    if !restrictions.aggregate_child_labels() {
        return Ok(Some(selected.clone()));
    }
    Ok(Some(LabelHierarchy::new(store).with_descendants(selected)?))
}
