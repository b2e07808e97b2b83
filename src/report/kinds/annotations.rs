//! Annotation reports.

use std::collections::{BTreeMap, HashMap};

use crate::error::ReportError;
use crate::model::{ImageId, LabelId, Volume};
use crate::query::{group_key, AnnotationQuery, GroupKey, LabelHierarchy};
use crate::store::AnnotationLabelRow;

use super::super::staged::Staging;
use super::{GroupedWriters, Job, UserCache};

const EXTENDED_HEADER: &[&str] = &["image_filename", "label_hierarchy", "annotation_count"];

const FULL_HEADER: &[&str] = &[
    "image_filename",
    "annotation_id",
    "label_hierarchy",
    "shape",
    "points",
    "attributes",
];

const CSV_HEADER: &[&str] = &[
    "annotation_label_id",
    "label_id",
    "label_name",
    "label_hierarchy",
    "user_id",
    "firstname",
    "lastname",
    "image_id",
    "filename",
    "annotation_id",
    "shape_name",
    "points",
    "attributes",
    "created_at",
];

/// Label name, color and number of annotation labels, per label.
pub(super) fn basic(
    job: &Job<'_>,
    volume: &Volume,
    staging: &mut Staging,
) -> Result<(), ReportError> {
    let query = AnnotationQuery::new(job.store, volume, job.restrictions, job.export_area)?;
    let mut hierarchy = LabelHierarchy::new(job.store);
    let grouping = job.restrictions.grouping();

    let mut counts: BTreeMap<Option<GroupKey>, BTreeMap<LabelId, u64>> = BTreeMap::new();
    for row in query.rows()? {
        let row = row?;
        let group = counts.entry(group_key(grouping, &row)).or_default();
        for label in credited(&mut hierarchy, job, &row)? {
            *group.entry(label).or_insert(0) += 1;
        }
    }

    let mut writers = GroupedWriters::new(job, staging, None);
    for (key, labels) in counts {
        let writer = writers.writer(key)?;
        for (id, count) in labels {
            let Some(label) = hierarchy.label(id)? else {
                continue;
            };
            writer.write_row([
                label.name.as_str(),
                label.color.as_str(),
                count.to_string().as_str(),
            ])?;
        }
    }
    writers.finish(staging)
}

/// Number of annotations per image and label.
pub(super) fn extended(
    job: &Job<'_>,
    volume: &Volume,
    staging: &mut Staging,
) -> Result<(), ReportError> {
    let query = AnnotationQuery::new(job.store, volume, job.restrictions, job.export_area)?;
    let mut hierarchy = LabelHierarchy::new(job.store);
    let grouping = job.restrictions.grouping();

    let mut filenames: HashMap<ImageId, String> = HashMap::new();
    let mut counts: BTreeMap<Option<GroupKey>, BTreeMap<(ImageId, LabelId), u64>> =
        BTreeMap::new();
    for row in query.rows()? {
        let row = row?;
        filenames
            .entry(row.image_id)
            .or_insert_with(|| row.filename.clone());
        let group = counts.entry(group_key(grouping, &row)).or_default();
        for label in credited(&mut hierarchy, job, &row)? {
            *group.entry((row.image_id, label)).or_insert(0) += 1;
        }
    }

    let mut writers = GroupedWriters::new(job, staging, Some(EXTENDED_HEADER));
    for (key, entries) in counts {
        let writer = writers.writer(key)?;
        for ((image, label), count) in entries {
            let filename = filenames.get(&image).map(String::as_str).unwrap_or_default();
            writer.write_row([
                filename,
                hierarchy.expanded_name(label)?.as_str(),
                count.to_string().as_str(),
            ])?;
        }
    }
    writers.finish(staging)
}

/// One row per annotation label with shape, points and image attributes.
pub(super) fn full(
    job: &Job<'_>,
    volume: &Volume,
    staging: &mut Staging,
) -> Result<(), ReportError> {
    let query = AnnotationQuery::new(job.store, volume, job.restrictions, job.export_area)?;
    let mut hierarchy = LabelHierarchy::new(job.store);
    let grouping = job.restrictions.grouping();

    let mut writers = GroupedWriters::new(job, staging, Some(FULL_HEADER));
    for row in query.rows()? {
        let row = row?;
        let label_hierarchy = hierarchy.expanded_name(row.label_id)?;
        writers.writer(group_key(grouping, &row))?.write_row([
            row.filename.as_str(),
            row.annotation_id.to_string().as_str(),
            label_hierarchy.as_str(),
            row.shape.name(),
            points_json(&row.points).as_str(),
            attrs_json(row.image_attrs.as_ref()).as_str(),
        ])?;
    }
    writers.finish(staging)
}

/// Every column of every annotation label.
pub(super) fn csv(
    job: &Job<'_>,
    volume: &Volume,
    staging: &mut Staging,
) -> Result<(), ReportError> {
    let query = AnnotationQuery::new(job.store, volume, job.restrictions, job.export_area)?;
    let mut hierarchy = LabelHierarchy::new(job.store);
    let mut users = UserCache::new(job.store);
    let grouping = job.restrictions.grouping();

    let mut writers = GroupedWriters::new(job, staging, Some(CSV_HEADER));
    for row in query.rows()? {
        let row = row?;
        let label_hierarchy = hierarchy.expanded_name(row.label_id)?;
        let (firstname, lastname) = users.names(row.user_id)?;
        writers.writer(group_key(grouping, &row))?.write_row([
            row.annotation_label_id.to_string().as_str(),
            row.label_id.to_string().as_str(),
            row.label_name.as_str(),
            label_hierarchy.as_str(),
            row.user_id.to_string().as_str(),
            firstname.as_str(),
            lastname.as_str(),
            row.image_id.to_string().as_str(),
            row.filename.as_str(),
            row.annotation_id.to_string().as_str(),
            row.shape.name(),
            points_json(&row.points).as_str(),
            attrs_json(row.image_attrs.as_ref()).as_str(),
            row.created_at.to_rfc3339().as_str(),
        ])?;
    }
    writers.finish(staging)
}

/// Labels a row counts towards. With child label aggregation a row also
/// counts for every ancestor of its label, narrowed to the selected labels.
fn credited(
    hierarchy: &mut LabelHierarchy<'_>,
    job: &Job<'_>,
    row: &AnnotationLabelRow,
) -> Result<Vec<LabelId>, ReportError> {
    Ok(hierarchy.credited_labels(
        row.label_id,
        job.restrictions.aggregate_child_labels(),
        job.restrictions.labels(),
    )?)
}

fn points_json(points: &[f64]) -> String {
    serde_json::Value::from(points.to_vec()).to_string()
}

fn attrs_json(attrs: Option<&serde_json::Value>) -> String {
    attrs.map(ToString::to_string).unwrap_or_default()
}
