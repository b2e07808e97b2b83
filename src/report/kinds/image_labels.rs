//! Image label reports. Only the label subset restriction applies here.

use std::collections::HashMap;

use crate::error::ReportError;
use crate::model::{ImageId, Volume};
use crate::query::{group_key, GroupKey, ImageLabelQuery, LabelHierarchy};
use crate::store::ImageLabelRow;

use super::super::staged::{StagedTabularWriter, Staging};
use super::{GroupedWriters, Job, UserCache};

const BASIC_HEADER: &[&str] = &["image_id", "image_filename", "label_hierarchies"];

const CSV_HEADER: &[&str] = &[
    "image_label_id",
    "image_id",
    "filename",
    "user_id",
    "firstname",
    "lastname",
    "label_id",
    "label_name",
    "label_hierarchy",
    "created_at",
];

const LOCATION_HEADER: &[&str] = &[
    "image_id",
    "image_filename",
    "longitude",
    "latitude",
    "labels",
];

/// The image currently being collected for one group.
struct PendingImage {
    id: ImageId,
    filename: String,
    location: Option<(f64, f64)>,
    labels: Vec<String>,
}

/// One row per image listing the expanded names of its labels.
pub(super) fn basic(
    job: &Job<'_>,
    volume: &Volume,
    staging: &mut Staging,
) -> Result<(), ReportError> {
    let mut hierarchy = LabelHierarchy::new(job.store);
    per_image(
        job,
        volume,
        staging,
        BASIC_HEADER,
        |row| Ok(Some(hierarchy.expanded_name(row.label_id)?)),
        |writer, image| {
            writer.write_row([
                image.id.to_string(),
                image.filename,
                image.labels.join(", "),
            ])
        },
    )
}

/// One row per image with a known position, listing its labels as
/// `name (#id)`. Images without a position are left out.
pub(super) fn location(
    job: &Job<'_>,
    volume: &Volume,
    staging: &mut Staging,
) -> Result<(), ReportError> {
    per_image(
        job,
        volume,
        staging,
        LOCATION_HEADER,
        |row| {
            Ok(row
                .image_location
                .map(|_| format!("{} (#{})", row.label_name, row.label_id)))
        },
        |writer, image| {
            let (lng, lat) = image.location.unwrap_or_default();
            writer.write_row([
                image.id.to_string(),
                image.filename,
                lng.to_string(),
                lat.to_string(),
                image.labels.join(", "),
            ])
        },
    )
}

/// Collects the labels of each image and writes one row per image.
///
/// Rows arrive ordered by image, so each group only holds the image it is
/// currently collecting. `describe` returns `None` for rows to leave out.
fn per_image<D, W>(
    job: &Job<'_>,
    volume: &Volume,
    staging: &mut Staging,
    header: &'static [&'static str],
    mut describe: D,
    mut write: W,
) -> Result<(), ReportError>
where
    D: FnMut(&ImageLabelRow) -> Result<Option<String>, ReportError>,
    W: FnMut(&mut StagedTabularWriter, PendingImage) -> Result<(), ReportError>,
{
    let query = ImageLabelQuery::new(job.store, volume, job.restrictions)?;
    let grouping = job.restrictions.grouping();

    let mut writers = GroupedWriters::new(job, staging, Some(header));
    let mut pending: HashMap<Option<GroupKey>, PendingImage> = HashMap::new();

    for row in query.rows() {
        let row = row?;
        let Some(label) = describe(&row)? else {
            continue;
        };
        let key = group_key(grouping, &row);

        match pending.get_mut(&key) {
            Some(image) if image.id == row.image_id => image.labels.push(label),
            _ => {
                let next = PendingImage {
                    id: row.image_id,
                    filename: row.filename,
                    location: row.image_location,
                    labels: vec![label],
                };
                if let Some(done) = pending.insert(key, next) {
                    write(writers.writer(key)?, done)?;
                }
            }
        }
    }

    let mut rest: Vec<_> = pending.into_iter().collect();
    rest.sort_by_key(|(key, _)| *key);
    for (key, image) in rest {
        write(writers.writer(key)?, image)?;
    }
    writers.finish(staging)
}

/// Every column of every image label.
pub(super) fn csv(
    job: &Job<'_>,
    volume: &Volume,
    staging: &mut Staging,
) -> Result<(), ReportError> {
    let query = ImageLabelQuery::new(job.store, volume, job.restrictions)?;
    let mut hierarchy = LabelHierarchy::new(job.store);
    let mut users = UserCache::new(job.store);
    let grouping = job.restrictions.grouping();

    let mut writers = GroupedWriters::new(job, staging, Some(CSV_HEADER));
    for row in query.rows() {
        let row = row?;
        let label_hierarchy = hierarchy.expanded_name(row.label_id)?;
        let (firstname, lastname) = users.names(row.user_id)?;
        writers.writer(group_key(grouping, &row))?.write_row([
            row.image_label_id.to_string().as_str(),
            row.image_id.to_string().as_str(),
            row.filename.as_str(),
            row.user_id.to_string().as_str(),
            firstname.as_str(),
            lastname.as_str(),
            row.label_id.to_string().as_str(),
            row.label_name.as_str(),
            label_hierarchy.as_str(),
            row.created_at.to_rfc3339().as_str(),
        ])?;
    }
    writers.finish(staging)
}
