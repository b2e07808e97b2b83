//! Stored records the report engine reads.
//!
//! These mirror the rows of the persisted annotation store. The engine only
//! ever reads them; they are owned by whatever implements
//! [`AnnotationStore`](crate::store::AnnotationStore).

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::area::ExportArea;
use super::ids::{
    AnnotationId, AnnotationLabelId, AnnotationSessionId, ImageId, ImageLabelId, LabelId,
    LabelTreeId, ProjectId, UserId, VolumeId,
};

/// Point in time at which a record was created.
pub type Timestamp = DateTime<Utc>;

/// A volume: a collection of images that is reported on as one unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: VolumeId,
    pub name: String,

    /// Optional export area configured for the images of this volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_area: Option<ExportArea>,
}

impl Volume {
    /// Creates a new volume without an export area.
    pub fn new(id: impl Into<VolumeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            export_area: None,
        }
    }

    /// Sets the export area of this volume.
    pub fn with_export_area(mut self, area: ExportArea) -> Self {
        self.export_area = Some(area);
        self
    }
}

/// A project: an ordered set of volumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub volumes: Vec<VolumeId>,
}

impl Project {
    pub fn new(
        id: impl Into<ProjectId>,
        name: impl Into<String>,
        volumes: impl IntoIterator<Item = VolumeId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            volumes: volumes.into_iter().collect(),
        }
    }
}

/// An image of a volume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub volume_id: VolumeId,
    pub filename: String,

    /// Free-form image metadata (e.g., EXIF derived attributes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<serde_json::Value>,

    /// Longitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Latitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        volume_id: impl Into<VolumeId>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            volume_id: volume_id.into(),
            filename: filename.into(),
            attrs: None,
            lng: None,
            lat: None,
        }
    }

    /// Sets the image attributes.
    pub fn with_attrs(mut self, attrs: serde_json::Value) -> Self {
        self.attrs = Some(attrs);
        self
    }

    /// Sets the position the image was taken at.
    pub fn with_location(mut self, lng: f64, lat: f64) -> Self {
        self.lng = Some(lng);
        self.lat = Some(lat);
        self
    }

    /// `(longitude, latitude)`, if both are known.
    pub fn location(&self) -> Option<(f64, f64)> {
        self.lng.zip(self.lat)
    }
}

/// Geometric shape of an annotation.
///
/// The shape decides how the flat `points` list is read: pairs of `(x, y)`
/// for everything except circles, which are `[center x, center y, radius]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Point,
    LineString,
    Polygon,
    Rectangle,
    Circle,
    Ellipse,
}

impl ShapeKind {
    /// Display name of the shape as it appears in report rows.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Point => "Point",
            ShapeKind::LineString => "LineString",
            ShapeKind::Polygon => "Polygon",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Ellipse => "Ellipse",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A geometric region marked on an image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub shape: ShapeKind,
    pub points: Vec<f64>,
    pub created_at: Timestamp,
}

/// An assignment of a label to an annotation by a user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationLabel {
    pub id: AnnotationLabelId,
    pub annotation_id: AnnotationId,
    pub label_id: LabelId,
    pub user_id: UserId,
    pub created_at: Timestamp,
}

/// An assignment of a label to a whole image by a user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageLabel {
    pub id: ImageLabelId,
    pub image_id: ImageId,
    pub label_id: LabelId,
    pub user_id: UserId,
    pub created_at: Timestamp,
}

/// A label. Labels form trees through `parent_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<LabelId>,
    pub label_tree_id: LabelTreeId,
}

impl Label {
    /// Creates a new root label.
    pub fn new(
        id: impl Into<LabelId>,
        name: impl Into<String>,
        color: impl Into<String>,
        label_tree_id: impl Into<LabelTreeId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            parent_id: None,
            label_tree_id: label_tree_id.into(),
        }
    }

    /// Makes this label a child of `parent`.
    pub fn with_parent(mut self, parent: impl Into<LabelId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }
}

/// A named hierarchy of labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelTree {
    pub id: LabelTreeId,
    pub name: String,
}

/// A user who created labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub firstname: String,
    pub lastname: String,
}

impl User {
    /// Returns `"firstname lastname"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// A named time window plus a set of users.
///
/// The window is half-open: `[starts_at, ends_at)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSession {
    pub id: AnnotationSessionId,
    pub volume_id: VolumeId,
    pub name: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    #[serde(default)]
    pub users: BTreeSet<UserId>,
}

impl AnnotationSession {
    /// Returns true if `at` lies within `[starts_at, ends_at)`.
    #[inline]
    pub fn covers(&self, at: &Timestamp) -> bool {
        *at >= self.starts_at && *at < self.ends_at
    }

    /// Returns true if the user takes part in this session.
    #[inline]
    pub fn has_user(&self, user: UserId) -> bool {
        self.users.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_session_window_is_half_open() {
        let session = AnnotationSession {
            id: AnnotationSessionId(1),
            volume_id: VolumeId(1),
            name: "survey".into(),
            starts_at: at(8),
            ends_at: at(12),
            users: BTreeSet::from([UserId(1)]),
        };

        assert!(session.covers(&at(8)));
        assert!(session.covers(&at(11)));
        assert!(!session.covers(&at(12)));
        assert!(!session.covers(&at(7)));
        assert!(session.has_user(UserId(1)));
        assert!(!session.has_user(UserId(2)));
    }

    #[test]
    fn test_shape_kind_serde_names() {
        let shape: ShapeKind = serde_json::from_str("\"linestring\"").expect("parse");
        assert_eq!(shape, ShapeKind::LineString);
        assert_eq!(shape.name(), "LineString");
    }

    #[test]
    fn test_label_builder_pattern() {
        let child = Label::new(2u64, "Child", "00ff00", 1u64).with_parent(1u64);
        assert_eq!(child.parent_id, Some(LabelId(1)));
        assert_eq!(child.label_tree_id, LabelTreeId(1));
    }

    #[test]
    fn test_image_location_needs_both_coordinates() {
        let image: Image = serde_json::from_str(
            r#"{"id": 1, "volume_id": 1, "filename": "a.jpg", "lng": 12.5}"#,
        )
        .expect("parse");
        assert_eq!(image.location(), None);

        let image = Image::new(1u64, 1u64, "a.jpg")
            .with_attrs(serde_json::json!({"width": 10}))
            .with_location(12.5, -3.0);
        assert_eq!(image.location(), Some((12.5, -3.0)));
        let json = serde_json::to_value(&image).expect("serialize");
        assert_eq!(json["lat"], -3.0);
        assert_eq!(json["attrs"]["width"], 10);
    }
}
