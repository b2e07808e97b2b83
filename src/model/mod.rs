//! Data model of the annotation store.
//!
//! Volumes and projects are the *sources* a report is generated for. Their
//! images carry annotations, and both annotations and images carry labels
//! that users assigned. Labels form trees.
//!
//! # Example
//!
//! ```
//! use annoreport::model::{ExportArea, Label, Volume};
//!
//! let volume = Volume::new(1u64, "transect 1")
//!     .with_export_area(ExportArea::from_corners(0.0, 0.0, 10.0, 10.0));
//! let root = Label::new(1u64, "Animalia", "ff0000", 1u64);
//! let child = Label::new(2u64, "Porifera", "00ff00", 1u64).with_parent(root.id);
//!
//! assert!(volume.export_area.is_some());
//! assert_eq!(child.parent_id, Some(root.id));
//! ```

mod area;
mod entities;
mod ids;

pub use area::{AreaBounds, ExportArea};
pub use entities::{
    Annotation, AnnotationLabel, AnnotationSession, Image, ImageLabel, Label, LabelTree,
    Project, ShapeKind, Timestamp, User, Volume,
};
pub use ids::{
    AnnotationId, AnnotationLabelId, AnnotationSessionId, ImageId, ImageLabelId, LabelId,
    LabelTreeId, ProjectId, UserId, VolumeId,
};
