//! Restricted, grouped queries against the annotation store.
//!
//! [`AnnotationQuery`] joins annotation labels with their annotations,
//! labels and images for one volume and narrows them by the active
//! restrictions. [`ImageLabelQuery`] does the same for image labels.
//! The naming helpers turn the active restrictions into a report name and
//! a filename.

mod composer;
mod grouping;
mod hierarchy;
mod naming;

pub use composer::{describe_restrictions, AnnotationQuery, ImageLabelQuery};
pub use grouping::{group_key, group_titles, GroupKey};
pub use hierarchy::LabelHierarchy;
pub use naming::{slug, RestrictionLabels};
