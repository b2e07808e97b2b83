//! Report restrictions.
//!
//! This module turns caller options into an immutable [`Restrictions`] value
//! and provides the predicates that narrow annotation label rows:
//! - export area (via [`ExportAreaFilter`])
//! - annotation session
//! - newest label of each annotation
//! - label subset

mod export_area;
mod options;
mod predicate;

pub use export_area::{collect_outside, ExportAreaFilter, DEFAULT_CHUNK_SIZE};
pub use options::{Grouping, ReportOptions, Restrictions};
pub use predicate::{label_subset, NewestLabel, Predicate};
