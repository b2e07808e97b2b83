//! Report names and filenames derived from the active restrictions.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// The restrictions that appear in a report's name, in naming order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestrictionLabels {
    pub export_area: bool,
    pub annotation_session: Option<String>,
    pub newest_label: bool,
}

impl RestrictionLabels {
    /// Human-readable descriptors, e.g. `["export area", "annotation session dive 3"]`.
    pub fn descriptors(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.export_area {
            out.push("export area".to_string());
        }
        if let Some(name) = &self.annotation_session {
            out.push(format!("annotation session {}", name));
        }
        if self.newest_label {
            out.push("newest label of each annotation".to_string());
        }
        out
    }

    /// Filesystem-safe descriptors, e.g. `["export_area", "annotation_session_dive-3"]`.
    pub fn filename_parts(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.export_area {
            out.push("export_area".to_string());
        }
        if let Some(name) = &self.annotation_session {
            out.push(format!("annotation_session_{}", slug(name)));
        }
        if self.newest_label {
            out.push("newest_label".to_string());
        }
        out
    }

    /// `"{base} (restricted to a, b)"`, or `base` if nothing is restricted.
    pub fn name(&self, base: &str) -> String {
        let descriptors = self.descriptors();
        if descriptors.is_empty() {
            return base.to_string();
        }
        format!("{} (restricted to {})", base, descriptors.join(", "))
    }

    /// `"{base}_restricted_to_a_b"`, or `base` if nothing is restricted.
    pub fn filename(&self, base: &str) -> String {
        let parts = self.filename_parts();
        if parts.is_empty() {
            return base.to_string();
        }
        format!("{}_restricted_to_{}", base, parts.join("_"))
    }
}

/// Lowercases `s`, strips accents and replaces every run of other
/// characters with a single `-`, trimming it from both ends. The result is
/// plain ASCII.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut dash = false;
    for c in s.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            if dash && !out.is_empty() {
                out.push('-');
            }
            dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            dash = true;
        }
    }
    out
}
