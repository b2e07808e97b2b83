//! Caller supplied report options and the restriction set derived from them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::model::{AnnotationSessionId, LabelId};

/// Report options as supplied by the caller (camelCase JSON keys).
///
/// Unknown keys are ignored. Every option defaults to "off".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportOptions {
    pub export_area: bool,
    pub annotation_session: Option<AnnotationSessionId>,
    pub newest_label: bool,
    #[serde(alias = "onlyLabels")]
    pub labels: Vec<LabelId>,
    pub aggregate_child_labels: bool,
    pub separate_label_trees: bool,
    pub separate_users: bool,
}

impl ReportOptions {
    /// Parses options from a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(|source| ReportError::InvalidOptions { source })
    }

    /// Validates the options and freezes them into a [`Restrictions`] value.
    ///
    /// # Errors
    /// [`ReportError::ConflictingRestrictions`] if both label tree and user
    /// separation are requested.
    pub fn restrictions(&self) -> Result<Restrictions, ReportError> {
        let grouping = match (self.separate_label_trees, self.separate_users) {
            (true, true) => return Err(ReportError::ConflictingRestrictions),
            (true, false) => Grouping::LabelTree,
            (false, true) => Grouping::User,
            (false, false) => Grouping::None,
        };

        let labels: BTreeSet<LabelId> = self.labels.iter().copied().collect();

        Ok(Restrictions {
            export_area: self.export_area,
            annotation_session: self.annotation_session,
            newest_label: self.newest_label,
            labels: (!labels.is_empty()).then_some(labels),
            aggregate_child_labels: self.aggregate_child_labels,
            grouping,
        })
    }
}

/// How output rows are split into separate staged files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Grouping {
    #[default]
    None,
    LabelTree,
    User,
}

/// The immutable restriction set of one report.
///
/// An absent restriction means "no filtering for that dimension".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Restrictions {
    export_area: bool,
    annotation_session: Option<AnnotationSessionId>,
    newest_label: bool,
    labels: Option<BTreeSet<LabelId>>,
    aggregate_child_labels: bool,
    grouping: Grouping,
}

impl Restrictions {
    /// A restriction set that filters nothing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn export_area(&self) -> bool {
        self.export_area
    }

    pub fn annotation_session(&self) -> Option<AnnotationSessionId> {
        self.annotation_session
    }

    pub fn newest_label(&self) -> bool {
        self.newest_label
    }

    /// The selected labels, if the report is restricted to a label subset.
    pub fn labels(&self) -> Option<&BTreeSet<LabelId>> {
        self.labels.as_ref()
    }

    pub fn aggregate_child_labels(&self) -> bool {
        self.aggregate_child_labels
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }
}
