//! Restriction predicates over row streams.
//!
//! Each predicate narrows a stream of rows and hands back a new stream.
//! Predicates compose by sequential application (logical AND). None of them
//! materializes the stream: rows are filtered as they are pulled.

use std::collections::HashSet;

use crate::model::{AnnotationId, AnnotationSession, LabelId};
use crate::store::{AnnotationLabelRow, LabeledRow, RowStream, StoreError};

/// A single restriction applied to annotation label rows.
#[derive(Clone, Debug)]
pub enum Predicate {
    /// Drop annotations in the export area skip set.
    ExportArea(HashSet<AnnotationId>),
    /// Keep annotations created within the session window whose label was
    /// assigned by a session user.
    AnnotationSession(AnnotationSession),
    /// Keep only the newest label of each annotation.
    NewestLabel,
    /// Keep rows with a label in the set.
    LabelSubset(HashSet<LabelId>),
}

impl Predicate {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Predicate::ExportArea(_) => "export_area",
            Predicate::AnnotationSession(_) => "annotation_session",
            Predicate::NewestLabel => "newest_label",
            Predicate::LabelSubset(_) => "label_subset",
        }
    }

    /// Narrows `rows` by this predicate.
    pub fn apply<'a>(
        self,
        rows: RowStream<'a, AnnotationLabelRow>,
    ) -> RowStream<'a, AnnotationLabelRow> {
        match self {
            Predicate::ExportArea(skip) => {
                Box::new(rows.filter(move |row| match row {
                    Ok(row) => !skip.contains(&row.annotation_id),
                    Err(_) => true,
                }))
            }
            Predicate::AnnotationSession(session) => Box::new(rows.filter(move |row| match row {
                Ok(row) => {
                    session.covers(&row.annotation_created_at) && session.has_user(row.user_id)
                }
                Err(_) => true,
            })),
            Predicate::NewestLabel => Box::new(NewestLabel::new(rows)),
            Predicate::LabelSubset(ids) => label_subset(rows, ids),
        }
    }
}

/// Keeps rows whose label is in `ids`. Works for any labeled row kind.
pub fn label_subset<'a, T>(rows: RowStream<'a, T>, ids: HashSet<LabelId>) -> RowStream<'a, T>
where
    T: LabeledRow + 'a,
{
    Box::new(rows.filter(move |row| match row {
        Ok(row) => ids.contains(&row.label_id()),
        Err(_) => true,
    }))
}

/// Stream adapter keeping, per annotation, the label with the greatest
/// `(created_at, annotation label id)` pair.
///
/// The input must be grouped by annotation ID, which the store's ordering
/// contract guarantees. Equal timestamps are resolved by the higher
/// annotation label ID, never arbitrarily.
pub struct NewestLabel<I> {
    inner: I,
    pending: Option<AnnotationLabelRow>,
}

impl<I> NewestLabel<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            pending: None,
        }
    }
}

fn is_newer(candidate: &AnnotationLabelRow, current: &AnnotationLabelRow) -> bool {
    (candidate.created_at, candidate.annotation_label_id)
        > (current.created_at, current.annotation_label_id)
}

impl<I> Iterator for NewestLabel<I>
where
    I: Iterator<Item = Result<AnnotationLabelRow, StoreError>>,
{
    type Item = Result<AnnotationLabelRow, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut best = match self.pending.take() {
            Some(row) => row,
            None => match self.inner.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            },
        };

        loop {
            match self.inner.next() {
                None => return Some(Ok(best)),
                Some(Err(e)) => {
                    // Resume the group after the error.
                    self.pending = Some(best);
                    return Some(Err(e));
                }
                Some(Ok(row)) if row.annotation_id == best.annotation_id => {
                    if is_newer(&row, &best) {
                        best = row;
                    }
                }
                Some(Ok(row)) => {
                    self.pending = Some(row);
                    return Some(Ok(best));
                }
            }
        }
    }
}
