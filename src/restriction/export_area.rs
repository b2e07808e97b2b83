//! Export area filtering.
//!
//! Collects the annotations that lie entirely outside the export area of a
//! volume. The skip set is collected rather than the keep set because most
//! annotations are expected to be inside the area.

use std::collections::HashSet;

use crate::model::{AnnotationId, AreaBounds, Volume};
use crate::store::{AnnotationGeometry, AnnotationStore, StoreError};

/// Number of annotations read per chunk when scanning a volume.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Computes export area skip sets with a bounded chunked scan.
#[derive(Clone, Copy, Debug)]
pub struct ExportAreaFilter {
    chunk_size: usize,
}

impl Default for ExportAreaFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ExportAreaFilter {
    /// Creates a filter scanning `chunk_size` annotations at a time.
    ///
    /// A chunk size of zero is treated as one.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the IDs of all annotations of `volume` without any point
    /// inside its export area.
    ///
    /// Returns an empty set if the volume has no export area. Only the
    /// annotations of this volume are read, one chunk at a time in
    /// ascending ID order.
    pub fn skip_ids(
        &self,
        store: &dyn AnnotationStore,
        volume: &Volume,
    ) -> Result<HashSet<AnnotationId>, StoreError> {
        let mut skip = HashSet::new();

        let Some(area) = volume.export_area else {
            return Ok(skip);
        };
        let bounds = area.normalized();

        let mut after = None;
        let mut scanned = 0usize;
        loop {
            let chunk = store.annotation_geometry_chunk(volume.id, after, self.chunk_size)?;
            let Some(last) = chunk.last() else {
                break;
            };
            after = Some(last.id);
            scanned += chunk.len();

            collect_outside(&bounds, &chunk, &mut skip);

            if chunk.len() < self.chunk_size {
                break;
            }
        }

        tracing::debug!(
            volume = %volume.id,
            scanned,
            skipped = skip.len(),
            "export area scan complete"
        );

        Ok(skip)
    }
}

/// Adds every annotation without a point inside `bounds` to `skip`.
///
/// An annotation with even one contained `(x, y)` pair is kept regardless
/// of its shape. Circles (`[cx, cy, r]`) are tested by their center only.
pub fn collect_outside<'a>(
    bounds: &AreaBounds,
    annotations: impl IntoIterator<Item = &'a AnnotationGeometry>,
    skip: &mut HashSet<AnnotationId>,
) {
    for annotation in annotations {
        if !bounds.contains_any(&annotation.points) {
            skip.insert(annotation.id);
        }
    }
}
