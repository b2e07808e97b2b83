//! JSON serialization for catalogs.
//!
//! A catalog document is a single JSON object holding flat lists of
//! projects, volumes, images, label trees, labels, users, annotations,
//! annotation labels, image labels and annotation sessions. This is useful for:
//! - Running reports against an exported snapshot of the store
//! - Fixtures in tests and benchmarks

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::catalog::{Catalog, CatalogData};
use crate::error::ReportError;

/// Reads a catalog from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if records
/// reference records that do not exist.
pub fn read_catalog_json(path: &Path) -> Result<Catalog, ReportError> {
    let file = File::open(path).map_err(ReportError::Io)?;
    let reader = BufReader::new(file);

    let data: CatalogData =
        serde_json::from_reader(reader).map_err(|source| ReportError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;

    Catalog::build(data, path)
}

/// Reads a catalog from a JSON string.
pub fn from_catalog_json_str(json: &str) -> Result<Catalog, ReportError> {
    from_catalog_json_slice(json.as_bytes())
}

/// Reads a catalog from JSON bytes.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_catalog_json_slice(bytes: &[u8]) -> Result<Catalog, ReportError> {
    let path = Path::new("<bytes>");
    let data: CatalogData =
        serde_json::from_slice(bytes).map_err(|source| ReportError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;

    Catalog::build(data, path)
}
