//! Temporary tabular files handed to the renderer.
//!
//! Every staged file lives in a [`TempPath`]: it is deleted when its owner
//! is dropped, whether generation finished or failed halfway.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::ReportError;

/// An open staged file accepting rows.
pub struct StagedTabularWriter {
    writer: csv::Writer<BufWriter<File>>,
    path: TempPath,
    rows: usize,
}

impl StagedTabularWriter {
    /// Creates a new, uniquely named file in `dir`.
    pub fn open(dir: &Path) -> Result<Self, ReportError> {
        fs::create_dir_all(dir).map_err(|source| ReportError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        let (file, path) = tempfile::Builder::new()
            .prefix("annoreport-")
            .suffix(".csv")
            .tempfile_in(dir)?
            .into_parts();

        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(BufWriter::new(file));

        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written so far, including title and header rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Appends one row. Rows may differ in length.
    pub fn write_row<I, T>(&mut self, fields: I) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(fields)
            .map_err(|source| ReportError::StagedWrite {
                path: self.path.to_path_buf(),
                source,
            })?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes the file and hands its path over to the caller.
    pub fn close(self) -> Result<StagedFile, ReportError> {
        let Self { writer, path, rows } = self;
        let mut inner = writer.into_inner().map_err(|e| {
            ReportError::Io(io::Error::new(e.error().kind(), e.error().to_string()))
        })?;
        inner.flush()?;
        drop(inner);
        Ok(StagedFile { path, rows })
    }
}

/// A finished staged file. Deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    rows: usize,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// The staged files of one generation, in the order they are rendered.
#[derive(Debug)]
pub struct Staging {
    dir: PathBuf,
    files: Vec<StagedFile>,
}

impl Staging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn open(&self) -> Result<StagedTabularWriter, ReportError> {
        StagedTabularWriter::open(&self.dir)
    }

    pub fn push(&mut self, file: StagedFile) {
        self.files.push(file);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.files.iter().map(StagedFile::path).collect()
    }

    /// Deletes every staged file and returns how many were removed.
    ///
    /// Deletion failures are logged and otherwise ignored so they never mask
    /// the outcome of the generation.
    pub fn cleanup(self) -> usize {
        let mut removed = 0;
        for file in self.files {
            let path = file.path.to_path_buf();
            match file.path.close() {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to remove staged file"
                ),
            }
        }
        removed
    }
}
