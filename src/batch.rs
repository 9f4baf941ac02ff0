//! Processing every PDF under a directory.
//!
//! Documents are independent, so they are extracted in parallel with rayon
//! when [`ExtractOptions::parallel`] is set. Results keep the sorted input
//! order either way. A document that fails is reported and left out; it
//! never stops the batch.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::model::Document;
use crate::parser::ExtractOptions;

/// A document that could not be processed.
#[derive(Debug)]
pub struct BatchFailure {
    /// File that failed
    pub path: PathBuf,
    /// Why it failed
    pub error: Error,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully extracted documents, in input order
    pub documents: Vec<Document>,
    /// Documents that failed, in input order
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of files attempted.
    pub fn processed(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    /// Whether every file was extracted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Every `.pdf` file below `dir`, recursively, sorted by path.
pub fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(walk_error)?;
        if entry.file_type().is_file() && is_pdf_path(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn walk_error(err: walkdir::Error) -> Error {
    match err.into_io_error() {
        Some(io) => Error::Io(io),
        None => Error::Other("directory loop while scanning for PDFs".to_string()),
    }
}

fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Extract every PDF below `dir`.
///
/// `on_done` is called once per file as it finishes (from worker threads
/// when running in parallel), with the error if it failed.
pub fn process_dir<F>(dir: &Path, options: &ExtractOptions, on_done: F) -> Result<BatchReport>
where
    F: Fn(&Path, Option<&Error>) + Sync,
{
    let paths = find_pdfs(dir)?;
    log::info!("Found {} PDF file(s) in {}", paths.len(), dir.display());
    Ok(process_paths(&paths, options, on_done))
}

/// Extract the given files.
pub fn process_paths<F>(paths: &[PathBuf], options: &ExtractOptions, on_done: F) -> BatchReport
where
    F: Fn(&Path, Option<&Error>) + Sync,
{
    let run = |path: &PathBuf| {
        let result = crate::process_file(path, options);
        on_done(path, result.as_ref().err());
        (path.clone(), result)
    };

    let results: Vec<(PathBuf, Result<Document>)> = if options.parallel {
        paths.par_iter().map(run).collect()
    } else {
        paths.iter().map(run).collect()
    };

    let mut report = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok(doc) => report.documents.push(doc),
            Err(error) => {
                log::warn!("Skipping {}: {}", path.display(), error);
                report.failures.push(BatchFailure { path, error });
            }
        }
    }
    report
}
