//! Batch collaborators: run the engine over a directory of documents.
//!
//! Each document format is a [`DocumentProcessor`]; [`process_corpus`]
//! walks an input directory, mirrors its layout under the output directory
//! and hands every matching file to the processor. A document that fails is
//! logged and skipped.
pub mod annotation;
pub mod tabular;
pub mod walk;

use crate::translit::TranslitError;
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("input directory `{}` does not exist", .0.display())]
    MissingDirectory(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error("invalid UTF-8 in document: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("header property `lastUsedAnnotationId` is missing or not a number")]
    MissingAnnotationId,
    #[error("invalid tier pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Translit(#[from] TranslitError),
}

/// One document format.
pub trait DocumentProcessor {
    /// Lower-case file extensions this processor accepts, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Read `input`, transliterate it and write the result to `output`.
    fn process_file(&mut self, input: &Path, output: &Path) -> Result<(), CorpusError>;
}

/// Process every matching file below `in_dir`, writing to the same relative
/// path below `out_dir`. Returns the number of documents written.
pub fn process_corpus<P: DocumentProcessor + ?Sized>(
    processor: &mut P,
    in_dir: &Path,
    out_dir: &Path,
) -> Result<usize, CorpusError> {
    if !in_dir.is_dir() {
        return Err(CorpusError::MissingDirectory(in_dir.to_path_buf()));
    }
    let files = walk::find_files(in_dir, processor.extensions())?;
    let mut done = 0usize;
    for input in files {
        let output = walk::mirror_path(in_dir, out_dir, &input)?;
        match processor.process_file(&input, &output) {
            Ok(()) => done += 1,
            Err(e) => warn!(file = %input.display(), error = %e, "document skipped"),
        }
    }
    info!(dir = %in_dir.display(), documents = done, "corpus processed");
    Ok(done)
}
