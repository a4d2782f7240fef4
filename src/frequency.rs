//! Word-frequency table of the standard orthography.
use crate::translit::TranslitError;
use std::{
    collections::HashMap,
    fs,
    io::{BufReader, Read},
    path::Path,
};
use tracing::info;

/// Lower-case word form → corpus count.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TranslitError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| TranslitError::MissingResource {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Parse a JSON object mapping word forms to integer counts.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, TranslitError> {
        let counts: HashMap<String, u64> =
            serde_json::from_reader(reader).map_err(|e| TranslitError::MalformedResource {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;
        info!(path = %origin.display(), forms = counts.len(), "frequency table loaded");
        Ok(Self { counts })
    }

    /// Count of a form, looked up in lower case.
    #[inline]
    pub fn get(&self, form: &str) -> Option<u64> {
        self.counts.get(form.to_lowercase().as_str()).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().map(|(w, n)| (w.into(), n)).collect(),
        }
    }
}
