//! Analyzability oracle.
//!
//! The disambiguator falls back to a morphological analyzer when no candidate
//! is in the frequency table. The analyzer is used as a yes/no oracle only:
//! a form is accepted when it has at least one analysis that is not tagged
//! as a misspelling.
use crate::unicode::is_word_char;
use std::{
    collections::HashSet,
    fmt,
    sync::{Mutex, PoisonError},
};
use thiserror::Error;
use tracing::trace;

/// Tag the analyzer puts in `gramm` for forms it only recognizes as typos.
pub const MISSPELL_TAG: &str = "misspell";

/// One morphological analysis of a word form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Analysis {
    pub lemma: String,
    /// Comma- or space-separated grammatical tags.
    pub gramm: String,
}

impl Analysis {
    pub fn new(lemma: impl Into<String>, gramm: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            gramm: gramm.into(),
        }
    }

    #[inline]
    pub fn is_misspelling(&self) -> bool {
        self.gramm
            .split(|c: char| c == ',' || c.is_whitespace())
            .any(|tag| tag == MISSPELL_TAG)
    }
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),
    #[error("analysis of `{word}` failed: {reason}")]
    Failed { word: String, reason: String },
}

/// A morphological analyzer.
pub trait Analyzer: Send + Sync {
    fn analyze_words(&self, word: &str) -> Result<Vec<Analysis>, AnalyzerError>;
}

/// Analyzer backed by a fixed set of known forms (looked up in lower case).
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer {
    forms: HashSet<String>,
}

impl LexiconAnalyzer {
    pub fn new<I, S>(forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            forms: forms.into_iter().map(|f| f.as_ref().to_lowercase()).collect(),
        }
    }
}

impl Analyzer for LexiconAnalyzer {
    fn analyze_words(&self, word: &str) -> Result<Vec<Analysis>, AnalyzerError> {
        let lower = word.to_lowercase();
        if self.forms.contains(&lower) {
            Ok(vec![Analysis::new(lower, "")])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Memoizing yes/no adapter over an [`Analyzer`].
pub struct AnalyzabilityOracle {
    analyzer: Box<dyn Analyzer>,
    confirmed: Mutex<HashSet<String>>,
}

impl AnalyzabilityOracle {
    pub fn new(analyzer: impl Analyzer + 'static) -> Self {
        Self::from_boxed(Box::new(analyzer))
    }

    pub fn from_boxed(analyzer: Box<dyn Analyzer>) -> Self {
        Self {
            analyzer,
            confirmed: Mutex::new(HashSet::new()),
        }
    }

    /// `true` when the analyzer knows `word` (or, for a hyphenated form,
    /// every one of its parts).
    pub fn analyzable(&self, word: &str) -> Result<bool, AnalyzerError> {
        if self.is_cached(word) {
            return Ok(true);
        }
        let analyses = self.analyzer.analyze_words(word)?;
        let mut accepted = analyses.iter().any(|a| !a.is_misspelling());
        if !accepted && is_compound(word) {
            accepted = true;
            for part in word.split('-') {
                if !self.analyzable(part)? {
                    accepted = false;
                    break;
                }
            }
        }
        trace!(word, accepted, "oracle");
        if accepted {
            self.cache().insert(word.to_owned());
        }
        Ok(accepted)
    }

    #[inline]
    pub fn is_cached(&self, word: &str) -> bool {
        self.cache().contains(word)
    }

    pub fn cached_len(&self) -> usize {
        self.cache().len()
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // Append-only: a poisoned lock still guards valid entries.
        self.confirmed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for AnalyzabilityOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzabilityOracle")
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

/// Two or more hyphen-joined parts, each at least three word characters.
fn is_compound(word: &str) -> bool {
    if word.starts_with('-') || word.ends_with('-') {
        return false;
    }
    let mut parts = 0usize;
    for part in word.split('-') {
        if part.chars().filter(|&c| is_word_char(c)).count() < 3 {
            return false;
        }
        parts += 1;
    }
    parts >= 2
}
