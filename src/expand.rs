//! Variant expansion engine.
//!
//! A field transcription underdetermines the standard spelling: `ˀ` may be
//! any of four stops, `ө` any of four vowels, and so on. Every ambiguity is
//! a [`RuleSpec`]; the [`Expander`] turns one mapped word into the ordered,
//! duplicate-free set of spellings the rules allow.
pub mod rules;

use crate::{
    translit::TranslitError,
    unicode::{is_upper_word, match_case},
};
use regex::Regex;
use std::fmt;
use tracing::{debug, warn};

/// Default upper bound on the number of candidates per word.
pub const DEFAULT_MAX_CANDIDATES: usize = 256;

/// Static description of an ambiguity rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub name: &'static str,
    /// Regex over a single word; compiled case-insensitively.
    pub pattern: &'static str,
    /// Replacement templates; `${1}` style group references are allowed.
    pub templates: &'static [&'static str],
    /// Maximum number of expansion rounds; `None` runs to a fixed point.
    pub max_depth: Option<usize>,
}

/// A compiled [`RuleSpec`].
pub struct ExpansionRule {
    pub name: &'static str,
    regex: Regex,
    templates: &'static [&'static str],
    max_depth: Option<usize>,
}

impl ExpansionRule {
    pub fn compile(spec: &RuleSpec) -> Result<Self, TranslitError> {
        let regex = Regex::new(&format!("(?i){}", spec.pattern)).map_err(|source| {
            TranslitError::InvalidRule {
                name: spec.name.to_owned(),
                source,
            }
        })?;
        Ok(Self {
            name: spec.name,
            regex,
            templates: spec.templates,
            max_depth: spec.max_depth,
        })
    }

    /// Every variant of `word` obtained by rewriting its first match, or
    /// `None` when the rule does not match.
    fn variants<'a>(&'a self, word: &'a str) -> Option<impl Iterator<Item = String> + 'a> {
        let caps = self.regex.captures(word)?;
        let whole = caps.get(0)?;
        let (head, tail) = (&word[..whole.start()], &word[whole.end()..]);
        let upper = is_upper_word(word);
        Some(self.templates.iter().map(move |template| {
            let mut expanded = String::new();
            caps.expand(template, &mut expanded);
            let replacement = match_case(&expanded, whole.as_str(), upper);
            let mut out = String::with_capacity(head.len() + replacement.len() + tail.len());
            out.push_str(head);
            out.push_str(&replacement);
            out.push_str(tail);
            out
        }))
    }

    /// Rewrite every match with the first template, up to the depth limit.
    fn settle(&self, word: &str) -> String {
        let mut word = word.to_owned();
        let mut depth = 0usize;
        while self.max_depth.is_none_or(|max| depth < max) {
            let Some(next) = self.variants(&word).and_then(|mut v| v.next()) else {
                break;
            };
            if next == word {
                break;
            }
            word = next;
            depth += 1;
        }
        word
    }
}

impl fmt::Debug for ExpansionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionRule")
            .field("name", &self.name)
            .field("pattern", &self.regex.as_str())
            .field("templates", &self.templates)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Ordered set of candidate spellings, first-seen order, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    items: Vec<String>,
}

impl CandidateSet {
    pub fn single(word: impl Into<String>) -> Self {
        Self {
            items: vec![word.into()],
        }
    }

    /// Insert unless already present. Returns `true` when inserted.
    pub fn insert(&mut self, candidate: String) -> bool {
        if self.contains(&candidate) {
            return false;
        }
        self.items.push(candidate);
        true
    }

    #[inline]
    pub fn contains(&self, candidate: &str) -> bool {
        self.items.iter().any(|c| c == candidate)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl FromIterator<String> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = CandidateSet::default();
        for c in iter {
            set.insert(c);
        }
        set
    }
}

impl IntoIterator for CandidateSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Outcome of one expansion round.
enum Round {
    Grew(CandidateSet),
    Stable,
    Capped,
}

/// Applies an ordered list of rules with a hard candidate cap.
#[derive(Debug)]
pub struct Expander {
    rules: Vec<ExpansionRule>,
    max_candidates: usize,
}

impl Expander {
    pub fn new(specs: &[RuleSpec], max_candidates: usize) -> Result<Self, TranslitError> {
        let rules = specs
            .iter()
            .map(ExpansionRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rules,
            max_candidates: max_candidates.max(1),
        })
    }

    #[inline]
    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    #[inline]
    pub fn rules(&self) -> &[ExpansionRule] {
        &self.rules
    }

    /// Expand one word into every spelling the rules allow.
    ///
    /// When the candidate cap is reached, the last complete set is kept and
    /// the remaining ambiguities of each candidate are settled with the first
    /// template of their rule.
    pub fn expand(&self, word: &str) -> CandidateSet {
        let mut set = CandidateSet::single(word);
        for (index, rule) in self.rules.iter().enumerate() {
            let mut depth = 0usize;
            loop {
                if rule.max_depth.is_some_and(|max| depth >= max) {
                    break;
                }
                match self.round(rule, &set) {
                    Round::Grew(next) => {
                        set = next;
                        depth += 1;
                    }
                    Round::Stable => break,
                    Round::Capped => {
                        warn!(
                            word,
                            rule = rule.name,
                            cap = self.max_candidates,
                            kept = set.len(),
                            "candidate cap reached, settling the rest"
                        );
                        return set
                            .iter()
                            .map(|candidate| self.settle_from(index, candidate))
                            .collect();
                    }
                }
            }
        }
        if set.len() > 1 {
            debug!(word, candidates = set.len(), "expanded");
        }
        set
    }

    fn settle_from(&self, first_rule: usize, word: &str) -> String {
        self.rules[first_rule..]
            .iter()
            .fold(word.to_owned(), |word, rule| rule.settle(&word))
    }

    fn round(&self, rule: &ExpansionRule, set: &CandidateSet) -> Round {
        let mut next = CandidateSet::default();
        for candidate in set.iter() {
            match rule.variants(candidate) {
                Some(variants) => {
                    for variant in variants {
                        if !next.contains(&variant) && next.len() >= self.max_candidates {
                            return Round::Capped;
                        }
                        next.insert(variant);
                    }
                }
                None => {
                    if !next.contains(candidate) && next.len() >= self.max_candidates {
                        return Round::Capped;
                    }
                    next.insert(candidate.to_owned());
                }
            }
        }
        if next.len() == set.len() && next.iter().all(|c| set.contains(c)) {
            Round::Stable
        } else {
            Round::Grew(next)
        }
    }
}
