//! Picks one spelling out of a candidate set.
//!
//! Frequency decides first; when no candidate is attested, the analyzability
//! oracle is asked in an order fixed by the [`TieBreak`] policy.
use crate::{
    frequency::FrequencyTable,
    oracle::{AnalyzabilityOracle, AnalyzerError},
    unicode::edit_distance,
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, trace};

/// Order in which unattested candidates are offered to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Closest to the raw mapped form first (Levenshtein), then first seen.
    #[default]
    Deterministic,
    /// Random order; reproducible when seeded.
    Shuffle { seed: Option<u64> },
}

pub struct Disambiguator {
    frequencies: FrequencyTable,
    oracle: Option<AnalyzabilityOracle>,
    tie_break: TieBreak,
    rng: Option<Mutex<StdRng>>,
}

impl Disambiguator {
    pub fn new(
        frequencies: FrequencyTable,
        oracle: Option<AnalyzabilityOracle>,
        tie_break: TieBreak,
    ) -> Self {
        let rng = match tie_break {
            TieBreak::Shuffle { seed: Some(seed) } => Some(Mutex::new(StdRng::seed_from_u64(seed))),
            _ => None,
        };
        Self {
            frequencies,
            oracle,
            tie_break,
            rng,
        }
    }

    #[inline]
    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    #[inline]
    pub fn oracle(&self) -> Option<&AnalyzabilityOracle> {
        self.oracle.as_ref()
    }

    #[inline]
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Choose the winner among `candidates`. `raw` is the mapped form before
    /// expansion; it anchors the deterministic order.
    ///
    /// Returns `None` only for an empty slice.
    pub fn pick<'c>(
        &self,
        candidates: &'c [String],
        raw: &str,
    ) -> Result<Option<&'c str>, AnalyzerError> {
        match candidates {
            [] => return Ok(None),
            [only] => return Ok(Some(only)),
            _ => {}
        }

        let mut best: Option<(&str, u64)> = None;
        for candidate in candidates {
            if let Some(count) = self.frequencies.get(candidate)
                && best.is_none_or(|(_, top)| count > top)
            {
                best = Some((candidate, count));
            }
        }
        if let Some((winner, count)) = best {
            trace!(winner, count, "picked by frequency");
            return Ok(Some(winner));
        }

        let Some(oracle) = &self.oracle else {
            debug!(candidates = candidates.len(), "no frequency data, keeping first candidate");
            return Ok(Some(&candidates[0]));
        };
        for candidate in self.oracle_order(candidates, raw) {
            if oracle.analyzable(candidate)? {
                debug!(winner = candidate, "picked by analyzer");
                return Ok(Some(candidate));
            }
        }
        debug!(candidates = candidates.len(), "nothing analyzable, keeping first candidate");
        Ok(Some(&candidates[0]))
    }

    fn oracle_order<'c>(&self, candidates: &'c [String], raw: &str) -> Vec<&'c str> {
        let mut order: Vec<&str> = candidates.iter().map(String::as_str).collect();
        match self.tie_break {
            TieBreak::Deterministic => {
                order.sort_by_cached_key(|c| edit_distance(c, raw));
            }
            TieBreak::Shuffle { .. } => match &self.rng {
                Some(rng) => {
                    let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                    order.shuffle(&mut *rng);
                }
                None => order.shuffle(&mut rand::rng()),
            },
        }
        order
    }
}

impl std::fmt::Debug for Disambiguator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disambiguator")
            .field("frequencies", &self.frequencies.len())
            .field("oracle", &self.oracle.is_some())
            .field("tie_break", &self.tie_break)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::LexiconAnalyzer;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn freq(pairs: &[(&str, u64)]) -> FrequencyTable {
        pairs.iter().map(|&(w, n)| (w, n)).collect()
    }

    #[test]
    fn single_candidate_needs_no_lookup() {
        let d = Disambiguator::new(FrequencyTable::default(), None, TieBreak::default());
        let c = words(&["мон"]);
        assert_eq!(d.pick(&c, "мон").unwrap(), Some("мон"));
        assert_eq!(d.pick(&[], "мон").unwrap(), None);
    }

    #[test]
    fn highest_frequency_wins() {
        let d = Disambiguator::new(
            freq(&[("ватман", 3), ("вадман", 12)]),
            None,
            TieBreak::default(),
        );
        let c = words(&["вагман", "ватман", "вадман"]);
        assert_eq!(d.pick(&c, "ваˀман").unwrap(), Some("вадман"));
    }

    #[test]
    fn frequency_ties_keep_first_seen() {
        let d = Disambiguator::new(freq(&[("аа", 5), ("бб", 5)]), None, TieBreak::default());
        let c = words(&["вв", "бб", "аа"]);
        assert_eq!(d.pick(&c, "").unwrap(), Some("бб"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let d = Disambiguator::new(freq(&[("вадман", 1)]), None, TieBreak::default());
        let c = words(&["Ватман", "Вадман"]);
        assert_eq!(d.pick(&c, "").unwrap(), Some("Вадман"));
    }

    #[test]
    fn unattested_without_oracle_returns_first() {
        let d = Disambiguator::new(FrequencyTable::default(), None, TieBreak::default());
        let c = words(&["бб", "аа"]);
        assert_eq!(d.pick(&c, "аа").unwrap(), Some("бб"));
    }

    #[test]
    fn oracle_decides_unattested() {
        let oracle = AnalyzabilityOracle::new(LexiconAnalyzer::new(["кукы"]));
        let d = Disambiguator::new(FrequencyTable::default(), Some(oracle), TieBreak::default());
        let c = words(&["куки", "кукы", "куку"]);
        assert_eq!(d.pick(&c, "кукө").unwrap(), Some("кукы"));
    }

    #[test]
    fn nothing_analyzable_returns_first() {
        let oracle = AnalyzabilityOracle::new(LexiconAnalyzer::new(["мон"]));
        let d = Disambiguator::new(FrequencyTable::default(), Some(oracle), TieBreak::default());
        let c = words(&["куки", "кукы"]);
        assert_eq!(d.pick(&c, "кукө").unwrap(), Some("куки"));
    }

    #[test]
    fn deterministic_order_prefers_close_forms() {
        let d = Disambiguator::new(FrequencyTable::default(), None, TieBreak::Deterministic);
        let c = words(&["ааааа", "аб", "ааб"]);
        assert_eq!(d.oracle_order(&c, "аб"), ["аб", "ааб", "ааааа"]);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let c = words(&["а", "б", "в", "г", "д", "е", "ж"]);
        let a = Disambiguator::new(
            FrequencyTable::default(),
            None,
            TieBreak::Shuffle { seed: Some(7) },
        );
        let b = Disambiguator::new(
            FrequencyTable::default(),
            None,
            TieBreak::Shuffle { seed: Some(7) },
        );
        assert_eq!(a.oracle_order(&c, ""), b.oracle_order(&c, ""));
        let mut sorted = a.oracle_order(&c, "");
        sorted.sort_unstable();
        assert_eq!(sorted, ["а", "б", "в", "г", "д", "е", "ж"]);
    }
}
