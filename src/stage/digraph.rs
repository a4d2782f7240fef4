//! stage/digraph.rs – **Diacritic digraph normalizer**
//! * `JoinDigraphs`: base + combining mark (`u̯`, `u̇`, `ȯ`, `ə̑`, `ə̈`, `i̮`) → one symbol
//! * `SplitDigraphs`: the inverse, for targets that expect decomposed marks
//! * Precomposed and NFD spellings are both recognized; nothing else is normalized
use crate::{
    context::Context,
    script::data::{JOIN_DIGRAPHS, SPLIT_REDUCED_VOWELS},
    stage::{Stage, StageError, finish},
};
use icu_normalizer::{
    ComposingNormalizer, ComposingNormalizerBorrowed, DecomposingNormalizer,
    DecomposingNormalizerBorrowed,
};
use std::{borrow::Cow, sync::LazyLock};

// ── ICU4X ──
static ICU4X_NFC: LazyLock<ComposingNormalizerBorrowed> =
    LazyLock::new(ComposingNormalizer::new_nfc);
static ICU4X_NFD: LazyLock<DecomposingNormalizerBorrowed<'static>> =
    LazyLock::new(DecomposingNormalizer::new_nfd);

/// Every spelling of every joinable sequence, longest first.
static JOIN_TABLE: LazyLock<Vec<(String, &'static str)>> = LazyLock::new(|| {
    let mut table: Vec<(String, &'static str)> = Vec::with_capacity(JOIN_DIGRAPHS.len() * 2);
    for &(from, to) in JOIN_DIGRAPHS {
        for spelling in [
            from.to_owned(),
            ICU4X_NFC.normalize(from).into_owned(),
            ICU4X_NFD.normalize(from).into_owned(),
        ] {
            if !table.iter().any(|(k, _)| *k == spelling) {
                table.push((spelling, to));
            }
        }
    }
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
});

/// Collapse diacritic sequences into canonical single symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinDigraphs;

impl Stage for JoinDigraphs {
    fn name(&self) -> &'static str {
        "join_digraphs"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if text.is_ascii() {
            return Ok(false);
        }
        Ok(JOIN_TABLE.iter().any(|(k, _)| text.contains(k.as_str())))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        let mut out = String::with_capacity(text.len());
        let mut changed = false;
        let mut rest: &str = &text;
        while let Some(c) = rest.chars().next() {
            if let Some((key, to)) = JOIN_TABLE.iter().find(|(k, _)| rest.starts_with(k.as_str())) {
                out.push_str(to);
                rest = &rest[key.len()..];
                changed = true;
            } else {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
        Ok(finish(text, out, changed))
    }
}

/// Expand canonical symbols into base + combining mark.
#[derive(Debug, Clone, Copy)]
pub struct SplitDigraphs {
    pub symbols: &'static [(&'static str, &'static str)],
}

/// Every symbol `JoinDigraphs` can produce (except `w`, which UPA keeps).
#[cfg(test)]
pub const SPLIT_ALL: SplitDigraphs = SplitDigraphs {
    symbols: crate::script::data::SPLIT_DIGRAPHS,
};

/// Only the reduced vowels `ə` and `ɨ`.
pub const SPLIT_REDUCED: SplitDigraphs = SplitDigraphs {
    symbols: SPLIT_REDUCED_VOWELS,
};

impl SplitDigraphs {
    #[inline]
    fn lookup(&self, c: char) -> Option<&'static str> {
        let mut buf = [0u8; 4];
        let key: &str = c.encode_utf8(&mut buf);
        self.symbols
            .iter()
            .find(|(from, _)| *from == key)
            .map(|&(_, to)| to)
    }
}

impl Stage for SplitDigraphs {
    fn name(&self) -> &'static str {
        "split_digraphs"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(!text.is_ascii() && text.chars().any(|c| self.lookup(c).is_some()))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        let mut out = String::with_capacity(text.len() + 8);
        let mut changed = false;
        for c in text.chars() {
            match self.lookup(c) {
                Some(to) => {
                    out.push_str(to);
                    changed = true;
                }
                None => out.push(c),
            }
        }
        Ok(finish(text, out, changed))
    }
}
