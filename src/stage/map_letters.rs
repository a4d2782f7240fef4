//! src/stage/map_letters.rs
//!
//! Letter-by-letter mapping through a [`LetterTable`].
//!
//! Lookup is on the lower-case letter; the output is upper-cased when the
//! input letter is not lower-case. Characters the table does not know pass
//! through untouched, so a later stage (or the variant expander) can still
//! see them.
use crate::{
    context::Context,
    script::LetterTable,
    stage::{Stage, StageError, finish},
    unicode::{APOSTROPHES, PALATAL_MARK, to_lower},
};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy)]
pub struct MapLetters {
    pub table: &'static LetterTable,
}

impl MapLetters {
    pub const fn new(table: &'static LetterTable) -> Self {
        Self { table }
    }
}

impl Stage for MapLetters {
    fn name(&self) -> &'static str {
        self.table.name
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(text.chars().any(|c| self.table.get(to_lower(c)).is_some()))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        let mut out = String::with_capacity(text.len() * 2);
        let mut changed = false;
        for c in text.chars() {
            match self.table.get(to_lower(c)) {
                Some(mapped) if c.is_lowercase() => {
                    out.push_str(mapped);
                    changed = true;
                }
                Some(mapped) => {
                    out.extend(mapped.chars().flat_map(char::to_uppercase));
                    changed = true;
                }
                None => out.push(c),
            }
        }
        Ok(finish(text, out, changed))
    }
}

/// Typed apostrophes (`'`, `’`) → the palatalization mark `ʼ`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeApostrophe;

impl Stage for NormalizeApostrophe {
    fn name(&self) -> &'static str {
        "normalize_apostrophe"
    }

    #[inline(always)]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(text.contains(APOSTROPHES))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(APOSTROPHES) {
            return Ok(text);
        }
        let mut buf = [0u8; 4];
        let mark: &str = PALATAL_MARK.encode_utf8(&mut buf);
        Ok(Cow::Owned(text.replace(APOSTROPHES, mark)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert_stage_contract,
        script::data::{BESERMAN_LATIN, CYRILLIC_TO_LATIN, TATYSHLY_LATIN},
        testing::stage_contract::{
            StageTestConfig, needs_apply_is_accurate, no_panic_on_mixed_scripts,
            stage_is_idempotent, zero_copy_when_no_changes,
        },
    };

    impl StageTestConfig for MapLetters {
        fn samples() -> &'static [&'static str] {
            &["vala", "ŋ", "мон", "kə̑l", "1990", ""]
        }
        fn should_pass_through() -> &'static [&'static str] {
            &["мон", "1990 !", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("vala", "вала"), ("Mon", "Мон"), ("ČAJ", "ЧАЙ")]
        }
    }

    impl StageTestConfig for NormalizeApostrophe {
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("van'", "vanʼ"), ("kyl’", "kylʼ")]
        }
    }

    #[test]
    fn latin_tables() {
        let stage = MapLetters::new(&TATYSHLY_LATIN);
        zero_copy_when_no_changes(stage);
        stage_is_idempotent(stage);
        needs_apply_is_accurate(stage);
        no_panic_on_mixed_scripts(stage);
        needs_apply_is_accurate(MapLetters::new(&BESERMAN_LATIN));
    }

    #[test]
    fn unknown_symbols_survive() {
        let ctx = Context::default();
        let out = MapLetters::new(&TATYSHLY_LATIN)
            .apply(Cow::Borrowed("vaˀmort"), &ctx)
            .unwrap();
        assert_eq!(out, "ваˀморт");
        let out = MapLetters::new(&TATYSHLY_LATIN)
            .apply(Cow::Borrowed("ŋüə"), &ctx)
            .unwrap();
        assert_eq!(out, "ŋüө");
    }

    #[test]
    fn cyrillic_soft_vowels_carry_mark() {
        let ctx = Context::default();
        let out = MapLetters::new(&CYRILLIC_TO_LATIN)
            .apply(Cow::Borrowed("Ялан"), &ctx)
            .unwrap();
        assert_eq!(out, "ʼAlan");
    }

    #[test]
    fn apostrophe_contract() {
        assert_stage_contract!(NormalizeApostrophe);
    }
}
