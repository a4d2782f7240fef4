//! src/stage/affricate.rs
//!
//! Final treatment of the palatalization mark:
//! * `DropAffricateMark`: `чʼ`/`ӟʼ` → `ч`/`ӟ` (these affricates are always soft)
//! * `SoftSign`: every remaining `ʼ` → `ь`
use crate::{
    context::Context,
    stage::{Stage, StageError, finish},
    unicode::PALATAL_MARK,
};
use std::borrow::Cow;

#[inline(always)]
fn is_soft_affricate(c: char) -> bool {
    matches!(c, 'ч' | 'ӟ' | 'Ч' | 'Ӟ')
}

pub struct DropAffricateMark;

impl Stage for DropAffricateMark {
    fn name(&self) -> &'static str {
        "drop_affricate_mark"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(false);
        }
        let mut prev = None;
        for c in text.chars() {
            if c == PALATAL_MARK && prev.is_some_and(is_soft_affricate) {
                return Ok(true);
            }
            prev = Some(c);
        }
        Ok(false)
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        let mut out = String::with_capacity(text.len());
        let mut changed = false;
        // Non-overlapping: the mark is dropped only right after an affricate
        // kept in the output, never after a previously dropped mark.
        let mut prev: Option<char> = None;
        for c in text.chars() {
            if c == PALATAL_MARK && prev.is_some_and(is_soft_affricate) {
                changed = true;
                prev = None;
                continue;
            }
            out.push(c);
            prev = Some(c);
        }
        Ok(finish(text, out, changed))
    }
}

/// `ʼ` → `ь`; `Ь` inside a word written in capitals.
pub struct SoftSign;

impl Stage for SoftSign {
    fn name(&self) -> &'static str {
        "soft_sign"
    }

    #[inline(always)]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(text.contains(PALATAL_MARK))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(text);
        }
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        for (i, &c) in chars.iter().enumerate() {
            if c != PALATAL_MARK {
                out.push(c);
                continue;
            }
            let upper_before = i > 0 && chars[i - 1].is_uppercase();
            let lower_after = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            out.push(if upper_before && !lower_after { 'Ь' } else { 'ь' });
        }
        Ok(Cow::Owned(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_stage_contract, testing::stage_contract::StageTestConfig};

    impl StageTestConfig for DropAffricateMark {
        fn samples() -> &'static [&'static str] {
            &["чʼ", "ӟʼуч", "кылʼ", "Чʼ", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("ӟʼуч", "ӟуч"), ("Чʼ", "Ч"), ("ачʼа", "ача")]
        }
    }

    impl StageTestConfig for SoftSign {
        fn samples() -> &'static [&'static str] {
            &["кылʼ", "ВАНʼ", "Тʼа", "мон", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("кылʼ", "кыль"), ("ВАНʼ", "ВАНЬ"), ("Лʼык", "Льык")]
        }
    }

    #[test]
    fn universal_contract() {
        assert_stage_contract!(DropAffricateMark);
        assert_stage_contract!(SoftSign);
    }
}
