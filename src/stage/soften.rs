//! src/stage/soften.rs
//!
//! Palatalization mark + hard vowel → soft vowel letter.
//!
//! `кʼа` → `кя`, `лʼУ` → `лЮ`. After the affricates `ч` and `ӟ` the mark is
//! redundant and the vowel stays hard; the mark itself is removed later by
//! [`DropAffricateMark`](crate::stage::affricate::DropAffricateMark).
use crate::{
    context::Context,
    stage::{Stage, StageError, finish, in_class},
    unicode::PALATAL_MARK,
};
use std::borrow::Cow;

const HARD_VOWELS: &[char] = &['а', 'э', 'ӥ', 'о', 'у'];
const AFFRICATES: &[char] = &['ч', 'ӟ'];

pub struct Soften;

#[inline(always)]
fn site(chars: &[char], i: usize) -> bool {
    chars[i] == PALATAL_MARK
        && chars.get(i + 1).is_some_and(|&v| in_class(v, HARD_VOWELS))
        && !(i > 0 && in_class(chars[i - 1], AFFRICATES))
}

impl Stage for Soften {
    fn name(&self) -> &'static str {
        "soften"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(false);
        }
        let chars: Vec<char> = text.chars().collect();
        Ok((0..chars.len()).any(|i| site(&chars, i)))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(text);
        }
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut changed = false;
        let mut i = 0;
        while i < chars.len() {
            if site(&chars, i)
                && let Some(soft) = ctx.soft_vowel(chars[i + 1])
            {
                out.push(soft);
                changed = true;
                i += 2;
                continue;
            }
            out.push(chars[i]);
            i += 1;
        }
        Ok(finish(text, out, changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_stage_contract, testing::stage_contract::StageTestConfig};

    impl StageTestConfig for Soften {
        fn samples() -> &'static [&'static str] {
            &["кылʼ", "кʼа", "чʼу", "ӞʼА", "нʼӥ", "мон", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[
                ("вуэнʼа", "вуэня"),
                ("лʼУ", "лЮ"),
                ("тʼӥ", "ти"),
                ("кʼоз", "кёз"),
            ]
        }
    }

    #[test]
    fn universal_contract() {
        assert_stage_contract!(Soften);
    }

    #[test]
    fn affricate_keeps_hard_vowel() {
        let ctx = Context::default();
        assert_eq!(Soften.apply(Cow::Borrowed("чʼа"), &ctx).unwrap(), "чʼа");
        assert_eq!(Soften.apply(Cow::Borrowed("Ӟʼо"), &ctx).unwrap(), "Ӟʼо");
    }
}
