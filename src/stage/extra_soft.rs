//! src/stage/extra_soft.rs
//!
//! Geminate softening: `CьC` before `ь` or a soft vowel is spelled `CC`
//! (`кыльля` → `кылля`).
use crate::{
    context::Context,
    stage::{Stage, StageError, finish, in_class},
};
use std::borrow::Cow;

const GEMINABLE: &[char] = &['д', 'з', 'л', 'н', 'с', 'т'];
const SOFT_FOLLOWERS: &[char] = &['ь', 'я', 'е', 'ё', 'и', 'ю'];

#[inline(always)]
fn site(chars: &[char], i: usize) -> bool {
    let c = chars[i];
    in_class(c, GEMINABLE)
        && chars.get(i + 1).is_some_and(|&s| matches!(s, 'ь' | 'Ь'))
        && chars.get(i + 2) == Some(&c)
        && chars.get(i + 3).is_some_and(|&f| in_class(f, SOFT_FOLLOWERS))
}

pub struct ExtraSoft;

impl Stage for ExtraSoft {
    fn name(&self) -> &'static str {
        "extra_soft"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if !text.contains(['ь', 'Ь']) {
            return Ok(false);
        }
        let chars: Vec<char> = text.chars().collect();
        Ok((0..chars.len()).any(|i| site(&chars, i)))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(['ь', 'Ь']) {
            return Ok(text);
        }
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut changed = false;
        let mut i = 0;
        while i < chars.len() {
            if site(&chars, i) {
                out.push(chars[i]);
                out.push(chars[i]);
                changed = true;
                i += 3;
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

    impl StageTestConfig for ExtraSoft {
        fn samples() -> &'static [&'static str] {
            &["кыль", "пальлы", "тыльтя", "ланьне", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[
                ("кыльля", "кылля"),
                ("сьсь", "ссь"),
                ("ТЬТЕ", "ТТЕ"),
            ]
        }
    }

    #[test]
    fn universal_contract() {
        assert_stage_contract!(ExtraSoft);
    }

    #[test]
    fn different_consonants_are_kept() {
        let ctx = Context::default();
        assert!(!ExtraSoft.needs_apply("ланьне", &ctx).unwrap());
        assert!(!ExtraSoft.needs_apply("ньнa", &ctx).unwrap());
    }
}
