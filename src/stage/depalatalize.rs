//! src/stage/depalatalize.rs
//!
//! A palatalized hush sibilant is spelled with the hiss letter: `ш`/`ж`
//! before `ʼ` or a soft vowel become `с`/`з` (`шʼ` → `сʼ`, `жя` → `зя`).
use crate::{
    context::Context,
    stage::{Stage, StageError, finish},
    unicode::PALATAL_MARK,
};
use std::borrow::Cow;

const PALATALIZERS: &[char] = &[PALATAL_MARK, 'я', 'ё', 'ю', 'и', 'е', 'Я', 'Ё', 'Ю', 'И', 'Е'];

#[inline(always)]
fn hiss_of(c: char) -> Option<char> {
    match c {
        'ш' => Some('с'),
        'ж' => Some('з'),
        'Ш' => Some('С'),
        'Ж' => Some('З'),
        _ => None,
    }
}

pub struct Depalatalize;

impl Stage for Depalatalize {
    fn name(&self) -> &'static str {
        "depalatalize"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if hiss_of(c).is_some() && chars.peek().is_some_and(|n| PALATALIZERS.contains(n)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        let mut out = String::with_capacity(text.len());
        let mut changed = false;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match hiss_of(c) {
                Some(hiss) if chars.peek().is_some_and(|n| PALATALIZERS.contains(n)) => {
                    out.push(hiss);
                    changed = true;
                }
                _ => out.push(c),
            }
        }
        Ok(finish(text, out, changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_stage_contract, testing::stage_contract::StageTestConfig};

    impl StageTestConfig for Depalatalize {
        fn samples() -> &'static [&'static str] {
            &["шур", "жʼ", "Шю", "ушшʼ", "ӝуж", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[
                ("шʼӧд", "сʼӧд"),
                ("жя", "зя"),
                ("ШЕ", "СЕ"),
                ("пашшʼ", "пашсʼ"),
            ]
        }
    }

    #[test]
    fn universal_contract() {
        assert_stage_contract!(Depalatalize);
    }

    #[test]
    fn hard_vowels_do_not_trigger() {
        let ctx = Context::default();
        assert!(!Depalatalize.needs_apply("шар жуг", &ctx).unwrap());
    }
}
