//! src/stage/neutral_vowel.rs
//!
//! Front vowels after consonants that have no hard/soft contrast.
//!
//! 1. `э`/`ӥ` after `б в г ж к м п р ф х ц ч ш щ й ʼ` → `е`/`и`
//! 2. `ӥ` after a vowel, `ʼ`, one of the neutral consonants, or at the start
//!    of a word → `и`
use crate::{
    context::Context,
    stage::{Stage, StageError, at_word_start, in_class},
    unicode::{PALATAL_MARK, to_lower},
};
use std::borrow::Cow;

const NEUTRAL_CONSONANTS: &[char] = &[
    'б', 'в', 'г', 'ж', 'к', 'м', 'п', 'р', 'ф', 'х', 'ц', 'ч', 'ш', 'щ', 'й', PALATAL_MARK,
];

const I_LEFT: &[char] = &[
    'б', 'в', 'г', 'ж', 'к', 'м', 'п', 'р', 'ф', 'х', 'ц', 'ч', PALATAL_MARK, 'а', 'о', 'э', 'ӥ',
    'у', 'ў', 'я', 'ё', 'е', 'и', 'ю', 'ө',
];

#[inline(always)]
fn is_dotted_i(c: char) -> bool {
    to_lower(c) == 'ӥ'
}

#[inline(always)]
fn plain_i(of: char) -> char {
    if of.is_uppercase() { 'И' } else { 'и' }
}

fn after_neutral_consonant(chars: &[char], ctx: &Context) -> Option<Vec<char>> {
    let mut changed = false;
    let out = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if in_class(c, &['э', 'ӥ'])
                && i > 0
                && in_class(chars[i - 1], NEUTRAL_CONSONANTS)
                && let Some(soft) = ctx.soft_vowel(c)
            {
                changed = true;
                soft
            } else {
                c
            }
        })
        .collect();
    changed.then_some(out)
}

fn dotted_i(chars: &[char]) -> Option<Vec<char>> {
    let mut out = Vec::with_capacity(chars.len());
    let mut changed = false;
    let mut p = 0;
    while p < chars.len() {
        // A left-context letter followed by `ӥ` is consumed as a pair; this
        // takes priority over a word-initial `ӥ` at the same position.
        if in_class(chars[p], I_LEFT) && chars.get(p + 1).is_some_and(|&n| is_dotted_i(n)) {
            out.push(chars[p]);
            out.push(plain_i(chars[p + 1]));
            changed = true;
            p += 2;
            continue;
        }
        if is_dotted_i(chars[p]) && at_word_start(chars, p) {
            out.push(plain_i(chars[p]));
            changed = true;
        } else {
            out.push(chars[p]);
        }
        p += 1;
    }
    changed.then_some(out)
}

pub struct NeutralVowels;

impl Stage for NeutralVowels {
    fn name(&self) -> &'static str {
        "neutral_vowels"
    }

    #[inline]
    fn needs_apply(&self, text: &str, ctx: &Context) -> Result<bool, StageError> {
        if !text.contains(['э', 'Э', 'ӥ', 'Ӥ']) {
            return Ok(false);
        }
        let chars: Vec<char> = text.chars().collect();
        Ok(after_neutral_consonant(&chars, ctx).is_some() || dotted_i(&chars).is_some())
    }

    fn apply<'a>(&self, text: Cow<'a, str>, ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(['э', 'Э', 'ӥ', 'Ӥ']) {
            return Ok(text);
        }
        let mut chars: Vec<char> = text.chars().collect();
        let mut changed = false;
        if let Some(next) = after_neutral_consonant(&chars, ctx) {
            chars = next;
            changed = true;
        }
        if let Some(next) = dotted_i(&chars) {
            chars = next;
            changed = true;
        }
        if !changed {
            return Ok(text);
        }
        Ok(Cow::Owned(chars.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_stage_contract, testing::stage_contract::StageTestConfig};

    impl StageTestConfig for NeutralVowels {
        fn samples() -> &'static [&'static str] {
            &["тэ", "дӥсь", "лэсьтӥз", "кин", "эш", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[
                ("пэрэс", "перес"),
                ("кӥ", "ки"),
                ("ӥлы", "илы"),
                ("ваӥ", "ваи"),
                ("КӤ", "КИ"),
            ]
        }
    }

    #[test]
    fn universal_contract() {
        assert_stage_contract!(NeutralVowels);
    }

    #[test]
    fn contrastive_consonants_keep_hard_vowel() {
        let ctx = Context::default();
        for word in ["тэ", "дӥсь", "сэрег", "зӥбыны"] {
            let out = NeutralVowels.apply(Cow::Borrowed(word), &ctx).unwrap();
            assert_eq!(out, word);
        }
    }

    #[test]
    fn dotted_i_pairs_do_not_overlap() {
        let ctx = Context::default();
        assert_eq!(
            NeutralVowels.apply(Cow::Borrowed("аӥӥ"), &ctx).unwrap(),
            "аиӥ"
        );
    }
}
