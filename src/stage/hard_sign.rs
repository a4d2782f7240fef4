//! src/stage/hard_sign.rs
//!
//! Consonant + glide + vowel is spelled with the separating hard sign:
//! `кйа` → `къя`, `ДЙӤ` → `ДЪИ`.
use crate::{
    context::Context,
    stage::{Stage, StageError, finish, in_class},
};
use std::borrow::Cow;

const CONSONANTS: &[char] = &[
    'б', 'в', 'г', 'д', 'ж', 'з', 'ӟ', 'к', 'л', 'м', 'н', 'п', 'р', 'с', 'т', 'ў', 'ф', 'х', 'ц',
    'ч', 'ш', 'щ',
];
const VOWELS: &[char] = &['а', 'я', 'э', 'е', 'ӥ', 'о', 'ё', 'у', 'ю'];

#[inline(always)]
fn site(chars: &[char], i: usize) -> bool {
    matches!(chars[i], 'й' | 'Й')
        && i > 0
        && in_class(chars[i - 1], CONSONANTS)
        && chars.get(i + 1).is_some_and(|&v| in_class(v, VOWELS))
}

pub struct HardSign;

impl Stage for HardSign {
    fn name(&self) -> &'static str {
        "hard_sign"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if !text.contains(['й', 'Й']) {
            return Ok(false);
        }
        let chars: Vec<char> = text.chars().collect();
        Ok((0..chars.len()).any(|i| site(&chars, i)))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(['й', 'Й']) {
            return Ok(text);
        }
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len() + 2);
        let mut changed = false;
        let mut i = 0;
        while i < chars.len() {
            if site(&chars, i)
                && let Some(soft) = ctx.soft_vowel(chars[i + 1])
            {
                out.push(if chars[i] == 'Й' { 'Ъ' } else { 'ъ' });
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
