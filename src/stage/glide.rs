//! src/stage/glide.rs
//!
//! Glide `й` merged into the following hard vowel: the standard orthography
//! writes `йа` as `я` after vowels and at the start of a word.
use crate::{
    context::Context,
    stage::{Stage, StageError, at_word_start, in_class},
    unicode::{PALATAL_MARK, to_upper},
};
use std::borrow::Cow;

/// Left context of an intervocalic glide (vowels and the palatal mark).
const VOWEL_LEFT: &[char] = &[
    'а', 'е', 'ё', 'и', 'ӥ', 'о', 'ӧ', 'ө', 'у', 'ы', 'э', 'ю', 'я', PALATAL_MARK,
];
const HARD_VOWELS: &[char] = &['а', 'э', 'о', 'у'];
const HARD_VOWELS_ANY_CASE: &[char] = &['а', 'э', 'о', 'у', 'А', 'Э', 'О', 'У'];

/// `VйV` → `V` + soft vowel (case-insensitive).
#[inline(always)]
fn intervocalic(chars: &[char], i: usize) -> bool {
    matches!(chars[i], 'й' | 'Й')
        && i > 0
        && in_class(chars[i - 1], VOWEL_LEFT)
        && chars.get(i + 1).is_some_and(|&v| in_class(v, HARD_VOWELS))
}

/// Word-initial lower-case `йV`.
#[inline(always)]
fn initial(chars: &[char], i: usize) -> bool {
    chars[i] == 'й'
        && at_word_start(chars, i)
        && chars.get(i + 1).is_some_and(|v| HARD_VOWELS.contains(v))
}

/// Word-initial capital `Й` before a vowel of either case.
#[inline(always)]
fn initial_capital(chars: &[char], i: usize) -> bool {
    chars[i] == 'Й'
        && at_word_start(chars, i)
        && chars.get(i + 1).is_some_and(|v| HARD_VOWELS_ANY_CASE.contains(v))
}

/// One left-to-right, non-overlapping pass of a glide rule.
fn merge_pass(
    chars: &[char],
    site: fn(&[char], usize) -> bool,
    soften: impl Fn(char) -> Option<char>,
) -> Option<Vec<char>> {
    let mut out = Vec::with_capacity(chars.len());
    let mut changed = false;
    let mut i = 0;
    while i < chars.len() {
        if site(chars, i)
            && let Some(soft) = soften(chars[i + 1])
        {
            out.push(soft);
            changed = true;
            i += 2;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    changed.then_some(out)
}

pub struct MergeGlides;

impl Stage for MergeGlides {
    fn name(&self) -> &'static str {
        "merge_glides"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if !text.contains(['й', 'Й']) {
            return Ok(false);
        }
        let chars: Vec<char> = text.chars().collect();
        Ok((0..chars.len())
            .any(|i| intervocalic(&chars, i) || initial(&chars, i) || initial_capital(&chars, i)))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(['й', 'Й']) {
            return Ok(text);
        }
        let mut chars: Vec<char> = text.chars().collect();
        let mut changed = false;

        let keep_case = |v: char| ctx.soft_vowel(v);
        let upper = |v: char| ctx.soft_vowel(v).map(to_upper);
        // Twice: the first pass cannot see a glide whose left vowel it just consumed.
        let passes: [(fn(&[char], usize) -> bool, &dyn Fn(char) -> Option<char>); 4] = [
            (intervocalic, &keep_case),
            (intervocalic, &keep_case),
            (initial, &keep_case),
            (initial_capital, &upper),
        ];
        for (site, soften) in passes {
            if let Some(next) = merge_pass(&chars, site, soften) {
                chars = next;
                changed = true;
            }
        }

        if !changed {
            return Ok(text);
        }
        Ok(Cow::Owned(chars.into_iter().collect()))
    }
}
