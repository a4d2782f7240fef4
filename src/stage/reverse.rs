//! src/stage/reverse.rs
//!
//! Steps of the standard Cyrillic → dictionary Latin cascade that depend on
//! context. Plain letter mapping and the literal fix-ups are done by
//! [`MapLetters`](crate::stage::map_letters::MapLetters) and
//! [`LiteralReplace`](crate::stage::literal::LiteralReplace).
use crate::{
    context::Context,
    stage::{Stage, StageError, at_word_start, finish, in_class},
    unicode::PALATAL_MARK,
};
use std::borrow::Cow;

const LATIN_VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'ɨ', 'ə', 'ɤ'];
/// `i` never follows a glide in the dictionary spelling.
const LATIN_GLIDE_VOWELS: &[char] = &['a', 'e', 'o', 'u', 'ɨ', 'ə', 'ɤ'];
const LATIN_HARD_CONSONANTS: &[char] =
    &['b', 'v', 'g', 'z', 'k', 'm', 'p', 'r', 'f', 'x', 'c', 'w', 'j'];
const LATIN_GEMINABLE: &[char] = &['d', 'ž', 'l', 'n', 'š', 't'];

#[inline(always)]
fn collect(text: &str) -> Vec<char> {
    text.chars().collect()
}

// ---------------------------------------------------------------------------
//    у → w
// ---------------------------------------------------------------------------

/// `у` before `а о э и`, word-initially or after `к`/`р`, is the labial glide.
pub struct LabialGlide;

const GLIDE_NEXT: &[char] = &['а', 'о', 'э', 'и'];

impl LabialGlide {
    fn rewrite(chars: &[char]) -> Option<String> {
        let mut out = String::with_capacity(chars.len() * 2);
        let mut changed = false;
        let mut p = 0;
        while p < chars.len() {
            let c = chars[p];
            if c == 'у'
                && at_word_start(chars, p)
                && chars.get(p + 1).is_some_and(|n| GLIDE_NEXT.contains(n))
            {
                out.push('w');
                changed = true;
                p += 1;
                continue;
            }
            if matches!(c, 'к' | 'р')
                && chars.get(p + 1) == Some(&'у')
                && chars.get(p + 2).is_some_and(|n| GLIDE_NEXT.contains(n))
            {
                out.push(c);
                out.push('w');
                changed = true;
                p += 2;
                continue;
            }
            out.push(c);
            p += 1;
        }
        changed.then_some(out)
    }
}

impl Stage for LabialGlide {
    fn name(&self) -> &'static str {
        "labial_glide"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(text.contains('у') && Self::rewrite(&collect(text)).is_some())
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains('у') {
            return Ok(text);
        }
        Ok(match Self::rewrite(&collect(&text)) {
            Some(out) => Cow::Owned(out),
            None => text,
        })
    }
}

// ---------------------------------------------------------------------------
//    ʼ + vowel → j
// ---------------------------------------------------------------------------

/// `VʼV` → `VjV`, then word-initial `ʼV` → `jV`.
pub struct LatinGlides;

impl LatinGlides {
    fn intervocalic(chars: &[char]) -> Option<Vec<char>> {
        let mut out = Vec::with_capacity(chars.len());
        let mut changed = false;
        let mut p = 0;
        while p < chars.len() {
            if LATIN_VOWELS.contains(&chars[p])
                && chars.get(p + 1) == Some(&PALATAL_MARK)
                && chars.get(p + 2).is_some_and(|v| LATIN_GLIDE_VOWELS.contains(v))
            {
                out.extend([chars[p], 'j', chars[p + 2]]);
                changed = true;
                p += 3;
                continue;
            }
            out.push(chars[p]);
            p += 1;
        }
        changed.then_some(out)
    }

    fn initial(chars: &[char]) -> Option<Vec<char>> {
        let mut changed = false;
        let out = chars
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                if c == PALATAL_MARK
                    && at_word_start(chars, i)
                    && chars.get(i + 1).is_some_and(|v| LATIN_GLIDE_VOWELS.contains(v))
                {
                    changed = true;
                    'j'
                } else {
                    c
                }
            })
            .collect();
        changed.then_some(out)
    }

    fn rewrite(chars: Vec<char>) -> Option<Vec<char>> {
        let (chars, first) = match Self::intervocalic(&chars) {
            Some(next) => (next, true),
            None => (chars, false),
        };
        match Self::initial(&chars) {
            Some(next) => Some(next),
            None => first.then_some(chars),
        }
    }
}

impl Stage for LatinGlides {
    fn name(&self) -> &'static str {
        "latin_glides"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(text.contains(PALATAL_MARK) && Self::rewrite(collect(text)).is_some())
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(text);
        }
        Ok(match Self::rewrite(collect(&text)) {
            Some(out) => Cow::Owned(out.into_iter().collect()),
            None => text,
        })
    }
}

// ---------------------------------------------------------------------------
//    č/ǯ carry the mark
// ---------------------------------------------------------------------------

/// The dictionary spelling writes the affricates as `čʼ`/`ǯʼ`.
pub struct AffricateMark;

#[inline(always)]
fn is_latin_affricate(c: char) -> bool {
    matches!(c, 'č' | 'ǯ' | 'Č' | 'Ǯ')
}

impl Stage for AffricateMark {
    fn name(&self) -> &'static str {
        "affricate_mark"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if is_latin_affricate(c) && chars.peek() != Some(&PALATAL_MARK) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        let mut out = String::with_capacity(text.len() + 4);
        let mut changed = false;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            out.push(c);
            if is_latin_affricate(c) && chars.peek() != Some(&PALATAL_MARK) {
                out.push(PALATAL_MARK);
                changed = true;
            }
        }
        Ok(finish(text, out, changed))
    }
}

// ---------------------------------------------------------------------------
//    Marks that carry no information
// ---------------------------------------------------------------------------

/// Drop `ʼ` where the context decides. The predicate sees the input chars.
fn drop_marks(chars: &[char], keep: impl Fn(&[char], usize) -> bool) -> Option<String> {
    let mut out = String::with_capacity(chars.len() * 2);
    let mut changed = false;
    for (i, &c) in chars.iter().enumerate() {
        if c == PALATAL_MARK && !keep(chars, i) {
            changed = true;
            continue;
        }
        out.push(c);
    }
    changed.then_some(out)
}

/// No soft counterpart: `ʼ` after `b v g z k m p r f x c w j` is dropped.
pub struct DropHardMark;

impl DropHardMark {
    fn keep(chars: &[char], i: usize) -> bool {
        !(i > 0 && in_class(chars[i - 1], LATIN_HARD_CONSONANTS))
    }
}

impl Stage for DropHardMark {
    fn name(&self) -> &'static str {
        "drop_hard_mark"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(false);
        }
        let chars = collect(text);
        Ok((0..chars.len()).any(|i| chars[i] == PALATAL_MARK && !Self::keep(&chars, i)))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(text);
        }
        Ok(match drop_marks(&collect(&text), Self::keep) {
            Some(out) => Cow::Owned(out),
            None => text,
        })
    }
}

/// `ʼ` after a vowel or at the start of a word is dropped.
pub struct DropVowelMark;

impl DropVowelMark {
    fn keep(chars: &[char], i: usize) -> bool {
        let after_vowel = i > 0 && LATIN_VOWELS.contains(&chars[i - 1]);
        !(after_vowel || at_word_start(chars, i))
    }
}

impl Stage for DropVowelMark {
    fn name(&self) -> &'static str {
        "drop_vowel_mark"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(false);
        }
        let chars = collect(text);
        Ok((0..chars.len()).any(|i| chars[i] == PALATAL_MARK && !Self::keep(&chars, i)))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(text);
        }
        Ok(match drop_marks(&collect(&text), Self::keep) {
            Some(out) => Cow::Owned(out),
            None => text,
        })
    }
}

/// `ʼʼ…` → `ʼ`.
pub struct CollapseMarks;

impl Stage for CollapseMarks {
    fn name(&self) -> &'static str {
        "collapse_marks"
    }

    #[inline(always)]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(text.contains("ʼʼ"))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains("ʼʼ") {
            return Ok(text);
        }
        let chars = collect(&text);
        let out = drop_marks(&chars, |c, i| !(i > 0 && c[i - 1] == PALATAL_MARK));
        Ok(out.map_or(text, Cow::Owned))
    }
}

// ---------------------------------------------------------------------------
//    Geminates
// ---------------------------------------------------------------------------

/// `CCʼ` → `CʼCʼ` for `d ž l n š t`: each half of a soft geminate is marked.
pub struct ExtraSoftLatin;

#[inline(always)]
fn geminate_site(chars: &[char], i: usize) -> bool {
    LATIN_GEMINABLE.contains(&chars[i])
        && chars.get(i + 1) == Some(&chars[i])
        && chars.get(i + 2) == Some(&PALATAL_MARK)
}

impl Stage for ExtraSoftLatin {
    fn name(&self) -> &'static str {
        "extra_soft_latin"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(false);
        }
        let chars = collect(text);
        Ok((0..chars.len()).any(|i| geminate_site(&chars, i)))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        if !text.contains(PALATAL_MARK) {
            return Ok(text);
        }
        let chars = collect(&text);
        let mut out = String::with_capacity(text.len() + 4);
        let mut changed = false;
        let mut i = 0;
        while i < chars.len() {
            if geminate_site(&chars, i) {
                out.extend([chars[i], PALATAL_MARK, chars[i]]);
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

    impl StageTestConfig for LabialGlide {
        fn samples() -> &'static [&'static str] {
            &["уа", "куараны", "тау", "уж", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("уа", "wа"), ("куараны", "кwараны"), ("тэ уэм", "тэ wэм")]
        }
    }

    impl StageTestConfig for LatinGlides {
        fn samples() -> &'static [&'static str] {
            &["ʼalan", "kɨlʼ", "taʼa", "vala", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("ʼalan", "jalan"), ("vuʼo", "vujo"), ("ʼoʼa", "joja")]
        }
    }

    impl StageTestConfig for AffricateMark {
        fn samples() -> &'static [&'static str] {
            &["čaj", "ǯʼuč", "kɨl", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("čaj", "čʼaj"), ("ČUŽ", "ČʼUŽ")]
        }
    }

    impl StageTestConfig for DropHardMark {
        fn samples() -> &'static [&'static str] {
            &["pʼi", "kɨlʼ", "vʼ", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("pʼi", "pi"), ("Mʼa", "Ma")]
        }
    }

    impl StageTestConfig for DropVowelMark {
        fn samples() -> &'static [&'static str] {
            &["aʼ", "kɨlʼ", "ʼ", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("vaʼ", "va"), ("ʼn", "n")]
        }
    }

    impl StageTestConfig for CollapseMarks {
        fn samples() -> &'static [&'static str] {
            &["lʼʼa", "lʼa", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("lʼʼʼa", "lʼa")]
        }
    }

    impl StageTestConfig for ExtraSoftLatin {
        fn samples() -> &'static [&'static str] {
            &["kɨllʼa", "kɨlʼ", "ttʼ", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("kɨllʼa", "kɨlʼlʼa"), ("šošʼšʼ", "šošʼšʼ")]
        }
    }

    #[test]
    fn universal_contracts() {
        assert_stage_contract!(LabialGlide);
        assert_stage_contract!(LatinGlides);
        assert_stage_contract!(AffricateMark);
        assert_stage_contract!(DropHardMark);
        assert_stage_contract!(DropVowelMark);
        assert_stage_contract!(CollapseMarks);
        assert_stage_contract!(ExtraSoftLatin);
    }

    #[test]
    fn glide_vowel_pairs_do_not_overlap() {
        let ctx = Context::default();
        let out = LatinGlides.apply(Cow::Borrowed("aʼaʼa"), &ctx).unwrap();
        assert_eq!(out, "ajaʼa");
    }

    #[test]
    fn hard_mark_lookbehind_reads_input() {
        let ctx = Context::default();
        assert_eq!(DropHardMark.apply(Cow::Borrowed("bʼʼ"), &ctx).unwrap(), "bʼ");
    }
}
