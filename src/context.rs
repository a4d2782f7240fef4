// src/context.rs
// Single source of truth for the dialect pair in hot paths.
// Tiny, Copy, and contains only 'static data.

use crate::script::{DialectPair, Script, data::HARD_TO_SOFT};
use crate::unicode::{to_lower, to_upper};

/// Runtime context passed to every rewrite stage.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub pair: DialectPair,
}

impl Default for Context {
    #[inline(always)]
    fn default() -> Self {
        Self::new(DialectPair::new(Script::TatyshlyLatin, Script::Standard))
    }
}

impl Context {
    #[inline(always)]
    pub const fn new(pair: DialectPair) -> Self {
        Self { pair }
    }

    /// Soft counterpart of a hard vowel, keeping the case of `vowel`.
    #[inline]
    pub fn soft_vowel(&self, vowel: char) -> Option<char> {
        let soft = HARD_TO_SOFT.get(&to_lower(vowel)).copied()?;
        Some(if vowel.is_uppercase() {
            to_upper(soft)
        } else {
            soft
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_vowel_keeps_case() {
        let ctx = Context::default();
        assert_eq!(ctx.soft_vowel('а'), Some('я'));
        assert_eq!(ctx.soft_vowel('У'), Some('Ю'));
        assert_eq!(ctx.soft_vowel('Ӥ'), Some('И'));
        assert_eq!(ctx.soft_vowel('к'), None);
    }
}
