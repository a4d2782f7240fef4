//! Core rewrite stage abstraction.
//!
//! Every step of the contextual cascade, the letter mapping and the text
//! cleanup is a [`Stage`]: a pure `Cow<str>` → `Cow<str>` rewrite with a cheap
//! pre-check. A stage that finds nothing to do must hand back the borrowed
//! input untouched, so a cascade over a clean candidate never allocates.

pub mod affricate;
pub mod cleanup;
pub mod depalatalize;
pub mod digraph;
pub mod extra_soft;
pub mod glide;
pub mod hard_sign;
pub mod literal;
pub mod map_letters;
pub mod neutral_vowel;
pub mod reverse;
pub mod soften;

use crate::{
    context::Context,
    unicode::{is_word_char, to_lower},
};
use std::borrow::Cow;
use thiserror::Error;

/// Public error type for every stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("rewrite failed at stage `{0}`: {1}")]
    Failed(&'static str, String),
}

/// A single rewrite step.
pub trait Stage: Send + Sync {
    /// Human-readable name, used for tracing and error messages.
    fn name(&self) -> &'static str;

    /// Fast pre-check. Returning `Ok(false)` skips the whole stage.
    fn needs_apply(&self, text: &str, ctx: &Context) -> Result<bool, StageError>;

    /// Allocation-aware transformation. Must always be correct, even when
    /// called without a prior `needs_apply`.
    fn apply<'a>(&self, text: Cow<'a, str>, ctx: &Context) -> Result<Cow<'a, str>, StageError>;
}

/// Rebuild `text` from a char buffer, keeping the borrow when nothing changed.
#[inline]
pub(crate) fn finish<'a>(text: Cow<'a, str>, out: String, changed: bool) -> Cow<'a, str> {
    if changed { Cow::Owned(out) } else { text }
}

/// Case-insensitive membership of `c` in a lower-case letter class.
#[inline(always)]
pub(crate) fn in_class(c: char, class: &[char]) -> bool {
    class.contains(&to_lower(c))
}

/// Regex `\b` before position `i`, for a position that holds a word character.
#[inline(always)]
pub(crate) fn at_word_start(chars: &[char], i: usize) -> bool {
    i == 0 || !is_word_char(chars[i - 1])
}
