//! Zero-copy split of text into maximal word-like and non-word spans.
//!
//! Concatenating the spans in order always reproduces the input exactly.
use crate::unicode::is_token_char;
use std::iter::FusedIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Letters, palatalization marks, combining diacritics, hyphens.
    Word,
    /// Whitespace, punctuation, digits and everything else.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub kind: SpanKind,
    pub text: &'a str,
}

impl Span<'_> {
    #[inline(always)]
    pub fn is_word(&self) -> bool {
        self.kind == SpanKind::Word
    }
}

#[inline(always)]
fn kind_of(c: char) -> SpanKind {
    if is_token_char(c) {
        SpanKind::Word
    } else {
        SpanKind::Other
    }
}

/// Iterator over the spans of a text.
#[derive(Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chars = self.rest.char_indices();
        let (_, first) = chars.next()?;
        let kind = kind_of(first);
        let end = chars
            .find(|&(_, c)| kind_of(c) != kind)
            .map_or(self.rest.len(), |(idx, _)| idx);
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Span { kind, text })
    }
}

impl FusedIterator for Tokens<'_> {}

/// Split `text` into maximal spans.
#[inline]
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}
