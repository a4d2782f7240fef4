//! Whole-word correction dictionary.
//!
//! A tier is loaded from a tab-separated file of `pattern<TAB>correction`
//! lines. Every pattern is registered three times (as written, upper-case,
//! capitalized) and anchored to the whole word. A single case-insensitive
//! alternation of all patterns gates the per-rule scan, so a word that no
//! rule can touch costs one regex search.
use crate::translit::TranslitError;
use regex::Regex;
use std::{
    borrow::Cow,
    fmt, fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// One anchored rewrite.
struct CorrectionRule {
    source: String,
    regex: Regex,
    replacement: String,
}

/// An ordered list of whole-word corrections.
#[derive(Default)]
pub struct CorrectionTier {
    origin: Option<PathBuf>,
    rules: Vec<CorrectionRule>,
    gate: Option<Regex>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CaseShape {
    AsGiven,
    Upper,
    Capitalized,
}

impl CorrectionTier {
    /// A tier without rules; `apply` is the identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a tier from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TranslitError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| TranslitError::MissingResource {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Load a tier from any buffered reader; `origin` names it in errors.
    pub fn from_reader<R: BufRead>(mut reader: R, origin: &Path) -> Result<Self, TranslitError> {
        let mut pairs = Vec::new();
        let mut line = String::new();
        let mut line_no = 0usize;
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .map_err(|source| TranslitError::MissingResource {
                    path: origin.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;
            let body = line.trim_end_matches(['\r', '\n']);
            let terminator = usize::from(body.len() != line.len());
            // A (nearly) empty line closes the table; anything after is ignored.
            if body.chars().count() + terminator <= 3 {
                debug!(path = %origin.display(), line = line_no, "end-of-table sentinel");
                break;
            }
            let mut fields = body.split('\t');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(pattern), Some(correction), None)
                    if !pattern.is_empty() && !correction.is_empty() =>
                {
                    pairs.push((pattern.to_owned(), correction.to_owned()));
                }
                _ => debug!(path = %origin.display(), line = line_no, "skipping malformed rule line"),
            }
        }
        let tier = Self::from_pairs(pairs, origin)?;
        info!(path = %origin.display(), rules = tier.len(), "correction tier loaded");
        Ok(tier)
    }

    /// Build a tier from `(pattern, correction)` pairs in file order.
    pub fn from_pairs<I, P, C>(pairs: I, origin: &Path) -> Result<Self, TranslitError>
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let mut tier = Self {
            origin: Some(origin.to_path_buf()),
            ..Self::default()
        };
        let mut alternatives: Vec<String> = Vec::new();
        for (pattern, correction) in pairs {
            let pattern = pattern.as_ref().trim_matches(['^', '$']);
            if pattern.is_empty() {
                continue;
            }
            let replacement = python_replacement(correction.as_ref());
            for shape in [CaseShape::AsGiven, CaseShape::Upper, CaseShape::Capitalized] {
                let source = shape_pattern(pattern, shape);
                let replacement = shape_replacement(&replacement, shape);
                tier.register(source, replacement, origin)?;
            }
            alternatives.push(pattern.to_owned());
        }
        if !alternatives.is_empty() {
            alternatives.sort_by_key(|a| std::cmp::Reverse(a.chars().count()));
            let joined = alternatives
                .iter()
                .map(|a| format!("(?:{a})"))
                .collect::<Vec<_>>()
                .join("|");
            tier.gate = Some(compile(&format!("(?i){joined}"), origin)?);
        }
        Ok(tier)
    }

    /// A later registration of an identical pattern replaces the correction
    /// in place.
    fn register(
        &mut self,
        source: String,
        replacement: String,
        origin: &Path,
    ) -> Result<(), TranslitError> {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.source == source) {
            existing.replacement = replacement;
            return Ok(());
        }
        let regex = compile(&format!("^(?:{source})$"), origin)?;
        self.rules.push(CorrectionRule {
            source,
            regex,
            replacement,
        });
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every matching rule in order. Rules compose: each one sees the
    /// output of the previous one.
    pub fn apply<'a>(&self, word: Cow<'a, str>) -> Cow<'a, str> {
        let Some(gate) = &self.gate else {
            return word;
        };
        if !gate.is_match(&word) {
            return word;
        }
        let mut word = word;
        for rule in &self.rules {
            if rule.regex.is_match(&word) {
                let next = rule.regex.replace(&word, rule.replacement.as_str()).into_owned();
                word = Cow::Owned(next);
            }
        }
        word
    }
}

impl fmt::Debug for CorrectionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionTier")
            .field("origin", &self.origin)
            .field("rules", &self.rules.len())
            .finish()
    }
}

fn compile(pattern: &str, origin: &Path) -> Result<Regex, TranslitError> {
    Regex::new(pattern).map_err(|e| TranslitError::MalformedResource {
        path: origin.to_path_buf(),
        reason: format!("invalid rule pattern `{pattern}`: {e}"),
    })
}

// ---------------------------------------------------------------------------
//    Case shaping that leaves regex syntax alone
// ---------------------------------------------------------------------------

/// A piece of a pattern: literal text that may be re-cased, or syntax that
/// must be copied verbatim.
enum Piece<'a> {
    Plain(char),
    Syntax(&'a str),
}

/// Split a regex into re-casable characters and verbatim syntax: escapes
/// (`\w`, `\p{Lu}`, `\x{4F}`), group prefixes (`(?i:`, `(?P<name>`) and POSIX
/// classes (`[:alpha:]`).
fn pieces(pattern: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < pattern.len() {
        let rest = &pattern[i..];
        let len = if rest.starts_with('\\') {
            escape_len(rest)
        } else if rest.starts_with("(?") {
            rest.find([':', ')', '>']).map_or(rest.len(), |end| end + 1)
        } else if rest.starts_with("[:") {
            rest.find(":]").map_or(2, |end| end + 2)
        } else {
            0
        };
        if len > 0 {
            out.push(Piece::Syntax(&rest[..len]));
            i += len;
            continue;
        }
        let Some(c) = rest.chars().next() else { break };
        out.push(Piece::Plain(c));
        i += c.len_utf8();
    }
    out
}

/// Byte length of the escape sequence at the start of `rest`.
fn escape_len(rest: &str) -> usize {
    let mut chars = rest.char_indices().skip(1);
    let Some((_, kind)) = chars.next() else {
        return rest.len();
    };
    let after = 1 + kind.len_utf8();
    let tail = &rest[after..];
    match kind {
        'p' | 'P' | 'x' | 'u' | 'U' if tail.starts_with('{') => {
            tail.find('}').map_or(rest.len(), |end| after + end + 1)
        }
        'p' | 'P' => tail.chars().next().map_or(after, |c| after + c.len_utf8()),
        'x' => after + tail.chars().take(2).map(char::len_utf8).sum::<usize>(),
        _ => after,
    }
}

fn shape_pattern(pattern: &str, shape: CaseShape) -> String {
    shape_pieces(&pieces(pattern), shape)
}

fn shape_pieces(pieces: &[Piece<'_>], shape: CaseShape) -> String {
    let mut out = String::new();
    let mut seen_letter = false;
    for piece in pieces {
        match *piece {
            Piece::Syntax(s) => out.push_str(s),
            Piece::Plain(c) => match shape {
                CaseShape::AsGiven => out.push(c),
                CaseShape::Upper => out.extend(c.to_uppercase()),
                CaseShape::Capitalized => {
                    if !seen_letter && c.is_alphabetic() {
                        seen_letter = true;
                        out.extend(c.to_uppercase());
                    } else {
                        out.extend(c.to_lowercase());
                    }
                }
            },
        }
    }
    out
}

/// Re-case a replacement template without touching `${group}` references.
fn shape_replacement(template: &str, shape: CaseShape) -> String {
    let mut pieces = Vec::new();
    let mut i = 0;
    while i < template.len() {
        let rest = &template[i..];
        let len = if rest.starts_with("$$") {
            2
        } else if rest.starts_with("${") {
            rest.find('}').map_or(rest.len(), |end| end + 1)
        } else {
            0
        };
        if len > 0 {
            pieces.push(Piece::Syntax(&rest[..len]));
            i += len;
            continue;
        }
        let Some(c) = rest.chars().next() else { break };
        pieces.push(Piece::Plain(c));
        i += c.len_utf8();
    }
    shape_pieces(&pieces, shape)
}

/// Convert a correction written with backslash group references (`\1`,
/// `\g<name>`) into the `${1}` template syntax; a literal `$` is escaped.
fn python_replacement(correction: &str) -> String {
    let mut out = String::with_capacity(correction.len() + 4);
    let mut chars = correction.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    out.push_str("${");
                    while let Some(d) = chars.next_if(char::is_ascii_digit) {
                        out.push(d);
                    }
                    out.push('}');
                }
                Some('g') => {
                    chars.next();
                    if chars.next_if_eq(&'<').is_some() {
                        out.push_str("${");
                        for n in chars.by_ref() {
                            if n == '>' {
                                break;
                            }
                            out.push(n);
                        }
                        out.push('}');
                    } else {
                        out.push_str("\\g");
                    }
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}
