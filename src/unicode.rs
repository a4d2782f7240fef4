//! Character classification and case helpers shared by every stage.
use crate::script::data::{STANDARD_EXTRA_LETTERS, STANDARD_PUNCTUATION};

/// Palatalization marker (U+02BC MODIFIER LETTER APOSTROPHE).
pub const PALATAL_MARK: char = 'ʼ';

/// Apostrophes typed in place of [`PALATAL_MARK`].
pub const APOSTROPHES: &[char] = &['\'', '\u{2019}'];

#[inline(always)]
pub fn to_lower(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut it = c.to_lowercase();
    match (it.next(), it.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

#[inline(always)]
pub fn to_upper(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_uppercase();
    }
    let mut it = c.to_uppercase();
    match (it.next(), it.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Combining diacritical marks used by the phonetic alphabets.
#[inline(always)]
pub const fn is_combining_mark(c: char) -> bool {
    matches!(c as u32,
        0x0300..=0x036F |
        0x1AB0..=0x1AFF |
        0x1DC0..=0x1DFF |
        0x20D0..=0x20FF |
        0xFE20..=0xFE2F
    )
}

/// Word character in the regex `\w` sense (letters, digits, underscore).
#[inline(always)]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Character that belongs to a word-like token span.
///
/// Letters (including modifier letters such as `ʼ` and `ˀ`), apostrophes,
/// combining marks and the hyphen. Digits are deliberately excluded.
#[inline(always)]
pub fn is_token_char(c: char) -> bool {
    c.is_alphabetic() || is_combining_mark(c) || c == '-' || APOSTROPHES.contains(&c)
}

/// `true` when `text` has at least two cased letters and none is lower-case.
pub fn is_upper_word(text: &str) -> bool {
    let mut upper = 0usize;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            upper += 1;
        }
    }
    upper >= 2
}

/// Give `replacement` the case shape of `matched`.
///
/// A whole word in capitals yields capitals; a match starting with a capital
/// yields a capitalized replacement; anything else is left as written.
pub fn match_case(replacement: &str, matched: &str, word_is_upper: bool) -> String {
    if word_is_upper {
        return replacement.to_uppercase();
    }
    let starts_upper = matched
        .chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(char::is_uppercase);
    if !starts_upper {
        return replacement.to_owned();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Letter of the standard Udmurt orthography (either case).
#[inline]
pub fn is_standard_letter(c: char) -> bool {
    let l = to_lower(c);
    ('а'..='я').contains(&l) || STANDARD_EXTRA_LETTERS.contains(&l)
}

/// Word written entirely in the standard orthography (plus inner punctuation).
pub fn is_standard_word(word: &str) -> bool {
    word.chars()
        .all(|c| is_standard_letter(c) || STANDARD_PUNCTUATION.contains(&c))
}

/// Levenshtein distance over Unicode scalar values.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_chars() {
        for c in ['a', 'ы', 'ʼ', 'ˀ', '\u{311}', '-', '\''] {
            assert!(is_token_char(c), "{c:?}");
        }
        for c in [' ', '.', '7', ',', '\n'] {
            assert!(!is_token_char(c), "{c:?}");
        }
    }

    #[test]
    fn upper_word_detection() {
        assert!(is_upper_word("ВАНЬ"));
        assert!(is_upper_word("VAʼN"));
        assert!(!is_upper_word("Вань"));
        assert!(!is_upper_word("В"));
    }

    #[test]
    fn case_matching() {
        assert_eq!(match_case("уи", "Ü", false), "Уи");
        assert_eq!(match_case("уи", "Ü", true), "УИ");
        assert_eq!(match_case("уи", "ü", false), "уи");
    }

    #[test]
    fn standard_words() {
        assert!(is_standard_word("ӟечбур!"));
        assert!(is_standard_word("Удмурт-"));
        assert!(!is_standard_word("vaˀmort"));
        assert!(!is_standard_word("кылʼ"));
        assert!(!is_standard_word("кө"));
    }

    #[test]
    fn levenshtein() {
        assert_eq!(edit_distance("кыл", "кыл"), 0);
        assert_eq!(edit_distance("кыл", "кул"), 1);
        assert_eq!(edit_distance("", "аб"), 2);
        assert_eq!(edit_distance("вадмурт", "ватмурт"), 1);
    }
}
