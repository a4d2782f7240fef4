pub mod data;

use std::fmt;

use phf::Map;

/// ---------------------------------------------------------------------------
///    Macro – generates the closed script set from a single table
/// ---------------------------------------------------------------------------
macro_rules! define_scripts {
    ($( $variant:ident, $code:literal, $name:literal ),* $(,)?) => {
        /// A source or target representation of Udmurt text.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Script {
            $( $variant ),*
        }

        impl Script {
            /// Every known script, in declaration order.
            pub const ALL: &'static [Script] = &[$( Script::$variant ),*];

            #[inline(always)]
            pub const fn code(&self) -> &'static str {
                match self {
                    $( Script::$variant => $code ),*
                }
            }

            #[inline(always)]
            pub const fn name(&self) -> &'static str {
                match self {
                    $( Script::$variant => $name ),*
                }
            }

            /// Parse a script tag such as `"tatyshly_lat"`. Case-insensitive.
            pub fn from_code(code: &str) -> Option<Script> {
                let lower = code.trim().to_lowercase();
                match lower.as_str() {
                    $( $code => Some(Script::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
//    Script definitions (single source of truth)
// ---------------------------------------------------------------------------
define_scripts! {
    TatyshlyLatin,    "tatyshly_lat", "Tatyshly field-transcription Latin",
    TatyshlyCyrillic, "tatyshly_cyr", "Tatyshly legacy Cyrillic transcription",
    BesermanLatin,    "beserman_lat", "Beserman dictionary Latin",
    Upa,              "upa",          "Uralic Phonetic Alphabet",
    Standard,         "standard",     "Standard Udmurt Cyrillic",
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A (source, target) combination selecting one transliteration pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialectPair {
    pub source: Script,
    pub target: Script,
}

impl DialectPair {
    #[inline(always)]
    pub const fn new(source: Script, target: Script) -> Self {
        Self { source, target }
    }
}

impl fmt::Display for DialectPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.source, self.target)
    }
}

/// Letter-to-letter table made of stacked `phf` layers.
///
/// Keys are lower-case source characters; the first layer that knows a key
/// wins. Output case is derived from the input character, never stored.
#[derive(Clone, Copy)]
pub struct LetterTable {
    pub name: &'static str,
    pub layers: &'static [&'static Map<char, &'static str>],
}

impl LetterTable {
    #[inline]
    pub fn get(&self, lower: char) -> Option<&'static str> {
        self.layers.iter().find_map(|layer| layer.get(&lower).copied())
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.is_empty())
    }
}

impl fmt::Debug for LetterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LetterTable")
            .field("name", &self.name)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for &script in Script::ALL {
            assert_eq!(Script::from_code(script.code()), Some(script));
        }
        assert_eq!(Script::from_code(" Standard "), Some(Script::Standard));
        assert_eq!(Script::from_code("klingon"), None);
    }

    #[test]
    fn pair_display() {
        let pair = DialectPair::new(Script::TatyshlyLatin, Script::Standard);
        assert_eq!(pair.to_string(), "tatyshly_lat→standard");
    }

    #[test]
    fn layered_lookup_prefers_first_layer() {
        let t = data::BESERMAN_LATIN;
        assert_eq!(t.get('a'), Some("а"));
        assert_eq!(t.get('ŋ'), Some("н"));
        assert_eq!(data::TATYSHLY_LATIN.get('ŋ'), None);
        assert!(!t.is_empty());
    }
}
