//! Static mapping tables for every script pair.
//!
//! All tables are `phf` maps or ordered slices: built at compile time, never
//! mutated. Keys of letter maps are lower-case; case is restored by the
//! mapping stage.
use crate::script::LetterTable;

use phf::{Map, phf_map};

// ---------------------------------------------------------------------------
//    Latin (field / dictionary) → Cyrillic
// ---------------------------------------------------------------------------

/// Letters shared by the Tatyshly field alphabet and the Beserman dictionary alphabet.
static LATIN_BASE: Map<char, &'static str> = phf_map! {
    'a' => "а", 'b' => "б", 'v' => "в", 'g' => "г", 'd' => "д",
    'e' => "э", 'ž' => "ж", 'š' => "ш", 'ɤ' => "ӧ", 'ə' => "ө",
    'ǯ' => "ӟ", 'č' => "ч", 'z' => "з", 'i' => "ӥ", 'j' => "й",
    'k' => "к", 'l' => "л", 'm' => "м", 'n' => "н", 'o' => "о",
    'p' => "п", 'r' => "р", 's' => "с", 't' => "т", 'u' => "у",
    'c' => "ц", 'w' => "ў", 'x' => "х", 'y' => "ы", 'f' => "ф",
    'ɨ' => "ы",
};

/// Letters that are unambiguous in both Latin alphabets.
static LATIN_EXTRA: Map<char, &'static str> = phf_map! {
    'ä' => "а", 'h' => "х", 'ö' => "ӧ",
};

/// The Beserman dictionary writes the velar nasal, which the standard
/// orthography renders as a plain nasal.
static BESERMAN_NASAL: Map<char, &'static str> = phf_map! {
    'ŋ' => "н",
};

/// Tatyshly field Latin. `ŋ`, `ü` and `ˀ` are left for variant expansion.
pub static TATYSHLY_LATIN: LetterTable = LetterTable {
    name: "tatyshly_lat",
    layers: &[&LATIN_BASE, &LATIN_EXTRA],
};

/// Beserman dictionary Latin.
pub static BESERMAN_LATIN: LetterTable = LetterTable {
    name: "beserman_lat",
    layers: &[&LATIN_BASE, &LATIN_EXTRA, &BESERMAN_NASAL],
};

// ---------------------------------------------------------------------------
//    Cyrillic → dictionary Latin
// ---------------------------------------------------------------------------

static CYRILLIC_TO_LATIN_MAP: Map<char, &'static str> = phf_map! {
    'а' => "a", 'б' => "b", 'в' => "v", 'г' => "g", 'д' => "d",
    'э' => "e", 'ж' => "ž", 'ш' => "š", 'ӧ' => "ɤ", 'ө' => "ə",
    'ӟ' => "ǯ", 'ч' => "č", 'з' => "z", 'ӥ' => "i", 'й' => "j",
    'к' => "k", 'л' => "l", 'м' => "m", 'н' => "n", 'о' => "o",
    'п' => "p", 'р' => "r", 'с' => "s", 'т' => "t", 'у' => "u",
    'ц' => "c", 'ў' => "w", 'х' => "x", 'ы' => "ɨ", 'ф' => "f",
    'я' => "ʼa", 'е' => "ʼe", 'и' => "ʼi", 'ё' => "ʼo", 'ю' => "ʼu",
    'щ' => "šʼ", 'ь' => "ʼ",
};

/// The hard affricates. Dictionary Latin writes them as bare `ǯ`/`č`; the
/// field alphabet has no spelling for them at all.
static CYRILLIC_HARD_AFFRICATES: Map<char, &'static str> = phf_map! {
    'ӝ' => "ǯ", 'ӵ' => "č",
};

pub static CYRILLIC_TO_LATIN: LetterTable = LetterTable {
    name: "cyrillic_to_latin",
    layers: &[&CYRILLIC_TO_LATIN_MAP, &CYRILLIC_HARD_AFFRICATES],
};

/// Legacy Cyrillic transcriptions on their way to the field alphabet. `ӝ`
/// and `ӵ` are kept as written and pass the field mapping untouched.
pub static LEGACY_CYRILLIC_TO_LATIN: LetterTable = LetterTable {
    name: "legacy_cyrillic_to_latin",
    layers: &[&CYRILLIC_TO_LATIN_MAP],
};

// ---------------------------------------------------------------------------
//    Hard → soft vowels (standard orthography)
// ---------------------------------------------------------------------------

/// Hard vowel → soft vowel letter. Soft vowels map to themselves so that a
/// glide before an already-soft vowel keeps the vowel.
pub static HARD_TO_SOFT: Map<char, char> = phf_map! {
    'а' => 'я', 'э' => 'е', 'е' => 'е', 'ӥ' => 'и', 'о' => 'ё', 'у' => 'ю',
    'я' => 'я', 'ё' => 'ё', 'ю' => 'ю', 'и' => 'и',
};

/// Punctuation allowed inside a word that is already in the standard orthography.
pub const STANDARD_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '-', '(', ')', '[', ']', '{', '}', '<', '>',
];

/// Letters of the standard orthography outside the basic `а..я` range.
pub const STANDARD_EXTRA_LETTERS: &[char] = &['ё', 'ӝ', 'ӟ', 'ӥ', 'ӧ', 'ӵ'];

// ---------------------------------------------------------------------------
//    Digraphs
// ---------------------------------------------------------------------------

/// Base + combining mark sequences collapsed into one canonical symbol.
/// Decomposed spellings are derived at normalizer construction.
pub const JOIN_DIGRAPHS: &[(&str, &str)] = &[
    ("u\u{32F}", "w"),
    ("U\u{32F}", "W"),
    ("u\u{307}", "ü"),
    ("U\u{307}", "Ü"),
    ("\u{22F}", "ö"),
    ("\u{22E}", "Ö"),
    ("ə\u{308}", "ə"),
    ("ə\u{311}", "ə"),
    ("Ə\u{308}", "Ə"),
    ("Ə\u{311}", "Ə"),
    ("i\u{32E}", "ɨ"),
    ("I\u{32E}", "Ɨ"),
];

/// Canonical symbol → decomposed spelling. `join(split(s)) == s` for every key.
pub const SPLIT_DIGRAPHS: &[(&str, &str)] = &[
    ("ə", "ə\u{311}"),
    ("Ə", "Ə\u{311}"),
    ("ɨ", "i\u{32E}"),
    ("Ɨ", "I\u{32E}"),
    ("ü", "u\u{307}"),
    ("Ü", "U\u{307}"),
    ("ö", "\u{22F}"),
    ("Ö", "\u{22E}"),
];

/// The reduced vowels UPA writes with a diacritic.
pub const SPLIT_REDUCED_VOWELS: &[(&str, &str)] = &[
    ("ə", "ə\u{311}"),
    ("Ə", "Ə\u{311}"),
    ("ɨ", "i\u{32E}"),
    ("Ɨ", "I\u{32E}"),
];

// ---------------------------------------------------------------------------
//    Dictionary Latin → UPA
// ---------------------------------------------------------------------------

/// Ordered literal replacements applied after the reduced vowels are split.
pub const UPA_REPLACEMENTS: &[(&str, &str)] = &[
    ("ɤ", "e\u{32E}"),
    ("čʼ", "č\u{301}"),
    ("Čʼ", "Č\u{301}"),
    ("ǯʼ", "ǯ\u{301}"),
    ("Ǯʼ", "Ǯ\u{301}"),
    ("šʼ", "ś"),
    ("Šʼ", "Ś"),
    ("žʼ", "ź"),
    ("Žʼ", "Ź"),
    ("dʼ", "d\u{301}"),
    ("Dʼ", "D\u{301}"),
    ("tʼ", "t\u{301}"),
    ("Tʼ", "T\u{301}"),
    ("lʼ", "ĺ"),
    ("Lʼ", "Ĺ"),
    ("nʼ", "ń"),
    ("Nʼ", "Ń"),
    ("ʼ", "\u{313}"),
];

// ---------------------------------------------------------------------------
//    Standard Cyrillic → dictionary Latin (pre-mapping fixes)
// ---------------------------------------------------------------------------

/// Sibilant + front vowel spellings that stand for a hard sibilant.
pub const HARD_SIBILANT_SPELLINGS: &[(&str, &str)] = &[
    ("жи", "жӥ"),
    ("ши", "шӥ"),
    ("же", "жэ"),
    ("ше", "шэ"),
    ("Жи", "Жӥ"),
    ("Ши", "Шӥ"),
    ("Же", "Жэ"),
    ("Ше", "Шэ"),
];

/// Literal fixes applied to dictionary Latin after the palatal marks are placed.
pub const LATIN_PALATAL_FIXES: &[(&str, &str)] = &[
    ("ъʼ", "j"),
    ("sʼ", "šʼ"),
    ("zʼ", "žʼ"),
];

/// Geminate sibilant fixes after extra-softening.
pub const LATIN_GEMINATE_FIXES: &[(&str, &str)] = &[("sšʼ", "šʼšʼ"), ("zžʼ", "žʼžʼ")];
