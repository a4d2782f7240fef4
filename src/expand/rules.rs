//! Ambiguity rules of the Tatyshly field transcription.
//!
//! Patterns are written for the Cyrillic-mapped form of a single word and
//! compiled case-insensitively. Order is significant. The first template of
//! a rule is the reading kept when the candidate cap cuts expansion short.
use super::RuleSpec;

const fn rule(
    name: &'static str,
    pattern: &'static str,
    templates: &'static [&'static str],
) -> RuleSpec {
    RuleSpec {
        name,
        pattern,
        templates,
        max_depth: None,
    }
}

const fn once(
    name: &'static str,
    pattern: &'static str,
    templates: &'static [&'static str],
) -> RuleSpec {
    RuleSpec {
        name,
        pattern,
        templates,
        max_depth: Some(1),
    }
}

pub const TATYSHLY_RULES: &[RuleSpec] = &[
    rule("rounded_high_vowel", "ü", &["у", "уи"]),
    rule("labial_semivowel", "ў", &["у", "в"]),
    rule("glottal_stop", "ˀ", &["д", "т", "г", "к"]),
    rule("mid_central_vowel", "ө", &["ы", "и", "у", "ӧ"]),
    rule("velar_nasal", "ŋ", &["н", "нʼ", "м"]),
    once("initial_affricate", "^дʼ", &["ӟ", "дʼ", "й"]),
    once("initial_glide_e", "^йэ", &["йэ", "э", "о"]),
    rule(
        "affricate_before_suffix",
        "([лнр])ӟ(ы[нз]?)$",
        &["${1}ӟ${2}", "${1}й${2}"],
    ),
    rule("sibilant_pair_sh", "шш", &["шш", "чш"]),
    rule("sibilant_pair_zh", "жж", &["жж", "ӟж"]),
    once("cluster_epenthesis", "([бвгдкпт])ы([лр])", &["${1}ы${2}", "${1}${2}"]),
    once("cluster_insertion", "([бвгдкпт])([лр])", &["${1}${2}", "${1}ы${2}"]),
    once("geminate_l", "лл", &["лл", "дл"]),
    once("geminate_n", "нн", &["нн", "дн"]),
    once("final_devoicing_p", "п$", &["п", "б"]),
    once("final_devoicing_t", "т$", &["т", "д"]),
    once("final_devoicing_k", "к$", &["к", "г"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn every_rule_compiles() {
        for spec in TATYSHLY_RULES {
            assert!(
                Regex::new(&format!("(?i){}", spec.pattern)).is_ok(),
                "rule `{}` does not compile",
                spec.name
            );
            assert!(!spec.templates.is_empty());
        }
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in TATYSHLY_RULES.iter().enumerate() {
            assert!(TATYSHLY_RULES[i + 1..].iter().all(|b| b.name != a.name));
        }
    }
}
