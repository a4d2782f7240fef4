//! src/stage/cleanup.rs
//!
//! Transcript cleanup applied to a whole text, not to single words:
//! * `CollapseDots`: `..`, ` ....  ` and friends → `... `
//! * `CollapseSpaces`: runs of spaces/tabs → one space, then trim
//! * `UnintelligibleMarker`: `нрзб`, `(nrzb.)`, `<НРЗБ>` … → `[нрзб]`
use crate::{
    context::Context,
    stage::{Stage, StageError},
};
use regex::Regex;
use std::{borrow::Cow, sync::LazyLock};

static DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" *\.\.+ *").expect("valid dots pattern"));
static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid spaces pattern"));
static UNINTELLIGIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[(<\[]?(?:нрзб|nrzb)\.?[)>\]]?").expect("valid marker pattern")
});

const ELLIPSIS: &str = "... ";
pub const UNINTELLIGIBLE_MARK: &str = "[нрзб]";

/// Replace every match of `rx` with `with`, borrowing when every match
/// already reads `with`.
fn replace_changed<'a>(rx: &Regex, text: Cow<'a, str>, with: &str) -> Cow<'a, str> {
    if !rx.find_iter(&text).any(|m| m.as_str() != with) {
        return text;
    }
    Cow::Owned(rx.replace_all(&text, with).into_owned())
}

pub struct CollapseDots;

impl Stage for CollapseDots {
    fn name(&self) -> &'static str {
        "collapse_dots"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        if memchr::memmem::find(text.as_bytes(), b"..").is_none() {
            return Ok(false);
        }
        Ok(DOTS.find_iter(text).any(|m| m.as_str() != ELLIPSIS))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        Ok(replace_changed(&DOTS, text, ELLIPSIS))
    }
}

pub struct CollapseSpaces;

impl Stage for CollapseSpaces {
    fn name(&self) -> &'static str {
        "collapse_spaces"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(text.trim().len() != text.len() || SPACES.find_iter(text).any(|m| m.as_str() != " "))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        let collapsed = replace_changed(&SPACES, text, " ");
        if collapsed.trim().len() == collapsed.len() {
            return Ok(collapsed);
        }
        Ok(match collapsed {
            Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
            Cow::Owned(s) => Cow::Owned(s.trim().to_owned()),
        })
    }
}

pub struct UnintelligibleMarker;

impl Stage for UnintelligibleMarker {
    fn name(&self) -> &'static str {
        "unintelligible_marker"
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(UNINTELLIGIBLE
            .find_iter(text)
            .any(|m| m.as_str() != UNINTELLIGIBLE_MARK))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        Ok(replace_changed(&UNINTELLIGIBLE, text, UNINTELLIGIBLE_MARK))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_stage_contract, testing::stage_contract::StageTestConfig};

    impl StageTestConfig for CollapseDots {
        fn samples() -> &'static [&'static str] {
            &["мон.. тон", "... ", "a.b", "ой....", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[("мон .. тон", "мон... тон"), ("ой....", "ой... ")]
        }
    }

    impl StageTestConfig for CollapseSpaces {
        fn samples() -> &'static [&'static str] {
            &[" мон  тон ", "a\tb", "мон тон", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[(" мон \t тон ", "мон тон"), ("ой  ", "ой")]
        }
    }

    impl StageTestConfig for UnintelligibleMarker {
        fn samples() -> &'static [&'static str] {
            &["мон нрзб", "[нрзб]", "(nrzb.)", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[
                ("мон нрзб тон", "мон [нрзб] тон"),
                ("(NRZB.)", "[нрзб]"),
                ("<нрзб>", "[нрзб]"),
            ]
        }
    }

    #[test]
    fn universal_contract() {
        assert_stage_contract!(CollapseDots);
        assert_stage_contract!(CollapseSpaces);
        assert_stage_contract!(UnintelligibleMarker);
    }

    #[test]
    fn trim_keeps_borrow() {
        let ctx = Context::default();
        let input = " мон";
        let out = CollapseSpaces.apply(Cow::Borrowed(input), &ctx).unwrap();
        assert!(matches!(out, Cow::Borrowed("мон")));
    }
}
