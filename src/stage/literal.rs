//! src/stage/literal.rs
//!
//! Ordered literal substring replacements.
use crate::{
    context::Context,
    stage::{Stage, StageError},
};
use std::borrow::Cow;

/// Each `(from, to)` pair is applied to the whole text in order, so a later
/// pair sees the output of the earlier ones.
#[derive(Debug, Clone, Copy)]
pub struct LiteralReplace {
    pub name: &'static str,
    pub pairs: &'static [(&'static str, &'static str)],
}

impl LiteralReplace {
    pub const fn new(name: &'static str, pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self { name, pairs }
    }
}

impl Stage for LiteralReplace {
    fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    fn needs_apply(&self, text: &str, _ctx: &Context) -> Result<bool, StageError> {
        Ok(self.pairs.iter().any(|(from, _)| text.contains(from)))
    }

    fn apply<'a>(&self, text: Cow<'a, str>, _ctx: &Context) -> Result<Cow<'a, str>, StageError> {
        let mut text = text;
        for &(from, to) in self.pairs {
            if text.contains(from) {
                text = Cow::Owned(text.replace(from, to));
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert_stage_contract,
        script::data::{HARD_SIBILANT_SPELLINGS, UPA_REPLACEMENTS},
        testing::stage_contract::StageTestConfig,
    };

    const UPA: LiteralReplace = LiteralReplace::new("upa", UPA_REPLACEMENTS);

    impl StageTestConfig for LiteralReplace {
        fn samples() -> &'static [&'static str] {
            &["čʼužʼ", "kɤl", "vala", "Nʼ", ""]
        }
        fn should_transform() -> &'static [(&'static str, &'static str)] {
            &[
                ("čʼaš", "č\u{301}aš"),
                ("šʼaržʼ", "śarź"),
                ("kɤlʼ", "ke\u{32E}ĺ"),
                ("pʼ", "p\u{313}"),
            ]
        }
    }

    #[test]
    fn universal_contract() {
        assert_stage_contract!(UPA);
    }

    #[test]
    fn later_pairs_see_earlier_output() {
        let ctx = Context::default();
        let stage = LiteralReplace::new("hard_sibilants", HARD_SIBILANT_SPELLINGS);
        assert_eq!(
            stage.apply(Cow::Borrowed("Шиши"), &ctx).unwrap(),
            "Шӥшӥ"
        );
    }
}
