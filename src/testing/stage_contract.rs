use crate::stage::Stage;

/// Trait that stages implement to opt into the universal test suite.
pub trait StageTestConfig: Stage + Sized {
    /// General test samples (may or may not trigger changes).
    fn samples() -> &'static [&'static str] {
        &["vala", "мон", "ВАНЬ", ""]
    }

    /// Samples that must pass through unchanged and without allocation.
    fn should_pass_through() -> &'static [&'static str] {
        &["hello", "test123", "abc def", ""]
    }

    /// Input/output pairs that verify known rewrites.
    fn should_transform() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// Assert that a stage satisfies the universal contracts:
///
/// 1. `zero_copy_when_no_changes`: no allocation when input == output
/// 2. `stage_is_idempotent`: applying twice yields the same result as once
/// 3. `needs_apply_is_accurate`: the pre-check predicts whether `apply` changes text
/// 4. `handles_empty_string_and_ascii`: graceful on edge cases
/// 5. `no_panic_on_mixed_scripts`: survives mixed-script input
///
/// Stages that are not idempotent by nature (splitting a symbol into a
/// sequence that still contains it) call the individual checks instead.
#[macro_export]
macro_rules! assert_stage_contract {
    ($stage:expr) => {
        $crate::testing::stage_contract::zero_copy_when_no_changes($stage);
        $crate::testing::stage_contract::stage_is_idempotent($stage);
        $crate::testing::stage_contract::needs_apply_is_accurate($stage);
        $crate::testing::stage_contract::handles_empty_string_and_ascii($stage);
        $crate::testing::stage_contract::no_panic_on_mixed_scripts($stage);
    };
}

#[cfg(test)]
use crate::context::Context;
#[cfg(test)]
use std::borrow::Cow;

#[cfg(test)]
pub fn zero_copy_when_no_changes<S: StageTestConfig>(stage: S) {
    let ctx = Context::default();

    for &input in S::samples() {
        let text = Cow::Borrowed(input);
        if !stage.needs_apply(&text, &ctx).unwrap() {
            let out = stage.apply(text, &ctx).unwrap();
            assert!(
                matches!(out, Cow::Borrowed(s) if std::ptr::eq(s, input)),
                "stage `{}` allocated on untouched sample `{input}`",
                stage.name()
            );
        }
    }

    for &pass_through in S::should_pass_through() {
        let mut text = Cow::Borrowed(pass_through);
        if stage.needs_apply(&text, &ctx).unwrap() {
            text = stage.apply(text, &ctx).unwrap();
        }
        assert_eq!(text.as_ref(), pass_through);
        assert!(
            matches!(text, Cow::Borrowed(s) if std::ptr::eq(s, pass_through)),
            "zero-copy violated on pass-through sample `{pass_through}`"
        );
    }

    for &(input, expected) in S::should_transform() {
        let mut text = Cow::Borrowed(input);
        if stage.needs_apply(&text, &ctx).unwrap() {
            text = stage.apply(text, &ctx).unwrap();
        }
        assert_eq!(text.as_ref(), expected, "stage `{}` on `{input}`", stage.name());
    }
}

#[cfg(test)]
pub fn stage_is_idempotent<S: StageTestConfig>(stage: S) {
    let ctx = Context::default();
    let transformed = S::should_transform().iter().map(|&(input, _)| input);
    for input in S::samples().iter().copied().chain(transformed) {
        let once = stage.apply(Cow::Borrowed(input), &ctx).unwrap();
        let twice = stage.apply(once.clone(), &ctx).unwrap();
        assert_eq!(
            once,
            twice,
            "stage `{}` not idempotent on `{input}`",
            stage.name()
        );
    }
}

#[cfg(test)]
pub fn needs_apply_is_accurate<S: StageTestConfig>(stage: S) {
    let ctx = Context::default();
    for &sample in S::samples() {
        check_accuracy(&stage, sample, &ctx);
    }
    for &(input, _) in S::should_transform() {
        check_accuracy(&stage, input, &ctx);
    }
    for clean in ["", "hello", "world123", " !@#"] {
        check_accuracy(&stage, clean, &ctx);
    }
}

#[cfg(test)]
#[inline(always)]
fn check_accuracy<S: Stage>(stage: &S, input: &str, ctx: &Context) {
    let predicted = stage.needs_apply(input, ctx).expect("needs_apply errored");
    let output = stage
        .apply(Cow::Owned(input.to_owned()), ctx)
        .expect("apply errored");
    let actually_changes = output != input;
    assert_eq!(
        predicted,
        actually_changes,
        "needs_apply() mismatch for stage `{}` on `{input}`\n\
         predicted: {predicted}\n\
         actual   : {actually_changes} (output = {output:?})",
        stage.name(),
    );
}

#[cfg(test)]
pub fn handles_empty_string_and_ascii<S: StageTestConfig>(stage: S) {
    let ctx = Context::default();
    let empty: &str = "";
    let result_empty = if stage.needs_apply(empty, &ctx).unwrap() {
        stage.apply(Cow::Borrowed(empty), &ctx).unwrap()
    } else {
        Cow::Borrowed(empty)
    };
    assert_eq!(result_empty.as_ref(), "");
    let ascii = "hello world 123 !@#";
    let result_ascii = stage.apply(Cow::Borrowed(ascii), &ctx).unwrap();
    assert_eq!(result_ascii.as_ref(), ascii);
}

#[cfg(test)]
pub fn no_panic_on_mixed_scripts<S: StageTestConfig>(stage: S) {
    let ctx = Context::default();
    let _ = stage.apply(
        Cow::Borrowed("Hello 世界 удмурт kə̑ljosə̑z ʼʼ ˀ ŋ Türkçe العربية"),
        &ctx,
    );
}
