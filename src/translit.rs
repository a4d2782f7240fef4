//! The transliteration engine.
//!
//! [`Transliterator`] owns every table (letter maps, expansion rules,
//! correction tiers, frequencies) and the analyzability oracle. All of it is
//! loaded once by [`TransliteratorBuilder::build`] and read-only afterwards,
//! so one engine can serve many threads.
use crate::{
    context::Context,
    correction::CorrectionTier,
    disambiguate::{Disambiguator, TieBreak},
    expand::{CandidateSet, DEFAULT_MAX_CANDIDATES, Expander, rules::TATYSHLY_RULES},
    frequency::FrequencyTable,
    oracle::{AnalyzabilityOracle, Analyzer, AnalyzerError},
    pipeline::{CompiledPipeline, PipelineSet},
    process::{DynamicProcess, Process},
    script::{DialectPair, Script},
    stage::{
        StageError,
        cleanup::{CollapseDots, CollapseSpaces, UnintelligibleMarker},
    },
    tokenize::tokenize,
    unicode::is_standard_word,
};
use std::{
    borrow::Cow,
    fmt, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const CORRECTIONS_FILE: &str = "cyr_replacements_rx.csv";
pub const STANDARDIZATION_FILE: &str = "cyr_standardization_rx.csv";
pub const FREQUENCY_FILE: &str = "std_freq_dict.json";

#[derive(Debug, Error)]
pub enum TranslitError {
    #[error("cannot read `{}`: {source}", path.display())]
    MissingResource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed resource `{}`: {reason}", path.display())]
    MalformedResource { path: PathBuf, reason: String },
    #[error("invalid expansion rule `{name}`: {source}")]
    InvalidRule {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),
    #[error("no candidate left for `{0}`")]
    EmptyCandidateSet(String),
    #[error("stage error: {0}")]
    Stage(#[from] StageError),
}

/// Per-call settings. The builder fixes the defaults; [`Transliterator::transliterate_with`]
/// overrides them for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslitOptions {
    pub source: Script,
    pub target: Script,
    /// Transcript cleanup: dots, spaces and unintelligible-speech markers.
    pub cleanup: bool,
    /// Apply the standardization correction tier after the basic one.
    pub standardize: bool,
}

impl Default for TranslitOptions {
    fn default() -> Self {
        Self {
            source: Script::TatyshlyLatin,
            target: Script::Standard,
            cleanup: false,
            standardize: false,
        }
    }
}

impl TranslitOptions {
    #[inline]
    pub const fn pair(&self) -> DialectPair {
        DialectPair::new(self.source, self.target)
    }
}

pub struct Transliterator {
    options: TranslitOptions,
    pipelines: PipelineSet,
    expander: Expander,
    corrections: CorrectionTier,
    standardization: CorrectionTier,
    disambiguator: Disambiguator,
    cleanup: DynamicProcess,
    markers: DynamicProcess,
}

impl Transliterator {
    pub fn builder() -> TransliteratorBuilder {
        TransliteratorBuilder::default()
    }

    #[inline]
    pub fn options(&self) -> TranslitOptions {
        self.options
    }

    /// Transliterate a text with the default options.
    pub fn transliterate<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, TranslitError> {
        self.transliterate_with(text, self.options)
    }

    pub fn transliterate_with<'a>(
        &self,
        text: &'a str,
        options: TranslitOptions,
    ) -> Result<Cow<'a, str>, TranslitError> {
        let ctx = Context::new(options.pair());
        let text = if options.cleanup {
            self.cleanup.process(Cow::Borrowed(text), &ctx)?
        } else {
            Cow::Borrowed(text)
        };
        let pipeline = self.pipelines.for_pair(ctx.pair);
        let text = self.transliterate_words(text, pipeline, &ctx, options.standardize)?;
        if options.cleanup {
            Ok(self.markers.process(text, &ctx)?)
        } else {
            Ok(text)
        }
    }

    /// Transliterate one word with the default options.
    pub fn transliterate_word(&self, word: &str) -> Result<String, TranslitError> {
        let ctx = Context::new(self.options.pair());
        let pipeline = self.pipelines.for_pair(ctx.pair);
        self.word(word, pipeline, &ctx, self.options.standardize)
    }

    /// Every spelling the default pipeline considers for `word`, after the
    /// cascade and the corrections, in first-seen order.
    pub fn candidates(&self, word: &str) -> Result<CandidateSet, TranslitError> {
        let ctx = Context::new(self.options.pair());
        let pipeline = self.pipelines.for_pair(ctx.pair);
        let raw = pipeline.front.run(word, &ctx)?;
        self.rewrite_candidates(&raw, pipeline, &ctx, self.options.standardize)
    }

    #[inline]
    pub fn disambiguator(&self) -> &Disambiguator {
        &self.disambiguator
    }

    fn transliterate_words<'a>(
        &self,
        text: Cow<'a, str>,
        pipeline: &CompiledPipeline,
        ctx: &Context,
        standardize: bool,
    ) -> Result<Cow<'a, str>, TranslitError> {
        if pipeline.front.is_empty() {
            return Ok(text);
        }
        let mut out = String::with_capacity(text.len() + text.len() / 4);
        let mut changed = false;
        for span in tokenize(&text) {
            if !span.is_word() {
                out.push_str(span.text);
                continue;
            }
            let word = self.word(span.text, pipeline, ctx, standardize)?;
            changed |= word != span.text;
            out.push_str(&word);
        }
        Ok(if changed { Cow::Owned(out) } else { text })
    }

    fn word(
        &self,
        word: &str,
        pipeline: &CompiledPipeline,
        ctx: &Context,
        standardize: bool,
    ) -> Result<String, TranslitError> {
        if pipeline.front.is_empty()
            || (pipeline.kind.targets_standard() && is_standard_word(word))
        {
            return Ok(word.to_owned());
        }
        let raw = pipeline.front.run(word, ctx)?;
        let candidates = self.rewrite_candidates(&raw, pipeline, ctx, standardize)?;
        debug!(
            word,
            pipeline = pipeline.kind.name(),
            candidates = candidates.len(),
            "word dispatched"
        );
        let winner = self
            .disambiguator
            .pick(candidates.as_slice(), &raw)?
            .ok_or_else(|| TranslitError::EmptyCandidateSet(word.to_owned()))?;
        Ok(winner.to_owned())
    }

    fn rewrite_candidates(
        &self,
        raw: &str,
        pipeline: &CompiledPipeline,
        ctx: &Context,
        standardize: bool,
    ) -> Result<CandidateSet, TranslitError> {
        let expanded = if pipeline.kind.expands() {
            self.expander.expand(raw)
        } else {
            CandidateSet::single(raw)
        };
        let mut rewritten = CandidateSet::default();
        for candidate in expanded.iter() {
            let mut out = pipeline.cascade.run(candidate, ctx)?;
            if pipeline.kind.targets_standard() {
                out = self.corrections.apply(out);
                if standardize {
                    out = self.standardization.apply(out);
                }
            }
            rewritten.insert(out.into_owned());
        }
        if rewritten.is_empty() {
            return Err(TranslitError::EmptyCandidateSet(raw.to_owned()));
        }
        Ok(rewritten)
    }
}

impl fmt::Debug for Transliterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transliterator")
            .field("options", &self.options)
            .field("expansion_rules", &self.expander.rules().len())
            .field("corrections", &self.corrections)
            .field("standardization", &self.standardization)
            .field("disambiguator", &self.disambiguator)
            .finish()
    }
}

/// Where a table comes from.
enum Resource<T> {
    /// `<data_dir>/<default file name>`.
    Default,
    Path(PathBuf),
    Loaded(T),
}

pub struct TransliteratorBuilder {
    options: TranslitOptions,
    data_dir: PathBuf,
    corrections: Resource<CorrectionTier>,
    standardization: Resource<CorrectionTier>,
    frequencies: Resource<FrequencyTable>,
    analyzer: Option<Box<dyn Analyzer>>,
    tie_break: TieBreak,
    max_candidates: usize,
}

impl Default for TransliteratorBuilder {
    fn default() -> Self {
        Self {
            options: TranslitOptions::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            corrections: Resource::Default,
            standardization: Resource::Default,
            frequencies: Resource::Default,
            analyzer: None,
            tie_break: TieBreak::default(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

impl TransliteratorBuilder {
    pub fn source(mut self, source: Script) -> Self {
        self.options.source = source;
        self
    }

    pub fn target(mut self, target: Script) -> Self {
        self.options.target = target;
        self
    }

    pub fn cleanup(mut self, cleanup: bool) -> Self {
        self.options.cleanup = cleanup;
        self
    }

    pub fn standardize(mut self, standardize: bool) -> Self {
        self.options.standardize = standardize;
        self
    }

    pub fn options(mut self, options: TranslitOptions) -> Self {
        self.options = options;
        self
    }

    /// Directory holding the default resource files.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn corrections_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corrections = Resource::Path(path.into());
        self
    }

    pub fn corrections(mut self, tier: CorrectionTier) -> Self {
        self.corrections = Resource::Loaded(tier);
        self
    }

    pub fn standardization_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.standardization = Resource::Path(path.into());
        self
    }

    pub fn standardization(mut self, tier: CorrectionTier) -> Self {
        self.standardization = Resource::Loaded(tier);
        self
    }

    pub fn frequencies_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.frequencies = Resource::Path(path.into());
        self
    }

    pub fn frequencies(mut self, table: FrequencyTable) -> Self {
        self.frequencies = Resource::Loaded(table);
        self
    }

    pub fn analyzer<A: Analyzer + 'static>(mut self, analyzer: A) -> Self {
        self.analyzer = Some(Box::new(analyzer));
        self
    }

    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    pub fn build(self) -> Result<Transliterator, TranslitError> {
        let corrections = match self.corrections {
            Resource::Default => CorrectionTier::from_path(self.data_dir.join(CORRECTIONS_FILE))?,
            Resource::Path(path) => CorrectionTier::from_path(path)?,
            Resource::Loaded(tier) => tier,
        };
        let standardization = match self.standardization {
            Resource::Default => optional_tier(&self.data_dir.join(STANDARDIZATION_FILE))?,
            Resource::Path(path) => CorrectionTier::from_path(path)?,
            Resource::Loaded(tier) => tier,
        };
        let frequencies = match self.frequencies {
            Resource::Default => FrequencyTable::from_path(self.data_dir.join(FREQUENCY_FILE))?,
            Resource::Path(path) => FrequencyTable::from_path(path)?,
            Resource::Loaded(table) => table,
        };
        let expander = Expander::new(TATYSHLY_RULES, self.max_candidates)?;
        let oracle = self.analyzer.map(AnalyzabilityOracle::from_boxed);

        info!(
            pair = %self.options.pair(),
            corrections = corrections.len(),
            standardization = standardization.len(),
            frequencies = frequencies.len(),
            expansion_rules = expander.rules().len(),
            max_candidates = expander.max_candidates(),
            oracle = oracle.is_some(),
            "transliterator ready"
        );

        Ok(Transliterator {
            options: self.options,
            pipelines: PipelineSet::default(),
            expander,
            corrections,
            standardization,
            disambiguator: Disambiguator::new(frequencies, oracle, self.tie_break),
            cleanup: DynamicProcess::new().push(CollapseDots).push(CollapseSpaces),
            markers: DynamicProcess::new().push(UnintelligibleMarker),
        })
    }
}

/// The standardization tier is optional: a missing default file means an
/// empty tier.
fn optional_tier(path: &Path) -> Result<CorrectionTier, TranslitError> {
    if path.is_file() {
        CorrectionTier::from_path(path)
    } else {
        debug!(path = %path.display(), "no standardization tier");
        Ok(CorrectionTier::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::LexiconAnalyzer;

    fn engine() -> TransliteratorBuilder {
        Transliterator::builder()
            .corrections(CorrectionTier::empty())
            .frequencies(FrequencyTable::default())
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Transliterator>();
    }

    #[test]
    fn plain_word() {
        let t = engine().build().unwrap();
        assert_eq!(t.transliterate("vala").unwrap(), "вала");
    }

    #[test]
    fn frequency_picks_among_stops() {
        let t = engine()
            .frequencies([("вадморт", 1u64), ("вакморт", 40)].into_iter().collect())
            .build()
            .unwrap();
        assert_eq!(t.transliterate_word("vaˀmort").unwrap(), "вакморт");
    }

    #[test]
    fn oracle_breaks_unattested_candidates() {
        let t = engine()
            .analyzer(LexiconAnalyzer::new(["ватморд"]))
            .build()
            .unwrap();
        assert_eq!(t.transliterate_word("vaˀmort").unwrap(), "ватморд");
    }

    #[test]
    fn standard_words_are_left_alone() {
        let t = engine().build().unwrap();
        assert_eq!(t.transliterate_word("Мон").unwrap(), "Мон");
        assert!(matches!(t.transliterate("мон тон").unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn corrections_apply_to_candidates() {
        let tier = CorrectionTier::from_pairs([("вала", "валэ")], Path::new("mem")).unwrap();
        let t = engine().corrections(tier).build().unwrap();
        assert_eq!(t.transliterate_word("vala").unwrap(), "валэ");
        assert_eq!(t.transliterate_word("VALA").unwrap(), "ВАЛЭ");
    }

    #[test]
    fn standardization_is_opt_in() {
        let std = CorrectionTier::from_pairs([("вала", "валаз")], Path::new("mem")).unwrap();
        let t = engine().standardization(std).build().unwrap();
        assert_eq!(t.transliterate("vala").unwrap(), "вала");
        let opts = TranslitOptions {
            standardize: true,
            ..t.options()
        };
        assert_eq!(t.transliterate_with("vala", opts).unwrap(), "валаз");
    }

    #[test]
    fn cleanup_collapses_and_marks() {
        let t = engine().cleanup(true).build().unwrap();
        assert_eq!(
            t.transliterate("  vala ..  (nrzb.)  ").unwrap(),
            "вала... [нрзб]"
        );
        let raw = engine().build().unwrap();
        assert_eq!(raw.transliterate("nrzb").unwrap(), "нрзб");
    }

    #[test]
    fn unsupported_pair_passes_through() {
        let t = engine().source(Script::Upa).build().unwrap();
        let text = "vaˀmort kə̑l";
        assert!(matches!(t.transliterate(text).unwrap(), Cow::Borrowed(s) if s == text));
    }

    #[test]
    fn options_override_defaults() {
        let t = engine().build().unwrap();
        let opts = TranslitOptions {
            source: Script::Standard,
            target: Script::BesermanLatin,
            ..t.options()
        };
        assert_eq!(t.transliterate_with("вала", opts).unwrap(), "vala");
    }

    #[test]
    fn candidates_are_distinct() {
        let t = engine().build().unwrap();
        let set = t.candidates("vaˀmort").unwrap();
        assert_eq!(set.len(), 8);
        assert!(set.iter().all(|c| !c.contains('ˀ')));
    }

    #[test]
    fn missing_default_resources() {
        let err = Transliterator::builder()
            .data_dir("/no/such/dir")
            .build()
            .unwrap_err();
        assert!(matches!(err, TranslitError::MissingResource { .. }));
    }

    #[test]
    fn analyzer_failures_surface() {
        struct Offline;
        impl Analyzer for Offline {
            fn analyze_words(&self, _: &str) -> Result<Vec<crate::oracle::Analysis>, AnalyzerError> {
                Err(AnalyzerError::Unavailable("down".into()))
            }
        }
        let t = engine().analyzer(Offline).build().unwrap();
        assert!(matches!(
            t.transliterate("vaˀmort"),
            Err(TranslitError::Analyzer(_))
        ));
        assert_eq!(t.transliterate("vala").unwrap(), "вала");
    }
}
