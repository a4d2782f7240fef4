//! Closed set of word pipelines, one per supported (source, target) pair.
//!
//! A pipeline has two phases. The *front* runs once per word and produces the
//! raw mapped form; the *cascade* runs on every candidate the expander derives
//! from it. Pairs without a pipeline pass words through unchanged.
use crate::{
    process::DynamicProcess,
    script::{
        DialectPair, Script,
        data::{
            BESERMAN_LATIN, CYRILLIC_TO_LATIN, HARD_SIBILANT_SPELLINGS, LATIN_GEMINATE_FIXES,
            LATIN_PALATAL_FIXES, LEGACY_CYRILLIC_TO_LATIN, TATYSHLY_LATIN, UPA_REPLACEMENTS,
        },
    },
    stage::{
        affricate::{DropAffricateMark, SoftSign},
        depalatalize::Depalatalize,
        digraph::{JoinDigraphs, SPLIT_REDUCED},
        extra_soft::ExtraSoft,
        glide::MergeGlides,
        hard_sign::HardSign,
        literal::LiteralReplace,
        map_letters::{MapLetters, NormalizeApostrophe},
        neutral_vowel::NeutralVowels,
        reverse::{
            AffricateMark, CollapseMarks, DropHardMark, DropVowelMark, ExtraSoftLatin,
            LabialGlide, LatinGlides,
        },
        soften::Soften,
    },
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    /// `tatyshly_lat → standard`: map, expand, cascade, correct, disambiguate.
    FieldToStandard,
    /// `tatyshly_cyr → standard`: hard sibilant spellings, Cyrillic → dictionary
    /// Latin keeping `ӝ`/`ӵ`, then as above.
    LegacyCyrillicToStandard,
    /// `beserman_lat → standard`: map, cascade, correct. No expansion.
    DictionaryToStandard,
    /// `beserman_lat → upa`: ordered literal replacements.
    DictionaryToUpa,
    /// `standard → beserman_lat`: the reverse cascade.
    StandardToDictionary,
    PassThrough,
}

impl Pipeline {
    pub const ALL: &'static [Pipeline] = &[
        Pipeline::FieldToStandard,
        Pipeline::LegacyCyrillicToStandard,
        Pipeline::DictionaryToStandard,
        Pipeline::DictionaryToUpa,
        Pipeline::StandardToDictionary,
        Pipeline::PassThrough,
    ];

    pub const fn for_pair(pair: DialectPair) -> Self {
        use Script::*;
        match (pair.source, pair.target) {
            (TatyshlyLatin, Standard) => Pipeline::FieldToStandard,
            (TatyshlyCyrillic, Standard) => Pipeline::LegacyCyrillicToStandard,
            (BesermanLatin, Standard) => Pipeline::DictionaryToStandard,
            (BesermanLatin, Upa) => Pipeline::DictionaryToUpa,
            (Standard, BesermanLatin) => Pipeline::StandardToDictionary,
            _ => Pipeline::PassThrough,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Pipeline::FieldToStandard => "field_to_standard",
            Pipeline::LegacyCyrillicToStandard => "legacy_cyrillic_to_standard",
            Pipeline::DictionaryToStandard => "dictionary_to_standard",
            Pipeline::DictionaryToUpa => "dictionary_to_upa",
            Pipeline::StandardToDictionary => "standard_to_dictionary",
            Pipeline::PassThrough => "pass_through",
        }
    }

    /// Output is standard orthography: words already in it are left alone
    /// and the correction dictionary applies.
    #[inline]
    pub const fn targets_standard(&self) -> bool {
        matches!(
            self,
            Pipeline::FieldToStandard
                | Pipeline::LegacyCyrillicToStandard
                | Pipeline::DictionaryToStandard
        )
    }

    /// The raw form may hold ambiguous symbols that need variant expansion.
    #[inline]
    pub const fn expands(&self) -> bool {
        matches!(
            self,
            Pipeline::FieldToStandard | Pipeline::LegacyCyrillicToStandard
        )
    }

    #[inline]
    const fn index(&self) -> usize {
        *self as usize
    }

    /// Stages producing the raw mapped form of a word.
    pub fn front(&self) -> DynamicProcess {
        match self {
            Pipeline::FieldToStandard => field_front(),
            Pipeline::LegacyCyrillicToStandard => DynamicProcess::new()
                .push(LiteralReplace::new("hard_sibilants", HARD_SIBILANT_SPELLINGS))
                .push(MapLetters::new(&LEGACY_CYRILLIC_TO_LATIN))
                .then(&field_front()),
            Pipeline::DictionaryToStandard => DynamicProcess::new()
                .push(MapLetters::new(&BESERMAN_LATIN))
                .push(NormalizeApostrophe),
            Pipeline::DictionaryToUpa => DynamicProcess::new()
                .push(NormalizeApostrophe)
                .push(SPLIT_REDUCED)
                .push(LiteralReplace::new("upa_replacements", UPA_REPLACEMENTS)),
            Pipeline::StandardToDictionary => reverse_cascade(),
            Pipeline::PassThrough => DynamicProcess::new(),
        }
    }

    /// Stages run on every candidate.
    pub fn cascade(&self) -> DynamicProcess {
        if self.targets_standard() {
            standard_cascade()
        } else {
            DynamicProcess::new()
        }
    }

    pub fn compile(self) -> CompiledPipeline {
        CompiledPipeline {
            kind: self,
            front: self.front(),
            cascade: self.cascade(),
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn field_front() -> DynamicProcess {
    DynamicProcess::new()
        .push(JoinDigraphs)
        .push(MapLetters::new(&TATYSHLY_LATIN))
        .push(NormalizeApostrophe)
}

/// Contextual rewrites from mapped Cyrillic to the standard orthography.
pub fn standard_cascade() -> DynamicProcess {
    DynamicProcess::new()
        .push(Soften)
        .push(Depalatalize)
        .push(MergeGlides)
        .push(NeutralVowels)
        .push(HardSign)
        .push(DropAffricateMark)
        .push(SoftSign)
        .push(ExtraSoft)
}

/// Standard orthography → Beserman dictionary Latin.
pub fn reverse_cascade() -> DynamicProcess {
    DynamicProcess::new()
        .push(LabialGlide)
        .push(LiteralReplace::new("hard_sibilants", HARD_SIBILANT_SPELLINGS))
        .push(MapLetters::new(&CYRILLIC_TO_LATIN))
        .push(LatinGlides)
        .push(LiteralReplace::new("latin_palatal_fixes", LATIN_PALATAL_FIXES))
        .push(AffricateMark)
        .push(DropHardMark)
        .push(ExtraSoftLatin)
        .push(LiteralReplace::new("latin_geminate_fixes", LATIN_GEMINATE_FIXES))
        .push(CollapseMarks)
        .push(DropVowelMark)
}

/// A pipeline with its stage chains built.
#[derive(Debug, Clone)]
pub struct CompiledPipeline {
    pub kind: Pipeline,
    pub front: DynamicProcess,
    pub cascade: DynamicProcess,
}

/// Every pipeline, compiled once per engine.
#[derive(Debug, Clone)]
pub struct PipelineSet {
    compiled: Vec<CompiledPipeline>,
}

impl Default for PipelineSet {
    fn default() -> Self {
        Self {
            compiled: Pipeline::ALL.iter().map(|p| p.compile()).collect(),
        }
    }
}

impl PipelineSet {
    #[inline]
    pub fn get(&self, pipeline: Pipeline) -> &CompiledPipeline {
        &self.compiled[pipeline.index()]
    }

    #[inline]
    pub fn for_pair(&self, pair: DialectPair) -> &CompiledPipeline {
        self.get(Pipeline::for_pair(pair))
    }
}
