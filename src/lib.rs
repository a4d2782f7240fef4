pub mod context;
pub mod corpus;
pub mod correction;
pub mod disambiguate;
pub mod expand;
pub mod frequency;
pub mod oracle;
pub mod pipeline;
pub mod process;
pub mod script;
pub mod stage;
pub mod tokenize;
pub mod translit;
pub mod unicode;


pub use context::Context;
pub use correction::CorrectionTier;
pub use disambiguate::{Disambiguator, TieBreak};
pub use expand::{CandidateSet, Expander};
pub use frequency::FrequencyTable;
pub use oracle::{AnalyzabilityOracle, Analysis, Analyzer, AnalyzerError, LexiconAnalyzer};
pub use pipeline::Pipeline;
pub use process::{DynamicProcess, Process};
pub use script::{DialectPair, Script};
pub use stage::{Stage, StageError};
pub use translit::{TranslitError, TranslitOptions, Transliterator, TransliteratorBuilder};

#[cfg(test)]
mod tests {
    include!("tests/unit.rs");
    include!("tests/integration.rs");
    include!("tests/proptest.rs");
}
