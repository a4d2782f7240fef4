//! Corpus runner: transliterates `csv/` into `csv_transliterated/` and
//! `eaf/` into `eaf_transliterated/`, relative to the working directory.
use std::{path::Path, process::ExitCode};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use udmurt_translit::{
    Script, Transliterator,
    corpus::{
        CorpusError, DocumentProcessor,
        annotation::{EafConfig, EafProcessor},
        process_corpus,
        tabular::{TableConfig, TableProcessor},
    },
};

/// Legacy tables keep the Cyrillic transcription in the second column and
/// receive the standard spelling in the first.
const LEGACY_TABLES: TableConfig = TableConfig {
    delimiter: b'\t',
    source_col: 1,
    target_col: 0,
    start_line: 1,
};

const TRANSCRIPTION_TIERS: &str = "transcription";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(processor: &mut dyn DocumentProcessor, input: &str, output: &str, what: &str) {
    match process_corpus(processor, Path::new(input), Path::new(output)) {
        Ok(n) => println!("{n} documents processed."),
        Err(CorpusError::MissingDirectory(_)) => {
            println!("All {what} files should be located in the {input} folder.");
        }
        Err(e) => error!(error = %e, input, "corpus run failed"),
    }
}

fn main() -> ExitCode {
    init_logging();

    let tables = match Transliterator::builder()
        .source(Script::TatyshlyCyrillic)
        .target(Script::Standard)
        .cleanup(true)
        .build()
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "cannot build transliterator");
            return ExitCode::FAILURE;
        }
    };
    run(
        &mut TableProcessor::new(&tables, LEGACY_TABLES),
        "csv",
        "csv_transliterated",
        "CSV",
    );

    let transcripts = match Transliterator::builder()
        .source(Script::TatyshlyLatin)
        .target(Script::Standard)
        .cleanup(true)
        .build()
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "cannot build transliterator");
            return ExitCode::FAILURE;
        }
    };
    match EafProcessor::new(&transcripts, EafConfig::new(TRANSCRIPTION_TIERS)) {
        Ok(mut eaf) => run(&mut eaf, "eaf", "eaf_transliterated", "ELAN"),
        Err(e) => {
            error!(error = %e, "invalid tier configuration");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
