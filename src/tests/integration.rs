#[cfg(test)]
mod integration_tests {

    use crate::{
        CorrectionTier, FrequencyTable, LexiconAnalyzer, Script, TieBreak, Transliterator,
        TransliteratorBuilder,
        corpus::{
            annotation::{EafConfig, EafProcessor},
            process_corpus,
            tabular::{TableConfig, TableProcessor},
        },
    };
    use std::{fs, path::Path};

    fn builder() -> TransliteratorBuilder {
        Transliterator::builder()
            .corrections(CorrectionTier::empty())
            .frequencies(FrequencyTable::default())
    }

    #[test]
    fn transcript_sentence() {
        let t = builder().cleanup(true).build().unwrap();
        assert_eq!(
            t.transliterate("  van'  vnuke.. no polnost'ju  ").unwrap(),
            "вань внуке... но полностью"
        );
    }

    #[test]
    fn glottal_stop_never_survives() {
        let t = builder().build().unwrap();
        let out = t.transliterate("vaˀmort").unwrap();
        assert!(!out.contains('ˀ'));
        assert!(["вадморт", "ватморт", "вагморт", "вакморт", "вадморд", "ватморд", "вагморд", "вакморд"]
            .contains(&out.as_ref()));
    }

    #[test]
    fn frequency_decides_and_is_stable() {
        let t = builder()
            .frequencies([("вакморт", 7u64), ("вадморт", 2)].into_iter().collect())
            .build()
            .unwrap();
        for _ in 0..3 {
            assert_eq!(t.transliterate("vaˀmort").unwrap(), "вакморт");
        }
    }

    #[test]
    fn oracle_fallback_uses_the_cache() {
        let t = builder()
            .analyzer(LexiconAnalyzer::new(["вагморт"]))
            .build()
            .unwrap();
        assert_eq!(t.transliterate("vaˀmort").unwrap(), "вагморт");
        let oracle = t.disambiguator().oracle().unwrap();
        assert!(oracle.is_cached("вагморт"));
        assert_eq!(t.transliterate("Vaˀmort").unwrap(), "Вагморт");
    }

    #[test]
    fn seeded_shuffle_is_reproducible_end_to_end() {
        let make = || {
            builder()
                .analyzer(LexiconAnalyzer::new(["вадморт", "вакморд"]))
                .tie_break(TieBreak::Shuffle { seed: Some(11) })
                .build()
                .unwrap()
        };
        let a = make().transliterate("vaˀmort").unwrap().into_owned();
        let b = make().transliterate("vaˀmort").unwrap().into_owned();
        assert_eq!(a, b);
        assert!(a == "вадморт" || a == "вакморд");
    }

    #[test]
    fn legacy_cyrillic_sentence() {
        let t = builder().source(Script::TatyshlyCyrillic).build().unwrap();
        assert_eq!(
            t.transliterate("шиөн жеө ӝуөч шиˀ").unwrap(),
            "шиын жеы ӝуыч шид"
        );
        assert_eq!(t.transliterate("Шиөн").unwrap(), "Шиын");
        assert_eq!(t.transliterate("шулдыр").unwrap(), "шулдыр");
    }

    #[test]
    fn capped_expansion_still_resolves_every_marker() {
        let t = builder().max_candidates(4).build().unwrap();
        let out = t.transliterate("vaˀəˀə ˀaˀaˀa").unwrap();
        assert!(!out.contains('ˀ') && !out.contains('ө'), "{out}");
    }

    #[test]
    fn unintelligible_markers_need_cleanup() {
        let text = "mon (nrzb) <нрзб.> НРЗБ";
        let raw = builder().build().unwrap();
        assert_eq!(raw.transliterate(text).unwrap(), "мон (нрзб) <нрзб.> НРЗБ");
        let clean = builder().cleanup(true).build().unwrap();
        assert_eq!(clean.transliterate(text).unwrap(), "мон [нрзб] [нрзб] [нрзб]");
    }

    #[test]
    fn rule_file_case_variants() {
        let dir = tempfile::tempdir().unwrap();
        let rules = dir.path().join("rules.csv");
        fs::write(&rules, "^вала$\tвалэ\n").unwrap();
        let t = builder().corrections_path(&rules).build().unwrap();
        assert_eq!(t.transliterate("vala VALA Vala").unwrap(), "валэ ВАЛЭ Валэ");
    }

    #[test]
    fn data_directory_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cyr_replacements_rx.csv"), "кыл\tкыль\n").unwrap();
        fs::write(dir.path().join("std_freq_dict.json"), r#"{"вадморд": 3}"#).unwrap();
        let t = Transliterator::builder()
            .data_dir(dir.path())
            .build()
            .unwrap();
        assert_eq!(t.transliterate("kɨl vaˀmort").unwrap(), "кыль вадморд");
    }

    #[test]
    fn shipped_resources_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let t = Transliterator::builder().data_dir(root).build().unwrap();
        assert_eq!(t.transliterate("vala").unwrap(), "вала");
    }

    #[test]
    fn reverse_then_forward_dictionary_words() {
        let to_latin = builder()
            .source(Script::Standard)
            .target(Script::BesermanLatin)
            .build()
            .unwrap();
        let to_cyr = builder()
            .source(Script::BesermanLatin)
            .target(Script::Standard)
            .build()
            .unwrap();
        for word in ["вала", "шулдыр", "гурт", "сое"] {
            let latin = to_latin.transliterate(word).unwrap().into_owned();
            assert_eq!(to_cyr.transliterate(&latin).unwrap(), word, "via {latin}");
        }
    }

    #[test]
    fn tabular_corpus_run() {
        let t = builder().build().unwrap();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::create_dir_all(input.path().join("village")).unwrap();
        fs::write(input.path().join("a.tsv"), "src\ttgt\nvala\t\n").unwrap();
        fs::write(input.path().join("village/b.csv"), "src\nmon\nvnuke\n").unwrap();
        fs::write(input.path().join("village/notes.txt"), "skip me").unwrap();

        let mut p = TableProcessor::new(&t, TableConfig::default());
        let n = process_corpus(&mut p, input.path(), output.path()).unwrap();
        assert_eq!(n, 2);

        let b = fs::read_to_string(output.path().join("village/b.csv")).unwrap();
        assert_eq!(b, "\u{feff}src\nmon\tмон\nvnuke\tвнуке\n");
        assert!(!output.path().join("village/notes.txt").exists());
    }

    #[test]
    fn annotation_corpus_skips_broken_documents() {
        let t = builder().build().unwrap();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(
            input.path().join("good.eaf"),
            r#"<ANNOTATION_DOCUMENT><HEADER><PROPERTY NAME="lastUsedAnnotationId">0</PROPERTY></HEADER><TIER LINGUISTIC_TYPE_REF="transcription" TIER_ID="tx"><ANNOTATION><ALIGNABLE_ANNOTATION ANNOTATION_ID="a0"><ANNOTATION_VALUE>vala</ANNOTATION_VALUE></ALIGNABLE_ANNOTATION></ANNOTATION></TIER></ANNOTATION_DOCUMENT>"#,
        )
        .unwrap();
        fs::write(input.path().join("broken.eaf"), "<ANNOTATION_DOCUMENT>").unwrap();

        let mut p = EafProcessor::new(&t, EafConfig::new("transcription")).unwrap();
        let n = process_corpus(&mut p, input.path(), output.path()).unwrap();
        assert_eq!(n, 1);

        let good = fs::read_to_string(output.path().join("good.eaf")).unwrap();
        assert!(good.contains(r#"TIER_ID="tx_st@SP1""#));
        assert!(good.contains(r#"<REF_ANNOTATION ANNOTATION_ID="a1" ANNOTATION_REF="a0"><ANNOTATION_VALUE>вала</ANNOTATION_VALUE>"#));
        assert!(good.contains(r#"<PROPERTY NAME="lastUsedAnnotationId">1</PROPERTY>"#));
    }

    #[test]
    fn missing_corpus_directory() {
        let t = builder().build().unwrap();
        let mut p = TableProcessor::new(&t, TableConfig::default());
        let err = process_corpus(&mut p, Path::new("/no/such/csv"), Path::new("/tmp/out")).unwrap_err();
        assert!(matches!(err, crate::corpus::CorpusError::MissingDirectory(_)));
    }
}
