use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use shirabe_config::search::SearchConfig;
use shirabe_core::dictionary::DictionaryEntry;
use shirabe_core::error::RegistryError;
use shirabe_core::preprocess::{DefaultPreprocessor, Preprocessor};
use shirabe_core::search::{
    SearchFieldSelection, SearchMode, SearchValue, expression_mode_by_name,
};
use shirabe_lang_japanese::{KanjiDic, KanjiEntry};

use crate::state::AppState;

/// Search settings after command line flags are merged over the config
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub fields: SearchFieldSelection,
    pub limit: usize,
}

impl SearchOptions {
    pub fn resolve(
        config: &SearchConfig,
        mode: Option<&str>,
        fields: Option<&[String]>,
        limit: Option<usize>,
    ) -> anyhow::Result<Self> {
        let mode_name = mode.unwrap_or(&config.mode);
        let mode = expression_mode_by_name(mode_name)
            .ok_or_else(|| anyhow!("Unknown search mode '{mode_name}'"))?;

        let names = fields.unwrap_or(&config.fields);
        let fields = SearchFieldSelection::from_names(names.iter().map(String::as_str))?;
        if !fields.is_valid() {
            bail!("No search fields selected");
        }

        Ok(Self {
            mode,
            fields,
            limit: limit.unwrap_or(config.max_results),
        })
    }
}

pub fn formats(state: &AppState) {
    for implementation in state.registry.implementations() {
        println!(
            "{}\t(max confidence {})",
            implementation.name(),
            implementation.max_confidence()
        );
    }
}

pub fn detect(state: &AppState, descriptor: &str) -> anyhow::Result<()> {
    match state.registry.detect(descriptor) {
        Ok(implementation) => {
            println!("{}", implementation.name());
            Ok(())
        }
        Err(RegistryError::FormatNotSupported { reasons }) => {
            for reason in reasons.lines() {
                println!("{reason}");
            }
            bail!("{descriptor}: format not supported")
        }
        Err(e) => Err(e.into()),
    }
}

pub fn search(
    state: &AppState,
    expression: &str,
    dictionaries: &[PathBuf],
    options: &SearchOptions,
) -> anyhow::Result<usize> {
    let query = DefaultPreprocessor.process(expression);
    if query.is_empty() {
        bail!("Empty search expression");
    }

    let paths = state.dictionary_paths(dictionaries);
    if paths.is_empty() {
        bail!("No dictionaries given; use --dict or set SHIRABE_DICTIONARIES");
    }

    let arguments: [SearchValue; 2] = [query.as_str().into(), options.fields.into()];
    let mut printed = 0;
    for path in &paths {
        let dictionary = state.open_dictionary(path)?;
        if !dictionary.supports(&options.mode, false) {
            tracing::warn!(
                "{} does not support {} searches",
                dictionary.name(),
                options.mode
            );
            dictionary.dispose();
            continue;
        }
        if !dictionary.supports(&options.mode, true) {
            tracing::info!(
                "{} only returns partial results for {} searches",
                dictionary.name(),
                options.mode
            );
        }

        let results = dictionary
            .search(&options.mode, &arguments)
            .with_context(|| format!("Search in {} failed", dictionary.name()))?;
        for entry in results.take(options.limit - printed) {
            println!("{}", format_entry(entry.as_ref()));
            printed += 1;
        }
        dictionary.dispose();

        if printed >= options.limit {
            break;
        }
    }

    tracing::debug!("{} results for {}", printed, query);
    Ok(printed)
}

pub fn kanji(state: &AppState, kanji: char, dictionary: Option<&Path>) -> anyhow::Result<()> {
    let path = match dictionary {
        Some(path) => path.to_path_buf(),
        None => state
            .dictionary_paths(&[])
            .into_iter()
            .next()
            .context("No dictionary given; use --dict or set SHIRABE_DICTIONARIES")?,
    };

    let dictionary = KanjiDic::open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let entry = dictionary
        .by_head_symbol(kanji)
        .with_context(|| format!("{kanji} is not in {}", path.display()))?;

    print!("{}", format_kanji(&entry));
    Ok(())
}

pub fn format_entry(entry: &dyn DictionaryEntry) -> String {
    let mut line = entry.word().to_string();
    if !entry.readings().is_empty() {
        line.push_str(&format!(" [{}]", entry.readings().join(", ")));
    }
    if !entry.translations().is_empty() {
        line.push_str(&format!(" {}", entry.translations().join("; ")));
    }
    line.push_str(&format!(" ({})", entry.dictionary_name()));
    line
}

pub fn format_kanji(entry: &KanjiEntry) -> String {
    let mut text = format!("{}\n", entry.kanji);
    let mut field = |label: &str, value: String| {
        if !value.is_empty() {
            text.push_str(&format!("  {label}: {value}\n"));
        }
    };

    field("readings", entry.readings.join(", "));
    field("name readings", entry.name_readings.join(", "));
    field("radical name", entry.radical_name.clone().unwrap_or_default());
    field("meanings", entry.translations.join("; "));
    field("strokes", optional(entry.stroke_count));
    field("radical", optional(entry.radical));
    field("classical radical", optional(entry.classical_radical));
    field("frequency", optional(entry.frequency));
    text
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
