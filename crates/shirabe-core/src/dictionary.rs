use std::fmt;
use std::sync::Arc;

use crate::error::SearchError;
use crate::search::{SearchFieldSelection, SearchMode, SearchValue};

/// Lazy, forward-only sequence of search hits.
pub type SearchResults<'a> = Box<dyn Iterator<Item = Box<dyn DictionaryEntry>> + Send + 'a>;

/// Dictionary lookup operations
pub trait Dictionary: Send + Sync {
    /// Display name of the dictionary
    fn name(&self) -> &str;

    /// Run a search. `parameters` must match `mode.parameters()`.
    fn search<'a>(
        &'a self,
        mode: &SearchMode,
        parameters: &[SearchValue],
    ) -> Result<SearchResults<'a>, SearchError>;

    /// Whether `mode` can be run at all, or with complete results if `fully` is set
    fn supports(&self, mode: &SearchMode, fully: bool) -> bool;

    /// Entry fields this dictionary can search for `mode`
    fn supported_fields(&self, mode: &SearchMode) -> SearchFieldSelection;

    /// Release resources held by the dictionary
    fn dispose(&self) {}
}

/// Individual dictionary entry
pub trait DictionaryEntry: Send + Sync + fmt::Debug {
    /// Main headword/term
    fn word(&self) -> &str;

    /// All possible readings/pronunciations
    fn readings(&self) -> &[String];

    /// All translations
    fn translations(&self) -> &[String];

    /// Name of the dictionary that produced this entry
    fn dictionary_name(&self) -> &str;
}

/// Entry with a single word, any number of readings and a flat translation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiReadingEntry {
    word: String,
    readings: Vec<String>,
    translations: Vec<String>,
    dictionary: Arc<str>,
}

impl MultiReadingEntry {
    pub fn new(
        word: impl Into<String>,
        readings: Vec<String>,
        translations: Vec<String>,
        dictionary: Arc<str>,
    ) -> Self {
        Self {
            word: word.into(),
            readings,
            translations,
            dictionary,
        }
    }
}

impl DictionaryEntry for MultiReadingEntry {
    fn word(&self) -> &str {
        &self.word
    }

    fn readings(&self) -> &[String] {
        &self.readings
    }

    fn translations(&self) -> &[String] {
        &self.translations
    }

    fn dictionary_name(&self) -> &str {
        &self.dictionary
    }
}

impl fmt::Display for MultiReadingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.word)?;
        if !self.readings.is_empty() {
            write!(f, " [{}]", self.readings.join("; "))?;
        }
        if !self.translations.is_empty() {
            write!(f, " /{}/", self.translations.join("/"))?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
