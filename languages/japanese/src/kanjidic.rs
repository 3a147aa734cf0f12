use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shirabe_core::dictionary::{
    Dictionary, DictionaryEntry, LoadError, MultiReadingEntry, SearchResults,
};
use shirabe_core::error::SearchError;
use shirabe_core::registry::{Implementation, TestResult};
use shirabe_core::search::{
    DictionaryEntryField, ExpressionMatch, ExpressionSearchModes, SearchFieldSelection,
    SearchMode, SearchValue,
};

use crate::entry::{InflectedReading, KanjiEntry, is_entry_line};
use crate::kana;
use crate::loader;

/// Initial capacity of the key map, sized for a full KANJIDIC
const EXPECTED_KEYS: usize = 25_001;

/// Raw dictionary lines stored under one key
#[derive(Debug)]
enum Bucket {
    Single(Arc<str>),
    Many(Vec<Arc<str>>),
}

impl Bucket {
    fn lines(&self) -> &[Arc<str>] {
        match self {
            Bucket::Single(line) => std::slice::from_ref(line),
            Bucket::Many(lines) => lines,
        }
    }
}

/// Dictionary for KANJIDIC-style files.
///
/// The whole file is scanned once on construction into a map from every
/// kanji, reading, radical name and translation to the raw lines containing
/// it. Lines are parsed into entries only when a lookup reaches them. The map
/// is never modified afterwards, so a `KanjiDic` can be shared between threads.
pub struct KanjiDic {
    path: PathBuf,
    name: Arc<str>,
    entries: HashMap<String, Bucket>,
}

impl KanjiDic {
    /// Load a dictionary file. The character encoding is detected.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = loader::read_text(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => LoadError::FileNotFound(path.display().to_string()),
            _ => LoadError::IoError(err),
        })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let dictionary = Self::from_text(path, &name, &text);
        tracing::info!(
            "Loaded KANJIDIC {} with {} keys",
            dictionary.name,
            dictionary.entries.len()
        );
        Ok(dictionary)
    }

    /// Build the index from dictionary text already in memory.
    pub fn from_text(path: impl Into<PathBuf>, name: &str, text: &str) -> Self {
        let mut dictionary = Self {
            path: path.into(),
            name: Arc::from(name),
            entries: HashMap::with_capacity(EXPECTED_KEYS),
        };

        for line in text.lines().filter(|line| is_entry_line(line)) {
            let Some(entry) = KanjiEntry::parse(line, false) else {
                continue;
            };
            let line: Arc<str> = Arc::from(line);

            dictionary.add_entry(entry.head(), &line);
            dictionary.add_readings(&line, entry.kanji, &entry.readings);
            dictionary.add_readings(&line, entry.kanji, &entry.name_readings);
            if let Some(radical_name) = entry.radical_name {
                dictionary.add_entry(radical_name, &line);
            }
            for translation in entry.translations {
                dictionary.add_entry(translation, &line);
            }
        }

        for bucket in dictionary.entries.values_mut() {
            if let Bucket::Many(lines) = bucket {
                lines.shrink_to_fit();
            }
        }

        dictionary
    }

    /// Store `line` under `key`. A key only turns into a list once a line with
    /// different text arrives, and only the last line of a list is checked for
    /// duplicates: lines are added in file order, so repeats are adjacent.
    fn add_entry(&mut self, key: String, line: &Arc<str>) {
        match self.entries.get_mut(&key) {
            None => {
                self.entries.insert(key, Bucket::Single(Arc::clone(line)));
            }
            Some(bucket) => match bucket {
                Bucket::Single(existing) => {
                    if **existing != **line {
                        let first = Arc::clone(existing);
                        *bucket = Bucket::Many(vec![first, Arc::clone(line)]);
                    }
                }
                Bucket::Many(lines) => {
                    if lines.last().is_none_or(|last| **last != **line) {
                        lines.push(Arc::clone(line));
                    }
                }
            },
        }
    }

    /// Readings with okurigana are stored twice: without the separator and as
    /// kanji plus ending.
    fn add_readings(&mut self, line: &Arc<str>, kanji: char, readings: &[String]) {
        for reading in readings {
            match InflectedReading::split(reading) {
                None => self.add_entry(reading.clone(), line),
                Some(inflected) => {
                    self.add_entry(inflected.pure_reading(), line);
                    self.add_entry(inflected.surface_form(kanji), line);
                }
            }
        }
    }

    /// Path of the dictionary file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct lookup keys
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// The entry for a single kanji, with extended information.
    pub fn by_head_symbol(&self, kanji: char) -> Option<KanjiEntry> {
        self.entries
            .get(kanji.to_string().as_str())?
            .lines()
            .iter()
            .filter_map(|line| KanjiEntry::parse(line, true))
            .find(|entry| entry.kanji == kanji)
    }

    /// Entries stored under `key`, which may be a kanji, a reading or a
    /// translation. Each entry is parsed when the iterator reaches it.
    pub fn by_key<'a>(&'a self, key: &str) -> impl Iterator<Item = KanjiEntry> + 'a {
        self.bucket(key)
            .iter()
            .filter_map(|line| KanjiEntry::parse(line, true))
    }

    fn bucket(&self, key: &str) -> &[Arc<str>] {
        self.entries.get(key).map_or(&[], Bucket::lines)
    }

    /// Search the entries stored under the literal `expression`.
    ///
    /// Only [`ExpressionMatch::Equals`] gives complete results. Candidates
    /// are always taken from the bucket of the literal expression, so the
    /// other relations can only filter entries that already share that key:
    /// they return the exact matches, never every prefix, suffix or
    /// substring match in the dictionary.
    pub fn search_expression(
        &self,
        relation: ExpressionMatch,
        expression: &str,
        fields: SearchFieldSelection,
    ) -> EntryListIter<'_> {
        EntryListIter {
            candidates: self.bucket(expression).iter(),
            relation,
            expression: kana::fold(expression),
            fields,
            dictionary: Arc::clone(&self.name),
            cache: VecDeque::new(),
        }
    }
}

impl Dictionary for KanjiDic {
    fn name(&self) -> &str {
        &self.name
    }

    fn search<'a>(
        &'a self,
        mode: &SearchMode,
        parameters: &[SearchValue],
    ) -> Result<SearchResults<'a>, SearchError> {
        let relation = mode
            .expression_match()
            .ok_or_else(|| SearchError::UnsupportedSearchMode(mode.name().to_string()))?;
        mode.parameters().validate(parameters)?;

        let (Some(expression), Some(fields)) = (parameters[0].as_text(), parameters[1].as_fields())
        else {
            return Err(SearchError::ParameterCount {
                expected: mode.parameters().len(),
                found: parameters.len(),
            });
        };

        Ok(Box::new(self.search_expression(relation, expression, *fields)))
    }

    fn supports(&self, mode: &SearchMode, fully: bool) -> bool {
        if fully {
            *mode == ExpressionSearchModes::EXACT
        } else {
            mode.is_expression_mode()
        }
    }

    fn supported_fields(&self, _mode: &SearchMode) -> SearchFieldSelection {
        SearchFieldSelection::new(true, true, true, true, false)
    }
}

impl fmt::Display for KanjiDic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KANJIDIC {}", self.name)
    }
}

impl fmt::Debug for KanjiDic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KanjiDic")
            .field("path", &self.path)
            .field("keys", &self.entries.len())
            .finish()
    }
}

/// Lazy search over the lines of one bucket.
///
/// Every candidate line can produce several results, which are buffered
/// until consumed. Name readings take no part in matching.
pub struct EntryListIter<'a> {
    candidates: std::slice::Iter<'a, Arc<str>>,
    relation: ExpressionMatch,
    expression: String,
    fields: SearchFieldSelection,
    dictionary: Arc<str>,
    cache: VecDeque<MultiReadingEntry>,
}

impl EntryListIter<'_> {
    fn matches(&self, candidate: &str) -> bool {
        self.relation.matches(candidate, &self.expression)
    }

    fn result(&self, word: String, readings: Vec<String>, translations: &[String]) -> MultiReadingEntry {
        MultiReadingEntry::new(
            word,
            readings,
            translations.to_vec(),
            Arc::clone(&self.dictionary),
        )
    }

    fn fill_cache(&mut self) {
        while self.cache.is_empty() {
            let Some(line) = self.candidates.next() else {
                return;
            };
            let Some(entry) = KanjiEntry::parse(line, false) else {
                continue;
            };
            self.collect_matches(&entry);
        }
    }

    fn collect_matches(&mut self, entry: &KanjiEntry) {
        let kanji = entry.head();
        let readings: Vec<String> = entry.plain_readings().map(str::to_string).collect();
        let mut inflected: Vec<InflectedReading> = entry.inflected_readings().collect();
        let word_selected = self.fields.is_selected(DictionaryEntryField::Word);
        let reading_selected = self.fields.is_selected(DictionaryEntryField::Reading);

        if word_selected && self.expression == kanji {
            let result = self.result(kanji.clone(), readings.clone(), &entry.translations);
            self.cache.push_back(result);
        }

        if reading_selected
            && readings
                .iter()
                .any(|reading| self.matches(&kana::fold(reading)))
        {
            let result = self.result(kanji.clone(), readings.clone(), &entry.translations);
            self.cache.push_back(result);
        }

        if word_selected || reading_selected {
            let mut remaining = Vec::with_capacity(inflected.len());
            for reading in inflected.drain(..) {
                let surface = reading.surface_form(entry.kanji);
                let pure = reading.pure_reading();
                if (word_selected && self.matches(&kana::fold(&surface)))
                    || (reading_selected && self.matches(&kana::fold(&pure)))
                {
                    let result = self.result(surface, vec![pure], &entry.translations);
                    self.cache.push_back(result);
                } else {
                    remaining.push(reading);
                }
            }
            inflected = remaining;
        }

        if self.fields.is_selected(DictionaryEntryField::Translation)
            && entry
                .translations
                .iter()
                .any(|translation| self.matches(&kana::fold(translation)))
        {
            // a translation covers the whole entry, including every inflected
            // reading not already reported
            let result = self.result(kanji, readings, &entry.translations);
            self.cache.push_back(result);
            for reading in inflected {
                let result = self.result(
                    reading.surface_form(entry.kanji),
                    vec![reading.pure_reading()],
                    &entry.translations,
                );
                self.cache.push_back(result);
            }
        }
    }
}

impl Iterator for EntryListIter<'_> {
    type Item = Box<dyn DictionaryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cache.is_empty() {
            self.fill_cache();
        }
        self.cache
            .pop_front()
            .map(|entry| Box::new(entry) as Box<dyn DictionaryEntry>)
    }
}

/// Format descriptor for KANJIDIC files
#[derive(Debug, Default, Clone, Copy)]
pub struct KanjiDicImplementation;

impl KanjiDicImplementation {
    pub const NAME: &'static str = "KANJIDIC";
    /// Comment lines skipped before giving up on finding an entry
    const MAX_PROBE_LINES: usize = 100;

    /// An entry line starts with the kanji, a space and a positive
    /// four-digit hexadecimal JIS code.
    fn looks_like_entry(line: &str) -> bool {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() <= 7 || chars[1] != ' ' {
            return false;
        }
        let code: String = chars[2..6].iter().collect();
        u32::from_str_radix(&code, 16).is_ok_and(|code| code > 0)
    }
}

impl Implementation for KanjiDicImplementation {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn max_confidence(&self) -> f32 {
        1.0
    }

    fn is_instance(&self, descriptor: &str) -> TestResult {
        let text = match loader::read_prefix(Path::new(descriptor)) {
            Ok(text) => text,
            Err(err) => return TestResult::rejected(format!("read failure: {err}")),
        };

        let first_entry = text
            .lines()
            .take(Self::MAX_PROBE_LINES - 1)
            .find(|line| is_entry_line(line));

        match first_entry {
            Some(line) if Self::looks_like_entry(line) => {
                TestResult::new(self.max_confidence(), "ok")
            }
            _ => TestResult::rejected("pattern mismatch"),
        }
    }

    fn create_instance(&self, descriptor: &str) -> Result<Box<dyn Dictionary>, LoadError> {
        Ok(Box::new(KanjiDic::open(descriptor)?))
    }
}
