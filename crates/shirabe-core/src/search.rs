use std::fmt;

use crate::error::SearchError;

/// Semantic type of a search parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    Text,
    Fields,
    Character,
    Short,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::Text => "text",
            ParameterType::Fields => "search fields",
            ParameterType::Character => "character",
            ParameterType::Short => "short",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed argument slot of a search mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameter {
    kind: ParameterType,
    description: &'static str,
}

impl SearchParameter {
    pub const fn new(kind: ParameterType, description: &'static str) -> Self {
        Self { kind, description }
    }

    pub fn kind(&self) -> ParameterType {
        self.kind
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Display for SearchParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description)
    }
}

/// Parameter vocabulary shared by all dictionary formats.
pub struct StandardSearchParameter;

impl StandardSearchParameter {
    pub const EXPRESSION: SearchParameter =
        SearchParameter::new(ParameterType::Text, "Search expression");
    pub const SEARCH_FIELDS: SearchParameter =
        SearchParameter::new(ParameterType::Fields, "Search fields");
    pub const WILDCARD: SearchParameter =
        SearchParameter::new(ParameterType::Character, "Wildcard");
    /// Reserved for edit-distance searches; no format implements it yet.
    pub const DISTANCE: SearchParameter = SearchParameter::new(ParameterType::Short, "Distance");
}

/// A runtime argument passed across the `Dictionary::search` boundary
#[derive(Debug, Clone, PartialEq)]
pub enum SearchValue {
    Text(String),
    Fields(SearchFieldSelection),
    Character(char),
    Short(i16),
}

impl SearchValue {
    pub fn kind(&self) -> ParameterType {
        match self {
            SearchValue::Text(_) => ParameterType::Text,
            SearchValue::Fields(_) => ParameterType::Fields,
            SearchValue::Character(_) => ParameterType::Character,
            SearchValue::Short(_) => ParameterType::Short,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SearchValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_fields(&self) -> Option<&SearchFieldSelection> {
        match self {
            SearchValue::Fields(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<&str> for SearchValue {
    fn from(text: &str) -> Self {
        SearchValue::Text(text.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(text: String) -> Self {
        SearchValue::Text(text)
    }
}

impl From<SearchFieldSelection> for SearchValue {
    fn from(fields: SearchFieldSelection) -> Self {
        SearchValue::Fields(fields)
    }
}

/// Fixed, ordered list of the parameters a search mode requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    parameters: &'static [SearchParameter],
}

impl SearchParameters {
    pub const fn new(parameters: &'static [SearchParameter]) -> Self {
        Self { parameters }
    }

    pub fn get(&self, index: usize) -> Option<&SearchParameter> {
        self.parameters.get(index)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn contains(&self, parameter: &SearchParameter) -> bool {
        self.parameters.contains(parameter)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchParameter> {
        self.parameters.iter()
    }

    /// Checks that `args` matches the parameter list in length and, position by
    /// position, in type.
    pub fn validate(&self, args: &[SearchValue]) -> Result<(), SearchError> {
        if args.len() != self.parameters.len() {
            return Err(SearchError::ParameterCount {
                expected: self.parameters.len(),
                found: args.len(),
            });
        }

        for (index, (parameter, arg)) in self.parameters.iter().zip(args).enumerate() {
            if parameter.kind() != arg.kind() {
                return Err(SearchError::ParameterType {
                    index,
                    expected: parameter.kind(),
                    found: arg.kind(),
                });
            }
        }

        Ok(())
    }
}

/// Identity of a query kind together with the parameters it expects.
///
/// Two modes are the same mode if their names are equal.
#[derive(Debug, Clone, Copy)]
pub struct SearchMode {
    name: &'static str,
    description: &'static str,
    family: ModeFamily,
    parameters: SearchParameters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeFamily {
    Expression(ExpressionMatch),
    Distance,
}

impl SearchMode {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn parameters(&self) -> &SearchParameters {
        &self.parameters
    }

    /// The string relation of an expression mode, `None` for other mode families.
    pub fn expression_match(&self) -> Option<ExpressionMatch> {
        match self.family {
            ModeFamily::Expression(relation) => Some(relation),
            ModeFamily::Distance => None,
        }
    }

    pub fn is_expression_mode(&self) -> bool {
        self.expression_match().is_some()
    }
}

impl PartialEq for SearchMode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SearchMode {}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// How a normalized candidate relates to the normalized query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionMatch {
    Equals,
    StartsWith,
    EndsWith,
    Contains,
}

impl ExpressionMatch {
    pub fn matches(&self, candidate: &str, expression: &str) -> bool {
        match self {
            ExpressionMatch::Equals => candidate == expression,
            ExpressionMatch::StartsWith => candidate.starts_with(expression),
            ExpressionMatch::EndsWith => candidate.ends_with(expression),
            ExpressionMatch::Contains => candidate.contains(expression),
        }
    }
}

const EXPRESSION_PARAMETERS: &[SearchParameter] = &[
    StandardSearchParameter::EXPRESSION,
    StandardSearchParameter::SEARCH_FIELDS,
];

const DISTANCE_PARAMETERS: &[SearchParameter] = &[
    StandardSearchParameter::EXPRESSION,
    StandardSearchParameter::SEARCH_FIELDS,
    StandardSearchParameter::DISTANCE,
];

const fn expression_mode(
    name: &'static str,
    description: &'static str,
    relation: ExpressionMatch,
) -> SearchMode {
    SearchMode {
        name,
        description,
        family: ModeFamily::Expression(relation),
        parameters: SearchParameters::new(EXPRESSION_PARAMETERS),
    }
}

const fn distance_mode(name: &'static str, description: &'static str) -> SearchMode {
    SearchMode {
        name,
        description,
        family: ModeFamily::Distance,
        parameters: SearchParameters::new(DISTANCE_PARAMETERS),
    }
}

/// Searches relating a text expression to dictionary fields.
pub struct ExpressionSearchModes;

impl ExpressionSearchModes {
    pub const EXACT: SearchMode =
        expression_mode("exact", "Field equals the expression", ExpressionMatch::Equals);
    pub const PREFIX: SearchMode = expression_mode(
        "prefix",
        "Field starts with the expression",
        ExpressionMatch::StartsWith,
    );
    pub const SUFFIX: SearchMode =
        expression_mode("suffix", "Field ends with the expression", ExpressionMatch::EndsWith);
    pub const ANY: SearchMode =
        expression_mode("any", "Field contains the expression", ExpressionMatch::Contains);

    pub const ALL: [SearchMode; 4] = [Self::EXACT, Self::PREFIX, Self::SUFFIX, Self::ANY];
}

/// Searches by edit distance. Vocabulary only, nothing implements these yet.
pub struct DistanceSearchModes;

impl DistanceSearchModes {
    pub const NEAR: SearchMode = distance_mode("near", "Entries near the expression");
    pub const RADIUS: SearchMode = distance_mode("radius", "Entries within a distance radius");
}

/// Looks up an expression mode by its name, ignoring case.
pub fn expression_mode_by_name(name: &str) -> Option<SearchMode> {
    ExpressionSearchModes::ALL
        .into_iter()
        .find(|mode| mode.name().eq_ignore_ascii_case(name))
}

/// Dictionary entry fields a search can be run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryEntryField {
    Word,
    Reading,
    Translation,
}

impl DictionaryEntryField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "word" => Some(DictionaryEntryField::Word),
            "reading" => Some(DictionaryEntryField::Reading),
            "translation" => Some(DictionaryEntryField::Translation),
            _ => None,
        }
    }
}

/// Whether an expression must match a whole field or any single word in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Field,
    Word,
}

/// Selection of the entry fields participating in a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SearchFieldSelection {
    word: bool,
    reading: bool,
    translation: bool,
    match_field: bool,
    match_word: bool,
}

impl SearchFieldSelection {
    pub fn new(
        word: bool,
        reading: bool,
        translation: bool,
        match_field: bool,
        match_word: bool,
    ) -> Self {
        Self {
            word,
            reading,
            translation,
            match_field,
            match_word,
        }
    }

    /// All three fields, matched against the whole field.
    pub fn all() -> Self {
        Self::new(true, true, true, true, false)
    }

    /// Builds a field-matching selection from names such as `"word"` or `"reading"`.
    pub fn from_names<'a>(
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, SearchError> {
        let mut selection = Self::default();
        selection.select_match(MatchMode::Field, true);
        for name in names {
            let field = DictionaryEntryField::from_name(name)
                .ok_or_else(|| SearchError::UnknownField(name.to_string()))?;
            selection.select(field, true);
        }
        Ok(selection)
    }

    pub fn select(&mut self, field: DictionaryEntryField, selected: bool) {
        match field {
            DictionaryEntryField::Word => self.word = selected,
            DictionaryEntryField::Reading => self.reading = selected,
            DictionaryEntryField::Translation => self.translation = selected,
        }
    }

    pub fn is_selected(&self, field: DictionaryEntryField) -> bool {
        match field {
            DictionaryEntryField::Word => self.word,
            DictionaryEntryField::Reading => self.reading,
            DictionaryEntryField::Translation => self.translation,
        }
    }

    pub fn select_match(&mut self, mode: MatchMode, selected: bool) {
        match mode {
            MatchMode::Field => self.match_field = selected,
            MatchMode::Word => self.match_word = selected,
        }
    }

    pub fn is_match_selected(&self, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Field => self.match_field,
            MatchMode::Word => self.match_word,
        }
    }

    /// At least one field and exactly one match mode must be selected.
    pub fn is_valid(&self) -> bool {
        (self.word || self.reading || self.translation) && (self.match_field ^ self.match_word)
    }

    pub fn or(mut self, other: &SearchFieldSelection) -> Self {
        self.word |= other.word;
        self.reading |= other.reading;
        self.translation |= other.translation;
        self.match_field |= other.match_field;
        self.match_word |= other.match_word;
        self
    }

    pub fn and(mut self, other: &SearchFieldSelection) -> Self {
        self.word &= other.word;
        self.reading &= other.reading;
        self.translation &= other.translation;
        self.match_field &= other.match_field;
        self.match_word &= other.match_word;
        self
    }
}
