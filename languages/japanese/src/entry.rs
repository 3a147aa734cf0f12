//! Parser for single KANJIDIC lines.
//!
//! ```text
//! 日 467C U65e5 B72 G1 S4 F1 ニチ ジツ ひ -び -か T1 あ {day} {sun}
//! ```
//!
//! The first field is the kanji and the second its JIS code. The remaining
//! fields are typed by their first character; see [`KanjiEntry::parse`].

/// Separator between the stem and the inflecting ending of a reading.
pub const OKURIGANA_SEPARATOR: char = '.';

/// Lines whose first character is below this code point are comments.
const ENTRY_THRESHOLD: u32 = 128;

/// True if `line` holds an entry rather than a comment or blank line
pub fn is_entry_line(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|first| first as u32 >= ENTRY_THRESHOLD)
}

/// One kanji and the subset of KANJIDIC fields that is understood.
///
/// Numeric fields are `None` when the line does not carry them, or when the
/// entry was parsed without extended information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanjiEntry {
    pub kanji: char,
    pub readings: Vec<String>,
    /// Readings only used in names (nanori)
    pub name_readings: Vec<String>,
    /// Name of the radical, if the kanji is a radical with a name that is not a reading
    pub radical_name: Option<String>,
    pub translations: Vec<String>,
    pub stroke_count: Option<u8>,
    /// Radical (bushu) number
    pub radical: Option<u16>,
    /// Classical radical number, only present if it differs from `radical`
    pub classical_radical: Option<u16>,
    /// Frequency-of-use rank
    pub frequency: Option<u16>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ReadingTarget {
    Readings,
    NameReadings,
    RadicalName,
}

impl KanjiEntry {
    /// Parse an entry line. Returns `None` for lines without a head character.
    ///
    /// Field types by first character:
    /// - `{` translation, up to the closing `}`; may contain spaces
    /// - `-` reading of a kanji used as a suffix
    /// - `T1` following kana fields are name readings, `T2` the radical name
    /// - `B`, `C`, `F`, `S` radical, classical radical, frequency and stroke
    ///   count, only read if `extended` is set. Only the first stroke count
    ///   is kept, later ones are common miscounts.
    /// - any other ASCII field is ignored
    /// - non-ASCII fields are readings
    pub fn parse(line: &str, extended: bool) -> Option<Self> {
        let mut chars = line.chars();
        let kanji = chars.next()?;
        let mut entry = KanjiEntry {
            kanji,
            readings: Vec::new(),
            name_readings: Vec::new(),
            radical_name: None,
            translations: Vec::new(),
            stroke_count: None,
            radical: None,
            classical_radical: None,
            frequency: None,
        };

        let mut rest = chars.as_str().trim_start();
        // skip the JIS code
        rest = rest
            .find(' ')
            .map_or("", |space| &rest[space..])
            .trim_start();

        let mut target = ReadingTarget::Readings;
        while !rest.is_empty() {
            if let Some(body) = rest.strip_prefix('{') {
                let end = body.find('}').unwrap_or(body.len());
                entry.translations.push(body[..end].to_string());
                rest = body.get(end + 1..).unwrap_or("");
            } else {
                let end = rest.find(' ').unwrap_or(rest.len());
                let field = &rest[..end];
                rest = &rest[end..];
                entry.apply_field(field, &mut target, extended, line);
            }
            rest = rest.trim_start();
        }

        Some(entry)
    }

    fn apply_field(
        &mut self,
        field: &str,
        target: &mut ReadingTarget,
        extended: bool,
        line: &str,
    ) {
        let Some(first) = field.chars().next() else {
            return;
        };

        if !first.is_ascii() {
            match target {
                ReadingTarget::Readings => self.readings.push(field.to_string()),
                ReadingTarget::NameReadings => self.name_readings.push(field.to_string()),
                ReadingTarget::RadicalName => self.radical_name = Some(field.to_string()),
            }
            return;
        }

        let value = &field[1..];
        match first {
            '-' => self.readings.push(field.to_string()),
            'T' => match value {
                "1" => *target = ReadingTarget::NameReadings,
                "2" => *target = ReadingTarget::RadicalName,
                _ => {}
            },
            'B' if extended => self.radical = parse_number(value, line),
            'C' if extended => self.classical_radical = parse_number(value, line),
            'F' if extended => self.frequency = parse_number(value, line),
            'S' if extended && self.stroke_count.is_none() => {
                self.stroke_count = parse_number(value, line)
            }
            _ => {}
        }
    }

    /// The kanji as a string key
    pub fn head(&self) -> String {
        self.kanji.to_string()
    }

    /// Readings without an okurigana separator
    pub fn plain_readings(&self) -> impl Iterator<Item = &str> {
        self.readings
            .iter()
            .map(String::as_str)
            .filter(|reading| !reading.contains(OKURIGANA_SEPARATOR))
    }

    /// Readings with an okurigana separator, split into stem and ending
    pub fn inflected_readings(&self) -> impl Iterator<Item = InflectedReading> + '_ {
        self.readings
            .iter()
            .filter_map(|reading| InflectedReading::split(reading))
    }
}

/// A reading such as `た.べる`, split at the okurigana separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InflectedReading {
    pub stem: String,
    pub ending: String,
}

impl InflectedReading {
    pub fn split(reading: &str) -> Option<Self> {
        let (stem, ending) = reading.split_once(OKURIGANA_SEPARATOR)?;
        Some(Self {
            stem: stem.to_string(),
            ending: ending.to_string(),
        })
    }

    /// Reading with the separator removed: `たべる`
    pub fn pure_reading(&self) -> String {
        format!("{}{}", self.stem, self.ending)
    }

    /// Kanji followed by the ending: `食べる`
    pub fn surface_form(&self, kanji: char) -> String {
        format!("{}{}", kanji, self.ending)
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, line: &str) -> Option<T> {
    match value.parse() {
        Ok(number) => Some(number),
        Err(_) => {
            tracing::warn!("Malformed dictionary entry {}", line);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NICHI: &str = "日 467C U65e5 B72 G1 S4 S3 F1 N2456 ニチ ジツ ひ -び -か T1 あ あき {day} {sun} {Japan} {counter for days}";

    #[test]
    fn test_comment_lines() {
        assert!(!is_entry_line(""));
        assert!(!is_entry_line("# KANJIDIC JIS X 0208"));
        assert!(!is_entry_line(" 日"));
        assert!(is_entry_line(NICHI));
    }

    #[test]
    fn test_parse_basic_fields() {
        let entry = KanjiEntry::parse(NICHI, false).unwrap();
        assert_eq!(entry.kanji, '日');
        assert_eq!(entry.readings, ["ニチ", "ジツ", "ひ", "-び", "-か"]);
        assert_eq!(entry.name_readings, ["あ", "あき"]);
        assert_eq!(
            entry.translations,
            ["day", "sun", "Japan", "counter for days"]
        );
        assert_eq!(entry.radical_name, None);
        assert_eq!(entry.stroke_count, None);
        assert_eq!(entry.frequency, None);
    }

    #[test]
    fn test_parse_extended_fields() {
        let entry = KanjiEntry::parse(NICHI, true).unwrap();
        assert_eq!(entry.radical, Some(72));
        assert_eq!(entry.stroke_count, Some(4));
        assert_eq!(entry.frequency, Some(1));
        assert_eq!(entry.classical_radical, None);
    }

    #[test]
    fn test_parse_radical_name() {
        let entry = KanjiEntry::parse("一 306C U4e00 B1 S1 イチ ひと- T2 いち {one}", true).unwrap();
        assert_eq!(entry.radical_name.as_deref(), Some("いち"));
        assert_eq!(entry.readings, ["イチ", "ひと-"]);
    }

    #[test]
    fn test_malformed_number_is_not_available() {
        let entry = KanjiEntry::parse("日 467C Bxx S4 ニチ {day}", true).unwrap();
        assert_eq!(entry.radical, None);
        assert_eq!(entry.stroke_count, Some(4));
    }

    #[test]
    fn test_inflected_readings() {
        let entry = KanjiEntry::parse("食 3F29 ショク た.べる く.う {eat}", false).unwrap();
        assert_eq!(entry.plain_readings().collect::<Vec<_>>(), ["ショク"]);

        let inflected: Vec<_> = entry.inflected_readings().collect();
        assert_eq!(inflected.len(), 2);
        assert_eq!(inflected[0].pure_reading(), "たべる");
        assert_eq!(inflected[0].surface_form('食'), "食べる");
        assert_eq!(inflected[1].surface_form('食'), "食う");
    }
}
