//! Kana and case folding used for search comparisons.

const KATAKANA_TO_HIRAGANA: u32 = 0x60;

/// Katakana with a hiragana counterpart. The middle dot and the prolonged
/// sound mark are left alone.
fn has_hiragana_counterpart(c: char) -> bool {
    matches!(c, '\u{30A1}'..='\u{30F6}' | '\u{30FD}' | '\u{30FE}')
}

pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..'\u{3100}').contains(&c)
}

pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..'\u{30A0}').contains(&c)
}

pub fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c)
}

/// Convert every katakana character to hiragana.
pub fn to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| {
            if has_hiragana_counterpart(c) {
                char::from_u32(c as u32 - KATAKANA_TO_HIRAGANA).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Lowercase and fold katakana to hiragana.
pub fn fold(text: &str) -> String {
    to_hiragana(&text.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hiragana() {
        assert_eq!(to_hiragana("ニチ"), "にち");
        assert_eq!(to_hiragana("ヴァイオリン"), "ゔぁいおりん");
        assert_eq!(to_hiragana("たべる"), "たべる");
    }

    #[test]
    fn test_special_characters_are_kept() {
        assert_eq!(to_hiragana("コーヒー"), "こーひー");
        assert_eq!(to_hiragana("ア・イ"), "あ・い");
    }

    #[test]
    fn test_fold_lowercases() {
        assert_eq!(fold("Day"), "day");
        assert_eq!(fold("DAY ニチ"), "day にち");
    }

    #[test]
    fn test_kana_classes() {
        assert!(is_hiragana('ひ'));
        assert!(is_katakana('ヒ'));
        assert!(is_kana('ー'));
        assert!(!is_kana('日'));
    }
}
