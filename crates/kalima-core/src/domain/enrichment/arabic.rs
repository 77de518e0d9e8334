//! Arabic script helpers

/// Shaddah (gemination mark)
pub const SHADDAH: char = '\u{0651}';

/// Hamza and its seated forms
const HAMZA_FORMS: [char; 5] = ['ء', 'أ', 'إ', 'ؤ', 'ئ'];

/// Check whether a character is an Arabic diacritic mark
pub fn is_diacritic(c: char) -> bool {
    matches!(c, '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}')
}

/// Remove diacritics and trim, giving the bare form used to match words
pub fn strip_diacritics(text: &str) -> String {
    text.chars()
        .filter(|c| !is_diacritic(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Number of letters, ignoring whitespace and diacritics
pub fn letter_count(text: &str) -> usize {
    text.chars()
        .filter(|c| !c.is_whitespace() && !is_diacritic(*c))
        .count()
}

pub fn has_shaddah(text: &str) -> bool {
    text.contains(SHADDAH)
}

pub fn has_hamza(text: &str) -> bool {
    text.chars().any(|c| HAMZA_FORMS.contains(&c))
}

/// Whether the text is a multi-word phrase
pub fn is_multi_word(text: &str) -> bool {
    text.trim().contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics(" كِتَابٌ "), "كتاب");
        assert_eq!(strip_diacritics("الرَّحْمٰن"), "الرحمن");
        assert_eq!(strip_diacritics(""), "");
    }

    #[test]
    fn test_letter_count() {
        assert_eq!(letter_count("كِتَاب"), 4);
        assert_eq!(letter_count("يَوْم الدِّين"), 8);
    }

    #[test]
    fn test_marks() {
        assert!(has_shaddah("الرَّحْمٰن"));
        assert!(!has_shaddah("كِتَاب"));
        assert!(has_hamza("سَمَاء"));
        assert!(has_hamza("أَرْض"));
        assert!(!has_hamza("نُور"));
        assert!(is_multi_word("يَوْم الدِّين"));
        assert!(!is_multi_word(" نُور "));
    }
}
