//! Difficulty scoring
//!
//! Weighted surface features of the Arabic form, mapped onto a 1-5 scale.

use serde::Serialize;

use super::arabic::{has_hamza, has_shaddah, is_multi_word, letter_count};

const CHAR_COUNT_WEIGHT: f32 = 0.2;
const SHADDAH_WEIGHT: f32 = 0.15;
const HAMZA_WEIGHT: f32 = 0.1;
const MULTI_WORD_WEIGHT: f32 = 0.2;
const ADVANCED_WEIGHT: f32 = 0.2;
const PART_2_WEIGHT: f32 = 0.15;

/// Lowest difficulty
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest difficulty
pub const MAX_DIFFICULTY: u8 = 5;

/// What the scorer looks at
#[derive(Debug, Clone, Default)]
pub struct DifficultyInput<'a> {
    pub arabic: &'a str,
    /// Listed in the advanced section of the source list
    pub is_advanced: bool,
    /// Listed in the second part of a unit
    pub part_2: bool,
}

/// Per-factor values in [0, 1], before weighting
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DifficultyFactors {
    pub char_count: f32,
    pub has_shaddah: f32,
    pub has_hamza: f32,
    pub multi_word: f32,
    pub is_advanced: f32,
    pub part_2: f32,
}

impl DifficultyFactors {
    /// Weighted sum of the factors, in [0, 1]
    pub fn raw_score(&self) -> f32 {
        self.char_count * CHAR_COUNT_WEIGHT
            + self.has_shaddah * SHADDAH_WEIGHT
            + self.has_hamza * HAMZA_WEIGHT
            + self.multi_word * MULTI_WORD_WEIGHT
            + self.is_advanced * ADVANCED_WEIGHT
            + self.part_2 * PART_2_WEIGHT
    }
}

/// Difficulty with the factors that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultyAssessment {
    pub score: u8,
    pub factors: DifficultyFactors,
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// Score a word's difficulty
pub fn difficulty_score(input: &DifficultyInput<'_>) -> DifficultyAssessment {
    let char_count = match letter_count(input.arabic) {
        0..=3 => 0.0,
        4..=5 => 0.3,
        6..=8 => 0.6,
        _ => 1.0,
    };

    let factors = DifficultyFactors {
        char_count,
        has_shaddah: flag(has_shaddah(input.arabic)),
        has_hamza: flag(has_hamza(input.arabic)),
        multi_word: flag(is_multi_word(input.arabic)),
        is_advanced: flag(input.is_advanced),
        part_2: flag(input.part_2),
    };

    let scaled = (factors.raw_score() * 5.0).round() as i32 + 1;
    let score = scaled.clamp(MIN_DIFFICULTY as i32, MAX_DIFFICULTY as i32) as u8;

    DifficultyAssessment { score, factors }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(arabic: &str) -> u8 {
        difficulty_score(&DifficultyInput {
            arabic,
            ..Default::default()
        })
        .score
    }

    #[test]
    fn test_short_plain_word_is_easiest() {
        // 3 letters, no marks
        assert_eq!(score("نُور"), 1);
    }

    #[test]
    fn test_factors_raise_difficulty() {
        let plain = score("كِتَاب");
        let marked = difficulty_score(&DifficultyInput {
            arabic: "يَوْم الدِّين",
            is_advanced: true,
            part_2: true,
        });
        assert!(marked.score > plain);
        assert_eq!(marked.factors.multi_word, 1.0);
        assert_eq!(marked.factors.has_shaddah, 1.0);
        assert_eq!(marked.factors.char_count, 0.6);
    }

    #[test]
    fn test_score_is_clamped() {
        let everything = difficulty_score(&DifficultyInput {
            arabic: "أَسْمَاء اللّٰه الحُسْنَى",
            is_advanced: true,
            part_2: true,
        });
        assert_eq!(everything.score, MAX_DIFFICULTY);
        assert!(score("") >= MIN_DIFFICULTY);
    }
}
