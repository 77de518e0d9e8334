//! Vocabulary words
//!
//! A word is a single entry of the corpus. Enrichment fields (`root_id`,
//! `difficulty`) stay `None` until the upstream pipeline fills them in.

use serde::{Deserialize, Serialize};

use crate::domain::enrichment::strip_diacritics;

/// Identifier of a word
pub type WordId = i64;

/// Identifier of a morphological root (the ancestry key shared by related words)
pub type RootId = i64;

/// A vocabulary word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Unique identifier for the word
    pub id: WordId,
    /// Arabic form as it appears in the source text
    pub arabic: String,
    /// Latin transliteration
    #[serde(default)]
    pub transliteration: Option<String>,
    /// Short child-friendly gloss
    #[serde(default)]
    pub gloss: Option<String>,
    /// Reference into the source text ("surah:ayah")
    #[serde(default)]
    pub surah_ayah: Option<String>,
    /// Root shared with morphologically related words
    #[serde(default)]
    pub root_id: Option<RootId>,
    /// Difficulty on a 1-5 scale
    #[serde(default)]
    pub difficulty: Option<u8>,
    /// Listed in the advanced section of the source list
    #[serde(default)]
    pub is_advanced: bool,
    /// Listed in the second part of its unit
    #[serde(default)]
    pub part_2: bool,
}

impl Word {
    /// Create a new word with only its Arabic form set
    pub fn new(id: WordId, arabic: impl Into<String>) -> Self {
        Self {
            id,
            arabic: arabic.into(),
            transliteration: None,
            gloss: None,
            surah_ayah: None,
            root_id: None,
            difficulty: None,
            is_advanced: false,
            part_2: false,
        }
    }

    /// Set the transliteration
    pub fn with_transliteration(mut self, transliteration: impl Into<String>) -> Self {
        self.transliteration = Some(transliteration.into());
        self
    }

    /// Set the gloss
    pub fn with_gloss(mut self, gloss: impl Into<String>) -> Self {
        self.gloss = Some(gloss.into());
        self
    }

    /// Set the root
    pub fn with_root(mut self, root_id: RootId) -> Self {
        self.root_id = Some(root_id);
        self
    }

    /// Set the difficulty
    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Label shown next to the node: gloss, then transliteration, then the Arabic form
    pub fn display_label(&self) -> &str {
        self.gloss
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.transliteration
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
            })
            .unwrap_or(&self.arabic)
    }

    /// Arabic form without diacritics
    pub fn bare_arabic(&self) -> String {
        strip_diacritics(&self.arabic)
    }

    /// Check whether the word matches a plain-text query
    ///
    /// Matches case-insensitively against the Arabic form, transliteration and gloss.
    /// The Arabic form also matches on its bare letters, so a query typed with
    /// or without vowel marks finds the same words.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }

        let bare_query = strip_diacritics(&query);
        if !bare_query.is_empty() && self.bare_arabic().contains(&bare_query) {
            return true;
        }

        [
            Some(self.arabic.as_str()),
            self.transliteration.as_deref(),
            self.gloss.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&query))
    }
}
