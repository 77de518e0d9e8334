//! Two-level thematic taxonomy: units and their sub-themes
//!
//! Every word belongs to one or more sub-themes; every sub-theme belongs to
//! exactly one unit.

use serde::{Deserialize, Serialize};

use super::word::{Word, WordId};

/// Identifier of a unit
pub type UnitId = i64;

/// Identifier of a sub-theme
pub type SubThemeId = i64;

/// A top-level thematic unit (e.g. "Animals in the Quran")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier for the unit
    pub id: UnitId,
    /// Short code ("A", "B", ...)
    pub code: String,
    /// Display name
    pub name: String,
    /// Color token used for the unit and everything inside it
    pub color: String,
    /// Ordering key
    #[serde(default)]
    pub sort_order: i32,
}

impl Unit {
    /// Create a new unit
    pub fn new(
        id: UnitId,
        code: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            color: color.into(),
            sort_order: 0,
        }
    }

    /// Set the ordering key
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// A sub-theme inside a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTheme {
    /// Unique identifier for the sub-theme
    pub id: SubThemeId,
    /// Unit the sub-theme belongs to
    pub unit_id: UnitId,
    /// Display label
    pub label: String,
    /// Ordering key within the unit
    #[serde(default)]
    pub sort_order: i32,
}

impl SubTheme {
    /// Create a new sub-theme
    pub fn new(id: SubThemeId, unit_id: UnitId, label: impl Into<String>) -> Self {
        Self {
            id,
            unit_id,
            label: label.into(),
            sort_order: 0,
        }
    }

    /// Set the ordering key
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// Membership of a word in a sub-theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordTheme {
    pub word_id: WordId,
    pub sub_theme_id: SubThemeId,
}

impl WordTheme {
    pub fn new(word_id: WordId, sub_theme_id: SubThemeId) -> Self {
        Self {
            word_id,
            sub_theme_id,
        }
    }
}

/// A membership row joined with its word record
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeMember {
    pub sub_theme_id: SubThemeId,
    pub word: Word,
}

/// A word that shares a sub-theme with some focal word
///
/// Produced once per shared sub-theme, so a word sharing two sub-themes
/// appears twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSibling {
    pub word_id: WordId,
    pub sub_theme_id: SubThemeId,
}

/// Two units that share member words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitBridge {
    pub unit_a: UnitId,
    pub unit_b: UnitId,
    /// Number of distinct words belonging to both units
    pub shared_words: usize,
}
