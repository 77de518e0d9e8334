//! Repository trait for corpus access
//!
//! This module defines the narrow data-access interface the graph builders and
//! the recommendation engine are fed through. One method per query shape;
//! backends (SQLite, in-memory snapshot) implement it.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

use super::relationship::{RelationshipType, WordRelationship};
use super::taxonomy::{SubTheme, SubThemeId, ThemeMember, ThemeSibling, Unit, UnitBridge, UnitId};
use super::word::{RootId, Word, WordId};

/// Repository trait for the vocabulary corpus
///
/// All operations are read-only.
#[async_trait]
pub trait CorpusRepository: Send + Sync {
    // ========== Taxonomy ==========

    /// List all units
    async fn list_units(&self) -> Result<Vec<Unit>>;

    /// Get a unit by its code
    async fn get_unit_by_code(&self, code: &str) -> Result<Option<Unit>>;

    /// Number of distinct words per unit
    async fn unit_word_counts(&self) -> Result<HashMap<UnitId, usize>>;

    /// Pairs of units sharing member words
    async fn unit_bridges(&self) -> Result<Vec<UnitBridge>>;

    /// List the sub-themes of a unit
    async fn list_sub_themes(&self, unit_id: UnitId) -> Result<Vec<SubTheme>>;

    /// Membership rows (joined with words) for the given sub-themes
    async fn theme_members(&self, sub_theme_ids: &[SubThemeId]) -> Result<Vec<ThemeMember>>;

    // ========== Words ==========

    /// Get a word by ID
    async fn get_word(&self, id: WordId) -> Result<Option<Word>>;

    /// Get several words in one lookup; unknown ids are skipped
    async fn get_words(&self, ids: &[WordId]) -> Result<Vec<Word>>;

    /// Words sharing the given root
    async fn words_with_root(&self, root_id: RootId) -> Result<Vec<Word>>;

    /// Words whose difficulty lies in `[low, high]`
    async fn words_with_difficulty_between(&self, low: u8, high: u8) -> Result<Vec<Word>>;

    /// Other words sharing a sub-theme with the given word, one row per shared sub-theme
    async fn theme_siblings(&self, word_id: WordId) -> Result<Vec<ThemeSibling>>;

    /// Plain-text search over Arabic form, transliteration and gloss
    async fn search_words(&self, query: &str, limit: usize) -> Result<Vec<Word>>;

    // ========== Relationships ==========

    /// All relationship edges touching a word
    async fn relationships_for_word(&self, word_id: WordId) -> Result<Vec<WordRelationship>>;

    /// Relationship edges whose both endpoints are in the given set
    async fn relationships_among(&self, word_ids: &[WordId]) -> Result<Vec<WordRelationship>>;

    // ========== Statistics ==========

    /// Get corpus statistics
    async fn stats(&self) -> Result<CorpusStats>;
}

/// Statistics about the corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusStats {
    pub units: u64,
    pub sub_themes: u64,
    pub words: u64,
    pub word_themes: u64,
    pub relationships: u64,
    /// Relationships by type
    pub relationships_by_type: Vec<(RelationshipType, u64)>,
    /// Words that have a root assigned
    pub words_with_root: u64,
    /// Words that have a difficulty assigned
    pub words_with_difficulty: u64,
}
