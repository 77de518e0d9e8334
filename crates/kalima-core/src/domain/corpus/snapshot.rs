//! JSON snapshot of the whole corpus
//!
//! A snapshot is the interchange format between the ingestion pipeline, the
//! SQLite importer and the in-memory repository.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::relationship::WordRelationship;
use super::taxonomy::{SubTheme, Unit, WordTheme};
use super::word::Word;

/// Every table of the corpus, as plain records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub sub_themes: Vec<SubTheme>,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default)]
    pub word_themes: Vec<WordTheme>,
    #[serde(default)]
    pub relationships: Vec<WordRelationship>,
}

impl CorpusSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))
    }

    /// Write the snapshot as pretty-printed JSON
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))
    }

    /// Drop duplicate memberships and relationship edges, keeping the first occurrence
    pub fn dedup(&mut self) {
        let mut seen_memberships = std::collections::HashSet::new();
        self.word_themes.retain(|wt| seen_memberships.insert(*wt));

        let mut seen_edges = std::collections::HashSet::new();
        self.relationships.retain(|rel| seen_edges.insert(rel.key()));
    }
}
