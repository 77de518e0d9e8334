//! Corpus enrichment
//!
//! Pure helpers that compute what the ingestion pipeline attaches to the
//! corpus: bare Arabic forms, difficulty scores and seeded relationship edges.
//! [`enrich_snapshot`] applies them to a whole [`CorpusSnapshot`].

mod arabic;
mod difficulty;
mod seeding;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::corpus::{CorpusSnapshot, RelationshipType, SubThemeId, WordId};

pub use arabic::{has_hamza, has_shaddah, is_diacritic, is_multi_word, letter_count, strip_diacritics};
pub use difficulty::{
    DifficultyAssessment, DifficultyFactors, DifficultyInput, MAX_DIFFICULTY, MIN_DIFFICULTY,
    difficulty_score,
};
pub use seeding::{
    PAIR_WEIGHT, SAME_ROOT_WEIGHT, SEMANTIC_SIMILARITY_THRESHOLD, cosine_similarity,
    WordEmbedding, pair_consecutive, same_root_edges, semantic_similar_edges,
};

/// Which units hold paired words
#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    /// Units whose sub-themes list opposites two by two
    pub opposite_unit_codes: Vec<String>,
    /// Units whose sub-themes list virtue pairs two by two
    pub virtue_unit_codes: Vec<String>,
    /// Recompute difficulty even where one is already set
    pub overwrite_difficulty: bool,
    /// Word embeddings to derive semantic-similar edges from
    pub embeddings: Vec<WordEmbedding>,
    /// Cosine similarity an embedding pair must exceed
    pub similarity_threshold: f32,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            opposite_unit_codes: vec!["J".to_string()],
            virtue_unit_codes: vec!["L".to_string()],
            overwrite_difficulty: false,
            embeddings: Vec::new(),
            similarity_threshold: SEMANTIC_SIMILARITY_THRESHOLD,
        }
    }
}

/// What an enrichment pass changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentReport {
    pub difficulties_set: usize,
    pub relationships_added: usize,
    pub relationships_by_type: Vec<(RelationshipType, usize)>,
}

/// Fill in difficulties and seed relationship edges
///
/// Existing edges are kept; seeded edges already present (same pair and
/// type) are not added again.
pub fn enrich_snapshot(snapshot: &mut CorpusSnapshot, options: &EnrichmentOptions) -> EnrichmentReport {
    let mut report = EnrichmentReport::default();

    for word in &mut snapshot.words {
        if word.difficulty.is_some() && !options.overwrite_difficulty {
            continue;
        }
        let assessment = difficulty_score(&DifficultyInput {
            arabic: &word.arabic,
            is_advanced: word.is_advanced,
            part_2: word.part_2,
        });
        word.difficulty = Some(assessment.score);
        report.difficulties_set += 1;
    }

    let mut seeded = Vec::new();
    for (codes, relationship_type) in [
        (&options.opposite_unit_codes, RelationshipType::Opposite),
        (&options.virtue_unit_codes, RelationshipType::VirtuePair),
    ] {
        for members in paired_theme_members(snapshot, codes) {
            seeded.extend(pair_consecutive(&members, relationship_type, PAIR_WEIGHT));
        }
    }
    seeded.extend(same_root_edges(&snapshot.words));

    if !options.embeddings.is_empty() {
        let known: HashSet<WordId> = snapshot.words.iter().map(|w| w.id).collect();
        let embeddings: Vec<WordEmbedding> = options
            .embeddings
            .iter()
            .filter(|e| known.contains(&e.word_id))
            .cloned()
            .collect();
        debug!(
            supplied = options.embeddings.len(),
            used = embeddings.len(),
            "Seeding semantic-similar edges"
        );
        seeded.extend(semantic_similar_edges(&embeddings, options.similarity_threshold));
    }

    let mut existing: HashSet<_> = snapshot.relationships.iter().map(|r| r.key()).collect();
    let mut added: HashMap<RelationshipType, usize> = HashMap::new();
    for rel in seeded {
        if existing.insert(rel.key()) {
            *added.entry(rel.relationship_type).or_default() += 1;
            snapshot.relationships.push(rel);
        }
    }

    report.relationships_added = added.values().sum();
    report.relationships_by_type = RelationshipType::all()
        .iter()
        .filter_map(|t| added.get(t).map(|count| (*t, *count)))
        .collect();

    info!(
        difficulties_set = report.difficulties_set,
        relationships_added = report.relationships_added,
        "Corpus enriched"
    );

    report
}

/// Load word embeddings from a JSON array of `{word_id, embedding}` records
pub fn load_embeddings(path: &Path) -> anyhow::Result<Vec<WordEmbedding>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read embeddings: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse embeddings: {}", path.display()))
}

/// Member word ids of every sub-theme in the given units, in membership order
fn paired_theme_members(snapshot: &CorpusSnapshot, unit_codes: &[String]) -> Vec<Vec<WordId>> {
    let unit_ids: HashSet<_> = snapshot
        .units
        .iter()
        .filter(|u| unit_codes.iter().any(|code| code == &u.code))
        .map(|u| u.id)
        .collect();

    let mut themes: Vec<_> = snapshot
        .sub_themes
        .iter()
        .filter(|st| unit_ids.contains(&st.unit_id))
        .collect();
    themes.sort_by_key(|st| (st.unit_id, st.sort_order, st.id));

    let mut members: HashMap<SubThemeId, Vec<WordId>> = HashMap::new();
    for wt in &snapshot.word_themes {
        members.entry(wt.sub_theme_id).or_default().push(wt.word_id);
    }

    themes
        .into_iter()
        .filter_map(|st| members.remove(&st.id))
        .collect()
}
