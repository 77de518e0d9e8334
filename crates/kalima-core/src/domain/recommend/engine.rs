//! Multi-signal "learn next" ranking
//!
//! Signals are evaluated in a fixed order. Every firing adds its weight to the
//! candidate's score and appends the signal to its reasons; scores add up
//! across signals rather than taking the maximum. Ties are broken by
//! ascending word id.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::domain::corpus::{ThemeSibling, Word, WordId, WordRelationship};

use super::signals::{Signal, SignalTable};

/// Default number of recommendations returned
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;

/// Candidate pools fetched for one focal word
///
/// Pools may be wider than needed: the engine applies each signal's
/// predicate itself.
#[derive(Debug, Clone, Default)]
pub struct SignalEvidence {
    /// Words that may share the focal word's root
    pub same_root: Vec<Word>,
    /// Relationship edges touching the focal word
    pub relationships: Vec<WordRelationship>,
    /// One row per (word, shared sub-theme)
    pub theme_siblings: Vec<ThemeSibling>,
    /// Words that may have a difficulty close to the focal word's
    pub difficulty_peers: Vec<Word>,
}

/// A candidate with its accumulated score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub word_id: WordId,
    pub score: f32,
    /// Signals in the order they fired
    pub reasons: Vec<Signal>,
}

/// A resolved recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub word: Word,
    pub score: f32,
    pub reasons: Vec<Signal>,
}

/// Ranks candidate words for a focal word
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    table: SignalTable,
}

impl RecommendationEngine {
    /// Create an engine with the given signal table
    pub fn new(table: SignalTable) -> Self {
        Self { table }
    }

    /// Get the signal table
    pub fn table(&self) -> &SignalTable {
        &self.table
    }

    /// Score every candidate, sorted by descending score then ascending id
    pub fn score(&self, focal: &Word, evidence: &SignalEvidence) -> Vec<ScoredCandidate> {
        let mut scores: BTreeMap<WordId, ScoredCandidate> = BTreeMap::new();

        let mut credit = |word_id: WordId, signal: Signal, edge_weight: Option<f32>| {
            if word_id == focal.id {
                return;
            }
            let entry = scores.entry(word_id).or_insert_with(|| ScoredCandidate {
                word_id,
                score: 0.0,
                reasons: Vec::new(),
            });
            entry.score += self.table.contribution(signal, edge_weight);
            entry.reasons.push(signal);
        };

        for signal in Signal::EVALUATION_ORDER {
            match signal {
                Signal::SameRoot => {
                    if let Some(root_id) = focal.root_id {
                        for word in dedup_words(&evidence.same_root) {
                            if word.root_id == Some(root_id) {
                                credit(word.id, signal, None);
                            }
                        }
                    }
                }
                Signal::Relationship => {
                    for rel in &evidence.relationships {
                        if let Some(other) = rel.counterpart(focal.id) {
                            credit(other, signal, Some(rel.weight));
                        }
                    }
                }
                Signal::SharedTheme => {
                    for sibling in &evidence.theme_siblings {
                        credit(sibling.word_id, signal, None);
                    }
                }
                Signal::SimilarDifficulty => {
                    if let Some(difficulty) = focal.difficulty {
                        let tolerance = self.table.difficulty_tolerance;
                        for word in dedup_words(&evidence.difficulty_peers) {
                            if word.difficulty.is_some_and(|d| d.abs_diff(difficulty) <= tolerance) {
                                credit(word.id, signal, None);
                            }
                        }
                    }
                }
            }
        }

        let mut ranked: Vec<ScoredCandidate> = scores.into_values().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.word_id.cmp(&b.word_id)));

        debug!(
            word_id = focal.id,
            candidates = ranked.len(),
            "Recommendation candidates scored"
        );

        ranked
    }

    /// Score and keep the top `limit` candidates
    pub fn rank(&self, focal: &Word, evidence: &SignalEvidence, limit: usize) -> Vec<ScoredCandidate> {
        if limit == 0 {
            return Vec::new();
        }
        let mut ranked = self.score(focal, evidence);
        ranked.truncate(limit);
        ranked
    }

    /// Attach word records to ranked candidates
    ///
    /// Candidates whose record is missing are dropped, not replaced.
    pub fn resolve(ranked: Vec<ScoredCandidate>, words: &[Word]) -> Vec<Recommendation> {
        let by_id: HashMap<WordId, &Word> = words.iter().map(|w| (w.id, w)).collect();

        ranked
            .into_iter()
            .filter_map(|candidate| {
                by_id.get(&candidate.word_id).map(|word| Recommendation {
                    word: (*word).clone(),
                    score: candidate.score,
                    reasons: candidate.reasons,
                })
            })
            .collect()
    }
}

/// Each candidate word counts once per pool
fn dedup_words(words: &[Word]) -> impl Iterator<Item = &Word> {
    let mut seen = std::collections::HashSet::new();
    words.iter().filter(move |w| seen.insert(w.id))
}
