//! Corpus service
//!
//! Fetches the rows each view needs through a [`CorpusRepository`] and hands
//! them to the pure graph builders and the recommendation engine. Independent
//! fetches run concurrently.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::domain::corpus::{CorpusRepository, CorpusStats, Word, WordId};
use crate::domain::graph::{
    FocusOptions, GraphData, UnitDetailInput, WordFocusGraph, WordFocusInput, build_overview,
    build_unit_detail, build_word_focus,
};
use crate::domain::recommend::{Recommendation, RecommendationEngine, SignalEvidence, SignalTable};
use crate::error::{Error, Result};

/// Read-side service over the corpus
pub struct CorpusService<R: CorpusRepository> {
    repository: Arc<R>,
    engine: RecommendationEngine,
    focus_options: FocusOptions,
}

impl<R: CorpusRepository> Clone for CorpusService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            engine: self.engine.clone(),
            focus_options: self.focus_options,
        }
    }
}

impl<R: CorpusRepository> CorpusService<R> {
    /// Create a service with default tuning
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            engine: RecommendationEngine::default(),
            focus_options: FocusOptions::default(),
        }
    }

    /// Create a service tuned by the configuration
    pub fn from_config(repository: Arc<R>, config: &Config) -> Self {
        Self::new(repository)
            .with_signal_table(config.recommend.signals.clone())
            .with_focus_options(config.focus_options())
    }

    /// Replace the recommendation weight table
    pub fn with_signal_table(mut self, table: SignalTable) -> Self {
        self.engine = RecommendationEngine::new(table);
        self
    }

    pub fn with_focus_options(mut self, options: FocusOptions) -> Self {
        self.focus_options = options;
        self
    }

    /// Get the underlying repository
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    // ========== Graph Views ==========

    /// One node per unit, with shared-word bridges when requested
    pub async fn overview(&self, with_bridges: bool) -> Result<GraphData> {
        let repo = &self.repository;
        let (units, counts, bridges) = tokio::try_join!(
            repo.list_units(),
            repo.unit_word_counts(),
            async {
                if with_bridges {
                    repo.unit_bridges().await.map(Some)
                } else {
                    Ok(None)
                }
            }
        )?;

        Ok(build_overview(&units, &counts, bridges.as_deref()))
    }

    /// A unit with its sub-themes and member words
    pub async fn unit_detail(&self, code: &str, with_relationships: bool) -> Result<GraphData> {
        let unit = self
            .repository
            .get_unit_by_code(code)
            .await?
            .ok_or_else(|| Error::UnitNotFound(code.trim().to_string()))?;

        let sub_themes = self.repository.list_sub_themes(unit.id).await?;
        let sub_theme_ids: Vec<_> = sub_themes.iter().map(|st| st.id).collect();
        let members = self.repository.theme_members(&sub_theme_ids).await?;

        let relationships = if with_relationships {
            let word_ids: BTreeSet<WordId> = members.iter().map(|m| m.word.id).collect();
            let word_ids: Vec<_> = word_ids.into_iter().collect();
            Some(self.repository.relationships_among(&word_ids).await?)
        } else {
            None
        };

        debug!(
            unit = %unit.code,
            sub_themes = sub_themes.len(),
            members = members.len(),
            "Building unit detail"
        );

        Ok(build_unit_detail(UnitDetailInput {
            unit: &unit,
            sub_themes: &sub_themes,
            members: &members,
            relationships: relationships.as_deref(),
        }))
    }

    /// A word, its related words and its theme mates
    pub async fn word_focus(&self, word_id: WordId) -> Result<WordFocusGraph> {
        let focal = self.require_word(word_id).await?;

        let repo = &self.repository;
        let (relationships, siblings) = tokio::try_join!(
            repo.relationships_for_word(word_id),
            repo.theme_siblings(word_id)
        )?;

        let related_ids: BTreeSet<WordId> = relationships
            .iter()
            .filter_map(|rel| rel.counterpart(word_id))
            .collect();
        let mate_ids: BTreeSet<WordId> = siblings.iter().map(|s| s.word_id).collect();

        let wanted: Vec<WordId> = related_ids.union(&mate_ids).copied().collect();
        let words = repo.get_words(&wanted).await?;

        let (related_words, theme_mates): (Vec<Word>, Vec<Word>) = words
            .into_iter()
            .filter(|w| related_ids.contains(&w.id) || mate_ids.contains(&w.id))
            .partition(|w| related_ids.contains(&w.id));

        Ok(build_word_focus(
            WordFocusInput {
                focal: &focal,
                relationships: &relationships,
                related_words: &related_words,
                theme_mates: &theme_mates,
            },
            &self.focus_options,
        ))
    }

    // ========== Recommendations ==========

    /// Ranked "learn next" list for a word
    pub async fn recommend(&self, word_id: WordId, limit: usize) -> Result<Vec<Recommendation>> {
        let focal = self.require_word(word_id).await?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let evidence = self.gather_evidence(&focal).await?;
        let ranked = self.engine.rank(&focal, &evidence, limit);

        let ids: Vec<WordId> = ranked.iter().map(|c| c.word_id).collect();
        let words = self.repository.get_words(&ids).await?;
        let recommendations = RecommendationEngine::resolve(ranked, &words);

        info!(
            word_id,
            count = recommendations.len(),
            "Recommendations computed"
        );
        Ok(recommendations)
    }

    async fn gather_evidence(&self, focal: &Word) -> Result<SignalEvidence> {
        let repo = &self.repository;
        let tolerance = self.engine.table().difficulty_tolerance;

        let (same_root, relationships, theme_siblings, difficulty_peers) = tokio::try_join!(
            async {
                match focal.root_id {
                    Some(root_id) => repo.words_with_root(root_id).await,
                    None => Ok(Vec::new()),
                }
            },
            repo.relationships_for_word(focal.id),
            repo.theme_siblings(focal.id),
            async {
                match focal.difficulty {
                    Some(d) => {
                        // Same window the engine's predicate accepts, even off the 1-5 scale
                        let low = d.saturating_sub(tolerance);
                        let high = d.saturating_add(tolerance);
                        repo.words_with_difficulty_between(low, high).await
                    }
                    None => Ok(Vec::new()),
                }
            }
        )?;

        Ok(SignalEvidence {
            same_root,
            relationships,
            theme_siblings,
            difficulty_peers,
        })
    }

    // ========== Lookup ==========

    /// Plain-text word search
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Word>> {
        self.repository.search_words(query, limit).await
    }

    /// Get a word or fail with [`Error::WordNotFound`]
    pub async fn require_word(&self, word_id: WordId) -> Result<Word> {
        self.repository
            .get_word(word_id)
            .await?
            .ok_or(Error::WordNotFound(word_id))
    }

    /// Corpus statistics
    pub async fn stats(&self) -> Result<CorpusStats> {
        self.repository.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::corpus::{
        CorpusSnapshot, RelationshipType, SubTheme, Unit, WordRelationship, WordTheme,
    };
    use crate::domain::graph::{LinkKind, NodeId, NodeKind};
    use crate::domain::recommend::Signal;
    use crate::infrastructure::corpus::InMemoryCorpusRepository;

    fn service() -> CorpusService<InMemoryCorpusRepository> {
        let snapshot = CorpusSnapshot {
            units: vec![
                Unit::new(1, "A", "Animals", "#f59e0b"),
                Unit::new(2, "B", "Nature", "#10b981"),
                Unit::new(3, "C", "Empty", "#64748b"),
            ],
            sub_themes: vec![SubTheme::new(10, 1, "Birds"), SubTheme::new(20, 2, "Sky")],
            words: vec![
                Word::new(1, "طَيْر").with_gloss("birds").with_root(7).with_difficulty(2),
                Word::new(2, "هُدْهُد").with_gloss("hoopoe").with_difficulty(3),
                Word::new(3, "طَائِر").with_gloss("bird").with_root(7),
                Word::new(4, "سَمَاء").with_gloss("sky").with_difficulty(5),
            ],
            word_themes: vec![
                WordTheme::new(1, 10),
                WordTheme::new(2, 10),
                WordTheme::new(1, 20),
                WordTheme::new(4, 20),
            ],
            relationships: vec![WordRelationship::new(1, 3, RelationshipType::SameRoot, 0.9)],
        };
        CorpusService::new(Arc::new(InMemoryCorpusRepository::from_snapshot(snapshot)))
    }

    #[tokio::test]
    async fn test_off_scale_difficulty_still_finds_peers() {
        let snapshot = CorpusSnapshot {
            words: vec![
                Word::new(1, "a").with_difficulty(9),
                Word::new(2, "b").with_difficulty(8),
                Word::new(3, "c").with_difficulty(5),
            ],
            ..Default::default()
        };
        let service = CorpusService::new(Arc::new(InMemoryCorpusRepository::from_snapshot(snapshot)));

        let recs = service.recommend(1, 10).await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].word.id, 2);
        assert_eq!(recs[0].reasons, vec![Signal::SimilarDifficulty]);
    }

    #[tokio::test]
    async fn test_overview_with_and_without_bridges() {
        let service = service();

        let plain = service.overview(false).await.unwrap();
        assert_eq!(plain.nodes.len(), 3);
        assert!(plain.links.is_empty());

        let bridged = service.overview(true).await.unwrap();
        let bridges: Vec<_> = bridged.links_of_kind(LinkKind::UnitBridge).collect();
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].count, Some(1));
    }

    #[tokio::test]
    async fn test_unit_detail() {
        let service = service();

        let graph = service.unit_detail("a", true).await.unwrap();
        assert_eq!(graph.nodes_of_kind(NodeKind::SubTheme).count(), 1);
        assert_eq!(graph.nodes_of_kind(NodeKind::Word).count(), 2);

        let empty = service.unit_detail("C", false).await.unwrap();
        assert!(empty.is_empty());

        let err = service.unit_detail("Z", false).await.unwrap_err();
        assert!(matches!(err, Error::UnitNotFound(code) if code == "Z"));
    }

    #[tokio::test]
    async fn test_word_focus() {
        let service = service();

        let focus = service.word_focus(1).await.unwrap();
        assert!(focus.graph.node(NodeId::Word(3)).is_some());
        assert!(focus.graph.node(NodeId::Word(2)).is_some());
        assert!(focus.graph.node(NodeId::Word(4)).is_some());
        assert_eq!(focus.graph.links_of_kind(LinkKind::SharedTheme).count(), 2);
        assert_eq!(focus.hidden_theme_mates, 0);

        assert!(matches!(
            service.word_focus(99).await.unwrap_err(),
            Error::WordNotFound(99)
        ));
    }

    #[tokio::test]
    async fn test_word_focus_respects_cap() {
        let service = service().with_focus_options(FocusOptions {
            theme_mate_cap: 1,
            ..Default::default()
        });

        let focus = service.word_focus(1).await.unwrap();
        assert_eq!(focus.graph.links_of_kind(LinkKind::SharedTheme).count(), 1);
        assert_eq!(focus.hidden_theme_mates, 1);
    }

    #[tokio::test]
    async fn test_recommend() {
        let service = service();

        let recs = service.recommend(1, 10).await.unwrap();
        // Word 3: same root 0.9 + relationship 0.9
        assert_eq!(recs[0].word.id, 3);
        assert!((recs[0].score - 1.8).abs() < 1e-6);
        assert_eq!(recs[0].reasons, [Signal::SameRoot, Signal::Relationship]);
        // Word 2: shared theme 0.7 + similar difficulty 0.5
        assert_eq!(recs[1].word.id, 2);
        assert!((recs[1].score - 1.2).abs() < 1e-6);
        // Word 4: shared theme only, difficulty too far
        assert_eq!(recs[2].word.id, 4);
        assert_eq!(recs[2].reasons, [Signal::SharedTheme]);
        assert!(recs.iter().all(|r| r.word.id != 1));

        assert_eq!(service.recommend(1, 1).await.unwrap().len(), 1);
        assert!(service.recommend(1, 0).await.unwrap().is_empty());
        assert!(matches!(
            service.recommend(42, 0).await.unwrap_err(),
            Error::WordNotFound(42)
        ));
    }

    #[tokio::test]
    async fn test_recommend_with_custom_table() {
        let service = service().with_signal_table(SignalTable {
            shared_theme: 0.0,
            similar_difficulty: 0.0,
            ..Default::default()
        });

        let recs = service.recommend(1, 10).await.unwrap();
        assert_eq!(recs[0].word.id, 3);
        assert_eq!(recs[1].score, 0.0);
    }
}
