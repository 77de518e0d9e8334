//! In-memory implementation of the CorpusRepository, backed by a snapshot

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;

use crate::domain::corpus::{
    CorpusRepository, CorpusSnapshot, CorpusStats, RelationshipType, RootId, SubTheme, SubThemeId,
    ThemeMember, ThemeSibling, Unit, UnitBridge, UnitId, Word, WordId, WordRelationship,
};
use crate::error::Result;

/// Read-only repository over a loaded [`CorpusSnapshot`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpusRepository {
    units: Vec<Unit>,
    sub_themes: Vec<SubTheme>,
    words: BTreeMap<WordId, Word>,
    word_themes: Vec<(WordId, SubThemeId)>,
    relationships: Vec<WordRelationship>,
}

impl InMemoryCorpusRepository {
    /// Build the repository, dropping duplicate rows and self-referencing edges
    pub fn from_snapshot(mut snapshot: CorpusSnapshot) -> Self {
        snapshot.dedup();

        let mut units = snapshot.units;
        units.sort_by_key(|u| (u.sort_order, u.id));
        units.dedup_by_key(|u| u.id);

        let mut sub_themes = snapshot.sub_themes;
        sub_themes.sort_by_key(|st| (st.unit_id, st.sort_order, st.id));

        let relationships: Vec<_> = snapshot
            .relationships
            .into_iter()
            .filter(|rel| rel.word_id_1 != rel.word_id_2)
            .collect();

        tracing::debug!(
            units = units.len(),
            words = snapshot.words.len(),
            relationships = relationships.len(),
            "Loaded in-memory corpus"
        );

        Self {
            units,
            sub_themes,
            words: snapshot.words.into_iter().map(|w| (w.id, w)).collect(),
            word_themes: snapshot
                .word_themes
                .into_iter()
                .map(|wt| (wt.word_id, wt.sub_theme_id))
                .collect(),
            relationships,
        }
    }

    /// Load a snapshot file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::from_snapshot(CorpusSnapshot::load(path)?))
    }

    fn unit_of(&self, sub_theme_id: SubThemeId) -> Option<UnitId> {
        self.sub_themes
            .iter()
            .find(|st| st.id == sub_theme_id)
            .map(|st| st.unit_id)
    }

    /// Distinct (unit, word) pairs
    fn unit_words(&self) -> BTreeSet<(UnitId, WordId)> {
        let unit_by_theme: HashMap<_, _> = self.sub_themes.iter().map(|st| (st.id, st.unit_id)).collect();
        self.word_themes
            .iter()
            .filter_map(|(word_id, sub_theme_id)| {
                unit_by_theme.get(sub_theme_id).map(|unit_id| (*unit_id, *word_id))
            })
            .collect()
    }

    fn collect_words(&self, predicate: impl Fn(&Word) -> bool) -> Vec<Word> {
        self.words.values().filter(|w| predicate(w)).cloned().collect()
    }
}

#[async_trait]
impl CorpusRepository for InMemoryCorpusRepository {
    async fn list_units(&self) -> Result<Vec<Unit>> {
        Ok(self.units.clone())
    }

    async fn get_unit_by_code(&self, code: &str) -> Result<Option<Unit>> {
        let code = code.trim();
        Ok(self
            .units
            .iter()
            .find(|u| u.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn unit_word_counts(&self) -> Result<HashMap<UnitId, usize>> {
        let mut counts = HashMap::new();
        for (unit_id, _) in self.unit_words() {
            *counts.entry(unit_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn unit_bridges(&self) -> Result<Vec<UnitBridge>> {
        let mut units_by_word: BTreeMap<WordId, Vec<UnitId>> = BTreeMap::new();
        for (unit_id, word_id) in self.unit_words() {
            units_by_word.entry(word_id).or_default().push(unit_id);
        }

        let mut shared: BTreeMap<(UnitId, UnitId), usize> = BTreeMap::new();
        for units in units_by_word.values() {
            for (i, a) in units.iter().enumerate() {
                for b in &units[i + 1..] {
                    *shared.entry((*a.min(b), *a.max(b))).or_insert(0) += 1;
                }
            }
        }

        Ok(shared
            .into_iter()
            .map(|((unit_a, unit_b), shared_words)| UnitBridge {
                unit_a,
                unit_b,
                shared_words,
            })
            .collect())
    }

    async fn list_sub_themes(&self, unit_id: UnitId) -> Result<Vec<SubTheme>> {
        Ok(self
            .sub_themes
            .iter()
            .filter(|st| st.unit_id == unit_id)
            .cloned()
            .collect())
    }

    async fn theme_members(&self, sub_theme_ids: &[SubThemeId]) -> Result<Vec<ThemeMember>> {
        let mut ids = sub_theme_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut members = Vec::new();
        for sub_theme_id in ids {
            for (word_id, _) in self.word_themes.iter().filter(|(_, st)| *st == sub_theme_id) {
                if let Some(word) = self.words.get(word_id) {
                    members.push(ThemeMember {
                        sub_theme_id,
                        word: word.clone(),
                    });
                }
            }
        }
        Ok(members)
    }

    async fn get_word(&self, id: WordId) -> Result<Option<Word>> {
        Ok(self.words.get(&id).cloned())
    }

    async fn get_words(&self, ids: &[WordId]) -> Result<Vec<Word>> {
        let wanted: BTreeSet<_> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| self.words.get(&id).cloned())
            .collect())
    }

    async fn words_with_root(&self, root_id: RootId) -> Result<Vec<Word>> {
        Ok(self.collect_words(|w| w.root_id == Some(root_id)))
    }

    async fn words_with_difficulty_between(&self, low: u8, high: u8) -> Result<Vec<Word>> {
        Ok(self.collect_words(|w| w.difficulty.is_some_and(|d| (low..=high).contains(&d))))
    }

    async fn theme_siblings(&self, word_id: WordId) -> Result<Vec<ThemeSibling>> {
        let mut mine: Vec<SubThemeId> = self
            .word_themes
            .iter()
            .filter(|(w, _)| *w == word_id)
            .map(|(_, st)| *st)
            .collect();
        mine.sort_unstable();

        let mut siblings = Vec::new();
        for sub_theme_id in mine {
            for (other, _) in self
                .word_themes
                .iter()
                .filter(|(w, st)| *st == sub_theme_id && *w != word_id)
            {
                siblings.push(ThemeSibling {
                    word_id: *other,
                    sub_theme_id,
                });
            }
        }
        Ok(siblings)
    }

    async fn search_words(&self, query: &str, limit: usize) -> Result<Vec<Word>> {
        Ok(self
            .words
            .values()
            .filter(|w| w.matches_query(query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn relationships_for_word(&self, word_id: WordId) -> Result<Vec<WordRelationship>> {
        let mut rels: Vec<_> = self
            .relationships
            .iter()
            .filter(|rel| rel.involves(word_id))
            .cloned()
            .collect();
        rels.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        Ok(rels)
    }

    async fn relationships_among(&self, word_ids: &[WordId]) -> Result<Vec<WordRelationship>> {
        let ids: BTreeSet<_> = word_ids.iter().copied().collect();
        Ok(self
            .relationships
            .iter()
            .filter(|rel| ids.contains(&rel.word_id_1) && ids.contains(&rel.word_id_2))
            .cloned()
            .collect())
    }

    async fn stats(&self) -> Result<CorpusStats> {
        let mut by_type: BTreeMap<RelationshipType, u64> = BTreeMap::new();
        for rel in &self.relationships {
            *by_type.entry(rel.relationship_type).or_insert(0) += 1;
        }

        Ok(CorpusStats {
            units: self.units.len() as u64,
            sub_themes: self.sub_themes.len() as u64,
            words: self.words.len() as u64,
            word_themes: self
                .word_themes
                .iter()
                .filter(|(_, st)| self.unit_of(*st).is_some())
                .count() as u64,
            relationships: self.relationships.len() as u64,
            relationships_by_type: by_type.into_iter().collect(),
            words_with_root: self.words.values().filter(|w| w.root_id.is_some()).count() as u64,
            words_with_difficulty: self.words.values().filter(|w| w.difficulty.is_some()).count()
                as u64,
        })
    }
}
