//! Relationship seeding
//!
//! Derives relationship edges from corpus structure (paired sub-theme
//! members, shared roots) and from word embeddings. Every function returns
//! normalized, de-duplicated edges and never pairs a word with itself.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::domain::corpus::{RelationshipType, RootId, Word, WordId, WordRelationship};

/// Weight of seeded opposite and virtue-pair edges
pub const PAIR_WEIGHT: f32 = 0.8;
/// Weight of same-root edges
pub const SAME_ROOT_WEIGHT: f32 = 0.9;
/// Minimum cosine similarity for a semantic-similar edge
pub const SEMANTIC_SIMILARITY_THRESHOLD: f32 = 0.8;

/// Embedding vector of one word, as exported by the embedding job
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WordEmbedding {
    pub word_id: WordId,
    pub embedding: Vec<f32>,
}

impl WordEmbedding {
    pub fn new(word_id: WordId, embedding: Vec<f32>) -> Self {
        Self { word_id, embedding }
    }
}

/// Pair members as (0,1), (2,3), ...; a trailing odd member stays unpaired
pub fn pair_consecutive(
    word_ids: &[WordId],
    relationship_type: RelationshipType,
    weight: f32,
) -> Vec<WordRelationship> {
    let mut seen = HashSet::new();
    word_ids
        .chunks_exact(2)
        .filter(|pair| pair[0] != pair[1])
        .map(|pair| WordRelationship::new(pair[0], pair[1], relationship_type, weight))
        .filter(|rel| seen.insert(rel.key()))
        .collect()
}

/// One same-root edge for every pair of words sharing a root
pub fn same_root_edges(words: &[Word]) -> Vec<WordRelationship> {
    let mut by_root: BTreeMap<RootId, Vec<WordId>> = BTreeMap::new();
    for word in words {
        if let Some(root_id) = word.root_id {
            by_root.entry(root_id).or_default().push(word.id);
        }
    }

    let mut edges = Vec::new();
    for mut ids in by_root.into_values() {
        ids.sort_unstable();
        ids.dedup();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                edges.push(WordRelationship::new(
                    *a,
                    *b,
                    RelationshipType::SameRoot,
                    SAME_ROOT_WEIGHT,
                ));
            }
        }
    }
    edges
}

/// Semantic-similar edges between embeddings whose cosine similarity exceeds `threshold`
///
/// The edge weight is the similarity rounded to three decimals.
pub fn semantic_similar_edges(embeddings: &[WordEmbedding], threshold: f32) -> Vec<WordRelationship> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for (i, a) in embeddings.iter().enumerate() {
        for b in &embeddings[i + 1..] {
            if a.word_id == b.word_id {
                continue;
            }
            let similarity = cosine_similarity(&a.embedding, &b.embedding);
            if similarity <= threshold {
                continue;
            }
            let rel = WordRelationship::new(
                a.word_id,
                b.word_id,
                RelationshipType::SemanticSimilar,
                (similarity * 1000.0).round() / 1000.0,
            );
            if seen.insert(rel.key()) {
                edges.push(rel);
            }
        }
    }
    edges
}

/// Compute cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_consecutive() {
        let edges = pair_consecutive(&[5, 3, 8, 9, 11], RelationshipType::Opposite, PAIR_WEIGHT);
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].word_id_1, edges[0].word_id_2), (3, 5));
        assert_eq!((edges[1].word_id_1, edges[1].word_id_2), (8, 9));
        assert!(edges.iter().all(|e| e.weight == PAIR_WEIGHT));
    }

    #[test]
    fn test_pair_consecutive_skips_self_and_duplicates() {
        let edges = pair_consecutive(&[1, 1, 2, 3, 3, 2], RelationshipType::VirtuePair, PAIR_WEIGHT);
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn test_same_root_edges() {
        let words = vec![
            Word::new(1, "a").with_root(7),
            Word::new(2, "b").with_root(7),
            Word::new(3, "c").with_root(7),
            Word::new(4, "d").with_root(8),
            Word::new(5, "e"),
        ];
        let edges = same_root_edges(&words);
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| e.relationship_type == RelationshipType::SameRoot));
        assert!(edges.iter().all(|e| e.word_id_1 < e.word_id_2));
    }

    #[test]
    fn test_semantic_similar_edges() {
        let embeddings = vec![
            WordEmbedding::new(1, vec![1.0, 0.0]),
            WordEmbedding::new(2, vec![0.9, 0.1]),
            WordEmbedding::new(3, vec![0.0, 1.0]),
        ];
        let edges = semantic_similar_edges(&embeddings, SEMANTIC_SIMILARITY_THRESHOLD);
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].word_id_1, edges[0].word_id_2), (1, 2));
        assert!((edges[0].weight - 0.994).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
    }
}
