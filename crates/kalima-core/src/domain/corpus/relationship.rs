//! Typed relationships between words
//!
//! Relationships are undirected in effect: the pair is stored normalized so
//! that `word_id_1 < word_id_2`. The same pair may carry several edges of
//! different types, each contributing independently.

use serde::{Deserialize, Serialize};

use super::word::WordId;

/// A weighted, typed edge between two words
///
/// Deserialized records go through [`WordRelationship::new`], so a pair
/// written in either order reads back normalized with a clamped weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RelationshipRecord")]
pub struct WordRelationship {
    /// Lower word id of the pair
    pub word_id_1: WordId,
    /// Higher word id of the pair
    pub word_id_2: WordId,
    /// Type of relationship
    pub relationship_type: RelationshipType,
    /// Strength of the evidence, in (0.0, 1.0]
    pub weight: f32,
}

impl WordRelationship {
    /// Create a new relationship, normalizing the pair order
    pub fn new(a: WordId, b: WordId, relationship_type: RelationshipType, weight: f32) -> Self {
        let (word_id_1, word_id_2) = if a <= b { (a, b) } else { (b, a) };
        Self {
            word_id_1,
            word_id_2,
            relationship_type,
            weight: clamp_weight(weight),
        }
    }

    /// Check whether the edge touches the given word
    pub fn involves(&self, word_id: WordId) -> bool {
        self.word_id_1 == word_id || self.word_id_2 == word_id
    }

    /// The other endpoint, if the edge touches `word_id` and is not a self-loop
    pub fn counterpart(&self, word_id: WordId) -> Option<WordId> {
        if self.word_id_1 == self.word_id_2 {
            None
        } else if self.word_id_1 == word_id {
            Some(self.word_id_2)
        } else if self.word_id_2 == word_id {
            Some(self.word_id_1)
        } else {
            None
        }
    }

    /// Key identifying the edge: (pair, type)
    pub fn key(&self) -> (WordId, WordId, RelationshipType) {
        (self.word_id_1, self.word_id_2, self.relationship_type)
    }
}

/// A relationship as written by the ingestion pipeline, pair in any order
#[derive(Debug, Deserialize)]
struct RelationshipRecord {
    word_id_1: WordId,
    word_id_2: WordId,
    relationship_type: RelationshipType,
    weight: f32,
}

impl From<RelationshipRecord> for WordRelationship {
    fn from(record: RelationshipRecord) -> Self {
        Self::new(
            record.word_id_1,
            record.word_id_2,
            record.relationship_type,
            record.weight,
        )
    }
}

/// Clamp a weight into (0, 1]; non-finite or non-positive weights become the smallest positive weight
fn clamp_weight(weight: f32) -> f32 {
    if weight.is_finite() && weight > 0.0 {
        weight.min(1.0)
    } else {
        f32::EPSILON
    }
}

/// Types of relationships between words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Both words derive from the same root
    SameRoot,
    /// Words with opposite meaning
    Opposite,
    /// A virtue and its counterpart
    VirtuePair,
    /// Close in embedding space
    SemanticSimilar,
    /// Morphological variant of the same word
    MorphologicalVariant,
}

impl RelationshipType {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SameRoot => "same_root",
            Self::Opposite => "opposite",
            Self::VirtuePair => "virtue_pair",
            Self::SemanticSimilar => "semantic_similar",
            Self::MorphologicalVariant => "morphological_variant",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "same_root" | "same_ancestry" => Some(Self::SameRoot),
            "opposite" => Some(Self::Opposite),
            "virtue_pair" => Some(Self::VirtuePair),
            "semantic_similar" => Some(Self::SemanticSimilar),
            "morphological_variant" => Some(Self::MorphologicalVariant),
            _ => None,
        }
    }

    /// Get all relationship types
    pub fn all() -> &'static [RelationshipType] {
        &[
            Self::SameRoot,
            Self::Opposite,
            Self::VirtuePair,
            Self::SemanticSimilar,
            Self::MorphologicalVariant,
        ]
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_normalized() {
        let rel = WordRelationship::new(9, 3, RelationshipType::Opposite, 0.8);
        assert_eq!(rel.word_id_1, 3);
        assert_eq!(rel.word_id_2, 9);
    }

    #[test]
    fn test_counterpart() {
        let rel = WordRelationship::new(1, 2, RelationshipType::SameRoot, 0.9);
        assert_eq!(rel.counterpart(1), Some(2));
        assert_eq!(rel.counterpart(2), Some(1));
        assert_eq!(rel.counterpart(3), None);

        let self_loop = WordRelationship::new(4, 4, RelationshipType::SameRoot, 0.9);
        assert!(self_loop.involves(4));
        assert_eq!(self_loop.counterpart(4), None);
    }

    #[test]
    fn test_weight_clamped() {
        assert_eq!(
            WordRelationship::new(1, 2, RelationshipType::Opposite, 1.7).weight,
            1.0
        );
        let low = WordRelationship::new(1, 2, RelationshipType::Opposite, -0.5).weight;
        assert!(low > 0.0 && low < 0.001);
    }

    #[test]
    fn test_relationship_type_roundtrip() {
        for t in RelationshipType::all() {
            assert_eq!(RelationshipType::parse(t.as_str()), Some(*t));
        }
        assert_eq!(
            RelationshipType::parse("same-ancestry"),
            Some(RelationshipType::SameRoot)
        );
        assert_eq!(
            RelationshipType::parse("Semantic-Similar"),
            Some(RelationshipType::SemanticSimilar)
        );
        assert_eq!(RelationshipType::parse("cousin"), None);
    }

    #[test]
    fn test_deserialize_normalizes_pair_and_weight() {
        let rel: WordRelationship = serde_json::from_str(
            r#"{"word_id_1": 9, "word_id_2": 3, "relationship_type": "opposite", "weight": 1.5}"#,
        )
        .unwrap();
        assert_eq!((rel.word_id_1, rel.word_id_2), (3, 9));
        assert_eq!(rel.weight, 1.0);
        assert_eq!(rel.key(), WordRelationship::new(3, 9, RelationshipType::Opposite, 0.8).key());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&RelationshipType::VirtuePair).unwrap();
        assert_eq!(json, "\"virtue_pair\"");
    }
}
