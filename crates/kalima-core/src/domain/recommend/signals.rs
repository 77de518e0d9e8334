//! Recommendation signals and their weight table

use serde::{Deserialize, Serialize};

/// One independent source of recommendation evidence
///
/// Reason names on the wire are the learner-facing ones: `same-ancestry`,
/// `relationship`, `shared-grouping` and `comparable-difficulty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Signal {
    /// Candidate shares the focal word's root
    #[serde(rename = "same-ancestry", alias = "same_root")]
    SameRoot,
    /// Any relationship edge to the focal word (semantic-similar included)
    #[serde(rename = "relationship")]
    Relationship,
    /// Candidate shares a sub-theme with the focal word
    #[serde(rename = "shared-grouping", alias = "shared_theme")]
    SharedTheme,
    /// Candidate's difficulty is close to the focal word's
    #[serde(rename = "comparable-difficulty", alias = "similar_difficulty")]
    SimilarDifficulty,
}

impl Signal {
    /// Order in which signals are evaluated
    pub const EVALUATION_ORDER: [Signal; 4] = [
        Signal::SameRoot,
        Signal::Relationship,
        Signal::SharedTheme,
        Signal::SimilarDifficulty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SameRoot => "same-ancestry",
            Self::Relationship => "relationship",
            Self::SharedTheme => "shared-grouping",
            Self::SimilarDifficulty => "comparable-difficulty",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "same_root" | "same_ancestry" => Some(Self::SameRoot),
            "relationship" => Some(Self::Relationship),
            "shared_theme" | "shared_grouping" => Some(Self::SharedTheme),
            "similar_difficulty" | "comparable_difficulty" => Some(Self::SimilarDifficulty),
            _ => None,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a relationship edge contributes to a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "weight", rename_all = "snake_case")]
pub enum EdgeWeighting {
    /// Use the weight stored on the edge
    Stored,
    /// Use a fixed weight for every edge
    Fixed(f32),
}

/// Weight table for the recommendation signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalTable {
    pub same_root: f32,
    pub relationship: EdgeWeighting,
    pub shared_theme: f32,
    pub similar_difficulty: f32,
    /// Maximum difficulty distance still counted as similar
    pub difficulty_tolerance: u8,
}

impl Default for SignalTable {
    fn default() -> Self {
        Self {
            same_root: 0.9,
            relationship: EdgeWeighting::Stored,
            shared_theme: 0.7,
            similar_difficulty: 0.5,
            difficulty_tolerance: 1,
        }
    }
}

impl SignalTable {
    /// Contribution of one firing of `signal`; `edge_weight` is the stored
    /// weight when the signal is a relationship edge
    pub fn contribution(&self, signal: Signal, edge_weight: Option<f32>) -> f32 {
        match signal {
            Signal::SameRoot => self.same_root,
            Signal::Relationship => match self.relationship {
                EdgeWeighting::Stored => edge_weight.unwrap_or(0.0),
                EdgeWeighting::Fixed(weight) => weight,
            },
            Signal::SharedTheme => self.shared_theme,
            Signal::SimilarDifficulty => self.similar_difficulty,
        }
    }

    /// Check every weight is finite and non-negative
    pub fn validate(&self) -> Result<(), String> {
        let mut weights = vec![
            ("same_root", self.same_root),
            ("shared_theme", self.shared_theme),
            ("similar_difficulty", self.similar_difficulty),
        ];
        if let EdgeWeighting::Fixed(weight) = self.relationship {
            weights.push(("relationship", weight));
        }

        match weights.into_iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            Some((name, w)) => Err(format!("Signal weight '{}' must be a non-negative number, got {}", name, w)),
            None => Ok(()),
        }
    }
}
