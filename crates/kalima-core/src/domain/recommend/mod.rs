//! "What to learn next" recommendations
//!
//! Combines independent evidence signals (shared root, explicit relationship
//! edges, shared sub-theme, similar difficulty) into one ranked list with a
//! reason trail per entry. The weight of each signal comes from an injectable
//! [`SignalTable`].

mod engine;
mod signals;

pub use engine::{
    DEFAULT_RECOMMENDATION_LIMIT, Recommendation, RecommendationEngine, ScoredCandidate,
    SignalEvidence,
};
pub use signals::{EdgeWeighting, Signal, SignalTable};
