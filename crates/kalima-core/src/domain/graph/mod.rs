//! Graph views over the corpus
//!
//! Three pure builders turn already-fetched rows into a `{nodes, links}`
//! structure for a force-directed renderer:
//!
//! - **Overview**: one node per unit, optionally bridged by shared words
//! - **Unit detail**: a unit, its sub-themes and their member words
//! - **Word focus**: one word, its related words and its theme mates
//!
//! Builders never query data and never invent nodes: rows pointing outside a
//! view's scope are dropped.

mod overview;
mod types;
mod unit_detail;
mod word_focus;

pub use overview::build_overview;
pub use types::{
    FOCUS_NODE_COLOR, FOCUS_NODE_SIZE, GraphData, GraphLink, GraphNode, LinkKind, MAX_NODE_SIZE,
    MIN_NODE_SIZE, NodeId, NodeKind, SUB_THEME_NODE_SIZE, THEME_MATE_COLOR, WORD_NODE_SIZE,
    unit_node_size,
};
pub use unit_detail::{UnitDetailInput, build_unit_detail};
pub use word_focus::{
    DEFAULT_THEME_MATE_CAP, DEFAULT_THEME_MATE_WEIGHT, FocusOptions, WordFocusGraph,
    WordFocusInput, build_word_focus,
};
