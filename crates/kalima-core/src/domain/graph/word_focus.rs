//! Word focus: one word, its related words and its theme mates

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::domain::corpus::{Word, WordId, WordRelationship};

use super::types::{
    FOCUS_NODE_COLOR, FOCUS_NODE_SIZE, GraphData, GraphLink, GraphNode, LinkKind, NodeId,
    THEME_MATE_COLOR, WORD_NODE_SIZE,
};

/// Default cap on rendered theme mates
pub const DEFAULT_THEME_MATE_CAP: usize = 20;

/// Default weight of a shared-theme link
pub const DEFAULT_THEME_MATE_WEIGHT: f32 = 0.3;

/// Tuning for the word focus view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusOptions {
    /// Maximum number of theme mates rendered as nodes
    pub theme_mate_cap: usize,
    /// Weight of the link between the focal word and a theme mate
    pub theme_mate_weight: f32,
}

impl Default for FocusOptions {
    fn default() -> Self {
        Self {
            theme_mate_cap: DEFAULT_THEME_MATE_CAP,
            theme_mate_weight: DEFAULT_THEME_MATE_WEIGHT,
        }
    }
}

/// Rows already fetched for one focal word
#[derive(Debug, Clone, Copy)]
pub struct WordFocusInput<'a> {
    pub focal: &'a Word,
    /// Relationship edges touching the focal word
    pub relationships: &'a [WordRelationship],
    /// Records of the words at the other end of those edges
    pub related_words: &'a [Word],
    /// Words sharing at least one sub-theme with the focal word
    pub theme_mates: &'a [Word],
}

/// Word focus graph plus the number of theme mates left out by the cap
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordFocusGraph {
    #[serde(flatten)]
    pub graph: GraphData,
    pub hidden_theme_mates: usize,
}

/// Build the word focus graph
///
/// Each related word is rendered once, colored by its strongest edge, with one
/// link per edge. Theme mates that are also related words are rendered as
/// related words only. Theme mates are ordered by id and capped; the rest are
/// counted in `hidden_theme_mates`.
pub fn build_word_focus(input: WordFocusInput<'_>, options: &FocusOptions) -> WordFocusGraph {
    let focal = input.focal;
    let center = NodeId::Word(focal.id);

    let mut nodes = vec![
        GraphNode::new(center, focal.display_label(), FOCUS_NODE_COLOR, FOCUS_NODE_SIZE)
            .with_arabic(&focal.arabic)
            .pinned(),
    ];
    let mut links = Vec::new();

    let known: HashMap<WordId, &Word> = input.related_words.iter().map(|w| (w.id, w)).collect();

    // Strongest edge first, then by counterpart id and type for a stable order
    let mut edges: Vec<(WordId, &WordRelationship)> = input
        .relationships
        .iter()
        .filter_map(|rel| rel.counterpart(focal.id).map(|other| (other, rel)))
        .collect();
    edges.sort_by(|(a_id, a), (b_id, b)| {
        b.weight
            .total_cmp(&a.weight)
            .then(a_id.cmp(b_id))
            .then(a.relationship_type.cmp(&b.relationship_type))
    });

    let mut related: HashSet<WordId> = HashSet::new();
    let mut seen_edges = HashSet::new();
    let mut dropped_edges = 0usize;

    for (other, rel) in edges {
        let Some(word) = known.get(&other) else {
            dropped_edges += 1;
            continue;
        };
        if !seen_edges.insert(rel.key()) {
            continue;
        }

        let kind = LinkKind::from(rel.relationship_type);
        if related.insert(other) {
            nodes.push(
                GraphNode::new(NodeId::Word(other), word.display_label(), kind.color(), WORD_NODE_SIZE)
                    .with_arabic(&word.arabic),
            );
        }
        links.push(GraphLink::new(center, NodeId::Word(other), kind, rel.weight));
    }

    let mates: BTreeMap<WordId, &Word> = input
        .theme_mates
        .iter()
        .filter(|w| w.id != focal.id && !related.contains(&w.id))
        .map(|w| (w.id, w))
        .collect();

    let hidden_theme_mates = mates.len().saturating_sub(options.theme_mate_cap);

    for (id, word) in mates.into_iter().take(options.theme_mate_cap) {
        nodes.push(
            GraphNode::new(NodeId::Word(id), word.display_label(), THEME_MATE_COLOR, WORD_NODE_SIZE)
                .with_arabic(&word.arabic),
        );
        links.push(GraphLink::new(
            center,
            NodeId::Word(id),
            LinkKind::SharedTheme,
            options.theme_mate_weight,
        ));
    }

    debug!(
        word_id = focal.id,
        related = related.len(),
        nodes = nodes.len(),
        hidden_theme_mates,
        dropped_edges,
        "Word focus graph built"
    );

    WordFocusGraph {
        graph: GraphData { nodes, links },
        hidden_theme_mates,
    }
}
