//! Renderer-agnostic graph model
//!
//! Nodes and links are kind-tagged so the renderer can match on them
//! exhaustively. Node identifiers are qualified by entity kind, so a unit
//! and a word with the same numeric id never collide.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::corpus::{RelationshipType, SubThemeId, UnitId, WordId};

/// Smallest size hint handed to the renderer
pub const MIN_NODE_SIZE: f32 = 6.0;
/// Largest size hint handed to the renderer
pub const MAX_NODE_SIZE: f32 = 24.0;
/// Size hint of a sub-theme node
pub const SUB_THEME_NODE_SIZE: f32 = 5.0;
/// Size hint of a word node
pub const WORD_NODE_SIZE: f32 = 3.0;
/// Size hint of the pinned word in the word focus view
pub const FOCUS_NODE_SIZE: f32 = 8.0;

/// Color of words surfaced only through a shared sub-theme
pub const THEME_MATE_COLOR: &str = "#94a3b8";
/// Color of the pinned word in the word focus view
pub const FOCUS_NODE_COLOR: &str = "#fbbf24";

/// Size hint for a unit node: monotonic in word count, clamped to
/// `[MIN_NODE_SIZE, MAX_NODE_SIZE]`
pub fn unit_node_size(word_count: usize) -> f32 {
    (MIN_NODE_SIZE + (word_count as f32).sqrt() * 1.5).clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
}

/// Kind-qualified node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Unit(UnitId),
    SubTheme(SubThemeId),
    Word(WordId),
}

impl NodeId {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Unit(_) => NodeKind::Unit,
            Self::SubTheme(_) => NodeKind::SubTheme,
            Self::Word(_) => NodeKind::Word,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit(id) => write!(f, "unit-{}", id),
            Self::SubTheme(id) => write!(f, "theme-{}", id),
            Self::Word(id) => write!(f, "word-{}", id),
        }
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Kind of entity a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Unit,
    SubTheme,
    Word,
}

/// A node of a graph view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    /// Arabic-script label, for word nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arabic: Option<String>,
    pub color: String,
    pub size: f32,
    /// Code of the owning unit, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_code: Option<String>,
    /// Pinned at the center of the layout
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
}

impl GraphNode {
    /// Create a new node; the kind follows from the id
    pub fn new(id: NodeId, label: impl Into<String>, color: impl Into<String>, size: f32) -> Self {
        Self {
            id,
            kind: id.kind(),
            label: label.into(),
            arabic: None,
            color: color.into(),
            size,
            unit_code: None,
            pinned: false,
        }
    }

    pub fn with_arabic(mut self, arabic: impl Into<String>) -> Self {
        self.arabic = Some(arabic.into());
        self
    }

    pub fn with_unit_code(mut self, code: impl Into<String>) -> Self {
        self.unit_code = Some(code.into());
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// Kind of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Containment: unit → sub-theme or sub-theme → word
    Membership,
    SameRoot,
    Opposite,
    VirtuePair,
    SemanticSimilar,
    MorphologicalVariant,
    /// Word focus: the two words share a sub-theme but no relationship edge
    SharedTheme,
    /// Overview: two units share member words
    UnitBridge,
}

impl LinkKind {
    /// Dashed links mark evidence-based, non-hierarchical edges
    pub fn is_dashed(&self) -> bool {
        matches!(self, Self::Opposite | Self::SemanticSimilar)
    }

    /// Color token for the link
    pub fn color(&self) -> &'static str {
        match self {
            Self::Membership => "#cbd5e1",
            Self::SameRoot => "#8b5cf6",
            Self::Opposite => "#ef4444",
            Self::VirtuePair => "#10b981",
            Self::SemanticSimilar => "#3b82f6",
            Self::MorphologicalVariant => "#f59e0b",
            Self::SharedTheme => THEME_MATE_COLOR,
            Self::UnitBridge => "#64748b",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::SameRoot => "same_root",
            Self::Opposite => "opposite",
            Self::VirtuePair => "virtue_pair",
            Self::SemanticSimilar => "semantic_similar",
            Self::MorphologicalVariant => "morphological_variant",
            Self::SharedTheme => "shared_theme",
            Self::UnitBridge => "unit_bridge",
        }
    }
}

impl From<RelationshipType> for LinkKind {
    fn from(relationship_type: RelationshipType) -> Self {
        match relationship_type {
            RelationshipType::SameRoot => Self::SameRoot,
            RelationshipType::Opposite => Self::Opposite,
            RelationshipType::VirtuePair => Self::VirtuePair,
            RelationshipType::SemanticSimilar => Self::SemanticSimilar,
            RelationshipType::MorphologicalVariant => Self::MorphologicalVariant,
        }
    }
}

/// A link of a graph view
///
/// Color and the dashed flag are derived from the kind at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: LinkKind,
    pub color: &'static str,
    pub weight: f32,
    /// Shared word count, for unit bridges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub dashed: bool,
}

impl GraphLink {
    pub fn new(source: NodeId, target: NodeId, kind: LinkKind, weight: f32) -> Self {
        Self {
            source,
            target,
            kind,
            color: kind.color(),
            weight,
            count: None,
            dashed: kind.is_dashed(),
        }
    }

    /// Containment link with unit weight
    pub fn membership(source: NodeId, target: NodeId) -> Self {
        Self::new(source, target, LinkKind::Membership, 1.0)
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// A `{nodes, links}` graph handed to the renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Find a node by id
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes of the given kind
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    /// Links of the given kind
    pub fn links_of_kind(&self, kind: LinkKind) -> impl Iterator<Item = &GraphLink> {
        self.links.iter().filter(move |l| l.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_do_not_collide_across_kinds() {
        let ids = [NodeId::Unit(1), NodeId::SubTheme(1), NodeId::Word(1)];
        let rendered: std::collections::HashSet<String> =
            ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(rendered.len(), 3);
        assert_eq!(NodeId::Word(1).to_string(), "word-1");
    }

    #[test]
    fn test_dashed_iff_opposite_or_semantic() {
        let all = [
            LinkKind::Membership,
            LinkKind::SameRoot,
            LinkKind::Opposite,
            LinkKind::VirtuePair,
            LinkKind::SemanticSimilar,
            LinkKind::MorphologicalVariant,
            LinkKind::SharedTheme,
            LinkKind::UnitBridge,
        ];
        for kind in all {
            let link = GraphLink::new(NodeId::Word(1), NodeId::Word(2), kind, 0.5);
            assert_eq!(
                link.dashed,
                matches!(kind, LinkKind::Opposite | LinkKind::SemanticSimilar),
                "{}",
                kind.as_str()
            );
        }
    }

    #[test]
    fn test_unit_node_size_monotonic_and_clamped() {
        let sizes: Vec<f32> = [0, 1, 5, 20, 80, 1_000, 100_000]
            .into_iter()
            .map(unit_node_size)
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sizes[0], MIN_NODE_SIZE);
        assert_eq!(*sizes.last().unwrap(), MAX_NODE_SIZE);
    }

    #[test]
    fn test_serialize_node_and_link() {
        let node = GraphNode::new(NodeId::Word(3), "book", "#fff", WORD_NODE_SIZE)
            .with_arabic("كِتَاب");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "word-3");
        assert_eq!(json["kind"], "word");
        assert_eq!(json["arabic"], "كِتَاب");
        assert!(json.get("pinned").is_none());
        assert!(json.get("unitCode").is_none());

        let link = GraphLink::new(NodeId::Word(3), NodeId::Word(4), LinkKind::Opposite, 0.8);
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["source"], "word-3");
        assert_eq!(json["kind"], "opposite");
        assert_eq!(json["dashed"], true);
    }
}
