//! Unit detail: one unit, its sub-themes and their member words

use std::collections::HashSet;

use tracing::debug;

use crate::domain::corpus::{SubTheme, ThemeMember, Unit, WordId, WordRelationship};

use super::types::{
    GraphData, GraphLink, GraphNode, LinkKind, NodeId, SUB_THEME_NODE_SIZE, WORD_NODE_SIZE,
    unit_node_size,
};

/// Rows already fetched for one unit
#[derive(Debug, Clone, Copy)]
pub struct UnitDetailInput<'a> {
    pub unit: &'a Unit,
    pub sub_themes: &'a [SubTheme],
    pub members: &'a [ThemeMember],
    /// Relationship edges to overlay; `None` leaves them out
    pub relationships: Option<&'a [WordRelationship]>,
}

/// Build the unit detail graph
///
/// Sub-themes of other units and memberships of unknown sub-themes are
/// dropped. A word appearing in several sub-themes yields one node and one
/// membership link per sub-theme. Relationship edges with an endpoint outside
/// the unit's words are dropped. A unit without sub-themes yields an empty graph.
pub fn build_unit_detail(input: UnitDetailInput<'_>) -> GraphData {
    let unit = input.unit;

    let mut seen_themes = HashSet::new();
    let mut sub_themes: Vec<&SubTheme> = input
        .sub_themes
        .iter()
        .filter(|st| st.unit_id == unit.id)
        .filter(|st| seen_themes.insert(st.id))
        .collect();
    sub_themes.sort_by_key(|st| (st.sort_order, st.id));

    if sub_themes.is_empty() {
        debug!(unit = %unit.code, "Unit has no sub-themes, nothing to render");
        return GraphData::default();
    }

    let unit_node = NodeId::Unit(unit.id);
    let mut nodes = Vec::with_capacity(1 + sub_themes.len() + input.members.len());
    let mut links = Vec::with_capacity(sub_themes.len() + input.members.len());

    // Center node is pushed first and resized once the member count is known
    nodes.push(
        GraphNode::new(unit_node, &unit.name, &unit.color, unit_node_size(0))
            .with_unit_code(&unit.code)
            .pinned(),
    );

    for st in &sub_themes {
        let theme_node = NodeId::SubTheme(st.id);
        nodes.push(
            GraphNode::new(theme_node, &st.label, &unit.color, SUB_THEME_NODE_SIZE)
                .with_unit_code(&unit.code),
        );
        links.push(GraphLink::membership(unit_node, theme_node));
    }

    let mut words: HashSet<WordId> = HashSet::new();
    let mut memberships = HashSet::new();
    let mut dropped_members = 0usize;

    for member in input.members {
        if !seen_themes.contains(&member.sub_theme_id) {
            dropped_members += 1;
            continue;
        }
        if !memberships.insert((member.sub_theme_id, member.word.id)) {
            continue;
        }

        let word = &member.word;
        if words.insert(word.id) {
            nodes.push(
                GraphNode::new(
                    NodeId::Word(word.id),
                    word.display_label(),
                    &unit.color,
                    WORD_NODE_SIZE,
                )
                .with_arabic(&word.arabic)
                .with_unit_code(&unit.code),
            );
        }
        links.push(GraphLink::membership(
            NodeId::SubTheme(member.sub_theme_id),
            NodeId::Word(word.id),
        ));
    }

    nodes[0].size = unit_node_size(words.len());

    let mut dropped_edges = 0usize;
    if let Some(relationships) = input.relationships {
        let mut seen_edges = HashSet::new();
        for rel in relationships {
            if rel.word_id_1 == rel.word_id_2
                || !words.contains(&rel.word_id_1)
                || !words.contains(&rel.word_id_2)
            {
                dropped_edges += 1;
                continue;
            }
            if !seen_edges.insert(rel.key()) {
                continue;
            }
            links.push(GraphLink::new(
                NodeId::Word(rel.word_id_1),
                NodeId::Word(rel.word_id_2),
                LinkKind::from(rel.relationship_type),
                rel.weight,
            ));
        }
    }

    debug!(
        unit = %unit.code,
        sub_themes = sub_themes.len(),
        words = words.len(),
        links = links.len(),
        dropped_members,
        dropped_edges,
        "Unit detail graph built"
    );

    GraphData { nodes, links }
}
