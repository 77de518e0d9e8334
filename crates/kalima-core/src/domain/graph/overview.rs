//! Overview: one node per unit, optionally bridged by shared words

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::corpus::{Unit, UnitBridge, UnitId};

use super::types::{GraphData, GraphLink, GraphNode, LinkKind, NodeId, unit_node_size};

/// Build the overview graph
///
/// Units are ordered by `(sort_order, id)`. Bridges are kept only between two
/// distinct units present in `units` with a positive shared count; their
/// weight is the shared count relative to the largest bridge.
pub fn build_overview(
    units: &[Unit],
    word_counts: &HashMap<UnitId, usize>,
    bridges: Option<&[UnitBridge]>,
) -> GraphData {
    let mut ordered: Vec<&Unit> = Vec::with_capacity(units.len());
    let mut seen = HashSet::new();
    for unit in units {
        if seen.insert(unit.id) {
            ordered.push(unit);
        }
    }
    ordered.sort_by_key(|u| (u.sort_order, u.id));

    let nodes: Vec<GraphNode> = ordered
        .iter()
        .map(|unit| {
            let count = word_counts.get(&unit.id).copied().unwrap_or(0);
            GraphNode::new(NodeId::Unit(unit.id), &unit.name, &unit.color, unit_node_size(count))
                .with_unit_code(&unit.code)
        })
        .collect();

    let links = bridges
        .map(|bridges| bridge_links(bridges, &seen))
        .unwrap_or_default();

    debug!(
        units = nodes.len(),
        bridges = links.len(),
        "Overview graph built"
    );

    GraphData { nodes, links }
}

fn bridge_links(bridges: &[UnitBridge], units: &HashSet<UnitId>) -> Vec<GraphLink> {
    let mut pairs = HashSet::new();
    let kept: Vec<&UnitBridge> = bridges
        .iter()
        .filter(|b| b.unit_a != b.unit_b && b.shared_words > 0)
        .filter(|b| units.contains(&b.unit_a) && units.contains(&b.unit_b))
        .filter(|b| pairs.insert((b.unit_a.min(b.unit_b), b.unit_a.max(b.unit_b))))
        .collect();

    let max_shared = kept.iter().map(|b| b.shared_words).max().unwrap_or(1) as f32;

    kept.into_iter()
        .map(|b| {
            GraphLink::new(
                NodeId::Unit(b.unit_a),
                NodeId::Unit(b.unit_b),
                LinkKind::UnitBridge,
                b.shared_words as f32 / max_shared,
            )
            .with_count(b.shared_words)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::NodeKind;

    fn units() -> Vec<Unit> {
        vec![
            Unit::new(2, "B", "Fruits", "green").with_sort_order(2),
            Unit::new(1, "A", "Animals", "amber").with_sort_order(1),
            Unit::new(3, "C", "People", "rose").with_sort_order(3),
        ]
    }

    #[test]
    fn test_empty_input() {
        let graph = build_overview(&[], &HashMap::new(), Some(&[]));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_one_node_per_unit_in_order() {
        let counts = HashMap::from([(1, 40), (2, 10)]);
        let graph = build_overview(&units(), &counts, None);

        let ids: Vec<String> = graph.nodes.iter().map(|n| n.id.to_string()).collect();
        assert_eq!(ids, ["unit-1", "unit-2", "unit-3"]);
        assert!(graph.nodes.iter().all(|n| n.kind == NodeKind::Unit));
        assert!(graph.links.is_empty());
        assert_eq!(graph.nodes[0].unit_code.as_deref(), Some("A"));

        // More members never means a smaller node
        let size = |id| graph.node(NodeId::Unit(id)).unwrap().size;
        assert!(size(1) >= size(2));
        assert!(size(2) >= size(3));
    }

    #[test]
    fn test_bridges_weighted_by_shared_count() {
        let bridges = [
            UnitBridge { unit_a: 1, unit_b: 2, shared_words: 8 },
            UnitBridge { unit_a: 2, unit_b: 3, shared_words: 2 },
        ];
        let graph = build_overview(&units(), &HashMap::new(), Some(&bridges));

        assert_eq!(graph.links.len(), 2);
        assert_eq!(graph.links[0].weight, 1.0);
        assert_eq!(graph.links[0].count, Some(8));
        assert!((graph.links[1].weight - 0.25).abs() < 1e-6);
        assert!(graph.links.iter().all(|l| l.kind == LinkKind::UnitBridge && !l.dashed));
    }

    #[test]
    fn test_bridges_only_between_known_units() {
        let bridges = [
            UnitBridge { unit_a: 1, unit_b: 99, shared_words: 5 },
            UnitBridge { unit_a: 1, unit_b: 1, shared_words: 5 },
            UnitBridge { unit_a: 2, unit_b: 3, shared_words: 0 },
            UnitBridge { unit_a: 1, unit_b: 3, shared_words: 3 },
            UnitBridge { unit_a: 3, unit_b: 1, shared_words: 3 },
        ];
        let graph = build_overview(&units(), &HashMap::new(), Some(&bridges));

        assert_eq!(graph.links.len(), 1);
        for link in &graph.links {
            assert_eq!(link.source.kind(), NodeKind::Unit);
            assert_eq!(link.target.kind(), NodeKind::Unit);
        }
    }
}
