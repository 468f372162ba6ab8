use super::{Edge, LayoutNode, ManualPositionMap, Position};
use crate::config::LayoutConfig;
use std::collections::HashMap;

/// Carries horizontal placement across a fresh layout pass.
///
/// `x` resolution order: a valid persisted manual position, then the
/// previously displayed `x` of the same node, then (for newly revealed nodes)
/// the computed `x` shifted by however far the parent had been moved. `y`
/// always comes from the fresh layout.
pub fn merge_nodes_with_pinned_positions(
    next_nodes: &[LayoutNode],
    prev_nodes: &[LayoutNode],
    edges: &[Edge],
    persisted: &ManualPositionMap,
    config: &LayoutConfig,
) -> Vec<LayoutNode> {
    let prev_by_id: HashMap<&str, &LayoutNode> =
        prev_nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let next_by_id: HashMap<&str, &LayoutNode> =
        next_nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let parent_by_child: HashMap<&str, &str> = edges
        .iter()
        .map(|e| (e.target.as_str(), e.source.as_str()))
        .collect();

    next_nodes
        .iter()
        .map(|next| {
            let x = resolve_x(next, &prev_by_id, &next_by_id, &parent_by_child, persisted, config);
            LayoutNode {
                position: Position::new(x, next.position.y),
                ..next.clone()
            }
        })
        .collect()
}

fn resolve_x(
    next: &LayoutNode,
    prev_by_id: &HashMap<&str, &LayoutNode>,
    next_by_id: &HashMap<&str, &LayoutNode>,
    parent_by_child: &HashMap<&str, &str>,
    persisted: &ManualPositionMap,
    config: &LayoutConfig,
) -> f32 {
    if let Some(pinned) = persisted.get(&next.id)
        && config.accepts_x(pinned.x)
    {
        return pinned.x;
    }
    if let Some(prev) = prev_by_id.get(next.id.as_str()) {
        return prev.position.x;
    }

    let computed = next.position.x;
    let Some(parent_id) = parent_by_child.get(next.id.as_str()) else {
        return computed;
    };
    match (prev_by_id.get(parent_id), next_by_id.get(parent_id)) {
        (Some(prev_parent), Some(next_parent)) => {
            computed + (prev_parent.position.x - next_parent.position.x)
        }
        _ => computed,
    }
}
