use super::{LayoutNode, Position};
use crate::config::LayoutConfig;
use std::cmp::Ordering;

/// Axis-aligned rectangle test with the collision gap as margin.
pub fn nodes_overlap(a: Position, b: Position, config: &LayoutConfig) -> bool {
    let w = config.node_width + config.collision_gap;
    let h = config.node_height + config.collision_gap;
    a.x < b.x + w && a.x + w > b.x && a.y < b.y + h && a.y + h > b.y
}

pub(crate) fn by_row(a: &LayoutNode, b: &LayoutNode) -> Ordering {
    a.position
        .y
        .partial_cmp(&b.position.y)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.position.x.partial_cmp(&b.position.x).unwrap_or(Ordering::Equal))
}

/// Greedy top-to-bottom sweep: each node moves below any earlier node it hits.
///
/// Returns the nodes in sweep order.
pub fn resolve_node_overlaps(mut nodes: Vec<LayoutNode>, config: &LayoutConfig) -> Vec<LayoutNode> {
    nodes.sort_by(by_row);
    for i in 0..nodes.len() {
        let (placed, rest) = nodes.split_at_mut(i);
        let current = &mut rest[0];
        push_below(&mut current.position, placed.iter().map(|n| n.position), config);
    }
    nodes
}

/// Moves `position` down until it clears every obstacle. `y` only grows, and
/// each hit lands it strictly below that obstacle, so this terminates.
pub(crate) fn push_below<I>(position: &mut Position, obstacles: I, config: &LayoutConfig)
where
    I: Iterator<Item = Position> + Clone,
{
    let step = config.node_height + config.collision_gap;
    loop {
        let hit = obstacles
            .clone()
            .find(|other| nodes_overlap(*position, *other, config));
        match hit {
            Some(other) => position.y = other.y + step,
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NodeData;
    use crate::tree::Level;

    fn node(id: &str, x: f32, y: f32) -> LayoutNode {
        LayoutNode {
            id: id.to_string(),
            position: Position::new(x, y),
            data: NodeData::new(id, Level::Course),
        }
    }

    fn assert_no_overlaps(nodes: &[LayoutNode], config: &LayoutConfig) {
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                assert!(
                    !nodes_overlap(a.position, b.position, config),
                    "{} overlaps {}",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn overlap_respects_gap() {
        let config = LayoutConfig::default();
        let a = Position::new(0.0, 0.0);
        assert!(nodes_overlap(a, Position::new(0.0, 130.0), &config));
        assert!(!nodes_overlap(a, Position::new(0.0, 136.0), &config));
        assert!(!nodes_overlap(a, Position::new(282.0, 0.0), &config));
        assert!(nodes_overlap(a, Position::new(281.0, 0.0), &config));
    }

    #[test]
    fn stacked_duplicates_are_spread_downward() {
        let config = LayoutConfig::default();
        let nodes = vec![node("a", 0.0, 0.0), node("b", 0.0, 0.0), node("c", 10.0, 0.0)];
        let resolved = resolve_node_overlaps(nodes, &config);
        let ys: Vec<f32> = resolved.iter().map(|n| n.position.y).collect();
        assert_eq!(ys, vec![0.0, 136.0, 272.0]);
        assert_no_overlaps(&resolved, &config);
    }

    #[test]
    fn separated_nodes_are_untouched() {
        let config = LayoutConfig::default();
        let nodes = vec![node("a", 0.0, 0.0), node("b", 400.0, 0.0), node("c", 0.0, 200.0)];
        let resolved = resolve_node_overlaps(nodes.clone(), &config);
        for original in &nodes {
            let after = resolved.iter().find(|n| n.id == original.id).unwrap();
            assert_eq!(after.position, original.position);
        }
    }

    #[test]
    fn pseudo_random_inputs_end_without_overlap() {
        let config = LayoutConfig::default();
        let mut seed: u32 = 7;
        let mut next = || {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (seed >> 16) as f32
        };
        for round in 0..20 {
            let nodes: Vec<LayoutNode> = (0..30)
                .map(|i| node(&format!("n{round}-{i}"), next() % 1200.0, next() % 800.0))
                .collect();
            let resolved = resolve_node_overlaps(nodes, &config);
            assert_no_overlaps(&resolved, &config);
        }
    }
}
