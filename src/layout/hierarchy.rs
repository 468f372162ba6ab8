use super::collision::push_below;
use super::{LayoutNode, Position};
use crate::config::LayoutConfig;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Keeps each subject's subtree in its own vertical band, in `subject_order`.
///
/// Pass one clears overlaps inside every band. Pass two walks the bands top
/// to bottom and shifts any band that starts above the running cursor. Nodes
/// listed in `moved` are never shifted. The root (no band) is left alone and
/// input order is preserved.
pub fn enforce_hierarchical_order(
    mut nodes: Vec<LayoutNode>,
    subject_order: &[String],
    moved: &BTreeSet<String>,
    config: &LayoutConfig,
) -> Vec<LayoutNode> {
    let mut bands: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        if let Some(subject_id) = &node.data.subject_id {
            bands.entry(subject_id.clone()).or_default().push(idx);
        }
    }

    for members in bands.values_mut() {
        members.sort_by(|&a, &b| row_order(&nodes[a].position, &nodes[b].position));
        separate_band(&mut nodes, members, moved, config);
    }

    let mut cursor_y = f32::NEG_INFINITY;
    for subject_id in subject_order {
        let Some(members) = bands.get(subject_id) else {
            continue;
        };
        let top = members
            .iter()
            .map(|&idx| nodes[idx].position.y)
            .fold(f32::INFINITY, f32::min);
        if top < cursor_y {
            let deficit = cursor_y - top;
            for &idx in members {
                if !moved.contains(&nodes[idx].id) {
                    nodes[idx].position.y += deficit;
                }
            }
        }
        let bottom = members
            .iter()
            .map(|&idx| nodes[idx].position.y + config.node_height)
            .fold(f32::NEG_INFINITY, f32::max);
        cursor_y = bottom + config.collision_gap;
    }
    nodes
}

fn row_order(a: &Position, b: &Position) -> Ordering {
    a.y.partial_cmp(&b.y)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
}

fn separate_band(
    nodes: &mut [LayoutNode],
    members: &[usize],
    moved: &BTreeSet<String>,
    config: &LayoutConfig,
) {
    for (rank, &idx) in members.iter().enumerate() {
        if moved.contains(&nodes[idx].id) {
            continue;
        }
        let earlier: Vec<Position> = members[..rank].iter().map(|&i| nodes[i].position).collect();
        push_below(&mut nodes[idx].position, earlier.iter().copied(), config);
    }
}
