mod collision;
mod hierarchy;
mod reconcile;
pub(crate) mod types;
pub use collision::{nodes_overlap, resolve_node_overlaps};
pub use hierarchy::enforce_hierarchical_order;
pub use reconcile::merge_nodes_with_pinned_positions;
pub use types::*;

use crate::config::LayoutConfig;
use crate::status::{CourseStatusSource, aggregate_status};
use crate::tree::{Level, NodeAttrs, ROOT_ID, TreeNode};
use std::collections::BTreeSet;

const EXPANDED_GLYPH: &str = "▼ ";
const COLLAPSED_GLYPH: &str = "▶ ";

/// Post-order midpoint layout over the expanded part of the tree.
///
/// Leaves (and collapsed nodes) take consecutive rows; a parent sits halfway
/// between its first and last child. `x` depends only on the level.
pub fn layout_tree(
    root: &TreeNode,
    collapsed: &BTreeSet<String>,
    status: &dyn CourseStatusSource,
    config: &LayoutConfig,
) -> TreeLayout {
    let mut pass = LayoutPass {
        collapsed,
        status,
        config,
        leaf_index: 0,
        out: TreeLayout::default(),
    };
    pass.visit(root, None, None);
    pass.out
}

struct LayoutPass<'a> {
    collapsed: &'a BTreeSet<String>,
    status: &'a dyn CourseStatusSource,
    config: &'a LayoutConfig,
    leaf_index: usize,
    out: TreeLayout,
}

impl LayoutPass<'_> {
    fn visit(&mut self, node: &TreeNode, parent_id: Option<&str>, subject_id: Option<&str>) -> f32 {
        let can_expand = node.has_children();
        let is_collapsed = can_expand && self.collapsed.contains(&node.id);
        let subject_id = if node.level == Level::Subject {
            Some(node.id.as_str())
        } else {
            subject_id
        };

        let y = if can_expand && !is_collapsed {
            let mut min_y = f32::INFINITY;
            let mut max_y = f32::NEG_INFINITY;
            for child in &node.children {
                let child_y = self.visit(child, Some(node.id.as_str()), subject_id);
                min_y = min_y.min(child_y);
                max_y = max_y.max(child_y);
            }
            (min_y + max_y) / 2.0
        } else {
            let y = self.leaf_index as f32 * self.config.leaf_spacing;
            self.leaf_index += 1;
            y
        };

        let prefix = match (node.level != Level::Root && can_expand, is_collapsed) {
            (false, _) => "",
            (true, true) => COLLAPSED_GLYPH,
            (true, false) => EXPANDED_GLYPH,
        };
        let mut data = node_data(node, self.status);
        data.label = format!("{prefix}{}", node.label);
        data.collapsed = is_collapsed;
        data.subject_id = subject_id.map(str::to_string);

        self.out.nodes.push(LayoutNode {
            id: node.id.clone(),
            position: Position::new(self.config.level_x.x_for(node.level), y),
            data,
        });

        if let Some(parent_id) = parent_id {
            let kind = if parent_id == ROOT_ID {
                EdgeKind::Straight
            } else {
                EdgeKind::SmoothStep
            };
            self.out.edges.push(Edge {
                id: format!("e-{parent_id}-{}", node.id),
                source: parent_id.to_string(),
                target: node.id.clone(),
                kind,
            });
        }
        y
    }
}

fn node_data(node: &TreeNode, status: &dyn CourseStatusSource) -> NodeData {
    let mut data = NodeData::new(node.label.clone(), node.level);
    data.has_children = node.has_children();
    data.color = node.color.clone();

    match &node.attrs {
        NodeAttrs::Root => {}
        NodeAttrs::Subject { name, module_count } => {
            data.subject_name = Some(name.clone());
            data.module_count = Some(*module_count);
        }
        NodeAttrs::Module(module) => {
            data.module_code = Some(module.code.clone());
            data.module_ects = module.ects;
            data.category = module.category.clone();
            data.exam_subject = module.exam_subject.clone();
            data.is_mandatory = module.is_mandatory;
            data.module_course_codes = module.course_codes.clone();
            data.module_course_ects = module.course_ects.clone();
            data.module_course_types = module.course_types.clone();
            data.status = Some(aggregate_status(
                module.course_codes.iter().map(|code| status.status_of(code)),
            ));
        }
        NodeAttrs::Course(course) => {
            data.course_code = Some(course.code.clone());
            data.course_name = Some(course.name.clone());
            data.course_type = course.course_type.clone();
            data.ects = course.ects;
            data.category = course.category.clone();
            data.exam_subject = course.exam_subject.clone();
            data.is_mandatory = course.is_mandatory;
            data.module_id = course.module_id.clone();
            data.status = Some(status.status_of(&course.code));
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::SubjectColorMap;
    use crate::status::{AllTodo, CourseStatus};
    use crate::tree::{build_tree, collect_collapsible_ids, tests::sample_catalog};
    use std::collections::BTreeMap;

    fn tree() -> TreeNode {
        build_tree(&sample_catalog(), &SubjectColorMap::new())
    }

    fn by_id(layout: &TreeLayout, id: &str) -> LayoutNode {
        layout.node(id).cloned().unwrap()
    }

    #[test]
    fn leaves_take_consecutive_rows_and_parents_center() {
        let config = LayoutConfig::default();
        let layout = layout_tree(&tree(), &BTreeSet::new(), &AllTodo, &config);
        let spacing = config.leaf_spacing;

        assert_eq!(by_id(&layout, "course-0-0-0-VO-101").position.y, 0.0);
        assert_eq!(by_id(&layout, "course-0-0-1-UE-102").position.y, spacing);
        assert_eq!(by_id(&layout, "course-0-1-single-VU-201").position.y, 2.0 * spacing);
        assert_eq!(by_id(&layout, "module-0-0-ALG").position.y, spacing / 2.0);
        // Math spans ALG (0.5) .. Analysis (2.0)
        assert_eq!(by_id(&layout, "subject-0-Math").position.y, 1.25 * spacing);
        assert_eq!(by_id(&layout, "module-1-0-PRG").position.y, 4.0 * spacing);
        assert_eq!(by_id(&layout, "course-0-0-0-VO-101").position.x, 980.0);
        assert_eq!(by_id(&layout, "course-0-1-single-VU-201").position.x, 660.0);
        assert_eq!(by_id(&layout, ROOT_ID).position.x, 40.0);
    }

    #[test]
    fn layout_is_idempotent() {
        let config = LayoutConfig::default();
        let collapsed: BTreeSet<String> = ["module-1-0-PRG".to_string()].into_iter().collect();
        let a = layout_tree(&tree(), &collapsed, &AllTodo, &config);
        let b = layout_tree(&tree(), &collapsed, &AllTodo, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn collapsing_a_module_hides_its_courses() {
        let config = LayoutConfig::default();
        let collapsed: BTreeSet<String> = ["module-0-0-ALG".to_string()].into_iter().collect();
        let layout = layout_tree(&tree(), &collapsed, &AllTodo, &config);
        assert!(layout.node("course-0-0-0-VO-101").is_none());
        assert!(layout.node("course-0-0-1-UE-102").is_none());
        assert!(!layout.edges.iter().any(|e| e.source == "module-0-0-ALG"));
        let algebra = by_id(&layout, "module-0-0-ALG");
        assert_eq!(algebra.data.label, "▶ Algebra");
        assert!(algebra.data.collapsed);
        assert_eq!(algebra.position.y, 0.0);
    }

    #[test]
    fn fully_collapsed_tree_lists_subjects_only() {
        let root = tree();
        let layout = layout_tree(&root, &collect_collapsible_ids(&root), &AllTodo, &LayoutConfig::default());
        let ids: Vec<&str> = layout.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["subject-0-Math", "subject-1-Informatics", ROOT_ID]);
        assert_eq!(by_id(&layout, ROOT_ID).data.label, "Curriculum");
        assert_eq!(by_id(&layout, "subject-1-Informatics").data.label, "▶ Informatics");
    }

    #[test]
    fn edges_flag_root_links_straight() {
        let layout = layout_tree(&tree(), &BTreeSet::new(), &AllTodo, &LayoutConfig::default());
        let root_edge = layout
            .edges
            .iter()
            .find(|e| e.target == "subject-0-Math")
            .unwrap();
        assert_eq!(root_edge.id, "e-curriculum-root-subject-0-Math");
        assert_eq!(root_edge.kind, EdgeKind::Straight);
        let deep = layout
            .edges
            .iter()
            .find(|e| e.target == "module-0-0-ALG")
            .unwrap();
        assert_eq!(deep.kind, EdgeKind::SmoothStep);
        assert_eq!(layout.edges.len(), layout.nodes.len() - 1);
    }

    #[test]
    fn statuses_come_from_source_and_aggregate() {
        let mut statuses = BTreeMap::new();
        statuses.insert("VO-101".to_string(), CourseStatus::Done);
        statuses.insert("UE-102".to_string(), CourseStatus::Done);
        statuses.insert("PR-302".to_string(), CourseStatus::InPlan);
        let layout = layout_tree(&tree(), &BTreeSet::new(), &statuses, &LayoutConfig::default());
        assert_eq!(by_id(&layout, "module-0-0-ALG").data.status, Some(CourseStatus::Done));
        assert_eq!(by_id(&layout, "module-1-0-PRG").data.status, Some(CourseStatus::InPlan));
        assert_eq!(by_id(&layout, "course-1-0-0-VU-301").data.status, Some(CourseStatus::Todo));
        assert_eq!(by_id(&layout, "subject-0-Math").data.status, None);
    }

    #[test]
    fn every_node_knows_its_band() {
        let layout = layout_tree(&tree(), &BTreeSet::new(), &AllTodo, &LayoutConfig::default());
        for node in &layout.nodes {
            if node.id == ROOT_ID {
                assert_eq!(node.data.subject_id, None);
            } else {
                assert!(node.data.subject_id.is_some(), "{} has no band", node.id);
            }
        }
        assert_eq!(
            by_id(&layout, "course-1-0-2-SE-303").data.subject_id.as_deref(),
            Some("subject-1-Informatics")
        );
    }
}
