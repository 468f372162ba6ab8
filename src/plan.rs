use crate::config::ProgramConfig;
use crate::filter::ProgramVariant;
use crate::tree::{CourseAttrs, Level, ModuleAttrs, TreeNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    pub code: String,
    pub name: String,
    pub ects: Option<f32>,
    pub course_type: Option<String>,
    pub category: Option<String>,
    pub exam_subject: Option<String>,
    pub is_mandatory: bool,
}

impl From<&CourseAttrs> for CoursePayload {
    fn from(course: &CourseAttrs) -> Self {
        Self {
            code: course.code.clone(),
            name: course.name.clone(),
            ects: course.ects,
            course_type: course.course_type.clone(),
            category: course.category.clone(),
            exam_subject: course.exam_subject.clone(),
            is_mandatory: course.is_mandatory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePayload {
    pub id: String,
    pub code: String,
    pub name: String,
    pub ects: Option<f32>,
    pub course_codes: Vec<String>,
    pub course_ects: Vec<f32>,
}

impl ModulePayload {
    fn from_node(id: &str, module: &ModuleAttrs) -> Self {
        Self {
            id: id.to_string(),
            code: module.code.clone(),
            name: module.name.clone(),
            ects: module.ects,
            course_codes: module.course_codes.clone(),
            course_ects: module.course_ects.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: usize,
    pub title: String,
}

/// Semester columns for a program; `count` is clamped to the variant's bounds
/// and defaults to the lower bound.
pub fn semesters_for_program(
    variant: ProgramVariant,
    count: Option<usize>,
    program: &ProgramConfig,
) -> Vec<Semester> {
    let bounds = match variant {
        ProgramVariant::Bachelor => program.bachelor_semesters,
        ProgramVariant::Master => program.master_semesters,
    };
    let count = count.unwrap_or(bounds.min).clamp(bounds.min, bounds.max.max(bounds.min));
    (1..=count)
        .map(|id| Semester {
            id,
            title: format!("Semester {id}"),
        })
        .collect()
}

/// Host-side plan board. Results are not inspected.
pub trait PlanActions {
    fn add_to_plan(&mut self, course: &CoursePayload, semester: &Semester);
    fn toggle_done(&mut self, course: &CoursePayload);
    fn remove_from_plan(&mut self, course: &CoursePayload);
    fn add_module_to_plan(&mut self, module: &ModulePayload, semester: &Semester);
    fn toggle_module_done(&mut self, module: &ModulePayload);
    fn remove_module_from_plan(&mut self, module: &ModulePayload);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NodeAction {
    AddToPlan { semester_index: usize },
    ToggleDone,
    RemoveFromPlan,
    AddModuleToPlan { semester_index: usize },
    ToggleModuleDone,
    RemoveModuleFromPlan,
}

/// Routes an action on a tree node to `actions`.
///
/// Course actions apply to `course` and `courseDirect` leaves. Module
/// add/remove apply to modules and, through the parent module, to `course`
/// leaves. Module done-toggling applies to modules only. Returns `false` when
/// the action does not apply to the node.
pub fn dispatch_action<A: PlanActions + ?Sized>(
    tree: &TreeNode,
    node_id: &str,
    action: NodeAction,
    semesters: &[Semester],
    actions: &mut A,
) -> bool {
    let Some(node) = tree.find(node_id) else {
        log::warn!("action {action:?} on unknown node {node_id}");
        return false;
    };
    let pick = |index: usize| semesters.get(index.min(semesters.len().saturating_sub(1)));

    match action {
        NodeAction::AddToPlan { semester_index } => {
            match (course_payload(node), pick(semester_index)) {
                (Some(course), Some(semester)) => {
                    actions.add_to_plan(&course, semester);
                    true
                }
                _ => false,
            }
        }
        NodeAction::ToggleDone => course_payload(node).is_some_and(|course| {
            actions.toggle_done(&course);
            true
        }),
        NodeAction::RemoveFromPlan => course_payload(node).is_some_and(|course| {
            actions.remove_from_plan(&course);
            true
        }),
        NodeAction::AddModuleToPlan { semester_index } => {
            match (module_payload(tree, node, true), pick(semester_index)) {
                (Some(module), Some(semester)) => {
                    actions.add_module_to_plan(&module, semester);
                    true
                }
                _ => false,
            }
        }
        NodeAction::ToggleModuleDone => module_payload(tree, node, false).is_some_and(|module| {
            actions.toggle_module_done(&module);
            true
        }),
        NodeAction::RemoveModuleFromPlan => {
            module_payload(tree, node, true).is_some_and(|module| {
                actions.remove_module_from_plan(&module);
                true
            })
        }
    }
}

fn course_payload(node: &TreeNode) -> Option<CoursePayload> {
    match node.level {
        Level::Course | Level::CourseDirect => node.course().map(CoursePayload::from),
        _ => None,
    }
}

fn module_payload(tree: &TreeNode, node: &TreeNode, via_course: bool) -> Option<ModulePayload> {
    match node.level {
        Level::Module => node
            .module()
            .map(|module| ModulePayload::from_node(&node.id, module)),
        Level::Course if via_course => {
            let module_id = node.course()?.module_id.as_deref()?;
            let parent = tree.find(module_id)?;
            parent
                .module()
                .map(|module| ModulePayload::from_node(&parent.id, module))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::SubjectColorMap;
    use crate::tree::{build_tree, tests::sample_catalog};

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl PlanActions for Recorder {
        fn add_to_plan(&mut self, course: &CoursePayload, semester: &Semester) {
            self.calls.push(format!("add {} {}", course.code, semester.id));
        }
        fn toggle_done(&mut self, course: &CoursePayload) {
            self.calls.push(format!("done {}", course.code));
        }
        fn remove_from_plan(&mut self, course: &CoursePayload) {
            self.calls.push(format!("remove {}", course.code));
        }
        fn add_module_to_plan(&mut self, module: &ModulePayload, semester: &Semester) {
            self.calls.push(format!("add-module {} {}", module.code, semester.id));
        }
        fn toggle_module_done(&mut self, module: &ModulePayload) {
            self.calls.push(format!("done-module {}", module.code));
        }
        fn remove_module_from_plan(&mut self, module: &ModulePayload) {
            self.calls.push(format!("remove-module {}", module.code));
        }
    }

    fn semesters() -> Vec<Semester> {
        semesters_for_program(ProgramVariant::Bachelor, None, &ProgramConfig::default())
    }

    #[test]
    fn semester_counts_are_clamped_per_variant() {
        let program = ProgramConfig::default();
        assert_eq!(semesters_for_program(ProgramVariant::Bachelor, None, &program).len(), 6);
        assert_eq!(semesters_for_program(ProgramVariant::Bachelor, Some(14), &program).len(), 10);
        assert_eq!(semesters_for_program(ProgramVariant::Master, None, &program).len(), 4);
        assert_eq!(semesters_for_program(ProgramVariant::Master, Some(2), &program).len(), 4);
        assert_eq!(semesters_for_program(ProgramVariant::Master, Some(7), &program)[6].title, "Semester 7");
    }

    #[test]
    fn course_actions_apply_to_leaves_only() {
        let tree = build_tree(&sample_catalog(), &SubjectColorMap::new());
        let mut rec = Recorder::default();
        let semesters = semesters();

        assert!(dispatch_action(&tree, "course-0-0-0-VO-101", NodeAction::AddToPlan { semester_index: 1 }, &semesters, &mut rec));
        assert!(dispatch_action(&tree, "course-0-1-single-VU-201", NodeAction::ToggleDone, &semesters, &mut rec));
        assert!(!dispatch_action(&tree, "module-0-0-ALG", NodeAction::RemoveFromPlan, &semesters, &mut rec));
        assert_eq!(rec.calls, vec!["add VO-101 2", "done VU-201"]);
    }

    #[test]
    fn module_actions_reach_parent_from_course() {
        let tree = build_tree(&sample_catalog(), &SubjectColorMap::new());
        let mut rec = Recorder::default();
        let semesters = semesters();

        assert!(dispatch_action(&tree, "course-1-0-1-PR-302", NodeAction::AddModuleToPlan { semester_index: 0 }, &semesters, &mut rec));
        assert!(dispatch_action(&tree, "module-1-0-PRG", NodeAction::ToggleModuleDone, &semesters, &mut rec));
        assert!(!dispatch_action(&tree, "course-1-0-1-PR-302", NodeAction::ToggleModuleDone, &semesters, &mut rec));
        assert!(!dispatch_action(&tree, "course-0-1-single-VU-201", NodeAction::RemoveModuleFromPlan, &semesters, &mut rec));
        assert_eq!(rec.calls, vec!["add-module PRG 1", "done-module PRG"]);
    }

    #[test]
    fn semester_index_is_clamped() {
        let tree = build_tree(&sample_catalog(), &SubjectColorMap::new());
        let mut rec = Recorder::default();
        dispatch_action(&tree, "module-0-0-ALG", NodeAction::AddModuleToPlan { semester_index: 99 }, &semesters(), &mut rec);
        assert_eq!(rec.calls, vec!["add-module ALG 6"]);
        assert!(!dispatch_action(&tree, "module-0-0-ALG", NodeAction::AddModuleToPlan { semester_index: 0 }, &[], &mut rec));
    }

    #[test]
    fn unknown_nodes_do_nothing() {
        let tree = build_tree(&sample_catalog(), &SubjectColorMap::new());
        let mut rec = Recorder::default();
        assert!(!dispatch_action(&tree, "nope", NodeAction::ToggleDone, &semesters(), &mut rec));
        assert!(rec.calls.is_empty());
    }
}
