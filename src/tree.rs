use crate::catalog::{Catalog, Course, ExamSubject, Module};
use crate::colors::{DEFAULT_SUBJECT_COLOR, ROOT_COLOR, SubjectColorMap};
use crate::filter::normalize_course_type;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ROOT_ID: &str = "curriculum-root";
const ROOT_LABEL: &str = "Curriculum";
const DEFAULT_COURSE_LABEL: &str = "Course";
const DEFAULT_MODULE_LABEL: &str = "Module";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Level {
    Root,
    Subject,
    Module,
    Course,
    CourseDirect,
}

impl Level {
    pub fn is_leaf_level(self) -> bool {
        matches!(self, Self::Course | Self::CourseDirect)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Subject => "subject",
            Self::Module => "module",
            Self::Course => "course",
            Self::CourseDirect => "courseDirect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAttrs {
    pub code: String,
    pub name: String,
    pub ects: Option<f32>,
    pub course_type: Option<String>,
    pub category: Option<String>,
    pub exam_subject: Option<String>,
    pub is_mandatory: bool,
    /// Id of the wrapping `module` node; `None` for `courseDirect` leaves.
    pub module_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleAttrs {
    pub code: String,
    pub name: String,
    pub ects: Option<f32>,
    pub category: Option<String>,
    pub exam_subject: Option<String>,
    pub is_mandatory: bool,
    pub course_codes: Vec<String>,
    pub course_ects: Vec<f32>,
    pub course_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeAttrs {
    Root,
    Subject { name: String, module_count: usize },
    Module(ModuleAttrs),
    Course(CourseAttrs),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    pub level: Level,
    pub color: String,
    pub attrs: NodeAttrs,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first pre-order visit.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn all_ids(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.walk(&mut |node| {
            out.insert(node.id.clone());
        });
        out
    }

    pub fn course(&self) -> Option<&CourseAttrs> {
        match &self.attrs {
            NodeAttrs::Course(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn module(&self) -> Option<&ModuleAttrs> {
        match &self.attrs {
            NodeAttrs::Module(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// Every non-root node that has children; the universe for collapse-all.
pub fn collect_collapsible_ids(root: &TreeNode) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    root.walk(&mut |node| {
        if node.level != Level::Root && node.has_children() {
            out.insert(node.id.clone());
        }
    });
    out
}

/// Subject ids in catalog declaration order.
pub fn subject_order(root: &TreeNode) -> Vec<String> {
    root.children
        .iter()
        .filter(|child| child.level == Level::Subject)
        .map(|child| child.id.clone())
        .collect()
}

pub fn build_tree(catalog: &Catalog, colors: &SubjectColorMap) -> TreeNode {
    let children = catalog
        .subjects
        .iter()
        .enumerate()
        .map(|(s_idx, subject)| build_subject(s_idx, subject, colors))
        .collect();

    TreeNode {
        id: ROOT_ID.to_string(),
        label: ROOT_LABEL.to_string(),
        level: Level::Root,
        color: ROOT_COLOR.to_string(),
        attrs: NodeAttrs::Root,
        children,
    }
}

fn build_subject(s_idx: usize, subject: &ExamSubject, colors: &SubjectColorMap) -> TreeNode {
    let name = subject.display_name(s_idx);
    let color = colors
        .get(&name)
        .cloned()
        .unwrap_or_else(|| DEFAULT_SUBJECT_COLOR.to_string());
    let children = subject
        .modules
        .iter()
        .enumerate()
        .map(|(m_idx, module)| build_module(s_idx, m_idx, module, &name, &color))
        .collect();

    TreeNode {
        id: format!("subject-{s_idx}-{name}"),
        label: name.clone(),
        level: Level::Subject,
        color,
        attrs: NodeAttrs::Subject {
            name,
            module_count: subject.modules.len(),
        },
        children,
    }
}

fn build_module(
    s_idx: usize,
    m_idx: usize,
    module: &Module,
    subject_name: &str,
    color: &str,
) -> TreeNode {
    let exam_subject = module
        .exam_subject
        .clone()
        .or_else(|| Some(subject_name.to_string()));
    let module_code = non_empty(module.code.as_deref());
    let module_name = non_empty(module.name.as_deref());

    // A single course needs no module wrapper.
    if let [course] = module.courses.as_slice() {
        let course_code = non_empty(course.code.as_deref());
        let id_token = course_code.or(module_code).unwrap_or("course");
        let name = non_empty(course.name.as_deref())
            .or(module_name)
            .unwrap_or(DEFAULT_COURSE_LABEL);
        return TreeNode {
            id: format!("course-{s_idx}-{m_idx}-single-{id_token}"),
            label: name.to_string(),
            level: Level::CourseDirect,
            color: color.to_string(),
            attrs: NodeAttrs::Course(CourseAttrs {
                code: course
                    .code
                    .clone()
                    .or_else(|| module.code.clone())
                    .unwrap_or_default(),
                name: name.to_string(),
                ects: course.ects.or(module.ects),
                course_type: course.course_type.clone(),
                category: module.category.clone(),
                exam_subject,
                is_mandatory: module.is_mandatory,
                module_id: None,
            }),
            children: Vec::new(),
        };
    }

    let id = format!(
        "module-{s_idx}-{m_idx}-{}",
        module_code.or(module_name).unwrap_or("module")
    );
    let children: Vec<TreeNode> = module
        .courses
        .iter()
        .enumerate()
        .map(|(c_idx, course)| {
            build_course(s_idx, m_idx, c_idx, course, module, &id, &exam_subject, color)
        })
        .collect();

    let course_codes = module
        .courses
        .iter()
        .filter_map(|course| non_empty(course.code.as_deref()).map(str::to_string))
        .collect();
    let course_ects = module.courses.iter().filter_map(|course| course.ects).collect();
    let mut course_types: Vec<String> = Vec::new();
    for course in &module.courses {
        let code = course.code.as_deref().unwrap_or("");
        if let Some(kind) = normalize_course_type(course.course_type.as_deref(), code)
            && !course_types.contains(&kind)
        {
            course_types.push(kind);
        }
    }

    let name = module_name.unwrap_or(DEFAULT_MODULE_LABEL).to_string();
    TreeNode {
        id,
        label: name.clone(),
        level: Level::Module,
        color: color.to_string(),
        attrs: NodeAttrs::Module(ModuleAttrs {
            code: module.code.clone().unwrap_or_default(),
            name,
            ects: module.ects,
            category: module.category.clone(),
            exam_subject,
            is_mandatory: module.is_mandatory,
            course_codes,
            course_ects,
            course_types,
        }),
        children,
    }
}

fn build_course(
    s_idx: usize,
    m_idx: usize,
    c_idx: usize,
    course: &Course,
    module: &Module,
    module_id: &str,
    exam_subject: &Option<String>,
    color: &str,
) -> TreeNode {
    let token = non_empty(course.code.as_deref()).unwrap_or("course");
    let name = non_empty(course.name.as_deref()).unwrap_or(DEFAULT_COURSE_LABEL);
    TreeNode {
        id: format!("course-{s_idx}-{m_idx}-{c_idx}-{token}"),
        label: name.to_string(),
        level: Level::Course,
        color: color.to_string(),
        attrs: NodeAttrs::Course(CourseAttrs {
            code: course.code.clone().unwrap_or_default(),
            name: name.to_string(),
            ects: course.ects,
            course_type: course.course_type.clone(),
            category: module.category.clone(),
            exam_subject: exam_subject.clone(),
            is_mandatory: module.is_mandatory,
            module_id: Some(module_id.to_string()),
        }),
        children: Vec::new(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::normalize_catalog;
    use serde_json::json;

    pub(crate) fn sample_catalog() -> Catalog {
        normalize_catalog(&json!([
            { "pruefungsfach": "Math", "modules": [
                { "code": "ALG", "name": "Algebra", "category": "mandatory", "courses": [
                    { "code": "VO-101", "name": "Algebra Lecture", "ects": 4 },
                    { "code": "UE-102", "name": "Algebra Exercises", "ects": 2 }
                ]},
                { "code": "ANA", "name": "Analysis", "category": "core", "courses": [
                    { "code": "VU-201", "name": "Analysis VU", "ects": 6 }
                ]}
            ]},
            { "pruefungsfach": "Informatics", "modules": [
                { "code": "PRG", "name": "Programming", "category": "elective", "courses": [
                    { "code": "VU-301", "name": "Programming 1", "ects": 5.5 },
                    { "code": "PR-302", "name": "Programming Lab", "ects": 3 },
                    { "code": "SE-303", "name": "Seminar", "ects": 3 }
                ]}
            ]}
        ]))
    }

    #[test]
    fn builds_expected_hierarchy() {
        let tree = build_tree(&sample_catalog(), &SubjectColorMap::new());
        assert_eq!(tree.id, ROOT_ID);
        assert_eq!(tree.children.len(), 2);
        let math = &tree.children[0];
        assert_eq!(math.id, "subject-0-Math");
        assert_eq!(math.color, DEFAULT_SUBJECT_COLOR);
        assert_eq!(math.children[0].id, "module-0-0-ALG");
        assert_eq!(math.children[0].children[1].id, "course-0-0-1-UE-102");
    }

    #[test]
    fn single_course_module_flattens_to_course_direct() {
        let tree = build_tree(&sample_catalog(), &SubjectColorMap::new());
        let direct = &tree.children[0].children[1];
        assert_eq!(direct.level, Level::CourseDirect);
        assert_eq!(direct.id, "course-0-1-single-VU-201");
        assert_eq!(direct.label, "Analysis VU");
        assert!(direct.children.is_empty());
        let attrs = direct.course().unwrap();
        assert_eq!(attrs.code, "VU-201");
        assert_eq!(attrs.category.as_deref(), Some("core"));
        assert_eq!(attrs.module_id, None);
    }

    #[test]
    fn ids_are_stable_across_rebuilds() {
        let catalog = sample_catalog();
        let a = build_tree(&catalog, &SubjectColorMap::new());
        let b = build_tree(&catalog, &SubjectColorMap::new());
        assert_eq!(a.all_ids(), b.all_ids());
    }

    #[test]
    fn module_aggregates_children() {
        let tree = build_tree(&sample_catalog(), &SubjectColorMap::new());
        let programming = tree.find("module-1-0-PRG").unwrap().module().unwrap();
        assert_eq!(programming.course_codes, vec!["VU-301", "PR-302", "SE-303"]);
        assert_eq!(programming.course_ects, vec![5.5, 3.0, 3.0]);
        assert_eq!(programming.course_types, vec!["VU", "PR", "SE"]);
        assert_eq!(programming.exam_subject.as_deref(), Some("Informatics"));
    }

    #[test]
    fn malformed_entries_fall_back_to_defaults() {
        let catalog = normalize_catalog(&json!([
            { "modules": [
                { "courses": [{}, {}] },
                { "courses": [{}] },
                { "courses": [] }
            ]}
        ]));
        let tree = build_tree(&catalog, &SubjectColorMap::new());
        let subject = &tree.children[0];
        assert_eq!(subject.label, "Exam subject 1");
        assert_eq!(subject.children[0].id, "module-0-0-module");
        assert_eq!(subject.children[0].label, "Module");
        assert_eq!(subject.children[0].children[0].label, "Course");
        assert_eq!(subject.children[1].id, "course-0-1-single-course");
        assert_eq!(subject.children[2].level, Level::Module);
        assert!(subject.children[2].children.is_empty());
    }

    #[test]
    fn collapsible_ids_skip_root_and_leaves() {
        let tree = build_tree(&sample_catalog(), &SubjectColorMap::new());
        let ids = collect_collapsible_ids(&tree);
        let expected: BTreeSet<String> = [
            "subject-0-Math",
            "subject-1-Informatics",
            "module-0-0-ALG",
            "module-1-0-PRG",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(ids, expected);
        assert_eq!(subject_order(&tree), vec!["subject-0-Math", "subject-1-Informatics"]);
    }
}
