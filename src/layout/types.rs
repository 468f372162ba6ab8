use crate::status::CourseStatus;
use crate::tree::Level;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Persisted horizontal overrides written on drag completion.
pub type ManualPositionMap = BTreeMap<String, Position>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Display label, including the expand/collapse glyph.
    pub label: String,
    pub level: Level,
    pub has_children: bool,
    pub collapsed: bool,
    pub color: String,
    /// Enclosing subject band; `None` only for the root.
    pub subject_id: Option<String>,
    pub subject_name: Option<String>,
    pub module_count: Option<usize>,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub course_type: Option<String>,
    pub ects: Option<f32>,
    pub category: Option<String>,
    pub exam_subject: Option<String>,
    pub is_mandatory: bool,
    pub status: Option<CourseStatus>,
    pub module_id: Option<String>,
    pub module_code: Option<String>,
    pub module_ects: Option<f32>,
    pub module_course_codes: Vec<String>,
    pub module_course_ects: Vec<f32>,
    pub module_course_types: Vec<String>,
}

impl NodeData {
    pub fn new(label: impl Into<String>, level: Level) -> Self {
        Self {
            label: label.into(),
            level,
            has_children: false,
            collapsed: false,
            color: String::new(),
            subject_id: None,
            subject_name: None,
            module_count: None,
            course_code: None,
            course_name: None,
            course_type: None,
            ects: None,
            category: None,
            exam_subject: None,
            is_mandatory: false,
            status: None,
            module_id: None,
            module_code: None,
            module_ects: None,
            module_course_codes: Vec::new(),
            module_course_ects: Vec::new(),
            module_course_types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Straight,
    SmoothStep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<Edge>,
}

impl TreeLayout {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
