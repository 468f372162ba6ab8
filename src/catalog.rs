use crate::filter::{EctsRange, normalize_course_type};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub subjects: Vec<ExamSubject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamSubject {
    pub name: Option<String>,
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub code: Option<String>,
    pub name: Option<String>,
    pub ects: Option<f32>,
    pub category: Option<String>,
    pub is_mandatory: bool,
    /// Exam subject override; falls back to the enclosing subject name.
    pub exam_subject: Option<String>,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub code: Option<String>,
    pub name: Option<String>,
    pub ects: Option<f32>,
    pub course_type: Option<String>,
}

impl Catalog {
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_str(input)?;
        Ok(normalize_catalog(&raw))
    }

    /// Subject names as the tree builder resolves them.
    pub fn subject_names(&self) -> Vec<String> {
        self.subjects
            .iter()
            .enumerate()
            .map(|(idx, subject)| subject.display_name(idx))
            .collect()
    }
}

impl ExamSubject {
    pub fn display_name(&self, idx: usize) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Exam subject {}", idx + 1),
        }
    }
}

pub fn normalize_catalog(raw: &Value) -> Catalog {
    let sections = locate_sections(raw);
    let subjects = sections.iter().map(normalize_subject).collect();
    Catalog { subjects }
}

fn locate_sections(raw: &Value) -> &[Value] {
    if let Some(list) = raw.as_array() {
        return list;
    }
    let candidates = [
        raw.get("sections"),
        raw.get("subjects"),
        raw.get("program").and_then(|p| p.get("sections")),
        raw.get("catalog").and_then(|c| c.get("sections")),
    ];
    for candidate in candidates.into_iter().flatten() {
        if let Some(list) = candidate.as_array() {
            return list;
        }
    }
    &[]
}

fn normalize_subject(raw: &Value) -> ExamSubject {
    let modules = array_field(raw, "modules")
        .iter()
        .map(normalize_module)
        .collect();
    ExamSubject {
        name: string_field(raw, &["pruefungsfach", "exam_subject", "name"]),
        modules,
    }
}

fn normalize_module(raw: &Value) -> Module {
    let courses = array_field(raw, "courses")
        .iter()
        .map(normalize_course)
        .collect();
    Module {
        code: string_field(raw, &["code", "module_code"]),
        name: string_field(raw, &["name", "title"]),
        ects: raw.get("ects").and_then(coerce_number),
        category: string_field(raw, &["category"]),
        is_mandatory: raw
            .get("is_mandatory")
            .map(coerce_bool)
            .unwrap_or(false),
        exam_subject: string_field(raw, &["module_exam_subject", "exam_subject"]),
        courses,
    }
}

fn normalize_course(raw: &Value) -> Course {
    Course {
        code: string_field(raw, &["code"]),
        name: string_field(raw, &["name", "title"]),
        ects: raw.get("ects").and_then(coerce_number),
        course_type: string_field(raw, &["type", "course_type"]),
    }
}

fn array_field<'a>(raw: &'a Value, key: &str) -> &'a [Value] {
    raw.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match raw.get(*key) {
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// Numbers and numeric strings; anything non-finite is dropped.
pub fn coerce_number(value: &Value) -> Option<f32> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    let narrowed = parsed as f32;
    narrowed.is_finite().then_some(narrowed)
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilterOptions {
    pub exam_subjects: Vec<String>,
    pub course_types: Vec<String>,
    pub ects_bounds: Option<EctsRange>,
}

/// Everything a filter panel can offer for this catalog, sorted.
pub fn collect_filter_options(catalog: &Catalog) -> CatalogFilterOptions {
    let mut exam_subjects = BTreeSet::new();
    let mut course_types = BTreeSet::new();
    let mut ects_values: Vec<f32> = Vec::new();

    for (idx, subject) in catalog.subjects.iter().enumerate() {
        let subject_name = subject.display_name(idx);
        exam_subjects.insert(subject_name.clone());
        for module in &subject.modules {
            if let Some(over) = module.exam_subject.as_deref() {
                exam_subjects.insert(over.to_string());
            }
            if let Some(ects) = module.ects {
                ects_values.push(ects);
            }
            for course in &module.courses {
                let code = course.code.as_deref().unwrap_or("");
                if let Some(kind) = normalize_course_type(course.course_type.as_deref(), code) {
                    course_types.insert(kind);
                }
                if let Some(ects) = course.ects {
                    ects_values.push(ects);
                }
            }
        }
    }

    let ects_bounds = ects_values.iter().copied().fold(None, |acc, v| match acc {
        None => Some(EctsRange { min: v, max: v }),
        Some(range) => Some(EctsRange {
            min: range.min.min(v),
            max: range.max.max(v),
        }),
    });

    CatalogFilterOptions {
        exam_subjects: exam_subjects.into_iter().collect(),
        course_types: course_types.into_iter().collect(),
        ects_bounds,
    }
}
