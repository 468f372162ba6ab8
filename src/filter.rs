use crate::catalog::CatalogFilterOptions;
use crate::config::ProgramConfig;
use crate::layout::{Edge, LayoutNode, NodeData};
use crate::status::CourseStatus;
use crate::tree::{Level, ROOT_ID};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

static BROAD_ELECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(free|frei|transferable|wahlf[aä]cher|free[\s-]?choice)").unwrap()
});
static COURSE_TYPE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{2,4}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramVariant {
    Bachelor,
    Master,
}

impl ProgramVariant {
    pub fn from_code(code: &str, program: &ProgramConfig) -> Self {
        if code.trim() == program.bachelor_code.trim() {
            Self::Bachelor
        } else {
            Self::Master
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Obligation {
    Mandatory,
    Core,
    Elective,
    ElectiveNarrow,
    ElectiveBroad,
}

impl Obligation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Core => "core",
            Self::Elective => "elective",
            Self::ElectiveNarrow => "elective_narrow",
            Self::ElectiveBroad => "elective_broad",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "mandatory" => Some(Self::Mandatory),
            "core" => Some(Self::Core),
            "elective" => Some(Self::Elective),
            "elective_narrow" => Some(Self::ElectiveNarrow),
            "elective_broad" => Some(Self::ElectiveBroad),
            _ => None,
        }
    }
}

/// Obligation choices offered for a program, as `(value, label)`.
pub fn obligation_options(variant: ProgramVariant) -> [(Obligation, &'static str); 3] {
    match variant {
        ProgramVariant::Bachelor => [
            (Obligation::Mandatory, "Mandatory"),
            (Obligation::ElectiveNarrow, "Elective (Enge Wahl)"),
            (Obligation::ElectiveBroad, "Elective (Breite Wahl)"),
        ],
        ProgramVariant::Master => [
            (Obligation::Mandatory, "Mandatory"),
            (Obligation::Core, "Core"),
            (Obligation::Elective, "Elective"),
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EctsRange {
    pub min: f32,
    pub max: f32,
}

impl EctsRange {
    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub obligation_types: BTreeSet<Obligation>,
    pub ects_range: Option<EctsRange>,
    pub course_types: BTreeSet<String>,
    pub exam_subjects: BTreeSet<String>,
    pub progress_states: BTreeSet<CourseStatus>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            obligation_types: BTreeSet::new(),
            ects_range: None,
            course_types: BTreeSet::new(),
            exam_subjects: BTreeSet::new(),
            progress_states: CourseStatus::ALL.into_iter().collect(),
        }
    }
}

impl FilterState {
    /// Everything the catalog offers selected; used until the user configures filters.
    pub fn permissive(options: &CatalogFilterOptions) -> Self {
        Self {
            obligation_types: BTreeSet::new(),
            ects_range: options.ects_bounds,
            course_types: options.course_types.iter().cloned().collect(),
            exam_subjects: options.exam_subjects.iter().cloned().collect(),
            progress_states: CourseStatus::ALL.into_iter().collect(),
        }
    }

    pub fn to_raw(&self) -> RawFilters {
        RawFilters {
            obligation_types: Some(
                self.obligation_types
                    .iter()
                    .map(|o| o.as_str().to_string())
                    .collect(),
            ),
            ects_range: self.ects_range.map(|range| RawEctsRange {
                min: Some(f64::from(range.min)),
                max: Some(f64::from(range.max)),
            }),
            course_types: Some(self.course_types.iter().cloned().collect()),
            exam_subjects: Some(self.exam_subjects.iter().cloned().collect()),
            progress_states: Some(
                self.progress_states
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEctsRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Persisted, loosely typed filter selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFilters {
    pub obligation_types: Option<Vec<String>>,
    pub ects_range: Option<RawEctsRange>,
    pub course_types: Option<Vec<String>>,
    pub exam_subjects: Option<Vec<String>>,
    pub progress_states: Option<Vec<String>>,
}

pub fn normalize_filters(
    raw: &RawFilters,
    bounds: Option<EctsRange>,
    variant: ProgramVariant,
) -> FilterState {
    let allowed: Vec<Obligation> = obligation_options(variant)
        .iter()
        .map(|(value, _)| *value)
        .collect();
    let obligation_types = raw
        .obligation_types
        .iter()
        .flatten()
        .filter_map(|token| Obligation::from_token(token))
        .filter(|o| allowed.contains(o))
        .collect();

    let explicit = raw.ects_range.and_then(|range| {
        let min = range.min.filter(|v| v.is_finite())? as f32;
        let max = range.max.filter(|v| v.is_finite())? as f32;
        Some(if min <= max {
            EctsRange { min, max }
        } else {
            EctsRange { min: max, max: min }
        })
    });
    let ects_range = match (explicit.or(bounds), bounds) {
        (Some(range), Some(bounds)) => {
            let clamp = |v: f32| v.min(bounds.max).max(bounds.min);
            let (min, max) = (clamp(range.min), clamp(range.max));
            Some(EctsRange {
                min: min.min(max),
                max: min.max(max),
            })
        }
        (range, None) => range,
        (None, Some(_)) => None,
    };

    let progress_states = match &raw.progress_states {
        Some(list) => list
            .iter()
            .filter_map(|token| CourseStatus::from_token(token))
            .collect(),
        None => CourseStatus::ALL.into_iter().collect(),
    };

    FilterState {
        obligation_types,
        ects_range,
        course_types: raw.course_types.iter().flatten().cloned().collect(),
        exam_subjects: raw.exam_subjects.iter().flatten().cloned().collect(),
        progress_states,
    }
}

/// Explicit type (upper-cased) or, failing that, the 2–4 letter code prefix.
pub fn normalize_course_type(course_type: Option<&str>, code: &str) -> Option<String> {
    let explicit = course_type.map(str::trim).unwrap_or("");
    if !explicit.is_empty() {
        return Some(explicit.to_uppercase());
    }
    let prefix = code.trim().split('-').next().unwrap_or("");
    COURSE_TYPE_PREFIX_RE
        .find(prefix)
        .map(|m| m.as_str().to_uppercase())
}

pub fn is_broad_elective(exam_subject: &str) -> bool {
    BROAD_ELECTIVE_RE.is_match(exam_subject)
}

pub fn obligation_for(data: &NodeData, variant: ProgramVariant) -> Option<Obligation> {
    let category = data
        .category
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if category == "mandatory" || (category.is_empty() && data.is_mandatory) {
        return Some(Obligation::Mandatory);
    }
    match variant {
        ProgramVariant::Bachelor => {
            if is_broad_elective(data.exam_subject.as_deref().unwrap_or("")) {
                Some(Obligation::ElectiveBroad)
            } else {
                Some(Obligation::ElectiveNarrow)
            }
        }
        ProgramVariant::Master => match category.as_str() {
            "core" => Some(Obligation::Core),
            "elective" => Some(Obligation::Elective),
            _ => None,
        },
    }
}

pub fn node_matches_filters(node: &LayoutNode, filters: &FilterState, variant: ProgramVariant) -> bool {
    let data = &node.data;
    if data.level == Level::Root {
        return true;
    }
    if filters.exam_subjects.is_empty() {
        return false;
    }
    if data.level == Level::Subject {
        let name = data.subject_name.as_deref().unwrap_or(&data.label);
        return filters.exam_subjects.contains(name);
    }

    match data.exam_subject.as_deref() {
        Some(subject) if filters.exam_subjects.contains(subject) => {}
        _ => return false,
    }

    if !filters.obligation_types.is_empty()
        && let Some(obligation) = obligation_for(data, variant)
        && !filters.obligation_types.contains(&obligation)
    {
        return false;
    }

    let status = data.status.unwrap_or_default();
    if !filters.progress_states.contains(&status) {
        return false;
    }

    if let Some(range) = filters.ects_range {
        let in_range = if data.level == Level::Module {
            data.module_course_ects.iter().any(|ects| range.contains(*ects))
        } else {
            data.ects
                .or(data.module_ects)
                .map(|ects| range.contains(ects))
                .unwrap_or(false)
        };
        if !in_range {
            return false;
        }
    }

    if filters.course_types.is_empty() {
        return false;
    }
    if data.level == Level::Module {
        data.module_course_types
            .iter()
            .any(|kind| filters.course_types.contains(kind))
    } else {
        let code = data.course_code.as_deref().unwrap_or("");
        normalize_course_type(data.course_type.as_deref(), code)
            .map(|kind| filters.course_types.contains(&kind))
            .unwrap_or(false)
    }
}

/// Base matches, their ancestors, and any node with a visible child.
pub fn compute_visible_node_ids(
    nodes: &[LayoutNode],
    edges: &[Edge],
    filters: &FilterState,
    variant: ProgramVariant,
) -> BTreeSet<String> {
    let mut parent_by_child: HashMap<&str, &str> = HashMap::new();
    let mut children_by_parent: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        parent_by_child.insert(edge.target.as_str(), edge.source.as_str());
        children_by_parent
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut visible: BTreeSet<String> = BTreeSet::new();
    for node in nodes {
        if !node_matches_filters(node, filters, variant) {
            continue;
        }
        visible.insert(node.id.clone());
        let mut cursor = node.id.as_str();
        while let Some(parent) = parent_by_child.get(cursor) {
            if !visible.insert((*parent).to_string()) {
                break;
            }
            cursor = parent;
        }
    }

    loop {
        let mut added = false;
        for node in nodes {
            if visible.contains(&node.id) {
                continue;
            }
            let has_visible_child = children_by_parent
                .get(node.id.as_str())
                .map(|kids| kids.iter().any(|kid| visible.contains(*kid)))
                .unwrap_or(false);
            if has_visible_child {
                visible.insert(node.id.clone());
                added = true;
            }
        }
        if !added {
            break;
        }
    }

    if nodes.iter().any(|node| node.id == ROOT_ID) {
        visible.insert(ROOT_ID.to_string());
    }
    visible
}
