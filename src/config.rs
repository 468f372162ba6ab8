use crate::tree::Level;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelOffsets {
    pub root: f32,
    pub subject: f32,
    pub module: f32,
    pub course_direct: f32,
    pub course: f32,
}

impl Default for LevelOffsets {
    fn default() -> Self {
        Self {
            root: 40.0,
            subject: 340.0,
            module: 660.0,
            course_direct: 660.0,
            course: 980.0,
        }
    }
}

impl LevelOffsets {
    pub fn x_for(&self, level: Level) -> f32 {
        match level {
            Level::Root => self.root,
            Level::Subject => self.subject,
            Level::Module => self.module,
            Level::CourseDirect => self.course_direct,
            Level::Course => self.course,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub level_x: LevelOffsets,
    pub node_width: f32,
    pub node_height: f32,
    /// Vertical distance between consecutive leaves.
    pub leaf_spacing: f32,
    pub collision_gap: f32,
    /// Persisted coordinates with `|x|` at or above this are treated as corrupt.
    pub position_bound: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let node_height = 124.0;
        Self {
            level_x: LevelOffsets::default(),
            node_width: 270.0,
            node_height,
            leaf_spacing: node_height + 36.0,
            collision_gap: 12.0,
            position_bound: 10_000.0,
        }
    }
}

impl LayoutConfig {
    pub fn accepts_x(&self, x: f32) -> bool {
        x.is_finite() && x.abs() < self.position_bound
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterBounds {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramConfig {
    pub bachelor_code: String,
    pub bachelor_semesters: SemesterBounds,
    pub master_semesters: SemesterBounds,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            bachelor_code: "033 521".to_string(),
            bachelor_semesters: SemesterBounds { min: 6, max: 10 },
            master_semesters: SemesterBounds { min: 4, max: 8 },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub layout: LayoutConfig,
    pub program: ProgramConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelOffsetsFile {
    root: Option<f32>,
    subject: Option<f32>,
    module: Option<f32>,
    course_direct: Option<f32>,
    course: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    level_x: Option<LevelOffsetsFile>,
    node_width: Option<f32>,
    node_height: Option<f32>,
    leaf_spacing: Option<f32>,
    collision_gap: Option<f32>,
    position_bound: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgramConfigFile {
    bachelor_code: Option<String>,
    bachelor_semesters: Option<SemesterBounds>,
    master_semesters: Option<SemesterBounds>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
    program: Option<ProgramConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed = parse_config(&contents)?;
    log::debug!("loaded layout config from {}", path.display());
    Ok(merge_config_file(config, parsed))
}

pub fn parse_config_str(contents: &str) -> anyhow::Result<Config> {
    let parsed = parse_config(contents)?;
    Ok(merge_config_file(Config::default(), parsed))
}

fn parse_config(contents: &str) -> anyhow::Result<ConfigFile> {
    // json5 so hand-edited files may carry comments and trailing commas.
    let parsed: ConfigFile = json5::from_str(contents)?;
    Ok(parsed)
}

fn merge_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    if let Some(layout) = parsed.layout {
        if let Some(offsets) = layout.level_x {
            if let Some(v) = offsets.root {
                config.layout.level_x.root = v;
            }
            if let Some(v) = offsets.subject {
                config.layout.level_x.subject = v;
            }
            if let Some(v) = offsets.module {
                config.layout.level_x.module = v;
            }
            if let Some(v) = offsets.course_direct {
                config.layout.level_x.course_direct = v;
            }
            if let Some(v) = offsets.course {
                config.layout.level_x.course = v;
            }
        }
        if let Some(v) = layout.node_width {
            config.layout.node_width = v.max(1.0);
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v.max(1.0);
        }
        if let Some(v) = layout.leaf_spacing {
            config.layout.leaf_spacing = v.max(0.0);
        }
        if let Some(v) = layout.collision_gap {
            config.layout.collision_gap = v.max(0.0);
        }
        if let Some(v) = layout.position_bound {
            config.layout.position_bound = v.abs();
        }
    }

    if let Some(program) = parsed.program {
        if let Some(v) = program.bachelor_code {
            config.program.bachelor_code = v.trim().to_string();
        }
        if let Some(v) = program.bachelor_semesters {
            config.program.bachelor_semesters = normalize_bounds(v);
        }
        if let Some(v) = program.master_semesters {
            config.program.master_semesters = normalize_bounds(v);
        }
    }

    config
}

fn normalize_bounds(bounds: SemesterBounds) -> SemesterBounds {
    let min = bounds.min.max(1);
    SemesterBounds {
        min,
        max: bounds.max.max(min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_level_table() {
        let config = LayoutConfig::default();
        assert_eq!(config.level_x.x_for(Level::Root), 40.0);
        assert_eq!(config.level_x.x_for(Level::Module), 660.0);
        assert_eq!(config.level_x.x_for(Level::CourseDirect), 660.0);
        assert_eq!(config.level_x.x_for(Level::Course), 980.0);
        assert_eq!(config.leaf_spacing, 160.0);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let config = parse_config_str(
            r#"{
                // tighter rows
                layout: { leafSpacing: 140, levelX: { course: 1000 } },
                program: { bachelorCode: " 033 521 " },
            }"#,
        )
        .unwrap();
        assert_eq!(config.layout.leaf_spacing, 140.0);
        assert_eq!(config.layout.level_x.course, 1000.0);
        assert_eq!(config.layout.level_x.subject, 340.0);
        assert_eq!(config.layout.node_width, 270.0);
        assert_eq!(config.program.bachelor_code, "033 521");
    }

    #[test]
    fn accepts_x_rejects_out_of_range_and_nan() {
        let config = LayoutConfig::default();
        assert!(config.accepts_x(9_999.0));
        assert!(config.accepts_x(-500.0));
        assert!(!config.accepts_x(10_000.0));
        assert!(!config.accepts_x(-12_000.0));
        assert!(!config.accepts_x(f32::NAN));
        assert!(!config.accepts_x(f32::INFINITY));
    }

    #[test]
    fn semester_bounds_are_normalized() {
        let config = parse_config_str(r#"{ program: { masterSemesters: { min: 0, max: 0 } } }"#)
            .unwrap();
        assert_eq!(config.program.master_semesters, SemesterBounds { min: 1, max: 1 });
    }
}
