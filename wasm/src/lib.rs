use curriculum_tree::config::parse_config_str;
use curriculum_tree::layout_dump::ViewDump;
use curriculum_tree::{Config, GraphView, RawFilters, ViewSnapshot, normalize_catalog};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurriculumLayoutOptions {
    program_code: Option<String>,
    collapse: Option<String>,
    config: Option<serde_json::Value>,
    filters: Option<RawFilters>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurriculumLayoutResult {
    dump: ViewDump,
    state: ViewSnapshot,
}

fn build_config(options: &CurriculumLayoutOptions) -> Result<Config, String> {
    match &options.config {
        Some(value) => parse_config_str(&value.to_string()).map_err(|error| error.to_string()),
        None => Ok(Config::default()),
    }
}

fn layout_curriculum_inner(
    catalog_json: &str,
    state_json: Option<&str>,
    options: CurriculumLayoutOptions,
) -> Result<String, String> {
    let config = build_config(&options)?;
    let raw: serde_json::Value = serde_json::from_str(catalog_json).map_err(|error| error.to_string())?;
    let catalog = normalize_catalog(&raw);
    let program = options.program_code.as_deref().unwrap_or("");

    let mut view = GraphView::new(catalog, program, config);
    if let Some(state_json) = state_json {
        let snapshot = ViewSnapshot::from_json_str(state_json, &view.config().layout)
            .map_err(|error| error.to_string())?;
        view.apply_snapshot(&snapshot);
    }
    match options.collapse.as_deref() {
        Some("all") => view.collapse_all(),
        Some("none") => view.expand_all(),
        _ => {}
    }
    if let Some(filters) = &options.filters {
        view.set_raw_filters(filters);
    }

    let result = CurriculumLayoutResult {
        dump: ViewDump::from_view(&view),
        state: view.snapshot(),
    };
    serde_json::to_string(&result).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_curriculum(
    catalog_json: &str,
    state_json: Option<String>,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<CurriculumLayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        CurriculumLayoutOptions::default()
    };
    layout_curriculum_inner(catalog_json, state_json.as_deref(), options)
        .map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use crate::{CurriculumLayoutOptions, layout_curriculum_inner};

    const CATALOG: &str = r#"[
        { "pruefungsfach": "Math", "modules": [
            { "code": "ALG", "name": "Algebra", "courses": [
                { "code": "VO-101", "name": "Lecture", "ects": 4 },
                { "code": "UE-102", "name": "Exercises", "ects": 2 }
            ]}
        ]}
    ]"#;

    #[test]
    fn lays_out_expanded_catalog_and_returns_state() {
        let options = CurriculumLayoutOptions {
            collapse: Some("none".to_string()),
            ..CurriculumLayoutOptions::default()
        };
        let out = layout_curriculum_inner(CATALOG, None, options).expect("layout should succeed");
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["dump"]["nodes"].as_array().unwrap().len(), 5);
        assert!(json["state"]["collapsedIds"].as_array().unwrap().is_empty());
    }

    #[test]
    fn config_overrides_apply() {
        let options = CurriculumLayoutOptions {
            collapse: Some("none".to_string()),
            config: Some(serde_json::json!({ "layout": { "levelX": { "course": 1200 } } })),
            ..CurriculumLayoutOptions::default()
        };
        let out = layout_curriculum_inner(CATALOG, None, options).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        let course = json["dump"]["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|n| n["id"] == "course-0-0-0-VO-101")
            .unwrap()
            .clone();
        assert_eq!(course["x"], 1200.0);
    }

    #[test]
    fn bad_catalog_is_an_error() {
        assert!(layout_curriculum_inner("not json", None, CurriculumLayoutOptions::default()).is_err());
    }
}
