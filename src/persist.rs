use crate::config::LayoutConfig;
use crate::filter::RawFilters;
use crate::layout::{ManualPositionMap, Position};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON")]
    Json(#[from] serde_json::Error),
}

impl PersistError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    /// `None` means nothing was ever stored; the view then starts collapsed.
    pub collapsed_ids: Option<Vec<String>>,
    pub node_pos_by_id: ManualPositionMap,
    pub filters: Option<RawFilters>,
    pub filters_configured: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SnapshotFile {
    collapsed_ids: Option<Vec<String>>,
    node_pos_by_id: Option<serde_json::Map<String, Value>>,
    node_x_by_id: Option<serde_json::Map<String, Value>>,
    filters: Option<RawFilters>,
    filters_configured: Option<bool>,
}

impl ViewSnapshot {
    /// Parses a stored snapshot, dropping position entries that are not
    /// finite numbers or that lie outside the configured bound.
    pub fn from_json_str(input: &str, config: &LayoutConfig) -> PersistResult<Self> {
        let file: SnapshotFile = serde_json::from_str(input)?;
        let mut positions = ManualPositionMap::new();

        // Older snapshots only carried `x`.
        for (id, value) in file.node_x_by_id.iter().flatten() {
            match value.as_f64().map(|x| x as f32) {
                Some(x) if config.accepts_x(x) => {
                    positions.insert(id.clone(), Position::new(x, 0.0));
                }
                _ => log::warn!("dropping stored x for {id}: {value}"),
            }
        }
        for (id, value) in file.node_pos_by_id.iter().flatten() {
            match sanitize_position(value, config) {
                Some(position) => {
                    positions.insert(id.clone(), position);
                }
                None => log::warn!("dropping stored position for {id}: {value}"),
            }
        }

        Ok(Self {
            collapsed_ids: file.collapsed_ids,
            node_pos_by_id: positions,
            filters: file.filters,
            filters_configured: file.filters_configured.unwrap_or(false),
        })
    }

    pub fn to_json_string(&self) -> PersistResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn sanitize_position(value: &Value, config: &LayoutConfig) -> Option<Position> {
    let x = value.get("x")?.as_f64()? as f32;
    let y = value.get("y")?.as_f64()? as f32;
    let position = Position::new(x, y);
    (position.is_finite() && config.accepts_x(x)).then_some(position)
}

/// Reads a snapshot file. A missing file yields the empty snapshot.
pub fn read_snapshot(path: &Path, config: &LayoutConfig) -> PersistResult<ViewSnapshot> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("no snapshot at {}", path.display());
            return Ok(ViewSnapshot::default());
        }
        Err(err) => return Err(PersistError::io(format!("reading {}", path.display()), err)),
    };
    ViewSnapshot::from_json_str(&contents, config)
}

pub fn write_snapshot(path: &Path, snapshot: &ViewSnapshot) -> PersistResult<()> {
    let contents = snapshot.to_json_string()?;
    fs::write(path, contents).map_err(|err| PersistError::io(format!("writing {}", path.display()), err))
}
