use crate::layout::EdgeKind;
use crate::status::CourseStatus;
use crate::tree::Level;
use crate::view::GraphView;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDump {
    pub program_code: String,
    pub node_width: f32,
    pub node_height: f32,
    pub width: f32,
    pub height: f32,
    pub collapsed: Vec<String>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub level: Level,
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub subject_id: Option<String>,
    pub status: Option<CourseStatus>,
    pub ects: Option<f32>,
    pub pinned: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl ViewDump {
    pub fn from_view(view: &GraphView) -> Self {
        let layout = &view.config().layout;
        let render = view.render_set();

        let nodes: Vec<NodeDump> = render
            .nodes
            .into_iter()
            .map(|node| NodeDump {
                pinned: view.manual_positions().contains_key(&node.id),
                x: node.position.x,
                y: node.position.y,
                label: node.data.label,
                level: node.data.level,
                color: node.data.color,
                subject_id: node.data.subject_id,
                status: node.data.status,
                ects: node.data.ects.or(node.data.module_ects),
                id: node.id,
            })
            .collect();

        let width = nodes
            .iter()
            .map(|n| n.x + layout.node_width)
            .fold(0.0, f32::max);
        let height = nodes
            .iter()
            .map(|n| n.y + layout.node_height)
            .fold(0.0, f32::max);

        let edges = render
            .edges
            .into_iter()
            .map(|edge| EdgeDump {
                id: edge.id,
                from: edge.source,
                to: edge.target,
                kind: edge.kind,
            })
            .collect();

        ViewDump {
            program_code: view.program_code().to_string(),
            node_width: layout.node_width,
            node_height: layout.node_height,
            width,
            height,
            collapsed: view.collapse().snapshot_ids(),
            nodes,
            edges,
        }
    }
}

pub fn write_view_dump(path: &Path, view: &GraphView) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = ViewDump::from_view(view);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
