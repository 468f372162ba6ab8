use crate::config::LayoutConfig;
use crate::layout::{LayoutNode, ManualPositionMap, Position};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub leader: String,
    /// Pre-drag position of every node that moves with the leader.
    pub starts: BTreeMap<String, Position>,
    /// Latest dragged `x` per tracked node, kept even while a node is hidden.
    pub current_x: BTreeMap<String, f32>,
}

impl DragSession {
    /// Where a tracked node sits mid-gesture: dragged `x`, pre-drag `y`.
    pub fn position_of(&self, id: &str) -> Option<Position> {
        let start = self.starts.get(id)?;
        let x = self.current_x.get(id).copied().unwrap_or(start.x);
        Some(Position::new(x, start.y))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Horizontal-only drag gestures over the displayed nodes.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Begins a gesture. The selection moves with the leader only when the
    /// leader is itself selected alongside at least one other node; dragging
    /// an unselected node moves it alone. Returns `false` if the leader is not
    /// displayed.
    pub fn start(&mut self, leader: &str, nodes: &[LayoutNode], selection: &BTreeSet<String>) -> bool {
        let Some(leader_node) = nodes.iter().find(|n| n.id == leader) else {
            log::warn!("drag started on unknown node {leader}");
            return false;
        };
        let mut starts = BTreeMap::new();
        starts.insert(leader.to_string(), leader_node.position);
        if selection.len() > 1 && selection.contains(leader) {
            for node in nodes.iter().filter(|n| selection.contains(&n.id)) {
                starts.insert(node.id.clone(), node.position);
            }
        }
        let current_x = starts.iter().map(|(id, p)| (id.clone(), p.x)).collect();
        self.state = DragState::Dragging(DragSession {
            leader: leader.to_string(),
            starts,
            current_x,
        });
        true
    }

    /// Moves every tracked node by the leader's horizontal offset; `y` stays
    /// locked to the pre-drag value.
    pub fn drag_to(&mut self, leader_x: f32, nodes: &mut [LayoutNode]) {
        let DragState::Dragging(session) = &mut self.state else {
            return;
        };
        let Some(leader_start) = session.starts.get(&session.leader) else {
            return;
        };
        let dx = leader_x - leader_start.x;
        for (id, start) in &session.starts {
            session.current_x.insert(id.clone(), start.x + dx);
        }
        for node in nodes.iter_mut() {
            if let Some(position) = session.position_of(&node.id) {
                node.position = position;
            }
        }
    }

    /// Ends the gesture and commits final `x` values into `manual`.
    ///
    /// Every tracked node is committed, including ones hidden since the
    /// gesture began. An existing persisted `y` is kept; otherwise the
    /// pre-drag `y` is stored. Positions outside the configured bound are not
    /// committed. Returns the committed ids.
    pub fn stop(
        &mut self,
        nodes: &mut [LayoutNode],
        manual: &mut ManualPositionMap,
        config: &LayoutConfig,
    ) -> Vec<String> {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return Vec::new();
        };
        for node in nodes.iter_mut() {
            if let Some(start) = session.starts.get(&node.id) {
                node.position.y = start.y;
            }
        }
        let mut committed = Vec::new();
        for id in session.starts.keys() {
            let Some(dropped) = session.position_of(id) else {
                continue;
            };
            if !config.accepts_x(dropped.x) {
                log::warn!("not persisting out-of-range x {} for {id}", dropped.x);
                continue;
            }
            let y = manual.get(id).map_or(dropped.y, |p| p.y);
            manual.insert(id.clone(), Position::new(dropped.x, y));
            committed.push(id.clone());
        }
        committed
    }

    /// Drops the gesture without committing anything.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
