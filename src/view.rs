use crate::catalog::{Catalog, CatalogFilterOptions, collect_filter_options};
use crate::collapse::CollapseStore;
use crate::colors::{SubjectColorMap, exam_subject_colors};
use crate::config::{Config, LayoutConfig};
use crate::drag::DragController;
use crate::filter::{FilterState, ProgramVariant, RawFilters, compute_visible_node_ids, normalize_filters};
use crate::layout::{
    Edge, LayoutNode, ManualPositionMap, TreeLayout, enforce_hierarchical_order, layout_tree,
    merge_nodes_with_pinned_positions, resolve_node_overlaps,
};
use crate::persist::ViewSnapshot;
use crate::plan::{NodeAction, PlanActions, Semester, dispatch_action, semesters_for_program};
use crate::status::{AllTodo, CourseStatusSource};
use crate::tree::{TreeNode, build_tree, collect_collapsible_ids, subject_order};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Inputs of one display pass.
pub struct DisplayPass<'a> {
    pub tree: &'a TreeNode,
    pub collapsed: &'a BTreeSet<String>,
    pub status: &'a dyn CourseStatusSource,
    pub previous: &'a [LayoutNode],
    pub manual: &'a ManualPositionMap,
    pub subject_order: &'a [String],
    pub filters: &'a FilterState,
    pub variant: ProgramVariant,
    pub config: &'a LayoutConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayOutput {
    pub layout: TreeLayout,
    pub displayed: Vec<LayoutNode>,
    pub visible: BTreeSet<String>,
}

pub fn compute_display(pass: &DisplayPass<'_>) -> DisplayOutput {
    let layout = layout_tree(pass.tree, pass.collapsed, pass.status, pass.config);
    let merged = merge_nodes_with_pinned_positions(
        &layout.nodes,
        pass.previous,
        &layout.edges,
        pass.manual,
        pass.config,
    );
    let swept = resolve_node_overlaps(merged, pass.config);
    let displayed = enforce_hierarchical_order(swept, pass.subject_order, &BTreeSet::new(), pass.config);
    let visible = compute_visible_node_ids(&displayed, &layout.edges, pass.filters, pass.variant);
    log::debug!(
        "display pass: {} nodes, {} edges, {} visible",
        displayed.len(),
        layout.edges.len(),
        visible.len()
    );
    DisplayOutput {
        layout,
        displayed,
        visible,
    }
}

/// What a host draws: visible nodes and the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderSet {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<Edge>,
}

pub struct GraphView {
    config: Config,
    program_code: String,
    variant: ProgramVariant,
    catalog: Catalog,
    colors: SubjectColorMap,
    tree: TreeNode,
    subject_order: Vec<String>,
    options: CatalogFilterOptions,
    collapse: CollapseStore,
    filters: FilterState,
    filters_configured: bool,
    manual_positions: ManualPositionMap,
    status: Box<dyn CourseStatusSource>,
    layout: TreeLayout,
    displayed: Vec<LayoutNode>,
    visible: BTreeSet<String>,
    drag: DragController,
    selection: BTreeSet<String>,
    position_pass_pending: bool,
}

impl GraphView {
    /// Fresh view with nothing persisted: fully collapsed, filters permissive.
    pub fn new(catalog: Catalog, program_code: &str, config: Config) -> Self {
        let variant = ProgramVariant::from_code(program_code, &config.program);
        let colors = exam_subject_colors(&catalog.subject_names());
        let tree = build_tree(&catalog, &colors);
        let options = collect_filter_options(&catalog);
        let mut view = Self {
            program_code: program_code.trim().to_string(),
            variant,
            subject_order: subject_order(&tree),
            collapse: CollapseStore::all_collapsed(collect_collapsible_ids(&tree)),
            filters: FilterState::permissive(&options),
            filters_configured: false,
            manual_positions: ManualPositionMap::new(),
            status: Box::new(AllTodo),
            layout: TreeLayout::default(),
            displayed: Vec::new(),
            visible: BTreeSet::new(),
            drag: DragController::new(),
            selection: BTreeSet::new(),
            position_pass_pending: false,
            config,
            catalog,
            colors,
            tree,
            options,
        };
        view.refresh();
        view
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn program_code(&self) -> &str {
        &self.program_code
    }

    pub fn variant(&self) -> ProgramVariant {
        self.variant
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn subject_colors(&self) -> &SubjectColorMap {
        &self.colors
    }

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    pub fn filter_options(&self) -> &CatalogFilterOptions {
        &self.options
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filters_configured(&self) -> bool {
        self.filters_configured
    }

    pub fn collapse(&self) -> &CollapseStore {
        &self.collapse
    }

    pub fn manual_positions(&self) -> &ManualPositionMap {
        &self.manual_positions
    }

    /// Raw layout of the last pass, before reconciliation.
    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn displayed(&self) -> &[LayoutNode] {
        &self.displayed
    }

    pub fn visible(&self) -> &BTreeSet<String> {
        &self.visible
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn position_pass_pending(&self) -> bool {
        self.position_pass_pending
    }

    /// Restores persisted collapse state, manual positions and filters.
    pub fn apply_snapshot(&mut self, snapshot: &ViewSnapshot) {
        match &snapshot.collapsed_ids {
            Some(ids) => self.collapse.reset(ids.iter().cloned()),
            None => self.collapse = CollapseStore::all_collapsed(self.collapse.universe().clone()),
        }
        let known = self.tree.all_ids();
        self.manual_positions = snapshot
            .node_pos_by_id
            .iter()
            .filter(|(id, _)| known.contains(id.as_str()))
            .map(|(id, pos)| (id.clone(), *pos))
            .collect();
        self.filters_configured = snapshot.filters_configured;
        self.filters = self.filters_from(snapshot.filters.as_ref());
        self.displayed.clear();
        self.refresh();
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            collapsed_ids: Some(self.collapse.snapshot_ids()),
            node_pos_by_id: self.manual_positions.clone(),
            filters: Some(self.filters.to_raw()),
            filters_configured: self.filters_configured,
        }
    }

    /// Swaps in a new catalog; collapse state and positions survive by id.
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        self.colors = exam_subject_colors(&catalog.subject_names());
        self.tree = build_tree(&catalog, &self.colors);
        self.subject_order = subject_order(&self.tree);
        self.options = collect_filter_options(&catalog);
        self.catalog = catalog;

        self.collapse.prune(collect_collapsible_ids(&self.tree));
        let known = self.tree.all_ids();
        let before = self.manual_positions.len();
        self.manual_positions.retain(|id, _| known.contains(id));
        if before != self.manual_positions.len() {
            log::info!(
                "dropped {} manual positions for removed nodes",
                before - self.manual_positions.len()
            );
        }
        self.selection.retain(|id| known.contains(id));
        let raw = self.filters.to_raw();
        self.filters = self.filters_from(Some(&raw));
        self.refresh();
    }

    /// Switches program; obligation options and semester bounds follow.
    pub fn set_program(&mut self, program_code: &str) {
        self.program_code = program_code.trim().to_string();
        self.variant = ProgramVariant::from_code(program_code, &self.config.program);
        let raw = self.filters.to_raw();
        self.filters = self.filters_from(Some(&raw));
        self.refresh();
    }

    pub fn set_status_source(&mut self, status: impl CourseStatusSource + 'static) {
        self.status = Box::new(status);
        self.refresh();
    }

    pub fn toggle_collapse(&mut self, id: &str) -> bool {
        let toggled = self.collapse.toggle(id);
        if toggled {
            self.refresh();
        }
        toggled
    }

    pub fn collapse_all(&mut self) {
        self.collapse.collapse_all();
        self.refresh();
    }

    pub fn expand_all(&mut self) {
        self.collapse.expand_all();
        self.refresh();
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.collapse.materialize();
        self.filters = filters;
        self.filters_configured = true;
        self.refresh();
    }

    pub fn set_raw_filters(&mut self, raw: &RawFilters) {
        let filters = normalize_filters(raw, self.options.ects_bounds, self.variant);
        self.set_filters(filters);
    }

    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = ids.into_iter().map(Into::into).collect();
    }

    pub fn begin_drag(&mut self, id: &str) -> bool {
        self.drag.start(id, &self.displayed, &self.selection)
    }

    pub fn drag_to(&mut self, leader_x: f32) {
        self.drag.drag_to(leader_x, &mut self.displayed);
    }

    /// Commits the gesture and runs any position pass held back during it.
    pub fn end_drag(&mut self) -> Vec<String> {
        let committed = self.drag.stop(
            &mut self.displayed,
            &mut self.manual_positions,
            &self.config.layout,
        );
        if self.position_pass_pending {
            self.refresh();
        }
        committed
    }

    /// Drops manual placement and lays everything out from scratch.
    pub fn align(&mut self) {
        self.drag.cancel();
        self.manual_positions.clear();
        self.displayed.clear();
        self.refresh();
    }

    pub fn refresh(&mut self) {
        let collapsed = self.collapse.effective();
        if self.drag.is_dragging() {
            self.refresh_during_drag(&collapsed);
            return;
        }
        let output = compute_display(&DisplayPass {
            tree: &self.tree,
            collapsed: &collapsed,
            status: self.status.as_ref(),
            previous: &self.displayed,
            manual: &self.manual_positions,
            subject_order: &self.subject_order,
            filters: &self.filters,
            variant: self.variant,
            config: &self.config.layout,
        });
        self.layout = output.layout;
        self.displayed = output.displayed;
        self.visible = output.visible;
        self.position_pass_pending = false;
    }

    // Nodes on screen keep their positions until the gesture ends.
    fn refresh_during_drag(&mut self, collapsed: &BTreeSet<String>) {
        let layout = layout_tree(&self.tree, collapsed, self.status.as_ref(), &self.config.layout);
        let on_screen: HashMap<&str, _> = self
            .displayed
            .iter()
            .map(|n| (n.id.as_str(), n.position))
            .collect();
        let session = self.drag.session();
        let displayed: Vec<LayoutNode> = layout
            .nodes
            .iter()
            .map(|node| {
                let position = session
                    .and_then(|s| s.position_of(&node.id))
                    .or_else(|| on_screen.get(node.id.as_str()).copied())
                    .unwrap_or(node.position);
                LayoutNode {
                    position,
                    ..node.clone()
                }
            })
            .collect();
        self.visible = compute_visible_node_ids(&displayed, &layout.edges, &self.filters, self.variant);
        self.displayed = displayed;
        self.layout = layout;
        self.position_pass_pending = true;
        log::debug!("position pass deferred until drag ends");
    }

    pub fn render_set(&self) -> RenderSet {
        let nodes = self
            .displayed
            .iter()
            .filter(|n| self.visible.contains(&n.id))
            .cloned()
            .collect();
        let edges = self
            .layout
            .edges
            .iter()
            .filter(|e| self.visible.contains(&e.source) && self.visible.contains(&e.target))
            .cloned()
            .collect();
        RenderSet { nodes, edges }
    }

    pub fn semesters(&self, count: Option<usize>) -> Vec<Semester> {
        semesters_for_program(self.variant, count, &self.config.program)
    }

    pub fn dispatch<A: PlanActions + ?Sized>(
        &self,
        node_id: &str,
        action: NodeAction,
        semesters: &[Semester],
        actions: &mut A,
    ) -> bool {
        dispatch_action(&self.tree, node_id, action, semesters, actions)
    }

    fn filters_from(&self, raw: Option<&RawFilters>) -> FilterState {
        match raw {
            Some(raw) if self.filters_configured => {
                normalize_filters(raw, self.options.ects_bounds, self.variant)
            }
            _ => FilterState::permissive(&self.options),
        }
    }
}
