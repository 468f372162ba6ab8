use std::collections::BTreeSet;

/// What the collapse store currently shows.
///
/// The forced variants are a display lens over the whole tree; they only turn
/// into a concrete set when the user toggles a node or interacts with filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollapseMode {
    Normal(BTreeSet<String>),
    ForcedExpanded,
    ForcedCollapsed,
}

impl Default for CollapseMode {
    fn default() -> Self {
        CollapseMode::Normal(BTreeSet::new())
    }
}

/// Tracks collapsed node ids over a fixed universe of collapsible ids.
#[derive(Debug, Clone, Default)]
pub struct CollapseStore {
    mode: CollapseMode,
    universe: BTreeSet<String>,
}

impl CollapseStore {
    pub fn new(universe: BTreeSet<String>) -> Self {
        Self {
            mode: CollapseMode::default(),
            universe,
        }
    }

    /// Everything collapsed, as a concrete set. Used when nothing was persisted.
    pub fn all_collapsed(universe: BTreeSet<String>) -> Self {
        Self {
            mode: CollapseMode::Normal(universe.clone()),
            universe,
        }
    }

    pub fn mode(&self) -> &CollapseMode {
        &self.mode
    }

    pub fn universe(&self) -> &BTreeSet<String> {
        &self.universe
    }

    /// Set used by the layout pass.
    pub fn effective(&self) -> BTreeSet<String> {
        match &self.mode {
            CollapseMode::Normal(set) => set.clone(),
            CollapseMode::ForcedExpanded => BTreeSet::new(),
            CollapseMode::ForcedCollapsed => self.universe.clone(),
        }
    }

    pub fn is_collapsed(&self, id: &str) -> bool {
        match &self.mode {
            CollapseMode::Normal(set) => set.contains(id),
            CollapseMode::ForcedExpanded => false,
            CollapseMode::ForcedCollapsed => self.universe.contains(id),
        }
    }

    /// Resolves a forced lens into the concrete set it displays.
    pub fn materialize(&mut self) {
        if !matches!(self.mode, CollapseMode::Normal(_)) {
            self.mode = CollapseMode::Normal(self.effective());
        }
    }

    /// Flips one node. Ids outside the universe are ignored.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.universe.contains(id) {
            log::warn!("ignoring collapse toggle for unknown node {id}");
            return false;
        }
        self.materialize();
        if let CollapseMode::Normal(set) = &mut self.mode
            && !set.remove(id)
        {
            set.insert(id.to_string());
        }
        true
    }

    pub fn collapse_all(&mut self) {
        self.mode = CollapseMode::ForcedCollapsed;
    }

    pub fn expand_all(&mut self) {
        self.mode = CollapseMode::ForcedExpanded;
    }

    /// Replaces the universe (after a catalog change) and drops stale ids.
    pub fn prune(&mut self, universe: BTreeSet<String>) {
        if let CollapseMode::Normal(set) = &mut self.mode {
            set.retain(|id| universe.contains(id));
        }
        self.universe = universe;
    }

    /// Restores a persisted set, keeping only ids that are still collapsible.
    pub fn reset<I, S>(&mut self, persisted: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = persisted
            .into_iter()
            .map(Into::into)
            .filter(|id| self.universe.contains(id))
            .collect();
        self.mode = CollapseMode::Normal(set);
    }

    /// Concrete ids for persistence; forced lenses are written as what they show.
    pub fn snapshot_ids(&self) -> Vec<String> {
        self.effective().into_iter().collect()
    }
}
