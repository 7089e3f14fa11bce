use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::battle::BattleResult;
use crate::catalog::{Catalog, Entry, SkippedEntry, CATALOG_SIZE};
use crate::roster::{Rosters, Side};
use crate::sprite::SpriteData;

/// Interval of the `Tick` subscription.
pub const TICK_MS: u64 = 100;
/// The battle progress bar fills in this many 20% steps.
pub const BATTLE_STEPS: u8 = 5;
/// Ticks per progress step, about one second each.
pub const BATTLE_TICKS_PER_STEP: u16 = 10;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    DexList,
    Roster(Side),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Idle,
    InProgress {
        step: u8,
        ticks: u16,
    },
    Finished(BattleResult),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub focus: FocusArea,

    pub catalog: Catalog,
    pub catalog_limit: u16,
    pub catalog_loading: bool,
    pub skipped: Vec<SkippedEntry>,
    pub selected_index: usize,
    pub detail_name: Option<String>,
    pub search: SearchState,

    pub rosters: Rosters,
    pub roster_a_selected: usize,
    pub roster_b_selected: usize,
    pub battle: BattlePhase,
    pub alert: Option<Alert>,

    pub sprite_cache: HashMap<String, SpriteData>,
    pub sprite_loading: bool,
    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(CATALOG_SIZE)
    }
}

impl AppState {
    pub fn new(catalog_limit: u16) -> Self {
        Self {
            terminal_size: (80, 24),
            focus: FocusArea::DexList,
            catalog: Catalog::default(),
            catalog_limit,
            catalog_loading: false,
            skipped: Vec::new(),
            selected_index: 0,
            detail_name: None,
            search: SearchState::default(),
            rosters: Rosters::default(),
            roster_a_selected: 0,
            roster_b_selected: 0,
            battle: BattlePhase::Idle,
            alert: None,
            sprite_cache: HashMap::new(),
            sprite_loading: false,
            message: None,
            tick: 0,
        }
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.catalog.entry_at(self.selected_index)
    }

    pub fn selected_name(&self) -> Option<String> {
        self.selected_entry().map(|entry| entry.name.clone())
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if self.catalog.is_empty() {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(self.catalog.len() - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    pub fn current_detail(&self) -> Option<&Entry> {
        let name = self.detail_name.as_ref()?;
        self.catalog.get(name)
    }

    pub fn roster_selected(&self, side: Side) -> usize {
        match side {
            Side::A => self.roster_a_selected,
            Side::B => self.roster_b_selected,
        }
    }

    pub fn set_roster_selected(&mut self, side: Side, index: usize) -> bool {
        let len = self.rosters.members(side).len();
        let bounded = index.min(len.saturating_sub(1));
        let slot = match side {
            Side::A => &mut self.roster_a_selected,
            Side::B => &mut self.roster_b_selected,
        };
        if *slot == bounded {
            return false;
        }
        *slot = bounded;
        true
    }

    /// Keep the roster cursor on a valid row after the roster shrinks.
    pub fn clamp_roster_selection(&mut self, side: Side) {
        let current = self.roster_selected(side);
        self.set_roster_selected(side, current);
    }

    pub fn selected_roster_name(&self, side: Side) -> Option<&str> {
        self.rosters
            .members(side)
            .get(self.roster_selected(side))
            .map(String::as_str)
    }

    pub fn battle_in_progress(&self) -> bool {
        matches!(self.battle, BattlePhase::InProgress { .. })
    }

    /// Alerts and the battle overlay take all input until dismissed.
    pub fn modal_open(&self) -> bool {
        self.alert.is_some() || !matches!(self.battle, BattlePhase::Idle)
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            FocusArea::DexList => FocusArea::Roster(Side::A),
            FocusArea::Roster(Side::A) => FocusArea::Roster(Side::B),
            FocusArea::Roster(Side::B) => FocusArea::DexList,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            FocusArea::DexList => FocusArea::Roster(Side::B),
            FocusArea::Roster(Side::A) => FocusArea::DexList,
            FocusArea::Roster(Side::B) => FocusArea::Roster(Side::A),
        };
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Catalog")
                .entry("loaded", ron_string(&self.catalog.len()))
                .entry("limit", ron_string(&self.catalog_limit))
                .entry("skipped", ron_string(&self.skipped.len()))
                .entry("selected", ron_string(&self.selected_index))
                .entry("detail", ron_string(&self.detail_name))
                .entry("search", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active)),
            DebugSection::new("Rosters")
                .entry("side_a", ron_string(&self.rosters.members(Side::A)))
                .entry("side_b", ron_string(&self.rosters.members(Side::B)))
                .entry("focus", ron_string(&self.focus))
                .entry("battle", ron_string(&self.battle)),
            DebugSection::new("Status")
                .entry("catalog_loading", ron_string(&self.catalog_loading))
                .entry("sprite_loading", ron_string(&self.sprite_loading))
                .entry("alert", ron_string(&self.alert))
                .entry("message", ron_string(&self.message)),
        ]
    }
}
