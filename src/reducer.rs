use tracing::{info, warn};
use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::battle::{self, Winner};
use crate::catalog::display_name;
use crate::effect::Effect;
use crate::roster::Side;
use crate::state::{
    Alert, AppState, BattlePhase, FocusArea, BATTLE_STEPS, BATTLE_TICKS_PER_STEP,
};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.catalog_loading = true;
            state.message = None;
            DispatchResult::changed_with(Effect::LoadCatalog {
                limit: state.catalog_limit,
            })
        }

        Action::CatalogDidLoad(load) => {
            state.catalog_loading = false;
            state.catalog = load.catalog;
            state.skipped = load.skipped;
            state.selected_index = 0;
            state.detail_name = None;
            state.message = if state.catalog.is_empty() {
                Some("No pokemon could be loaded.".to_string())
            } else if !state.skipped.is_empty() {
                Some(format!(
                    "{} of {} pokemon could not be loaded.",
                    state.skipped.len(),
                    state.catalog_limit
                ))
            } else {
                None
            };
            let effects = select_current(state);
            if effects.is_empty() {
                DispatchResult::changed()
            } else {
                DispatchResult::changed_with_many(effects)
            }
        }

        Action::CatalogDidError(error) => {
            state.catalog_loading = false;
            state.message = Some(format!("Pokedex error: {error}"));
            state.alert = Some(Alert {
                title: "Pokedex unavailable".to_string(),
                message: error,
            });
            DispatchResult::changed()
        }

        Action::FocusNext => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.focus_next();
            DispatchResult::changed()
        }

        Action::FocusPrev => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.focus_prev();
            DispatchResult::changed()
        }

        Action::SelectionMove(delta) => {
            let index = (state.selected_index as i64 + delta as i64).max(0) as usize;
            move_selection(state, index)
        }

        Action::SelectionPage(delta) => {
            let page = list_page_size(state) as i64;
            let index = (state.selected_index as i64 + delta as i64 * page).max(0) as usize;
            move_selection(state, index)
        }

        Action::DexSelect(index) => move_selection(state, index),

        Action::SearchStart => {
            state.search.active = true;
            state.search.query.clear();
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            DispatchResult::changed()
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SearchSubmit => {
            state.search.active = false;
            let query = state.search.query.trim().to_string();
            if query.is_empty() {
                return DispatchResult::changed();
            }
            let Some(index) = state.catalog.position(&query) else {
                state.detail_name = None;
                state.sprite_loading = false;
                state.message = Some("Pokemon not found.".to_string());
                return DispatchResult::changed();
            };
            state.selected_index = index;
            state.focus = FocusArea::DexList;
            state.message = None;
            DispatchResult::changed_with_many(select_current(state))
        }

        Action::SpriteDidLoad { name, sprite } => {
            if state.detail_name.as_deref() == Some(name.as_str()) {
                state.sprite_loading = false;
            }
            state.sprite_cache.insert(name, sprite);
            DispatchResult::changed()
        }

        Action::SpriteDidError { name, error } => {
            if state.detail_name.as_deref() == Some(name.as_str()) {
                state.sprite_loading = false;
            }
            state.message = Some(format!("Sprite error for {name}: {error}"));
            DispatchResult::changed()
        }

        Action::RosterAdd(side) => {
            if state.battle_in_progress() {
                return DispatchResult::unchanged();
            }
            let Some(name) = state.selected_name() else {
                state.message = Some("Select a pokemon first.".to_string());
                return DispatchResult::changed();
            };
            match state.rosters.add(side, &state.catalog, &name) {
                Ok(()) => {
                    let last = state.rosters.members(side).len().saturating_sub(1);
                    state.set_roster_selected(side, last);
                    state.message = Some(format!("{} joined {side}.", display_name(&name)));
                }
                Err(error) => {
                    warn!(%error, "roster add rejected");
                    state.alert = Some(Alert::error(error.to_string()));
                }
            }
            DispatchResult::changed()
        }

        Action::RosterRemove(side) => {
            if state.battle_in_progress() {
                return DispatchResult::unchanged();
            }
            let Some(name) = state.selected_roster_name(side).map(str::to_string) else {
                state.message = Some(format!("{side} has nobody to remove."));
                return DispatchResult::changed();
            };
            match state.rosters.remove(side, &name) {
                Ok(()) => {
                    state.clamp_roster_selection(side);
                    state.message = Some(format!("{} left {side}.", display_name(&name)));
                }
                Err(error) => {
                    warn!(%error, "roster remove rejected");
                    state.alert = Some(Alert::error(error.to_string()));
                }
            }
            DispatchResult::changed()
        }

        Action::RosterSelect { side, index } => {
            let moved = state.set_roster_selected(side, index);
            let focused = state.focus != FocusArea::Roster(side);
            state.focus = FocusArea::Roster(side);
            if moved || focused {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::SessionReset => {
            if state.battle_in_progress() || state.rosters.is_empty() {
                return DispatchResult::unchanged();
            }
            state.rosters.clear_all();
            for side in Side::ALL {
                state.set_roster_selected(side, 0);
            }
            state.message = Some("Rosters cleared.".to_string());
            DispatchResult::changed()
        }

        Action::BattleStart => {
            if state.modal_open() {
                return DispatchResult::unchanged();
            }
            let (len_a, len_b) = (
                state.rosters.members(Side::A).len(),
                state.rosters.members(Side::B).len(),
            );
            if len_a == 0 || len_b == 0 {
                state.alert = Some(Alert::error(
                    "Both sides need at least one pokemon to start a battle.",
                ));
                return DispatchResult::changed();
            }
            if len_a != len_b {
                state.alert = Some(Alert::error(
                    "Both sides need the same number of pokemon to start a battle.",
                ));
                return DispatchResult::changed();
            }
            info!(pairs = len_a, "battle started");
            state.battle = BattlePhase::InProgress { step: 0, ticks: 0 };
            DispatchResult::changed()
        }

        Action::ModalDismiss => {
            if state.alert.take().is_some() {
                return DispatchResult::changed();
            }
            if matches!(state.battle, BattlePhase::Finished(_)) {
                state.battle = BattlePhase::Idle;
                return DispatchResult::changed();
            }
            DispatchResult::unchanged()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => tick_battle(state),

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// A cleared detail panel is refilled even when the index stays put.
fn move_selection(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    let moved = state.set_selected_index(index);
    if !moved && (state.detail_name.is_some() || state.catalog.is_empty()) {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed_with_many(select_current(state))
}

fn select_current(state: &mut AppState) -> Vec<Effect> {
    let Some(name) = state.selected_name() else {
        state.detail_name = None;
        return Vec::new();
    };
    select_detail(state, &name)
}

fn select_detail(state: &mut AppState, name: &str) -> Vec<Effect> {
    if state.detail_name.as_deref() == Some(name) {
        return Vec::new();
    }
    state.detail_name = Some(name.to_string());
    state.sprite_loading = false;
    if state.sprite_cache.contains_key(name) {
        return Vec::new();
    }
    let Some(url) = state.current_detail().and_then(|entry| entry.sprite.clone()) else {
        return Vec::new();
    };
    state.sprite_loading = true;
    vec![Effect::LoadSprite {
        name: name.to_string(),
        url,
    }]
}

fn tick_battle(state: &mut AppState) -> DispatchResult<Effect> {
    state.tick = state.tick.wrapping_add(1);
    let BattlePhase::InProgress { step, ticks } = state.battle.clone() else {
        return DispatchResult::unchanged();
    };
    if ticks + 1 < BATTLE_TICKS_PER_STEP {
        state.battle = BattlePhase::InProgress {
            step,
            ticks: ticks + 1,
        };
        return DispatchResult::unchanged();
    }
    if step + 1 < BATTLE_STEPS {
        state.battle = BattlePhase::InProgress {
            step: step + 1,
            ticks: 0,
        };
        return DispatchResult::changed();
    }
    finish_battle(state);
    DispatchResult::changed()
}

fn finish_battle(state: &mut AppState) {
    let outcome = {
        let side_a = state.rosters.entries(Side::A, &state.catalog);
        let side_b = state.rosters.entries(Side::B, &state.catalog);
        battle::resolve(&side_a, &side_b)
    };
    match outcome {
        Ok(result) => {
            match result.winner {
                Winner::Side(side) => info!(
                    %side,
                    a = result.tally.a,
                    b = result.tally.b,
                    "battle finished"
                ),
                Winner::Tie => info!(wins = result.tally.a, "battle tied"),
            }
            state.battle = BattlePhase::Finished(result);
        }
        Err(error) => {
            warn!(%error, "battle could not be resolved");
            state.battle = BattlePhase::Idle;
            state.alert = Some(Alert::error(error.to_string()));
        }
    }
}

fn list_page_size(state: &AppState) -> usize {
    state.terminal_size.1.saturating_sub(8).max(1) as usize
}
