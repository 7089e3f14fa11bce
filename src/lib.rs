//! Pokedex TUI
//!
//! Catalog, rosters and battle resolution live in the library so the reducer
//! and the core rules can be tested without a terminal.

pub mod action;
pub mod api;
pub mod battle;
pub mod catalog;
pub mod effect;
pub mod reducer;
pub mod roster;
pub mod source;
pub mod sprite;
pub mod sprite_backend;
pub mod state;
pub mod ui;
