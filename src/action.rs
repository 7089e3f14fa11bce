use serde::{Deserialize, Serialize};

use crate::catalog::CatalogLoad;
use crate::roster::Side;
use crate::sprite::SpriteData;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    CatalogDidLoad(CatalogLoad),
    CatalogDidError(String),

    FocusNext,
    FocusPrev,

    SelectionMove(i16),
    SelectionPage(i16),
    DexSelect(usize),

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    SpriteDidLoad { name: String, sprite: SpriteData },
    SpriteDidError { name: String, error: String },

    RosterAdd(Side),
    RosterRemove(Side),
    RosterSelect { side: Side, index: usize },
    SessionReset,

    BattleStart,
    ModalDismiss,

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
