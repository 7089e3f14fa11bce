use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    centered_rect, BaseStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding, SelectList,
    SelectListBehavior, SelectListProps, SelectListStyle, SelectionStyle, StatusBar,
    StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::battle::{BattleResult, Winner};
use crate::catalog::{Entry, Stat};
use crate::roster::{Side, ROSTER_CAPACITY};
use crate::sprite::{self, SpriteData};
use crate::sprite_backend;
use crate::state::{AppState, BattlePhase, FocusArea, BATTLE_STEPS, BATTLE_TICKS_PER_STEP};

const BG_BASE: Color = Color::Rgb(14, 16, 24);
const BG_PANEL: Color = Color::Rgb(24, 28, 40);
const BG_HIGHLIGHT: Color = Color::Rgb(150, 40, 48);
const TEXT_MAIN: Color = Color::Rgb(236, 238, 242);
const TEXT_DIM: Color = Color::Rgb(160, 166, 182);
const ACCENT_RED: Color = Color::Rgb(224, 72, 72);
const ACCENT_BLUE: Color = Color::Rgb(86, 156, 232);
const ACCENT_GOLD: Color = Color::Rgb(232, 184, 80);
const CELL_ASPECT: f32 = 2.0;
/// Base stats above this fill the whole bar.
const STAT_BAR_MAX: u16 = 160;
const STAT_BAR_WIDTH: usize = 16;

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PokedexComponentId {
    DexList,
    RosterA,
    RosterB,
    Search,
    Modal,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PokedexContext {
    DexList,
    Roster,
    Search,
    Modal,
}

impl EventRoutingState<PokedexComponentId, PokedexContext> for AppState {
    fn focused(&self) -> Option<PokedexComponentId> {
        if let Some(id) = self.modal() {
            return Some(id);
        }
        match self.focus {
            FocusArea::DexList => Some(PokedexComponentId::DexList),
            FocusArea::Roster(Side::A) => Some(PokedexComponentId::RosterA),
            FocusArea::Roster(Side::B) => Some(PokedexComponentId::RosterB),
        }
    }

    fn modal(&self) -> Option<PokedexComponentId> {
        if self.modal_open() {
            Some(PokedexComponentId::Modal)
        } else if self.search.active {
            Some(PokedexComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: PokedexComponentId) -> PokedexContext {
        match id {
            PokedexComponentId::DexList => PokedexContext::DexList,
            PokedexComponentId::RosterA | PokedexComponentId::RosterB => PokedexContext::Roster,
            PokedexComponentId::Search => PokedexContext::Search,
            PokedexComponentId::Modal => PokedexContext::Modal,
        }
    }

    fn default_context(&self) -> PokedexContext {
        PokedexContext::DexList
    }
}

pub struct PokedexUi {
    dex_list: SelectList,
    roster_a: SelectList,
    roster_b: SelectList,
    modal: Modal,
    status_bar: StatusBar,
}

impl Default for PokedexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl PokedexUi {
    pub fn new() -> Self {
        Self {
            dex_list: SelectList::new(),
            roster_a: SelectList::new(),
            roster_b: SelectList::new(),
            modal: Modal::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<PokedexComponentId>,
    ) {
        frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state, event_ctx);
        self.render_body(frame, layout[1], state, event_ctx);
        render_footer(frame, layout[2], state, &mut self.status_bar);

        if state.modal_open() {
            event_ctx.set_component_area(PokedexComponentId::Modal, area);
            render_modal(frame, area, state, &mut self.modal);
        }
    }

    fn render_body(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        event_ctx: &mut EventContext<PokedexComponentId>,
    ) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(28),
                Constraint::Percentage(42),
                Constraint::Percentage(30),
            ])
            .split(area);

        event_ctx.set_component_area(PokedexComponentId::DexList, columns[0]);
        render_dex_list(frame, columns[0], state, &mut self.dex_list);
        render_detail(frame, columns[1], state);

        let rosters = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[2]);
        event_ctx.set_component_area(PokedexComponentId::RosterA, rosters[0]);
        event_ctx.set_component_area(PokedexComponentId::RosterB, rosters[1]);
        render_roster(frame, rosters[0], state, Side::A, &mut self.roster_a);
        render_roster(frame, rosters[1], state, Side::B, &mut self.roster_b);
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_list_event(event, state, &mut self.dex_list)
    }

    pub fn handle_roster_event(
        &mut self,
        side: Side,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let list = match side {
            Side::A => &mut self.roster_a,
            Side::B => &mut self.roster_b,
        };
        handle_roster_event(event, state, side, list)
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state)
    }

    pub fn handle_modal_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_modal_event(event, state)
    }
}

/// Keys that work from any panel while no overlay is open.
pub fn handle_global_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    match event {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(_) if state.search.active || state.modal_open() => {
            HandlerResponse::ignored()
        }
        EventKind::Key(key) => match key.code {
            KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            KeyCode::Tab => HandlerResponse::action(Action::FocusNext),
            KeyCode::BackTab => HandlerResponse::action(Action::FocusPrev),
            KeyCode::Char('/') => HandlerResponse::action(Action::SearchStart),
            KeyCode::Char('1') => HandlerResponse::action(Action::RosterAdd(Side::A)),
            KeyCode::Char('2') => HandlerResponse::action(Action::RosterAdd(Side::B)),
            KeyCode::Char('b') => HandlerResponse::action(Action::BattleStart),
            KeyCode::Char('x') => HandlerResponse::action(Action::SessionReset),
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    }
}

pub fn handle_list_event(
    event: &EventKind,
    state: &AppState,
    dex_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::PageDown => vec![Action::SelectionPage(1)],
            KeyCode::PageUp => vec![Action::SelectionPage(-1)],
            _ => {
                let items = dex_items(state);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.selected_index.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::DexSelect,
                    render_item: &|item| item.clone(),
                };
                dex_list.handle_event(event, props).into_iter().collect()
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_roster_event(
    event: &EventKind,
    state: &AppState,
    side: Side,
    roster_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Char('d') | KeyCode::Delete => vec![Action::RosterRemove(side)],
            _ => {
                let items = roster_items(state, side);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.roster_selected(side),
                    is_focused: true,
                    style: list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: false,
                        wrap_navigation: true,
                    },
                    on_select: roster_select_for(side),
                    render_item: &|item| item.clone(),
                };
                roster_list.handle_event(event, props).into_iter().collect()
            }
        },
        EventKind::Scroll { delta, .. } => {
            let current = state.roster_selected(side) as isize;
            let index = (current + *delta as isize).max(0) as usize;
            vec![Action::RosterSelect { side, index }]
        }
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Esc => vec![Action::SearchCancel],
            KeyCode::Enter => vec![Action::SearchSubmit],
            KeyCode::Backspace => vec![Action::SearchBackspace],
            KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

/// Overlays swallow every key. A running battle can only be quit, not dismissed.
pub fn handle_modal_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    let EventKind::Key(key) = event else {
        return HandlerResponse::ignored();
    };
    let actions = match key.code {
        KeyCode::Char('q') => vec![Action::Quit],
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') if !state.battle_in_progress() => {
            vec![Action::ModalDismiss]
        }
        _ => vec![],
    };
    HandlerResponse {
        actions,
        consumed: true,
        needs_render: false,
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn select_side_a(index: usize) -> Action {
    Action::RosterSelect {
        side: Side::A,
        index,
    }
}

fn select_side_b(index: usize) -> Action {
    Action::RosterSelect {
        side: Side::B,
        index,
    }
}

fn roster_select_for(side: Side) -> fn(usize) -> Action {
    match side {
        Side::A => select_side_a,
        Side::B => select_side_b,
    }
}

fn modal_close() -> Action {
    Action::ModalDismiss
}

fn render_header(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<PokedexComponentId>,
) {
    if state.search.active {
        event_ctx.set_component_area(PokedexComponentId::Search, area);
    }
    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "press / to search".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let loaded = if state.catalog_loading {
        format!("loading {} entries...", state.catalog_limit)
    } else {
        format!("{}/{} loaded", state.catalog.len(), state.catalog_limit)
    };

    let mut status = vec![Span::styled(loaded, Style::default().fg(ACCENT_GOLD))];
    if !state.skipped.is_empty() {
        status.push(Span::raw("  "));
        status.push(Span::styled(
            format!("{} skipped", state.skipped.len()),
            Style::default().fg(ACCENT_RED),
        ));
    }
    status.push(Span::raw("  |  "));
    status.push(Span::styled(
        format!(
            "A {}/{}  B {}/{}",
            state.rosters.members(Side::A).len(),
            ROSTER_CAPACITY,
            state.rosters.members(Side::B).len(),
            ROSTER_CAPACITY
        ),
        Style::default().fg(TEXT_DIM),
    ));

    let text = Text::from(vec![
        Line::from(vec![
            Span::styled(
                "KANTO POKEDEX",
                Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  Search: "),
            Span::styled(search, Style::default().fg(ACCENT_BLUE)),
        ]),
        Line::from(status),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(panel_border().style_for_focus(state.search.active))
        .title("POKEDEX");
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_dex_list(frame: &mut Frame, area: Rect, state: &AppState, dex_list: &mut SelectList) {
    let is_focused = state.focus == FocusArea::DexList && !state.search.active;
    let block = panel_block("DEX", is_focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.catalog.is_empty() {
        let message = if state.catalog_loading {
            "Fetching pokemon..."
        } else {
            "No pokemon loaded."
        };
        frame.render_widget(dim_paragraph(message), inner);
        return;
    }

    let items = dex_items(state);
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.selected_index.min(items.len().saturating_sub(1)),
        is_focused,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::DexSelect,
        render_item: &|item| item.clone(),
    };
    dex_list.render(frame, inner, props);
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("DATA", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(6)])
        .split(inner);

    render_sprite(frame, layout[0], state);
    let text = match state.current_detail() {
        Some(entry) => detail_text(entry),
        None => Text::from(Line::styled(
            "Select a pokemon from the list or search by name.",
            Style::default().fg(TEXT_DIM),
        )),
    };
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(TEXT_MAIN)),
        layout[1],
    );
}

fn render_sprite(frame: &mut Frame, area: Rect, state: &AppState) {
    // Terminal images draw above every cell, so overlays hide the sprite.
    if !state.modal_open() {
        if let Some(sprite) = state
            .detail_name
            .as_ref()
            .and_then(|name| state.sprite_cache.get(name))
        {
            let (cols, rows) = sprite_fit(sprite, area.width, area.height);
            match sprite::kitty_sequence(sprite, cols, rows) {
                Ok(sequence) => {
                    let x = area.x.saturating_add(area.width.saturating_sub(cols) / 2);
                    let y = area.y.saturating_add(area.height.saturating_sub(rows) / 2);
                    sprite_backend::update_sprite(x, y, sequence);
                }
                Err(_) => sprite_backend::clear_sprites(),
            }
            return;
        }
    }

    sprite_backend::clear_sprites();
    let content = if state.detail_name.is_none() {
        "[no pokemon selected]"
    } else if state.sprite_loading {
        "[loading sprite]"
    } else if state.modal_open() {
        ""
    } else {
        "[no sprite]"
    };
    frame.render_widget(
        dim_paragraph(content).alignment(Alignment::Center),
        Rect {
            y: area.y.saturating_add(area.height / 2),
            height: area.height.min(1),
            ..area
        },
    );
}

fn detail_text(entry: &Entry) -> Text<'static> {
    let label = Style::default().fg(TEXT_DIM);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("#{:03} ", entry.id), Style::default().fg(ACCENT_GOLD)),
            Span::styled(
                entry.display_name(),
                Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Type    ", label),
            Span::raw(
                entry
                    .types
                    .iter()
                    .map(|kind| kind.to_ascii_uppercase())
                    .collect::<Vec<_>>()
                    .join(" / "),
            ),
        ]),
        Line::from(vec![
            Span::styled("Height  ", label),
            Span::raw(entry.height.to_string()),
            Span::styled("   Weight  ", label),
            Span::raw(entry.weight.to_string()),
        ]),
        Line::default(),
    ];
    lines.extend(entry.stats.iter().map(stat_line));
    lines.push(Line::from(vec![
        Span::styled("TOTAL ", label),
        Span::styled(
            format!("{:>3}", entry.power()),
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ),
    ]));
    Text::from(lines)
}

fn stat_line(stat: &Stat) -> Line<'static> {
    let filled = (stat.base_value.min(STAT_BAR_MAX) as usize * STAT_BAR_WIDTH
        / STAT_BAR_MAX as usize)
        .max(1);
    Line::from(vec![
        Span::styled(format!("{:<5} ", stat_label(&stat.name)), Style::default().fg(TEXT_DIM)),
        Span::raw(format!("{:>3} ", stat.base_value)),
        Span::styled("█".repeat(filled), Style::default().fg(stat_color(stat.base_value))),
    ])
}

fn stat_label(name: &str) -> String {
    match name {
        "hp" => "HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SP.A".to_string(),
        "special-defense" => "SP.D".to_string(),
        "speed" => "SPD".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

fn stat_color(value: u16) -> Color {
    match value {
        0..=59 => ACCENT_RED,
        60..=89 => ACCENT_GOLD,
        _ => Color::Rgb(96, 200, 120),
    }
}

fn render_roster(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    side: Side,
    roster_list: &mut SelectList,
) {
    let is_focused = state.focus == FocusArea::Roster(side) && !state.search.active;
    let title = format!(
        "{} ({}/{})",
        side.label().to_ascii_uppercase(),
        state.rosters.members(side).len(),
        ROSTER_CAPACITY
    );
    let block = panel_block(&title, is_focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items = roster_items(state, side);
    if items.is_empty() {
        let key = match side {
            Side::A => '1',
            Side::B => '2',
        };
        frame.render_widget(dim_paragraph(&format!("Empty. Press {key} to add.")), inner);
        return;
    }
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.roster_selected(side).min(items.len().saturating_sub(1)),
        is_focused,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: false,
            wrap_navigation: true,
        },
        on_select: roster_select_for(side),
        render_item: &|item| item.clone(),
    };
    roster_list.render(frame, inner, props);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = state.message.clone().unwrap_or_else(|| {
        if state.catalog_loading {
            "Loading pokedex...".to_string()
        } else if state.sprite_loading {
            "Loading sprite...".to_string()
        } else {
            String::new()
        }
    });
    let (left_hints, center_hints) = status_hints(state);
    let status_items = [StatusBarItem::span(Span::styled(
        status.as_str(),
        Style::default().fg(ACCENT_GOLD),
    ))];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(panel_border()),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };
    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        return (
            vec![
                StatusBarHint::new("Enter", "Find"),
                StatusBarHint::new("Esc", "Cancel"),
                StatusBarHint::new("Bksp", "Delete"),
            ],
            Vec::new(),
        );
    }
    if state.battle_in_progress() {
        return (vec![StatusBarHint::new("q", "Quit")], Vec::new());
    }
    if state.modal_open() {
        return (
            vec![StatusBarHint::new("Enter/Esc", "Close")],
            vec![StatusBarHint::new("q", "Quit")],
        );
    }

    let left = match state.focus {
        FocusArea::DexList => vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("PgUp/PgDn", "Page"),
            StatusBarHint::new("1/2", "Add to A/B"),
        ],
        FocusArea::Roster(_) => vec![
            StatusBarHint::new("j/k", "Select"),
            StatusBarHint::new("d", "Remove"),
        ],
    };
    let center = vec![
        StatusBarHint::new("Tab", "Focus"),
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("b", "Battle"),
        StatusBarHint::new("x", "Reset"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn render_modal(frame: &mut Frame, area: Rect, state: &AppState, modal: &mut Modal) {
    let (title, height) = match (&state.alert, &state.battle) {
        (Some(alert), _) => (alert.title.clone(), 9),
        (None, BattlePhase::InProgress { .. }) => ("Battle".to_string(), 9),
        (None, BattlePhase::Finished(result)) => {
            ("Battle Result".to_string(), result.pairs.len() as u16 + 8)
        }
        (None, BattlePhase::Idle) => return,
    };
    let modal_area = centered_rect(56, height, area);

    let mut render_content = |frame: &mut Frame, inner: Rect| {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);
        frame.render_widget(
            Paragraph::new(Line::styled(
                title.to_ascii_uppercase(),
                Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            layout[0],
        );

        let footer = if let Some(alert) = &state.alert {
            frame.render_widget(
                Paragraph::new(alert.message.as_str())
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                layout[1],
            );
            "Enter: OK"
        } else if let BattlePhase::InProgress { step, ticks } = state.battle {
            frame.render_widget(
                Gauge::default()
                    .gauge_style(Style::default().fg(ACCENT_RED).bg(BG_BASE))
                    .ratio(battle_progress(step, ticks))
                    .label("Battling..."),
                Rect {
                    height: layout[1].height.min(1),
                    ..layout[1]
                },
            );
            "q: Quit"
        } else if let BattlePhase::Finished(result) = &state.battle {
            frame.render_widget(
                Paragraph::new(result_text(result)).alignment(Alignment::Center),
                layout[1],
            );
            "Enter: Close"
        } else {
            ""
        };
        frame.render_widget(dim_paragraph(footer).alignment(Alignment::Center), layout[2]);
    };

    let props = ModalProps {
        is_open: true,
        is_focused: true,
        area: modal_area,
        style: modal_style(),
        behavior: ModalBehavior {
            close_on_esc: !state.battle_in_progress(),
            close_on_backdrop: false,
        },
        on_close: modal_close,
        render_content: &mut render_content,
    };
    modal.render(frame, area, props);
}

fn result_text(result: &BattleResult) -> Text<'static> {
    let verdict = match result.winner {
        Winner::Side(Side::A) => ACCENT_RED,
        Winner::Side(Side::B) => ACCENT_BLUE,
        Winner::Tie => ACCENT_GOLD,
    };
    let lines = result.summary_lines();
    let last = lines.len().saturating_sub(1);
    Text::from(
        lines
            .into_iter()
            .enumerate()
            .map(|(idx, line)| {
                if idx == last {
                    Line::styled(line, Style::default().fg(verdict).add_modifier(Modifier::BOLD))
                } else {
                    Line::from(line)
                }
            })
            .collect::<Vec<_>>(),
    )
}

pub fn battle_progress(step: u8, ticks: u16) -> f64 {
    let total = f64::from(BATTLE_STEPS) * f64::from(BATTLE_TICKS_PER_STEP);
    let done = f64::from(step) * f64::from(BATTLE_TICKS_PER_STEP) + f64::from(ticks);
    (done / total).clamp(0.0, 1.0)
}

fn dex_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .catalog
        .entries()
        .iter()
        .map(|entry| Line::from(format!("#{:03} {}", entry.id, entry.display_name())))
        .collect()
}

fn roster_items(state: &AppState, side: Side) -> Vec<Line<'static>> {
    state
        .rosters
        .entries(side, &state.catalog)
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            Line::from(format!(
                "{}. {} ({})",
                idx + 1,
                entry.display_name(),
                entry.power()
            ))
        })
        .collect()
}

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn modal_style() -> ModalStyle {
    ModalStyle {
        dim_factor: 0.6,
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_GOLD)),
            }),
            padding: Padding::all(1),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
    }
}

fn panel_border() -> BorderStyle {
    BorderStyle {
        borders: Borders::ALL,
        style: Style::default().fg(TEXT_DIM),
        focused_style: Some(Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD)),
    }
}

fn panel_block(title: &str, is_focused: bool) -> Block<'_> {
    let border = panel_border();
    Block::default()
        .title(title)
        .borders(border.borders)
        .border_style(border.style_for_focus(is_focused))
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
}

fn dim_paragraph(text: &str) -> Paragraph<'_> {
    Paragraph::new(text).style(Style::default().fg(TEXT_DIM))
}

fn sprite_fit(sprite: &SpriteData, max_cols: u16, max_rows: u16) -> (u16, u16) {
    if max_cols == 0 || max_rows == 0 || sprite.height == 0 {
        return (max_cols, max_rows);
    }
    let ratio = sprite.width as f32 / sprite.height as f32;
    let cols_for_rows = ratio * max_rows as f32 * CELL_ASPECT;
    if cols_for_rows <= max_cols as f32 {
        return ((cols_for_rows.round() as u16).max(1), max_rows);
    }
    let rows_for_cols = max_cols as f32 / (ratio * CELL_ASPECT);
    (max_cols, (rows_for_cols.round() as u16).clamp(1, max_rows))
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;
    use crate::catalog::Catalog;
    use crate::state::Alert;

    fn key(code: KeyCode) -> EventKind {
        EventKind::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn pokemon(id: u16, name: &str) -> Entry {
        Entry {
            id,
            name: name.to_string(),
            height: 7,
            weight: 69,
            types: vec!["grass".to_string(), "poison".to_string()],
            stats: vec![
                Stat {
                    name: "hp".to_string(),
                    base_value: 45,
                },
                Stat {
                    name: "attack".to_string(),
                    base_value: 49,
                },
            ],
            sprite: None,
        }
    }

    #[test]
    fn global_keys_map_to_roster_and_battle_actions() {
        let state = AppState::default();
        assert_eq!(
            handle_global_event(&key(KeyCode::Char('1')), &state).actions,
            vec![Action::RosterAdd(Side::A)]
        );
        assert_eq!(
            handle_global_event(&key(KeyCode::Char('2')), &state).actions,
            vec![Action::RosterAdd(Side::B)]
        );
        assert_eq!(
            handle_global_event(&key(KeyCode::Char('b')), &state).actions,
            vec![Action::BattleStart]
        );
    }

    #[test]
    fn global_keys_are_ignored_while_searching() {
        let mut state = AppState::default();
        state.search.active = true;
        let response = handle_global_event(&key(KeyCode::Char('q')), &state);
        assert!(response.actions.is_empty());
        assert!(!response.consumed);
    }

    #[test]
    fn modal_swallows_keys_and_dismisses_on_enter() {
        let mut state = AppState::default();
        state.alert = Some(Alert::error("Side A already has 5 pokemon"));

        let response = handle_modal_event(&key(KeyCode::Char('1')), &state);
        assert!(response.consumed);
        assert!(response.actions.is_empty());

        let response = handle_modal_event(&key(KeyCode::Enter), &state);
        assert_eq!(response.actions, vec![Action::ModalDismiss]);
    }

    #[test]
    fn running_battle_cannot_be_dismissed() {
        let mut state = AppState::default();
        state.battle = BattlePhase::InProgress { step: 2, ticks: 0 };
        assert!(handle_modal_event(&key(KeyCode::Esc), &state)
            .actions
            .is_empty());
        assert_eq!(
            handle_modal_event(&key(KeyCode::Char('q')), &state).actions,
            vec![Action::Quit]
        );
    }

    #[test]
    fn roster_delete_removes_from_that_side() {
        let state = AppState::default();
        let mut list = SelectList::new();
        let response = handle_roster_event(&key(KeyCode::Char('d')), &state, Side::B, &mut list);
        assert_eq!(response.actions, vec![Action::RosterRemove(Side::B)]);
    }

    #[test]
    fn search_typing_produces_input_actions() {
        let state = AppState::default();
        assert_eq!(
            handle_search_event(&key(KeyCode::Char('m')), &state).actions,
            vec![Action::SearchInput('m')]
        );
        assert_eq!(
            handle_search_event(&key(KeyCode::Enter), &state).actions,
            vec![Action::SearchSubmit]
        );
    }

    #[test]
    fn routing_prefers_overlays_over_panel_focus() {
        let mut state = AppState::default();
        state.focus = FocusArea::Roster(Side::B);
        assert_eq!(state.focused(), Some(PokedexComponentId::RosterB));

        state.search.active = true;
        assert_eq!(state.focused(), Some(PokedexComponentId::Search));

        state.alert = Some(Alert::error("boom"));
        assert_eq!(state.modal(), Some(PokedexComponentId::Modal));
    }

    #[test]
    fn roster_rows_show_power() {
        let mut state = AppState::default();
        state.catalog = Catalog::from_entries([pokemon(1, "bulbasaur")]);
        state
            .rosters
            .add(Side::A, &state.catalog, "bulbasaur")
            .unwrap();

        let rows = roster_items(&state, Side::A);
        assert_eq!(rows, vec![Line::from("1. Bulbasaur (94)")]);
    }

    #[test]
    fn detail_lists_types_and_total() {
        let text = detail_text(&pokemon(1, "bulbasaur"));
        let rendered: Vec<String> = text
            .lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect();
        assert_eq!(rendered[0], "#001 Bulbasaur");
        assert!(rendered[1].ends_with("GRASS / POISON"));
        assert_eq!(rendered.last().map(String::as_str), Some("TOTAL  94"));
    }

    #[test]
    fn battle_progress_reaches_one() {
        assert_eq!(battle_progress(0, 0), 0.0);
        assert_eq!(battle_progress(BATTLE_STEPS, 0), 1.0);
    }

    #[test]
    fn sprite_fit_accounts_for_cell_aspect() {
        let sprite = SpriteData {
            payload: String::new(),
            width: 200,
            height: 200,
        };
        assert_eq!(sprite_fit(&sprite, 40, 10), (20, 10));
        assert_eq!(sprite_fit(&sprite, 10, 10), (10, 5));
    }
}
