use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tracing_subscriber::{prelude::*, EnvFilter};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex::action::Action;
use pokedex::api::{self, PokeApiSource, API_BASE};
use pokedex::catalog::{Catalog, CATALOG_SIZE};
use pokedex::effect::Effect;
use pokedex::reducer::reducer;
use pokedex::roster::Side;
use pokedex::sprite;
use pokedex::sprite_backend::{self, SpriteBackend};
use pokedex::state::{AppState, TICK_MS};
use pokedex::ui::{self, PokedexComponentId, PokedexContext, PokedexUi};

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Kanto pokedex with two-side roster battles")]
struct Args {
    /// Number of pokemon to fetch, starting at #001
    #[arg(long, default_value_t = CATALOG_SIZE, value_parser = clap::value_parser!(u16).range(1..=1025))]
    limit: u16,

    /// PokeAPI base URL
    #[arg(long, default_value = API_BASE)]
    api_base: String,

    /// Write tracing output to this file (RUST_LOG sets the filter)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    tracing::info!(limit = args.limit, api_base = %args.api_base, "starting pokedex");

    let source = Arc::new(PokeApiSource::new(args.api_base.clone()));
    let limit = args.limit;
    let debug = DebugSession::new(args.debug);
    let state = debug
        .load_state_or_else_async(|| async move { Ok::<AppState, io::Error>(AppState::new(limit)) })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = SpriteBackend::new(stdout, sprite_backend::sprite_placement());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, source).await;

    if use_alt_screen {
        sprite_backend::clear_sprites();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

/// File-only subscriber; the terminal belongs to the UI.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Arc::new(file));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    source: Arc<PokeApiSource>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(PokedexUi::new()));
    let mut bus: EventBus<AppState, Action, PokedexComponentId, PokedexContext> = EventBus::new();
    let keybindings: Keybindings<PokedexContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(PokedexComponentId::DexList, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_roster_a = Rc::clone(&ui);
    bus.register(PokedexComponentId::RosterA, move |event, state| {
        ui_roster_a
            .borrow_mut()
            .handle_roster_event(Side::A, &event.kind, state)
    });

    let ui_roster_b = Rc::clone(&ui);
    bus.register(PokedexComponentId::RosterB, move |event, state| {
        ui_roster_b
            .borrow_mut()
            .handle_roster_event(Side::B, &event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(PokedexComponentId::Search, move |event, state| {
        ui_search.borrow_mut().handle_search_event(&event.kind, state)
    });

    let ui_modal = Rc::clone(&ui);
    bus.register(PokedexComponentId::Modal, move |event, state| {
        ui_modal.borrow_mut().handle_modal_event(&event.kind, state)
    });

    bus.register_global(|event, state| ui::handle_global_event(&event.kind, state));

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            |effect, ctx| handle_effect(effect, ctx, &source),
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, source: &Arc<PokeApiSource>) {
    match effect {
        Effect::LoadCatalog { limit } => {
            let source = Arc::clone(source);
            ctx.tasks().spawn(TaskKey::new("catalog"), async move {
                match Catalog::populate(source.as_ref(), limit).await {
                    Ok(load) => Action::CatalogDidLoad(load),
                    Err(error) => Action::CatalogDidError(error.to_string()),
                }
            });
        }
        Effect::LoadSprite { name, url } => {
            let key = format!("sprite_{name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                let decoded = match api::fetch_bytes(&url).await {
                    Ok(bytes) => sprite::decode_sprite(&bytes),
                    Err(error) => Err(error),
                };
                match decoded {
                    Ok(sprite) => Action::SpriteDidLoad { name, sprite },
                    Err(error) => {
                        tracing::warn!(%name, %error, "sprite load failed");
                        Action::SpriteDidError { name, error }
                    }
                }
            });
        }
    }
}
