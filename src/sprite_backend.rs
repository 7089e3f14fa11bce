//! Ratatui backend that paints kitty graphics on top of the cell buffer.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crossterm::{cursor::MoveTo, queue, style::Print};
use ratatui::backend::{Backend, ClearType, CrosstermBackend, WindowSize};
use ratatui::buffer::Cell;
use ratatui::layout::{Position, Size};

/// Delete every image placement on screen.
const DELETE_ALL: &str = "\x1b_Ga=d,d=a\x1b\\";

/// The detail panel shows one sprite at a time.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SpritePlacement {
    slot: Option<((u16, u16), String)>,
}

impl SpritePlacement {
    pub fn set(&mut self, x: u16, y: u16, sequence: String) {
        self.slot = Some(((x, y), sequence));
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn current(&self) -> Option<((u16, u16), String)> {
        self.slot.clone()
    }
}

type SharedPlacement = Arc<Mutex<SpritePlacement>>;

static PLACEMENT: OnceLock<SharedPlacement> = OnceLock::new();

pub fn sprite_placement() -> SharedPlacement {
    PLACEMENT
        .get_or_init(|| Arc::new(Mutex::new(SpritePlacement::default())))
        .clone()
}

fn lock(placement: &Mutex<SpritePlacement>) -> MutexGuard<'_, SpritePlacement> {
    placement
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn update_sprite(x: u16, y: u16, sequence: String) {
    lock(&sprite_placement()).set(x, y, sequence);
}

pub fn clear_sprites() {
    lock(&sprite_placement()).clear();
}

#[derive(Debug, Clone)]
pub struct SpriteBackend<W: Write> {
    inner: CrosstermBackend<W>,
    placement: SharedPlacement,
    had_sprite: bool,
}

impl<W: Write> SpriteBackend<W> {
    pub fn new(writer: W, placement: SharedPlacement) -> Self {
        Self {
            inner: CrosstermBackend::new(writer),
            placement,
            had_sprite: false,
        }
    }
}

impl<W: Write> Backend for SpriteBackend<W> {
    fn draw<'a, I>(&mut self, content: I) -> io::Result<()>
    where
        I: Iterator<Item = (u16, u16, &'a Cell)>,
    {
        self.inner.draw(content)?;
        let current = lock(&self.placement).current();
        if self.had_sprite {
            queue!(self.inner, Print(DELETE_ALL))?;
        }
        let Some(((x, y), sequence)) = current else {
            self.had_sprite = false;
            return Ok(());
        };
        queue!(self.inner, MoveTo(x, y), Print(sequence))?;
        self.had_sprite = true;
        Ok(())
    }

    fn append_lines(&mut self, n: u16) -> io::Result<()> {
        self.inner.append_lines(n)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.inner.hide_cursor()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.inner.show_cursor()
    }

    fn get_cursor_position(&mut self) -> io::Result<Position> {
        self.inner.get_cursor_position()
    }

    fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
        self.inner.set_cursor_position(position)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.inner.clear()
    }

    fn clear_region(&mut self, clear_type: ClearType) -> io::Result<()> {
        self.inner.clear_region(clear_type)
    }

    fn size(&self) -> io::Result<Size> {
        self.inner.size()
    }

    fn window_size(&mut self) -> io::Result<WindowSize> {
        self.inner.window_size()
    }

    fn flush(&mut self) -> io::Result<()> {
        Backend::flush(&mut self.inner)
    }
}

impl<W: Write> Write for SpriteBackend<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.inner)
    }
}
