//! Player: the terminal surface projects are mounted on.
//!
//! The player owns the terminal: it hosts the application's view, drives the
//! runner's ticker in real time and writes each rendered frame as cell diffs.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::{cursor, execute, queue, style, terminal};

use crate::renderer::{Surface, diff};
use crate::runner::Runner;
use crate::types::{Cell, Color, NamedColor, Style, TerminalContract};

/// Rows reserved above the view for key hints.
const CANVAS_OFFSET: u16 = 1;
/// Hint row plus status row.
const RESERVED_ROWS: u16 = 2;

const HINTS: &[&str] = &["[q][Esc] quit", "[Space] pause", "[→] step"];

pub struct Player {
    stdout: io::Stdout,
    mounted: bool,
    view: TerminalContract,
    grid: Vec<Vec<Cell>>,
    paused: bool,
    ticks: u64,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            mounted: false,
            view: TerminalContract { width: 0, height: 0 },
            grid: Vec::new(),
            paused: false,
            ticks: 0,
        }
    }

    /// Drive `runner` until the user quits.
    ///
    /// The runner must already be running with its renderer mounted here.
    pub fn play(&mut self, runner: &mut Runner) -> Result<()> {
        let frame_millis = runner.host().frame_millis();
        let frame = Duration::from_secs_f64(frame_millis / 1000.0);
        let status_style = runner
            .renderer()
            .map(|app| app.borrow().defaults.html_text_style.to_style())
            .unwrap_or_default();

        self.render_hints(&status_style)?;
        self.present(runner, true)?;
        self.render_status(&status_style)?;

        let mut last = Instant::now();
        loop {
            let mut full = false;
            if event::poll(frame)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char(' ') => self.paused = !self.paused,
                        KeyCode::Right if self.paused => {
                            runner.tick(1.0)?;
                            self.ticks += 1;
                        }
                        _ => {}
                    },
                    Event::Resize(_, _) => {
                        queue!(self.stdout, terminal::Clear(terminal::ClearType::All))?;
                        self.render_hints(&status_style)?;
                        full = true;
                    }
                    _ => {}
                }
            }

            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;
            if !self.paused {
                runner.tick(elapsed.as_secs_f64() * 1000.0 / frame_millis)?;
                self.ticks += 1;
            }

            self.present(runner, full)?;
            self.render_status(&status_style)?;
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn present(&mut self, runner: &Runner, full: bool) -> Result<()> {
        let Some(next) = runner.render() else {
            return Ok(());
        };
        let same_shape = self.grid.len() == next.len()
            && self.grid.first().map(Vec::len) == next.first().map(Vec::len);

        if full || !same_shape {
            for (y, row) in next.iter().enumerate() {
                queue!(self.stdout, cursor::MoveTo(0, y as u16 + CANVAS_OFFSET))?;
                for cell in row {
                    let cs = to_content_style(&cell.style);
                    queue!(
                        self.stdout,
                        style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
                    )?;
                }
            }
        } else {
            for change in diff(&self.grid, &next) {
                let cs = to_content_style(&change.cell.style);
                queue!(
                    self.stdout,
                    cursor::MoveTo(change.x, change.y + CANVAS_OFFSET),
                    style::PrintStyledContent(style::StyledContent::new(cs, change.cell.ch)),
                )?;
            }
        }
        self.stdout.flush()?;
        self.grid = next;
        Ok(())
    }

    /// Key hints with the key names bold and the labels in `text`.
    fn render_hints(&mut self, text: &Style) -> Result<()> {
        let label = to_content_style(text);
        let mut key = label;
        key.attributes.set(style::Attribute::Bold);
        key.attributes.unset(style::Attribute::Dim);

        queue!(
            self.stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(" "),
        )?;
        for (i, hint) in HINTS.iter().enumerate() {
            if i > 0 {
                queue!(self.stdout, style::Print("  "))?;
            }
            let (keys, rest) = match hint.rfind(']') {
                Some(close) => hint.split_at(close + 1),
                None => ("", *hint),
            };
            queue!(
                self.stdout,
                style::PrintStyledContent(style::StyledContent::new(key, keys)),
                style::PrintStyledContent(style::StyledContent::new(label, rest)),
            )?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn render_status(&mut self, text: &Style) -> Result<()> {
        let status_y = self.view.height + CANVAS_OFFSET;
        let (_, term_h) = terminal::size()?;
        if status_y >= term_h {
            return Ok(());
        }

        let status = format!(
            " tick {} | {}x{} cells{} ",
            self.ticks,
            self.view.width,
            self.view.height,
            if self.paused { " | paused" } else { "" },
        );

        queue!(
            self.stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(to_content_style(text), status)),
        )?;
        self.stdout.flush()?;
        Ok(())
    }

    fn restore(&mut self) {
        if self.mounted {
            let _ = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
            self.mounted = false;
        }
    }
}

impl Surface for Player {
    fn size(&self) -> crate::error::Result<(u16, u16)> {
        let (w, h) = terminal::size()?;
        Ok((w, h.saturating_sub(RESERVED_ROWS)))
    }

    fn mount(&mut self, view: TerminalContract) -> crate::error::Result<()> {
        if !self.mounted {
            terminal::enable_raw_mode()?;
            execute!(self.stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
            self.mounted = true;
        }
        execute!(self.stdout, terminal::Clear(terminal::ClearType::All))?;
        self.view = view;
        self.grid.clear();
        log::debug!("mounted {}x{} view on the terminal", view.width, view.height);
        Ok(())
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.restore();
    }
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}
