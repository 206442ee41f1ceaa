use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::time::Duration;

use crate::board::{open_board, Board, BoardView};
use crate::config::AppConfig;
use crate::models::PrayerStatus;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{header, missed, next_prayer, prayers, statusbar};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Missed,
    Help,
}

pub struct App<'c> {
    pub view: View,
    pub config: AppConfig,
    pub focus_idx: usize,
    pub should_quit: bool,
    /// Result of the last action, shown in place of the key hints.
    pub message: Option<String>,

    board: Board<'c>,
    // Refreshed on status tick/action
    pub board_view: BoardView,
    // Refreshed on clock tick
    pub now: NaiveDateTime,
}

impl<'c> App<'c> {
    pub fn new(board: Board<'c>, config: AppConfig, now: NaiveDateTime) -> Result<Self> {
        let board_view = board.view(now)?;
        Ok(App {
            view: View::Dashboard,
            config,
            focus_idx: 0,
            should_quit: false,
            message: None,
            board,
            board_view,
            now,
        })
    }

    pub fn on_clock(&mut self, now: NaiveDateTime) {
        self.now = now;
    }

    /// Periodic re-evaluation: rollover, missed detection, classification.
    pub fn on_status(&mut self, now: NaiveDateTime) {
        self.now = now;
        if let Err(e) = self.board.refresh(now) {
            log::warn!("Status refresh failed: {:#}", e);
            self.message = Some(format!("Refresh failed: {}", e));
        }
        self.reload_view();
    }

    fn reload_view(&mut self) {
        match self.board.view(self.now) {
            Ok(view) => self.board_view = view,
            Err(e) => {
                log::warn!("Could not build view: {:#}", e);
                self.message = Some(format!("Schedule error: {}", e));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: NaiveDateTime) {
        // Some terminals also report release/repeat events
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.now = now;
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key),
            View::Missed => self.handle_overlay_key(key, KeyCode::Char('s')),
            View::Help => self.handle_overlay_key(key, KeyCode::Char('?')),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Missed;
            }
            KeyCode::Up => {
                if self.focus_idx > 0 {
                    self.focus_idx -= 1;
                }
            }
            KeyCode::Down => {
                let max = self.board_view.rows.len().saturating_sub(1);
                if self.focus_idx < max {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char('m') | KeyCode::Enter | KeyCode::Char(' ') => {
                self.toggle_focused();
            }
            _ => {}
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent, toggle: KeyCode) {
        if key.code == KeyCode::Esc || key.code == toggle {
            self.view = View::Dashboard;
        }
    }

    fn toggle_focused(&mut self) {
        let Some(row) = self.board_view.rows.get(self.focus_idx) else {
            return;
        };
        let prayer = row.prayer;
        self.message = match self.board.toggle(prayer, self.now) {
            Ok(PrayerStatus::Completed) => Some(format!("✓ {} marked as prayed", prayer)),
            Ok(PrayerStatus::Missed) => Some(format!("✗ {} unmarked, counted as missed", prayer)),
            Ok(PrayerStatus::Pending) => Some(format!("○ {} unmarked", prayer)),
            Err(e) => {
                log::warn!("Toggle {} failed: {:#}", prayer, e);
                Some(format!("Could not update {}: {}", prayer, e))
            }
        };
        self.reload_view();
    }

    pub fn draw(&self, frame: &mut Frame) {
        self.draw_dashboard(frame);
        match self.view {
            View::Dashboard => {}
            View::Missed => self.draw_missed_overlay(frame),
            View::Help => self.draw_help_overlay(frame),
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            outer_chunks[0],
            self.now,
            &self.board_view.hijri,
            &self.config.salah.location_name,
        );
        statusbar::render(frame, outer_chunks[2], self.message.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        prayers::render(frame, columns[0], &self.board_view, self.focus_idx);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(10), // next prayer
                Constraint::Min(0),     // missed
            ])
            .split(columns[1]);

        next_prayer::render(frame, right_chunks[0], &self.board_view);
        missed::render(
            frame,
            right_chunks[1],
            &self.board_view.missed,
            self.config.tracker.retention_days,
        );
    }

    fn popup_area(area: Rect) -> Rect {
        Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        }
    }

    fn draw_missed_overlay(&self, frame: &mut Frame) {
        let popup_area = Self::popup_area(frame.area());
        frame.render_widget(Clear, popup_area);

        let missed = self.board.tracker().missed();
        let mut lines = vec![Line::from("")];
        if missed.is_empty() {
            lines.push(Line::from(Span::styled(
                "  ✓ No missed prayers",
                theme::green(),
            )));
        }
        for (day, prayers) in self.board.tracker().missed_days_newest_first() {
            let names: Vec<String> = prayers
                .iter()
                .map(|(p, entry)| format!("{} {}", p, entry.time))
                .collect();
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", day), theme::amber()),
                Span::styled(names.join(", "), theme::dim()),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("  [Esc] close", theme::dim())));

        let block = Block::default()
            .title(Span::styled(" Missed Prayers ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::amber())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let popup_area = Self::popup_area(frame.area());
        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [m] / Enter  ", "Mark / unmark selected prayer"),
            ("  [↑ ↓]        ", "Select prayer"),
            ("  [s]          ", "Missed prayers by day"),
            ("  [?]          ", "Toggle help"),
            ("  [Esc] / [q]  ", "Quit"),
        ];
        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::gold()),
                Span::styled(label, theme::dim()),
            ]));
        }
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "  Unmarking after a prayer's time has passed counts it as missed.",
            theme::dim(),
        )));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let now = Local::now().naive_local();
    let board = open_board(&conn, &config, now)?;
    let events = EventHandler::new(
        Duration::from_millis(config.tracker.clock_tick_ms),
        Duration::from_secs(config.tracker.status_tick_secs),
    );
    let mut app = App::new(board, config, now)?;

    let mut terminal = ratatui::init();
    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, Local::now().naive_local());
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Clock => app.on_clock(Local::now().naive_local()),
                Event::Status => app.on_status(Local::now().naive_local()),
            }
        }
    })();
    ratatui::restore();
    result
}
