use chrono::NaiveDateTime;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::tui::theme;

/// Big clock, redrawn on every clock tick, over the Hijri and Gregorian dates.
pub fn render(frame: &mut Frame, area: Rect, now: NaiveDateTime, hijri: &str, location: &str) {
    let block = Block::default()
        .title(Span::styled(
            "  وقت  waqt ",
            theme::gold().add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(1)])
        .split(inner);

    let clock = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(theme::gold())
        .alignment(Alignment::Center)
        .lines(vec![now.format("%H:%M:%S").to_string().into()])
        .build();
    frame.render_widget(clock, rows[0]);

    let gregorian_str = now.format("%A, %b %d, %Y").to_string();
    let date_line = Line::from(vec![
        Span::styled(hijri, theme::amber()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(gregorian_str, theme::dim()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(location, theme::dim()),
    ]);
    frame.render_widget(
        Paragraph::new(date_line).alignment(Alignment::Center),
        rows[1],
    );
}
