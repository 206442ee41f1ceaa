use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::board::BoardView;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, view: &BoardView) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let next = &view.next;
    let when = match &next.countdown {
        Some(countdown) => Line::from(vec![
            Span::styled("  in  ", theme::dim()),
            Span::styled(countdown.clone(), theme::amber().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  at {}", next.start), theme::dim()),
        ]),
        None => Line::from(vec![
            Span::styled("  tomorrow at  ", theme::dim()),
            Span::styled(next.start.clone(), theme::amber().add_modifier(Modifier::BOLD)),
        ]),
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", next.prayer.display_name().to_uppercase()),
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        when,
    ];

    if view.in_forbidden_window {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            "  ⚠ Disliked time for prayer",
            theme::red(),
        )));
    }
    if view.fallback_times {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            "  Showing fallback times",
            theme::red(),
        )));
    }

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
