use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::MissedSummary;
use crate::tui::theme;
use crate::utils::format::{pad_display, progress_bar};

/// Missed totals per prayer over the retention window.
pub fn render(frame: &mut Frame, area: Rect, summary: &MissedSummary, retention_days: i64) {
    let block = Block::default()
        .title(Span::styled(
            format!(" Missed · {}d ", retention_days),
            theme::gold(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut content = vec![Line::from("")];
    if summary.is_empty() {
        content.push(Line::from(vec![
            Span::styled("  ", theme::dim()),
            Span::styled("Nothing missed  ✓", theme::green()),
        ]));
    } else {
        let counts = summary.by_daily_prayer();
        let worst = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);

        for (prayer, count) in counts {
            let style = if count == 0 { theme::dim() } else { theme::amber() };
            content.push(Line::from(vec![
                Span::styled(
                    format!("  {}", pad_display(prayer.display_name(), 9)),
                    theme::bold(),
                ),
                Span::styled(progress_bar(count, worst, 10), style),
                Span::styled(format!("  {}", count), style.add_modifier(Modifier::BOLD)),
            ]));
        }
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            format!("  {} total", summary.total()),
            theme::dim(),
        )));
    }

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}
