use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::board::{BoardView, PrayerRow};
use crate::models::{PrayerName, PrayerStatus};
use crate::tui::theme;
use crate::utils::format::pad_display;

fn row_line(row: &PrayerRow, is_focused: bool) -> Line<'static> {
    let (icon, status_style) = match row.status {
        PrayerStatus::Completed => ("●", theme::green()),
        PrayerStatus::Missed => ("✗", theme::red()),
        PrayerStatus::Pending => ("○", theme::dim()),
    };

    let status_label = if row.is_forbidden {
        "disliked time"
    } else if row.is_active && row.status == PrayerStatus::Pending {
        "now"
    } else {
        match row.status {
            PrayerStatus::Completed => "prayed",
            PrayerStatus::Missed => "missed",
            PrayerStatus::Pending => "",
        }
    };

    let name_style = if is_focused {
        theme::gold().add_modifier(Modifier::BOLD)
    } else {
        theme::bold()
    };
    let cursor = if is_focused { "▸ " } else { "  " };

    Line::from(vec![
        Span::styled(cursor, theme::gold()),
        Span::styled(pad_display(row.label, 9), name_style),
        Span::styled(pad_display(row.arabic, 8), theme::dim()),
        Span::styled(format!("{} – {}  ", row.start, row.end), theme::dim()),
        Span::styled(icon, status_style),
        Span::styled(format!("  {}", status_label), theme::dim()),
    ])
}

pub fn render(frame: &mut Frame, area: Rect, view: &BoardView, focused_idx: usize) {
    let title = format!(
        " Prayers  {}/{} ",
        view.completed_count, view.stats.total
    );
    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut items: Vec<ListItem> = Vec::with_capacity(view.rows.len() + 1);
    for (i, row) in view.rows.iter().enumerate() {
        let style = if row.is_forbidden {
            theme::forbidden_row()
        } else if row.is_active {
            theme::active_row()
        } else {
            theme::surface()
        };
        items.push(ListItem::new(row_line(row, i == focused_idx)).style(style));

        if row.prayer == PrayerName::Fajr {
            items.push(ListItem::new(Line::from(vec![
                Span::styled("  ", theme::dim()),
                Span::styled(pad_display(PrayerName::Sunrise.display_name(), 9), theme::dim()),
                Span::styled(pad_display(PrayerName::Sunrise.arabic_name(), 8), theme::dim()),
                Span::styled(view.sunrise.clone(), theme::dim()),
            ])));
        }
    }

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
