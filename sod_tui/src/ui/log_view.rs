//! Log tab view - Combat log of the first iteration

use super::no_result;
use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(result) = &app.result else {
        no_result(f, area, " Combat Log ");
        return;
    };
    let Some(log) = &result.log else {
        no_result(f, area, " Combat Log ");
        return;
    };

    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = log
        .iter()
        .skip(app.scroll)
        .take(visible)
        .map(|entry| {
            let color = if entry.message.contains("crit") {
                Color::Yellow
            } else if entry.message.contains("miss") || entry.message.contains("resist") {
                Color::DarkGray
            } else {
                Color::White
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>8.2}s ", entry.time), Style::default().fg(Color::Gray)),
                Span::styled(format!("{:<18} ", entry.unit), Style::default().fg(Color::Cyan)),
                Span::styled(entry.message.clone(), Style::default().fg(color)),
            ]))
        })
        .collect();

    let title = format!(" Combat Log ({}/{}) ", (app.scroll + 1).min(log.len()), log.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}
