//! Auras tab view

use super::{no_result, percent_bar};
use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(result) = &app.result else {
        no_result(f, area, " Auras ");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8)])
        .split(area);

    let mut lines = vec![Line::from(Span::styled(
        format!("{:<24} {:<18} {:>8}  Uptime", "Aura", "Unit", "Procs"),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))];
    for aura in result.auras.iter().skip(app.scroll) {
        let color = if aura.uptime_percent > 75.0 {
            Color::Green
        } else if aura.uptime_percent > 25.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<24} {:<18} {:>8.1}  ", aura.label, aura.unit, aura.activations),
                Style::default().fg(Color::White),
            ),
            Span::styled(percent_bar(aura.uptime_percent, 20), Style::default().fg(color)),
            Span::styled(
                format!(" {:.1}%", aura.uptime_percent),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    let auras = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Auras "));
    f.render_widget(auras, chunks[0]);

    let resources: Vec<Line> = result
        .resources
        .iter()
        .map(|r| {
            Line::from(vec![
                Span::styled(
                    format!("{:<24} {:<18}", r.source, r.unit),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("{:>10.0} {:?}", r.gained, r.kind),
                    Style::default().fg(Color::Blue),
                ),
            ])
        })
        .collect();
    let resources =
        Paragraph::new(resources).block(Block::default().borders(Borders::ALL).title(" Resources "));
    f.render_widget(resources, chunks[1]);
}
