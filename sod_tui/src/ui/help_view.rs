//! Help tab view

use super::section;
use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, _app: &App, area: Rect) {
    let lines = vec![
        section("Navigation"),
        key_line("1-5", "Jump to tab (Character/Spells/Auras/Log/Help)"),
        key_line("Tab / Shift+Tab", "Next/previous tab"),
        key_line("↑/k  ↓/j", "Select preset / scroll"),
        key_line("PgUp / PgDn", "Scroll a page"),
        key_line("q / Ctrl+C", "Quit"),
        key_line("?", "Toggle help"),
        Line::from(""),
        section("Running"),
        key_line("Enter / r", "Run the selected preset"),
        key_line("+ / -", "More or fewer iterations"),
        key_line("s", "Next seed"),
        Line::from(""),
        section("Reading Results"),
        Line::from(""),
        Line::from(Span::styled("DPS:", Style::default().fg(Color::Yellow))),
        Line::from("  Damage of the player and its pets over fight length,"),
        Line::from("  averaged over all iterations"),
        Line::from(""),
        Line::from(Span::styled("Spells:", Style::default().fg(Color::Yellow))),
        Line::from("  Per-iteration averages; Crit% counts direct hits and ticks"),
        Line::from(""),
        Line::from(Span::styled("Auras:", Style::default().fg(Color::Yellow))),
        Line::from("  Uptime is the share of the fight the aura was active"),
        Line::from(""),
        Line::from(Span::styled("Log:", Style::default().fg(Color::Yellow))),
        Line::from("  Every event of the first iteration (same seed, same log)"),
    ];

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Help "));

    f.render_widget(paragraph, area);
}

fn key_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {:20}", key),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(desc.to_string(), Style::default().fg(Color::White)),
    ])
}
