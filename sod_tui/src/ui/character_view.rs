//! Character tab view - Preset list, character sheet and DPS summary

use super::{section, stat_line};
use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use sod_core::Stat;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30), // Presets
            Constraint::Min(40),    // Sheet
            Constraint::Length(36), // Result
        ])
        .split(area);

    draw_presets(f, app, chunks[0]);
    draw_sheet(f, app, chunks[1]);
    draw_result(f, app, chunks[2]);
}

fn draw_presets(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .presets
        .iter()
        .enumerate()
        .map(|(i, (_, config))| {
            let style = if i == app.selected_preset {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let marker = if i == app.selected_preset { "> " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(config.name.clone(), style),
                Span::styled(
                    format!(" ({})", config.level),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Presets "));
    f.render_widget(list, area);
}

fn draw_sheet(f: &mut Frame, app: &App, area: Rect) {
    let Some(sheet) = &app.sheet else {
        let paragraph = Paragraph::new("  Character could not be built")
            .block(Block::default().borders(Borders::ALL).title(" Character "));
        f.render_widget(paragraph, area);
        return;
    };

    let mut lines = vec![section("Combat")];
    lines.push(stat_line("Mana", format!("{:.0}", sheet.max_mana)));
    lines.push(stat_line("Spell Crit", format!("{:.2}%", sheet.spell_crit)));
    lines.push(stat_line("Spell Hit", format!("{:.1}%", sheet.spell_hit)));
    lines.push(stat_line("Melee Crit", format!("{:.2}%", sheet.melee_crit)));
    lines.push(stat_line("Melee Hit", format!("{:.1}%", sheet.melee_hit)));
    lines.push(stat_line("Attack Power", format!("{:.0}", sheet.attack_power)));
    lines.push(Line::from(""));

    lines.push(section("Stats"));
    for (stat, value) in &sheet.stats {
        if matches!(stat, Stat::Mana | Stat::Health) {
            continue;
        }
        lines.push(stat_line(&format!("{:?}", stat), format!("{:.1}", value)));
    }
    lines.push(Line::from(""));

    lines.push(section("Spells"));
    lines.push(Line::from(Span::styled(
        sheet.spells.join(", "),
        Style::default().fg(Color::White),
    )));
    if !sheet.pets.is_empty() {
        lines.push(stat_line("Pets", sheet.pets.join(", ")));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Character "))
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_result(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![section("Last Run")];
    match (&app.result, app.result_preset) {
        (Some(result), Some(preset)) => {
            let name = app.presets.get(preset).map_or("-", |(_, p)| p.name.as_str());
            lines.push(stat_line("Preset", name.to_string()));
            lines.push(Line::from(vec![
                Span::styled(format!("{:20}", "DPS"), Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("{:.1}", result.dps.mean),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(stat_line("Std Dev", format!("{:.1}", result.dps.stdev)));
            lines.push(stat_line("Min", format!("{:.1}", result.dps.min)));
            lines.push(stat_line("Max", format!("{:.1}", result.dps.max)));
            lines.push(stat_line("Iterations", result.iterations.to_string()));
            lines.push(stat_line(
                "Fight Length",
                format!("{:.1}s", result.average_duration_seconds),
            ));
        }
        _ => lines.push(Line::from(Span::styled(
            "Not run yet",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Result "));
    f.render_widget(paragraph, area);
}
