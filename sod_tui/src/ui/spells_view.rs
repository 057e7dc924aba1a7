//! Spells tab view - Per-spell breakdown of the last run

use super::{no_result, percent_bar};
use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use sod_core::metrics::SpellSummary;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(result) = &app.result else {
        no_result(f, area, " Spells ");
        return;
    };

    let mut spells: Vec<&SpellSummary> = result.spells.iter().collect();
    spells.sort_by(|a, b| b.damage.total_cmp(&a.damage));
    let total: f64 = spells.iter().map(|s| s.damage).sum();

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:<26} {:>7} {:>7} {:>6} {:>6} {:>9} {:>7}  Share",
            "Spell", "Casts", "Ticks", "Crit%", "Miss", "Damage", "DPS"
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))];

    for spell in spells.iter().skip(app.scroll) {
        let share = if total > 0.0 { spell.damage / total * 100.0 } else { 0.0 };
        let label = if spell.unit == "Imp" {
            format!("{} (Imp)", spell.label)
        } else {
            spell.label.clone()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!(
                    "{:<26} {:>7.1} {:>7.1} {:>5.1}% {:>6.1} {:>9.0} {:>7.1}  ",
                    label,
                    spell.casts,
                    spell.ticks,
                    spell.crit_percent(),
                    spell.misses,
                    spell.damage,
                    spell.dps
                ),
                Style::default().fg(Color::White),
            ),
            Span::styled(percent_bar(share, 12), Style::default().fg(Color::Red)),
            Span::styled(format!(" {:.1}%", share), Style::default().fg(Color::DarkGray)),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Spells ({:.1} DPS) ", result.dps.mean)),
    );
    f.render_widget(paragraph, area);
}
