//! Application state

use crate::simulation::{character_sheet, run_player, CharacterSheet};
use sod_classes::{PlayerConfig, PlayerPresets};
use sod_core::{default_sim_config, SimConfig, SimResult};
use tracing::{info, warn};

/// Iteration counts the viewer steps through with +/-
const ITERATION_STEPS: [u32; 6] = [1, 10, 100, 500, 1000, 5000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Character,
    Spells,
    Auras,
    Log,
    Help,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Character, Tab::Spells, Tab::Auras, Tab::Log, Tab::Help]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Character => "Character",
            Tab::Spells => "Spells",
            Tab::Auras => "Auras",
            Tab::Log => "Log",
            Tab::Help => "Help",
        }
    }
}

pub struct App {
    pub current_tab: Tab,
    pub presets: Vec<(&'static str, PlayerConfig)>,
    pub selected_preset: usize,
    pub sim_config: SimConfig,
    pub sheet: Option<CharacterSheet>,
    pub result: Option<SimResult>,
    /// Preset the current result was produced for
    pub result_preset: Option<usize>,
    pub status: String,
    pub scroll: usize,
}

impl App {
    pub fn new() -> Self {
        let mut sim_config = default_sim_config();
        sim_config.iterations = 100;
        sim_config.capture_log = true;
        Self::with_config(sim_config)
    }

    pub fn with_config(sim_config: SimConfig) -> Self {
        let mut app = App {
            current_tab: Tab::Character,
            presets: PlayerPresets::all(),
            selected_preset: 0,
            sim_config,
            sheet: None,
            result: None,
            result_preset: None,
            status: "Press Enter to run the selected preset".to_string(),
            scroll: 0,
        };
        app.refresh_sheet();
        app
    }

    pub fn selected(&self) -> Option<&PlayerConfig> {
        self.presets.get(self.selected_preset).map(|(_, config)| config)
    }

    // === Navigation ===

    pub fn next_tab(&mut self) {
        let tabs = Tab::all();
        let idx = tabs.iter().position(|t| *t == self.current_tab).unwrap_or(0);
        self.set_tab((idx + 1) % tabs.len());
    }

    pub fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let idx = tabs.iter().position(|t| *t == self.current_tab).unwrap_or(0);
        self.set_tab((idx + tabs.len() - 1) % tabs.len());
    }

    pub fn set_tab(&mut self, index: usize) {
        if let Some(tab) = Tab::all().get(index) {
            self.current_tab = *tab;
            self.scroll = 0;
        }
    }

    pub fn toggle_help(&mut self) {
        if self.current_tab == Tab::Help {
            self.set_tab(0);
        } else {
            self.current_tab = Tab::Help;
        }
    }

    /// Up moves the preset cursor on the Character tab and scrolls elsewhere
    pub fn on_up(&mut self) {
        if self.current_tab == Tab::Character {
            if self.selected_preset > 0 {
                self.selected_preset -= 1;
                self.refresh_sheet();
            }
        } else {
            self.scroll = self.scroll.saturating_sub(1);
        }
    }

    pub fn on_down(&mut self) {
        if self.current_tab == Tab::Character {
            if self.selected_preset + 1 < self.presets.len() {
                self.selected_preset += 1;
                self.refresh_sheet();
            }
        } else {
            self.scroll = (self.scroll + 1).min(self.scroll_limit());
        }
    }

    pub fn page_down(&mut self) {
        self.scroll = (self.scroll + 20).min(self.scroll_limit());
    }

    pub fn page_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(20);
    }

    fn scroll_limit(&self) -> usize {
        let Some(result) = &self.result else {
            return 0;
        };
        let rows = match self.current_tab {
            Tab::Spells => result.spells.len(),
            Tab::Auras => result.auras.len(),
            Tab::Log => result.log.as_ref().map_or(0, |log| log.len()),
            Tab::Character | Tab::Help => 0,
        };
        rows.saturating_sub(1)
    }

    // === Simulation ===

    pub fn more_iterations(&mut self) {
        let current = self.sim_config.iterations;
        if let Some(next) = ITERATION_STEPS.iter().find(|n| **n > current) {
            self.sim_config.iterations = *next;
        }
    }

    pub fn fewer_iterations(&mut self) {
        let current = self.sim_config.iterations;
        if let Some(prev) = ITERATION_STEPS.iter().rev().find(|n| **n < current) {
            self.sim_config.iterations = *prev;
        }
    }

    pub fn next_seed(&mut self) {
        self.sim_config.seed = self.sim_config.seed.wrapping_add(1);
        self.status = format!("Seed {}", self.sim_config.seed);
    }

    /// Run the selected preset with the current settings
    pub fn run_selected(&mut self) {
        let Some(player) = self.selected().cloned() else {
            return;
        };
        match run_player(&player, &self.sim_config) {
            Ok(result) => {
                info!(player = %player.name, dps = result.dps.mean, "viewer run complete");
                self.status = format!(
                    "{}: {:.1} DPS over {} iterations",
                    player.name, result.dps.mean, result.iterations
                );
                self.result = Some(result);
                self.result_preset = Some(self.selected_preset);
                self.scroll = 0;
            }
            Err(e) => {
                warn!(player = %player.name, error = %e, "viewer run failed");
                self.status = format!("Run failed: {}", e);
            }
        }
    }

    fn refresh_sheet(&mut self) {
        let Some(player) = self.selected() else {
            self.sheet = None;
            return;
        };
        match character_sheet(player, &self.sim_config) {
            Ok(sheet) => self.sheet = Some(sheet),
            Err(e) => {
                self.status = format!("Cannot build {}: {}", player.name, e);
                self.sheet = None;
            }
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut config = default_sim_config();
        config.iterations = 1;
        config.capture_log = true;
        App::with_config(config)
    }

    #[test]
    fn test_tab_cycle() {
        let mut app = app();
        app.prev_tab();
        assert_eq!(app.current_tab, Tab::Help);
        app.next_tab();
        assert_eq!(app.current_tab, Tab::Character);
        app.toggle_help();
        assert_eq!(app.current_tab, Tab::Help);
        app.toggle_help();
        assert_eq!(app.current_tab, Tab::Character);
    }

    #[test]
    fn test_preset_cursor_refreshes_sheet() {
        let mut app = app();
        assert!(app.sheet.is_some());
        app.on_up();
        assert_eq!(app.selected_preset, 0);
        app.on_down();
        assert_eq!(app.selected_preset, 1);
        assert!(app.sheet.is_some());
    }

    #[test]
    fn test_iteration_steps() {
        let mut app = app();
        app.more_iterations();
        assert_eq!(app.sim_config.iterations, 10);
        app.fewer_iterations();
        app.fewer_iterations();
        assert_eq!(app.sim_config.iterations, 1);
    }

    #[test]
    fn test_run_fills_result_and_log() {
        let mut app = app();
        app.run_selected();
        let result = app.result.as_ref().unwrap();
        assert!(result.dps.mean > 0.0);
        assert!(result.log.is_some());
        assert_eq!(app.result_preset, Some(0));

        app.set_tab(3);
        app.on_down();
        assert_eq!(app.scroll, 1);
    }
}
