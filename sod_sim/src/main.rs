//! sod_sim - Headless runner for Season of Discovery class simulations
//!
//! Runs many seeded iterations of one character against the configured
//! encounter and prints a DPS summary, or the full result as JSON.
//!
//! # Usage
//!
//! ```bash
//! # A bundled character with the default encounter
//! cargo run -p sod_sim -- --preset balance_druid_60
//!
//! # Your own character, 5000 iterations, machine-readable output
//! cargo run -p sod_sim -- --config my_warlock.toml --iterations 5000 --json
//!
//! # A different boss and fight length
//! cargo run -p sod_sim -- --preset feral_druid_60 --encounter long_fight.toml
//! ```
//!
//! Logs go to stderr; results go to stdout.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use sod_classes::{build_player, PlayerConfig, PlayerPresets};
use sod_core::{default_sim_config, SimConfig, SimError, SimResult, SimRunner};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sod_sim")]
#[command(about = "Simulate a druid or warlock against a raid boss")]
#[command(version)]
struct Cli {
    /// Player TOML file
    #[arg(short, long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Bundled character (see --list-presets)
    #[arg(short, long)]
    preset: Option<String>,

    /// Encounter TOML file; defaults to the built-in raid boss
    #[arg(short, long)]
    encounter: Option<PathBuf>,

    /// Override the number of iterations
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Override the base seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the result as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Keep the first iteration's combat log (printed with --json)
    #[arg(long)]
    capture_log: bool,

    /// Print the preset names and exit
    #[arg(long)]
    list_presets: bool,

    /// Log filter, e.g. "info" or "sod_core=debug"
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if cli.list_presets {
        for name in PlayerPresets::names() {
            println!("{}", name);
        }
        return;
    }

    if let Err(e) = run(&cli) {
        error!(error = %e, "simulation failed");
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let player = load_player(cli)?;
    let sim_config = load_sim_config(cli)?;
    info!(
        player = %player.name,
        iterations = sim_config.iterations,
        seed = sim_config.seed,
        "starting"
    );

    let result = SimRunner::new(sim_config).run(|sim| build_player(sim, &player))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| SimError::InvalidConfig(format!("cannot encode result: {}", e)))?;
        println!("{}", json);
    } else {
        print_summary(&player, &result);
    }
    Ok(())
}

fn load_player(cli: &Cli) -> Result<PlayerConfig, SimError> {
    if let Some(path) = &cli.config {
        return Ok(PlayerConfig::load(path)?);
    }
    let name = cli.preset.as_deref().unwrap_or("balance_druid_60");
    PlayerPresets::get(name).ok_or_else(|| {
        SimError::InvalidConfig(format!(
            "unknown preset '{}', expected one of: {}",
            name,
            PlayerPresets::names().join(", ")
        ))
    })
}

fn load_sim_config(cli: &Cli) -> Result<SimConfig, SimError> {
    let mut config = match &cli.encounter {
        Some(path) => SimConfig::load(path)?,
        None => default_sim_config(),
    };
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.capture_log |= cli.capture_log;
    config.validate()?;
    Ok(config)
}

// === Output ===

fn print_summary(player: &PlayerConfig, result: &SimResult) {
    println!(
        "{} ({} level {})",
        player.name,
        player.class.name(),
        player.level
    );
    println!(
        "  DPS: {:.1} +/- {:.1}  (min {:.1}, max {:.1})",
        result.dps.mean, result.dps.stdev, result.dps.min, result.dps.max
    );
    println!(
        "  {} iterations, {:.1}s average fight",
        result.iterations, result.average_duration_seconds
    );

    println!();
    println!(
        "  {:<28} {:>8} {:>8} {:>7} {:>10} {:>8}",
        "Spell", "Casts", "Ticks", "Crit%", "Damage", "DPS"
    );
    let mut spells = result.spells.clone();
    spells.sort_by(|a, b| b.damage.total_cmp(&a.damage));
    for spell in &spells {
        let label = if spell.unit == player.name {
            spell.label.clone()
        } else {
            format!("{} ({})", spell.label, spell.unit)
        };
        println!(
            "  {:<28} {:>8.1} {:>8.1} {:>6.1}% {:>10.0} {:>8.1}",
            label,
            spell.casts,
            spell.ticks,
            spell.crit_percent(),
            spell.damage,
            spell.dps
        );
    }

    if !result.auras.is_empty() {
        println!();
        println!("  {:<28} {:>8} {:>8}", "Aura", "Procs", "Uptime");
        for aura in &result.auras {
            println!(
                "  {:<28} {:>8.1} {:>7.1}%",
                format!("{} ({})", aura.label, aura.unit),
                aura.activations,
                aura.uptime_percent
            );
        }
    }

    if !result.resources.is_empty() {
        println!();
        println!("  {:<28} {:>10}", "Resource", "Gained");
        for resource in &result.resources {
            println!(
                "  {:<28} {:>10.0}",
                format!("{} {:?}", resource.source, resource.kind),
                resource.gained
            );
        }
    }
}
