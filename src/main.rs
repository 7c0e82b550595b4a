//! Gear roulette headless runner.
//!
//! Runs a roulette session without a window: a simulated player presses the
//! advance input at random, and every display change and result is logged.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --seconds 20 --seed 7
//! cargo run -- --write-default-config
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::Entity;
use clap::Parser;
use gearroulette::components::roulette::SummonRequest;
use gearroulette::game::Game;
use gearroulette::presentation::PresentationSink;
use gearroulette::resources::rouletteconfig::{DEFAULT_CONFIG_PATH, RouletteConfig};
use log::info;
use rustc_hash::FxHashMap;

/// Gear roulette
#[derive(Parser)]
#[command(version, about = "Stopwatch roulette minigame, headless session runner")]
struct Cli {
    /// INI configuration file. The built-in configuration is used when the
    /// default path does not exist.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Write the built-in configuration to --config and exit.
    #[arg(long)]
    write_default_config: bool,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 30.0)]
    seconds: f32,

    /// Ticks per simulated second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed of the simulated player.
    #[arg(long)]
    seed: Option<u64>,

    /// Chance per tick that the simulated player presses advance.
    #[arg(long, default_value_t = 0.02)]
    press_chance: f32,

    /// Print the final roulette views and the tally as JSON.
    #[arg(long)]
    json: bool,
}

/// Logs what a renderer would draw, once per change.
#[derive(Default)]
struct LogSink {
    texts: FxHashMap<Entity, String>,
}

impl PresentationSink for LogSink {
    fn display_text(&mut self, entity: Entity, text: &str) {
        if self.texts.get(&entity).map(String::as_str) != Some(text) {
            info!("[{entity}] {text}");
            self.texts.insert(entity, text.to_string());
        }
    }

    fn pointer_angle(&mut self, _entity: Entity, _degrees: f32) {}

    fn summon_requested(&mut self, origin: Entity, request: &SummonRequest) {
        info!(
            "[{origin}] summon requested at offset ({}, {})",
            request.offset.x, request.offset.y
        );
    }

    fn removed(&mut self, entity: Entity) {
        info!("[{entity}] removed");
        self.texts.remove(&entity);
    }
}

fn load_config(cli: &Cli) -> Result<RouletteConfig, String> {
    if cli.config.exists() {
        return RouletteConfig::load_from_file(&cli.config).map_err(|e| e.to_string());
    }
    if cli.config == PathBuf::from(DEFAULT_CONFIG_PATH) {
        info!("No config at {:?}, using built-in configuration", cli.config);
        return Ok(RouletteConfig::builtin());
    }
    Err(format!("config file {:?} does not exist", cli.config))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Early-exit: write the built-in configuration and quit
    if cli.write_default_config {
        let mut config = RouletteConfig::builtin();
        config.config_path = cli.config.clone();
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Default config written to {}", cli.config.display());
        return;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let mut game = match Game::new(&config) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let fps = cli.fps.max(1);
    let dt = 1.0 / fps as f32;
    let frames = (cli.seconds.max(0.0) * fps as f32).round() as u64;
    let mut rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut sink = LogSink::default();

    info!("Running {frames} ticks at {fps} fps");
    for _ in 0..frames {
        if rng.f32() < cli.press_chance {
            game.advance_input(None);
        }
        let messages = game.tick(dt);
        game.present(&messages, &mut sink);
    }

    let tally = game.session().tally;
    info!(
        "Session over: {} stop(s), {} miss(es), {} damage, {} healed, {} summon(s)",
        tally.stops, tally.misses, tally.attack_total, tally.heal_total, tally.summons_requested
    );

    if cli.json {
        let report = serde_json::json!({
            "roulettes": game.views(),
            "tally": tally,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    game.teardown(None);
}
