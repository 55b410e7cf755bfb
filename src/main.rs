use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use changeling::{
    Engine, TurnOutcome,
    config::GameConfig,
    scripted_input::{Command, ScriptedInput},
};

#[derive(Parser)]
#[command(name = "changeling")]
#[command(about = "Run the roguelike simulation headless from a keystroke script")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the config's RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Keystroke script to play; without one the player just waits
    #[arg(long)]
    script: Option<PathBuf>,

    /// Stop after this many consumed turns
    #[arg(long, default_value_t = 200)]
    turns: u64,

    /// Print the run history as JSON when done
    #[arg(long)]
    history_json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match GameConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut script = match &cli.script {
        Some(path) => match ScriptedInput::from_file(path) {
            Ok(script) => Some(script),
            Err(e) => {
                eprintln!("Cannot read script {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let mut engine = match Engine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Floor generation failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut consumed = 0;
    while consumed < cli.turns && engine.ecs.player_alive() {
        let command = match script.as_mut() {
            Some(script) => match script.next_command() {
                Some(command) => command,
                None => break,
            },
            None => Command::Wait,
        };
        if command == Command::Quit {
            break;
        }
        let perceived = engine.perceived_actors();
        let Some(action) = command.to_action(&engine.ecs, &perceived) else {
            continue;
        };
        match engine.handle_player_action(&action) {
            Ok(TurnOutcome::Consumed) => consumed += 1,
            Ok(TurnOutcome::Rejected(_)) => {}
            Err(e) => {
                eprintln!("Floor generation failed: {}", e);
                std::process::exit(1);
            }
        }
    }
    info!(turns = consumed, floor = engine.map.floor_number(), "run finished");

    for message in engine.ecs.messages() {
        println!("[{:>4}] {}", message.turn, message.text);
    }
    println!(
        "Floor {}, turn {}, {}",
        engine.map.floor_number(),
        engine.ecs.turn,
        if engine.ecs.player_alive() {
            "still standing"
        } else {
            "dead"
        }
    );

    if cli.history_json {
        match engine.history_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Cannot serialize history: {}", e);
                std::process::exit(1);
            }
        }
    }
}
