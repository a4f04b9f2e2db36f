// Tournament runner
//
// Usage:
//   snake-gauntlet [--config <path>]

use log::{error, info};
use std::env;
use std::process;

use snake_gauntlet::config::Config;
use snake_gauntlet::invocation::install_strategy_panic_hook;
use snake_gauntlet::leaderboard::JsonLeaderboardStore;
use snake_gauntlet::match_log::MatchLogger;
use snake_gauntlet::provider::FileChallengerProvider;
use snake_gauntlet::sandbox::StrategyRegistry;
use snake_gauntlet::tournament::TournamentController;
use snake_gauntlet::vault::DirectoryVault;

fn print_usage() {
    eprintln!("Snake Gauntlet Tournament");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  snake-gauntlet [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --config <path>         Path to Gauntlet.toml (default: Gauntlet.toml)");
    eprintln!("  --help                  Show this help message");
}

fn load_config(path: Option<&str>) -> Config {
    match path {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }),
        None => Config::load_or_default(),
    }
}

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();
    install_strategy_panic_hook();

    let args: Vec<String> = env::args().collect();
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires an argument");
                    process::exit(1);
                }
                config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Error: Unknown option '{}'", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = load_config(config_path.as_deref());
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    info!("Starting Snake Gauntlet...");

    let storage = &config.storage;
    let vault = match DirectoryVault::open(
        &storage.champions_dir,
        &storage.best_file,
        &storage.archive_extension,
    ) {
        Ok(vault) => vault,
        Err(e) => {
            error!("Could not open champion vault: {}", e);
            process::exit(1);
        }
    };
    let provider = match FileChallengerProvider::new(&storage.challenger_file) {
        Ok(provider) => provider.with_default_name(&config.gauntlet.default_challenger_name),
        Err(e) => {
            error!("Could not prepare challenger file: {}", e);
            process::exit(1);
        }
    };
    let store = JsonLeaderboardStore::new(&storage.leaderboard_file);
    let logger = MatchLogger::new(config.debug.enabled, &config.debug.log_file_path);

    let mut controller = TournamentController::new(
        &config,
        Box::new(StrategyRegistry::with_builtins()),
        Box::new(provider),
        Box::new(vault),
        Box::new(store),
    )
    .with_logger(logger);

    let ran = controller.run(config.generation_limit());
    info!(
        "Finished after {} generation(s); leaderboard holds {} champion(s)",
        ran,
        controller.leaderboard().len()
    );
}
