// src/main.rs
use log::{debug, info};
use std::env;
use std::error::Error;

use variant_chess::ai::picker_for;
use variant_chess::api::Api;
use variant_chess::config::Config;
use variant_chess::session::{self, GameSession};
use variant_chess::{logger, server};

fn main() -> Result<(), Box<dyn Error>> {
    let config = match Config::from_args(env::args().skip(1))? {
        Some(config) => config,
        None => {
            print_help();
            return Ok(());
        }
    };
    logger::init(config.log_level)?;
    debug!("Effective config: {:?}", config);

    let mut rng = config.rng();
    let rule = config.starting_rule.resolve(&mut rng);
    let game = GameSession::new(rule, config.shuffle_back_rank, rng);
    info!("New game under {} (AI: {})", rule, config.ai);
    debug!("Starting board:\n{}", game.board());

    let api = Api::new(session::shared(game), picker_for(config.ai, config.seed));
    server::serve(&config.bind_address(), api)?;
    Ok(())
}

fn print_help() {
    println!("\nUsage: variant_chess [--option=value ...]");
    println!("  --config=<file>           JSON file with any of the options below.");
    println!("  --host=<addr>             Interface to bind (default: 127.0.0.1).");
    println!("  --port=<n>                Port to listen on (default: 8080).");
    println!("  --log_level=<level>       off, error, warn, info, debug or trace (default: info).");
    println!("  --starting_rule=<rule>    None, PawnPromotionRule, KingQueenSpecialRule,");
    println!("                            CannonSpecialRule or Random (default: Random).");
    println!("  --ai=<picker>             greedy or random (default: greedy).");
    println!("  --seed=<n>                Seed for reproducible games.");
    println!("  --shuffle_back_rank       Shuffle the pieces between the rooks at every start.");
    println!("  --help                    Show this help message.");
    println!();
}
