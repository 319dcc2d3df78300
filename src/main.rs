#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use log::LevelFilter;
#[cfg(feature = "std")]
use seabattle::{init_logging, Server, ServerConfig, BOT_MAX_DELAY_MS, BOT_MIN_DELAY_MS};
#[cfg(feature = "std")]
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Run the game server.
    Serve {
        #[arg(long, env = "SEABATTLE_BIND", default_value = "0.0.0.0:3000")]
        bind: String,
        #[arg(long, env = "SEABATTLE_BOT_MIN_DELAY_MS", default_value_t = BOT_MIN_DELAY_MS)]
        bot_min_delay_ms: u64,
        #[arg(long, env = "SEABATTLE_BOT_MAX_DELAY_MS", default_value_t = BOT_MAX_DELAY_MS)]
        bot_max_delay_ms: u64,
        #[arg(long, env = "SEABATTLE_SEED", help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, help = "Log level (error, warn, info, debug, trace); overrides SEABATTLE_LOG")]
        log_level: Option<LevelFilter>,
    },
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            bot_min_delay_ms,
            bot_max_delay_ms,
            seed,
            log_level,
        } => {
            init_logging(log_level);
            let config = ServerConfig {
                bind,
                bot_min_delay: Duration::from_millis(bot_min_delay_ms),
                bot_max_delay: Duration::from_millis(bot_max_delay_ms),
                seed,
            };
            if let Some(s) = config.seed {
                log::info!("Using fixed seed: {} (games will be reproducible)", s);
            }
            let server = Server::bind(&config).await?;
            server.run().await?;
        }
    }
    Ok(())
}
