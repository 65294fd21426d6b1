// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relaybox - a Telegram file relay bot.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod inspect;
mod serve;
mod server;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relaybox_config::RelayboxConfig;

/// Relaybox - store files in a Telegram channel and share them by id.
#[derive(Parser, Debug)]
#[command(name = "relaybox", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot and the optional health endpoint.
    Serve,
    /// Print aggregate file statistics as JSON.
    Stats,
    /// List a user's files as JSON.
    Files {
        /// Telegram user id.
        #[arg(long)]
        user: i64,
        /// Page number, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

fn load_config(path: Option<&PathBuf>) -> RelayboxConfig {
    let loaded = match path {
        Some(path) => relaybox_config::load_and_validate_path(path),
        None => relaybox_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            relaybox_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("relaybox: use --help for available commands");
        return;
    };

    let config = load_config(cli.config.as_ref());

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Stats => inspect::run_stats(&config).await,
        Commands::Files { user, page } => inspect::run_files(&config, user, page).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_files_command() {
        let cli =
            Cli::try_parse_from(["relaybox", "files", "--user", "42", "--page", "2"]).unwrap();
        match cli.command {
            Some(Commands::Files { user, page }) => {
                assert_eq!(user, 42);
                assert_eq!(page, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_accepts_global_config_path() {
        let cli = Cli::try_parse_from(["relaybox", "stats", "--config", "/tmp/r.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/r.toml")));
        assert!(matches!(cli.command, Some(Commands::Stats)));
    }

    #[test]
    fn files_page_defaults_to_one() {
        let cli = Cli::try_parse_from(["relaybox", "files", "--user", "7"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Files { user: 7, page: 1 })));
    }
}
