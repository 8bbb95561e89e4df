// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Newsbot - a Telegram bot that delivers news on subscribed topics.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use newsbot_config::model::NewsbotConfig;

/// Newsbot - a Telegram bot that delivers news on subscribed topics.
#[derive(Parser, Debug)]
#[command(name = "newsbot", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot and the delivery scheduler.
    Serve,
    /// Validate configuration and run adapter health checks.
    Check {
        /// Also contact the Telegram API and report memory statistics.
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> NewsbotConfig {
    let loaded = match path {
        Some(path) => newsbot_config::load_and_validate_path(path),
        None => newsbot_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            newsbot_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Check { deep, plain }) => check::run_check(&config, deep, plain).await,
        None => {
            println!("newsbot: use --help for available commands");
            Ok(())
        }
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
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_check_flags() {
        let cli = Cli::try_parse_from(["newsbot", "check", "--deep", "--plain"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Check {
                deep: true,
                plain: true
            })
        ));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["newsbot", "serve", "--config", "/tmp/newsbot.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/newsbot.toml")));
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newsbot.toml");
        std::fs::write(&path, "[scheduler]\ntick_interval_secs = 30\n").unwrap();
        let config = load_config(Some(&path));
        assert_eq!(config.scheduler.tick_interval_secs, 30);
    }
}
