//! Clicktoplay CLI entry point.
//!
//! Provides `run` for replaying click-to-play scenarios and `check-config`
//! for printing the effective configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use clicktoplay::config::{self, Config};
use clicktoplay::logging;
use clicktoplay::policy::ActivationPolicy;
use clicktoplay::scenario::{self, Scenario};

/// Clicktoplay — replay click-to-play activation scenarios.
#[derive(Parser)]
#[command(name = "clicktoplay", version, about)]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Replay a scenario file, or the built-in navigation scenario.
    Run {
        /// Scenario TOML file.
        #[arg(required_unless_present = "builtin", conflicts_with = "builtin")]
        scenario: Option<PathBuf>,

        /// Run the built-in navigation persistence scenario.
        #[arg(long)]
        builtin: bool,

        /// Print the report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
    /// Load the configuration and print it.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = logging::with_bootstrap(|| config::load(cli.config.as_deref()))
        .context("failed to load configuration")?;

    let _logging_guard = match &config.logging.logs_dir {
        Some(dir) => Some(logging::init_production(dir, &config.logging.level)?),
        None => {
            logging::init_cli(&config.logging.level);
            None
        }
    };

    match cli.command {
        Command::Run {
            scenario,
            builtin,
            json,
        } => {
            let scenario = match scenario {
                Some(path) => Scenario::load(&path)?,
                None if builtin => Scenario::navigation_persistence(),
                None => anyhow::bail!("pass a scenario file or --builtin"),
            };
            handle_run(&config, &scenario, json).await
        }
        Command::CheckConfig => handle_check_config(&config),
    }
}

/// Replay a scenario and report the outcome.
async fn handle_run(config: &Config, scenario: &Scenario, json: bool) -> anyhow::Result<()> {
    let policy = ActivationPolicy::new(config.policy.click_to_play);
    let report = match scenario::run(scenario, policy, &config.wait.options()).await {
        Ok(report) => report,
        Err(e) => {
            error!(scenario = %scenario.name, error = %e, "scenario failed");
            return Err(e.into());
        }
    };

    if json {
        let text = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{text}");
    } else {
        println!(
            "PASS {} ({} steps, {} plugins on final page)",
            report.name,
            report.steps_run,
            report.page.len()
        );
    }
    info!(scenario = %report.name, "done");
    Ok(())
}

/// Print the effective configuration as TOML.
fn handle_check_config(config: &Config) -> anyhow::Result<()> {
    let text = toml::to_string_pretty(config).context("failed to encode config")?;
    print!("{text}");
    Ok(())
}
