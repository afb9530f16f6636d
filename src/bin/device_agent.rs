//! # Device Agent
//!
//! Runs the agent against the simulated network link and management service.

use anyhow::Context;
use clap::{Parser, Subcommand};
use device_agent::actuator::{ActuatorHandler, VirtualOutput};
use device_agent::config::{AgentConfig, ConfigManager};
use device_agent::coordinator::RegistrationCoordinator;
use device_agent::logging::init_structured_logging;
use device_agent::resources::ReferenceResources;
use device_agent::sim::{SimulatedClient, SimulatedLink};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "device-agent")]
#[command(about = "Connect, declare resources and register with the management service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment whose overrides are applied (development, test, production)
    #[arg(short, long)]
    environment: Option<String>,

    /// Configuration directory path (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the agent (default)
    Run,

    /// Print the resolved configuration as JSON and exit
    CheckConfig,
}

fn main() {
    let cli = Cli::parse();
    if let Some(environment) = &cli.environment {
        std::env::set_var("DEVICE_AGENT_ENV", environment);
    }
    init_structured_logging();

    let manager = match load_config(&cli) {
        Ok(manager) => manager,
        Err(err) => {
            error!(error = %err, "Configuration could not be loaded");
            eprintln!("❌ {err}");
            process::exit(6);
        }
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::CheckConfig => match render_config(manager.config()) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => {
                eprintln!("❌ {err:#}");
                process::exit(1);
            }
        },
        Commands::Run => {
            let config = manager.config().clone();
            let actuator = Arc::new(ActuatorHandler::new(VirtualOutput::new("led1")));
            let resources = ReferenceResources::new(actuator, config.resources.initial_blink_pattern.as_str())
                .with_button_interval(config.resources.button_interval());
            let link = SimulatedLink::from_config(&config.simulation);
            let client = SimulatedClient::from_config(&config.simulation);

            let coordinator = RegistrationCoordinator::new(config, link, client, resources);
            match coordinator.run() {
                Ok(never) => match never {},
                Err(err) => {
                    error!(error = %err, exit_code = err.exit_code(), "Device agent stopped");
                    process::exit(err.exit_code());
                }
            }
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Arc<ConfigManager>> {
    let manager = match &cli.environment {
        Some(environment) => {
            ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)
        }
        None => ConfigManager::load_from_directory(cli.config_dir.clone()),
    };
    manager.context("loading agent configuration")
}

fn render_config(config: &AgentConfig) -> anyhow::Result<String> {
    serde_json::to_string_pretty(config).context("serializing configuration")
}
