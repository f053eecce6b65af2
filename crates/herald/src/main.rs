mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

use herald_core::kernel::bootstrap::Application;
use herald_core::kernel::error::Result;

/// Herald: inspect and exercise event listener configurations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the priority-ordered listeners configured for each event
    Listeners {
        /// Configuration file (.json, .yaml, .yml or .toml)
        config: PathBuf,
        /// Only show listeners of this event
        #[arg(long)]
        event: Option<String>,
    },
    /// Dispatch an event through the configured listeners
    Dispatch {
        /// Configuration file (.json, .yaml, .yml or .toml)
        config: PathBuf,
        /// Name of the event to dispatch
        event: String,
        /// Event payload entry; values are parsed as JSON, falling back to strings
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = cli::parse_param)]
        params: Vec<(String, Value)>,
    },
}

fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Commands::Listeners { config, event } => {
            let (app, config) = Application::load(&config)?;
            let wiring = cli::wire(&app, &config)?;
            cli::print_listeners(&wiring, event.as_deref())
        }
        Commands::Dispatch { config, event, params } => {
            let (app, config) = Application::load(&config)?;
            let wiring = cli::wire(&app, &config)?;
            cli::dispatch_and_report(&wiring, &event, params).map(|_| ())
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr; RUST_LOG overrides the default level.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
