//! SOS CLI
//!
//! Scriptable front end: manage the saved SOS number and fire an alert.

mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sos_config::SosConfig;
use sos_adapters::SEND_GRACE;
use sos_dispatch::{DispatchOutcome, DispatchSettings, SosSession};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "sos")]
#[command(about = "Send an SOS text with your location to a trusted contact")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $SOS_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the saved SOS number
    Number {
        #[command(subcommand)]
        command: NumberCommands,
    },

    /// Send the SOS alert now
    Send {
        /// Number to use when none is saved
        #[arg(short, long)]
        number: Option<String>,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum NumberCommands {
    /// Print the saved number
    Show,
    /// Save a new default number
    Set { number: String },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => SosConfig::default_path()?,
    };
    let config = SosConfig::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
    tracing::debug!(path = %config_path.display(), "Configuration loaded");

    match cli.command {
        Commands::Config { command } => run_config(command, &config, &config_path),
        Commands::Number { command } => run_number(command, &config).await,
        Commands::Send { number } => run_send(number, &config).await,
    }
}

fn open_session(
    config: &SosConfig,
) -> Result<(SosSession, tokio::sync::mpsc::UnboundedReceiver<sos_core::SosEvent>)> {
    let capabilities =
        sos_adapters::build_capabilities(config).context("setting up capabilities")?;
    Ok(SosSession::new(
        capabilities,
        DispatchSettings::from_config(config),
    ))
}

fn run_config(command: ConfigCommands, config: &SosConfig, path: &std::path::Path) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            print!("{}", config.to_yaml()?);
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            SosConfig::default().save_to(path)?;
            println!("Wrote default config to {}", path.display());
        }
    }
    Ok(())
}

async fn run_number(command: NumberCommands, config: &SosConfig) -> Result<()> {
    let (session, mut events) = open_session(config)?;
    match command {
        NumberCommands::Show => match session.load().await {
            Some(number) => println!("Saved SOS number: {}", number),
            None => println!("No SOS number saved"),
        },
        NumberCommands::Set { number } => {
            let saved = session.save(&number).await;
            report::print_events(&mut events);
            if saved.is_none() {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

async fn run_send(number: Option<String>, config: &SosConfig) -> Result<()> {
    let (session, mut events) = open_session(config)?;
    session.load().await;
    report::drain_quietly(&mut events);

    let outcome = session.send_sos(number.as_deref().unwrap_or("")).await;
    report::print_events(&mut events);
    report::print_outcome(&outcome);

    let settled = settle_transport(&session, &outcome, SEND_GRACE).await;
    report::print_settlement(&outcome, settled, SEND_GRACE);

    std::process::exit(report::exit_code(&outcome, settled));
}

/// Keep the runtime alive until the transport has finished with the message.
/// Exiting earlier would cancel a send the watchdog merely stopped waiting on.
async fn settle_transport(session: &SosSession, outcome: &DispatchOutcome, grace: Duration) -> bool {
    if !outcome.attempted() || session.pending_sms() == 0 {
        return true;
    }
    if matches!(outcome, DispatchOutcome::TimedOut { .. }) {
        println!(
            "Waiting up to {}s for the SMS transport to finish...",
            grace.as_secs()
        );
    }
    session.flush_sms(grace).await
}
