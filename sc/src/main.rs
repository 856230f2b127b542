//! Santa Claus - workshop simulation
//!
//! CLI entry point: runs the workshop or prints the effective configuration.

use std::fs;

use clap::Parser;
use eyre::{Context, Result, eyre};
use tracing::{debug, info, warn};

use santaclaus::cli::{Cli, Command, get_log_path};
use santaclaus::config::Config;
use santaclaus::events::{EventBus, Narrator};
use santaclaus::simulation::Simulation;
use santaclaus::workshop::Outcome;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_thread_names(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Run(args)) => {
            debug!("main: matched Run command");
            args.apply(&mut config);
            cmd_run(&config).await
        }
        Some(Command::Config(args)) => {
            debug!("main: matched Config command");
            args.apply(&mut config);
            cmd_config(&config)
        }
        None => {
            debug!("main: no command specified, running the workshop");
            cmd_run(&config).await
        }
    }
}

/// Run the workshop until delivery, interruption or a fatal error
async fn cmd_run(config: &Config) -> Result<()> {
    debug!("cmd_run: called");
    config.validate()?;

    // handlers go in before any actor starts so an early interrupt is not lost
    let mut interrupts = Interrupts::install()?;

    let bus = EventBus::new(config.narration.channel_capacity);
    let narrator = Narrator::new(config.narration.format, config.narration.color);
    let narration = tokio::spawn(narrator.run(bus.subscribe()));

    let mut simulation = Simulation::launch(config, &bus).context("Failed to launch the workshop")?;
    info!(seed = simulation.seed(), "Workshop running");

    let ending = tokio::select! {
        outcome = simulation.wait() => {
            debug!(?outcome, "cmd_run: outcome received");
            Some(outcome)
        }
        signal = interrupts.recv() => {
            warn!(signal, "Interrupt received, shutting down");
            None
        }
    };

    simulation.shutdown();
    let joined = tokio::task::spawn_blocking(move || simulation.join())
        .await
        .context("Failed to join actor threads")?;

    // the narrator drains until the last sender is gone
    drop(bus);
    narration.await.context("Narrator task failed")?;

    match ending {
        Some(Outcome::Aborted(reason)) => Err(eyre!("Workshop aborted: {}", reason)),
        Some(Outcome::Delivered) => {
            let summary = joined?;
            info!(?summary, "Sleigh delivered");
            Ok(())
        }
        None => {
            let summary = joined?;
            info!(?summary, "Workshop interrupted");
            Ok(())
        }
    }
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}

/// Process interrupts that request orderly shutdown
struct Interrupts {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

impl Interrupts {
    fn install() -> Result<Self> {
        debug!("Interrupts::install: setting up signal handlers");
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            Ok(Self {
                sigint: signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?,
                sigterm: signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    async fn recv(&mut self) -> &'static str {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.sigint.recv() => "SIGINT",
                _ = self.sigterm.recv() => "SIGTERM",
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            "ctrl-c"
        }
    }
}
