//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::{Config, NarrationFormat};

/// Santa Claus - a coordinator, an elf pool and a reindeer fleet
#[derive(Parser)]
#[command(
    name = "sc",
    about = "Santa Claus problem simulation over counting semaphores",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the workshop until the sleigh departs or the process is interrupted
    Run(RunArgs),

    /// Print the effective configuration as YAML
    Config(RunArgs),
}

/// Overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Number of elves
    #[arg(long)]
    pub elves: Option<usize>,

    /// Elves that must gather before Santa helps them
    #[arg(long = "group-size")]
    pub group_size: Option<usize>,

    /// Number of reindeer
    #[arg(long)]
    pub reindeer: Option<usize>,

    /// Upper bound of an elf work spell in milliseconds
    #[arg(long = "max-work-ms")]
    pub max_work_ms: Option<u64>,

    /// Upper bound of a reindeer vacation in milliseconds
    #[arg(long = "max-vacation-ms")]
    pub max_vacation_ms: Option<u64>,

    /// Seed for reproducible delays
    #[arg(long)]
    pub seed: Option<u64>,

    /// Narration format (text, json)
    #[arg(short, long)]
    pub format: Option<NarrationFormat>,

    /// Disable colored narration
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl RunArgs {
    /// Apply every flag that was given to `config`
    pub fn apply(&self, config: &mut Config) {
        debug!(?self, "RunArgs::apply: called");
        if let Some(elves) = self.elves {
            config.workshop.elves = elves;
        }
        if let Some(group_size) = self.group_size {
            config.workshop.elves_per_group = group_size;
        }
        if let Some(reindeer) = self.reindeer {
            config.workshop.reindeer = reindeer;
        }
        if let Some(ms) = self.max_work_ms {
            config.pacing.max_work_ms = ms;
        }
        if let Some(ms) = self.max_vacation_ms {
            config.pacing.max_vacation_ms = ms;
        }
        if self.seed.is_some() {
            config.pacing.seed = self.seed;
        }
        if let Some(format) = self.format {
            config.narration.format = format;
        }
        if self.no_color {
            config.narration.color = false;
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("santaclaus")
        .join("logs")
        .join("santaclaus.log");
    debug!(?path, "get_log_path: returning path");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["sc"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let cli = Cli::parse_from([
            "sc",
            "run",
            "--elves",
            "6",
            "--reindeer",
            "4",
            "--seed",
            "7",
            "--format",
            "json",
            "--no-color",
        ]);
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.elves, Some(6));
        assert_eq!(args.reindeer, Some(4));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.format, Some(NarrationFormat::Json));
        assert!(args.no_color);
    }

    #[test]
    fn test_cli_parse_global_options_after_subcommand() {
        let cli = Cli::parse_from(["sc", "config", "-l", "debug", "-c", "/tmp/sc.yml"]);
        assert!(matches!(cli.command, Some(Command::Config(_))));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sc.yml")));
    }

    #[test]
    fn test_apply_only_touches_given_flags() {
        let mut config = Config::default();
        let args = RunArgs {
            group_size: Some(4),
            max_vacation_ms: Some(0),
            ..Default::default()
        };
        args.apply(&mut config);

        assert_eq!(config.workshop.elves_per_group, 4);
        assert_eq!(config.pacing.max_vacation_ms, 0);
        assert_eq!(config.workshop.elves, 9);
        assert_eq!(config.workshop.reindeer, 10);
        assert!(config.narration.color);
    }

    #[test]
    fn test_log_path_ends_with_log_file() {
        assert!(get_log_path().ends_with("santaclaus/logs/santaclaus.log"));
    }
}
