//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate, health), and their associated argument
//! structs. Every `run` flag has an environment variable equivalent for
//! container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "fleet-relay",
    version,
    about = "Fleet telemetry ingestion with partner fanout",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        fleet-relay run                                  Start on :8000, fanout off\n  \
        fleet-relay run --fanout-enabled \\\n    \
            --fanout-targets-file partners.json            Start with partner fanout\n  \
        fleet-relay validate partners.json               Check a targets file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the ingestion server
    Run(Box<RunArgs>),

    /// Validate a partner targets file without starting
    Validate(ValidateArgs),

    /// Check fanout health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        fleet-relay run -p 9000 --pretty                            Local dev mode\n  \
        FANOUT_ENABLED=true FANOUT_TARGETS_JSON='[...]' fleet-relay run  Inline targets\n  \
        fleet-relay run --redis-url redis://cache:6379               Redis store")]
pub struct RunArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// API key devices must send in the X-API-Key header
    #[arg(long, env = "API_KEY", default_value = "dev_secret", hide_env_values = true)]
    pub api_key: String,

    /// Redis connection URL for the latest-telemetry store
    #[cfg(feature = "redis")]
    #[arg(long, env = "REDIS_URL", help_heading = "Storage")]
    pub redis_url: Option<String>,

    // -- Fanout --
    /// Deliver accepted telemetry to partner targets
    #[arg(
        long,
        env = "FANOUT_ENABLED",
        default_value_t = false,
        action = clap::ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = "Fanout"
    )]
    pub fanout_enabled: bool,

    /// Per-attempt partner timeout in seconds
    #[arg(
        long,
        env = "FANOUT_TIMEOUT_SECONDS",
        default_value_t = 2.0,
        help_heading = "Fanout"
    )]
    pub fanout_timeout_seconds: f64,

    /// Retries after the first attempt
    #[arg(
        long,
        env = "FANOUT_MAX_RETRIES",
        default_value_t = 5,
        help_heading = "Fanout"
    )]
    pub fanout_max_retries: u32,

    /// Backoff base in seconds (doubles after each failed attempt)
    #[arg(
        long,
        env = "FANOUT_RETRY_BACKOFF_SECONDS",
        default_value_t = 2.0,
        help_heading = "Fanout"
    )]
    pub fanout_retry_backoff_seconds: f64,

    /// Partner targets as a JSON list
    #[arg(
        long,
        env = "FANOUT_TARGETS_JSON",
        default_value = "[]",
        hide_env_values = true,
        help_heading = "Fanout"
    )]
    pub fanout_targets_json: String,

    /// Partner targets file (.json, .yaml); overrides --fanout-targets-json
    #[arg(long, env = "FANOUT_TARGETS_FILE", help_heading = "Fanout")]
    pub fanout_targets_file: Option<PathBuf>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Observability --
    /// Sentry DSN (enables error tracking)
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_DSN", help_heading = "Observability")]
    pub sentry_dsn: Option<String>,

    /// Sentry environment tag
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_ENVIRONMENT", help_heading = "Observability")]
    pub sentry_environment: Option<String>,

    // -- Tuning --
    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 1_048_576,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Targets file to validate (.json, .yaml)
    #[arg(default_value = "targets.json")]
    pub targets: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:8000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["fleet-relay", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Some(Commands::Run(args)) => *args,
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn fanout_enabled_accepts_bare_flag_and_value() {
        assert!(run_args(&["--fanout-enabled"]).fanout_enabled);
        assert!(run_args(&["--fanout-enabled", "true"]).fanout_enabled);
        assert!(!run_args(&["--fanout-enabled", "false"]).fanout_enabled);
        assert!(run_args(&["--fanout-enabled", "TRUE"]).fanout_enabled);
    }

    #[test]
    fn fanout_values_parse() {
        let args = run_args(&[
            "--fanout-timeout-seconds",
            "0.5",
            "--fanout-max-retries",
            "2",
            "--fanout-retry-backoff-seconds",
            "0",
            "--fanout-targets-file",
            "partners.yaml",
        ]);
        assert!((args.fanout_timeout_seconds - 0.5).abs() < f64::EPSILON);
        assert_eq!(args.fanout_max_retries, 2);
        assert_eq!(args.fanout_retry_backoff_seconds, 0.0);
        assert_eq!(
            args.fanout_targets_file.as_deref(),
            Some(std::path::Path::new("partners.yaml"))
        );
    }

    #[test]
    fn negative_retries_are_rejected() {
        assert!(Cli::try_parse_from(["fleet-relay", "run", "--fanout-max-retries", "-1"]).is_err());
    }
}
