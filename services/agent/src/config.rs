//! Configuration for the agent.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::scheduler::SchedulerConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => anyhow::bail!("unknown log format {other:?} (expected json or compact)"),
        }
    }
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the TOML strategies file.
    pub strategies_file: PathBuf,

    /// Path of the JSON snapshot served by the fixture upstream.
    pub upstream_fixture: PathBuf,

    /// Cadence of rounds per demand.
    pub round_interval: Duration,

    /// Stop unconditionally after this long.
    pub auto_complete_timeout: Option<Duration>,

    /// Power off the host once everything is done.
    pub shutdown_on_complete: bool,

    /// Grace period announced before power-off.
    pub shutdown_timeout: Duration,

    /// Freshness of cached provider lists.
    pub providers_ttl: Duration,

    /// Freshness of cached staff lists.
    pub employees_ttl: Duration,

    /// Dry-run commits and simulate power-off.
    pub debug: bool,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let strategies_file = lookup("SLOTWATCH_STRATEGIES_FILE")
            .unwrap_or_else(|| "strategies.toml".to_string())
            .into();

        let upstream_fixture = lookup("SLOTWATCH_UPSTREAM_FIXTURE")
            .context("SLOTWATCH_UPSTREAM_FIXTURE must be set")?
            .into();

        let round_interval =
            Duration::from_millis(parse_or(&lookup, "SLOTWATCH_ROUND_INTERVAL_MS", 10_000)?);

        let auto_complete_timeout =
            parse_opt::<u64, _>(&lookup, "SLOTWATCH_AUTO_COMPLETE_TIMEOUT_MS")?
                .map(Duration::from_millis);

        let shutdown_on_complete = parse_or(&lookup, "SLOTWATCH_SHUTDOWN_ON_COMPLETE", false)?;

        let shutdown_timeout =
            Duration::from_millis(parse_or(&lookup, "SLOTWATCH_SHUTDOWN_TIMEOUT_MS", 60_000)?);

        let providers_ttl =
            Duration::from_secs(parse_or(&lookup, "SLOTWATCH_PROVIDERS_TTL_SECS", 24 * 60 * 60)?);

        let employees_ttl =
            Duration::from_secs(parse_or(&lookup, "SLOTWATCH_EMPLOYEES_TTL_SECS", 6 * 60 * 60)?);

        let debug = parse_or(&lookup, "SLOTWATCH_DEBUG", false)?;

        let log_format = parse_or(&lookup, "SLOTWATCH_LOG_FORMAT", LogFormat::Json)?;

        Ok(Self {
            strategies_file,
            upstream_fixture,
            round_interval,
            auto_complete_timeout,
            shutdown_on_complete,
            shutdown_timeout,
            providers_ttl,
            employees_ttl,
            debug,
            log_format,
        })
    }

    /// Scheduler settings derived from this configuration.
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: self.round_interval,
            auto_complete_timeout: self.auto_complete_timeout,
            shutdown_on_complete: self.shutdown_on_complete,
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

fn parse_opt<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(Into::<anyhow::Error>::into)
            .with_context(|| format!("invalid value {raw:?} for {key}")),
        _ => Ok(None),
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}
