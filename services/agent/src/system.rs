//! Host power control.
//!
//! Used at most once per process, after the scheduler has stopped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

/// Host-level actions taken on shutdown.
#[async_trait]
pub trait SystemController: Send + Sync {
    /// Schedule a power-off after `grace`, broadcasting `message`.
    async fn power_off(&self, grace: Duration, message: &str) -> Result<()>;
}

/// Powers the host off with the system `shutdown` command.
#[derive(Debug, Default)]
pub struct HostPowerControl;

#[async_trait]
impl SystemController for HostPowerControl {
    async fn power_off(&self, grace: Duration, message: &str) -> Result<()> {
        // shutdown(8) schedules in whole minutes.
        let minutes = grace.as_secs().div_ceil(60);
        info!(minutes, "Scheduling host power-off");

        let status = tokio::process::Command::new("shutdown")
            .arg("-h")
            .arg(format!("+{minutes}"))
            .arg(message)
            .status()
            .await
            .context("failed to run shutdown")?;

        if !status.success() {
            anyhow::bail!("shutdown exited with {status}");
        }
        Ok(())
    }
}

/// Power control that only logs. Used in debug mode and tests.
#[derive(Debug, Default)]
pub struct SimulatedPowerControl {
    invocations: AtomicU64,
}

impl SimulatedPowerControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of power-off requests received.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SystemController for SimulatedPowerControl {
    async fn power_off(&self, grace: Duration, message: &str) -> Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        warn!(
            grace_secs = grace.as_secs(),
            message, "[SIMULATED] Host power-off skipped in debug mode"
        );
        Ok(())
    }
}
