//! Round scheduler.
//!
//! The scheduler:
//! - Runs one supervisor task per demand
//! - Per round, runs one task per unsettled item and joins them all
//! - Schedules the next round `interval` after the previous one started
//! - Stops when every demand has settled, on the watchdog, or on request
//! - Optionally powers the host off once stopped

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::context::AgentContext;
use crate::demand::Demand;
use crate::error::AgentError;
use crate::round::execute_round;
use crate::shutdown::ShutdownCause;
use crate::system::SystemController;

/// Why [`Scheduler::run`] returned.
pub type ExitReason = ShutdownCause;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Cadence of rounds per demand.
    pub interval: Duration,

    /// Stop unconditionally after this long.
    pub auto_complete_timeout: Option<Duration>,

    /// Power the host off after completion or watchdog expiry.
    pub shutdown_on_complete: bool,

    /// Grace period before power-off.
    pub shutdown_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            auto_complete_timeout: None,
            shutdown_on_complete: false,
            shutdown_timeout: Duration::from_secs(60),
        }
    }
}

/// Drives every demand to completion.
pub struct Scheduler {
    ctx: Arc<AgentContext>,
    demands: Arc<[Arc<Demand>]>,
    config: SchedulerConfig,
    system: Arc<dyn SystemController>,
}

impl Scheduler {
    pub fn new(
        ctx: Arc<AgentContext>,
        demands: Vec<Demand>,
        config: SchedulerConfig,
        system: Arc<dyn SystemController>,
    ) -> Self {
        Self {
            ctx,
            demands: demands.into_iter().map(Arc::new).collect(),
            config,
            system,
        }
    }

    /// Run until shutdown.
    pub async fn run(self) -> Result<ExitReason, AgentError> {
        if self.demands.is_empty() {
            warn!("No demands configured; add at least one [[strategy]] to the strategies file");
            return Err(AgentError::NoDemands);
        }

        info!(
            demands = self.demands.len(),
            interval_ms = self.config.interval.as_millis() as u64,
            auto_complete_timeout_ms = ?self.config.auto_complete_timeout.map(|t| t.as_millis()),
            "Starting round scheduler"
        );

        let mut tasks = JoinSet::new();
        for demand in self.demands.iter() {
            tasks.spawn(run_demand(
                Arc::clone(&self.ctx),
                Arc::clone(demand),
                Arc::clone(&self.demands),
                self.config.interval,
            ));
        }

        let watchdog = self.config.auto_complete_timeout.map(|timeout| {
            let latch = self.ctx.latch.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(timeout) => {
                        if latch.trigger(ShutdownCause::WatchdogExpired) {
                            info!(timeout_ms = timeout.as_millis() as u64, "Auto-complete timer expired");
                        }
                    }
                    _ = latch.triggered() => {}
                }
            })
        });

        let cause = self.ctx.latch.triggered().await;
        info!(cause = %cause, "Shutdown requested, waiting for in-flight rounds");

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Demand task panicked");
            }
        }
        if let Some(watchdog) = watchdog {
            watchdog.abort();
        }

        self.power_off(cause).await;

        info!(cause = %cause, "Round scheduler stopped");
        Ok(cause)
    }

    async fn power_off(&self, cause: ShutdownCause) {
        if !self.config.shutdown_on_complete || cause == ShutdownCause::Interrupted {
            return;
        }

        let grace = self.config.shutdown_timeout;
        let message = format!(
            "{} The host will power off in {} seconds.",
            cause.message(),
            grace.as_secs()
        );
        if let Err(e) = self.system.power_off(grace, &message).await {
            error!(error = %format!("{e:#}"), "Failed to schedule host power-off");
            return;
        }

        let mut remaining = grace.as_secs();
        while remaining > 0 {
            warn!(remaining_secs = remaining, "Host will power off");
            tokio::time::sleep(Duration::from_secs(1)).await;
            remaining -= 1;
        }
    }
}

/// Supervisor loop for one demand.
async fn run_demand(
    ctx: Arc<AgentContext>,
    demand: Arc<Demand>,
    all: Arc<[Arc<Demand>]>,
    interval: Duration,
) {
    debug!(demand_id = %demand.id(), person = %demand.person(), "Demand loop started");

    loop {
        if ctx.latch.is_set() {
            break;
        }

        let started = Instant::now();
        let mut round = JoinSet::new();
        for item in demand.items_needing_work().await {
            let ctx = Arc::clone(&ctx);
            let demand = Arc::clone(&demand);
            round.spawn(async move {
                let outcome = execute_round(&ctx, &demand, &item).await;
                (item.id(), outcome)
            });
        }
        while let Some(result) = round.join_next().await {
            match result {
                Ok((item_id, outcome)) => debug!(
                    demand_id = %demand.id(),
                    item_id = %item_id,
                    outcome = outcome.as_str(),
                    "Round settled"
                ),
                Err(e) => error!(demand_id = %demand.id(), error = %e, "Round task panicked"),
            }
        }

        if ctx.latch.is_set() {
            break;
        }

        if demand.is_settled().await {
            info!(demand_id = %demand.id(), person = %demand.person(), "Demand completed");
            if all_settled(&all).await && ctx.latch.trigger(ShutdownCause::AllCompleted) {
                info!("All demands completed");
            }
            break;
        }

        let delay = interval.saturating_sub(started.elapsed());
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = ctx.latch.triggered() => break,
        }
    }

    debug!(demand_id = %demand.id(), "Demand loop stopped");
}

async fn all_settled(demands: &[Arc<Demand>]) -> bool {
    for demand in demands {
        if !demand.is_settled().await {
            return false;
        }
    }
    true
}
