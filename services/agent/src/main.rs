//! slotwatch agent
//!
//! Loads the strategies file, resolves every demand against the upstream and
//! runs reservation rounds until everything is booked, the watchdog fires or
//! the process is interrupted.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use slotwatch_agent::config::Config;
use slotwatch_agent::dry_run::DryRun;
use slotwatch_agent::fixture::FixtureSource;
use slotwatch_agent::notify::LogNotifier;
use slotwatch_agent::system::{HostPowerControl, SimulatedPowerControl, SystemController};
use slotwatch_agent::{
    build_demands, logging, AgentContext, Registry, Scheduler, ShutdownCause, SlotSource,
    StrategiesFile, VisitTypes,
};
use slotwatch_resolve::YearWindow;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(config.log_format) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let reason = e
                .downcast_ref::<slotwatch_agent::AgentError>()
                .map(|e| e.reason_code())
                .unwrap_or("internal");
            error!(reason, error = %format!("{e:#}"), "Agent failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    info!(
        strategies_file = %config.strategies_file.display(),
        upstream_fixture = %config.upstream_fixture.display(),
        debug = config.debug,
        "Starting slotwatch agent"
    );

    let fixture = FixtureSource::load(&config.upstream_fixture)?;
    let source: Arc<dyn SlotSource>;
    let system: Arc<dyn SystemController>;
    if config.debug {
        warn!("Debug mode: reservations are not committed and power-off is simulated");
        source = Arc::new(DryRun::new(fixture));
        system = Arc::new(SimulatedPowerControl::new());
    } else {
        source = Arc::new(fixture);
        system = Arc::new(HostPowerControl);
    }

    let registry = Registry::new(source, config.providers_ttl, config.employees_ttl);
    let strategies = StrategiesFile::load(&config.strategies_file)?;
    let visit_types = VisitTypes::new(&strategies.visit_types);
    let demands = build_demands(&strategies, &registry, &visit_types, YearWindow::current()).await?;

    let ctx = Arc::new(AgentContext::new(
        registry,
        Arc::new(LogNotifier),
        visit_types,
    ));

    tokio::spawn({
        let latch = ctx.latch.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() && latch.trigger(ShutdownCause::Interrupted) {
                info!("Received shutdown signal");
            }
        }
    });

    let reason = Scheduler::new(ctx, demands, config.scheduler(), system)
        .run()
        .await?;
    info!(reason = reason.as_str(), "Agent exited");
    Ok(())
}
