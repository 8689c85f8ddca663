//! slotwatch agent library
//!
//! The agent watches an appointment-booking upstream on behalf of configured
//! people and reserves the first slot that satisfies their rules.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler
//! ├── demand loop(id)      (one per configured person/provider)
//! │   └── round(item)      (one per unsettled staff category, per round)
//! └── watchdog             (auto-complete timeout)
//! ```
//!
//! Every round resolves an employee, a day and a time through the rule
//! resolver, commits the reservation and notifies the person plus anyone on
//! their notify list.
//!
//! ## Modules
//!
//! - `strategy`: TOML strategies file and demand construction
//! - `registry`: TTL-cached lookups over the upstream
//! - `target`: employee/day/time resolution with backtracking
//! - `round`: one reservation attempt
//! - `scheduler`: round cadence, completion and shutdown

pub mod config;
pub mod context;
pub mod demand;
pub mod dry_run;
pub mod error;
pub mod fixture;
pub mod logging;
pub mod notify;
pub mod registry;
pub mod round;
pub mod scheduler;
pub mod shutdown;
pub mod strategy;
pub mod system;
pub mod target;
pub mod upstream;

pub use context::AgentContext;
pub use demand::{Demand, EntriesStackItem, Entry};
pub use error::AgentError;
pub use registry::{Registry, VisitTypes};
pub use scheduler::{ExitReason, Scheduler, SchedulerConfig};
pub use shutdown::{ShutdownCause, ShutdownLatch};
pub use strategy::{build_demands, StrategiesFile};
pub use upstream::SlotSource;
