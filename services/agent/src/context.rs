//! Shared state handed to every round.

use std::sync::Arc;

use crate::demand::AttemptCounters;
use crate::notify::Notifier;
use crate::registry::{Registry, VisitTypes};
use crate::shutdown::ShutdownLatch;

/// Explicitly constructed process context.
pub struct AgentContext {
    pub registry: Registry,
    pub notifier: Arc<dyn Notifier>,
    pub visit_types: VisitTypes,
    pub attempts: AttemptCounters,
    pub latch: ShutdownLatch,
}

impl AgentContext {
    pub fn new(registry: Registry, notifier: Arc<dyn Notifier>, visit_types: VisitTypes) -> Self {
        Self {
            registry,
            notifier,
            visit_types,
            attempts: AttemptCounters::new(),
            latch: ShutdownLatch::new(),
        }
    }
}
