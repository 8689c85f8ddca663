//! Process-wide shutdown latch.

use std::sync::Arc;

use tokio::sync::watch;

/// Why the process is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// Every demand completed and delivered its notices.
    AllCompleted,

    /// The auto-complete timer fired.
    WatchdogExpired,

    /// Stopped from outside, e.g. Ctrl+C.
    Interrupted,
}

impl ShutdownCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllCompleted => "all_completed",
            Self::WatchdogExpired => "watchdog_expired",
            Self::Interrupted => "interrupted",
        }
    }

    /// Human-readable message broadcast before a power-off.
    pub fn message(&self) -> &'static str {
        match self {
            Self::AllCompleted => "All demands have been completed.",
            Self::WatchdogExpired => "The auto-complete timer has expired.",
            Self::Interrupted => "slotwatch was interrupted.",
        }
    }
}

impl std::fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-way shutdown signal. The first cause wins; later triggers are ignored.
#[derive(Debug, Clone)]
pub struct ShutdownLatch {
    tx: Arc<watch::Sender<Option<ShutdownCause>>>,
}

impl ShutdownLatch {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Set the latch. Returns `true` if this call set it.
    pub fn trigger(&self, cause: ShutdownCause) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(cause);
            true
        })
    }

    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn cause(&self) -> Option<ShutdownCause> {
        *self.tx.borrow()
    }

    /// Resolves once the latch is set.
    pub async fn triggered(&self) -> ShutdownCause {
        let mut rx = self.tx.subscribe();
        loop {
            let current = *rx.borrow_and_update();
            if let Some(cause) = current {
                return cause;
            }
            if rx.changed().await.is_err() {
                // The sender lives as long as `self`.
                return std::future::pending().await;
            }
        }
    }
}

impl Default for ShutdownLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_first_cause_wins() {
        let latch = ShutdownLatch::new();
        assert!(!latch.is_set());

        assert!(latch.trigger(ShutdownCause::AllCompleted));
        assert!(!latch.trigger(ShutdownCause::Interrupted));
        assert_eq!(latch.cause(), Some(ShutdownCause::AllCompleted));
    }

    #[tokio::test]
    async fn test_triggered_wakes_waiters() {
        let latch = ShutdownLatch::new();
        let waiter = tokio::spawn({
            let latch = latch.clone();
            async move { latch.triggered().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        latch.trigger(ShutdownCause::WatchdogExpired);

        assert_eq!(waiter.await.unwrap(), ShutdownCause::WatchdogExpired);
    }

    #[tokio::test]
    async fn test_triggered_returns_immediately_when_set() {
        let latch = ShutdownLatch::new();
        latch.trigger(ShutdownCause::Interrupted);
        assert_eq!(latch.triggered().await, ShutdownCause::Interrupted);
    }
}
