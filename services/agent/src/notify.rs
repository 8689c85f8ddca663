//! Notice delivery.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::upstream::Person;

/// Delivers a message to a person.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, person: &Person, message: &str) -> Result<()>;
}

/// Notifier that writes notices to the structured log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, person: &Person, message: &str) -> Result<()> {
        let Some(contact) = person.contact.as_deref() else {
            anyhow::bail!("{person} has no contact to notify");
        };
        info!(person = %person, contact, message, "Notice delivered");
        Ok(())
    }
}
