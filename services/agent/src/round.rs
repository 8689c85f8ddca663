//! One round for one demand item: resolve, commit, notify.

use anyhow::Result;
use futures_util::future::join_all;
use slotwatch_id::ReservationId;
use tracing::{error, info, warn};

use crate::context::AgentContext;
use crate::demand::{Demand, EntriesStackItem, Notice};
use crate::target::{resolve_target, Target};
use crate::upstream::Reservation;

/// Result of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Shutdown was requested; nothing was done or the result was discarded.
    Skipped,

    /// The category has no staff at the provider.
    NoEmployees,

    /// No entry resolved a target this round.
    NoTarget,

    /// The upstream declined the reservation.
    Rejected,

    /// Committed and every notice delivered.
    Completed,

    /// Committed, but some notices are queued for redelivery.
    NotificationFailed { undelivered: usize },

    /// Previously queued notices were delivered.
    Redelivered,

    /// A collaborator call failed.
    Failed(String),
}

impl RoundOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::NoEmployees => "no_employees",
            Self::NoTarget => "no_target",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::NotificationFailed { .. } => "notification_failed",
            Self::Redelivered => "redelivered",
            Self::Failed(_) => "failed",
        }
    }
}

/// Execute one round for `item`. Never fails; errors become [`RoundOutcome::Failed`].
pub async fn execute_round(
    ctx: &AgentContext,
    demand: &Demand,
    item: &EntriesStackItem,
) -> RoundOutcome {
    if ctx.latch.is_set() {
        return RoundOutcome::Skipped;
    }

    let attempt = ctx.attempts.increment(demand.attempt_key(item)).await;

    if item.is_completed() {
        return redeliver(ctx, demand, item).await;
    }

    match reserve(ctx, demand, item, attempt).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let message = format!("{e:#}");
            error!(
                demand_id = %demand.id(),
                item_id = %item.id(),
                category = %item.category().name,
                attempt,
                error = %message,
                "Round failed"
            );
            RoundOutcome::Failed(message)
        }
    }
}

async fn reserve(
    ctx: &AgentContext,
    demand: &Demand,
    item: &EntriesStackItem,
    attempt: u64,
) -> Result<RoundOutcome> {
    let category = item.category();
    let employees = ctx
        .registry
        .employees_by_category(demand.provider(), category)
        .await?;
    if employees.is_empty() {
        warn!(
            demand_id = %demand.id(),
            item_id = %item.id(),
            category = %category.name,
            provider = %demand.provider().name,
            booking_url = demand.provider().booking_url.as_deref().unwrap_or_default(),
            "No staff found in category; check the category name against the provider's listing"
        );
        return Ok(RoundOutcome::NoEmployees);
    }

    let mut target = None;
    for entry in item.entries() {
        if let Some(found) = resolve_target(ctx, &employees, entry, &ctx.visit_types).await? {
            target = Some(found);
            break;
        }
    }

    if ctx.latch.is_set() {
        return Ok(RoundOutcome::Skipped);
    }

    let Some(Target {
        employee,
        day,
        time,
    }) = target
    else {
        info!(
            demand_id = %demand.id(),
            item_id = %item.id(),
            category = %category.name,
            person = %demand.person(),
            attempt,
            "No suitable slots"
        );
        return Ok(RoundOutcome::NoTarget);
    };

    info!(
        demand_id = %demand.id(),
        item_id = %item.id(),
        category = %category.name,
        person = %demand.person(),
        attempt,
        employee = %employee.name,
        day = %day.value,
        time = %time.value,
        "Suitable slot found"
    );

    let reservation = Reservation {
        id: ReservationId::new(),
        person: demand.person().clone(),
        provider: demand.provider().clone(),
        employee,
        day,
        time,
        attempt,
    };

    if !ctx
        .registry
        .source()
        .commit_reservation(&reservation)
        .await?
    {
        warn!(
            demand_id = %demand.id(),
            item_id = %item.id(),
            reservation_id = %reservation.id,
            attempt,
            "Reservation declined upstream"
        );
        return Ok(RoundOutcome::Rejected);
    }

    item.complete();
    info!(
        demand_id = %demand.id(),
        item_id = %item.id(),
        reservation_id = %reservation.id,
        category = %category.name,
        person = %reservation.person,
        employee = %reservation.employee.name,
        day = %reservation.day.value,
        time = %reservation.time.value,
        attempt,
        "Reservation committed"
    );

    let undelivered = deliver(ctx, notices_for(demand, item, &reservation)).await;
    if undelivered.is_empty() {
        return Ok(RoundOutcome::Completed);
    }
    let count = undelivered.len();
    item.defer(undelivered).await;
    Ok(RoundOutcome::NotificationFailed { undelivered: count })
}

async fn redeliver(ctx: &AgentContext, demand: &Demand, item: &EntriesStackItem) -> RoundOutcome {
    let undelivered = deliver(ctx, item.take_outbox().await).await;
    if undelivered.is_empty() {
        info!(
            demand_id = %demand.id(),
            item_id = %item.id(),
            "Pending notices delivered"
        );
        return RoundOutcome::Redelivered;
    }
    let count = undelivered.len();
    item.defer(undelivered).await;
    RoundOutcome::NotificationFailed { undelivered: count }
}

fn notices_for(demand: &Demand, item: &EntriesStackItem, reservation: &Reservation) -> Vec<Notice> {
    let slot = format!(
        "{} on {} at {} ({}, {})",
        reservation.employee.name,
        reservation.day.value,
        reservation.time.value,
        item.category().name,
        reservation.provider.name,
    );

    let mut notices = vec![Notice {
        recipient: demand.person().clone(),
        message: format!("You have been booked with {slot}."),
    }];
    notices.extend(demand.notify_list().iter().map(|person| Notice {
        recipient: person.clone(),
        message: format!("{} has been booked with {slot}.", demand.person()),
    }));
    notices
}

/// Deliver notices concurrently. Returns the ones that failed.
async fn deliver(ctx: &AgentContext, notices: Vec<Notice>) -> Vec<Notice> {
    let results = join_all(
        notices
            .iter()
            .map(|notice| ctx.notifier.notify(&notice.recipient, &notice.message)),
    )
    .await;

    notices
        .into_iter()
        .zip(results)
        .filter_map(|(notice, result)| match result {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    recipient = %notice.recipient,
                    error = %format!("{e:#}"),
                    "Notice not delivered, will retry next round"
                );
                Some(notice)
            }
        })
        .collect()
}
