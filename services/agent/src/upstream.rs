//! Upstream slot source interface and the entities it serves.
//!
//! Everything here is owned by the upstream system; the agent only reads it.
//! Display names carry a [`Fingerprint`] so lookups tolerate differences in
//! case, punctuation and `ё`/`е` spelling.

use anyhow::Result;
use async_trait::async_trait;
use slotwatch_id::ReservationId;
use slotwatch_resolve::Fingerprint;

/// Collapse runs of whitespace and trim.
pub fn tidy(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A person that can hold reservations or receive notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub full_name: String,
    /// Where notices are delivered. `None` until the person has linked a channel.
    pub contact: Option<String>,
    /// Whether the upstream accepts reservations on this person's behalf.
    pub can_reserve: bool,
    pub fingerprint: Fingerprint,
}

impl Person {
    pub fn new(
        id: impl Into<String>,
        full_name: &str,
        contact: Option<String>,
        can_reserve: bool,
    ) -> Self {
        let full_name = tidy(full_name);
        Self {
            id: id.into(),
            fingerprint: Fingerprint::of(&full_name),
            full_name,
            contact,
            can_reserve,
        }
    }

    /// Can be notified.
    pub fn is_reachable(&self) -> bool {
        self.contact.is_some()
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// An organisation whose staff publish open slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub id: String,
    pub name: String,
    /// Listing the provider was found in.
    pub source: String,
    /// Online booking page, absent when the provider takes no online bookings.
    pub booking_url: Option<String>,
    pub fingerprint: Fingerprint,
}

impl Provider {
    pub fn new(
        id: impl Into<String>,
        name: &str,
        source: impl Into<String>,
        booking_url: Option<String>,
    ) -> Self {
        let name = tidy(name);
        Self {
            id: id.into(),
            fingerprint: Fingerprint::of(&name),
            name,
            source: source.into(),
            booking_url,
        }
    }

    pub fn takes_online_bookings(&self) -> bool {
        self.booking_url.is_some()
    }
}

/// Staff category, e.g. "General practitioner".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub fingerprint: Fingerprint,
}

impl Category {
    pub fn new(name: &str) -> Self {
        let name = tidy(name);
        Self {
            fingerprint: Fingerprint::of(&name),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub provider_id: String,
    pub fingerprint: Fingerprint,
}

impl Employee {
    pub fn new(
        id: impl Into<String>,
        name: &str,
        category: Category,
        provider_id: impl Into<String>,
    ) -> Self {
        let name = tidy(name);
        Self {
            id: id.into(),
            fingerprint: Fingerprint::of(&name),
            name,
            category,
            provider_id: provider_id.into(),
        }
    }
}

/// Kind of visit an open day is offered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitType {
    pub id: String,
    pub value: String,
    pub fingerprint: Fingerprint,
}

impl VisitType {
    pub fn new(id: impl Into<String>, value: &str) -> Self {
        let value = tidy(value);
        Self {
            id: id.into(),
            fingerprint: Fingerprint::of(&value),
            value,
        }
    }
}

/// An open day. `value` is the raw upstream date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    pub id: String,
    pub value: String,
    pub visit_type: VisitType,
}

/// An open time on a day. `value` is the raw upstream time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Time {
    pub id: String,
    pub value: String,
}

/// A reservation request sent upstream.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: ReservationId,
    pub person: Person,
    pub provider: Provider,
    pub employee: Employee,
    pub day: Day,
    pub time: Time,
    /// Round counter of the attempt that produced this request.
    pub attempt: u64,
}

/// Upstream slot source interface.
///
/// Implementations own transport, rate limiting and parsing. Errors are
/// reported as-is; the agent never retries a failed call within a round.
#[async_trait]
pub trait SlotSource: Send + Sync {
    /// All people known upstream.
    async fn list_people(&self) -> Result<Vec<Person>>;

    /// Providers published in a listing.
    async fn list_providers(&self, source: &str) -> Result<Vec<Provider>>;

    /// Staff of a provider.
    async fn list_employees(&self, provider: &Provider) -> Result<Vec<Employee>>;

    /// Open days of an employee, in upstream order.
    async fn list_open_days(&self, employee: &Employee) -> Result<Vec<Day>>;

    /// Open times of an employee on a day, in upstream order.
    async fn list_open_times(&self, employee: &Employee, day: &Day) -> Result<Vec<Time>>;

    /// Commit a reservation. `Ok(false)` means the upstream declined it.
    async fn commit_reservation(&self, reservation: &Reservation) -> Result<bool>;
}
