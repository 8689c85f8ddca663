//! In-memory slot source backed by a JSON snapshot.
//!
//! Serves people, providers, staff and open slots from a snapshot file, and
//! records every committed reservation. Committed times are removed from the
//! snapshot, so a slot can only be taken once.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::upstream::{
    Category, Day, Employee, Person, Provider, Reservation, SlotSource, Time, VisitType,
};

/// Upstream state as stored in a fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub people: Vec<PersonRecord>,
    #[serde(default)]
    pub providers: Vec<ProviderRecord>,
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default = "default_true")]
    pub can_reserve: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub id: String,
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub booking_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub provider_id: String,
    #[serde(default)]
    pub days: Vec<DayRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecord {
    pub id: String,
    pub value: String,
    pub visit_type: String,
    /// Raw open times, in upstream order.
    #[serde(default)]
    pub times: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl DayRecord {
    fn to_day(&self) -> Day {
        Day {
            id: self.id.clone(),
            value: self.value.clone(),
            visit_type: VisitType::new(self.visit_type.clone(), &self.visit_type),
        }
    }

    fn time_id(&self, value: &str) -> String {
        format!("{}@{}", self.id, value)
    }
}

/// Slot source serving a [`Snapshot`].
pub struct FixtureSource {
    snapshot: RwLock<Snapshot>,
    commits: Mutex<Vec<Reservation>>,
    accept_commits: AtomicBool,
    latency: Duration,
    provider_fetches: AtomicU64,
    employee_fetches: AtomicU64,
    slot_fetches: AtomicU64,
}

impl FixtureSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            commits: Mutex::new(Vec::new()),
            accept_commits: AtomicBool::new(true),
            latency: Duration::ZERO,
            provider_fetches: AtomicU64::new(0),
            employee_fetches: AtomicU64::new(0),
            slot_fetches: AtomicU64::new(0),
        }
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let snapshot = serde_json::from_value(value).context("invalid fixture snapshot")?;
        Ok(Self::new(snapshot))
    }

    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse fixture {}", path.display()))?;

        info!(
            path = %path.display(),
            people = snapshot.people.len(),
            providers = snapshot.providers.len(),
            employees = snapshot.employees.len(),
            "Fixture loaded"
        );
        Ok(Self::new(snapshot))
    }

    /// Delay every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make commits succeed or be declined.
    pub fn set_accept_commits(&self, accept: bool) {
        self.accept_commits.store(accept, Ordering::SeqCst);
    }

    /// Swap the served state, as if the upstream changed.
    pub async fn replace_snapshot(&self, snapshot: Snapshot) {
        *self.snapshot.write().await = snapshot;
    }

    /// Reservations committed so far, in commit order.
    pub async fn commits(&self) -> Vec<Reservation> {
        self.commits.lock().await.clone()
    }

    pub fn provider_fetches(&self) -> u64 {
        self.provider_fetches.load(Ordering::SeqCst)
    }

    pub fn employee_fetches(&self) -> u64 {
        self.employee_fetches.load(Ordering::SeqCst)
    }

    /// Open-day and open-time lookups served so far.
    pub fn slot_fetches(&self) -> u64 {
        self.slot_fetches.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl SlotSource for FixtureSource {
    async fn list_people(&self) -> Result<Vec<Person>> {
        self.simulate_latency().await;
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .people
            .iter()
            .map(|p| Person::new(p.id.clone(), &p.full_name, p.contact.clone(), p.can_reserve))
            .collect())
    }

    async fn list_providers(&self, source: &str) -> Result<Vec<Provider>> {
        self.simulate_latency().await;
        self.provider_fetches.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .providers
            .iter()
            .filter(|p| p.source == source)
            .map(|p| Provider::new(p.id.clone(), &p.name, p.source.clone(), p.booking_url.clone()))
            .collect())
    }

    async fn list_employees(&self, provider: &Provider) -> Result<Vec<Employee>> {
        self.simulate_latency().await;
        self.employee_fetches.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .employees
            .iter()
            .filter(|e| e.provider_id == provider.id)
            .map(|e| {
                Employee::new(
                    e.id.clone(),
                    &e.name,
                    Category::new(&e.category),
                    e.provider_id.clone(),
                )
            })
            .collect())
    }

    async fn list_open_days(&self, employee: &Employee) -> Result<Vec<Day>> {
        self.simulate_latency().await;
        self.slot_fetches.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.snapshot.read().await;
        let days = snapshot
            .employees
            .iter()
            .find(|e| e.id == employee.id)
            .map(|e| e.days.iter().map(DayRecord::to_day).collect())
            .unwrap_or_default();
        Ok(days)
    }

    async fn list_open_times(&self, employee: &Employee, day: &Day) -> Result<Vec<Time>> {
        self.simulate_latency().await;
        self.slot_fetches.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.snapshot.read().await;
        let times = snapshot
            .employees
            .iter()
            .find(|e| e.id == employee.id)
            .and_then(|e| e.days.iter().find(|d| d.id == day.id))
            .map(|d| {
                d.times
                    .iter()
                    .map(|value| Time {
                        id: d.time_id(value),
                        value: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(times)
    }

    async fn commit_reservation(&self, reservation: &Reservation) -> Result<bool> {
        self.simulate_latency().await;
        if !self.accept_commits.load(Ordering::SeqCst) {
            debug!(reservation_id = %reservation.id, "Fixture declined reservation");
            return Ok(false);
        }

        let mut snapshot = self.snapshot.write().await;
        let day = snapshot
            .employees
            .iter_mut()
            .find(|e| e.id == reservation.employee.id)
            .and_then(|e| e.days.iter_mut().find(|d| d.id == reservation.day.id));
        let Some(day) = day else {
            return Ok(false);
        };
        let Some(position) = day
            .times
            .iter()
            .position(|value| day_time_matches(day, value, &reservation.time))
        else {
            return Ok(false);
        };
        day.times.remove(position);
        drop(snapshot);

        self.commits.lock().await.push(reservation.clone());
        info!(
            reservation_id = %reservation.id,
            person = %reservation.person,
            employee = %reservation.employee.name,
            day = %reservation.day.value,
            time = %reservation.time.value,
            "Fixture recorded reservation"
        );
        Ok(true)
    }
}

fn day_time_matches(day: &DayRecord, value: &str, time: &Time) -> bool {
    day.time_id(value) == time.id
}
