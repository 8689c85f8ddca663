//! Demand model.
//!
//! A demand asks for one reservation per staff category on behalf of one
//! person at one provider. Each category is an [`EntriesStackItem`] holding
//! ordered entries; the first entry that resolves a target wins.
//!
//! # Invariants
//!
//! - An item is completed only after a confirmed successful commit
//! - Completion is irreversible
//! - Attempt counters are for reporting only

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use slotwatch_id::{AttemptKey, DemandId, EntriesItemId};
use slotwatch_resolve::{Axis, RuleSet};
use tokio::sync::{Mutex, RwLock};

use crate::upstream::{Category, Person, Provider};

/// One combination of rule sets tried for a category.
#[derive(Debug, Clone)]
pub struct Entry {
    visit_types: Vec<String>,
    employee: RuleSet,
    day: RuleSet,
    time: RuleSet,
    defect: Option<Axis>,
}

impl Entry {
    pub fn new(visit_types: Vec<String>, employee: RuleSet, day: RuleSet, time: RuleSet) -> Self {
        let defect = [
            (Axis::Employee, &employee),
            (Axis::Day, &day),
            (Axis::Time, &time),
        ]
        .into_iter()
        .find(|(_, rules)| rules.is_unsatisfiable())
        .map(|(axis, _)| axis);
        Self {
            visit_types,
            employee,
            day,
            time,
            defect,
        }
    }

    /// Visit-type categories an open day may belong to.
    pub fn visit_types(&self) -> &[String] {
        &self.visit_types
    }

    pub fn rules(&self, axis: Axis) -> &RuleSet {
        match axis {
            Axis::Employee => &self.employee,
            Axis::Day => &self.day,
            Axis::Time => &self.time,
        }
    }

    /// First axis that can never resolve, if any.
    pub fn defect(&self) -> Option<Axis> {
        self.defect
    }
}

/// A notice that has not been delivered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub recipient: Person,
    pub message: String,
}

/// One category of a demand.
#[derive(Debug)]
pub struct EntriesStackItem {
    id: EntriesItemId,
    category: Category,
    entries: Vec<Entry>,
    completed: AtomicBool,
    outbox: Mutex<Vec<Notice>>,
}

impl EntriesStackItem {
    pub fn new(category: Category, entries: Vec<Entry>) -> Self {
        Self {
            id: EntriesItemId::new(),
            category,
            entries,
            completed: AtomicBool::new(false),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> EntriesItemId {
        self.id
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Mark completed. Returns `true` on the pending to completed transition.
    pub fn complete(&self) -> bool {
        !self.completed.swap(true, Ordering::AcqRel)
    }

    /// Queue notices for redelivery.
    pub async fn defer(&self, notices: Vec<Notice>) {
        self.outbox.lock().await.extend(notices);
    }

    /// Drain the outbox.
    pub async fn take_outbox(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.outbox.lock().await)
    }

    pub async fn pending_notices(&self) -> usize {
        self.outbox.lock().await.len()
    }

    /// Completed with nothing left to deliver.
    pub async fn is_settled(&self) -> bool {
        self.is_completed() && self.pending_notices().await == 0
    }
}

/// Lifecycle of a demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandState {
    Active,
    Completed,
}

/// A person's configured intent to obtain reservations at one provider.
#[derive(Debug)]
pub struct Demand {
    id: DemandId,
    person: Person,
    notify: Vec<Person>,
    provider: Provider,
    items: Vec<Arc<EntriesStackItem>>,
}

impl Demand {
    pub fn new(
        person: Person,
        notify: Vec<Person>,
        provider: Provider,
        items: Vec<EntriesStackItem>,
    ) -> Self {
        Self {
            id: DemandId::new(),
            person,
            notify,
            provider,
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn id(&self) -> DemandId {
        self.id
    }

    /// The person reservations are made for.
    pub fn person(&self) -> &Person {
        &self.person
    }

    /// Additional people told about each reservation.
    pub fn notify_list(&self) -> &[Person] {
        &self.notify
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn items(&self) -> &[Arc<EntriesStackItem>] {
        &self.items
    }

    pub fn attempt_key(&self, item: &EntriesStackItem) -> AttemptKey {
        AttemptKey::new(self.id, item.id())
    }

    pub fn is_completed(&self) -> bool {
        self.items.iter().all(|item| item.is_completed())
    }

    pub async fn is_settled(&self) -> bool {
        for item in &self.items {
            if !item.is_settled().await {
                return false;
            }
        }
        true
    }

    pub fn state(&self) -> DemandState {
        if self.is_completed() {
            DemandState::Completed
        } else {
            DemandState::Active
        }
    }

    /// Items still pending, or completed with notices left to deliver.
    pub async fn items_needing_work(&self) -> Vec<Arc<EntriesStackItem>> {
        let mut pending = Vec::new();
        for item in &self.items {
            if !item.is_settled().await {
                pending.push(Arc::clone(item));
            }
        }
        pending
    }
}

/// Rounds attempted per demand item.
#[derive(Debug, Default)]
pub struct AttemptCounters {
    counts: RwLock<HashMap<AttemptKey, u64>>,
}

impl AttemptCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more attempt and return the new total.
    pub async fn increment(&self, key: AttemptKey) -> u64 {
        let mut counts = self.counts.write().await;
        let count = counts.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    pub async fn get(&self, key: AttemptKey) -> u64 {
        self.counts.read().await.get(&key).copied().unwrap_or(0)
    }
}
