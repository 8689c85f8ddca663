//! Cached upstream lookups.
//!
//! The registry fronts the slot source for lookups that change slowly:
//! - People are loaded once per process
//! - Provider lists are cached per listing for `providers_ttl`
//! - Staff lists are cached per provider for `employees_ttl`
//!
//! Open days and times are never cached.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use slotwatch_resolve::Fingerprint;
use tokio::sync::{OnceCell, RwLock};
use tokio::time::Instant;
use tracing::debug;

use crate::upstream::{Category, Employee, Person, Provider, SlotSource};

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

impl<T> Cached<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() <= ttl
    }
}

/// Cached view of the slot source.
pub struct Registry {
    source: Arc<dyn SlotSource>,
    providers_ttl: Duration,
    employees_ttl: Duration,
    people: OnceCell<Vec<Person>>,
    providers: RwLock<HashMap<String, Cached<Vec<Provider>>>>,
    employees: RwLock<HashMap<String, Cached<Vec<Employee>>>>,
}

impl Registry {
    pub fn new(
        source: Arc<dyn SlotSource>,
        providers_ttl: Duration,
        employees_ttl: Duration,
    ) -> Self {
        Self {
            source,
            providers_ttl,
            employees_ttl,
            people: OnceCell::new(),
            providers: RwLock::new(HashMap::new()),
            employees: RwLock::new(HashMap::new()),
        }
    }

    /// The underlying slot source, for uncached calls.
    pub fn source(&self) -> &dyn SlotSource {
        self.source.as_ref()
    }

    pub async fn people(&self) -> Result<&[Person]> {
        let people = self
            .people
            .get_or_try_init(|| async {
                self.source
                    .list_people()
                    .await
                    .context("failed to list people")
            })
            .await?;
        Ok(people)
    }

    /// Look a person up by full name, tolerating spelling differences.
    pub async fn person_by_name(&self, name: &str) -> Result<Option<Person>> {
        let wanted = Fingerprint::of(name);
        let people = self.people().await?;
        Ok(people.iter().find(|p| p.fingerprint == wanted).cloned())
    }

    pub async fn providers(&self, source: &str) -> Result<Vec<Provider>> {
        if let Some(cached) = self.providers.read().await.get(source) {
            if cached.is_fresh(self.providers_ttl) {
                return Ok(cached.value.clone());
            }
        }

        debug!(source, "Refreshing provider list");
        let value = self
            .source
            .list_providers(source)
            .await
            .with_context(|| format!("failed to list providers of {source}"))?;
        self.providers
            .write()
            .await
            .insert(source.to_string(), Cached::new(value.clone()));
        Ok(value)
    }

    pub async fn provider_by_name(&self, source: &str, name: &str) -> Result<Option<Provider>> {
        let wanted = Fingerprint::of(name);
        let providers = self.providers(source).await?;
        Ok(providers.into_iter().find(|p| p.fingerprint == wanted))
    }

    pub async fn employees(&self, provider: &Provider) -> Result<Vec<Employee>> {
        if let Some(cached) = self.employees.read().await.get(&provider.id) {
            if cached.is_fresh(self.employees_ttl) {
                return Ok(cached.value.clone());
            }
        }

        debug!(provider = %provider.name, "Refreshing staff list");
        let value = self
            .source
            .list_employees(provider)
            .await
            .with_context(|| format!("failed to list staff of {}", provider.name))?;
        self.employees
            .write()
            .await
            .insert(provider.id.clone(), Cached::new(value.clone()));
        Ok(value)
    }

    /// Staff of `provider` in `category`, in upstream order.
    pub async fn employees_by_category(
        &self,
        provider: &Provider,
        category: &Category,
    ) -> Result<Vec<Employee>> {
        let mut employees = self.employees(provider).await?;
        employees.retain(|e| e.category.fingerprint == category.fingerprint);
        Ok(employees)
    }
}

/// Visit-type categories and the upstream visit types each accepts.
///
/// Configured as category name to upstream type names; stored as
/// fingerprints so comparisons ignore spelling differences.
#[derive(Debug, Clone, Default)]
pub struct VisitTypes {
    categories: BTreeMap<String, Vec<Fingerprint>>,
}

impl VisitTypes {
    pub fn new(table: &BTreeMap<String, Vec<String>>) -> Self {
        let categories = table
            .iter()
            .map(|(category, names)| {
                let fingerprints = names.iter().map(|n| Fingerprint::of(n)).collect();
                (category.clone(), fingerprints)
            })
            .collect();
        Self { categories }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Whether any of `categories` accepts a visit type.
    pub fn accepts(&self, categories: &[String], visit_type: Fingerprint) -> bool {
        categories.iter().any(|category| {
            self.categories
                .get(category)
                .is_some_and(|accepted| accepted.contains(&visit_type))
        })
    }
}
