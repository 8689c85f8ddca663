//! Debug-mode wrapper around a slot source.

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::upstream::{Day, Employee, Person, Provider, Reservation, SlotSource, Time};

/// Passes lookups through and accepts every commit without sending it.
pub struct DryRun<S> {
    inner: S,
}

impl<S: SlotSource> DryRun<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    #[cfg(test)]
    fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: SlotSource> SlotSource for DryRun<S> {
    async fn list_people(&self) -> Result<Vec<Person>> {
        self.inner.list_people().await
    }

    async fn list_providers(&self, source: &str) -> Result<Vec<Provider>> {
        self.inner.list_providers(source).await
    }

    async fn list_employees(&self, provider: &Provider) -> Result<Vec<Employee>> {
        self.inner.list_employees(provider).await
    }

    async fn list_open_days(&self, employee: &Employee) -> Result<Vec<Day>> {
        self.inner.list_open_days(employee).await
    }

    async fn list_open_times(&self, employee: &Employee, day: &Day) -> Result<Vec<Time>> {
        self.inner.list_open_times(employee, day).await
    }

    async fn commit_reservation(&self, reservation: &Reservation) -> Result<bool> {
        warn!(
            reservation_id = %reservation.id,
            person = %reservation.person,
            employee = %reservation.employee.name,
            day = %reservation.day.value,
            time = %reservation.time.value,
            "[DRY RUN] Reservation not sent upstream in debug mode"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use slotwatch_id::ReservationId;

    use super::*;
    use crate::fixture::FixtureSource;
    use crate::upstream::{Category, VisitType};

    #[tokio::test]
    async fn test_commit_never_reaches_inner() {
        let fixture = FixtureSource::from_json(serde_json::json!({})).unwrap();
        fixture.set_accept_commits(false);
        let source = DryRun::new(fixture);

        let reservation = Reservation {
            id: ReservationId::new(),
            person: Person::new("u1", "Doe John", None, true),
            provider: Provider::new("p1", "Clinic", "gm", None),
            employee: Employee::new("e1", "Smith", Category::new("GP"), "p1"),
            day: Day {
                id: "d1".into(),
                value: "08.07.2023".into(),
                visit_type: VisitType::new("v", "Online"),
            },
            time: Time {
                id: "t1".into(),
                value: "10:00".into(),
            },
            attempt: 1,
        };

        assert!(source.commit_reservation(&reservation).await.unwrap());
        assert!(source.inner().commits().await.is_empty());
    }
}
