//! Target resolution: employee, then day, then time.
//!
//! Backtracks with skip lists: an employee without usable days is skipped
//! and the next one picked; a day without usable times is skipped and the
//! next day picked. Upstream calls within one resolution are sequential.

use anyhow::Result;
use slotwatch_resolve::{Axis, Resolver};
use tracing::debug;

use crate::context::AgentContext;
use crate::demand::Entry;
use crate::registry::VisitTypes;
use crate::upstream::{Day, Employee, Time};

/// A concrete slot chosen for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub employee: Employee,
    pub day: Day,
    pub time: Time,
}

/// Resolve a target for `entry` among `employees`.
///
/// Returns `Ok(None)` when the entry is defective, when the candidates are
/// exhausted, or when shutdown has been requested.
pub async fn resolve_target(
    ctx: &AgentContext,
    employees: &[Employee],
    entry: &Entry,
    visit_types: &VisitTypes,
) -> Result<Option<Target>> {
    if entry.defect().is_some() {
        return Ok(None);
    }

    let source = ctx.registry.source();
    let mut employee_skip: Vec<String> = Vec::new();

    loop {
        if ctx.latch.is_set() {
            return Ok(None);
        }
        let Some(employee) = Resolver::new(entry.rules(Axis::Employee))
            .with_skip_list(&employee_skip)
            .pick_by(employees, |e| e.name.as_str())
        else {
            return Ok(None);
        };

        let days = source.list_open_days(employee).await?;
        if days.is_empty() {
            debug!(employee = %employee.name, "No open days, skipping employee");
            employee_skip.push(employee.name.clone());
            continue;
        }

        let mut day_skip: Vec<String> = Vec::new();
        loop {
            if ctx.latch.is_set() {
                return Ok(None);
            }
            let Some(day) = Resolver::new(entry.rules(Axis::Day))
                .with_skip_list(&day_skip)
                .pick(
                    &days,
                    |d| d.value.as_str(),
                    |d| !visit_types.accepts(entry.visit_types(), d.visit_type.fingerprint),
                )
            else {
                employee_skip.push(employee.name.clone());
                break;
            };

            let times = source.list_open_times(employee, day).await?;
            if times.is_empty() {
                debug!(employee = %employee.name, day = %day.value, "No open times, skipping day");
                day_skip.push(day.value.clone());
                continue;
            }

            if ctx.latch.is_set() {
                return Ok(None);
            }
            let Some(time) =
                Resolver::new(entry.rules(Axis::Time)).pick_by(&times, |t| t.value.as_str())
            else {
                debug!(employee = %employee.name, day = %day.value, "No suitable time, skipping day");
                day_skip.push(day.value.clone());
                continue;
            };

            return Ok(Some(Target {
                employee: employee.clone(),
                day: day.clone(),
                time: time.clone(),
            }));
        }
    }
}
