//! Strategies file and demand construction.
//!
//! The strategies file is TOML:
//!
//! ```toml
//! [visit_types]
//! "Online" = ["Pre-booking (online)", "Same-day online"]
//!
//! [[strategy]]
//! provider = "City Clinic 8"
//! source = "https://example.test/region/gm/poli"
//! person = "Doe John Paul"
//! notify = ["Doe Jane"]
//!
//! [[strategy.entries."General practitioner"]]
//! visit_type = "Online"
//! day = { ignore = [{ kind = "point", value = "07.07.2023" }] }
//! time = { strict = true, prefer = [{ kind = "span", from = "9:00", to = "11:00", direction = "desc" }] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use slotwatch_resolve::{Axis, Direction, Matcher, ResolveError, RuleSet, YearWindow};
use tracing::{info, warn};

use crate::demand::{Demand, EntriesStackItem, Entry};
use crate::error::AgentError;
use crate::registry::{Registry, VisitTypes};
use crate::upstream::{tidy, Category, Person};

/// Parsed strategies file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategiesFile {
    /// Visit-type category name to upstream visit-type names.
    #[serde(default)]
    pub visit_types: BTreeMap<String, Vec<String>>,

    #[serde(default, rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub provider: String,
    pub source: String,
    pub person: String,
    #[serde(default)]
    pub notify: Vec<String>,
    /// Staff category name to ordered entries.
    #[serde(default)]
    pub entries: BTreeMap<String, Vec<EntryConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryConfig {
    pub visit_type: OneOrMany,
    #[serde(default)]
    pub employee: RuleSetConfig,
    #[serde(default)]
    pub day: RuleSetConfig,
    #[serde(default)]
    pub time: RuleSetConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetConfig {
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub prefer: Vec<MatcherConfig>,
    #[serde(default)]
    pub ignore: Vec<MatcherConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MatcherConfig {
    Point {
        value: String,
    },
    Span {
        from: String,
        to: String,
        #[serde(default)]
        direction: Direction,
    },
    Weekend {
        #[serde(default)]
        direction: Direction,
    },
}

impl MatcherConfig {
    pub fn build(&self, axis: Axis, window: YearWindow) -> Result<Matcher, ResolveError> {
        let domain = axis.domain(window);
        match self {
            MatcherConfig::Point { value } => Matcher::point(domain, value),
            MatcherConfig::Span {
                from,
                to,
                direction,
            } => Ok(Matcher::span(domain, from, to)?.with_direction(*direction)),
            MatcherConfig::Weekend { direction } => {
                if axis != Axis::Day {
                    return Err(ResolveError::UnsupportedMatcher {
                        matcher: "weekend",
                        domain: domain.as_str(),
                    });
                }
                Ok(Matcher::weekend_in(window).with_direction(*direction))
            }
        }
    }
}

impl RuleSetConfig {
    pub fn build(&self, axis: Axis, window: YearWindow) -> Result<RuleSet, ResolveError> {
        let build_all = |configs: &[MatcherConfig]| {
            configs
                .iter()
                .map(|c| c.build(axis, window))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(RuleSet {
            strict: self.strict,
            prefer: build_all(&self.prefer)?,
            ignore: build_all(&self.ignore)?,
        })
    }
}

impl StrategiesFile {
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AgentError::StrategiesFile {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::parse(&raw).map_err(|e| AgentError::StrategiesFile {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }
}

/// Build demands from the strategies file.
///
/// Resolves every person and provider through the registry. Any invalid
/// literal, unknown name or unusable person/provider is fatal.
pub async fn build_demands(
    file: &StrategiesFile,
    registry: &Registry,
    visit_types: &VisitTypes,
    window: YearWindow,
) -> Result<Vec<Demand>, AgentError> {
    let mut demands = Vec::with_capacity(file.strategies.len());

    for strategy in &file.strategies {
        let person = resolve_person(registry, &strategy.person).await?;

        let mut notify = Vec::with_capacity(strategy.notify.len());
        for name in &strategy.notify {
            notify.push(resolve_person(registry, name).await?);
        }

        let source = strategy.source.trim();
        let provider_name = tidy(&strategy.provider);
        let provider = registry
            .provider_by_name(source, &provider_name)
            .await?
            .ok_or_else(|| AgentError::ProviderNotFound {
                name: provider_name.clone(),
                source_url: source.to_string(),
            })?;
        if !provider.takes_online_bookings() {
            return Err(AgentError::ProviderOffline(provider.name));
        }

        let mut items = Vec::with_capacity(strategy.entries.len());
        for (category_name, entry_configs) in &strategy.entries {
            let category = Category::new(category_name);
            let mut entries = Vec::with_capacity(entry_configs.len());
            for config in entry_configs {
                let entry = build_entry(config, &person, visit_types, window)?;
                if let Some(axis) = entry.defect() {
                    warn!(
                        person = %person,
                        category = %category.name,
                        provider = %provider.name,
                        axis = %axis,
                        "Strict {axis} rules without any preferred matcher can never match; \
                         this entry will be skipped. Add a prefer rule or drop strict mode"
                    );
                }
                entries.push(entry);
            }
            items.push(EntriesStackItem::new(category, entries));
        }

        let demand = Demand::new(person, notify, provider, items);
        info!(
            demand_id = %demand.id(),
            person = %demand.person(),
            provider = %demand.provider().name,
            items = demand.items().len(),
            "Demand configured"
        );
        demands.push(demand);
    }

    Ok(demands)
}

async fn resolve_person(registry: &Registry, name: &str) -> Result<Person, AgentError> {
    let name = tidy(name);
    let person = registry
        .person_by_name(&name)
        .await?
        .ok_or_else(|| AgentError::PersonNotFound(name.clone()))?;
    if !person.can_reserve || !person.is_reachable() {
        return Err(AgentError::PersonUnauthorized(name));
    }
    Ok(person)
}

fn build_entry(
    config: &EntryConfig,
    person: &Person,
    visit_types: &VisitTypes,
    window: YearWindow,
) -> Result<Entry, AgentError> {
    let categories = config.visit_type.clone().into_vec();
    if let Some(unknown) = categories.iter().find(|c| !visit_types.contains(c)) {
        return Err(AgentError::UnknownVisitType(unknown.clone()));
    }

    let rules = |axis: Axis, config: &RuleSetConfig| {
        config
            .build(axis, window)
            .map_err(|source| AgentError::InvalidRule {
                person: person.full_name.clone(),
                axis,
                source,
            })
    };

    Ok(Entry::new(
        categories,
        rules(Axis::Employee, &config.employee)?,
        rules(Axis::Day, &config.day)?,
        rules(Axis::Time, &config.time)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: YearWindow = YearWindow::around(2023);

    #[test]
    fn test_parse_full_example() {
        let file = StrategiesFile::parse(
            r#"
            [visit_types]
            "Online" = ["Pre-booking (online)"]

            [[strategy]]
            provider = "City Clinic 8"
            source = "gm"
            person = "Doe John"
            notify = ["Doe Jane"]

            [[strategy.entries."General practitioner"]]
            visit_type = ["Online"]
            employee = { strict = false }
            day = { ignore = [{ kind = "point", value = "07.07.2023" }] }
            time = { strict = true, prefer = [
              { kind = "span", from = "9:00", to = "11:00", direction = "desc" },
              { kind = "span", from = "11:00", to = "20:00" },
            ] }
            "#,
        )
        .unwrap();

        assert_eq!(file.strategies.len(), 1);
        let entries = &file.strategies[0].entries["General practitioner"];
        assert_eq!(entries.len(), 1);

        let time = entries[0].time.build(Axis::Time, WINDOW).unwrap();
        assert!(time.strict);
        assert_eq!(time.prefer[0].direction(), Direction::Desc);
        assert_eq!(time.prefer[1].direction(), Direction::Asc);

        let day = entries[0].day.build(Axis::Day, WINDOW).unwrap();
        assert!(day.ignore[0].matches("7.7.2023"));
    }

    #[test]
    fn test_single_visit_type_string() {
        let entry: EntryConfig = toml::from_str(r#"visit_type = "Online""#).unwrap();
        assert_eq!(entry.visit_type.into_vec(), vec!["Online".to_string()]);
    }

    #[test]
    fn test_reversed_span_rejected() {
        let config: RuleSetConfig = toml::from_str(
            r#"prefer = [{ kind = "span", from = "10.07.2023", to = "05.07.2023" }]"#,
        )
        .unwrap();
        let err = config.build(Axis::Day, WINDOW).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidSpan { .. }));
    }

    #[test]
    fn test_weekend_only_for_days() {
        let config = MatcherConfig::Weekend {
            direction: Direction::Desc,
        };
        assert!(config.build(Axis::Day, WINDOW).is_ok());
        assert!(config.build(Axis::Time, WINDOW).is_err());
    }

    #[test]
    fn test_unknown_rule_field_rejected() {
        let result: Result<RuleSetConfig, _> = toml::from_str("strickt = true");
        assert!(result.is_err());
    }
}
