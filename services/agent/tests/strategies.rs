//! Strategies file loading and demand construction.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use slotwatch_agent::fixture::FixtureSource;
use slotwatch_agent::{build_demands, AgentError, Registry, StrategiesFile, VisitTypes};
use slotwatch_resolve::{Axis, Direction, YearWindow};

const WINDOW: YearWindow = YearWindow::around(2023);

fn registry() -> Registry {
    let source = FixtureSource::from_json(serde_json::json!({
        "people": [
            {"id": "u1", "full_name": "Doe John", "contact": "john"},
            {"id": "u2", "full_name": "Roe Rita"},
            {"id": "u3", "full_name": "Poe Paul", "contact": "paul", "can_reserve": false}
        ],
        "providers": [
            {"id": "p1", "name": "City Clinic", "source": "gm", "booking_url": "b"},
            {"id": "p2", "name": "Old Clinic", "source": "gm"}
        ],
        "employees": []
    }))
    .unwrap();
    Registry::new(Arc::new(source), Duration::from_secs(60), Duration::from_secs(60))
}

fn strategy(person: &str, provider: &str, extra: &str) -> String {
    format!(
        r#"
[visit_types]
"Online" = ["Pre-booking"]

[[strategy]]
provider = "{provider}"
source = "gm"
person = "{person}"
{extra}

[[strategy.entries."GP"]]
visit_type = "Online"
day = {{ prefer = [{{ kind = "weekend", direction = "desc" }}] }}
"#
    )
}

async fn build(raw: &str) -> Result<Vec<slotwatch_agent::Demand>, AgentError> {
    let file = StrategiesFile::parse(raw).unwrap();
    build_demands(&file, &registry(), &VisitTypes::new(&file.visit_types), WINDOW).await
}

#[tokio::test]
async fn test_load_from_file_and_build() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        strategy("  Doe   John ", "City Clinic", r#"notify = ["Doe John"]"#).as_bytes(),
    )
    .unwrap();

    let strategies = StrategiesFile::load(file.path()).unwrap();
    let demands = build_demands(
        &strategies,
        &registry(),
        &VisitTypes::new(&strategies.visit_types),
        WINDOW,
    )
    .await
    .unwrap();

    assert_eq!(demands.len(), 1);
    let demand = &demands[0];
    assert_eq!(demand.person().full_name, "Doe John");
    assert_eq!(demand.notify_list().len(), 1);
    assert_eq!(demand.provider().name, "City Clinic");

    let item = &demand.items()[0];
    assert_eq!(item.category().name, "GP");
    let day = item.entries()[0].rules(Axis::Day);
    assert_eq!(day.prefer[0].direction(), Direction::Desc);
    assert!(!item.is_completed());
}

#[tokio::test]
async fn test_missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = StrategiesFile::load(&dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.reason_code(), "strategies_file");
}

#[tokio::test]
async fn test_malformed_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[[strategy]]\nprovider = ").unwrap();

    let err = StrategiesFile::load(file.path()).unwrap_err();
    assert_eq!(err.reason_code(), "strategies_file");
}

#[rstest]
#[case::unknown_person("Nobody Here", "City Clinic", "", "person_not_found")]
#[case::unreachable_person("Roe Rita", "City Clinic", "", "person_unauthorized")]
#[case::cannot_reserve("Poe Paul", "City Clinic", "", "person_unauthorized")]
#[case::unknown_notify(
    "Doe John",
    "City Clinic",
    r#"notify = ["Nobody Here"]"#,
    "person_not_found"
)]
#[case::unreachable_notify(
    "Doe John",
    "City Clinic",
    r#"notify = ["Roe Rita"]"#,
    "person_unauthorized"
)]
#[case::unknown_provider("Doe John", "Nowhere Clinic", "", "provider_not_found")]
#[case::offline_provider("Doe John", "Old Clinic", "", "provider_offline")]
#[tokio::test]
async fn test_build_rejects(
    #[case] person: &str,
    #[case] provider: &str,
    #[case] extra: &str,
    #[case] reason: &str,
) {
    let err = build(&strategy(person, provider, extra)).await.unwrap_err();
    assert_eq!(err.reason_code(), reason);
}

#[rstest]
#[case::bad_date(r#"day = { ignore = [{ kind = "point", value = "32.02.2023" }] }"#, Axis::Day)]
#[case::year_outside_window(
    r#"day = { prefer = [{ kind = "point", value = "01.01.2030" }] }"#,
    Axis::Day
)]
#[case::bad_time(r#"time = { prefer = [{ kind = "point", value = "25:00" }] }"#, Axis::Time)]
#[case::name_span(
    r#"employee = { prefer = [{ kind = "span", from = "A", to = "B" }] }"#,
    Axis::Employee
)]
#[case::letterless_name(
    r#"employee = { prefer = [{ kind = "point", value = "123" }] }"#,
    Axis::Employee
)]
#[case::weekend_time(r#"time = { prefer = [{ kind = "weekend" }] }"#, Axis::Time)]
#[tokio::test]
async fn test_invalid_rules_are_fatal(#[case] rule: &str, #[case] expected: Axis) {
    let raw = format!(
        r#"
[visit_types]
"Online" = ["Pre-booking"]

[[strategy]]
provider = "City Clinic"
source = "gm"
person = "Doe John"

[[strategy.entries."GP"]]
visit_type = "Online"
{rule}
"#
    );

    match build(&raw).await {
        Err(AgentError::InvalidRule { person, axis, .. }) => {
            assert_eq!(person, "Doe John");
            assert_eq!(axis, expected);
        }
        other => panic!("expected invalid rule, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_visit_type_is_fatal() {
    let raw = r#"
[[strategy]]
provider = "City Clinic"
source = "gm"
person = "Doe John"

[[strategy.entries."GP"]]
visit_type = ["Online"]
"#;

    let err = build(raw).await.unwrap_err();
    assert!(matches!(err, AgentError::UnknownVisitType(ref name) if name == "Online"));
}

#[tokio::test]
async fn test_unsatisfiable_entry_is_kept_but_flagged() {
    let raw = r#"
[visit_types]
"Online" = ["Pre-booking"]

[[strategy]]
provider = "City Clinic"
source = "gm"
person = "Doe John"

[[strategy.entries."GP"]]
visit_type = "Online"
time = { strict = true }
"#;

    let demands = build(raw).await.unwrap();
    let entry = &demands[0].items()[0].entries()[0];
    assert_eq!(entry.defect(), Some(Axis::Time));
}

#[tokio::test]
async fn test_empty_file_builds_no_demands() {
    let demands = build("").await.unwrap();
    assert!(demands.is_empty());
}
