//! Typed ID definitions.

use crate::define_id;

// =============================================================================
// Demand model
// =============================================================================

define_id!(DemandId, "dmd");
define_id!(EntriesItemId, "item");

// =============================================================================
// Reservations
// =============================================================================

define_id!(ReservationId, "rsv");

// =============================================================================
// Attempt Key
// =============================================================================

/// Key of one attempt counter: a demand plus one of its entry stack items.
///
/// Rendered as `{demand}/{item}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptKey {
    pub demand: DemandId,
    pub item: EntriesItemId,
}

impl AttemptKey {
    #[must_use]
    pub const fn new(demand: DemandId, item: EntriesItemId) -> Self {
        Self { demand, item }
    }
}

impl std::fmt::Display for AttemptKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.demand, self.item)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdError;
    use proptest::prelude::*;

    #[test]
    fn test_demand_id_prefix() {
        let id = DemandId::new();
        assert!(id.to_string().starts_with("dmd_"));
    }

    #[test]
    fn test_item_id_rejects_demand_prefix() {
        let demand = DemandId::new().to_string();
        let result: Result<EntriesItemId, _> = demand.parse();
        assert!(result.unwrap_err().is_prefix_error());
    }

    #[test]
    fn test_missing_separator() {
        let result: Result<DemandId, _> = "dmd01HV4Z2WQXKJNM8GPQY6VBKC3D".parse();
        assert_eq!(result.unwrap_err(), IdError::MissingSeparator);
    }

    #[test]
    fn test_empty() {
        let result: Result<ReservationId, _> = "".parse();
        assert_eq!(result.unwrap_err(), IdError::Empty);
    }

    #[test]
    fn test_invalid_ulid() {
        let result: Result<DemandId, _> = "dmd_invalid".parse();
        assert!(matches!(result.unwrap_err(), IdError::InvalidUlid(_)));
    }

    #[test]
    fn test_ids_minted_in_order_sort_in_order() {
        let first = EntriesItemId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = EntriesItemId::new();
        assert!(first < second);
    }

    #[test]
    fn test_attempt_key_display() {
        let key = AttemptKey::new(DemandId::new(), EntriesItemId::new());
        let rendered = key.to_string();
        let (demand, item) = rendered.split_once('/').unwrap();
        assert!(demand.starts_with("dmd_"));
        assert!(item.starts_with("item_"));
    }



    #[test]
    fn test_all_id_prefixes_unique() {
        let prefixes = [DemandId::PREFIX, EntriesItemId::PREFIX, ReservationId::PREFIX];
        let unique: std::collections::HashSet<_> = prefixes.iter().collect();
        assert_eq!(prefixes.len(), unique.len(), "Duplicate ID prefixes found!");
    }

    proptest! {
        #[test]
        fn prop_demand_id_parses_its_own_rendering(raw in any::<u128>()) {
            let id = DemandId::from_ulid(crate::Ulid(raw));
            prop_assert_eq!(DemandId::parse(&id.to_string()).unwrap(), id);
        }
    }
}
