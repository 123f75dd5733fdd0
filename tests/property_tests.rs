//! Property-based tests for stock arithmetic and the agency rule.

use drims_api::entities::agency::AgencyType;
use drims_api::entities::inventory_balance::{StockError, StockLevels};
use drims_api::rules::{agency_form_rules, agency_warehouse_rule};
use proptest::prelude::*;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Movement {
    Receive(i64),
    Reserve(i64),
    Release(i64),
    Consume(i64),
    WriteOff(i64, i64),
}

fn movement_strategy() -> impl Strategy<Value = Movement> {
    prop_oneof![
        (-5i64..500).prop_map(Movement::Receive),
        (-5i64..500).prop_map(Movement::Reserve),
        (-5i64..500).prop_map(Movement::Release),
        (-5i64..500).prop_map(Movement::Consume),
        (-2i64..50, -2i64..50).prop_map(|(d, e)| Movement::WriteOff(d, e)),
    ]
}

fn apply(levels: StockLevels, movement: &Movement) -> Result<StockLevels, StockError> {
    match *movement {
        Movement::Receive(q) => levels.receive(q),
        Movement::Reserve(q) => levels.reserve(q),
        Movement::Release(q) => levels.release(q),
        Movement::Consume(q) => levels.consume(q),
        Movement::WriteOff(d, e) => levels.write_off(d, e),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn reserved_never_exceeds_usable(moves in prop::collection::vec(movement_strategy(), 1..60)) {
        let mut levels = StockLevels::default();
        for movement in &moves {
            match apply(levels, movement) {
                Ok(next) => levels = next,
                Err(_) => {
                    // A refused movement leaves the line as it was.
                }
            }
            prop_assert!(levels.is_consistent(), "broken after {:?}: {:?}", movement, levels);
            prop_assert!(levels.available() >= 0);
        }
    }

    #[test]
    fn stock_is_conserved(moves in prop::collection::vec(movement_strategy(), 1..60)) {
        let mut levels = StockLevels::default();
        let mut received = 0i64;
        let mut shipped = 0i64;
        for movement in &moves {
            if let Ok(next) = apply(levels, movement) {
                match *movement {
                    Movement::Receive(q) => received += q,
                    Movement::Consume(q) => shipped += q,
                    _ => {}
                }
                levels = next;
            }
        }
        prop_assert_eq!(
            levels.usable + levels.defective + levels.expired + shipped,
            received
        );
    }

    #[test]
    fn reserve_succeeds_iff_enough_is_available(
        usable in 0i64..1_000,
        reserved_share in 0i64..=100,
        request in 1i64..1_200,
    ) {
        let reserved = usable * reserved_share / 100;
        let levels = StockLevels::new(usable, reserved);
        let result = levels.reserve(request);
        if request <= usable - reserved {
            prop_assert_eq!(result.map(|l| l.reserved), Ok(reserved + request));
        } else {
            let is_insufficient = matches!(result, Err(StockError::Insufficient { .. }));
            prop_assert!(is_insufficient);
        }
    }

    #[test]
    fn reserve_then_release_is_identity(usable in 1i64..1_000, request in 1i64..1_000) {
        let levels = StockLevels::new(usable, 0);
        if let Ok(held) = levels.reserve(request) {
            prop_assert_eq!(held.release(request), Ok(levels));
        }
    }

    #[test]
    fn form_rules_agree_with_the_predicate(with_warehouse in any::<bool>()) {
        for rule in agency_form_rules() {
            let warehouse_id = with_warehouse.then(Uuid::new_v4);
            let allowed = agency_warehouse_rule(rule.agency_type, warehouse_id).is_ok();
            let expected = if with_warehouse {
                rule.warehouse_enabled
            } else {
                !rule.warehouse_required
            };
            prop_assert_eq!(allowed, expected);
        }
        prop_assert!(agency_warehouse_rule(AgencyType::Shelter, None).is_ok());
    }
}
