//! Business rules shared by storage, services and the HTTP layer.
//!
//! The agency/warehouse rule is written once here. The schema CHECK
//! constraint, the agency service and the form-rules endpoint all derive
//! their behaviour from [`agency_warehouse_rule`].

use crate::entities::agency::AgencyType;
use sea_orm::{ActiveEnum, Iterable};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Why an agency's warehouse reference is unacceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AgencyRuleViolation {
    #[error("{0} agencies must be linked to a warehouse")]
    WarehouseRequired(AgencyType),
    #[error("{0} agencies cannot be linked to a warehouse")]
    WarehouseNotAllowed(AgencyType),
}

/// The agency/warehouse rule: distributors must reference a warehouse,
/// shelters must not.
pub fn agency_warehouse_rule(
    kind: AgencyType,
    warehouse_id: Option<Uuid>,
) -> Result<(), AgencyRuleViolation> {
    match (kind.requires_warehouse(), warehouse_id) {
        (true, None) => Err(AgencyRuleViolation::WarehouseRequired(kind)),
        (false, Some(_)) => Err(AgencyRuleViolation::WarehouseNotAllowed(kind)),
        _ => Ok(()),
    }
}

/// How a client form should present the warehouse field for one agency type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct AgencyFormRule {
    pub agency_type: AgencyType,
    /// The field accepts a value
    pub warehouse_enabled: bool,
    /// The field must have a value
    pub warehouse_required: bool,
}

impl AgencyFormRule {
    pub fn for_type(kind: AgencyType) -> Self {
        let with_warehouse = agency_warehouse_rule(kind, Some(Uuid::nil())).is_ok();
        let without_warehouse = agency_warehouse_rule(kind, None).is_ok();
        Self {
            agency_type: kind,
            warehouse_enabled: with_warehouse,
            warehouse_required: !without_warehouse,
        }
    }
}

/// Form rules for every agency type.
pub fn agency_form_rules() -> Vec<AgencyFormRule> {
    AgencyType::iter().map(AgencyFormRule::for_type).collect()
}

/// SQL CHECK expression enforcing the rule over the `agency_type` and
/// `warehouse_id` columns.
pub fn agency_warehouse_check_sql() -> String {
    let clauses: Vec<String> = agency_form_rules()
        .into_iter()
        .map(|rule| {
            let kind = format!("agency_type = '{}'", rule.agency_type.to_value());
            match (rule.warehouse_enabled, rule.warehouse_required) {
                (_, true) => format!("({} AND warehouse_id IS NOT NULL)", kind),
                (false, false) => format!("({} AND warehouse_id IS NULL)", kind),
                (true, false) => format!("({})", kind),
            }
        })
        .collect();
    clauses.join(" OR ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AgencyType::Distributor, true, true)]
    #[case(AgencyType::Distributor, false, false)]
    #[case(AgencyType::Shelter, false, true)]
    #[case(AgencyType::Shelter, true, false)]
    fn rule_matrix(#[case] kind: AgencyType, #[case] with_warehouse: bool, #[case] ok: bool) {
        let warehouse_id = with_warehouse.then(Uuid::new_v4);
        assert_eq!(agency_warehouse_rule(kind, warehouse_id).is_ok(), ok);
    }

    #[test]
    fn violation_messages_name_the_type() {
        let err = agency_warehouse_rule(AgencyType::Shelter, Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.to_string(), "SHELTER agencies cannot be linked to a warehouse");
    }

    #[test]
    fn form_rules_follow_the_predicate() {
        let rules = agency_form_rules();
        assert_eq!(rules.len(), 2);
        let distributor = AgencyFormRule::for_type(AgencyType::Distributor);
        assert!(distributor.warehouse_enabled && distributor.warehouse_required);
        let shelter = AgencyFormRule::for_type(AgencyType::Shelter);
        assert!(!shelter.warehouse_enabled && !shelter.warehouse_required);
    }

    #[test]
    fn check_expression_covers_every_type() {
        assert_eq!(
            agency_warehouse_check_sql(),
            "(agency_type = 'DISTRIBUTOR' AND warehouse_id IS NOT NULL) OR \
             (agency_type = 'SHELTER' AND warehouse_id IS NULL)"
        );
    }
}
