use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How urgently a request, or one of its lines, must be met.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Urgency {
    #[sea_orm(string_value = "L")]
    #[serde(rename = "L")]
    #[strum(serialize = "L")]
    Low,
    #[sea_orm(string_value = "M")]
    #[serde(rename = "M")]
    #[strum(serialize = "M")]
    Medium,
    #[sea_orm(string_value = "H")]
    #[serde(rename = "H")]
    #[strum(serialize = "H")]
    High,
    #[sea_orm(string_value = "C")]
    #[serde(rename = "C")]
    #[strum(serialize = "C")]
    Critical,
}

/// Lifecycle of a relief request. Stored as the numeric codes field teams
/// already use on paper forms.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[sea_orm(num_value = 0)]
    Draft,
    #[sea_orm(num_value = 1)]
    AwaitingApproval,
    #[sea_orm(num_value = 2)]
    Cancelled,
    #[sea_orm(num_value = 3)]
    Submitted,
    #[sea_orm(num_value = 4)]
    Denied,
    #[sea_orm(num_value = 5)]
    PartFilled,
    #[sea_orm(num_value = 6)]
    Closed,
    #[sea_orm(num_value = 7)]
    Filled,
}

impl RequestStatus {
    /// Statuses still waiting on someone: draft, awaiting approval, submitted.
    pub const PENDING: [RequestStatus; 3] = [
        RequestStatus::Draft,
        RequestStatus::AwaitingApproval,
        RequestStatus::Submitted,
    ];
    pub const COMPLETED: [RequestStatus; 2] = [RequestStatus::Closed, RequestStatus::Filled];

    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Draft, AwaitingApproval)
                | (Draft, Cancelled)
                | (AwaitingApproval, Submitted)
                | (AwaitingApproval, Denied)
                | (AwaitingApproval, Cancelled)
                | (Submitted, Cancelled)
                | (Submitted, PartFilled)
                | (Submitted, Filled)
                | (Submitted, Closed)
                | (PartFilled, Filled)
                | (PartFilled, Closed)
        )
    }

    /// Lines can only change before the request goes up for approval.
    pub fn is_editable(self) -> bool {
        self == RequestStatus::Draft
    }
}

/// Which subset of requests a list call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStage {
    #[default]
    All,
    Pending,
    Completed,
}

impl RequestStage {
    pub fn statuses(self) -> Option<&'static [RequestStatus]> {
        match self {
            RequestStage::All => None,
            RequestStage::Pending => Some(&RequestStatus::PENDING),
            RequestStage::Completed => Some(&RequestStatus::COMPLETED),
        }
    }
}

/// An agency's request for relief items, optionally tied to a disaster event.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "relief_requests")]
#[schema(as = ReliefRequest)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub agency_id: Uuid,
    #[sea_orm(nullable)]
    pub event_id: Option<Uuid>,
    pub request_date: NaiveDate,
    pub urgency_ind: Urgency,
    pub status_code: RequestStatus,
    #[sea_orm(nullable)]
    pub review_by_id: Option<String>,
    #[sea_orm(nullable)]
    pub review_dtime: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub status_reason_desc: Option<String>,
    #[sea_orm(nullable)]
    pub comments_text: Option<String>,
    pub create_by_id: String,
    pub create_dtime: DateTime<Utc>,
    pub update_by_id: String,
    pub update_dtime: DateTime<Utc>,
    pub version_nbr: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::agency::Entity",
        from = "Column::AgencyId",
        to = "super::agency::Column::Id"
    )]
    Agency,
    #[sea_orm(
        belongs_to = "super::disaster_event::Entity",
        from = "Column::EventId",
        to = "super::disaster_event::Column::Id"
    )]
    Event,
    #[sea_orm(has_many = "super::relief_request_item::Entity")]
    Items,
}

impl Related<super::agency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agency.def()
    }
}

impl Related<super::disaster_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::relief_request_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

super::audited_active_model!();
super::versioned_entity!("Relief request");

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RequestStatus::Draft, RequestStatus::AwaitingApproval, true)]
    #[case(RequestStatus::Draft, RequestStatus::Submitted, false)]
    #[case(RequestStatus::AwaitingApproval, RequestStatus::Submitted, true)]
    #[case(RequestStatus::AwaitingApproval, RequestStatus::Denied, true)]
    #[case(RequestStatus::Submitted, RequestStatus::Cancelled, true)]
    #[case(RequestStatus::Denied, RequestStatus::Submitted, false)]
    #[case(RequestStatus::Cancelled, RequestStatus::Draft, false)]
    #[case(RequestStatus::Filled, RequestStatus::Closed, false)]
    fn transition_table(
        #[case] from: RequestStatus,
        #[case] to: RequestStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn stages_cover_the_expected_codes() {
        let codes = |stage: RequestStage| -> Vec<i32> {
            stage
                .statuses()
                .unwrap_or(&[])
                .iter()
                .map(|s| s.to_value())
                .collect()
        };
        assert_eq!(codes(RequestStage::Pending), vec![0, 1, 3]);
        assert_eq!(codes(RequestStage::Completed), vec![6, 7]);
        assert!(RequestStage::All.statuses().is_none());
    }
}
