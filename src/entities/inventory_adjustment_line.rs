use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::inventory_adjustment_entry::EntryAction;
use super::inventory_unit::UnitStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineDirection {
    Increase,
    Decrease,
}

impl LineDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineDirection::Increase => "increase",
            LineDirection::Decrease => "decrease",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "increase" => Some(LineDirection::Increase),
            "decrease" => Some(LineDirection::Decrease),
            _ => None,
        }
    }
}

/// Allowed reasons for a decrease line. Each maps to the destination unit
/// status and the audit action recorded per touched unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecreaseReason {
    Scrap,
    Marketing,
    Lost,
    Damaged,
}

impl DecreaseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecreaseReason::Scrap => "scrap",
            DecreaseReason::Marketing => "marketing",
            DecreaseReason::Lost => "lost",
            DecreaseReason::Damaged => "damaged",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scrap" => Some(DecreaseReason::Scrap),
            "marketing" => Some(DecreaseReason::Marketing),
            "lost" => Some(DecreaseReason::Lost),
            "damaged" => Some(DecreaseReason::Damaged),
            _ => None,
        }
    }

    /// Destination status for units consumed by this reason. Marketing
    /// giveaways leave stock the same way scrap does.
    pub fn target_status(&self) -> UnitStatus {
        match self {
            DecreaseReason::Scrap | DecreaseReason::Marketing => UnitStatus::Scrap,
            DecreaseReason::Lost => UnitStatus::Lost,
            DecreaseReason::Damaged => UnitStatus::Damaged,
        }
    }

    pub fn entry_action(&self) -> EntryAction {
        match self {
            DecreaseReason::Scrap | DecreaseReason::Marketing => EntryAction::MarkedScrap,
            DecreaseReason::Lost => EntryAction::MarkedLost,
            DecreaseReason::Damaged => EntryAction::MarkedDamaged,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_adjustment_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub adjustment_id: Uuid,
    pub direction: String,
    pub quantity: i32,
    pub product_id: Uuid,
    pub item_condition: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub unit_cost: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub selling_price: Option<Decimal>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_adjustment::Entity",
        from = "Column::AdjustmentId",
        to = "super::inventory_adjustment::Column::Id"
    )]
    Adjustment,
    #[sea_orm(has_many = "super::inventory_adjustment_entry::Entity")]
    Entries,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::inventory_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustment.def()
    }
}

impl Related<super::inventory_adjustment_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }
        active_model.updated_at = Set(Some(now));

        Ok(active_model)
    }
}
