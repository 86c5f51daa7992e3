use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sale-order lifecycle as seen by the sync coordinator. The coordinator
/// owns the `Pending`/`Confirmed` boundary via payment coverage; shipment
/// events drive the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleOrderStatus {
    Pending,
    Confirmed,
    Preparing,
    InTransit,
    Delivered,
    Cancelled,
    Returned,
}

impl SaleOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleOrderStatus::Pending => "pending",
            SaleOrderStatus::Confirmed => "confirmed",
            SaleOrderStatus::Preparing => "preparing",
            SaleOrderStatus::InTransit => "in_transit",
            SaleOrderStatus::Delivered => "delivered",
            SaleOrderStatus::Cancelled => "cancelled",
            SaleOrderStatus::Returned => "returned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SaleOrderStatus::Pending),
            "confirmed" => Some(SaleOrderStatus::Confirmed),
            "preparing" => Some(SaleOrderStatus::Preparing),
            "in_transit" => Some(SaleOrderStatus::InTransit),
            "delivered" => Some(SaleOrderStatus::Delivered),
            "cancelled" => Some(SaleOrderStatus::Cancelled),
            "returned" => Some(SaleOrderStatus::Returned),
            _ => None,
        }
    }

    /// Statuses that payment coverage may demote back to `Pending`.
    /// `Delivered` is excluded: goods already left the warehouse, so only an
    /// explicit manual action may demote it.
    pub fn is_demotable(&self) -> bool {
        matches!(
            self,
            SaleOrderStatus::Confirmed | SaleOrderStatus::Preparing | SaleOrderStatus::InTransit
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale_order_line::Entity")]
    Lines,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    #[sea_orm(has_many = "super::shipment::Entity")]
    Shipments,
}

impl Related<super::sale_order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipments.def()
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
