use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::EnumIter as StrumEnumIter;
use uuid::Uuid;

/// Status of an individual physical inventory unit.
///
/// `Available` and `InTransit` are the "free" states: a unit in either must
/// carry no sale-order linkage and no sold price. `PreReserved`/`PreSold`
/// mean demand attached while the unit is still inbound from the supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StrumEnumIter)]
pub enum UnitStatus {
    Available,
    Reserved,
    Sold,
    InTransit,
    PreReserved,
    PreSold,
    Returned,
    Damaged,
    Lost,
    Scrap,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Available => "available",
            UnitStatus::Reserved => "reserved",
            UnitStatus::Sold => "sold",
            UnitStatus::InTransit => "in_transit",
            UnitStatus::PreReserved => "pre_reserved",
            UnitStatus::PreSold => "pre_sold",
            UnitStatus::Returned => "returned",
            UnitStatus::Damaged => "damaged",
            UnitStatus::Lost => "lost",
            UnitStatus::Scrap => "scrap",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(UnitStatus::Available),
            "reserved" => Some(UnitStatus::Reserved),
            "sold" => Some(UnitStatus::Sold),
            "in_transit" => Some(UnitStatus::InTransit),
            "pre_reserved" => Some(UnitStatus::PreReserved),
            "pre_sold" => Some(UnitStatus::PreSold),
            "returned" => Some(UnitStatus::Returned),
            "damaged" => Some(UnitStatus::Damaged),
            "lost" => Some(UnitStatus::Lost),
            "scrap" => Some(UnitStatus::Scrap),
            _ => None,
        }
    }

    /// A free unit may be linked to new demand, consumed by a decrease
    /// adjustment, or deleted.
    pub fn is_free(&self) -> bool {
        matches!(self, UnitStatus::Available | UnitStatus::InTransit)
    }

    /// Terminal states are never overwritten by order cascades; only
    /// explicit adjustments or manual overrides touch them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnitStatus::Sold
                | UnitStatus::Returned
                | UnitStatus::Damaged
                | UnitStatus::Lost
                | UnitStatus::Scrap
        )
    }

    pub fn has_demand(&self) -> bool {
        matches!(
            self,
            UnitStatus::Reserved | UnitStatus::Sold | UnitStatus::PreReserved | UnitStatus::PreSold
        )
    }
}

/// Physical condition, independent of lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCondition {
    BrandNew,
    Misb,
    Used,
}

impl ItemCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::BrandNew => "brand_new",
            ItemCondition::Misb => "misb",
            ItemCondition::Used => "used",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "brand_new" => Some(ItemCondition::BrandNew),
            "misb" => Some(ItemCondition::Misb),
            "used" => Some(ItemCondition::Used),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub purchase_order_id: Option<Uuid>,
    pub purchase_order_line_id: Option<Uuid>,
    pub sale_order_id: Option<Uuid>,
    pub sale_order_line_id: Option<Uuid>,
    pub status: String,
    pub item_condition: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub purchase_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub sold_price: Option<Decimal>,
    pub location_id: Option<Uuid>,
    pub status_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Starts a status transition, returning the ActiveModel to persist.
    ///
    /// Every status write in the crate goes through here: the timestamp is
    /// bumped, and a move back to a free state clears the sale-order linkage
    /// and the sold price in the same write.
    pub fn begin_transition(self, to: UnitStatus, now: DateTime<Utc>) -> ActiveModel {
        let mut active: ActiveModel = self.into();
        active.status = Set(to.as_str().to_string());
        active.status_changed_at = Set(now);
        if to.is_free() {
            active.sale_order_id = Set(None);
            active.sale_order_line_id = Set(None);
            active.sold_price = Set(None);
        }
        active
    }

    /// A free unit has no sale-order linkage and a free status.
    pub fn is_free(&self) -> bool {
        self.sale_order_id.is_none()
            && UnitStatus::parse(&self.status).is_some_and(|s| s.is_free())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::purchase_order::Entity",
        from = "Column::PurchaseOrderId",
        to = "super::purchase_order::Column::Id"
    )]
    PurchaseOrder,
    #[sea_orm(
        belongs_to = "super::purchase_order_line::Entity",
        from = "Column::PurchaseOrderLineId",
        to = "super::purchase_order_line::Column::Id"
    )]
    PurchaseOrderLine,
    #[sea_orm(
        belongs_to = "super::sale_order_line::Entity",
        from = "Column::SaleOrderLineId",
        to = "super::sale_order_line::Column::Id"
    )]
    SaleOrderLine,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl Related<super::purchase_order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderLine.def()
    }
}

impl Related<super::sale_order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleOrderLine.def()
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
            if let ActiveValue::NotSet = active_model.status_changed_at {
                active_model.status_changed_at = Set(now);
            }
        }
        active_model.updated_at = Set(Some(now));

        Ok(active_model)
    }
}
