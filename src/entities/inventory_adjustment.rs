use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a manual correction batch. `Draft` is also the resting state
/// after a reversal; `applied_at`/`reversed_at` record the two transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentStatus {
    Draft,
    Applied,
}

impl AdjustmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentStatus::Draft => "draft",
            AdjustmentStatus::Applied => "applied",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(AdjustmentStatus::Draft),
            "applied" => Some(AdjustmentStatus::Applied),
            _ => None,
        }
    }
}

/// Categorical reason for the whole adjustment batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentType {
    Audit,
    Correction,
    Damage,
    Loss,
    Found,
    Theft,
    ReturnToVendor,
    Other,
}

impl AdjustmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Audit => "audit",
            AdjustmentType::Correction => "correction",
            AdjustmentType::Damage => "damage",
            AdjustmentType::Loss => "loss",
            AdjustmentType::Found => "found",
            AdjustmentType::Theft => "theft",
            AdjustmentType::ReturnToVendor => "return_to_vendor",
            AdjustmentType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "audit" => Some(AdjustmentType::Audit),
            "correction" => Some(AdjustmentType::Correction),
            "damage" => Some(AdjustmentType::Damage),
            "loss" => Some(AdjustmentType::Loss),
            "found" => Some(AdjustmentType::Found),
            "theft" => Some(AdjustmentType::Theft),
            "return_to_vendor" => Some(AdjustmentType::ReturnToVendor),
            "other" => Some(AdjustmentType::Other),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub status: String,
    pub adjustment_type: String,
    /// Assigned lazily at apply time, format `ADJ-YYYYMM-NN`.
    pub reference: Option<String>,
    pub note: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
    pub applied_by: Option<Uuid>,
    pub reversed_at: Option<DateTime<Utc>>,
    pub reversed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_applied(&self) -> bool {
        AdjustmentStatus::parse(&self.status) == Some(AdjustmentStatus::Applied)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_adjustment_line::Entity")]
    Lines,
    #[sea_orm(has_many = "super::inventory_adjustment_entry::Entity")]
    Entries,
}

impl Related<super::inventory_adjustment_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
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
