use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an applied line did to one concrete inventory unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryAction {
    Created,
    Deleted,
    StatusChanged,
    MarkedLost,
    MarkedDamaged,
    MarkedScrap,
}

impl EntryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryAction::Created => "created",
            EntryAction::Deleted => "deleted",
            EntryAction::StatusChanged => "status_changed",
            EntryAction::MarkedLost => "marked_lost",
            EntryAction::MarkedDamaged => "marked_damaged",
            EntryAction::MarkedScrap => "marked_scrap",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(EntryAction::Created),
            "deleted" => Some(EntryAction::Deleted),
            "status_changed" => Some(EntryAction::StatusChanged),
            "marked_lost" => Some(EntryAction::MarkedLost),
            "marked_damaged" => Some(EntryAction::MarkedDamaged),
            "marked_scrap" => Some(EntryAction::MarkedScrap),
            _ => None,
        }
    }

    /// Actions that record a status change a reversal can undo.
    pub fn is_status_change(&self) -> bool {
        matches!(
            self,
            EntryAction::StatusChanged
                | EntryAction::MarkedLost
                | EntryAction::MarkedDamaged
                | EntryAction::MarkedScrap
        )
    }
}

/// Append-only audit row written at apply time, one per unit touched.
///
/// The auto-increment key doubles as the replay order: Reverse walks entries
/// by descending id, so prior state never has to be inferred from current
/// unit fields.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_adjustment_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub adjustment_id: Uuid,
    pub line_id: Uuid,
    pub inventory_unit_id: Uuid,
    pub action: String,
    pub previous_status: Option<String>,
    pub new_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_adjustment::Entity",
        from = "Column::AdjustmentId",
        to = "super::inventory_adjustment::Column::Id"
    )]
    Adjustment,
    #[sea_orm(
        belongs_to = "super::inventory_adjustment_line::Entity",
        from = "Column::LineId",
        to = "super::inventory_adjustment_line::Column::Id"
    )]
    Line,
}

impl Related<super::inventory_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustment.def()
    }
}

impl Related<super::inventory_adjustment_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Line.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
