use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{
    inventory_adjustment::{self, AdjustmentStatus, AdjustmentType, Entity as InventoryAdjustment},
    inventory_adjustment_entry::{self, Entity as AdjustmentEntry, EntryAction},
    inventory_adjustment_line::{
        self, DecreaseReason, Entity as AdjustmentLine, LineDirection,
    },
    inventory_unit::{self, Entity as InventoryUnit, ItemCondition, UnitStatus},
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

use super::{lock_rows, unit_status, preorder_allocator::PreorderAllocator};
use super::reference_sequencer::ReferenceSequencer;

/// Result of an `apply` call. `AlreadyApplied` is the idempotent no-op path,
/// not an error: background retries may re-invoke apply after the first call
/// committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    AlreadyApplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseOutcome {
    Reversed,
    NotApplied,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAdjustment {
    pub adjustment_type: AdjustmentType,
    pub note: Option<String>,
    #[validate]
    pub lines: Vec<NewAdjustmentLine>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAdjustmentLine {
    pub direction: LineDirection,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub product_id: Uuid,
    pub item_condition: Option<ItemCondition>,
    pub unit_cost: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub reason: Option<DecreaseReason>,
    pub note: Option<String>,
}

impl NewAdjustmentLine {
    fn check_reason(&self) -> Result<(), ServiceError> {
        if self.direction == LineDirection::Decrease && self.reason.is_none() {
            return Err(ServiceError::ValidationError(
                "decrease lines require a reason (scrap, marketing, lost, damaged)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Owns the draft → applied → draft lifecycle of manual inventory
/// corrections.
///
/// Apply and Reverse are idempotent and commit atomically with their
/// per-unit audit entries; once applied, an adjustment and its lines are
/// immutable outside those two operations.
#[derive(Clone)]
pub struct AdjustmentLedger {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    allocator: Arc<PreorderAllocator>,
    reference_kind: String,
}

impl AdjustmentLedger {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        allocator: Arc<PreorderAllocator>,
        reference_kind: String,
    ) -> Self {
        Self {
            db,
            event_sender,
            allocator,
            reference_kind,
        }
    }

    /// Creates a draft adjustment with its lines.
    pub async fn create_draft(
        &self,
        input: NewAdjustment,
    ) -> Result<inventory_adjustment::Model, ServiceError> {
        input.validate()?;
        for line in &input.lines {
            line.check_reason()?;
        }

        let adjustment = self
            .db
            .transaction::<_, inventory_adjustment::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let adjustment = inventory_adjustment::ActiveModel {
                        status: Set(AdjustmentStatus::Draft.as_str().to_string()),
                        adjustment_type: Set(input.adjustment_type.as_str().to_string()),
                        note: Set(input.note.clone()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    for line in input.lines {
                        Self::insert_line(txn, adjustment.id, line).await?;
                    }
                    Ok(adjustment)
                })
            })
            .await?;

        Ok(adjustment)
    }

    /// Adds a line to a draft adjustment. Rejected once the parent is
    /// applied.
    pub async fn add_line(
        &self,
        adjustment_id: Uuid,
        input: NewAdjustmentLine,
    ) -> Result<inventory_adjustment_line::Model, ServiceError> {
        input.validate()?;
        input.check_reason()?;

        let db = self.db.as_ref();
        let adjustment = Self::find_adjustment(db, adjustment_id).await?;
        Self::ensure_draft(&adjustment)?;
        Self::insert_line(db, adjustment_id, input).await
    }

    /// Replaces a line on a draft adjustment.
    pub async fn update_line(
        &self,
        line_id: Uuid,
        input: NewAdjustmentLine,
    ) -> Result<inventory_adjustment_line::Model, ServiceError> {
        input.validate()?;
        input.check_reason()?;

        let db = self.db.as_ref();
        let line = AdjustmentLine::find_by_id(line_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("adjustment line {} not found", line_id))
            })?;
        let adjustment = Self::find_adjustment(db, line.adjustment_id).await?;
        Self::ensure_draft(&adjustment)?;

        let mut active: inventory_adjustment_line::ActiveModel = line.into();
        active.direction = Set(input.direction.as_str().to_string());
        active.quantity = Set(input.quantity);
        active.product_id = Set(input.product_id);
        active.item_condition = Set(input.item_condition.map(|c| c.as_str().to_string()));
        active.unit_cost = Set(input.unit_cost);
        active.selling_price = Set(input.selling_price);
        active.reason = Set(input.reason.map(|r| r.as_str().to_string()));
        active.note = Set(input.note);
        Ok(active.update(db).await?)
    }

    /// Removes a line from a draft adjustment.
    pub async fn remove_line(&self, line_id: Uuid) -> Result<(), ServiceError> {
        let db = self.db.as_ref();
        let line = AdjustmentLine::find_by_id(line_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("adjustment line {} not found", line_id))
            })?;
        let adjustment = Self::find_adjustment(db, line.adjustment_id).await?;
        Self::ensure_draft(&adjustment)?;
        line.delete(db).await?;
        Ok(())
    }

    /// Updates the note/type of a draft adjustment.
    pub async fn update_draft(
        &self,
        adjustment_id: Uuid,
        adjustment_type: Option<AdjustmentType>,
        note: Option<String>,
    ) -> Result<inventory_adjustment::Model, ServiceError> {
        let db = self.db.as_ref();
        let adjustment = Self::find_adjustment(db, adjustment_id).await?;
        Self::ensure_draft(&adjustment)?;

        let mut active: inventory_adjustment::ActiveModel = adjustment.into();
        if let Some(adjustment_type) = adjustment_type {
            active.adjustment_type = Set(adjustment_type.as_str().to_string());
        }
        if let Some(note) = note {
            active.note = Set(Some(note));
        }
        Ok(active.update(db).await?)
    }

    /// Applies a draft adjustment: creates units for increase lines, consumes
    /// free units for decrease lines, and records one audit entry per unit
    /// touched. A second call on an applied adjustment is a no-op.
    #[instrument(skip(self), fields(adjustment_id = %adjustment_id))]
    pub async fn apply(
        &self,
        adjustment_id: Uuid,
        applied_by: Uuid,
    ) -> Result<ApplyOutcome, ServiceError> {
        let reference_kind = self.reference_kind.clone();

        let (outcome, reference, increase_products) = self
            .db
            .transaction::<_, (ApplyOutcome, Option<String>, BTreeSet<Uuid>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let now = Utc::now();
                        let backend = txn.get_database_backend();
                        let select = InventoryAdjustment::find_by_id(adjustment_id);
                        let adjustment = lock_rows(select, backend)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "adjustment {} not found",
                                    adjustment_id
                                ))
                            })?;

                        if adjustment.is_applied() {
                            return Ok((ApplyOutcome::AlreadyApplied, None, BTreeSet::new()));
                        }

                        let lines = AdjustmentLine::find()
                            .filter(
                                inventory_adjustment_line::Column::AdjustmentId.eq(adjustment_id),
                            )
                            .order_by_asc(inventory_adjustment_line::Column::CreatedAt)
                            .order_by_asc(inventory_adjustment_line::Column::Id)
                            .all(txn)
                            .await?;
                        if lines.is_empty() {
                            return Err(ServiceError::EmptyAdjustment(adjustment_id));
                        }

                        let mut increase_products = BTreeSet::new();
                        for line in &lines {
                            match LineDirection::parse(&line.direction) {
                                Some(LineDirection::Increase) => {
                                    Self::apply_increase(txn, line, now).await?;
                                    increase_products.insert(line.product_id);
                                }
                                Some(LineDirection::Decrease) => {
                                    Self::apply_decrease(txn, line, now).await?;
                                }
                                None => {
                                    return Err(ServiceError::InvalidStatus(format!(
                                        "adjustment line {} has unknown direction '{}'",
                                        line.id, line.direction
                                    )))
                                }
                            }
                        }

                        let reference = match adjustment.reference.clone() {
                            Some(reference) => reference,
                            None => {
                                let prefix =
                                    ReferenceSequencer::monthly_prefix(&reference_kind, now);
                                ReferenceSequencer::next_reference(txn, &prefix).await?
                            }
                        };

                        let mut active: inventory_adjustment::ActiveModel = adjustment.into();
                        active.status = Set(AdjustmentStatus::Applied.as_str().to_string());
                        active.reference = Set(Some(reference.clone()));
                        active.applied_at = Set(Some(now));
                        active.applied_by = Set(Some(applied_by));
                        active.update(txn).await?;

                        Ok((ApplyOutcome::Applied, Some(reference), increase_products))
                    })
                },
            )
            .await?;

        if outcome == ApplyOutcome::Applied {
            if let Some(reference) = reference {
                info!(%adjustment_id, %reference, "adjustment applied");
                self.event_sender
                    .send_best_effort(Event::AdjustmentApplied {
                        adjustment_id,
                        reference,
                    })
                    .await;
            }
            // Newly created stock may satisfy queued preorder demand.
            for product_id in increase_products {
                self.allocator.allocate_for_product(product_id, false).await?;
            }
        }

        Ok(outcome)
    }

    /// Reverses an applied adjustment by replaying its audit entries in
    /// reverse insertion order, returning it to draft. A second call on a
    /// draft adjustment is a no-op.
    #[instrument(skip(self), fields(adjustment_id = %adjustment_id))]
    pub async fn reverse(
        &self,
        adjustment_id: Uuid,
        reversed_by: Uuid,
    ) -> Result<ReverseOutcome, ServiceError> {
        let outcome = self
            .db
            .transaction::<_, ReverseOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let backend = txn.get_database_backend();
                    let select = InventoryAdjustment::find_by_id(adjustment_id);
                    let adjustment = lock_rows(select, backend)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "adjustment {} not found",
                                adjustment_id
                            ))
                        })?;

                    if !adjustment.is_applied() {
                        return Ok(ReverseOutcome::NotApplied);
                    }

                    let entries = AdjustmentEntry::find()
                        .filter(
                            inventory_adjustment_entry::Column::AdjustmentId.eq(adjustment_id),
                        )
                        .order_by_desc(inventory_adjustment_entry::Column::Id)
                        .all(txn)
                        .await?;

                    for entry in &entries {
                        Self::reverse_entry(txn, entry, now).await?;
                    }

                    AdjustmentEntry::delete_many()
                        .filter(
                            inventory_adjustment_entry::Column::AdjustmentId.eq(adjustment_id),
                        )
                        .exec(txn)
                        .await?;

                    let mut active: inventory_adjustment::ActiveModel = adjustment.into();
                    active.status = Set(AdjustmentStatus::Draft.as_str().to_string());
                    active.reversed_at = Set(Some(now));
                    active.reversed_by = Set(Some(reversed_by));
                    active.update(txn).await?;

                    Ok(ReverseOutcome::Reversed)
                })
            })
            .await?;

        if outcome == ReverseOutcome::Reversed {
            info!(%adjustment_id, "adjustment reversed");
            self.event_sender
                .send_best_effort(Event::AdjustmentReversed { adjustment_id })
                .await;
        }

        Ok(outcome)
    }

    async fn insert_line<C: ConnectionTrait>(
        conn: &C,
        adjustment_id: Uuid,
        input: NewAdjustmentLine,
    ) -> Result<inventory_adjustment_line::Model, ServiceError> {
        let line = inventory_adjustment_line::ActiveModel {
            adjustment_id: Set(adjustment_id),
            direction: Set(input.direction.as_str().to_string()),
            quantity: Set(input.quantity),
            product_id: Set(input.product_id),
            item_condition: Set(input.item_condition.map(|c| c.as_str().to_string())),
            unit_cost: Set(input.unit_cost),
            selling_price: Set(input.selling_price),
            reason: Set(input.reason.map(|r| r.as_str().to_string())),
            note: Set(input.note),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(line)
    }

    async fn find_adjustment<C: ConnectionTrait>(
        conn: &C,
        adjustment_id: Uuid,
    ) -> Result<inventory_adjustment::Model, ServiceError> {
        InventoryAdjustment::find_by_id(adjustment_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("adjustment {} not found", adjustment_id))
            })
    }

    fn ensure_draft(adjustment: &inventory_adjustment::Model) -> Result<(), ServiceError> {
        if adjustment.is_applied() {
            return Err(ServiceError::AlreadyApplied(adjustment.id));
        }
        Ok(())
    }

    async fn apply_increase<C: ConnectionTrait>(
        conn: &C,
        line: &inventory_adjustment_line::Model,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let condition = line
            .item_condition
            .clone()
            .unwrap_or_else(|| ItemCondition::BrandNew.as_str().to_string());

        for _ in 0..line.quantity {
            let unit = inventory_unit::ActiveModel {
                product_id: Set(line.product_id),
                status: Set(UnitStatus::Available.as_str().to_string()),
                item_condition: Set(condition.clone()),
                purchase_cost: Set(line.unit_cost.unwrap_or(Decimal::ZERO)),
                status_changed_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?;

            Self::record_entry(
                conn,
                line,
                unit.id,
                EntryAction::Created,
                None,
                Some(UnitStatus::Available),
                now,
            )
            .await?;
        }
        Ok(())
    }

    async fn apply_decrease<C: ConnectionTrait>(
        conn: &C,
        line: &inventory_adjustment_line::Model,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let reason = line
            .reason
            .as_deref()
            .and_then(DecreaseReason::parse)
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "decrease line {} is missing an allowed reason",
                    line.id
                ))
            })?;

        // Cheapest units go first so write-offs carry the least cost;
        // created_at then id keep the pick deterministic.
        let select = InventoryUnit::find()
            .filter(inventory_unit::Column::ProductId.eq(line.product_id))
            .filter(inventory_unit::Column::SaleOrderId.is_null())
            .filter(inventory_unit::Column::Status.is_in([
                UnitStatus::Available.as_str(),
                UnitStatus::InTransit.as_str(),
            ]))
            .order_by_asc(inventory_unit::Column::PurchaseCost)
            .order_by_asc(inventory_unit::Column::CreatedAt)
            .order_by_asc(inventory_unit::Column::Id);
        let free = lock_rows(select, conn.get_database_backend())
            .all(conn)
            .await?;

        let needed = line.quantity as usize;
        if free.len() < needed {
            let detail = Self::shortage_detail(conn, line.product_id, needed, free.len()).await?;
            return Err(ServiceError::InsufficientStock(detail));
        }

        for unit in free.into_iter().take(needed) {
            let previous = unit_status(&unit)?;
            let unit_id = unit.id;
            unit.begin_transition(reason.target_status(), now)
                .update(conn)
                .await?;

            Self::record_entry(
                conn,
                line,
                unit_id,
                reason.entry_action(),
                Some(previous),
                Some(reason.target_status()),
                now,
            )
            .await?;
        }
        Ok(())
    }

    async fn reverse_entry<C: ConnectionTrait>(
        conn: &C,
        entry: &inventory_adjustment_entry::Model,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let action = EntryAction::parse(&entry.action).ok_or_else(|| {
            ServiceError::InvalidStatus(format!(
                "adjustment entry {} has unknown action '{}'",
                entry.id, entry.action
            ))
        })?;

        match action {
            EntryAction::Created => {
                let unit = InventoryUnit::find_by_id(entry.inventory_unit_id)
                    .one(conn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotReversible(format!(
                            "unit {} created by this adjustment no longer exists",
                            entry.inventory_unit_id
                        ))
                    })?;
                if !unit.is_free() {
                    return Err(ServiceError::NotReversible(format!(
                        "unit {} created by this adjustment is {} and linked to demand",
                        unit.id, unit.status
                    )));
                }
                unit.delete(conn).await?;
            }
            action if action.is_status_change() => {
                let unit = InventoryUnit::find_by_id(entry.inventory_unit_id)
                    .one(conn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotReversible(format!(
                            "unit {} touched by this adjustment no longer exists",
                            entry.inventory_unit_id
                        ))
                    })?;
                let previous = entry
                    .previous_status
                    .as_deref()
                    .and_then(UnitStatus::parse)
                    .ok_or_else(|| {
                        ServiceError::ConsistencyError(format!(
                            "entry {} has no usable previous status",
                            entry.id
                        ))
                    })?;
                unit.begin_transition(previous, now).update(conn).await?;
            }
            _ => {
                return Err(ServiceError::NotReversible(format!(
                    "entry {} action '{}' cannot be replayed",
                    entry.id, entry.action
                )))
            }
        }
        Ok(())
    }

    async fn record_entry<C: ConnectionTrait>(
        conn: &C,
        line: &inventory_adjustment_line::Model,
        unit_id: Uuid,
        action: EntryAction,
        previous: Option<UnitStatus>,
        new: Option<UnitStatus>,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        inventory_adjustment_entry::ActiveModel {
            adjustment_id: Set(line.adjustment_id),
            line_id: Set(line.id),
            inventory_unit_id: Set(unit_id),
            action: Set(action.as_str().to_string()),
            previous_status: Set(previous.map(|s| s.as_str().to_string())),
            new_status: Set(new.map(|s| s.as_str().to_string())),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(())
    }

    async fn shortage_detail<C: ConnectionTrait>(
        conn: &C,
        product_id: Uuid,
        needed: usize,
        free: usize,
    ) -> Result<String, ServiceError> {
        let reserved = InventoryUnit::find()
            .filter(inventory_unit::Column::ProductId.eq(product_id))
            .filter(inventory_unit::Column::Status.is_in([
                UnitStatus::Reserved.as_str(),
                UnitStatus::PreReserved.as_str(),
            ]))
            .count(conn)
            .await?;
        let sold = InventoryUnit::find()
            .filter(inventory_unit::Column::ProductId.eq(product_id))
            .filter(inventory_unit::Column::Status.is_in([
                UnitStatus::Sold.as_str(),
                UnitStatus::PreSold.as_str(),
            ]))
            .count(conn)
            .await?;
        Ok(format!(
            "product {}: needed {} free units, found {} ({} reserved, {} sold)",
            product_id, needed, free, reserved, sold
        ))
    }
}
