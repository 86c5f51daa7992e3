use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{
    inventory_unit::{self, Entity as InventoryUnit, UnitStatus},
    payment::{self, Entity as Payment, PaymentStatus},
    preorder_reservation::{self, Entity as PreorderReservation, ReservationStatus},
    purchase_order::{Entity as PurchaseOrder, PurchaseOrderStatus},
    purchase_order_line,
    sale_order::{self, Entity as SaleOrder, SaleOrderStatus},
    sale_order_line::{self, Entity as SaleOrderLine},
    shipment::{Entity as Shipment, ShipmentStatus},
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

use super::{lock_rows, preorder_allocator::PreorderAllocator, sale_order_status, unit_status};

/// Capability interface over the two order-line types whose quantity may
/// shrink. Implementations decide which units count as sheddable and how a
/// shed unit is disposed of.
#[async_trait]
pub trait LineFreeUnits: Send + Sync {
    fn line_id(&self) -> Uuid;
    fn product_id(&self) -> Uuid;

    /// Units that may be shed when the line shrinks, in shedding order.
    async fn free_units(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<Vec<inventory_unit::Model>, ServiceError>;

    /// Queued demand (preorder/backorder quantity) shrinks before any unit
    /// is touched. Returns the need left after shrinking.
    async fn shed_pending_demand(
        &self,
        txn: &DatabaseTransaction,
        need: i64,
    ) -> Result<i64, ServiceError>;

    /// Disposes of one sheddable unit.
    async fn shed_unit(
        &self,
        txn: &DatabaseTransaction,
        unit: inventory_unit::Model,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError>;

    /// Human-readable description of why the line cannot shrink further.
    async fn blocked_detail(&self, txn: &DatabaseTransaction) -> Result<String, ServiceError>;
}

/// Sale-order line view: sheddable units are reserved/pre-reserved (never
/// sold); shedding releases them back to free states.
pub struct SaleOrderLineCapacity(pub sale_order_line::Model);

/// Purchase-order line view: sheddable units are free units received from
/// this line; shedding deletes them, since fewer were actually ordered.
pub struct PurchaseOrderLineCapacity(pub purchase_order_line::Model);

/// Applies the inventory-unit consequences of status changes on payments,
/// shipments, sale orders, and purchase orders.
///
/// Controllers call in after persisting their own entity change; a domain
/// error from here must be treated as a failed save. Each operation is one
/// transaction — partial cascades are never observable.
#[derive(Clone)]
pub struct StatusSyncCoordinator {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    allocator: Arc<PreorderAllocator>,
}

impl StatusSyncCoordinator {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        allocator: Arc<PreorderAllocator>,
    ) -> Self {
        Self {
            db,
            event_sender,
            allocator,
        }
    }

    /// Recomputes whether the order is fully paid and promotes or demotes it
    /// accordingly, cascading to its units.
    ///
    /// Promotion: `Pending` → `Confirmed` (reserved→sold, pre_reserved→
    /// pre_sold). Demotion: any of `Confirmed`/`Preparing`/`InTransit` →
    /// `Pending` (sold→reserved, pre_sold→pre_reserved). `Delivered` orders
    /// are never auto-demoted.
    #[instrument(skip(self), fields(sale_order_id = %sale_order_id))]
    pub async fn evaluate_payment_coverage(
        &self,
        sale_order_id: Uuid,
    ) -> Result<SaleOrderStatus, ServiceError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let order = Self::find_order(&txn, sale_order_id).await?;
        let current = sale_order_status(&order)?;
        let covered = Self::payment_coverage(&txn, &order).await? >= order.total_amount;

        let target = if covered && current == SaleOrderStatus::Pending {
            SaleOrderStatus::Confirmed
        } else if !covered && current.is_demotable() {
            SaleOrderStatus::Pending
        } else {
            txn.commit().await?;
            return Ok(current);
        };

        Self::apply_order_status(&txn, order, current, target, now).await?;
        txn.commit().await?;

        self.emit_order_status(sale_order_id, current, target).await;
        Ok(target)
    }

    /// Maps a shipment status change onto the owning sale order.
    #[instrument(skip(self), fields(shipment_id = %shipment_id))]
    pub async fn on_shipment_status_changed(
        &self,
        shipment_id: Uuid,
    ) -> Result<SaleOrderStatus, ServiceError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let shipment = Shipment::find_by_id(shipment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("shipment {} not found", shipment_id)))?;
        let shipment_status = ShipmentStatus::parse(&shipment.status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!(
                "shipment {} has unknown status '{}'",
                shipment.id, shipment.status
            ))
        })?;

        let order = Self::find_order(&txn, shipment.sale_order_id).await?;
        let current = sale_order_status(&order)?;

        let target = match shipment_status {
            ShipmentStatus::Shipped => Some(SaleOrderStatus::InTransit),
            ShipmentStatus::Delivered => Some(SaleOrderStatus::Delivered),
            ShipmentStatus::Returned => Some(SaleOrderStatus::Returned),
            // A cancelled shipment cannot un-deliver an order.
            ShipmentStatus::Cancelled => {
                if current == SaleOrderStatus::Delivered {
                    None
                } else {
                    Some(SaleOrderStatus::Cancelled)
                }
            }
            // A shipment rolled back to pending returns the order to
            // whatever its payment coverage implies.
            ShipmentStatus::Pending => {
                let covered = Self::payment_coverage(&txn, &order).await? >= order.total_amount;
                Some(if covered {
                    SaleOrderStatus::Confirmed
                } else {
                    SaleOrderStatus::Pending
                })
            }
        };

        let result = match target {
            Some(target) if target != current => {
                Self::apply_order_status(&txn, order, current, target, now).await?;
                target
            }
            _ => current,
        };
        txn.commit().await?;

        if result != current {
            self.emit_order_status(shipment.sale_order_id, current, result).await;
        }
        Ok(result)
    }

    /// Applies the purchase-order cascade to units sourced from the order,
    /// then re-runs the preorder allocator when stock was received.
    #[instrument(skip(self), fields(purchase_order_id = %purchase_order_id))]
    pub async fn on_purchase_order_status_changed(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<u64, ServiceError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let purchase_order = PurchaseOrder::find_by_id(purchase_order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("purchase order {} not found", purchase_order_id))
            })?;
        let status = PurchaseOrderStatus::parse(&purchase_order.status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!(
                "purchase order {} has unknown status '{}'",
                purchase_order.id, purchase_order.status
            ))
        })?;

        let select = InventoryUnit::find()
            .filter(inventory_unit::Column::PurchaseOrderId.eq(purchase_order_id));
        let units = lock_rows(select, txn.get_database_backend())
            .all(&txn)
            .await?;

        let mut touched = 0u64;
        let mut products = BTreeSet::new();
        for unit in units {
            let from = unit_status(&unit)?;
            let to = match (status, from) {
                // Receipt: free stock lands on the shelf, and demand that was
                // waiting on the shipment firms up.
                (PurchaseOrderStatus::Delivered, UnitStatus::InTransit)
                | (PurchaseOrderStatus::Delivered, UnitStatus::Available) => {
                    Some(UnitStatus::Available)
                }
                (PurchaseOrderStatus::Delivered, UnitStatus::PreReserved) => {
                    Some(UnitStatus::Reserved)
                }
                (PurchaseOrderStatus::Delivered, UnitStatus::PreSold) => Some(UnitStatus::Sold),
                (PurchaseOrderStatus::Pending, UnitStatus::Available)
                | (PurchaseOrderStatus::Pending, UnitStatus::InTransit)
                | (PurchaseOrderStatus::InTransit, UnitStatus::Available)
                | (PurchaseOrderStatus::InTransit, UnitStatus::InTransit) => {
                    Some(UnitStatus::InTransit)
                }
                (PurchaseOrderStatus::Cancelled, UnitStatus::Available)
                | (PurchaseOrderStatus::Cancelled, UnitStatus::InTransit) => {
                    Some(UnitStatus::Scrap)
                }
                _ => None,
            };
            if let Some(to) = to {
                if to != from {
                    products.insert(unit.product_id);
                    unit.begin_transition(to, now).update(&txn).await?;
                    touched += 1;
                }
            }
        }
        txn.commit().await?;

        info!(
            purchase_order_id = %purchase_order_id,
            status = %status.as_str(),
            touched,
            "purchase order cascade applied"
        );
        self.event_sender
            .send_best_effort(Event::PurchaseOrderCascaded {
                purchase_order_id,
                status: status.as_str().to_string(),
                units_touched: touched,
            })
            .await;

        if status == PurchaseOrderStatus::Delivered {
            for product_id in products {
                self.allocator.allocate_for_product(product_id, false).await?;
            }
        }
        Ok(touched)
    }

    /// Verifies and performs the shedding required when an order line's
    /// quantity shrinks. Queued preorder demand shrinks first; a shortfall
    /// aborts the whole update.
    pub async fn reduce_line_quantity(
        &self,
        line: &dyn LineFreeUnits,
        old_quantity: i32,
        new_quantity: i32,
    ) -> Result<(), ServiceError> {
        if new_quantity < 0 {
            return Err(ServiceError::ValidationError(
                "line quantity cannot be negative".to_string(),
            ));
        }
        if new_quantity >= old_quantity {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let mut need = i64::from(old_quantity - new_quantity);
        need = line.shed_pending_demand(&txn, need).await?;

        if need > 0 {
            let free = line.free_units(&txn).await?;
            if (free.len() as i64) < need {
                let detail = line.blocked_detail(&txn).await?;
                return Err(ServiceError::InsufficientStock(format!(
                    "cannot reduce line {} by {}: {}",
                    line.line_id(),
                    old_quantity - new_quantity,
                    detail
                )));
            }
            for unit in free.into_iter().take(need as usize) {
                line.shed_unit(&txn, unit, now).await?;
            }
        }
        txn.commit().await?;

        // Released units may serve queued demand for the product.
        self.allocator
            .allocate_for_product(line.product_id(), false)
            .await?;
        Ok(())
    }

    /// Deletes a sale-order line, releasing its units and cancelling its
    /// pending reservations. Sold units block the deletion.
    #[instrument(skip(self), fields(sale_order_line_id = %sale_order_line_id))]
    pub async fn release_on_line_delete(
        &self,
        sale_order_line_id: Uuid,
    ) -> Result<u64, ServiceError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let line = SaleOrderLine::find_by_id(sale_order_line_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "sale order line {} not found",
                    sale_order_line_id
                ))
            })?;
        let product_id = line.product_id;

        let select = InventoryUnit::find()
            .filter(inventory_unit::Column::SaleOrderLineId.eq(sale_order_line_id));
        let units = lock_rows(select, txn.get_database_backend())
            .all(&txn)
            .await?;

        let sold = units
            .iter()
            .filter(|u| u.status == UnitStatus::Sold.as_str())
            .count();
        if sold > 0 {
            return Err(ServiceError::ConsistencyError(format!(
                "sale order line {} has {} sold units; deletion is blocked",
                sale_order_line_id, sold
            )));
        }

        let mut released = 0u64;
        for unit in units {
            let to = match unit_status(&unit)? {
                UnitStatus::Reserved => UnitStatus::Available,
                UnitStatus::PreReserved | UnitStatus::PreSold => UnitStatus::InTransit,
                other => {
                    return Err(ServiceError::ConsistencyError(format!(
                        "unit {} linked to line {} has unexpected status {}",
                        unit.id,
                        sale_order_line_id,
                        other.as_str()
                    )))
                }
            };
            unit.begin_transition(to, now).update(&txn).await?;
            released += 1;
        }

        PreorderAllocator::cancel_for_line(&txn, sale_order_line_id).await?;
        line.delete(&txn).await?;
        txn.commit().await?;

        self.event_sender
            .send_best_effort(Event::UnitsReleased {
                product_id,
                count: released,
            })
            .await;
        self.allocator.allocate_for_product(product_id, false).await?;
        Ok(released)
    }

    /// Links free units to a sale-order line: on-hand stock is reserved,
    /// inbound stock is pre-reserved. Any shortfall joins the preorder queue
    /// as a pending reservation instead of failing.
    #[instrument(skip(self), fields(sale_order_line_id = %sale_order_line_id))]
    pub async fn attach_demand(
        &self,
        sale_order_line_id: Uuid,
    ) -> Result<AttachOutcome, ServiceError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let line = SaleOrderLine::find_by_id(sale_order_line_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "sale order line {} not found",
                    sale_order_line_id
                ))
            })?;
        let order = Self::find_order(&txn, line.sale_order_id).await?;

        let linked = InventoryUnit::find()
            .filter(inventory_unit::Column::SaleOrderLineId.eq(line.id))
            .all(&txn)
            .await?
            .len() as i32;
        let wanted = line.quantity - linked;
        if wanted <= 0 {
            txn.commit().await?;
            return Ok(AttachOutcome::default());
        }

        let select = InventoryUnit::find()
            .filter(inventory_unit::Column::ProductId.eq(line.product_id))
            .filter(inventory_unit::Column::SaleOrderId.is_null())
            .filter(inventory_unit::Column::Status.is_in([
                UnitStatus::Available.as_str(),
                UnitStatus::InTransit.as_str(),
            ]))
            .order_by_asc(inventory_unit::Column::CreatedAt)
            .order_by_asc(inventory_unit::Column::Id);
        let mut free = lock_rows(select, txn.get_database_backend())
            .all(&txn)
            .await?;
        free.sort_by_key(|u| u.status != UnitStatus::Available.as_str());

        let mut outcome = AttachOutcome::default();
        for unit in free.into_iter().take(wanted as usize) {
            let to = match unit_status(&unit)? {
                UnitStatus::Available => UnitStatus::Reserved,
                UnitStatus::InTransit => UnitStatus::PreReserved,
                other => {
                    return Err(ServiceError::ConsistencyError(format!(
                        "free-unit query returned unit {} with status {}",
                        unit.id,
                        other.as_str()
                    )))
                }
            };
            let mut active = unit.begin_transition(to, now);
            active.sale_order_id = Set(Some(order.id));
            active.sale_order_line_id = Set(Some(line.id));
            active.update(&txn).await?;
            outcome.attached += 1;
        }

        let shortfall = wanted - outcome.attached as i32;
        if shortfall > 0 {
            preorder_reservation::ActiveModel {
                product_id: Set(line.product_id),
                user_id: Set(order.user_id),
                sale_order_id: Set(Some(order.id)),
                sale_order_line_id: Set(Some(line.id)),
                status: Set(ReservationStatus::Pending.as_str().to_string()),
                quantity: Set(shortfall),
                reserved_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            outcome.queued = shortfall;
        }
        txn.commit().await?;
        Ok(outcome)
    }

    async fn find_order(
        txn: &DatabaseTransaction,
        sale_order_id: Uuid,
    ) -> Result<sale_order::Model, ServiceError> {
        SaleOrder::find_by_id(sale_order_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("sale order {} not found", sale_order_id))
            })
    }

    /// Sum of completed payments for the order.
    async fn payment_coverage(
        txn: &DatabaseTransaction,
        order: &sale_order::Model,
    ) -> Result<Decimal, ServiceError> {
        let payments = Payment::find()
            .filter(payment::Column::SaleOrderId.eq(order.id))
            .filter(payment::Column::Status.eq(PaymentStatus::Completed.as_str()))
            .all(txn)
            .await?;
        Ok(payments.iter().map(|p| p.amount).sum())
    }

    /// Writes the order status and cascades to its units when crossing the
    /// paid/unpaid boundary.
    async fn apply_order_status(
        txn: &DatabaseTransaction,
        order: sale_order::Model,
        from: SaleOrderStatus,
        to: SaleOrderStatus,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let order_id = order.id;
        if from == SaleOrderStatus::Pending && to == SaleOrderStatus::Confirmed {
            Self::promote_units(txn, order_id, now).await?;
        } else if from.is_demotable() && to == SaleOrderStatus::Pending {
            Self::demote_units(txn, order_id, now).await?;
        }

        let mut active: sale_order::ActiveModel = order.into();
        active.status = Set(to.as_str().to_string());
        active.update(txn).await?;
        Ok(())
    }

    /// reserved→sold, pre_reserved→pre_sold; stamps the sold price from the
    /// owning line when the unit has none.
    async fn promote_units(
        txn: &DatabaseTransaction,
        order_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let prices: HashMap<Uuid, Option<Decimal>> = SaleOrderLine::find()
            .filter(sale_order_line::Column::SaleOrderId.eq(order_id))
            .all(txn)
            .await?
            .into_iter()
            .map(|l| (l.id, l.unit_price))
            .collect();

        let select = InventoryUnit::find()
            .filter(inventory_unit::Column::SaleOrderId.eq(order_id))
            .filter(inventory_unit::Column::Status.is_in([
                UnitStatus::Reserved.as_str(),
                UnitStatus::PreReserved.as_str(),
            ]));
        let units = lock_rows(select, txn.get_database_backend()).all(txn).await?;

        for unit in units {
            let to = match unit_status(&unit)? {
                UnitStatus::Reserved => UnitStatus::Sold,
                _ => UnitStatus::PreSold,
            };
            let price = unit
                .sold_price
                .or_else(|| unit.sale_order_line_id.and_then(|l| prices.get(&l).copied().flatten()));
            let mut active = unit.begin_transition(to, now);
            active.sold_price = Set(price);
            active.update(txn).await?;
        }
        Ok(())
    }

    /// sold→reserved, pre_sold→pre_reserved.
    async fn demote_units(
        txn: &DatabaseTransaction,
        order_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let select = InventoryUnit::find()
            .filter(inventory_unit::Column::SaleOrderId.eq(order_id))
            .filter(inventory_unit::Column::Status.is_in([
                UnitStatus::Sold.as_str(),
                UnitStatus::PreSold.as_str(),
            ]));
        let units = lock_rows(select, txn.get_database_backend()).all(txn).await?;

        for unit in units {
            let to = match unit_status(&unit)? {
                UnitStatus::Sold => UnitStatus::Reserved,
                _ => UnitStatus::PreReserved,
            };
            unit.begin_transition(to, now).update(txn).await?;
        }
        Ok(())
    }

    async fn emit_order_status(
        &self,
        sale_order_id: Uuid,
        old: SaleOrderStatus,
        new: SaleOrderStatus,
    ) {
        if old == new {
            return;
        }
        self.event_sender
            .send_best_effort(Event::SaleOrderStatusChanged {
                sale_order_id,
                old_status: old.as_str().to_string(),
                new_status: new.as_str().to_string(),
            })
            .await;
    }
}

/// Result of attaching a sale-order line's demand to stock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttachOutcome {
    /// Units linked to the line.
    pub attached: usize,
    /// Quantity that joined the preorder queue.
    pub queued: i32,
}

#[async_trait]
impl LineFreeUnits for SaleOrderLineCapacity {
    fn line_id(&self) -> Uuid {
        self.0.id
    }

    fn product_id(&self) -> Uuid {
        self.0.product_id
    }

    async fn free_units(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<Vec<inventory_unit::Model>, ServiceError> {
        let select = InventoryUnit::find()
            .filter(inventory_unit::Column::SaleOrderLineId.eq(self.0.id))
            .filter(inventory_unit::Column::Status.is_in([
                UnitStatus::Reserved.as_str(),
                UnitStatus::PreReserved.as_str(),
            ]))
            .order_by_asc(inventory_unit::Column::CreatedAt)
            .order_by_asc(inventory_unit::Column::Id);
        Ok(lock_rows(select, txn.get_database_backend()).all(txn).await?)
    }

    async fn shed_pending_demand(
        &self,
        txn: &DatabaseTransaction,
        mut need: i64,
    ) -> Result<i64, ServiceError> {
        let reservations = PreorderReservation::find()
            .filter(preorder_reservation::Column::SaleOrderLineId.eq(self.0.id))
            .filter(
                preorder_reservation::Column::Status.eq(ReservationStatus::Pending.as_str()),
            )
            .order_by_desc(preorder_reservation::Column::ReservedAt)
            .order_by_desc(preorder_reservation::Column::Id)
            .all(txn)
            .await?;

        for reservation in reservations {
            if need == 0 {
                break;
            }
            let quantity = i64::from(reservation.quantity);
            let mut active: preorder_reservation::ActiveModel = reservation.into();
            if quantity <= need {
                active.status = Set(ReservationStatus::Cancelled.as_str().to_string());
                active.update(txn).await?;
                need -= quantity;
            } else {
                active.quantity = Set((quantity - need) as i32);
                active.update(txn).await?;
                need = 0;
            }
        }
        Ok(need)
    }

    async fn shed_unit(
        &self,
        txn: &DatabaseTransaction,
        unit: inventory_unit::Model,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let to = match unit_status(&unit)? {
            UnitStatus::PreReserved => UnitStatus::InTransit,
            _ => UnitStatus::Available,
        };
        unit.begin_transition(to, now).update(txn).await?;
        Ok(())
    }

    async fn blocked_detail(&self, txn: &DatabaseTransaction) -> Result<String, ServiceError> {
        let sold = InventoryUnit::find()
            .filter(inventory_unit::Column::SaleOrderLineId.eq(self.0.id))
            .filter(inventory_unit::Column::Status.is_in([
                UnitStatus::Sold.as_str(),
                UnitStatus::PreSold.as_str(),
            ]))
            .all(txn)
            .await?
            .len();
        Ok(format!("{} units are already sold", sold))
    }
}

#[async_trait]
impl LineFreeUnits for PurchaseOrderLineCapacity {
    fn line_id(&self) -> Uuid {
        self.0.id
    }

    fn product_id(&self) -> Uuid {
        self.0.product_id
    }

    async fn free_units(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<Vec<inventory_unit::Model>, ServiceError> {
        let select = InventoryUnit::find()
            .filter(inventory_unit::Column::PurchaseOrderLineId.eq(self.0.id))
            .filter(inventory_unit::Column::SaleOrderId.is_null())
            .filter(inventory_unit::Column::Status.is_in([
                UnitStatus::Available.as_str(),
                UnitStatus::InTransit.as_str(),
            ]))
            .order_by_asc(inventory_unit::Column::CreatedAt)
            .order_by_asc(inventory_unit::Column::Id);
        Ok(lock_rows(select, txn.get_database_backend()).all(txn).await?)
    }

    async fn shed_pending_demand(
        &self,
        _txn: &DatabaseTransaction,
        need: i64,
    ) -> Result<i64, ServiceError> {
        // Purchase-order lines carry no queued demand of their own.
        Ok(need)
    }

    async fn shed_unit(
        &self,
        txn: &DatabaseTransaction,
        unit: inventory_unit::Model,
        _now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        // The unit was never really ordered; remove it.
        unit.delete(txn).await?;
        Ok(())
    }

    async fn blocked_detail(&self, txn: &DatabaseTransaction) -> Result<String, ServiceError> {
        let committed = InventoryUnit::find()
            .filter(inventory_unit::Column::PurchaseOrderLineId.eq(self.0.id))
            .filter(inventory_unit::Column::SaleOrderId.is_not_null())
            .all(txn)
            .await?
            .len();
        Ok(format!("{} units are reserved or sold to customers", committed))
    }
}
