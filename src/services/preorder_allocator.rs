use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{
    inventory_unit::{self, Entity as InventoryUnit, UnitStatus},
    preorder_reservation::{self, Entity as PreorderReservation, ReservationStatus},
    sale_order::{Entity as SaleOrder, SaleOrderStatus},
    sale_order_line::Entity as SaleOrderLine,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

use super::{lock_rows, reservation_status, sale_order_status, unit_status};

/// A reservation fully covered during an allocation pass.
#[derive(Debug, Clone, Copy)]
pub struct AssignedPreorder {
    pub reservation_id: Uuid,
    pub user_id: Uuid,
}

/// Outcome of one allocation pass over a product's preorder queue.
#[derive(Debug, Default, Clone)]
pub struct AllocationSummary {
    /// Reservations fully covered and moved to `assigned`.
    pub assigned: Vec<AssignedPreorder>,
    /// Reservation left pending with a reduced remaining quantity.
    pub partially_covered: Option<Uuid>,
    /// Units linked to demand during this pass.
    pub units_consumed: usize,
}

/// How units consumed for a reservation should land: reserved/pre_reserved
/// while the linked order is still unpaid, sold/pre_sold once it is confirmed.
#[derive(Debug, Clone, Copy, Default)]
struct DemandTerms {
    confirmed: bool,
    sold_price: Option<Decimal>,
}

/// Assigns free or inbound inventory units to the oldest pending preorder
/// reservations for a product.
///
/// Invoked after every event that frees or receives stock: a purchase order
/// marked delivered, a sale-order line deleted or shrunk, an increase
/// adjustment applied.
#[derive(Clone)]
pub struct PreorderAllocator {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PreorderAllocator {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Walks the product's pending reservations oldest-first, consuming free
    /// units one-for-one.
    ///
    /// A reservation that cannot be fully covered blocks the queue — younger
    /// demand is never served first. With `allow_partial`, the head
    /// reservation instead sheds covered quantity and stays pending.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn allocate_for_product(
        &self,
        product_id: Uuid,
        allow_partial: bool,
    ) -> Result<AllocationSummary, ServiceError> {
        let summary = self
            .db
            .transaction::<_, AllocationSummary, ServiceError>(move |txn| {
                Box::pin(async move {
                    let backend = txn.get_database_backend();
                    let now = Utc::now();

                    let reservations = PreorderReservation::find()
                        .filter(preorder_reservation::Column::ProductId.eq(product_id))
                        .filter(
                            preorder_reservation::Column::Status
                                .eq(ReservationStatus::Pending.as_str()),
                        )
                        .order_by_asc(preorder_reservation::Column::ReservedAt)
                        .order_by_asc(preorder_reservation::Column::Id)
                        .all(txn)
                        .await?;

                    if reservations.is_empty() {
                        return Ok(AllocationSummary::default());
                    }

                    let free_select = InventoryUnit::find()
                        .filter(inventory_unit::Column::ProductId.eq(product_id))
                        .filter(inventory_unit::Column::SaleOrderId.is_null())
                        .filter(inventory_unit::Column::Status.is_in([
                            UnitStatus::Available.as_str(),
                            UnitStatus::InTransit.as_str(),
                        ]));
                    let mut free = lock_rows(free_select, backend).all(txn).await?;
                    // On-hand stock serves queued demand before inbound stock.
                    free.sort_by(|a, b| {
                        let a_inbound = a.status != UnitStatus::Available.as_str();
                        let b_inbound = b.status != UnitStatus::Available.as_str();
                        a_inbound
                            .cmp(&b_inbound)
                            .then(a.created_at.cmp(&b.created_at))
                            .then(a.id.cmp(&b.id))
                    });
                    let mut summary = AllocationSummary::default();

                    for reservation in reservations {
                        let wanted = reservation.quantity as usize;
                        let terms = Self::demand_terms(txn, &reservation).await?;
                        if free.len() >= wanted {
                            for unit in free.drain(..wanted) {
                                Self::consume_unit(txn, unit, &reservation, terms, now).await?;
                            }
                            summary.units_consumed += wanted;

                            let assigned = AssignedPreorder {
                                reservation_id: reservation.id,
                                user_id: reservation.user_id,
                            };
                            let mut active: preorder_reservation::ActiveModel =
                                reservation.into();
                            active.status = Set(ReservationStatus::Assigned.as_str().to_string());
                            active.assigned_at = Set(Some(now));
                            active.update(txn).await?;
                            summary.assigned.push(assigned);
                        } else if allow_partial && !free.is_empty() {
                            let covered = free.len();
                            for unit in free.drain(..) {
                                Self::consume_unit(txn, unit, &reservation, terms, now).await?;
                            }
                            summary.units_consumed += covered;

                            let reservation_id = reservation.id;
                            let mut active: preorder_reservation::ActiveModel =
                                reservation.into();
                            active.quantity = Set(wanted as i32 - covered as i32);
                            active.update(txn).await?;
                            summary.partially_covered = Some(reservation_id);
                            break;
                        } else {
                            break;
                        }
                    }

                    Ok(summary)
                })
            })
            .await?;

        if !summary.assigned.is_empty() {
            info!(
                product_id = %product_id,
                assigned = summary.assigned.len(),
                units = summary.units_consumed,
                "preorder reservations assigned"
            );
        }
        self.notify_assigned(product_id, &summary).await;

        Ok(summary)
    }

    /// 1-based FIFO rank of a pending reservation among its product's queue.
    /// `None` for reservations no longer pending.
    pub async fn queue_position(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<u64>, ServiceError> {
        let db = self.db.as_ref();
        let reservation = PreorderReservation::find_by_id(reservation_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("preorder reservation {} not found", reservation_id))
            })?;

        if reservation_status(&reservation)? != ReservationStatus::Pending {
            return Ok(None);
        }

        let ahead = PreorderReservation::find()
            .filter(preorder_reservation::Column::ProductId.eq(reservation.product_id))
            .filter(
                preorder_reservation::Column::Status.eq(ReservationStatus::Pending.as_str()),
            )
            .filter(
                Condition::any()
                    .add(preorder_reservation::Column::ReservedAt.lt(reservation.reserved_at))
                    .add(
                        Condition::all()
                            .add(
                                preorder_reservation::Column::ReservedAt
                                    .eq(reservation.reserved_at),
                            )
                            .add(preorder_reservation::Column::Id.lt(reservation.id)),
                    ),
            )
            .count(db)
            .await?;

        Ok(Some(ahead + 1))
    }

    /// Cancels pending reservations attached to a sale-order line. Runs on
    /// the caller's transaction so line deletion and cancellation commit
    /// together.
    pub async fn cancel_for_line<C: ConnectionTrait>(
        conn: &C,
        sale_order_line_id: Uuid,
    ) -> Result<u64, ServiceError> {
        let pending = PreorderReservation::find()
            .filter(preorder_reservation::Column::SaleOrderLineId.eq(sale_order_line_id))
            .filter(
                preorder_reservation::Column::Status.eq(ReservationStatus::Pending.as_str()),
            )
            .all(conn)
            .await?;

        let mut cancelled = 0;
        for reservation in pending {
            let mut active: preorder_reservation::ActiveModel = reservation.into();
            active.status = Set(ReservationStatus::Cancelled.as_str().to_string());
            active.update(conn).await?;
            cancelled += 1;
        }
        Ok(cancelled)
    }

    /// When the reservation is linked to an order that is already confirmed
    /// (paid), the units it receives are firm sales, not holds.
    async fn demand_terms<C: ConnectionTrait>(
        conn: &C,
        reservation: &preorder_reservation::Model,
    ) -> Result<DemandTerms, ServiceError> {
        let Some(sale_order_id) = reservation.sale_order_id else {
            return Ok(DemandTerms::default());
        };
        let order = SaleOrder::find_by_id(sale_order_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::ConsistencyError(format!(
                    "reservation {} links to missing sale order {}",
                    reservation.id, sale_order_id
                ))
            })?;
        let confirmed = matches!(
            sale_order_status(&order)?,
            SaleOrderStatus::Confirmed
                | SaleOrderStatus::Preparing
                | SaleOrderStatus::InTransit
                | SaleOrderStatus::Delivered
        );
        if !confirmed {
            return Ok(DemandTerms::default());
        }

        let sold_price = match reservation.sale_order_line_id {
            Some(line_id) => SaleOrderLine::find_by_id(line_id)
                .one(conn)
                .await?
                .and_then(|line| line.unit_price),
            None => None,
        };
        Ok(DemandTerms {
            confirmed: true,
            sold_price,
        })
    }

    async fn consume_unit<C: ConnectionTrait>(
        conn: &C,
        unit: inventory_unit::Model,
        reservation: &preorder_reservation::Model,
        terms: DemandTerms,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let target = match (unit_status(&unit)?, terms.confirmed) {
            (UnitStatus::Available, false) => UnitStatus::Reserved,
            (UnitStatus::Available, true) => UnitStatus::Sold,
            (UnitStatus::InTransit, false) => UnitStatus::PreReserved,
            (UnitStatus::InTransit, true) => UnitStatus::PreSold,
            (other, _) => {
                return Err(ServiceError::ConsistencyError(format!(
                    "unit {} selected for allocation has status {}",
                    unit.id,
                    other.as_str()
                )))
            }
        };

        let mut active = unit.begin_transition(target, now);
        active.sale_order_id = Set(reservation.sale_order_id);
        active.sale_order_line_id = Set(reservation.sale_order_line_id);
        if terms.confirmed {
            active.sold_price = Set(terms.sold_price);
        }
        active.update(conn).await?;
        Ok(())
    }

    /// Notification side effect is best-effort: a failed send is logged and
    /// never propagates into the allocation result.
    async fn notify_assigned(&self, product_id: Uuid, summary: &AllocationSummary) {
        for assigned in &summary.assigned {
            self.event_sender
                .send_best_effort(Event::PreorderAssigned {
                    reservation_id: assigned.reservation_id,
                    product_id,
                    user_id: assigned.user_id,
                })
                .await;
        }
    }
}
