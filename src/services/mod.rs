pub mod adjustment_ledger;
pub mod preorder_allocator;
pub mod reconciliation;
pub mod reference_sequencer;
pub mod status_sync;

use sea_orm::{DbBackend, EntityTrait, QuerySelect, Select};

use crate::entities::{
    inventory_unit::{self, UnitStatus},
    preorder_reservation::{self, ReservationStatus},
    sale_order::{self, SaleOrderStatus},
};
use crate::errors::ServiceError;

/// Adds an exclusive row lock to a selection on backends that support it.
/// SQLite serializes writers on its own and rejects the FOR UPDATE clause.
pub(crate) fn lock_rows<E: EntityTrait>(select: Select<E>, backend: DbBackend) -> Select<E> {
    if backend == DbBackend::Postgres {
        select.lock_exclusive()
    } else {
        select
    }
}

pub(crate) fn unit_status(unit: &inventory_unit::Model) -> Result<UnitStatus, ServiceError> {
    UnitStatus::parse(&unit.status).ok_or_else(|| {
        ServiceError::InvalidStatus(format!(
            "inventory unit {} has unknown status '{}'",
            unit.id, unit.status
        ))
    })
}

pub(crate) fn sale_order_status(order: &sale_order::Model) -> Result<SaleOrderStatus, ServiceError> {
    SaleOrderStatus::parse(&order.status).ok_or_else(|| {
        ServiceError::InvalidStatus(format!(
            "sale order {} has unknown status '{}'",
            order.id, order.status
        ))
    })
}

pub(crate) fn reservation_status(
    reservation: &preorder_reservation::Model,
) -> Result<ReservationStatus, ServiceError> {
    ReservationStatus::parse(&reservation.status).ok_or_else(|| {
        ServiceError::InvalidStatus(format!(
            "preorder reservation {} has unknown status '{}'",
            reservation.id, reservation.status
        ))
    })
}
