use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, ModelTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{
    inventory_unit::{self, Entity as InventoryUnit, ItemCondition, UnitStatus},
    job_run::{self, JobStatus},
    purchase_order::{Entity as PurchaseOrder, PurchaseOrderStatus},
    purchase_order_line::{self, Entity as PurchaseOrderLine},
};
use crate::errors::ServiceError;

use super::{lock_rows, unit_status};

pub const PO_LINK_JOB_NAME: &str = "reconcile_purchase_order_links";

/// Counters for one reconciliation sweep. Persisted as the `stats` JSON blob
/// of the job run row.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReconciliationStats {
    /// Units whose purchase-order line no longer exists.
    pub orphans_found: u64,
    pub orphans_deleted: u64,
    /// Quantity the purchase-order lines promise beyond the units on record.
    pub missing_found: u64,
    pub missing_created: u64,
    /// Orphans left untouched because they carry sale-order linkage or a
    /// non-free status.
    pub skipped: u64,
    /// Per-item failures. The sweep keeps going past them.
    pub errors: Vec<String>,
}

/// Background consistency sweep over purchase-order / inventory-unit links.
///
/// Repairs only; it never overrides ledger-owned state and never touches a
/// unit with sale-order linkage. Runs are idempotent, so a crashed run can
/// simply be repeated.
#[derive(Clone)]
pub struct ReconciliationService {
    db: Arc<DbPool>,
}

impl ReconciliationService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Runs one sweep, recording it as a `job_run` row. With `dry_run` the
    /// sweep reports what it would repair without writing anything.
    #[instrument(skip(self))]
    pub async fn reconcile_purchase_order_links(
        &self,
        dry_run: bool,
    ) -> Result<(Uuid, ReconciliationStats), ServiceError> {
        let job = job_run::ActiveModel {
            job_name: Set(PO_LINK_JOB_NAME.to_string()),
            status: Set(JobStatus::Running.as_str().to_string()),
            started_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;
        let job_id = job.id;

        let outcome = self.sweep(dry_run).await;

        let mut active: job_run::ActiveModel = job.into();
        active.finished_at = Set(Some(Utc::now()));
        match &outcome {
            Ok(stats) => {
                active.status = Set(JobStatus::Completed.as_str().to_string());
                active.stats = Set(Some(
                    serde_json::to_string(stats)
                        .map_err(|e| ServiceError::Other(e.into()))?,
                ));
            }
            Err(err) => {
                active.status = Set(JobStatus::Failed.as_str().to_string());
                active.error = Set(Some(err.to_string()));
            }
        }
        active.update(self.db.as_ref()).await?;

        let stats = outcome?;
        info!(
            job_id = %job_id,
            dry_run,
            orphans = stats.orphans_found,
            missing = stats.missing_found,
            errors = stats.errors.len(),
            "purchase order link reconciliation finished"
        );
        Ok((job_id, stats))
    }

    async fn sweep(&self, dry_run: bool) -> Result<ReconciliationStats, ServiceError> {
        let txn = self.db.begin().await?;
        let mut stats = ReconciliationStats::default();

        let lines = PurchaseOrderLine::find().all(&txn).await?;
        let line_ids: HashSet<Uuid> = lines.iter().map(|l| l.id).collect();
        let po_statuses: HashMap<Uuid, PurchaseOrderStatus> = PurchaseOrder::find()
            .all(&txn)
            .await?
            .into_iter()
            .filter_map(|po| PurchaseOrderStatus::parse(&po.status).map(|s| (po.id, s)))
            .collect();

        self.scan_orphans(&txn, &line_ids, dry_run, &mut stats).await?;
        self.scan_missing(&txn, &lines, &po_statuses, dry_run, &mut stats)
            .await?;

        if dry_run {
            txn.rollback().await?;
        } else {
            txn.commit().await?;
        }
        Ok(stats)
    }

    /// Units pointing at a purchase-order line that no longer exists.
    /// Deleted only when free; anything carrying demand is left for a human.
    async fn scan_orphans(
        &self,
        txn: &DatabaseTransaction,
        line_ids: &HashSet<Uuid>,
        dry_run: bool,
        stats: &mut ReconciliationStats,
    ) -> Result<(), ServiceError> {
        let select = InventoryUnit::find()
            .filter(inventory_unit::Column::PurchaseOrderLineId.is_not_null());
        let linked = lock_rows(select, txn.get_database_backend()).all(txn).await?;

        for unit in linked {
            let Some(line_id) = unit.purchase_order_line_id else {
                continue;
            };
            if line_ids.contains(&line_id) {
                continue;
            }
            stats.orphans_found += 1;

            if unit.sale_order_id.is_some() {
                stats.skipped += 1;
                stats.errors.push(format!(
                    "unit {} orphaned from line {} but linked to sale order; left in place",
                    unit.id, line_id
                ));
                continue;
            }
            let status = match unit_status(&unit) {
                Ok(status) => status,
                Err(err) => {
                    stats.errors.push(err.to_string());
                    continue;
                }
            };
            if !status.is_free() {
                stats.skipped += 1;
                stats.errors.push(format!(
                    "unit {} orphaned from line {} has status {}; left in place",
                    unit.id,
                    line_id,
                    status.as_str()
                ));
                continue;
            }

            if dry_run {
                stats.orphans_deleted += 1;
                continue;
            }
            let unit_id = unit.id;
            match unit.delete(txn).await {
                Ok(_) => stats.orphans_deleted += 1,
                Err(err) => {
                    warn!(unit_id = %unit_id, error = %err, "orphan deletion failed");
                    stats
                        .errors
                        .push(format!("deleting orphan unit {}: {}", unit_id, err));
                }
            }
        }
        Ok(())
    }

    /// Purchase-order lines whose linked-unit count falls short of the line
    /// quantity. The gap is filled with fresh units in the state the owning
    /// order implies. Cancelled orders get nothing.
    async fn scan_missing(
        &self,
        txn: &DatabaseTransaction,
        lines: &[purchase_order_line::Model],
        po_statuses: &HashMap<Uuid, PurchaseOrderStatus>,
        dry_run: bool,
        stats: &mut ReconciliationStats,
    ) -> Result<(), ServiceError> {
        for line in lines {
            let status = match po_statuses.get(&line.purchase_order_id) {
                Some(PurchaseOrderStatus::Cancelled) | None => continue,
                Some(status) => *status,
            };
            let unit_status = match status {
                PurchaseOrderStatus::Delivered => UnitStatus::Available,
                _ => UnitStatus::InTransit,
            };

            let existing = InventoryUnit::find()
                .filter(inventory_unit::Column::PurchaseOrderLineId.eq(line.id))
                .all(txn)
                .await?
                .len() as i64;
            let gap = i64::from(line.quantity) - existing;
            if gap <= 0 {
                continue;
            }
            stats.missing_found += gap as u64;
            if dry_run {
                stats.missing_created += gap as u64;
                continue;
            }

            for _ in 0..gap {
                let insert = inventory_unit::ActiveModel {
                    product_id: Set(line.product_id),
                    purchase_order_id: Set(Some(line.purchase_order_id)),
                    purchase_order_line_id: Set(Some(line.id)),
                    status: Set(unit_status.as_str().to_string()),
                    item_condition: Set(ItemCondition::BrandNew.as_str().to_string()),
                    purchase_cost: Set(line.unit_cost),
                    ..Default::default()
                }
                .insert(txn)
                .await;
                match insert {
                    Ok(_) => stats.missing_created += 1,
                    Err(err) => {
                        warn!(line_id = %line.id, error = %err, "missing-unit creation failed");
                        stats
                            .errors
                            .push(format!("creating unit for line {}: {}", line.id, err));
                    }
                }
            }
        }
        Ok(())
    }
}
