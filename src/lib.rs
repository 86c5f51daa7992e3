//! Stockroom API Library
//!
//! Inventory lifecycle core for the stockroom backend: per-unit stock
//! tracking, order status synchronization, the adjustment ledger, and the
//! preorder queue.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use crate::services::{
    adjustment_ledger::AdjustmentLedger, preorder_allocator::PreorderAllocator,
    reconciliation::ReconciliationService, status_sync::StatusSyncCoordinator,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub adjustment_ledger: Arc<AdjustmentLedger>,
    pub status_sync: Arc<StatusSyncCoordinator>,
    pub preorder_allocator: Arc<PreorderAllocator>,
    pub reconciliation: Arc<ReconciliationService>,
}

impl AppState {
    pub fn new(
        db: Arc<db::DbPool>,
        config: config::AppConfig,
        event_sender: Arc<events::EventSender>,
    ) -> Self {
        let preorder_allocator =
            Arc::new(PreorderAllocator::new(db.clone(), event_sender.clone()));
        let adjustment_ledger = Arc::new(AdjustmentLedger::new(
            db.clone(),
            event_sender.clone(),
            preorder_allocator.clone(),
            config.adjustment_reference_prefix.clone(),
        ));
        let status_sync = Arc::new(StatusSyncCoordinator::new(
            db.clone(),
            event_sender.clone(),
            preorder_allocator.clone(),
        ));
        let reconciliation = Arc::new(ReconciliationService::new(db.clone()));

        Self {
            db,
            config,
            event_sender,
            adjustment_ledger,
            status_sync,
            preorder_allocator,
            reconciliation,
        }
    }
}
