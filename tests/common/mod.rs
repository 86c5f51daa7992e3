#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::Set;
use uuid::Uuid;

use stockroom_api::{
    config::AppConfig,
    db::{self, DbConfig, DbPool},
    entities::{
        inventory_unit::{self, ItemCondition, UnitStatus},
        payment::{self, PaymentStatus},
        preorder_reservation::{self, ReservationStatus},
        product, purchase_order,
        purchase_order::PurchaseOrderStatus,
        purchase_order_line, sale_order,
        sale_order::SaleOrderStatus,
        sale_order_line, shipment,
        shipment::ShipmentStatus,
    },
    events,
    AppState,
};

use sea_orm::ActiveModelTrait;

/// Harness backed by a fresh in-memory SQLite database. A single-connection
/// pool keeps the database alive for the lifetime of the test.
pub struct TestApp {
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = AppConfig::new("sqlite::memory:".to_string(), "test".to_string());

        let pool = db::establish_connection_with_config(&DbConfig {
            url: config.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(5),
        })
        .await
        .expect("failed to open test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let (event_sender, receiver) = events::event_channel(config.event_buffer);
        let event_task = tokio::spawn(events::log_events(receiver));

        let state = AppState::new(Arc::new(pool), config, Arc::new(event_sender));
        Self {
            state,
            _event_task: event_task,
        }
    }

    pub fn db(&self) -> &DbPool {
        self.state.db.as_ref()
    }
}

pub async fn create_product(db: &DbPool) -> product::Model {
    product::ActiveModel {
        name: Set("Test Figure".to_string()),
        sku: Set(format!("SKU-{}", Uuid::new_v4())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert product")
}

pub async fn create_unit(
    db: &DbPool,
    product_id: Uuid,
    status: UnitStatus,
    purchase_cost: Decimal,
) -> inventory_unit::Model {
    inventory_unit::ActiveModel {
        product_id: Set(product_id),
        status: Set(status.as_str().to_string()),
        item_condition: Set(ItemCondition::BrandNew.as_str().to_string()),
        purchase_cost: Set(purchase_cost),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert inventory unit")
}

/// Unit received from a specific purchase-order line.
pub async fn create_unit_from_po(
    db: &DbPool,
    product_id: Uuid,
    purchase_order_id: Uuid,
    purchase_order_line_id: Uuid,
    status: UnitStatus,
    purchase_cost: Decimal,
) -> inventory_unit::Model {
    inventory_unit::ActiveModel {
        product_id: Set(product_id),
        purchase_order_id: Set(Some(purchase_order_id)),
        purchase_order_line_id: Set(Some(purchase_order_line_id)),
        status: Set(status.as_str().to_string()),
        item_condition: Set(ItemCondition::BrandNew.as_str().to_string()),
        purchase_cost: Set(purchase_cost),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert inventory unit")
}

/// Unit already attached to a sale-order line.
pub async fn create_linked_unit(
    db: &DbPool,
    product_id: Uuid,
    sale_order_id: Uuid,
    sale_order_line_id: Uuid,
    status: UnitStatus,
    purchase_cost: Decimal,
) -> inventory_unit::Model {
    inventory_unit::ActiveModel {
        product_id: Set(product_id),
        sale_order_id: Set(Some(sale_order_id)),
        sale_order_line_id: Set(Some(sale_order_line_id)),
        status: Set(status.as_str().to_string()),
        item_condition: Set(ItemCondition::BrandNew.as_str().to_string()),
        purchase_cost: Set(purchase_cost),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert inventory unit")
}

pub async fn create_sale_order(
    db: &DbPool,
    status: SaleOrderStatus,
    total_amount: Decimal,
) -> sale_order::Model {
    sale_order::ActiveModel {
        user_id: Set(Uuid::new_v4()),
        status: Set(status.as_str().to_string()),
        total_amount: Set(total_amount),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert sale order")
}

pub async fn create_sale_order_line(
    db: &DbPool,
    sale_order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Option<Decimal>,
) -> sale_order_line::Model {
    sale_order_line::ActiveModel {
        sale_order_id: Set(sale_order_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert sale order line")
}

pub async fn create_payment(
    db: &DbPool,
    sale_order_id: Uuid,
    amount: Decimal,
    status: PaymentStatus,
) -> payment::Model {
    payment::ActiveModel {
        sale_order_id: Set(sale_order_id),
        amount: Set(amount),
        status: Set(status.as_str().to_string()),
        paid_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert payment")
}

pub async fn create_shipment(
    db: &DbPool,
    sale_order_id: Uuid,
    status: ShipmentStatus,
) -> shipment::Model {
    shipment::ActiveModel {
        sale_order_id: Set(sale_order_id),
        status: Set(status.as_str().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert shipment")
}

pub async fn create_purchase_order(
    db: &DbPool,
    status: PurchaseOrderStatus,
) -> purchase_order::Model {
    purchase_order::ActiveModel {
        reference: Set(format!("PO-{}", Uuid::new_v4())),
        supplier_name: Set(Some("Acme Distribution".to_string())),
        status: Set(status.as_str().to_string()),
        ordered_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert purchase order")
}

pub async fn create_purchase_order_line(
    db: &DbPool,
    purchase_order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_cost: Decimal,
) -> purchase_order_line::Model {
    purchase_order_line::ActiveModel {
        purchase_order_id: Set(purchase_order_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        unit_cost: Set(unit_cost),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert purchase order line")
}

pub async fn create_reservation(
    db: &DbPool,
    product_id: Uuid,
    quantity: i32,
    reserved_at: DateTime<Utc>,
) -> preorder_reservation::Model {
    preorder_reservation::ActiveModel {
        product_id: Set(product_id),
        user_id: Set(Uuid::new_v4()),
        status: Set(ReservationStatus::Pending.as_str().to_string()),
        quantity: Set(quantity),
        reserved_at: Set(reserved_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert preorder reservation")
}
