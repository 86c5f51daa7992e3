mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use common::{create_linked_unit, create_product, create_sale_order, create_unit, TestApp};
use stockroom_api::entities::{
    inventory_adjustment::{AdjustmentStatus, AdjustmentType, Entity as InventoryAdjustment},
    inventory_adjustment_entry::{self, Entity as AdjustmentEntry},
    inventory_unit::{self, Entity as InventoryUnit, ItemCondition, UnitStatus},
    sale_order::SaleOrderStatus,
};
use stockroom_api::errors::ServiceError;
use stockroom_api::services::adjustment_ledger::{
    ApplyOutcome, NewAdjustment, NewAdjustmentLine, ReverseOutcome,
};
use stockroom_api::entities::inventory_adjustment_line::{DecreaseReason, LineDirection};

fn increase_line(product_id: Uuid, quantity: i32) -> NewAdjustmentLine {
    NewAdjustmentLine {
        direction: LineDirection::Increase,
        quantity,
        product_id,
        item_condition: Some(ItemCondition::BrandNew),
        unit_cost: Some(dec!(10.00)),
        selling_price: None,
        reason: None,
        note: None,
    }
}

fn decrease_line(product_id: Uuid, quantity: i32, reason: DecreaseReason) -> NewAdjustmentLine {
    NewAdjustmentLine {
        direction: LineDirection::Decrease,
        quantity,
        product_id,
        item_condition: None,
        unit_cost: None,
        selling_price: None,
        reason: Some(reason),
        note: None,
    }
}

fn draft(lines: Vec<NewAdjustmentLine>) -> NewAdjustment {
    NewAdjustment {
        adjustment_type: AdjustmentType::Correction,
        note: None,
        lines,
    }
}

async fn unit_statuses(app: &TestApp, product_id: Uuid) -> Vec<String> {
    let mut statuses: Vec<String> = InventoryUnit::find()
        .filter(inventory_unit::Column::ProductId.eq(product_id))
        .all(app.db())
        .await
        .expect("query units")
        .into_iter()
        .map(|u| u.status)
        .collect();
    statuses.sort();
    statuses
}

#[tokio::test]
async fn apply_increase_creates_units_entries_and_reference() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;

    let adjustment = ledger
        .create_draft(draft(vec![increase_line(product.id, 3)]))
        .await
        .expect("create draft");

    let outcome = ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("apply");
    assert_eq!(outcome, ApplyOutcome::Applied);

    let units = InventoryUnit::find()
        .filter(inventory_unit::Column::ProductId.eq(product.id))
        .all(app.db())
        .await
        .expect("query units");
    assert_eq!(units.len(), 3);
    assert!(units.iter().all(|u| u.status == UnitStatus::Available.as_str()));

    let entries = AdjustmentEntry::find()
        .filter(inventory_adjustment_entry::Column::AdjustmentId.eq(adjustment.id))
        .all(app.db())
        .await
        .expect("query entries");
    assert_eq!(entries.len(), 3);

    let applied = InventoryAdjustment::find_by_id(adjustment.id)
        .one(app.db())
        .await
        .expect("query adjustment")
        .expect("adjustment exists");
    assert_eq!(applied.status, AdjustmentStatus::Applied.as_str());
    let expected_prefix = format!("ADJ-{}", Utc::now().format("%Y%m"));
    assert_eq!(
        applied.reference.as_deref(),
        Some(format!("{}-01", expected_prefix).as_str())
    );
}

#[tokio::test]
async fn apply_is_idempotent() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;

    let adjustment = ledger
        .create_draft(draft(vec![increase_line(product.id, 2)]))
        .await
        .expect("create draft");
    ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("first apply");

    let second = ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("second apply");
    assert_eq!(second, ApplyOutcome::AlreadyApplied);

    assert_eq!(unit_statuses(&app, product.id).await.len(), 2);
    let entries = AdjustmentEntry::find()
        .filter(inventory_adjustment_entry::Column::AdjustmentId.eq(adjustment.id))
        .all(app.db())
        .await
        .expect("query entries");
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn decrease_scrap_then_reverse_restores_units() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;
    for _ in 0..5 {
        create_unit(app.db(), product.id, UnitStatus::Available, dec!(8.00)).await;
    }

    let adjustment = ledger
        .create_draft(draft(vec![decrease_line(product.id, 3, DecreaseReason::Scrap)]))
        .await
        .expect("create draft");
    ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("apply");

    let statuses = unit_statuses(&app, product.id).await;
    assert_eq!(
        statuses,
        vec!["available", "available", "scrap", "scrap", "scrap"]
    );

    let outcome = ledger
        .reverse(adjustment.id, Uuid::new_v4())
        .await
        .expect("reverse");
    assert_eq!(outcome, ReverseOutcome::Reversed);

    let statuses = unit_statuses(&app, product.id).await;
    assert_eq!(statuses, vec!["available"; 5]);

    let entries = AdjustmentEntry::find()
        .filter(inventory_adjustment_entry::Column::AdjustmentId.eq(adjustment.id))
        .all(app.db())
        .await
        .expect("query entries");
    assert!(entries.is_empty());

    let reversed = InventoryAdjustment::find_by_id(adjustment.id)
        .one(app.db())
        .await
        .expect("query adjustment")
        .expect("adjustment exists");
    assert_eq!(reversed.status, AdjustmentStatus::Draft.as_str());
    assert!(reversed.reversed_at.is_some());
}

#[tokio::test]
async fn reverse_of_increase_deletes_created_units() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;

    let adjustment = ledger
        .create_draft(draft(vec![increase_line(product.id, 2)]))
        .await
        .expect("create draft");
    ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("apply");
    ledger
        .reverse(adjustment.id, Uuid::new_v4())
        .await
        .expect("reverse");

    assert!(unit_statuses(&app, product.id).await.is_empty());
}

#[tokio::test]
async fn decrease_consumes_cheapest_units_first() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;
    create_unit(app.db(), product.id, UnitStatus::Available, dec!(5.00)).await;
    let cheapest = create_unit(app.db(), product.id, UnitStatus::Available, dec!(1.00)).await;
    create_unit(app.db(), product.id, UnitStatus::Available, dec!(3.00)).await;

    let adjustment = ledger
        .create_draft(draft(vec![decrease_line(product.id, 1, DecreaseReason::Lost)]))
        .await
        .expect("create draft");
    ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("apply");

    let unit = InventoryUnit::find_by_id(cheapest.id)
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    assert_eq!(unit.status, UnitStatus::Lost.as_str());
}

#[tokio::test]
async fn decrease_with_insufficient_free_stock_fails() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;
    create_unit(app.db(), product.id, UnitStatus::Available, dec!(8.00)).await;

    let adjustment = ledger
        .create_draft(draft(vec![decrease_line(product.id, 3, DecreaseReason::Damaged)]))
        .await
        .expect("create draft");

    let err = ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect_err("apply must fail");
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    // The transaction rolled back: still a draft, stock untouched.
    let stored = InventoryAdjustment::find_by_id(adjustment.id)
        .one(app.db())
        .await
        .expect("query adjustment")
        .expect("adjustment exists");
    assert_eq!(stored.status, AdjustmentStatus::Draft.as_str());
    assert_eq!(unit_statuses(&app, product.id).await, vec!["available"]);
}

#[tokio::test]
async fn apply_rejects_empty_adjustment() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();

    let adjustment = ledger.create_draft(draft(vec![])).await.expect("create draft");
    let err = ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect_err("apply must fail");
    assert!(matches!(err, ServiceError::EmptyAdjustment(_)));
}

#[tokio::test]
async fn applied_adjustment_rejects_line_mutation() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;

    let adjustment = ledger
        .create_draft(draft(vec![increase_line(product.id, 1)]))
        .await
        .expect("create draft");
    ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("apply");

    let err = ledger
        .add_line(adjustment.id, increase_line(product.id, 1))
        .await
        .expect_err("add_line must fail");
    assert!(matches!(err, ServiceError::AlreadyApplied(_)));

    let err = ledger
        .update_draft(adjustment.id, None, Some("tweak".to_string()))
        .await
        .expect_err("update_draft must fail");
    assert!(matches!(err, ServiceError::AlreadyApplied(_)));
}

#[tokio::test]
async fn decrease_line_without_reason_is_rejected() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;

    let mut line = decrease_line(product.id, 1, DecreaseReason::Scrap);
    line.reason = None;
    let err = ledger
        .create_draft(draft(vec![line]))
        .await
        .expect_err("draft must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn reverse_of_draft_is_a_noop() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;

    let adjustment = ledger
        .create_draft(draft(vec![increase_line(product.id, 1)]))
        .await
        .expect("create draft");
    let outcome = ledger
        .reverse(adjustment.id, Uuid::new_v4())
        .await
        .expect("reverse");
    assert_eq!(outcome, ReverseOutcome::NotApplied);
}

#[tokio::test]
async fn reverse_blocked_when_created_unit_was_sold() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;

    let adjustment = ledger
        .create_draft(draft(vec![increase_line(product.id, 1)]))
        .await
        .expect("create draft");
    ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("apply");

    // Demand attaches to the new unit before anyone reverses.
    let order = create_sale_order(app.db(), SaleOrderStatus::Confirmed, dec!(50.00)).await;
    let unit = InventoryUnit::find()
        .filter(inventory_unit::Column::ProductId.eq(product.id))
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    let mut active = unit.begin_transition(UnitStatus::Sold, Utc::now());
    active.sale_order_id = Set(Some(order.id));
    active.update(app.db()).await.expect("link unit");

    let err = ledger
        .reverse(adjustment.id, Uuid::new_v4())
        .await
        .expect_err("reverse must fail");
    assert!(matches!(err, ServiceError::NotReversible(_)));
}

#[tokio::test]
async fn references_are_sequential_within_a_month() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;

    let mut references = Vec::new();
    for _ in 0..3 {
        let adjustment = ledger
            .create_draft(draft(vec![increase_line(product.id, 1)]))
            .await
            .expect("create draft");
        ledger
            .apply(adjustment.id, Uuid::new_v4())
            .await
            .expect("apply");
        let stored = InventoryAdjustment::find_by_id(adjustment.id)
            .one(app.db())
            .await
            .expect("query adjustment")
            .expect("adjustment exists");
        references.push(stored.reference.expect("reference set"));
    }

    let prefix = format!("ADJ-{}", Utc::now().format("%Y%m"));
    assert_eq!(
        references,
        vec![
            format!("{}-01", prefix),
            format!("{}-02", prefix),
            format!("{}-03", prefix),
        ]
    );
}

#[tokio::test]
async fn failed_apply_does_not_consume_a_reference() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;

    // No free stock: the decrease aborts mid-apply and rolls back.
    let doomed = ledger
        .create_draft(draft(vec![decrease_line(product.id, 2, DecreaseReason::Lost)]))
        .await
        .expect("create draft");
    let err = ledger
        .apply(doomed.id, Uuid::new_v4())
        .await
        .expect_err("apply must fail");
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let stored = InventoryAdjustment::find_by_id(doomed.id)
        .one(app.db())
        .await
        .expect("query adjustment")
        .expect("adjustment exists");
    assert!(stored.reference.is_none());

    // The next successful apply starts the month's numbering.
    let adjustment = ledger
        .create_draft(draft(vec![increase_line(product.id, 1)]))
        .await
        .expect("create draft");
    ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("apply");
    let applied = InventoryAdjustment::find_by_id(adjustment.id)
        .one(app.db())
        .await
        .expect("query adjustment")
        .expect("adjustment exists");
    let prefix = format!("ADJ-{}", Utc::now().format("%Y%m"));
    assert_eq!(
        applied.reference.as_deref(),
        Some(format!("{}-01", prefix).as_str())
    );
}

#[tokio::test]
async fn decrease_never_touches_linked_units() {
    let app = TestApp::new().await;
    let ledger = app.state.adjustment_ledger.clone();
    let product = create_product(app.db()).await;
    let order = create_sale_order(app.db(), SaleOrderStatus::Confirmed, dec!(30.00)).await;
    let line_id = Uuid::new_v4();
    create_linked_unit(
        app.db(),
        product.id,
        order.id,
        line_id,
        UnitStatus::Reserved,
        dec!(5.00),
    )
    .await;
    create_unit(app.db(), product.id, UnitStatus::Available, dec!(9.00)).await;

    let adjustment = ledger
        .create_draft(draft(vec![decrease_line(product.id, 1, DecreaseReason::Scrap)]))
        .await
        .expect("create draft");
    ledger
        .apply(adjustment.id, Uuid::new_v4())
        .await
        .expect("apply");

    // The reserved unit survives even though it is cheaper.
    let statuses = unit_statuses(&app, product.id).await;
    assert_eq!(statuses, vec!["reserved", "scrap"]);
}
