mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, QueryFilter};

use common::{
    create_linked_unit, create_payment, create_product, create_purchase_order,
    create_purchase_order_line, create_reservation, create_sale_order, create_sale_order_line,
    create_shipment, create_unit, create_unit_from_po, TestApp,
};
use stockroom_api::entities::{
    inventory_unit::{self, Entity as InventoryUnit, UnitStatus},
    payment::PaymentStatus,
    preorder_reservation::{Entity as PreorderReservation, ReservationStatus},
    purchase_order::{self, PurchaseOrderStatus},
    sale_order::{Entity as SaleOrder, SaleOrderStatus},
    sale_order_line::Entity as SaleOrderLine,
    shipment::ShipmentStatus,
};
use stockroom_api::errors::ServiceError;
use stockroom_api::services::status_sync::{PurchaseOrderLineCapacity, SaleOrderLineCapacity};

use sea_orm::{ActiveModelTrait, Set};

#[tokio::test]
async fn full_payment_promotes_order_and_units() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let order = create_sale_order(app.db(), SaleOrderStatus::Pending, dec!(100.00)).await;
    let line = create_sale_order_line(app.db(), order.id, product.id, 1, Some(dec!(100.00))).await;
    let unit = create_linked_unit(
        app.db(),
        product.id,
        order.id,
        line.id,
        UnitStatus::Reserved,
        dec!(40.00),
    )
    .await;
    create_payment(app.db(), order.id, dec!(100.00), PaymentStatus::Completed).await;

    let status = sync
        .evaluate_payment_coverage(order.id)
        .await
        .expect("evaluate coverage");
    assert_eq!(status, SaleOrderStatus::Confirmed);

    let unit = InventoryUnit::find_by_id(unit.id)
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    assert_eq!(unit.status, UnitStatus::Sold.as_str());
    assert_eq!(unit.sold_price, Some(dec!(100.00)));
}

#[tokio::test]
async fn deleting_the_payment_demotes_order_and_units() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let order = create_sale_order(app.db(), SaleOrderStatus::Pending, dec!(100.00)).await;
    let line = create_sale_order_line(app.db(), order.id, product.id, 1, Some(dec!(100.00))).await;
    let unit = create_linked_unit(
        app.db(),
        product.id,
        order.id,
        line.id,
        UnitStatus::Reserved,
        dec!(40.00),
    )
    .await;
    let payment =
        create_payment(app.db(), order.id, dec!(100.00), PaymentStatus::Completed).await;

    sync.evaluate_payment_coverage(order.id)
        .await
        .expect("promote");

    payment.delete(app.db()).await.expect("delete payment");
    let status = sync
        .evaluate_payment_coverage(order.id)
        .await
        .expect("re-evaluate");
    assert_eq!(status, SaleOrderStatus::Pending);

    let unit = InventoryUnit::find_by_id(unit.id)
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    assert_eq!(unit.status, UnitStatus::Reserved.as_str());
}

#[tokio::test]
async fn partial_payment_does_not_promote() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let order = create_sale_order(app.db(), SaleOrderStatus::Pending, dec!(100.00)).await;
    create_payment(app.db(), order.id, dec!(60.00), PaymentStatus::Completed).await;
    create_payment(app.db(), order.id, dec!(40.00), PaymentStatus::Pending).await;

    let status = sync
        .evaluate_payment_coverage(order.id)
        .await
        .expect("evaluate coverage");
    assert_eq!(status, SaleOrderStatus::Pending);
}

#[tokio::test]
async fn delivered_order_is_never_auto_demoted() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let order = create_sale_order(app.db(), SaleOrderStatus::Delivered, dec!(100.00)).await;

    let status = sync
        .evaluate_payment_coverage(order.id)
        .await
        .expect("evaluate coverage");
    assert_eq!(status, SaleOrderStatus::Delivered);
}

#[tokio::test]
async fn shipment_events_drive_order_status() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let order = create_sale_order(app.db(), SaleOrderStatus::Confirmed, dec!(50.00)).await;
    let shipment = create_shipment(app.db(), order.id, ShipmentStatus::Shipped).await;

    let status = sync
        .on_shipment_status_changed(shipment.id)
        .await
        .expect("shipment sync");
    assert_eq!(status, SaleOrderStatus::InTransit);

    let mut active: stockroom_api::entities::shipment::ActiveModel = shipment.into();
    active.status = Set(ShipmentStatus::Delivered.as_str().to_string());
    let shipment = active.update(app.db()).await.expect("update shipment");

    let status = sync
        .on_shipment_status_changed(shipment.id)
        .await
        .expect("shipment sync");
    assert_eq!(status, SaleOrderStatus::Delivered);

    // Cancelling the shipment afterwards cannot un-deliver the order.
    let mut active: stockroom_api::entities::shipment::ActiveModel = shipment.into();
    active.status = Set(ShipmentStatus::Cancelled.as_str().to_string());
    let shipment = active.update(app.db()).await.expect("update shipment");

    let status = sync
        .on_shipment_status_changed(shipment.id)
        .await
        .expect("shipment sync");
    assert_eq!(status, SaleOrderStatus::Delivered);
}

#[tokio::test]
async fn purchase_order_delivery_promotes_units_and_serves_queue() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let po = create_purchase_order(app.db(), PurchaseOrderStatus::InTransit).await;
    let po_line = create_purchase_order_line(app.db(), po.id, product.id, 3, dec!(20.00)).await;

    let inbound = create_unit_from_po(
        app.db(),
        product.id,
        po.id,
        po_line.id,
        UnitStatus::InTransit,
        dec!(20.00),
    )
    .await;
    let presold = create_unit_from_po(
        app.db(),
        product.id,
        po.id,
        po_line.id,
        UnitStatus::PreSold,
        dec!(20.00),
    )
    .await;
    let reservation = create_reservation(app.db(), product.id, 1, Utc::now()).await;

    let mut active: purchase_order::ActiveModel = po.into();
    active.status = Set(PurchaseOrderStatus::Delivered.as_str().to_string());
    let po = active.update(app.db()).await.expect("update po");

    let touched = sync
        .on_purchase_order_status_changed(po.id)
        .await
        .expect("po cascade");
    assert!(touched >= 2);

    let presold = InventoryUnit::find_by_id(presold.id)
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    assert_eq!(presold.status, UnitStatus::Sold.as_str());

    // The freed inbound unit landed on the shelf and was immediately
    // consumed by the queued reservation.
    let inbound = InventoryUnit::find_by_id(inbound.id)
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    assert_eq!(inbound.status, UnitStatus::Reserved.as_str());

    let reservation = PreorderReservation::find_by_id(reservation.id)
        .one(app.db())
        .await
        .expect("query reservation")
        .expect("reservation exists");
    assert_eq!(reservation.status, ReservationStatus::Assigned.as_str());
}

#[tokio::test]
async fn purchase_order_cancellation_scraps_free_units() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let po = create_purchase_order(app.db(), PurchaseOrderStatus::Cancelled).await;
    let po_line = create_purchase_order_line(app.db(), po.id, product.id, 1, dec!(20.00)).await;
    let unit = create_unit_from_po(
        app.db(),
        product.id,
        po.id,
        po_line.id,
        UnitStatus::InTransit,
        dec!(20.00),
    )
    .await;

    sync.on_purchase_order_status_changed(po.id)
        .await
        .expect("po cascade");

    let unit = InventoryUnit::find_by_id(unit.id)
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    assert_eq!(unit.status, UnitStatus::Scrap.as_str());
}

#[tokio::test]
async fn line_delete_with_sold_units_is_blocked() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let order = create_sale_order(app.db(), SaleOrderStatus::Confirmed, dec!(80.00)).await;
    let line = create_sale_order_line(app.db(), order.id, product.id, 2, Some(dec!(40.00))).await;
    for _ in 0..2 {
        create_linked_unit(
            app.db(),
            product.id,
            order.id,
            line.id,
            UnitStatus::Sold,
            dec!(10.00),
        )
        .await;
    }

    let err = sync
        .release_on_line_delete(line.id)
        .await
        .expect_err("delete must be blocked");
    assert!(matches!(err, ServiceError::ConsistencyError(_)));

    // Line and units untouched.
    assert!(SaleOrderLine::find_by_id(line.id)
        .one(app.db())
        .await
        .expect("query line")
        .is_some());
}

#[tokio::test]
async fn line_delete_releases_reserved_units() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let order = create_sale_order(app.db(), SaleOrderStatus::Confirmed, dec!(80.00)).await;
    let line = create_sale_order_line(app.db(), order.id, product.id, 2, Some(dec!(40.00))).await;
    for _ in 0..2 {
        create_linked_unit(
            app.db(),
            product.id,
            order.id,
            line.id,
            UnitStatus::Reserved,
            dec!(10.00),
        )
        .await;
    }

    let released = sync
        .release_on_line_delete(line.id)
        .await
        .expect("delete line");
    assert_eq!(released, 2);

    assert!(SaleOrderLine::find_by_id(line.id)
        .one(app.db())
        .await
        .expect("query line")
        .is_none());

    let units = InventoryUnit::find()
        .filter(inventory_unit::Column::ProductId.eq(product.id))
        .all(app.db())
        .await
        .expect("query units");
    assert_eq!(units.len(), 2);
    for unit in units {
        assert_eq!(unit.status, UnitStatus::Available.as_str());
        assert!(unit.sale_order_id.is_none());
        assert!(unit.sold_price.is_none());
    }
}

#[tokio::test]
async fn reduce_sale_line_sheds_queued_demand_first() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let order = create_sale_order(app.db(), SaleOrderStatus::Confirmed, dec!(90.00)).await;
    let line = create_sale_order_line(app.db(), order.id, product.id, 3, Some(dec!(30.00))).await;
    let unit = create_linked_unit(
        app.db(),
        product.id,
        order.id,
        line.id,
        UnitStatus::Reserved,
        dec!(10.00),
    )
    .await;
    // Two of the three are still queued as a preorder.
    let reservation = create_reservation(app.db(), product.id, 2, Utc::now()).await;
    let mut active: stockroom_api::entities::preorder_reservation::ActiveModel =
        reservation.clone().into();
    active.sale_order_id = Set(Some(order.id));
    active.sale_order_line_id = Set(Some(line.id));
    active.update(app.db()).await.expect("link reservation");

    sync.reduce_line_quantity(&SaleOrderLineCapacity(line.clone()), 3, 1)
        .await
        .expect("reduce line");

    let reservation = PreorderReservation::find_by_id(reservation.id)
        .one(app.db())
        .await
        .expect("query reservation")
        .expect("reservation exists");
    assert_eq!(reservation.status, ReservationStatus::Cancelled.as_str());

    // The reserved unit survives untouched.
    let unit = InventoryUnit::find_by_id(unit.id)
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    assert_eq!(unit.status, UnitStatus::Reserved.as_str());
}

#[tokio::test]
async fn reduce_sale_line_below_sold_count_fails() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let order = create_sale_order(app.db(), SaleOrderStatus::Confirmed, dec!(80.00)).await;
    let line = create_sale_order_line(app.db(), order.id, product.id, 2, Some(dec!(40.00))).await;
    for _ in 0..2 {
        create_linked_unit(
            app.db(),
            product.id,
            order.id,
            line.id,
            UnitStatus::Sold,
            dec!(10.00),
        )
        .await;
    }

    let err = sync
        .reduce_line_quantity(&SaleOrderLineCapacity(line), 2, 0)
        .await
        .expect_err("reduce must fail");
    assert!(matches!(err, ServiceError::InsufficientStock(_)));
}

#[tokio::test]
async fn reduce_purchase_line_deletes_surplus_free_units() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let po = create_purchase_order(app.db(), PurchaseOrderStatus::InTransit).await;
    let po_line = create_purchase_order_line(app.db(), po.id, product.id, 3, dec!(15.00)).await;
    for _ in 0..3 {
        create_unit_from_po(
            app.db(),
            product.id,
            po.id,
            po_line.id,
            UnitStatus::InTransit,
            dec!(15.00),
        )
        .await;
    }

    sync.reduce_line_quantity(&PurchaseOrderLineCapacity(po_line), 3, 1)
        .await
        .expect("reduce line");

    let remaining = InventoryUnit::find()
        .filter(inventory_unit::Column::ProductId.eq(product.id))
        .all(app.db())
        .await
        .expect("query units");
    assert_eq!(remaining.len(), 1);
}

#[tokio::test]
async fn attach_demand_links_stock_and_queues_shortfall() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let product = create_product(app.db()).await;
    let order = create_sale_order(app.db(), SaleOrderStatus::Pending, dec!(90.00)).await;
    let line = create_sale_order_line(app.db(), order.id, product.id, 3, Some(dec!(30.00))).await;

    let on_hand = create_unit(app.db(), product.id, UnitStatus::Available, dec!(12.00)).await;
    let inbound = create_unit(app.db(), product.id, UnitStatus::InTransit, dec!(12.00)).await;

    let outcome = sync.attach_demand(line.id).await.expect("attach demand");
    assert_eq!(outcome.attached, 2);
    assert_eq!(outcome.queued, 1);

    let on_hand = InventoryUnit::find_by_id(on_hand.id)
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    assert_eq!(on_hand.status, UnitStatus::Reserved.as_str());
    assert_eq!(on_hand.sale_order_line_id, Some(line.id));

    let inbound = InventoryUnit::find_by_id(inbound.id)
        .one(app.db())
        .await
        .expect("query unit")
        .expect("unit exists");
    assert_eq!(inbound.status, UnitStatus::PreReserved.as_str());

    let queued = PreorderReservation::find()
        .all(app.db())
        .await
        .expect("query reservations");
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].quantity, 1);
    assert_eq!(queued[0].sale_order_line_id, Some(line.id));
    assert_eq!(queued[0].status, ReservationStatus::Pending.as_str());
}

#[tokio::test]
async fn order_status_is_persisted_after_promotion() {
    let app = TestApp::new().await;
    let sync = app.state.status_sync.clone();
    let order = create_sale_order(app.db(), SaleOrderStatus::Pending, dec!(25.00)).await;
    create_payment(app.db(), order.id, dec!(25.00), PaymentStatus::Completed).await;

    sync.evaluate_payment_coverage(order.id)
        .await
        .expect("evaluate coverage");

    let stored = SaleOrder::find_by_id(order.id)
        .one(app.db())
        .await
        .expect("query order")
        .expect("order exists");
    assert_eq!(stored.status, SaleOrderStatus::Confirmed.as_str());
}
