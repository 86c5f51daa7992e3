pub mod inventory_adjustment;
pub mod inventory_adjustment_entry;
pub mod inventory_adjustment_line;
pub mod inventory_unit;
pub mod job_run;
pub mod payment;
pub mod preorder_reservation;
pub mod product;
pub mod purchase_order;
pub mod purchase_order_line;
pub mod sale_order;
pub mod sale_order_line;
pub mod shipment;
