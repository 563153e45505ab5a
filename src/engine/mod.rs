//! The transactional core of the application: allocation pricing, order
//! fulfillment, and payment/shipment. Each entry point is one database
//! transaction; any failure rolls the whole workflow back, so no partial
//! state is ever visible to other requests.

pub mod allocation;
pub mod fulfillment;
pub mod payment;

pub use allocation::{allocate, AllocationOutcome, AllocationRequest};
pub use fulfillment::{place_order, OrderOutcome, OrderRequest, SellerType};
pub use payment::{process_payment, PaymentOutcome};
