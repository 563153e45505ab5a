use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Order statuses move one way: `pending` -> `processing` (on payment), then
/// out of scope for this core (`shipped`, `delivered`). `payment_status`
/// moves `pending` -> `paid`. Neither ever reverses.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total_amount: Decimal,
    pub order_status: String,
    pub payment_status: String,
    pub shipping_address: String,
    pub order_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub seller_type: String,
    pub seller_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub payment_method: String,
    pub amount: Decimal,
    pub payment_status: String,
    pub transaction_id: String,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Shipment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub tracking_number: String,
    pub carrier: String,
    pub shipment_status: String,
    pub estimated_delivery_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
