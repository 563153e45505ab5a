use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub manufacturer_id: Uuid,
    pub product_name: String,
    pub description: Option<String>,
    pub category: String,
    pub unit_price: Decimal,
    pub manufacturing_cost: Decimal,
    pub weight: Option<Decimal>,
    pub dimensions: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ManufacturerInventory {
    pub id: Uuid,
    pub manufacturer_id: Uuid,
    pub product_id: Uuid,
    pub quantity_available: i32,
    pub reorder_level: i32,
    pub updated_at: DateTime<Utc>,
}

/// Stock a distributor resells, priced independently of the manufacturer.
/// `cost_price` carries the manufacturing cost recorded at allocation time;
/// `unit_price` is the resale price shown to customers.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DistributorInventory {
    pub id: Uuid,
    pub distributor_id: Uuid,
    pub product_id: Uuid,
    pub quantity_available: i32,
    pub cost_price: Decimal,
    pub unit_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Append-only record of a manufacturer-to-distributor stock transfer.
/// Written in the same transaction as the inventory debit/credit pair and
/// never mutated afterward.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Allocation {
    pub id: Uuid,
    pub manufacturer_id: Uuid,
    pub distributor_id: Uuid,
    pub product_id: Uuid,
    pub allocated_quantity: i32,
    pub unit_price: Decimal,
    pub status: String,
    pub allocated_at: DateTime<Utc>,
}
