use axum::{
    extract::{Form, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    config::Policy,
    error::AppError,
    middleware::{distributor_id_for, require_role},
    models::Role,
    AppState,
};

#[derive(Serialize)]
pub struct DashboardResponse {
    pub company_name: String,
    pub unique_products: i64,
    pub total_units: i64,
    pub inventory_value: Decimal,
}

#[derive(Serialize, FromRow)]
pub struct InventoryRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub category: String,
    pub description: Option<String>,
    pub quantity_available: i32,
    pub cost_price: Decimal,
    pub unit_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, FromRow)]
pub struct AllocationRow {
    pub id: Uuid,
    pub manufacturer_name: String,
    pub product_name: String,
    pub allocated_quantity: i32,
    pub unit_price: Decimal,
    pub status: String,
    pub allocated_at: DateTime<Utc>,
}

#[derive(Serialize, FromRow)]
pub struct CustomerOrderRow {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub order_status: String,
    pub payment_status: String,
    pub first_name: String,
    pub last_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub dist_stock: i32,
}

#[derive(Deserialize)]
pub struct PriceForm {
    inventory_id: Uuid,
    new_price: Decimal,
}

#[derive(Serialize)]
pub struct PriceResponse {
    pub success: bool,
    pub message: String,
}

pub async fn dashboard(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<DashboardResponse>, AppError> {
    let user = require_role(cookies, &state.db, Role::Distributor).await?;

    let (distributor_id, company_name) = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, company_name FROM distributors WHERE user_id = $1",
    )
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Validation("Distributor profile not found".to_string()))?;

    let (unique_products, total_units, inventory_value) =
        sqlx::query_as::<_, (i64, i64, Decimal)>(
            r#"
            SELECT COUNT(DISTINCT product_id),
                   COALESCE(SUM(quantity_available), 0),
                   COALESCE(SUM(quantity_available * unit_price), 0)
            FROM distributor_inventory
            WHERE distributor_id = $1
            "#,
        )
        .bind(distributor_id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(DashboardResponse {
        company_name,
        unique_products,
        total_units,
        inventory_value,
    }))
}

pub async fn inventory(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Vec<InventoryRow>>, AppError> {
    let user = require_role(cookies, &state.db, Role::Distributor).await?;
    let distributor_id = distributor_id_for(&state.db, &user).await?;

    let rows = sqlx::query_as::<_, InventoryRow>(
        r#"
        SELECT di.id, di.product_id, p.product_name, p.category, p.description,
               di.quantity_available, di.cost_price, di.unit_price, di.updated_at
        FROM distributor_inventory di
        JOIN products p ON p.id = di.product_id
        WHERE di.distributor_id = $1
        ORDER BY p.product_name
        "#,
    )
    .bind(distributor_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// Distributors set their own resale price, but never below the markup
/// floor over what the stock cost them.
pub async fn update_price(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<PriceForm>,
) -> Result<Json<PriceResponse>, AppError> {
    let user = require_role(cookies, &state.db, Role::Distributor).await?;
    let distributor_id = distributor_id_for(&state.db, &user).await?;

    let cost_price = sqlx::query_scalar::<_, Decimal>(
        "SELECT cost_price FROM distributor_inventory WHERE id = $1 AND distributor_id = $2",
    )
    .bind(form.inventory_id)
    .bind(distributor_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Validation("Inventory record not found".to_string()))?;

    let floor = (cost_price * Policy::minimum_markup()).round_dp(2);
    if form.new_price < floor {
        return Err(AppError::Validation(format!(
            "Resale price {} is below the minimum of {}",
            form.new_price, floor
        )));
    }

    sqlx::query(
        r#"
        UPDATE distributor_inventory
        SET unit_price = $1, updated_at = NOW()
        WHERE id = $2 AND distributor_id = $3
        "#,
    )
    .bind(form.new_price)
    .bind(form.inventory_id)
    .bind(distributor_id)
    .execute(&state.db)
    .await?;

    Ok(Json(PriceResponse {
        success: true,
        message: "Price updated successfully".to_string(),
    }))
}

pub async fn allocations(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Vec<AllocationRow>>, AppError> {
    let user = require_role(cookies, &state.db, Role::Distributor).await?;
    let distributor_id = distributor_id_for(&state.db, &user).await?;

    let rows = sqlx::query_as::<_, AllocationRow>(
        r#"
        SELECT a.id, m.company_name AS manufacturer_name, p.product_name,
               a.allocated_quantity, a.unit_price, a.status, a.allocated_at
        FROM allocations a
        JOIN manufacturers m ON m.id = a.manufacturer_id
        JOIN products p ON p.id = a.product_id
        WHERE a.distributor_id = $1
        ORDER BY a.allocated_at DESC
        "#,
    )
    .bind(distributor_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// Customer orders filled from this distributor's stock.
pub async fn customer_orders(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Vec<CustomerOrderRow>>, AppError> {
    let user = require_role(cookies, &state.db, Role::Distributor).await?;
    let distributor_id = distributor_id_for(&state.db, &user).await?;

    let rows = sqlx::query_as::<_, CustomerOrderRow>(
        r#"
        SELECT o.id AS order_id, o.order_date, o.total_amount,
               o.order_status, o.payment_status,
               c.first_name, c.last_name, p.product_name,
               oi.quantity, oi.unit_price,
               di.quantity_available AS dist_stock
        FROM orders o
        JOIN order_items oi ON oi.order_id = o.id
        JOIN products p ON p.id = oi.product_id
        JOIN customers c ON c.id = o.customer_id
        JOIN distributor_inventory di
             ON di.product_id = oi.product_id
             AND di.distributor_id = oi.seller_id
        WHERE oi.seller_type = 'distributor'
          AND oi.seller_id = $1
        ORDER BY o.order_date DESC
        "#,
    )
    .bind(distributor_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}
