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
    engine::{self, AllocationOutcome, AllocationRequest},
    error::AppError,
    middleware::{manufacturer_id_for, require_role},
    models::Role,
    AppState,
};

#[derive(Serialize, FromRow)]
pub struct AllocationRow {
    pub id: Uuid,
    pub company_name: String,
    pub product_name: String,
    pub allocated_quantity: i32,
    pub unit_price: Decimal,
    pub status: String,
    pub allocated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub company_name: String,
    pub total_products: i64,
    pub inventory_value: Decimal,
    pub low_stock: i64,
    pub recent_allocations: Vec<AllocationRow>,
}

#[derive(Serialize, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub product_name: String,
    pub category: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub manufacturing_cost: Decimal,
    pub quantity_available: Option<i32>,
    pub reorder_level: Option<i32>,
}

#[derive(Serialize, FromRow)]
pub struct InventoryRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub category: String,
    pub unit_price: Decimal,
    pub quantity_available: i32,
    pub reorder_level: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ProductForm {
    product_name: String,
    description: Option<String>,
    category: String,
    unit_price: Decimal,
    manufacturing_cost: Decimal,
    weight: Option<Decimal>,
    dimensions: Option<String>,
    initial_quantity: i32,
    reorder_level: i32,
}

#[derive(Deserialize)]
pub struct AllocationForm {
    distributor_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

#[derive(Serialize)]
pub struct AddProductResponse {
    pub success: bool,
    pub message: String,
    pub product_id: Uuid,
}

#[derive(Serialize)]
pub struct AllocateResponse {
    pub success: bool,
    pub message: String,
    pub allocation: AllocationOutcome,
}

pub async fn dashboard(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<DashboardResponse>, AppError> {
    let user = require_role(cookies, &state.db, Role::Manufacturer).await?;

    let (manufacturer_id, company_name) = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, company_name FROM manufacturers WHERE user_id = $1",
    )
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Validation("Manufacturer profile not found".to_string()))?;

    let total_products = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM products WHERE manufacturer_id = $1",
    )
    .bind(manufacturer_id)
    .fetch_one(&state.db)
    .await?;

    let inventory_value = sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(i.quantity_available * p.unit_price), 0)
        FROM manufacturer_inventory i
        JOIN products p ON p.id = i.product_id
        WHERE i.manufacturer_id = $1
        "#,
    )
    .bind(manufacturer_id)
    .fetch_one(&state.db)
    .await?;

    let low_stock = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM manufacturer_inventory
        WHERE manufacturer_id = $1 AND quantity_available <= reorder_level
        "#,
    )
    .bind(manufacturer_id)
    .fetch_one(&state.db)
    .await?;

    let recent_allocations = sqlx::query_as::<_, AllocationRow>(
        r#"
        SELECT a.id, d.company_name, p.product_name,
               a.allocated_quantity, a.unit_price, a.status, a.allocated_at
        FROM allocations a
        JOIN distributors d ON d.id = a.distributor_id
        JOIN products p ON p.id = a.product_id
        WHERE a.manufacturer_id = $1
        ORDER BY a.allocated_at DESC
        LIMIT 5
        "#,
    )
    .bind(manufacturer_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(DashboardResponse {
        company_name,
        total_products,
        inventory_value,
        low_stock,
        recent_allocations,
    }))
}

pub async fn products_list(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Vec<ProductRow>>, AppError> {
    let user = require_role(cookies, &state.db, Role::Manufacturer).await?;
    let manufacturer_id = manufacturer_id_for(&state.db, &user).await?;

    let products = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT p.id, p.product_name, p.category, p.description,
               p.unit_price, p.manufacturing_cost,
               i.quantity_available, i.reorder_level
        FROM products p
        LEFT JOIN manufacturer_inventory i ON i.product_id = p.id
        WHERE p.manufacturer_id = $1
        ORDER BY p.product_name
        "#,
    )
    .bind(manufacturer_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(products))
}

pub async fn add_product(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<ProductForm>,
) -> Result<Json<AddProductResponse>, AppError> {
    let user = require_role(cookies, &state.db, Role::Manufacturer).await?;
    let manufacturer_id = manufacturer_id_for(&state.db, &user).await?;

    if form.unit_price <= Decimal::ZERO {
        return Err(AppError::Validation("Unit price must be positive".to_string()));
    }
    if form.manufacturing_cost < Decimal::ZERO {
        return Err(AppError::Validation(
            "Manufacturing cost cannot be negative".to_string(),
        ));
    }
    if form.initial_quantity < state.policy.min_initial_stock {
        return Err(AppError::Validation(format!(
            "Initial quantity must be {} or more to add a new product",
            state.policy.min_initial_stock
        )));
    }
    if form.reorder_level < 0 {
        return Err(AppError::Validation(
            "Reorder level cannot be negative".to_string(),
        ));
    }

    // Product and its opening inventory land together or not at all.
    let mut tx = state.db.begin().await?;

    let product_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO products
            (manufacturer_id, product_name, description, category, unit_price,
             manufacturing_cost, weight, dimensions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(manufacturer_id)
    .bind(&form.product_name)
    .bind(&form.description)
    .bind(&form.category)
    .bind(form.unit_price)
    .bind(form.manufacturing_cost)
    .bind(form.weight)
    .bind(&form.dimensions)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO manufacturer_inventory (product_id, manufacturer_id, quantity_available, reorder_level)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(product_id)
    .bind(manufacturer_id)
    .bind(form.initial_quantity)
    .bind(form.reorder_level)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(AddProductResponse {
        success: true,
        message: "Product added successfully".to_string(),
        product_id,
    }))
}

pub async fn inventory(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Vec<InventoryRow>>, AppError> {
    let user = require_role(cookies, &state.db, Role::Manufacturer).await?;
    let manufacturer_id = manufacturer_id_for(&state.db, &user).await?;

    let rows = sqlx::query_as::<_, InventoryRow>(
        r#"
        SELECT i.product_id, p.product_name, p.category, p.unit_price,
               i.quantity_available, i.reorder_level, i.updated_at
        FROM manufacturer_inventory i
        JOIN products p ON p.id = i.product_id
        WHERE i.manufacturer_id = $1
        ORDER BY p.product_name
        "#,
    )
    .bind(manufacturer_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

pub async fn allocate(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<AllocationForm>,
) -> Result<Json<AllocateResponse>, AppError> {
    let user = require_role(cookies, &state.db, Role::Manufacturer).await?;
    let manufacturer_id = manufacturer_id_for(&state.db, &user).await?;

    let allocation = engine::allocate(
        &state.db,
        &state.policy,
        manufacturer_id,
        AllocationRequest {
            distributor_id: form.distributor_id,
            product_id: form.product_id,
            quantity: form.quantity,
        },
    )
    .await?;

    Ok(Json(AllocateResponse {
        success: true,
        message: format!(
            "Successfully allocated {} units to distributor",
            allocation.allocated_quantity
        ),
        allocation,
    }))
}

pub async fn allocations(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Vec<AllocationRow>>, AppError> {
    let user = require_role(cookies, &state.db, Role::Manufacturer).await?;
    let manufacturer_id = manufacturer_id_for(&state.db, &user).await?;

    let rows = sqlx::query_as::<_, AllocationRow>(
        r#"
        SELECT a.id, d.company_name, p.product_name,
               a.allocated_quantity, a.unit_price, a.status, a.allocated_at
        FROM allocations a
        JOIN distributors d ON d.id = a.distributor_id
        JOIN products p ON p.id = a.product_id
        WHERE a.manufacturer_id = $1
        ORDER BY a.allocated_at DESC
        "#,
    )
    .bind(manufacturer_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}
