use axum::{
    extract::{Form, Path, Query, State},
    response::Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    engine::{self, OrderRequest, PaymentOutcome},
    error::AppError,
    middleware::{customer_id_for, require_role},
    models::{Order, Role, Shipment},
    AppState,
};

#[derive(Serialize)]
pub struct DashboardResponse {
    pub customer_name: String,
    pub loyalty_points: i32,
    pub total_orders: i64,
    pub total_spent: Decimal,
}

#[derive(Deserialize)]
pub struct BrowseQuery {
    category: Option<String>,
}

#[derive(Serialize, FromRow)]
pub struct BrowseRow {
    pub id: Uuid,
    pub product_name: String,
    pub category: String,
    pub description: Option<String>,
    pub company_name: String,
    pub display_price: Decimal,
}

#[derive(Serialize)]
pub struct BrowseResponse {
    pub products: Vec<BrowseRow>,
    pub categories: Vec<String>,
}

#[derive(Deserialize)]
pub struct OrderForm {
    product_id: Uuid,
    quantity: i32,
    shipping_address: String,
}

#[derive(Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub message: String,
    pub order_id: Uuid,
    pub total_amount: Decimal,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize, FromRow)]
pub struct OrderItemRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub category: String,
    pub seller_type: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Serialize)]
pub struct OrderDetailsResponse {
    pub order: Order,
    pub items: Vec<OrderItemRow>,
    pub shipment: Option<Shipment>,
}

#[derive(Deserialize)]
pub struct PaymentForm {
    payment_method: String,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment: PaymentOutcome,
}

pub async fn dashboard(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<DashboardResponse>, AppError> {
    let user = require_role(cookies, &state.db, Role::Customer).await?;

    let (customer_id, first_name, last_name, loyalty_points) =
        sqlx::query_as::<_, (Uuid, String, String, i32)>(
            "SELECT id, first_name, last_name, loyalty_points FROM customers WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Validation("Customer profile not found".to_string()))?;

    let (total_orders, total_spent) = sqlx::query_as::<_, (i64, Decimal)>(
        "SELECT COUNT(*), COALESCE(SUM(total_amount), 0) FROM orders WHERE customer_id = $1",
    )
    .bind(customer_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(DashboardResponse {
        customer_name: format!("{} {}", first_name, last_name),
        loyalty_points,
        total_orders,
        total_spent,
    }))
}

/// Catalog view. The displayed price is the cheapest in-stock distributor
/// price, falling back to the manufacturer's base price.
pub async fn browse_products(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<BrowseResponse>, AppError> {
    require_role(cookies, &state.db, Role::Customer).await?;

    let base_sql = r#"
        SELECT p.id, p.product_name, p.category, p.description,
               m.company_name,
               COALESCE(
                   (SELECT MIN(di.unit_price)
                    FROM distributor_inventory di
                    WHERE di.product_id = p.id AND di.quantity_available > 0),
                   p.unit_price
               ) AS display_price
        FROM products p
        JOIN manufacturers m ON m.id = p.manufacturer_id
    "#;

    let products = match &query.category {
        Some(category) if !category.is_empty() => {
            sqlx::query_as::<_, BrowseRow>(&format!(
                "{} WHERE p.category = $1 ORDER BY p.product_name",
                base_sql
            ))
            .bind(category)
            .fetch_all(&state.db)
            .await?
        }
        _ => {
            sqlx::query_as::<_, BrowseRow>(&format!("{} ORDER BY p.product_name", base_sql))
                .fetch_all(&state.db)
                .await?
        }
    };

    let categories = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM products ORDER BY category",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(BrowseResponse {
        products,
        categories,
    }))
}

pub async fn place_order(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<OrderForm>,
) -> Result<Json<PlaceOrderResponse>, AppError> {
    let user = require_role(cookies, &state.db, Role::Customer).await?;
    let customer_id = customer_id_for(&state.db, &user).await?;

    let order = engine::place_order(
        &state.db,
        &state.policy,
        customer_id,
        OrderRequest {
            product_id: form.product_id,
            quantity: form.quantity,
            shipping_address: form.shipping_address,
        },
    )
    .await?;

    Ok(Json(PlaceOrderResponse {
        success: true,
        message: "Order placed successfully".to_string(),
        order_id: order.order_id,
        total_amount: order.total_amount,
        quantity: order.quantity,
        warning: order.warning,
    }))
}

pub async fn orders_list(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Vec<Order>>, AppError> {
    let user = require_role(cookies, &state.db, Role::Customer).await?;
    let customer_id = customer_id_for(&state.db, &user).await?;

    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE customer_id = $1 ORDER BY order_date DESC",
    )
    .bind(customer_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(orders))
}

pub async fn order_details(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetailsResponse>, AppError> {
    let user = require_role(cookies, &state.db, Role::Customer).await?;
    let customer_id = customer_id_for(&state.db, &user).await?;

    let order = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE id = $1 AND customer_id = $2",
    )
    .bind(order_id)
    .bind(customer_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::OrderNotFound)?;

    let items = sqlx::query_as::<_, OrderItemRow>(
        r#"
        SELECT oi.product_id, p.product_name, p.category,
               oi.seller_type, oi.quantity, oi.unit_price
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = $1
        "#,
    )
    .bind(order_id)
    .fetch_all(&state.db)
    .await?;

    let shipment = sqlx::query_as::<_, Shipment>("SELECT * FROM shipments WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(&state.db)
        .await?;

    Ok(Json(OrderDetailsResponse {
        order,
        items,
        shipment,
    }))
}

pub async fn process_payment(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(order_id): Path<Uuid>,
    Form(form): Form<PaymentForm>,
) -> Result<Json<PaymentResponse>, AppError> {
    let user = require_role(cookies, &state.db, Role::Customer).await?;
    let customer_id = customer_id_for(&state.db, &user).await?;

    let payment = engine::process_payment(
        &state.db,
        &state.policy,
        customer_id,
        order_id,
        &form.payment_method,
    )
    .await?;

    Ok(Json(PaymentResponse {
        success: true,
        message: "Payment processed successfully".to_string(),
        payment,
    }))
}
