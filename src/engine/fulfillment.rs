use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::Policy, database::Database, error::AppError};

/// Which kind of entity fills an order line. Stored as lowercase text in
/// `order_items.seller_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerType {
    Distributor,
    Manufacturer,
}

impl SellerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerType::Distributor => "distributor",
            SellerType::Manufacturer => "manufacturer",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub shipping_address: String,
}

#[derive(Debug, Serialize)]
pub struct OrderOutcome {
    pub order_id: Uuid,
    pub total_amount: Decimal,
    pub quantity: i32,
    pub seller_type: SellerType,
    pub seller_id: Uuid,
    pub warning: Option<String>,
}

/// Apply the minimum-order floor. Returns the quantity to fulfill and
/// whether the request was raised to reach it.
pub fn effective_quantity(requested: i32, minimum: i32) -> (i32, bool) {
    if requested < minimum {
        (minimum, true)
    } else {
        (requested, false)
    }
}

pub fn minimum_order_warning(minimum: i32) -> String {
    format!(
        "Minimum order quantity is {}. Your order has been adjusted automatically.",
        minimum
    )
}

/// Create an order for a customer, distributor stock first.
///
/// Seller selection is deterministic: the lowest-id distributor holding
/// enough stock wins, with the manufacturer at the product's base price as
/// fallback. Order, order item, and the seller's inventory debit land in one
/// transaction; a zero-row debit means a concurrent order took the stock
/// between selection and debit, and everything rolls back.
pub async fn place_order(
    db: &Database,
    policy: &Policy,
    customer_id: Uuid,
    request: OrderRequest,
) -> Result<OrderOutcome, AppError> {
    if request.quantity <= 0 {
        return Err(AppError::Validation(
            "Order quantity must be positive".to_string(),
        ));
    }

    let (quantity, adjusted) = effective_quantity(request.quantity, policy.min_order_quantity);
    let warning = if adjusted {
        Some(minimum_order_warning(policy.min_order_quantity))
    } else {
        None
    };

    let mut tx = db.begin().await?;

    let distributor = sqlx::query_as::<_, (Uuid, Decimal)>(
        r#"
        SELECT distributor_id, unit_price
        FROM distributor_inventory
        WHERE product_id = $1 AND quantity_available >= $2
        ORDER BY distributor_id
        LIMIT 1
        "#,
    )
    .bind(request.product_id)
    .bind(quantity)
    .fetch_optional(&mut *tx)
    .await?;

    let (seller_type, seller_id, unit_price) = match distributor {
        Some((distributor_id, unit_price)) => {
            (SellerType::Distributor, distributor_id, unit_price)
        }
        None => {
            let manufacturer = sqlx::query_as::<_, (Uuid, Decimal)>(
                r#"
                SELECT i.manufacturer_id, p.unit_price
                FROM manufacturer_inventory i
                JOIN products p ON p.id = i.product_id
                WHERE i.product_id = $1 AND i.quantity_available >= $2
                ORDER BY i.manufacturer_id
                LIMIT 1
                "#,
            )
            .bind(request.product_id)
            .bind(quantity)
            .fetch_optional(&mut *tx)
            .await?;

            match manufacturer {
                Some((manufacturer_id, unit_price)) => {
                    (SellerType::Manufacturer, manufacturer_id, unit_price)
                }
                None => return Err(AppError::ProductUnavailable),
            }
        }
    };

    let total_amount = unit_price * Decimal::from(quantity);

    let order_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO orders (customer_id, total_amount, order_status, payment_status, shipping_address)
        VALUES ($1, $2, 'pending', 'pending', $3)
        RETURNING id
        "#,
    )
    .bind(customer_id)
    .bind(total_amount)
    .bind(&request.shipping_address)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, seller_type, seller_id, quantity, unit_price)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(order_id)
    .bind(request.product_id)
    .bind(seller_type.as_str())
    .bind(seller_id)
    .bind(quantity)
    .bind(unit_price)
    .execute(&mut *tx)
    .await?;

    let debit_sql = match seller_type {
        SellerType::Distributor => {
            r#"
            UPDATE distributor_inventory
            SET quantity_available = quantity_available - $1, updated_at = NOW()
            WHERE distributor_id = $2 AND product_id = $3 AND quantity_available >= $1
            "#
        }
        SellerType::Manufacturer => {
            r#"
            UPDATE manufacturer_inventory
            SET quantity_available = quantity_available - $1, updated_at = NOW()
            WHERE manufacturer_id = $2 AND product_id = $3 AND quantity_available >= $1
            "#
        }
    };

    let debited = sqlx::query(debit_sql)
        .bind(quantity)
        .bind(seller_id)
        .bind(request.product_id)
        .execute(&mut *tx)
        .await?;

    if debited.rows_affected() == 0 {
        // A concurrent order depleted the stock between selection and debit.
        return Err(AppError::ProductUnavailable);
    }

    tx.commit().await?;

    log::info!(
        "order {} placed: {} x {} from {} {}",
        order_id,
        quantity,
        request.product_id,
        seller_type.as_str(),
        seller_id
    );

    Ok(OrderOutcome {
        order_id,
        total_amount,
        quantity,
        seller_type,
        seller_id,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_below_minimum_is_raised() {
        assert_eq!(effective_quantity(1, 2), (2, true));
    }

    #[test]
    fn quantity_at_minimum_is_untouched() {
        assert_eq!(effective_quantity(2, 2), (2, false));
    }

    #[test]
    fn quantity_above_minimum_is_untouched() {
        assert_eq!(effective_quantity(50, 2), (50, false));
    }

    #[test]
    fn warning_names_the_minimum() {
        assert!(minimum_order_warning(2).contains("2"));
    }

    #[test]
    fn order_total_is_quantity_times_unit_price() {
        // The end-to-end pricing path: 10.00 marked up 10% and bought 3x.
        let resale =
            crate::engine::allocation::distributor_price(Decimal::new(1000, 2), Decimal::new(110, 2));
        let total = resale * Decimal::from(3);
        assert_eq!(total, Decimal::new(3300, 2));
    }

    #[test]
    fn seller_type_is_stored_lowercase() {
        assert_eq!(SellerType::Distributor.as_str(), "distributor");
        assert_eq!(SellerType::Manufacturer.as_str(), "manufacturer");
    }
}
