use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::Policy, database::Database, error::AppError};

#[derive(Debug, Deserialize)]
pub struct AllocationRequest {
    pub distributor_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct AllocationOutcome {
    pub allocation_id: Uuid,
    pub distributor_id: Uuid,
    pub product_id: Uuid,
    pub allocated_quantity: i32,
    pub distributor_price: Decimal,
}

/// Resale price charged to the distributor: the manufacturer price with the
/// policy markup applied, rounded to cents.
pub fn distributor_price(manufacturer_price: Decimal, markup_factor: Decimal) -> Decimal {
    (manufacturer_price * markup_factor).round_dp(2)
}

/// Move stock from a manufacturer to a distributor and record the transfer.
///
/// One transaction: the availability check and the debit are a single guarded
/// UPDATE, so two racing allocations against the same inventory row cannot
/// both succeed once their combined quantity exceeds what is available.
pub async fn allocate(
    db: &Database,
    policy: &Policy,
    manufacturer_id: Uuid,
    request: AllocationRequest,
) -> Result<AllocationOutcome, AppError> {
    if request.quantity <= 0 {
        return Err(AppError::Validation(
            "Allocation quantity must be positive".to_string(),
        ));
    }

    let mut tx = db.begin().await?;

    let inventory = sqlx::query_as::<_, (i32, Decimal, Decimal)>(
        r#"
        SELECT i.quantity_available, p.manufacturing_cost, p.unit_price
        FROM manufacturer_inventory i
        JOIN products p ON p.id = i.product_id
        WHERE i.product_id = $1 AND i.manufacturer_id = $2
        "#,
    )
    .bind(request.product_id)
    .bind(manufacturer_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (quantity_available, manufacturing_cost, unit_price) = match inventory {
        Some(row) => row,
        None => {
            return Err(AppError::Validation(
                "Inventory record not found for this product".to_string(),
            ))
        }
    };

    let price = distributor_price(unit_price, policy.markup_factor);

    let debited = sqlx::query(
        r#"
        UPDATE manufacturer_inventory
        SET quantity_available = quantity_available - $1, updated_at = NOW()
        WHERE product_id = $2 AND manufacturer_id = $3 AND quantity_available >= $1
        "#,
    )
    .bind(request.quantity)
    .bind(request.product_id)
    .bind(manufacturer_id)
    .execute(&mut *tx)
    .await?;

    if debited.rows_affected() == 0 {
        return Err(AppError::InsufficientStock {
            available: quantity_available,
        });
    }

    let allocation_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO allocations
            (manufacturer_id, distributor_id, product_id, allocated_quantity, unit_price, status)
        VALUES ($1, $2, $3, $4, $5, 'completed')
        RETURNING id
        "#,
    )
    .bind(manufacturer_id)
    .bind(request.distributor_id)
    .bind(request.product_id)
    .bind(request.quantity)
    .bind(price)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO distributor_inventory
            (distributor_id, product_id, quantity_available, cost_price, unit_price)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (distributor_id, product_id) DO UPDATE
        SET quantity_available = distributor_inventory.quantity_available + EXCLUDED.quantity_available,
            cost_price = EXCLUDED.cost_price,
            unit_price = EXCLUDED.unit_price,
            updated_at = NOW()
        "#,
    )
    .bind(request.distributor_id)
    .bind(request.product_id)
    .bind(request.quantity)
    .bind(manufacturing_cost)
    .bind(price)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    log::info!(
        "allocated {} units of {} to distributor {}",
        request.quantity,
        request.product_id,
        request.distributor_id
    );

    Ok(AllocationOutcome {
        allocation_id,
        distributor_id: request.distributor_id,
        product_id: request.product_id,
        allocated_quantity: request.quantity,
        distributor_price: price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn ten_percent_markup_on_round_price() {
        // 10.00 * 1.10 = 11.00
        assert_eq!(
            distributor_price(dec(1000, 2), dec(110, 2)),
            dec(1100, 2)
        );
    }

    #[test]
    fn price_is_rounded_to_cents() {
        // 10.01 * 1.10 = 11.011 -> 11.01
        assert_eq!(
            distributor_price(dec(1001, 2), dec(110, 2)),
            dec(1101, 2)
        );
    }

    #[test]
    fn larger_markups_are_honored() {
        // 40.00 * 1.25 = 50.00
        assert_eq!(
            distributor_price(dec(4000, 2), dec(125, 2)),
            dec(5000, 2)
        );
    }

    #[test]
    fn price_never_falls_below_the_markup_floor() {
        let base = dec(999, 2);
        let floor = (base * Policy::minimum_markup()).round_dp(2);
        assert!(distributor_price(base, Policy::minimum_markup()) >= floor);
        assert!(distributor_price(base, dec(150, 2)) >= floor);
    }
}
