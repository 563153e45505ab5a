use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{config::Policy, database::Database, error::AppError};

const DEFAULT_CARRIER: &str = "Standard Carrier";

#[derive(Debug, Serialize)]
pub struct PaymentOutcome {
    pub order_id: Uuid,
    pub amount: Decimal,
    pub transaction_id: String,
    pub tracking_number: String,
    pub estimated_delivery_date: NaiveDate,
}

/// Unique per order and second of payment.
pub fn transaction_reference(order_id: Uuid, at: DateTime<Utc>) -> String {
    format!("TXN-{}-{}", order_id, at.format("%Y%m%d%H%M%S"))
}

pub fn tracking_number(order_id: Uuid, at: DateTime<Utc>) -> String {
    format!("TRACK-{}-{}", order_id, at.format("%Y%m%d"))
}

pub fn estimated_delivery(at: DateTime<Utc>, lead_days: i64) -> NaiveDate {
    (at + Duration::days(lead_days)).date_naive()
}

/// Record a payment against an order the customer owns, then advance the
/// order and open a shipment. One transaction; no retry on failure, the
/// error is surfaced after rollback.
pub async fn process_payment(
    db: &Database,
    policy: &Policy,
    customer_id: Uuid,
    order_id: Uuid,
    payment_method: &str,
) -> Result<PaymentOutcome, AppError> {
    let mut tx = db.begin().await?;

    let order = sqlx::query_as::<_, (Decimal, String)>(
        "SELECT total_amount, payment_status FROM orders WHERE id = $1 AND customer_id = $2",
    )
    .bind(order_id)
    .bind(customer_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (total_amount, payment_status) = match order {
        Some(row) => row,
        None => return Err(AppError::OrderNotFound),
    };

    // Both status columns only ever move forward.
    if payment_status == "paid" {
        return Err(AppError::Validation(
            "Order has already been paid".to_string(),
        ));
    }

    let now = Utc::now();
    let transaction_id = transaction_reference(order_id, now);

    sqlx::query(
        r#"
        INSERT INTO payments (order_id, payment_method, amount, payment_status, transaction_id)
        VALUES ($1, $2, $3, 'success', $4)
        "#,
    )
    .bind(order_id)
    .bind(payment_method)
    .bind(total_amount)
    .bind(&transaction_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE orders SET payment_status = 'paid', order_status = 'processing' WHERE id = $1")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    let tracking = tracking_number(order_id, now);
    let delivery_date = estimated_delivery(now, policy.delivery_lead_days);

    sqlx::query(
        r#"
        INSERT INTO shipments
            (order_id, tracking_number, carrier, shipment_status, estimated_delivery_date)
        VALUES ($1, $2, $3, 'preparing', $4)
        "#,
    )
    .bind(order_id)
    .bind(&tracking)
    .bind(DEFAULT_CARRIER)
    .bind(delivery_date)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    log::info!("payment {} recorded for order {}", transaction_id, order_id);

    Ok(PaymentOutcome {
        order_id,
        amount: total_amount,
        transaction_id,
        tracking_number: tracking,
        estimated_delivery_date: delivery_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 45).unwrap()
    }

    #[test]
    fn transaction_reference_embeds_order_and_timestamp() {
        let order_id = Uuid::new_v4();
        let reference = transaction_reference(order_id, fixed_instant());

        assert!(reference.starts_with("TXN-"));
        assert!(reference.contains(&order_id.to_string()));
        assert!(reference.ends_with("20240315093045"));
    }

    #[test]
    fn tracking_number_uses_the_date_only() {
        let order_id = Uuid::new_v4();
        let tracking = tracking_number(order_id, fixed_instant());

        assert!(tracking.starts_with("TRACK-"));
        assert!(tracking.ends_with("20240315"));
    }

    #[test]
    fn references_differ_across_seconds() {
        let order_id = Uuid::new_v4();
        let later = fixed_instant() + Duration::seconds(1);
        assert_ne!(
            transaction_reference(order_id, fixed_instant()),
            transaction_reference(order_id, later)
        );
    }

    #[test]
    fn delivery_estimate_adds_the_lead_time() {
        let delivery = estimated_delivery(fixed_instant(), 7);
        assert_eq!(delivery, NaiveDate::from_ymd_opt(2024, 3, 22).unwrap());
    }
}
