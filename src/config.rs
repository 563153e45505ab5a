use std::env;

use rust_decimal::Decimal;

use crate::error::AppError;

/// Business constants governing the allocation and order workflows. Loaded
/// once at startup and passed into the engines; nothing below reads the
/// environment after that.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Multiplier applied to the manufacturer price to derive the
    /// distributor resale price. Must be at least `minimum_markup()`.
    pub markup_factor: Decimal,
    /// Orders below this quantity are raised to it with a warning.
    pub min_order_quantity: i32,
    /// Days between payment and estimated delivery.
    pub delivery_lead_days: i64,
    /// Smallest initial stock accepted when a product is registered.
    pub min_initial_stock: i32,
}

impl Policy {
    /// The 10% markup floor. Allocation pricing and distributor price
    /// updates are both held to it.
    pub fn minimum_markup() -> Decimal {
        Decimal::new(110, 2)
    }

    pub fn new(
        markup_factor: Decimal,
        min_order_quantity: i32,
        delivery_lead_days: i64,
        min_initial_stock: i32,
    ) -> Result<Self, AppError> {
        if markup_factor < Self::minimum_markup() {
            return Err(AppError::Validation(format!(
                "Markup factor {} is below the minimum {}",
                markup_factor,
                Self::minimum_markup()
            )));
        }
        if min_order_quantity < 1 {
            return Err(AppError::Validation(
                "Minimum order quantity must be at least 1".to_string(),
            ));
        }
        if delivery_lead_days < 0 {
            return Err(AppError::Validation(
                "Delivery lead days cannot be negative".to_string(),
            ));
        }
        if min_initial_stock < 1 {
            return Err(AppError::Validation(
                "Minimum initial stock must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            markup_factor,
            min_order_quantity,
            delivery_lead_days,
            min_initial_stock,
        })
    }

    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let markup_factor = match env::var("MARKUP_FACTOR") {
            Ok(raw) => raw.parse::<Decimal>().map_err(|_| {
                AppError::Validation(format!("Invalid MARKUP_FACTOR: {}", raw))
            })?,
            Err(_) => defaults.markup_factor,
        };
        let min_order_quantity = parse_env_int("MIN_ORDER_QUANTITY", defaults.min_order_quantity)?;
        let delivery_lead_days = parse_env_int("DELIVERY_LEAD_DAYS", defaults.delivery_lead_days)?;
        let min_initial_stock = parse_env_int("MIN_INITIAL_STOCK", defaults.min_initial_stock)?;

        Self::new(
            markup_factor,
            min_order_quantity,
            delivery_lead_days,
            min_initial_stock,
        )
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            markup_factor: Decimal::new(110, 2),
            min_order_quantity: 2,
            delivery_lead_days: 7,
            min_initial_stock: 100,
        }
    }
}

fn parse_env_int<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| AppError::Validation(format!("Invalid {}: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let policy = Policy::default();
        let validated = Policy::new(
            policy.markup_factor,
            policy.min_order_quantity,
            policy.delivery_lead_days,
            policy.min_initial_stock,
        );
        assert!(validated.is_ok());
        assert_eq!(policy.min_order_quantity, 2);
        assert_eq!(policy.delivery_lead_days, 7);
        assert_eq!(policy.min_initial_stock, 100);
    }

    #[test]
    fn markup_below_floor_is_rejected() {
        let result = Policy::new(Decimal::new(105, 2), 2, 7, 100);
        assert!(result.is_err());
    }

    #[test]
    fn markup_at_floor_is_accepted() {
        let policy = Policy::new(Decimal::new(110, 2), 2, 7, 100).unwrap();
        assert_eq!(policy.markup_factor, Decimal::new(110, 2));
    }

    #[test]
    fn non_positive_order_minimum_is_rejected() {
        assert!(Policy::new(Decimal::new(120, 2), 0, 7, 100).is_err());
    }
}
