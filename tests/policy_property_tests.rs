//! Property tests over the pure policy logic: allocation pricing and the
//! minimum-order-quantity floor. The database-backed workflows around these
//! are exercised by their own guarded SQL; everything here must hold for any
//! input the engines would accept.

use proptest::prelude::*;
use rust_decimal::Decimal;

use prodchain::config::Policy;
use prodchain::engine::allocation::distributor_price;
use prodchain::engine::fulfillment::effective_quantity;

proptest! {
    /// Whatever markup the policy carries, the resale price never undercuts
    /// the 10% floor over the manufacturer price.
    #[test]
    fn resale_price_never_undercuts_the_floor(
        cents in 1i64..10_000_000,
        markup_hundredths in 110i64..=300,
    ) {
        let base = Decimal::new(cents, 2);
        let markup = Decimal::new(markup_hundredths, 2);

        let price = distributor_price(base, markup);
        let floor = (base * Policy::minimum_markup()).round_dp(2);

        prop_assert!(price >= floor);
    }

    /// Resale prices are always exact cent amounts.
    #[test]
    fn resale_price_is_rounded_to_cents(
        cents in 1i64..10_000_000,
        markup_hundredths in 110i64..=300,
    ) {
        let price = distributor_price(Decimal::new(cents, 2), Decimal::new(markup_hundredths, 2));
        prop_assert_eq!(price, price.round_dp(2));
    }

    /// A steeper markup never produces a cheaper resale price.
    #[test]
    fn resale_price_is_monotonic_in_the_markup(
        cents in 1i64..10_000_000,
        low in 110i64..=200,
        bump in 0i64..=100,
    ) {
        let base = Decimal::new(cents, 2);
        let lower = distributor_price(base, Decimal::new(low, 2));
        let higher = distributor_price(base, Decimal::new(low + bump, 2));
        prop_assert!(higher >= lower);
    }

    /// The order floor only ever raises quantities, and says so when it does.
    #[test]
    fn effective_quantity_respects_the_floor(
        requested in 1i32..=1_000,
        minimum in 1i32..=10,
    ) {
        let (quantity, adjusted) = effective_quantity(requested, minimum);

        prop_assert!(quantity >= minimum);
        if requested >= minimum {
            prop_assert_eq!(quantity, requested);
            prop_assert!(!adjusted);
        } else {
            prop_assert_eq!(quantity, minimum);
            prop_assert!(adjusted);
        }
    }
}

/// The worked example from the product brief: 500 units at 10.00, allocate
/// 100, customer buys 3 from the distributor.
#[test]
fn allocation_then_order_prices_the_reference_scenario() {
    let policy = Policy::default();

    let resale = distributor_price(Decimal::new(1000, 2), policy.markup_factor);
    assert_eq!(resale, Decimal::new(1100, 2));

    let (quantity, adjusted) = effective_quantity(3, policy.min_order_quantity);
    assert_eq!(quantity, 3);
    assert!(!adjusted);

    assert_eq!(resale * Decimal::from(quantity), Decimal::new(3300, 2));
}
