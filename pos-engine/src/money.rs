//! Money and quantity arithmetic using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted
//! back to `f64` for storage/serialization. Monetary values round to 2
//! decimal places, ingredient quantities to 4 (0.1 g resolution for kg
//! units).

use rust_decimal::prelude::*;
use shared::{AppError, AppResult, ErrorCode};

/// Rounding for monetary values (2 decimal places, half-up)
const MONEY_DECIMAL_PLACES: u32 = 2;

/// Rounding for stock quantities (4 decimal places)
const QTY_DECIMAL_PLACES: u32 = 4;

/// Maximum allowed price per unit
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per order line
pub const MAX_LINE_QUANTITY: i32 = 9999;
/// Maximum allowed quantity per stock operation
pub const MAX_STOCK_QUANTITY: f64 = 1_000_000.0;

/// Convert an f64 to Decimal (zero on non-representable input)
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert a Decimal back to f64
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Round to 2 decimal places, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to 4 decimal places, half away from zero
pub fn round_qty(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QTY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round-trip an f64 amount through Decimal money rounding
pub fn money(value: f64) -> f64 {
    to_f64(round_money(to_decimal(value)))
}

/// Round-trip an f64 quantity through Decimal quantity rounding
pub fn qty(value: f64) -> f64 {
    to_f64(round_qty(to_decimal(value)))
}

/// Line total: unit price × quantity, money-rounded
pub fn line_total(unit_price: f64, quantity: i32) -> f64 {
    to_f64(round_money(
        to_decimal(unit_price) * Decimal::from(quantity),
    ))
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field_name: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a unit price (finite, positive, bounded)
pub fn validate_price(price: f64) -> AppResult<()> {
    require_finite(price, "price")?;
    if price <= 0.0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("price must be positive, got {}", price),
        )
        .with_detail("price", price));
    }
    if price > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("price exceeds maximum allowed ({}), got {}", MAX_PRICE, price),
        )
        .with_detail("price", price));
    }
    Ok(())
}

/// Validate an order line quantity (positive, bounded)
pub fn validate_line_quantity(quantity: i32) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("quantity must be positive, got {}", quantity),
        )
        .with_detail("quantity", quantity));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!(
                "quantity exceeds maximum allowed ({}), got {}",
                MAX_LINE_QUANTITY, quantity
            ),
        )
        .with_detail("quantity", quantity));
    }
    Ok(())
}

/// Validate a stock operation quantity (finite, positive, bounded)
pub fn validate_stock_quantity(quantity: f64) -> AppResult<()> {
    require_finite(quantity, "quantity")?;
    if quantity <= 0.0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("quantity must be positive, got {}", quantity),
        )
        .with_detail("quantity", quantity));
    }
    if quantity > MAX_STOCK_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!(
                "quantity exceeds maximum allowed ({}), got {}",
                MAX_STOCK_QUANTITY, quantity
            ),
        )
        .with_detail("quantity", quantity));
    }
    Ok(())
}

/// Order total over non-refunded items, money-rounded once at the end
pub fn order_total(items: &[shared::order::OrderItem]) -> f64 {
    let sum = items
        .iter()
        .filter(|item| !item.refunded)
        .fold(Decimal::ZERO, |acc, item| {
            acc + to_decimal(item.unit_price) * Decimal::from(item.quantity)
        });
    to_f64(round_money(sum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderItem;

    fn item(price: f64, quantity: i32, refunded: bool) -> OrderItem {
        OrderItem {
            product_id: "p".to_string(),
            name: "P".to_string(),
            quantity,
            unit_price: price,
            vat_rate: None,
            note: None,
            refunded,
        }
    }

    #[test]
    fn test_money_rounding_half_up() {
        assert_eq!(money(1.005), 1.01);
        assert_eq!(money(1.004), 1.0);
        assert_eq!(money(-1.005), -1.01);
    }

    #[test]
    fn test_line_total_avoids_float_drift() {
        // 0.1 + 0.2 style drift: 3 × 1.1 must be exactly 3.3
        assert_eq!(line_total(1.1, 3), 3.3);
        assert_eq!(line_total(9.9, 2), 19.8);
    }

    #[test]
    fn test_order_total_skips_refunded() {
        let items = vec![item(9.9, 2, false), item(2.5, 1, true), item(1.1, 3, false)];
        assert_eq!(order_total(&items), 23.1);
    }

    #[test]
    fn test_validate_price_rejects_bad_values() {
        assert_eq!(
            validate_price(0.0).unwrap_err().code,
            ErrorCode::InvalidPrice
        );
        assert_eq!(
            validate_price(-3.0).unwrap_err().code,
            ErrorCode::InvalidPrice
        );
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(MAX_PRICE + 1.0).is_err());
        assert!(validate_price(9.9).is_ok());
    }

    #[test]
    fn test_validate_quantities() {
        assert_eq!(
            validate_line_quantity(0).unwrap_err().code,
            ErrorCode::InvalidQuantity
        );
        assert!(validate_line_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_line_quantity(MAX_LINE_QUANTITY + 1).is_err());

        assert!(validate_stock_quantity(0.25).is_ok());
        assert!(validate_stock_quantity(0.0).is_err());
        assert!(validate_stock_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_qty_rounding() {
        assert_eq!(qty(0.15001), 0.15);
        assert_eq!(qty(0.123456), 0.1235);
    }
}
