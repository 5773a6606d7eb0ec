//! Price change guard
//!
//! Validates and records product price changes. A change inside the
//! protected window after the product's last completed sale is
//! rejected outright; a large relative change goes through with a
//! non-blocking warning.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{PriceHistoryEntry, Product};
use shared::{AppError, AppResult, ErrorCode};

use crate::config::EngineConfig;
use crate::money::{self, to_decimal, to_f64};
use crate::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};

/// A requested price change
#[derive(Debug, Clone)]
pub struct PriceChangeRequest {
    pub new_price: f64,
    pub actor: String,
    pub reason: Option<String>,
}

/// Non-blocking warning for changes above the swing threshold
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceSwingWarning {
    pub product_id: String,
    pub old_price: f64,
    pub new_price: f64,
    /// |new - old| / old
    pub change_ratio: f64,
}

/// Result of an accepted price change
#[derive(Debug, Clone)]
pub struct PriceChangeOutcome {
    /// Product with the new price applied
    pub product: Product,
    /// History entry to append
    pub entry: PriceHistoryEntry,
    pub swing_warning: Option<PriceSwingWarning>,
}

/// Validate and record a price change.
///
/// `last_completed_sale_at` is the timestamp of the product's most
/// recent completed sale, if any; the retroactive guard compares it
/// against the configured window.
pub fn change_price(
    product: &Product,
    request: &PriceChangeRequest,
    last_completed_sale_at: Option<i64>,
    config: &EngineConfig,
    now: i64,
) -> AppResult<PriceChangeOutcome> {
    money::validate_price(request.new_price)?;
    validate_required_text(&request.actor, "actor", MAX_NAME_LEN)?;
    validate_optional_text(request.reason.as_deref(), "reason", MAX_NOTE_LEN)?;

    // A no-op change is a usage error, not a silent success
    if request.new_price == product.price {
        return Err(AppError::with_message(
            ErrorCode::PriceUnchanged,
            format!("price of {} is already {}", product.id, product.price),
        )
        .with_detail("product_id", product.id.clone()));
    }

    // Retroactive guard: recently sold products keep their price
    let window = config.retroactive_price_window_millis();
    let sold_within = |window_millis: i64| {
        last_completed_sale_at
            .map(|at| now - at < window_millis)
            .unwrap_or(false)
    };
    let mut retroactive = false;
    if window > 0 {
        if sold_within(window) {
            return Err(AppError::with_message(
                ErrorCode::PriceHistoryConflict,
                format!(
                    "{} had a completed sale within the last {} h",
                    product.id, config.retroactive_price_window_hours
                ),
            )
            .with_detail("product_id", product.id.clone())
            .with_detail("window_hours", config.retroactive_price_window_hours));
        }
    } else {
        // Guard disabled: the change goes through but is flagged when
        // it would have been retroactive under the default window
        retroactive = sold_within(24 * 3600 * 1000);
    }

    // Swing warning: |new - old| / old above the configured ratio
    let old = to_decimal(product.price);
    let ratio = to_f64(((to_decimal(request.new_price) - old) / old).abs());
    let swing_warning = (ratio > config.price_swing_warn_ratio).then(|| {
        tracing::warn!(
            product_id = %product.id,
            old_price = product.price,
            new_price = request.new_price,
            change_ratio = ratio,
            "large price swing"
        );
        PriceSwingWarning {
            product_id: product.id.clone(),
            old_price: product.price,
            new_price: request.new_price,
            change_ratio: ratio,
        }
    });

    let mut entry = PriceHistoryEntry::new(
        product.id.clone(),
        product.price,
        request.new_price,
        now,
        request.actor.clone(),
    );
    if let Some(reason) = &request.reason {
        entry = entry.with_reason(reason.clone());
    }
    if retroactive {
        entry = entry.retroactive();
    }

    let mut updated = product.clone();
    updated.price = request.new_price;

    Ok(PriceChangeOutcome {
        product: updated,
        entry,
        swing_warning,
    })
}
