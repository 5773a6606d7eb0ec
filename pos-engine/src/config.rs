//! Engine configuration
//!
//! Per-tenant configuration values with serde defaults. Embedders load
//! this from wherever they keep tenant settings and hand it to
//! [`Engine`](crate::engine::Engine).

use crate::inventory::policy::StockPolicy;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Disposition of insufficient-stock sales
    #[serde(default)]
    pub stock_policy: StockPolicy,

    /// Cancellation window in minutes. The source business rule was
    /// ambiguous between 60 minutes and a same-business-day 24 hours;
    /// this is the single configured value the engine enforces.
    #[serde(default = "default_cancellation_delay")]
    pub max_cancellation_delay_minutes: i64,

    /// Whether order cancellation requires a non-blank reason
    #[serde(default = "default_true")]
    pub require_cancellation_reason: bool,

    /// Protected window after a completed sale during which product
    /// price changes are rejected. 0 disables the guard (changes are
    /// then recorded with `is_retroactive` set).
    #[serde(default = "default_price_window")]
    pub retroactive_price_window_hours: i64,

    /// Relative price change above which a warning is raised (0.5 = 50%)
    #[serde(default = "default_price_swing")]
    pub price_swing_warn_ratio: f64,

    /// Business day cutoff (HH:MM); sales before this hour belong to
    /// the previous business day
    #[serde(default = "default_cutoff")]
    pub business_day_cutoff: String,

    /// Business timezone (IANA name)
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_cancellation_delay() -> i64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_price_window() -> i64 {
    24
}

fn default_price_swing() -> f64 {
    0.5
}

fn default_cutoff() -> String {
    "00:00".to_string()
}

fn default_timezone() -> String {
    "Europe/Madrid".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stock_policy: StockPolicy::default(),
            max_cancellation_delay_minutes: default_cancellation_delay(),
            require_cancellation_reason: default_true(),
            retroactive_price_window_hours: default_price_window(),
            price_swing_warn_ratio: default_price_swing(),
            business_day_cutoff: default_cutoff(),
            timezone: default_timezone(),
        }
    }
}

impl EngineConfig {
    /// Cancellation window in milliseconds
    pub fn max_cancellation_delay_millis(&self) -> i64 {
        self.max_cancellation_delay_minutes * 60 * 1000
    }

    /// Retroactive price window in milliseconds (0 = guard disabled)
    pub fn retroactive_price_window_millis(&self) -> i64 {
        self.retroactive_price_window_hours * 3600 * 1000
    }

    /// Resolved business timezone; falls back to UTC on a bad name
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %self.timezone, "unknown timezone, falling back to UTC");
            chrono_tz::UTC
        })
    }
}
