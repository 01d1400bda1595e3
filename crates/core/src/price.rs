//! Currency-agnostic prices.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Non-negative, finite amount in the catalog's (unspecified) currency unit.
///
/// Prices are kept at full precision; rounding to two decimals happens only
/// when rendering (see [`format_amount`]).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub const ZERO: Price = Price(0.0);

    pub fn new(amount: f64) -> Result<Self, DomainError> {
        if !amount.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }
        if amount < 0.0 {
            return Err(DomainError::validation("price must not be negative"));
        }
        Ok(Self(amount))
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    /// `price × qty`, unrounded.
    pub fn times(self, qty: u32) -> f64 {
        self.0 * f64::from(qty)
    }
}

impl ValueObject for Price {}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = f64::deserialize(deserializer)?;
        Price::new(amount).map_err(serde::de::Error::custom)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&format_amount(self.0))
    }
}

/// Render an amount at currency precision (two decimals).
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}
