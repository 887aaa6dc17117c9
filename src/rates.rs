//! Exchange rates
//!
//! USD→ARS rate handling: a validated spot-rate value, the frozen-at-sale
//! resolution used when pricing a sale, and the cache value object owned by
//! the rate-fetch collaborator.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use rusty_money::{
    ExchangeRate, Money,
    iso::{self, Currency},
};
use thiserror::Error;

use crate::prices::truncate_to_cents;

/// Errors related to exchange-rate handling.
///
/// Every numeric failure involving the rate collapses into this one case:
/// a stale or failed fetch, a non-positive value, and conversion errors all
/// surface as "rate unavailable" rather than a crash.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateError {
    /// No usable USD→ARS rate.
    #[error("exchange rate unavailable")]
    Unavailable,
}

/// A validated, strictly positive USD→ARS spot rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpotRate(Decimal);

impl SpotRate {
    /// Wraps a raw rate, rejecting zero and negative values.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Unavailable`] if the rate is not positive.
    pub fn new(rate: Decimal) -> Result<Self, RateError> {
        if rate > Decimal::ZERO {
            Ok(Self(rate))
        } else {
            Err(RateError::Unavailable)
        }
    }

    /// Wraps a rate received as a float from the rate-fetch collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Unavailable`] if the value is not finite or not
    /// positive.
    pub fn from_f64(rate: f64) -> Result<Self, RateError> {
        let decimal = Decimal::from_f64_retain(rate).ok_or(RateError::Unavailable)?;

        Self::new(decimal)
    }

    /// The rate as a decimal.
    #[must_use]
    pub fn get(self) -> Decimal {
        self.0
    }
}

/// Resolves the rate a sale is priced with: the rate frozen when the sale
/// began, falling back to the current spot rate.
///
/// # Errors
///
/// Returns [`RateError::Unavailable`] when neither rate exists.
pub fn resolve(frozen: Option<SpotRate>, spot: Option<SpotRate>) -> Result<SpotRate, RateError> {
    frozen.or(spot).ok_or(RateError::Unavailable)
}

/// Converts a USD amount to ARS at the given rate, truncated to cents.
///
/// # Errors
///
/// Returns [`RateError::Unavailable`] if the conversion cannot be performed.
pub fn to_ars(
    usd: Money<'static, Currency>,
    rate: SpotRate,
) -> Result<Money<'static, Currency>, RateError> {
    let exchange = ExchangeRate::new(iso::USD, iso::ARS, rate.get())
        .map_err(|_err| RateError::Unavailable)?;

    let converted = exchange
        .convert(&usd)
        .map_err(|_err| RateError::Unavailable)?;

    Ok(Money::from_decimal(
        truncate_to_cents(*converted.amount()),
        iso::ARS,
    ))
}

/// A fetched spot rate together with its retrieval time and time-to-live.
///
/// The rate-fetch collaborator owns one of these instead of a global mutable
/// rate variable, and asks it for freshness explicitly before reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCache {
    rate: SpotRate,
    fetched_at: DateTime<Utc>,
    ttl: TimeDelta,
}

impl RateCache {
    /// Creates a cache entry for a rate fetched at the given instant.
    #[must_use]
    pub fn new(rate: SpotRate, fetched_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            rate,
            fetched_at,
            ttl,
        }
    }

    /// The cached rate, regardless of freshness.
    #[must_use]
    pub fn rate(&self) -> SpotRate {
        self.rate
    }

    /// Whether the entry has outlived its time-to-live at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) >= self.ttl
    }

    /// The cached rate if still fresh at `now`, otherwise `None`.
    #[must_use]
    pub fn fresh(&self, now: DateTime<Utc>) -> Option<SpotRate> {
        if self.is_expired(now) {
            None
        } else {
            Some(self.rate)
        }
    }
}
