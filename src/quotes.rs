//! Installment quotes
//!
//! Turns a cash price into the financed price for a payment plan: the total
//! with interest, the per-installment value, and their ARS equivalents.

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    plans::{self, Plan},
    rates::{self, RateError, SpotRate},
};

/// Errors that can occur while quoting a plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// The cash price was missing, non-positive, or out of range.
    #[error("cash price must be a positive amount")]
    InvalidPrice,

    /// The USD→ARS conversion failed.
    #[error(transparent)]
    Rate(#[from] RateError),
}

/// A financed-price quote for one plan.
#[derive(Debug, Clone)]
pub struct Quote {
    /// Name of the quoted plan.
    pub plan_name: &'static str,

    /// Number of installments.
    pub months: u32,

    /// Total price with the plan's interest applied, at full precision.
    pub final_price_usd: Money<'static, Currency>,

    /// Value of each installment, at full precision.
    pub installment_usd: Money<'static, Currency>,

    /// Total price in ARS, truncated to cents.
    pub final_price_ars: Money<'static, Currency>,

    /// Installment value in ARS, truncated to cents.
    pub installment_ars: Money<'static, Currency>,
}

/// Quotes one plan for a cash price.
///
/// # Errors
///
/// - [`QuoteError::InvalidPrice`]: the cash price is not a positive amount.
/// - [`QuoteError::Rate`]: the ARS conversion failed.
pub fn quote(cash_price_usd: Decimal, plan: &Plan, rate: SpotRate) -> Result<Quote, QuoteError> {
    if cash_price_usd <= Decimal::ZERO {
        return Err(QuoteError::InvalidPrice);
    }

    let interest = plan.interest * cash_price_usd;

    let final_usd = cash_price_usd
        .checked_add(interest)
        .ok_or(QuoteError::InvalidPrice)?;

    let installment_usd = final_usd
        .checked_div(Decimal::from(plan.months))
        .ok_or(QuoteError::InvalidPrice)?;

    let final_price_usd = Money::from_decimal(final_usd, iso::USD);
    let installment_usd = Money::from_decimal(installment_usd, iso::USD);

    Ok(Quote {
        plan_name: plan.name,
        months: plan.months,
        final_price_usd,
        installment_usd,
        final_price_ars: rates::to_ars(final_price_usd, rate)?,
        installment_ars: rates::to_ars(installment_usd, rate)?,
    })
}

/// Quotes every catalog plan at once, in display order, for the
/// customer-facing financing table.
///
/// # Errors
///
/// Same conditions as [`quote`].
pub fn quote_all(
    cash_price_usd: Decimal,
    rate: SpotRate,
) -> Result<SmallVec<[Quote; 4]>, QuoteError> {
    plans::catalog()
        .iter()
        .map(|plan| quote(cash_price_usd, plan, rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    fn plan(name: &str) -> Result<&'static Plan, String> {
        plans::find(name).ok_or_else(|| format!("missing plan {name}"))
    }

    #[test]
    fn three_installment_plan_adds_half_the_price() -> TestResult {
        let quote = quote(dec!(100), plan("Plan 3 Cuotas")?, SpotRate::new(dec!(1000))?)?;

        assert_eq!(
            quote.final_price_usd,
            Money::from_decimal(dec!(150), iso::USD)
        );
        assert_eq!(
            quote.installment_usd,
            Money::from_decimal(dec!(50), iso::USD)
        );
        assert_eq!(
            quote.final_price_ars,
            Money::from_decimal(dec!(150000), iso::ARS)
        );
        assert_eq!(
            quote.installment_ars,
            Money::from_decimal(dec!(50000), iso::ARS)
        );

        Ok(())
    }

    #[test]
    fn twelve_installment_plan_triples_the_price() -> TestResult {
        let quote = quote(dec!(100), plan("Plan Exclusivo")?, SpotRate::new(dec!(1000))?)?;

        assert_eq!(
            quote.final_price_usd,
            Money::from_decimal(dec!(300), iso::USD)
        );
        assert_eq!(
            quote.installment_usd,
            Money::from_decimal(dec!(25), iso::USD)
        );
        assert_eq!(
            quote.final_price_ars,
            Money::from_decimal(dec!(300000), iso::ARS)
        );
        assert_eq!(
            quote.installment_ars,
            Money::from_decimal(dec!(25000), iso::ARS)
        );

        Ok(())
    }

    #[test]
    fn uneven_installments_truncate_the_ars_value() -> TestResult {
        // 100 USD over 6 installments: 200 / 6 = 33.333... USD per month.
        let quote = quote(dec!(100), plan("Plan 6 Cuotas")?, SpotRate::new(dec!(1000))?)?;

        assert_eq!(
            quote.installment_ars,
            Money::from_decimal(dec!(33333.33), iso::ARS)
        );

        Ok(())
    }

    #[test]
    fn non_positive_prices_are_rejected() -> TestResult {
        let rate = SpotRate::new(dec!(1000))?;
        let plan = plan("Plan 3 Cuotas")?;

        assert_eq!(
            quote(Decimal::ZERO, plan, rate).map(|q| q.months),
            Err(QuoteError::InvalidPrice)
        );
        assert_eq!(
            quote(dec!(-10), plan, rate).map(|q| q.months),
            Err(QuoteError::InvalidPrice)
        );

        Ok(())
    }

    #[test]
    fn quote_all_covers_the_catalog_in_order() -> TestResult {
        let quotes = quote_all(dec!(100), SpotRate::new(dec!(1000))?)?;

        let names: Vec<&str> = quotes.iter().map(|quote| quote.plan_name).collect();

        assert_eq!(
            names,
            vec![
                "Plan 3 Cuotas",
                "Plan 6 Cuotas",
                "Plan 9 Cuotas",
                "Plan Exclusivo"
            ]
        );

        Ok(())
    }
}
