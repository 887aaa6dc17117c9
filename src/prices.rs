//! Price reconciliation
//!
//! A product is priced through three coupled fields: the USD cash price, its
//! ARS equivalent, and the "PY" per-installment base (half the cash price).
//! Editing any one of them recomputes the other two.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::rates::SpotRate;

/// Truncates an amount to two fractional digits without rounding up.
///
/// `19.999` becomes `19.99`, never `20.00`. Display values derived from
/// full-precision arithmetic must not gain a cent.
#[must_use]
pub fn truncate_to_cents(value: Decimal) -> Decimal {
    value.trunc_with_scale(2)
}

/// The price field the operator edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    /// USD cash price.
    Cash,
    /// ARS price.
    Ars,
    /// Per-installment base price ("PY").
    PyBase,
}

/// Result of reconciling the three price fields after one of them changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconciledPrices {
    /// The authoritative USD cash price to persist, at full precision.
    ///
    /// When the edited field was ARS or the PY base, the derived cash price
    /// keeps every digit. Persisting the truncated display value instead
    /// compounds rounding loss on every round trip through the form.
    pub cash_usd: Option<Decimal>,

    /// Truncated value for the USD cash field.
    pub cash_display: Option<Decimal>,

    /// Truncated value for the ARS field.
    pub ars_display: Option<Decimal>,

    /// Truncated value for the PY base field.
    pub py_base_display: Option<Decimal>,
}

/// Recomputes the dependent price fields from the edited one.
///
/// `value` is the parsed content of the edited field; `None` (unparseable
/// input) or a non-positive amount clears the dependent fields rather than
/// erroring. Fields that need the exchange rate are cleared when `rate` is
/// `None`.
#[must_use]
pub fn reconcile(
    source: PriceField,
    value: Option<Decimal>,
    rate: Option<SpotRate>,
) -> ReconciledPrices {
    let Some(value) = value.filter(|value| *value > Decimal::ZERO) else {
        return ReconciledPrices::default();
    };

    match source {
        PriceField::Cash => from_cash(value, rate),
        PriceField::Ars => from_ars(value, rate),
        PriceField::PyBase => from_py_base(value, rate),
    }
}

/// The typed cash price is itself the authoritative value.
fn from_cash(cash: Decimal, rate: Option<SpotRate>) -> ReconciledPrices {
    ReconciledPrices {
        cash_usd: Some(cash),
        cash_display: Some(truncate_to_cents(cash)),
        ars_display: ars_for(cash, rate),
        py_base_display: cash.checked_div(dec!(2)).map(truncate_to_cents),
    }
}

/// Derive the cash price from the ARS field at full precision.
fn from_ars(ars: Decimal, rate: Option<SpotRate>) -> ReconciledPrices {
    let cash = rate.and_then(|rate| ars.checked_div(rate.get()));

    let Some(cash) = cash else {
        return ReconciledPrices {
            ars_display: Some(truncate_to_cents(ars)),
            ..ReconciledPrices::default()
        };
    };

    ReconciledPrices {
        cash_usd: Some(cash),
        cash_display: Some(truncate_to_cents(cash)),
        ars_display: Some(truncate_to_cents(ars)),
        py_base_display: cash.checked_div(dec!(2)).map(truncate_to_cents),
    }
}

/// The PY base is half the cash price, so the cash price is twice the base.
fn from_py_base(py_base: Decimal, rate: Option<SpotRate>) -> ReconciledPrices {
    let Some(cash) = py_base.checked_mul(dec!(2)) else {
        return ReconciledPrices::default();
    };

    ReconciledPrices {
        cash_usd: Some(cash),
        cash_display: Some(truncate_to_cents(cash)),
        ars_display: ars_for(cash, rate),
        py_base_display: Some(truncate_to_cents(py_base)),
    }
}

fn ars_for(cash: Decimal, rate: Option<SpotRate>) -> Option<Decimal> {
    let rate = rate?;

    cash.checked_mul(rate.get()).map(truncate_to_cents)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::rates::RateError;

    use super::*;

    fn rate(value: Decimal) -> Result<SpotRate, RateError> {
        SpotRate::new(value)
    }

    #[test]
    fn truncate_never_rounds_up() {
        assert_eq!(truncate_to_cents(dec!(19.999)), dec!(19.99));
        assert_eq!(truncate_to_cents(dec!(2.005)), dec!(2.00));
        assert_eq!(truncate_to_cents(dec!(1.999)), dec!(1.99));
        assert_eq!(truncate_to_cents(dec!(50)), dec!(50));
    }

    #[test]
    fn cash_edit_derives_ars_and_py_base() -> TestResult {
        let result = reconcile(PriceField::Cash, Some(dec!(100)), Some(rate(dec!(1050.55))?));

        assert_eq!(result.cash_usd, Some(dec!(100)));
        assert_eq!(result.cash_display, Some(dec!(100)));
        assert_eq!(result.ars_display, Some(dec!(105055.00)));
        assert_eq!(result.py_base_display, Some(dec!(50)));

        Ok(())
    }

    #[test]
    fn cash_edit_without_rate_clears_only_the_ars_field() {
        let result = reconcile(PriceField::Cash, Some(dec!(100)), None);

        assert_eq!(result.cash_usd, Some(dec!(100)));
        assert_eq!(result.ars_display, None);
        assert_eq!(result.py_base_display, Some(dec!(50)));
    }

    #[test]
    fn ars_edit_keeps_full_precision_cash() -> TestResult {
        let result = reconcile(
            PriceField::Ars,
            Some(dec!(100000)),
            Some(rate(dec!(1050.55))?),
        );

        let cash = result.cash_usd.ok_or("expected a derived cash price")?;

        // The authoritative value keeps every digit; only the display is cut.
        assert_eq!(result.cash_display, Some(truncate_to_cents(cash)));
        assert_ne!(cash, truncate_to_cents(cash));
        assert_eq!(
            result.py_base_display,
            Some(truncate_to_cents(cash / dec!(2)))
        );

        Ok(())
    }

    #[test]
    fn ars_edit_without_rate_clears_dependent_fields() {
        let result = reconcile(PriceField::Ars, Some(dec!(100000)), None);

        assert_eq!(result.cash_usd, None);
        assert_eq!(result.cash_display, None);
        assert_eq!(result.py_base_display, None);
        assert_eq!(result.ars_display, Some(dec!(100000)));
    }

    #[test]
    fn py_base_edit_doubles_into_the_cash_price() -> TestResult {
        let result = reconcile(
            PriceField::PyBase,
            Some(dec!(260.13)),
            Some(rate(dec!(1000))?),
        );

        assert_eq!(result.cash_usd, Some(dec!(520.26)));
        assert_eq!(result.ars_display, Some(dec!(520260.00)));
        assert_eq!(result.py_base_display, Some(dec!(260.13)));

        Ok(())
    }

    #[test]
    fn invalid_or_non_positive_input_clears_everything() -> TestResult {
        let spot = rate(dec!(1000))?;

        for source in [PriceField::Cash, PriceField::Ars, PriceField::PyBase] {
            assert_eq!(
                reconcile(source, None, Some(spot)),
                ReconciledPrices::default()
            );
            assert_eq!(
                reconcile(source, Some(dec!(-5)), Some(spot)),
                ReconciledPrices::default()
            );
            assert_eq!(
                reconcile(source, Some(Decimal::ZERO), Some(spot)),
                ReconciledPrices::default()
            );
        }

        Ok(())
    }

    #[test]
    fn round_trip_through_ars_stays_within_a_cent() -> TestResult {
        let spot = rate(dec!(987.65))?;
        let original = dec!(123.45);

        let first = reconcile(PriceField::Cash, Some(original), Some(spot));
        let ars = first.ars_display.ok_or("expected an ARS price")?;

        let second = reconcile(PriceField::Ars, Some(ars), Some(spot));
        let recovered = second.cash_usd.ok_or("expected a recovered cash price")?;

        assert!(
            (original - recovered).abs() < dec!(0.01),
            "expected {original} and {recovered} to agree within a cent"
        );

        Ok(())
    }
}
