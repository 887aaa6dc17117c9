//! Installment schedules
//!
//! Due dates, the next payable installment, and paid/remaining progress for
//! a product sold under a payment plan.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    plans::{self, Cadence, Plan, PlanError},
    products::{PaymentRecord, ProductRecord},
    quotes::{self, QuoteError},
    rates::{self, RateError, SpotRate},
};

/// Errors from schedule and progress computations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The product has no active payment plan.
    #[error("product has no active payment plan")]
    NoActivePlan,

    /// The sale has no recorded payment start date.
    #[error("sale has no payment start date")]
    NoStartDate,

    /// Advancing the start date left the supported calendar range.
    #[error("due date out of calendar range")]
    DueDateOverflow,

    /// The referenced plan is not in the catalog.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Quoting the installment value failed.
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// No usable exchange rate for the ARS amounts.
    #[error(transparent)]
    Rate(#[from] RateError),
}

/// One row of an installment schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// 1-based installment number.
    pub installment_number: u32,

    /// Date the installment falls due.
    pub due_date: NaiveDate,

    /// Date the installment was paid, when a payment is recorded.
    pub paid_on: Option<NaiveDate>,
}

impl ScheduleEntry {
    /// Whether a payment has been recorded for this installment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.paid_on.is_some()
    }
}

/// The next installment that may be paid: one past the highest recorded
/// installment, or the first when nothing is recorded yet.
#[must_use]
pub fn next_payable(payments: &[PaymentRecord]) -> u32 {
    payments
        .iter()
        .map(|payment| payment.installment_number)
        .max()
        .map_or(1, |highest| highest.saturating_add(1))
}

/// Computes the full schedule for a plan: one entry per installment with its
/// due date and any recorded payment.
///
/// Due dates advance from the start date by the plan's cadence; monthly
/// advances clamp to the end of shorter months.
///
/// # Errors
///
/// Returns [`ScheduleError::DueDateOverflow`] if a due date leaves the
/// supported calendar range.
pub fn compute_schedule(
    plan: &Plan,
    start: NaiveDate,
    payments: &[PaymentRecord],
) -> Result<SmallVec<[ScheduleEntry; 12]>, ScheduleError> {
    let cadence = Cadence::of(plan);

    (1..=plan.months)
        .map(|installment_number| {
            let due_date = due_date(cadence, start, installment_number)
                .ok_or(ScheduleError::DueDateOverflow)?;

            let paid_on = payments
                .iter()
                .find(|payment| payment.installment_number == installment_number)
                .map(|payment| payment.payment_date);

            Ok(ScheduleEntry {
                installment_number,
                due_date,
                paid_on,
            })
        })
        .collect()
}

/// Schedule for a product's active sale.
///
/// # Errors
///
/// - [`ScheduleError::NoActivePlan`] / [`ScheduleError::NoStartDate`]: the
///   sale fields are incomplete.
/// - [`ScheduleError::Plan`]: the stored plan name is unknown.
/// - [`ScheduleError::DueDateOverflow`]: a due date left the calendar range.
pub fn schedule_for(
    record: &ProductRecord,
) -> Result<SmallVec<[ScheduleEntry; 12]>, ScheduleError> {
    let plan_name = record.sale.plan_name().ok_or(ScheduleError::NoActivePlan)?;
    let plan = plans::require(plan_name)?;
    let start = record.sale.payment_start.ok_or(ScheduleError::NoStartDate)?;

    compute_schedule(plan, start, &record.sale.payments)
}

/// Paid and remaining amounts for a sale in progress.
#[derive(Debug, Clone)]
pub struct PaymentProgress {
    /// Total installments in the chosen plan.
    pub plan_months: u32,

    /// Installments already paid.
    pub paid_count: u32,

    /// Installments still owed.
    pub remaining: u32,

    /// ARS value of one installment, truncated to cents.
    pub installment_ars: Money<'static, Currency>,

    /// ARS paid so far (paid count × installment value).
    pub total_paid_ars: Money<'static, Currency>,

    /// ARS still owed (remaining × installment value).
    pub total_remaining_ars: Money<'static, Currency>,
}

/// Computes payment progress for a product's active sale, priced at the rate
/// frozen when the sale began and falling back to the current spot rate.
///
/// # Errors
///
/// - [`ScheduleError::NoActivePlan`]: the product is not in a plan.
/// - [`ScheduleError::Plan`]: the stored plan name is unknown.
/// - [`ScheduleError::Rate`]: no usable rate exists.
/// - [`ScheduleError::Quote`]: the stored cash price cannot be quoted.
pub fn progress(
    record: &ProductRecord,
    spot: Option<SpotRate>,
) -> Result<PaymentProgress, ScheduleError> {
    let plan_name = record.sale.plan_name().ok_or(ScheduleError::NoActivePlan)?;
    let plan = plans::require(plan_name)?;
    let rate = rates::resolve(record.sale.frozen_rate(), spot)?;
    let quote = quotes::quote(record.cash_price_usd, plan, rate)?;

    let paid_count = u32::try_from(record.sale.payments.len()).unwrap_or(u32::MAX);
    let remaining = plan.months.saturating_sub(paid_count);

    let per_installment = *quote.installment_ars.amount();

    let total_paid = per_installment
        .checked_mul(Decimal::from(paid_count))
        .ok_or(RateError::Unavailable)?;

    let total_remaining = per_installment
        .checked_mul(Decimal::from(remaining))
        .ok_or(RateError::Unavailable)?;

    Ok(PaymentProgress {
        plan_months: plan.months,
        paid_count,
        remaining,
        installment_ars: quote.installment_ars,
        total_paid_ars: Money::from_decimal(total_paid, iso::ARS),
        total_remaining_ars: Money::from_decimal(total_remaining, iso::ARS),
    })
}

/// Due date for one installment under a cadence.
fn due_date(cadence: Cadence, start: NaiveDate, installment_number: u32) -> Option<NaiveDate> {
    match cadence {
        Cadence::Monthly => start.checked_add_months(Months::new(installment_number)),
        Cadence::Biweekly => {
            start.checked_add_days(Days::new(u64::from(installment_number) * 15))
        }
        Cadence::Weekly => start.checked_add_days(Days::new(u64::from(installment_number) * 7)),
    }
}
