//! Sale management
//!
//! The only operations allowed to mutate a product's sale state: choosing a
//! plan, recording installment payments strictly in order, forcing a cash
//! sale, and the automatic transition to sold when the plan completes.

use chrono::NaiveDate;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    plans::{self, Plan, PlanError},
    products::{PaymentRecord, ProductRecord, SaleStatus},
    rates::SpotRate,
    schedule,
};

/// Errors rejected by sale-management operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaleError {
    /// The referenced plan name is not in the catalog.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The product has no active payment plan.
    #[error("product has no active payment plan")]
    NoActivePlan,

    /// An installment was marked paid while an earlier one remains unpaid.
    #[error("installment {attempted} cannot be paid before installment {expected}")]
    OutOfOrderPayment {
        /// Installment the operator tried to mark paid.
        attempted: u32,
        /// Installment that is actually next in line.
        expected: u32,
    },

    /// The installment already has a recorded payment.
    #[error("installment {0} is already paid")]
    DuplicatePayment(u32),

    /// The installment number exceeds the plan length.
    #[error("installment {attempted} is outside the plan's {months} installments")]
    InstallmentOutOfRange {
        /// Installment the operator referenced.
        attempted: u32,
        /// Installments in the chosen plan.
        months: u32,
    },

    /// Installment numbers start at 1.
    #[error("installment numbers start at 1")]
    ZeroInstallment,

    /// No payment is recorded for that installment.
    #[error("installment {0} has no recorded payment")]
    PaymentNotFound(u32),

    /// Payments may only be removed from the top of the paid prefix.
    #[error("installment {attempted} cannot be removed while installment {highest} is paid")]
    NotLatestPayment {
        /// Installment the operator tried to remove.
        attempted: u32,
        /// Highest installment currently paid.
        highest: u32,
    },

    /// The product was already sold.
    #[error("product is already sold")]
    AlreadySold,

    /// Sales are one-directional; nothing returns to the showroom.
    #[error("returning a product to available is not supported")]
    ReopenUnsupported,
}

/// Operator input from the sale-management flow.
#[derive(Debug, Clone)]
pub struct SaleRequest {
    /// Chosen plan name; `None` or empty means an outright cash sale.
    pub plan: Option<String>,

    /// Reference date the installments count from.
    pub start_date: NaiveDate,

    /// Payments recorded so far, in any order; validated before applying.
    pub payments: SmallVec<[PaymentRecord; 12]>,

    /// Live spot rate, frozen onto the sale the first time a plan is chosen.
    pub spot_rate: Option<SpotRate>,
}

/// Applies a sale-management update to a product.
///
/// Choosing a plan moves an available product into the plan workflow; an
/// empty plan name is an outright cash sale. The payment list replaces the
/// stored one after validation, the sale rate is frozen on first use, and
/// completing the plan transitions the product to sold.
///
/// # Errors
///
/// - [`SaleError::AlreadySold`]: sold products cannot be re-managed.
/// - [`SaleError::Plan`]: the plan name is not in the catalog.
/// - [`SaleError::OutOfOrderPayment`] / [`SaleError::DuplicatePayment`] /
///   [`SaleError::InstallmentOutOfRange`] / [`SaleError::ZeroInstallment`]:
///   the payment list violates the in-order invariant.
pub fn apply_sale(
    record: &mut ProductRecord,
    request: &SaleRequest,
) -> Result<SaleStatus, SaleError> {
    if record.sale.status() == SaleStatus::Sold {
        return Err(SaleError::AlreadySold);
    }

    let Some(plan_name) = request.plan.as_deref().filter(|name| !name.is_empty()) else {
        return force_cash_sale(record);
    };

    let plan = plans::require(plan_name)?;
    let payments = normalized_payments(&request.payments, plan)?;

    record.sale.chosen_plan = Some(plan_name.to_string());
    record.sale.payment_start = Some(request.start_date);
    record.sale.payments = payments;

    // Freeze the rate the first time the sale is priced; later edits keep it.
    if record.sale.rate_at_sale.is_none()
        && let Some(spot) = request.spot_rate
    {
        record.sale.rate_at_sale = Some(spot.get());
    }

    finish_if_complete(record, plan);

    debug!(product = %record.id, status = %record.sale.status(), "sale updated");

    Ok(record.sale.status())
}

/// Marks the product sold outright, bypassing any plan.
///
/// # Errors
///
/// Returns [`SaleError::AlreadySold`] if the product is already sold.
pub fn force_cash_sale(record: &mut ProductRecord) -> Result<SaleStatus, SaleError> {
    if record.sale.status() == SaleStatus::Sold {
        return Err(SaleError::AlreadySold);
    }

    record.sale.for_sale = false;

    debug!(product = %record.id, "cash sale recorded");

    Ok(SaleStatus::Sold)
}

/// Records a payment for the next payable installment.
///
/// Strictly in order: the installment must be exactly one past the highest
/// recorded payment. Completing the plan transitions the product to sold.
///
/// # Errors
///
/// - [`SaleError::AlreadySold`]: the product is already sold.
/// - [`SaleError::NoActivePlan`] / [`SaleError::Plan`]: no usable plan.
/// - [`SaleError::OutOfOrderPayment`]: an earlier installment is unpaid.
/// - [`SaleError::DuplicatePayment`]: the installment is already paid.
/// - [`SaleError::InstallmentOutOfRange`] / [`SaleError::ZeroInstallment`]:
///   the installment number is not valid for the plan.
pub fn record_payment(
    record: &mut ProductRecord,
    installment_number: u32,
    payment_date: NaiveDate,
) -> Result<SaleStatus, SaleError> {
    if record.sale.status() == SaleStatus::Sold {
        return Err(SaleError::AlreadySold);
    }

    let plan_name = record.sale.plan_name().ok_or(SaleError::NoActivePlan)?;
    let plan = plans::require(plan_name)?;

    if installment_number == 0 {
        return Err(SaleError::ZeroInstallment);
    }

    if installment_number > plan.months {
        return Err(SaleError::InstallmentOutOfRange {
            attempted: installment_number,
            months: plan.months,
        });
    }

    let expected = schedule::next_payable(&record.sale.payments);

    if installment_number < expected {
        return Err(SaleError::DuplicatePayment(installment_number));
    }

    if installment_number > expected {
        return Err(SaleError::OutOfOrderPayment {
            attempted: installment_number,
            expected,
        });
    }

    record.sale.payments.push(PaymentRecord {
        installment_number,
        payment_date,
    });

    finish_if_complete(record, plan);

    debug!(product = %record.id, installment = installment_number, "payment recorded");

    Ok(record.sale.status())
}

/// Removes a recorded payment.
///
/// Paid installments are immutable except by removing the record, and only
/// the highest-numbered payment may be removed so the paid prefix stays
/// contiguous.
///
/// # Errors
///
/// - [`SaleError::AlreadySold`]: a completed sale cannot be unwound.
/// - [`SaleError::PaymentNotFound`]: nothing is recorded for the number.
/// - [`SaleError::NotLatestPayment`]: a lower installment was referenced.
pub fn revoke_payment(
    record: &mut ProductRecord,
    installment_number: u32,
) -> Result<(), SaleError> {
    if record.sale.status() == SaleStatus::Sold {
        return Err(SaleError::AlreadySold);
    }

    let highest = record
        .sale
        .payments
        .iter()
        .map(|payment| payment.installment_number)
        .max()
        .ok_or(SaleError::PaymentNotFound(installment_number))?;

    if installment_number != highest {
        let known = record
            .sale
            .payments
            .iter()
            .any(|payment| payment.installment_number == installment_number);

        return Err(if known {
            SaleError::NotLatestPayment {
                attempted: installment_number,
                highest,
            }
        } else {
            SaleError::PaymentNotFound(installment_number)
        });
    }

    record
        .sale
        .payments
        .retain(|payment| payment.installment_number != installment_number);

    debug!(product = %record.id, installment = installment_number, "payment removed");

    Ok(())
}

/// Returning a product to the showroom is not part of the workflow.
///
/// The sale lifecycle is one-directional: once a plan starts or a product is
/// sold there is no path back to available. The operation exists so callers
/// get an explicit rejection instead of silently cleared sale fields.
///
/// # Errors
///
/// Always returns [`SaleError::ReopenUnsupported`].
pub fn reopen(_record: &mut ProductRecord) -> Result<SaleStatus, SaleError> {
    Err(SaleError::ReopenUnsupported)
}

/// Validates a replacement payment list: installment numbers unique,
/// contiguous from 1, within the plan length. Returns it sorted.
fn normalized_payments(
    payments: &[PaymentRecord],
    plan: &Plan,
) -> Result<SmallVec<[PaymentRecord; 12]>, SaleError> {
    let mut sorted: SmallVec<[PaymentRecord; 12]> = SmallVec::from_slice(payments);
    sorted.sort_unstable_by_key(|payment| payment.installment_number);

    let mut expected = 1;

    for payment in &sorted {
        let number = payment.installment_number;

        if number == 0 {
            return Err(SaleError::ZeroInstallment);
        }

        if number > plan.months {
            return Err(SaleError::InstallmentOutOfRange {
                attempted: number,
                months: plan.months,
            });
        }

        if number < expected {
            return Err(SaleError::DuplicatePayment(number));
        }

        if number > expected {
            return Err(SaleError::OutOfOrderPayment {
                attempted: number,
                expected,
            });
        }

        expected = expected.saturating_add(1);
    }

    Ok(sorted)
}

/// The plan completes when every installment is paid; the product then
/// leaves the showroom automatically.
fn finish_if_complete(record: &mut ProductRecord, plan: &Plan) {
    let paid = u32::try_from(record.sale.payments.len()).unwrap_or(u32::MAX);

    if paid >= plan.months && record.sale.for_sale {
        record.sale.for_sale = false;

        debug!(product = %record.id, plan = plan.name, "plan completed, product sold");
    }
}
