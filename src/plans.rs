//! Payment plans
//!
//! The fixed catalog of installment plans offered at the counter. A single
//! shared table serves both quoting and sale tracking, so the plan terms
//! exist in exactly one place.

use std::sync::LazyLock;

use decimal_percentage::Percentage;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Errors for plan lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The referenced plan name is not in the catalog.
    #[error("unknown payment plan: {0}")]
    NotFound(String),
}

/// An installment payment plan.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Number of installments.
    pub months: u32,

    /// Interest charged over the cash price for the whole plan.
    pub interest: Percentage,

    /// Display name, unique within the catalog.
    pub name: &'static str,
}

static CATALOG: LazyLock<[Plan; 4]> = LazyLock::new(|| {
    [
        Plan {
            months: 3,
            interest: Percentage::from(dec!(0.50)),
            name: "Plan 3 Cuotas",
        },
        Plan {
            months: 6,
            interest: Percentage::from(dec!(1.00)),
            name: "Plan 6 Cuotas",
        },
        Plan {
            months: 9,
            interest: Percentage::from(dec!(1.50)),
            name: "Plan 9 Cuotas",
        },
        Plan {
            months: 12,
            interest: Percentage::from(dec!(2.00)),
            name: "Plan Exclusivo",
        },
    ]
});

/// The full fixed plan catalog, in display order.
#[must_use]
pub fn catalog() -> &'static [Plan; 4] {
    &CATALOG
}

/// Looks up a plan by its display name.
#[must_use]
pub fn find(name: &str) -> Option<&'static Plan> {
    CATALOG.iter().find(|plan| plan.name == name)
}

/// Looks up a plan by name, failing on unknown names.
///
/// # Errors
///
/// Returns [`PlanError::NotFound`] if the name is not in the catalog.
pub fn require(name: &str) -> Result<&'static Plan, PlanError> {
    find(name).ok_or_else(|| PlanError::NotFound(name.to_string()))
}

/// Payment cadence, derived from the plan name.
///
/// The shipped catalog is monthly only; the biweekly and weekly cadences are
/// reserved for plan names containing "quincenal" or "semanal".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// One installment per calendar month.
    Monthly,
    /// One installment every fifteen days.
    Biweekly,
    /// One installment every seven days.
    Weekly,
}

impl Cadence {
    /// The cadence a plan's installments fall due at.
    #[must_use]
    pub fn of(plan: &Plan) -> Self {
        if plan.name.contains("quincenal") {
            Cadence::Biweekly
        } else if plan.name.contains("semanal") {
            Cadence::Weekly
        } else {
            Cadence::Monthly
        }
    }
}
