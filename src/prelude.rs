//! Vidriera prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{
        Catalog, CatalogPage, CatalogQuery, SortColumn, SortDirection, SortOrder, StatusCounts,
        StatusFilter,
    },
    fixtures::FixtureError,
    plans::{Cadence, Plan, PlanError},
    prices::{PriceField, ReconciledPrices, reconcile, truncate_to_cents},
    products::{PaymentRecord, ProductRecord, SaleState, SaleStatus},
    quotes::{Quote, QuoteError, quote, quote_all},
    rates::{RateCache, RateError, SpotRate},
    sales::{
        SaleError, SaleRequest, apply_sale, force_cash_sale, record_payment, reopen,
        revoke_payment,
    },
    schedule::{
        PaymentProgress, ScheduleEntry, ScheduleError, compute_schedule, next_payable, progress,
        schedule_for,
    },
};
