//! Vidriera
//!
//! Vidriera is the pricing, installment-plan and sale-tracking core of a
//! small single-tenant product showroom: USD/ARS price reconciliation, a
//! fixed payment-plan catalog, installment quoting, and the in-order payment
//! workflow from first installment to sold.

pub mod catalog;
pub mod fixtures;
pub mod plans;
pub mod prelude;
pub mod prices;
pub mod products;
pub mod quotes;
pub mod rates;
pub mod sales;
pub mod schedule;
