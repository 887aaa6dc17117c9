//! Product records
//!
//! The catalog's product entity as stored by the persistence collaborator.
//! Wire names are the legacy Spanish headers; this crate reads and updates
//! these records but does not own their storage.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{prices::truncate_to_cents, rates::SpotRate};

/// A single recorded installment payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-based installment number within the chosen plan.
    pub installment_number: u32,

    /// Date the payment was actually received.
    pub payment_date: NaiveDate,
}

/// Where a product stands in the sale workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaleStatus {
    /// In the showroom, open for negotiation.
    Available,
    /// Being paid off under an installment plan.
    InPlan,
    /// Sold, either outright or by completing a plan.
    Sold,
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SaleStatus::Available => "Disponible",
            SaleStatus::InPlan => "En Plan de Pago",
            SaleStatus::Sold => "Vendido",
        };

        f.write_str(label)
    }
}

/// Sale-tracking fields carried on every product.
///
/// Created with defaults when the product is created and mutated only
/// through the operations in [`crate::sales`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleState {
    /// Still open for negotiation; cleared when the product is sold.
    #[serde(rename = "en_venta", default = "default_for_sale")]
    pub for_sale: bool,

    /// Chosen plan name; empty or absent means a cash sale.
    #[serde(rename = "plan_pago_elegido", default)]
    pub chosen_plan: Option<String>,

    /// Reference date the installments count from.
    #[serde(rename = "fecha_inicio_pago", default)]
    pub payment_start: Option<NaiveDate>,

    /// Recorded payments, ordered by installment number.
    #[serde(rename = "pagos_realizados", default)]
    pub payments: SmallVec<[PaymentRecord; 12]>,

    /// USD→ARS rate frozen when the sale began; never overwritten once set.
    #[serde(rename = "exchange_rate_at_sale", default)]
    pub rate_at_sale: Option<Decimal>,
}

fn default_for_sale() -> bool {
    true
}

impl Default for SaleState {
    fn default() -> Self {
        Self {
            for_sale: true,
            chosen_plan: None,
            payment_start: None,
            payments: SmallVec::new(),
            rate_at_sale: None,
        }
    }
}

impl SaleState {
    /// The chosen plan name, treating the legacy empty string as "no plan".
    #[must_use]
    pub fn plan_name(&self) -> Option<&str> {
        self.chosen_plan.as_deref().filter(|name| !name.is_empty())
    }

    /// The frozen sale rate, if one was recorded and is usable.
    #[must_use]
    pub fn frozen_rate(&self) -> Option<SpotRate> {
        self.rate_at_sale.and_then(|rate| SpotRate::new(rate).ok())
    }

    /// Current position in the sale workflow.
    #[must_use]
    pub fn status(&self) -> SaleStatus {
        if !self.for_sale {
            SaleStatus::Sold
        } else if self.plan_name().is_some() {
            SaleStatus::InPlan
        } else {
            SaleStatus::Available
        }
    }
}

/// A catalog product as stored by the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// External identifier, `prod-<creation millis>` in the legacy data.
    pub id: String,

    /// Product name.
    #[serde(rename = "Producto")]
    pub name: String,

    /// Category the product is filed under.
    #[serde(rename = "CATEGORIA")]
    pub category: String,

    /// Authoritative USD cash price, at full precision.
    #[serde(rename = "Precio al CONTADO")]
    pub cash_price_usd: Decimal,

    /// Per-installment base price ("PY"), half the cash price.
    #[serde(rename = "Precio PY")]
    pub py_base_usd: Decimal,

    /// Image references, first one shown in the table.
    #[serde(rename = "Imagenes", default)]
    pub images: Vec<String>,

    /// USD→ARS rate captured when the product was created; catalog display
    /// prices prefer it over the live spot rate.
    #[serde(default)]
    pub exchange_rate_at_creation: Option<Decimal>,

    /// Sale-tracking fields, stored inline on the record.
    #[serde(flatten)]
    pub sale: SaleState,
}

impl ProductRecord {
    /// Truncated ARS display price: the cash price at the creation-time
    /// rate, falling back to the current spot rate.
    #[must_use]
    pub fn display_price_ars(&self, spot: Option<SpotRate>) -> Option<Decimal> {
        let rate = self.creation_rate().or(spot)?;

        self.cash_price_usd
            .checked_mul(rate.get())
            .map(truncate_to_cents)
    }

    /// Millisecond timestamp embedded in legacy `prod-<millis>` ids; newer
    /// products sort first in the default catalog order.
    #[must_use]
    pub fn created_millis(&self) -> Option<i64> {
        self.id.strip_prefix("prod-").and_then(|raw| raw.parse().ok())
    }

    fn creation_rate(&self) -> Option<SpotRate> {
        self.exchange_rate_at_creation
            .and_then(|rate| SpotRate::new(rate).ok())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    fn record(json: &str) -> Result<ProductRecord, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn deserializes_the_legacy_wire_shape() -> TestResult {
        let product = record(
            r#"{
                "id": "prod-1704067200000",
                "Producto": "Notebook Lenovo",
                "CATEGORIA": "Informática",
                "Precio al CONTADO": 520.5,
                "Precio PY": 260.25,
                "Imagenes": ["data:image/png;base64,xyz"],
                "en_venta": true,
                "plan_pago_elegido": "Plan 3 Cuotas",
                "fecha_inicio_pago": "2024-01-15",
                "pagos_realizados": [
                    { "installment_number": 1, "payment_date": "2024-02-10" }
                ],
                "exchange_rate_at_sale": 1000.0
            }"#,
        )?;

        assert_eq!(product.name, "Notebook Lenovo");
        assert_eq!(product.cash_price_usd, dec!(520.5));
        assert_eq!(product.sale.plan_name(), Some("Plan 3 Cuotas"));
        assert_eq!(product.sale.payments.len(), 1);
        assert_eq!(
            product.sale.payment_start,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(product.sale.frozen_rate().map(SpotRate::get), Some(dec!(1000)));

        Ok(())
    }

    #[test]
    fn missing_sale_fields_default_to_a_fresh_listing() -> TestResult {
        let product = record(
            r#"{
                "id": "prod-1704067200001",
                "Producto": "Silla gamer",
                "CATEGORIA": "Muebles",
                "Precio al CONTADO": 200.0,
                "Precio PY": 100.0
            }"#,
        )?;

        assert!(product.sale.for_sale);
        assert!(product.sale.payments.is_empty());
        assert_eq!(product.sale.status(), SaleStatus::Available);
        assert!(product.images.is_empty());

        Ok(())
    }

    #[test]
    fn empty_plan_name_means_a_cash_sale() {
        let mut sale = SaleState::default();

        sale.chosen_plan = Some(String::new());

        assert_eq!(sale.plan_name(), None);
        assert_eq!(sale.status(), SaleStatus::Available);
    }

    #[test]
    fn status_follows_the_sale_fields() {
        let mut sale = SaleState::default();

        assert_eq!(sale.status(), SaleStatus::Available);

        sale.chosen_plan = Some("Plan 6 Cuotas".to_string());

        assert_eq!(sale.status(), SaleStatus::InPlan);

        sale.for_sale = false;

        assert_eq!(sale.status(), SaleStatus::Sold);
    }

    #[test]
    fn status_labels_match_the_table_badges() {
        assert_eq!(SaleStatus::Available.to_string(), "Disponible");
        assert_eq!(SaleStatus::InPlan.to_string(), "En Plan de Pago");
        assert_eq!(SaleStatus::Sold.to_string(), "Vendido");
    }

    #[test]
    fn display_price_prefers_the_creation_rate() -> TestResult {
        let mut product = record(
            r#"{
                "id": "prod-3",
                "Producto": "Parlante",
                "CATEGORIA": "Audio",
                "Precio al CONTADO": 100.0,
                "Precio PY": 50.0,
                "exchange_rate_at_creation": 900.0
            }"#,
        )?;

        let spot = SpotRate::new(dec!(1100))?;

        assert_eq!(product.display_price_ars(Some(spot)), Some(dec!(90000.00)));

        product.exchange_rate_at_creation = None;

        assert_eq!(product.display_price_ars(Some(spot)), Some(dec!(110000.00)));
        assert_eq!(product.display_price_ars(None), None);

        Ok(())
    }

    #[test]
    fn created_millis_parses_legacy_ids_only() -> TestResult {
        let product = record(
            r#"{
                "id": "prod-1704067200000",
                "Producto": "Mate",
                "CATEGORIA": "Cocina",
                "Precio al CONTADO": 10.0,
                "Precio PY": 5.0
            }"#,
        )?;

        assert_eq!(product.created_millis(), Some(1_704_067_200_000));

        let mut renamed = product;
        renamed.id = "sku-99".to_string();

        assert_eq!(renamed.created_millis(), None);

        Ok(())
    }

    #[test]
    fn sale_state_round_trips_through_the_wire_shape() -> TestResult {
        let sale = SaleState {
            for_sale: true,
            chosen_plan: Some("Plan 9 Cuotas".to_string()),
            payment_start: NaiveDate::from_ymd_opt(2024, 3, 1),
            payments: SmallVec::from_slice(&[PaymentRecord {
                installment_number: 1,
                payment_date: NaiveDate::from_ymd_opt(2024, 4, 1).ok_or("date")?,
            }]),
            rate_at_sale: Some(dec!(950)),
        };

        let encoded = serde_json::to_string(&sale)?;

        assert!(encoded.contains("\"plan_pago_elegido\""));
        assert!(encoded.contains("\"pagos_realizados\""));

        let decoded: SaleState = serde_json::from_str(&encoded)?;

        assert_eq!(decoded.plan_name(), Some("Plan 9 Cuotas"));
        assert_eq!(decoded.payments.len(), 1);

        Ok(())
    }
}
