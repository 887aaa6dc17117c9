//! Showcase
//!
//! Loads a catalog fixture and prints the catalog table, the financing table
//! for an available product, and the installment schedule of a product being
//! paid off.
//!
//! Use `-f` to point at a different fixture file
//! Use `-r` to set the USD→ARS spot rate
//! Use `-s` to filter by product name

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use tabled::{builder::Builder, settings::Style};

use vidriera::{fixtures, prelude::*, schedule};

/// Arguments for the showcase
#[derive(Debug, Parser)]
struct ShowcaseArgs {
    /// Catalog fixture to load
    #[clap(short, long, default_value = "fixtures/products.yml")]
    fixture: String,

    /// USD→ARS spot rate to price with
    #[clap(short, long, default_value = "1050")]
    rate: Decimal,

    /// Product-name search term
    #[clap(short, long)]
    search: Option<String>,

    /// Page of the catalog table to print
    #[clap(short, long, default_value_t = 1)]
    page: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = ShowcaseArgs::parse();
    let spot = SpotRate::new(args.rate)?;

    let catalog = fixtures::load_catalog(&args.fixture)?;

    let query = CatalogQuery {
        search: args.search,
        page: args.page,
        spot_rate: Some(spot),
        ..CatalogQuery::default()
    };

    let page = catalog.browse(&query);

    print_catalog(&page, &catalog, spot);

    if let Some(product) = page
        .products
        .iter()
        .find(|product| product.sale.status() == SaleStatus::Available)
    {
        print_financing(product, spot)?;
    }

    if let Some(product) = catalog
        .iter()
        .find(|product| product.sale.status() == SaleStatus::InPlan)
    {
        print_schedule(product, spot)?;
    }

    Ok(())
}

#[expect(clippy::print_stdout, reason = "Showcase binary output")]
fn print_catalog(page: &CatalogPage<'_>, catalog: &Catalog, spot: SpotRate) {
    let mut builder = Builder::default();

    builder.push_record(["Producto", "Categoría", "Estado", "Precio (ARS)"]);

    for product in &page.products {
        let price = product
            .display_price_ars(Some(spot))
            .map_or_else(String::new, |price| format!("$ {price}"));

        builder.push_record([
            product.name.clone(),
            product.category.clone(),
            product.sale.status().to_string(),
            price,
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());

    let counts = catalog.status_counts();

    println!("{table}");
    println!(
        "Página {} de {}: {} disponibles, {} en plan, {} vendidos\n",
        page.page,
        page.total_pages.max(1),
        counts.available,
        counts.in_plan,
        counts.sold,
    );
}

#[expect(clippy::print_stdout, reason = "Showcase binary output")]
fn print_financing(product: &ProductRecord, spot: SpotRate) -> Result<()> {
    let quotes = quote_all(product.cash_price_usd, spot)?;

    let mut builder = Builder::default();

    builder.push_record(["Plan", "Cuotas", "Valor Cuota (USD/ARS)", "Precio Final (USD/ARS)"]);

    for quote in &quotes {
        builder.push_record([
            quote.plan_name.to_string(),
            quote.months.to_string(),
            format!("{} / {}", quote.installment_usd, quote.installment_ars),
            format!("{} / {}", quote.final_price_usd, quote.final_price_ars),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());

    println!("Planes de financiación: {}", product.name);
    println!("{table}\n");

    Ok(())
}

#[expect(clippy::print_stdout, reason = "Showcase binary output")]
fn print_schedule(product: &ProductRecord, spot: SpotRate) -> Result<()> {
    let entries = schedule::schedule_for(product)?;
    let progress = schedule::progress(product, Some(spot))?;

    let mut builder = Builder::default();

    builder.push_record(["Cuota", "Vence", "Pagada"]);

    for entry in &entries {
        let paid = entry
            .paid_on
            .map_or_else(|| "-".to_string(), |date| date.to_string());

        builder.push_record([
            entry.installment_number.to_string(),
            entry.due_date.to_string(),
            paid,
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());

    println!("Seguimiento de cuotas: {}", product.name);
    println!("{table}");
    println!(
        "Pagadas {} de {}, abonado {}, restante {}\n",
        progress.paid_count, progress.plan_months, progress.total_paid_ars,
        progress.total_remaining_ars,
    );

    Ok(())
}
