//! Catalog browsing
//!
//! In-memory search, filtering, sorting and pagination over the product
//! list, plus the counts shown next to the category and status filters.

use std::cmp::{Ordering, Reverse};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::{
    products::{ProductRecord, SaleStatus},
    rates::SpotRate,
};

/// Rows per page when the query does not say otherwise.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Status filter options for the catalog table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// All products regardless of sale state.
    #[default]
    All,
    /// Only products open for negotiation without a plan.
    Available,
    /// Only products being paid off under a plan.
    InPlan,
    /// Only sold products.
    Sold,
}

impl StatusFilter {
    fn matches(self, status: SaleStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Available => status == SaleStatus::Available,
            StatusFilter::InPlan => status == SaleStatus::InPlan,
            StatusFilter::Sold => status == SaleStatus::Sold,
        }
    }
}

/// Sortable catalog columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Product name.
    Name,
    /// Category.
    Category,
    /// ARS display price.
    PriceArs,
}

/// Sort direction for a chosen column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Catalog ordering: a chosen column, or the newest-first default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest products first, by the creation timestamp in the id.
    #[default]
    NewestFirst,
    /// Sort by a table column.
    By(SortColumn, SortDirection),
}

/// Query describing one rendering of the catalog table.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    /// Case-insensitive product-name search term.
    pub search: Option<String>,

    /// Exact category filter.
    pub category: Option<String>,

    /// Sale-status filter.
    pub status: StatusFilter,

    /// Row ordering.
    pub sort: SortOrder,

    /// 1-based page number.
    pub page: usize,

    /// Rows per page.
    pub per_page: usize,

    /// Spot rate used for ARS display prices when sorting by price.
    pub spot_rate: Option<SpotRate>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            status: StatusFilter::All,
            sort: SortOrder::NewestFirst,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            spot_rate: None,
        }
    }
}

/// One page of catalog results.
#[derive(Debug)]
pub struct CatalogPage<'a> {
    /// Products on this page, in display order.
    pub products: Vec<&'a ProductRecord>,

    /// Page number this result holds (1-based).
    pub page: usize,

    /// Total pages for the filtered set.
    pub total_pages: usize,

    /// Products matching the filters across all pages.
    pub total_matches: usize,
}

/// Counts per sale status, for the status filter dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    /// Products open for negotiation.
    pub available: usize,

    /// Products being paid off under a plan.
    pub in_plan: usize,

    /// Sold products.
    pub sold: usize,
}

/// The product catalog held in memory for browsing.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Vec<ProductRecord>,
}

impl Catalog {
    /// Creates a catalog from records read by the persistence collaborator.
    #[must_use]
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Iterates over all products in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.iter()
    }

    /// Looks up a product by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Looks up a product by id for a sale-management update.
    #[must_use]
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ProductRecord> {
        self.products.iter_mut().find(|product| product.id == id)
    }

    /// Filters, sorts and paginates the catalog for one table rendering.
    #[must_use]
    pub fn browse(&self, query: &CatalogQuery) -> CatalogPage<'_> {
        let mut matches: Vec<&ProductRecord> = self
            .products
            .iter()
            .filter(|product| Self::matches(product, query))
            .collect();

        sort_products(&mut matches, query);

        let total_matches = matches.len();
        let per_page = query.per_page.max(1);
        let total_pages = total_matches.div_ceil(per_page);
        let page = query.page.max(1);

        let products = matches
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        CatalogPage {
            products,
            page,
            total_pages,
            total_matches,
        }
    }

    /// Counts per sale status across the whole catalog.
    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();

        for product in &self.products {
            match product.sale.status() {
                SaleStatus::Available => counts.available += 1,
                SaleStatus::InPlan => counts.in_plan += 1,
                SaleStatus::Sold => counts.sold += 1,
            }
        }

        counts
    }

    /// Product counts per category, for the category filter dropdown.
    #[must_use]
    pub fn category_counts(&self) -> FxHashMap<&str, usize> {
        let mut counts = FxHashMap::default();

        for product in &self.products {
            *counts.entry(product.category.as_str()).or_insert(0) += 1;
        }

        counts
    }

    fn matches(product: &ProductRecord, query: &CatalogQuery) -> bool {
        if let Some(term) = query.search.as_deref()
            && !term.is_empty()
            && !product
                .name
                .to_lowercase()
                .contains(&term.to_lowercase())
        {
            return false;
        }

        if let Some(category) = query.category.as_deref()
            && product.category != category
        {
            return false;
        }

        query.status.matches(product.sale.status())
    }
}

fn sort_products(products: &mut [&ProductRecord], query: &CatalogQuery) {
    match query.sort {
        SortOrder::NewestFirst => {
            products.sort_by_key(|product| Reverse(product.created_millis().unwrap_or(0)));
        }
        SortOrder::By(column, direction) => {
            products.sort_by(|a, b| {
                let ordering = compare_by(column, a, b, query.spot_rate);

                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }
    }
}

fn compare_by(
    column: SortColumn,
    a: &ProductRecord,
    b: &ProductRecord,
    spot: Option<SpotRate>,
) -> Ordering {
    match column {
        SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortColumn::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
        SortColumn::PriceArs => {
            // Unpriceable rows sink to the end of an ascending sort.
            let price = |product: &ProductRecord| {
                product.display_price_ars(spot).unwrap_or(Decimal::MAX)
            };

            price(a).cmp(&price(b))
        }
    }
}
