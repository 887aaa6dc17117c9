//! Catalog fixtures
//!
//! YAML catalogs in the stored wire shape, used by the showcase binary and
//! the integration tests.

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::{catalog::Catalog, products::ProductRecord};

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading the fixture file.
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: Vec<ProductRecord>,
}

/// Loads a catalog from a YAML fixture file.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the file cannot be read or parsed.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, FixtureError> {
    let contents = fs::read_to_string(path)?;

    parse_catalog(&contents)
}

/// Parses a catalog from YAML fixture contents.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the contents are not a valid catalog
/// document.
pub fn parse_catalog(contents: &str) -> Result<Catalog, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(contents)?;

    Ok(Catalog::new(fixture.products))
}
