//! Products
//!
//! The print-on-demand product range and the per-product cost table shared by
//! both pricing strategies.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a product type name is not part of the range.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid product_type: '{0}'")]
pub struct UnknownProductType(pub String);

/// A product that can be printed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    /// Printed t-shirt
    TShirt,

    /// Printed hoodie
    Hoodie,

    /// Printed mug
    Mug,

    /// Printed poster
    Poster,

    /// Die-cut sticker
    Sticker,

    /// Printed tote bag
    ToteBag,
}

impl ProductType {
    /// Every product type, in catalogue order.
    pub const ALL: [ProductType; 6] = [
        ProductType::TShirt,
        ProductType::Hoodie,
        ProductType::Mug,
        ProductType::Poster,
        ProductType::Sticker,
        ProductType::ToteBag,
    ];

    /// The kebab-case name used on the command line and in JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ProductType::TShirt => "t-shirt",
            ProductType::Hoodie => "hoodie",
            ProductType::Mug => "mug",
            ProductType::Poster => "poster",
            ProductType::Sticker => "sticker",
            ProductType::ToteBag => "tote-bag",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = UnknownProductType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductType::ALL
            .into_iter()
            .find(|product_type| product_type.as_str() == s)
            .ok_or_else(|| UnknownProductType(s.to_string()))
    }
}

/// Cost and margin settings for a single product type.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProductSpec {
    /// Production cost charged by the print provider
    pub base_cost: Decimal,

    /// Multiplier applied to the base cost by the markup strategy
    pub markup: Decimal,

    /// Lowest acceptable profit margin (fraction of price)
    pub min_margin: Decimal,
}

impl ProductSpec {
    /// Create a new product spec.
    #[must_use]
    pub const fn new(base_cost: Decimal, markup: Decimal, min_margin: Decimal) -> Self {
        Self {
            base_cost,
            markup,
            min_margin,
        }
    }
}

/// Product type -> cost table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ProductCatalog {
    products: FxHashMap<ProductType, ProductSpec>,
}

impl ProductCatalog {
    /// Build a catalog from explicit entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (ProductType, ProductSpec)>) -> Self {
        Self {
            products: entries.into_iter().collect(),
        }
    }

    /// Look up the spec for a product type.
    #[must_use]
    pub fn get(&self, product_type: ProductType) -> Option<&ProductSpec> {
        self.products.get(&product_type)
    }

    /// Look up a product by its kebab-case name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownProductType`] if the name is not a product type or the
    /// product type has no entry in this catalog.
    pub fn lookup(&self, name: &str) -> Result<(ProductType, &ProductSpec), UnknownProductType> {
        let product_type = name.parse::<ProductType>()?;

        self.get(product_type)
            .map(|spec| (product_type, spec))
            .ok_or_else(|| UnknownProductType(name.to_string()))
    }

    /// Product types present in the catalog, in catalogue order.
    #[must_use]
    pub fn product_types(&self) -> Vec<ProductType> {
        ProductType::ALL
            .into_iter()
            .filter(|product_type| self.products.contains_key(product_type))
            .collect()
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::from_entries([
            (
                ProductType::TShirt,
                ProductSpec::new(Decimal::new(1200, 2), Decimal::new(20, 1), Decimal::new(40, 2)),
            ),
            (
                ProductType::Hoodie,
                ProductSpec::new(Decimal::new(2500, 2), Decimal::new(18, 1), Decimal::new(35, 2)),
            ),
            (
                ProductType::Mug,
                ProductSpec::new(Decimal::new(800, 2), Decimal::new(25, 1), Decimal::new(50, 2)),
            ),
            (
                ProductType::Poster,
                ProductSpec::new(Decimal::new(1000, 2), Decimal::new(22, 1), Decimal::new(45, 2)),
            ),
            (
                ProductType::Sticker,
                ProductSpec::new(Decimal::new(300, 2), Decimal::new(30, 1), Decimal::new(60, 2)),
            ),
            (
                ProductType::ToteBag,
                ProductSpec::new(Decimal::new(1500, 2), Decimal::new(20, 1), Decimal::new(40, 2)),
            ),
        ])
    }
}
