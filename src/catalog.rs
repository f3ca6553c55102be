//! Catalog

use rusty_money::iso::Currency;
use slotmap::SlotMap;
use thiserror::Error;

use crate::products::{Category, Product, ProductKey};

/// Errors related to catalog mutation.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A product's price or cost currency differs from the catalog currency.
    #[error("Product \"{0}\" has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// No product with the given key.
    #[error("Product not found")]
    ProductNotFound(ProductKey),
}

/// Catalog
///
/// Owns the product list and the active search/category filters. All
/// monetary values in the catalog share one currency; products priced in a
/// different currency are rejected at insertion.
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    currency: &'static Currency,
    search_term: String,
    category_filter: Option<Category>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Catalog {
            products: SlotMap::with_key(),
            currency,
            search_term: String::new(),
            category_filter: None,
        }
    }

    /// Add a product and return its key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CurrencyMismatch`] if the product's price or
    /// cost is not in the catalog currency.
    pub fn add_product(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        for money in [&product.price, &product.cost] {
            let currency = money.currency();

            if currency != self.currency {
                return Err(CatalogError::CurrencyMismatch(
                    product.name.clone(),
                    currency.iso_alpha_code,
                    self.currency.iso_alpha_code,
                ));
            }
        }

        Ok(self.products.insert(product))
    }

    /// Look up a product by key.
    #[must_use]
    pub fn product(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Mutable access to a product for inventory edits.
    ///
    /// Price edits must keep the catalog currency.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if the key is stale.
    pub fn product_mut(&mut self, key: ProductKey) -> Result<&mut Product<'a>, CatalogError> {
        self.products
            .get_mut(key)
            .ok_or(CatalogError::ProductNotFound(key))
    }

    /// Set a product's stock to an absolute value. Callers compute deltas.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if the key is stale.
    pub fn update_stock(&mut self, key: ProductKey, new_stock: u32) -> Result<(), CatalogError> {
        self.product_mut(key)?.stock = new_stock;

        Ok(())
    }

    /// Decrement a product's stock by a sold quantity, saturating at zero.
    ///
    /// Unknown keys are a no-op: an order may reference a product that has
    /// since been removed from the catalog.
    pub fn decrement_stock(&mut self, key: ProductKey, quantity: u32) {
        if let Some(product) = self.products.get_mut(key) {
            product.stock = product.stock.saturating_sub(quantity);
        }
    }

    /// Remove a product, returning it if it was present.
    pub fn remove_product(&mut self, key: ProductKey) -> Option<Product<'a>> {
        self.products.remove(key)
    }

    /// Set the free-text search term. An empty term clears the search.
    pub fn search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Restrict the filtered view to one category, or `None` for all.
    pub fn set_category(&mut self, category: Option<Category>) {
        self.category_filter = category;
    }

    /// Clear both the search term and the category filter.
    pub fn reset_filters(&mut self) {
        self.search_term.clear();
        self.category_filter = None;
    }

    /// The active search term.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// The active category filter.
    #[must_use]
    pub fn category_filter(&self) -> Option<Category> {
        self.category_filter
    }

    /// Products matching the active search term and category filter.
    ///
    /// Both filters compose: with a term and a category set, a product must
    /// match both to appear.
    pub fn filtered(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter().filter(|(_, product)| {
            let term_ok = self.search_term.is_empty() || product.matches(&self.search_term);

            let category_ok = self
                .category_filter
                .is_none_or(|category| product.category == category);

            term_ok && category_ok
        })
    }

    /// Products at or below their low-stock threshold.
    pub fn low_stock(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products
            .iter()
            .filter(|(_, product)| product.is_low_stock())
    }

    /// The full product map.
    #[must_use]
    pub fn products(&self) -> &SlotMap<ProductKey, Product<'a>> {
        &self.products
    }

    /// Get the number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Get the currency of the catalog.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
