//! Fixtures
//!
//! YAML fixture sets under `./fixtures` seed the catalog, the employee
//! roster, and the order ledger with sample data for demos and tests.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    auth::{EmployeeKey, Roster},
    cart::Cart,
    catalog::Catalog,
    clock::Clock,
    ledger::Ledger,
    orders::OrderIds,
    products::{Product, ProductKey},
};

pub mod employees;
pub mod orders;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Employee not found
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoProducts,

    /// Catalog rejected a product
    #[error(transparent)]
    Catalog(#[from] crate::catalog::CatalogError),

    /// Cart rejected a seed order line
    #[error(transparent)]
    Cart(#[from] crate::cart::CartError),
}

/// Fixture
///
/// Accumulates loaded sample data; the stores are extracted at the end via
/// [`Fixture::into_stores`].
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog built from the loaded products; its currency is set by the
    /// first product
    catalog: Option<Catalog<'a>>,

    /// Roster built from the loaded employees
    roster: Roster,

    /// String key -> generated key mappings for lookups
    product_keys: FxHashMap<String, ProductKey>,
    employee_keys: FxHashMap<String, EmployeeKey>,

    /// Raw seed orders, materialized once a clock and id source exist
    orders: Vec<orders::OrderFixture>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            roster: Roster::new(),
            product_keys: FxHashMap::default(),
            employee_keys: FxHashMap::default(),
            orders: Vec::new(),
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if there
    /// are currency mismatches between products.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: products::ProductsFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            // Parse to get the currency first so the catalog can be created
            // before the first insert.
            let (_minor_units, currency) = products::parse_price(&product_fixture.price)?;

            let catalog = self
                .catalog
                .get_or_insert_with(|| Catalog::new(currency));

            let product: Product<'a> = product_fixture.try_into()?;
            let product_key = catalog.add_product(product)?;

            self.product_keys.insert(key, product_key);
        }

        Ok(self)
    }

    /// Load employees from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_employees(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("employees").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: employees::EmployeesFixture = serde_norway::from_str(&contents)?;

        for (key, employee_fixture) in fixture.employees {
            let employee_key = self.roster.add_employee(employee_fixture.into());

            self.employee_keys.insert(key, employee_key);
        }

        Ok(self)
    }

    /// Load seed orders from a YAML fixture file
    ///
    /// The orders stay unmaterialized until [`Fixture::build_ledger`] runs
    /// with a clock and an identifier source.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_orders(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: orders::OrdersFixture = serde_norway::from_str(&contents)?;

        self.orders.extend(fixture.orders);

        Ok(self)
    }

    /// Load a complete fixture set (products, employees, and orders with
    /// the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_employees(name)?
            .load_orders(name)?;

        Ok(fixture)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'a>, FixtureError> {
        let product_key = self.product_key(key)?;

        self.catalog()?
            .product(product_key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get an employee key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the employee is not found.
    pub fn employee_key(&self, key: &str) -> Result<EmployeeKey, FixtureError> {
        self.employee_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::EmployeeNotFound(key.to_string()))
    }

    /// The catalog built from the loaded products
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoProducts)
    }

    /// The roster built from the loaded employees
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        Ok(self.catalog()?.currency())
    }

    /// Materialize the seed orders into a fresh ledger.
    ///
    /// Each seed order is rung through a real [`Cart`] so its subtotal,
    /// tax, and total are consistent by construction; its timestamp is
    /// `clock.now()` minus the fixture's `hours_ago`.
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or a seed order
    /// references an unknown product or employee.
    pub fn build_ledger<C: Clock, G: OrderIds>(
        &self,
        clock: &C,
        ids: &mut G,
    ) -> Result<Ledger<'a>, FixtureError> {
        let catalog = self.catalog()?;
        let mut ledger = Ledger::new(catalog.currency());

        for seed in &self.orders {
            let order = seed.materialize(self, clock, ids)?;

            ledger.add_order(order);
        }

        Ok(ledger)
    }

    /// Consume the fixture, returning the three stores.
    ///
    /// # Errors
    ///
    /// The errors of [`Fixture::build_ledger`].
    pub fn into_stores<C: Clock, G: OrderIds>(
        self,
        clock: &C,
        ids: &mut G,
    ) -> Result<(Catalog<'a>, Roster, Ledger<'a>), FixtureError> {
        let ledger = self.build_ledger(clock, ids)?;
        let catalog = self.catalog.ok_or(FixtureError::NoProducts)?;

        Ok((catalog, self.roster, ledger))
    }

    /// Ring a seed order's lines through a fresh cart.
    fn seed_cart(&self, seed: &orders::OrderFixture) -> Result<Cart<'a>, FixtureError> {
        let catalog = self.catalog()?;
        let mut cart = Cart::new(catalog.currency());

        for line in &seed.lines {
            let key = self.product_key(&line.product)?;

            let product = catalog
                .product(key)
                .ok_or_else(|| FixtureError::ProductNotFound(line.product.clone()))?;

            cart.add_product(key, product, line.quantity)?;
        }

        Ok(cart)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
