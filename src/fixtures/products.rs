//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD, ZAR},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{Category, Product},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Brand name
    pub brand: String,

    /// Category (e.g. "beer", "mixers")
    pub category: Category,

    /// Optional finer-grained category
    pub sub_category: Option<String>,

    /// Retail price (e.g. "5.99 USD")
    pub price: String,

    /// Acquisition cost (e.g. "2.50 USD")
    pub cost: String,

    /// Units on hand
    pub stock: u32,

    /// Low-stock threshold
    pub low_stock_threshold: u32,

    /// Optional scan code
    pub barcode: Option<String>,

    /// Alcohol by volume (e.g. "6.2%" or "0.062")
    pub abv: String,

    /// Container volume label
    pub volume: String,
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (price_minor, price_currency) = parse_price(&fixture.price)?;
        let (cost_minor, cost_currency) = parse_price(&fixture.cost)?;
        let abv = parse_percentage(&fixture.abv)?;

        Ok(Product {
            name: fixture.name,
            brand: fixture.brand,
            category: fixture.category,
            sub_category: fixture.sub_category,
            price: Money::from_minor(price_minor, price_currency),
            cost: Money::from_minor(cost_minor, cost_currency),
            stock: fixture.stock,
            low_stock_threshold: fixture.low_stock_threshold,
            barcode: fixture.barcode,
            abv,
            volume: fixture.volume,
        })
    }
}

/// Parse price string (e.g. "5.99 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "USD" => USD,
        "GBP" => GBP,
        "EUR" => EUR,
        "ZAR" => ZAR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g. "6.2%" or "0.062") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "6.2%" for 6.2%
/// - Decimal format: "0.062" for 6.2%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}
