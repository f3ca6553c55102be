//! Cart

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::products::{Product, ProductKey};

/// Minimum customer age for the sale of alcohol.
pub const MINIMUM_AGE: u8 = 21;

/// Sales tax rate applied to every sale.
#[must_use]
pub fn tax_rate() -> Percentage {
    Percentage::from(0.10)
}

/// Errors related to cart mutation.
#[derive(Debug, Error)]
pub enum CartError {
    /// A product's currency differs from the cart currency.
    #[error("Product \"{0}\" has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}

/// A cart line: a product reference plus a value snapshot of the fields
/// that must survive later catalog edits.
#[derive(Debug, Clone)]
pub struct CartLine<'a> {
    product: ProductKey,
    name: String,
    unit_price: Money<'a, Currency>,
    abv: Percentage,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Snapshot a product into a new line with the given quantity.
    #[must_use]
    pub fn new(key: ProductKey, product: &Product<'a>, quantity: u32) -> Self {
        CartLine {
            product: key,
            name: product.name.clone(),
            unit_price: product.price,
            abv: product.abv,
            quantity,
        }
    }

    /// The catalog key of the product this line was snapshotted from.
    #[must_use]
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Product name at add time.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price at add time.
    #[must_use]
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Alcohol by volume at add time.
    #[must_use]
    pub fn abv(&self) -> Percentage {
        self.abv
    }

    /// Units of the product on this line. Always positive.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.unit_price.to_minor_units() * i64::from(self.quantity),
            self.unit_price.currency(),
        )
    }

    /// Whether this line is subject to the age check.
    #[must_use]
    pub fn is_alcoholic(&self) -> bool {
        self.abv * Decimal::ONE > Decimal::ZERO
    }
}

/// Cart
///
/// The in-progress sale: ordered line items, age-verification state, and
/// the draft name for a tab. All computations are pure over current state;
/// the cart never touches the catalog or the ledger.
#[derive(Debug)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    verified: bool,
    customer_age: Option<u8>,
    tab_name: String,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty, unverified cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            verified: false,
            customer_age: None,
            tab_name: String::new(),
            currency,
        }
    }

    /// Add a product to the cart.
    ///
    /// If the product is already present its quantity accumulates and the
    /// snapshot keeps its original add-time values; otherwise a new line is
    /// appended. A zero quantity leaves the cart unchanged, since every
    /// line's quantity must end up positive.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the product is not priced
    /// in the cart currency.
    pub fn add_product(
        &mut self,
        key: ProductKey,
        product: &Product<'a>,
        quantity: u32,
    ) -> Result<(), CartError> {
        let currency = product.price.currency();

        if currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.name.clone(),
                currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if quantity == 0 {
            return Ok(());
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.product == key) {
            line.quantity += quantity;
        } else {
            self.lines.push(CartLine::new(key, product, quantity));
        }

        Ok(())
    }

    /// Replace a line's quantity. Zero removes the line entirely.
    pub fn update_quantity(&mut self, key: ProductKey, quantity: u32) {
        if quantity == 0 {
            self.remove_line(key);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.product == key) {
            line.quantity = quantity;
        }
    }

    /// Remove the line for a product, if present.
    pub fn remove_line(&mut self, key: ProductKey) {
        self.lines.retain(|line| line.product != key);
    }

    /// Record an age check.
    ///
    /// The cart verifies only when the entered age meets [`MINIMUM_AGE`];
    /// the raw age is recorded either way so an under-age entry stays
    /// visible while the cart remains blocked.
    pub fn verify_age(&mut self, age: u8) {
        self.verified = age >= MINIMUM_AGE;
        self.customer_age = Some(age);
    }

    /// Clear the age-verification flag and the recorded age.
    pub fn reset_age_verification(&mut self) {
        self.verified = false;
        self.customer_age = None;
    }

    /// Set the draft name for a tab opened from this cart.
    pub fn set_tab_name(&mut self, name: impl Into<String>) {
        self.tab_name = name.into();
    }

    /// The draft tab name. Empty when none has been set.
    #[must_use]
    pub fn tab_name(&self) -> &str {
        &self.tab_name
    }

    /// Whether the age check has passed.
    #[must_use]
    pub fn is_age_verified(&self) -> bool {
        self.verified
    }

    /// The age entered at the last age check, verified or not.
    #[must_use]
    pub fn customer_age(&self) -> Option<u8> {
        self.customer_age
    }

    /// Whether any line in the cart requires an age check.
    #[must_use]
    pub fn requires_age_check(&self) -> bool {
        self.lines.iter().any(CartLine::is_alcoholic)
    }

    /// The lines in the cart, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(CartLine::quantity).sum()
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        let minor: i64 = self
            .lines
            .iter()
            .map(|line| line.line_total().to_minor_units())
            .sum();

        Money::from_minor(minor, self.currency)
    }

    /// Sales tax on the current subtotal, rounded to the nearest minor
    /// unit, half away from zero.
    #[must_use]
    pub fn tax(&self) -> Money<'a, Currency> {
        let subtotal = Decimal::from_i64(self.subtotal().to_minor_units()).unwrap_or(Decimal::ZERO);

        let minor = (tax_rate() * subtotal)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0);

        Money::from_minor(minor, self.currency)
    }

    /// Subtotal plus tax.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.subtotal().to_minor_units() + self.tax().to_minor_units(),
            self.currency,
        )
    }

    /// Empty the cart and reset verification and tab-name state.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.verified = false;
        self.customer_age = None;
        self.tab_name.clear();
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
