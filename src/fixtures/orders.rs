//! Order Fixtures

use chrono::Duration;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    clock::Clock,
    fixtures::{Fixture, FixtureError, products::parse_price},
    orders::{Order, OrderIds, OrderStatus, PaymentMethod},
};

/// Wrapper for seed orders in YAML
#[derive(Debug, Deserialize)]
pub struct OrdersFixture {
    /// Seed orders in ledger order
    pub orders: Vec<OrderFixture>,
}

/// Order Fixture
///
/// A seed order's subtotal, tax, and total are not written in the fixture;
/// they are computed when the order is rung through a cart during
/// materialization, so the totals invariant holds by construction.
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// String key of the employee who rang it up
    pub employee: String,

    /// Lifecycle status (e.g. "completed", "open-tab")
    pub status: OrderStatus,

    /// Payment method
    pub payment: PaymentMethod,

    /// How long before "now" the order was created
    pub hours_ago: u32,

    /// Age entered at the age check, if one was performed
    pub customer_age: Option<u8>,

    /// Whether the age check passed
    #[serde(default)]
    pub id_verified: bool,

    /// Optional tip (e.g. "5.00 USD"), folded into the total
    pub tip: Option<String>,

    /// Tab name, for open tabs
    pub tab_name: Option<String>,

    /// Order lines
    pub lines: Vec<OrderLineFixture>,
}

/// One line of a seed order
#[derive(Debug, Deserialize)]
pub struct OrderLineFixture {
    /// String key of the product
    pub product: String,

    /// Units sold
    pub quantity: u32,
}

impl OrderFixture {
    /// Build the order against the fixture's catalog and roster.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced product or employee does not exist
    /// or the tip cannot be parsed.
    pub(crate) fn materialize<'a, C: Clock, G: OrderIds>(
        &self,
        fixture: &Fixture<'a>,
        clock: &C,
        ids: &mut G,
    ) -> Result<Order<'a>, FixtureError> {
        let employee = fixture.employee_key(&self.employee)?;
        let cart = fixture.seed_cart(self)?;

        let tip = self
            .tip
            .as_deref()
            .map(parse_price)
            .transpose()?
            .map(|(minor, currency)| Money::from_minor(minor, currency));

        let subtotal = cart.subtotal();
        let tax = cart.tax();
        let tip_minor = tip.as_ref().map_or(0, Money::to_minor_units);

        let total = Money::from_minor(
            subtotal.to_minor_units() + tax.to_minor_units() + tip_minor,
            cart.currency(),
        );

        Ok(Order {
            id: ids.next_id(),
            lines: cart.lines().to_vec(),
            subtotal,
            tax,
            total,
            payment_method: self.payment,
            timestamp: clock.now() - Duration::hours(i64::from(self.hours_ago)),
            employee,
            customer_age: self.customer_age,
            id_verified: self.id_verified,
            tip,
            status: self.status,
            tab_name: self.tab_name.clone(),
        })
    }
}
