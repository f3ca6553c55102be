//! Checkout
//!
//! The transaction orchestrator: turns a cart into ledger orders and stock
//! movements. All collaborating stores are passed in explicitly; the
//! orchestrator owns only its clock and identifier source.
//!
//! Preconditions are checked before any mutation, so a failed operation
//! leaves every store untouched. Once the preconditions pass, the
//! remaining steps are infallible (stock decrements saturate, ledger
//! appends cannot fail) and the operation runs to completion.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{EmployeeKey, Session},
    cart::Cart,
    catalog::Catalog,
    clock::Clock,
    ledger::{Ledger, LedgerError},
    orders::{Order, OrderId, OrderIds, OrderStatus, PaymentMethod},
};

/// Errors raised by checkout preconditions and tab settlement.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No authenticated employee is bound to the session.
    #[error("no authenticated employee")]
    NoEmployee,

    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// The cart holds alcohol and the age check has not passed.
    #[error("age verification required")]
    AgeNotVerified,

    /// A tab cannot be opened without a name.
    #[error("tab name required")]
    MissingTabName,

    /// Wrapped ledger error from tab settlement.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Checkout orchestrator.
#[derive(Debug)]
pub struct Checkout<C, G> {
    clock: C,
    order_ids: G,
}

impl<C: Clock, G: OrderIds> Checkout<C, G> {
    /// Create an orchestrator with the given clock and identifier source.
    #[must_use]
    pub fn new(clock: C, order_ids: G) -> Self {
        Checkout { clock, order_ids }
    }

    /// Finalize the cart as a paid order.
    ///
    /// Appends a `completed` order to the ledger, decrements catalog stock
    /// for every line, and clears the cart. The order total is
    /// subtotal + tax + tip.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NoEmployee`]: the session is signed out.
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    /// - [`CheckoutError::AgeNotVerified`]: the cart holds alcohol and the
    ///   age check has not passed.
    pub fn process_payment<'a>(
        &mut self,
        cart: &mut Cart<'a>,
        session: &Session,
        catalog: &mut Catalog<'a>,
        ledger: &mut Ledger<'a>,
        payment_method: PaymentMethod,
        tip: Option<Money<'a, Currency>>,
    ) -> Result<OrderId, CheckoutError> {
        let employee = Self::guard(cart, session)?;

        let order = self.build_order(
            cart,
            employee,
            payment_method,
            tip,
            OrderStatus::Completed,
            None,
        );

        let id = order.id;

        Self::move_stock(catalog, &order);
        ledger.add_order(order);
        cart.clear();

        info!(%id, method = ?payment_method, "payment processed");

        Ok(id)
    }

    /// Open the cart as a named tab.
    ///
    /// Appends an `open-tab` order (payment method defaults to credit until
    /// settlement), decrements catalog stock for every line, and clears the
    /// cart. Stock moves at tab *creation*; closing the tab only settles
    /// payment.
    ///
    /// # Errors
    ///
    /// The preconditions of [`Checkout::process_payment`], plus
    /// [`CheckoutError::MissingTabName`] when the cart has no tab name.
    pub fn create_tab<'a>(
        &mut self,
        cart: &mut Cart<'a>,
        session: &Session,
        catalog: &mut Catalog<'a>,
        ledger: &mut Ledger<'a>,
    ) -> Result<OrderId, CheckoutError> {
        let employee = Self::guard(cart, session)?;

        if cart.tab_name().is_empty() {
            return Err(CheckoutError::MissingTabName);
        }

        let tab_name = cart.tab_name().to_string();

        let order = self.build_order(
            cart,
            employee,
            PaymentMethod::Credit,
            None,
            OrderStatus::OpenTab,
            Some(tab_name),
        );

        let id = order.id;

        Self::move_stock(catalog, &order);
        ledger.add_order(order);
        cart.clear();

        info!(%id, "tab opened");

        Ok(id)
    }

    /// Settle an open tab.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Ledger`] when the identifier is unknown or
    /// does not name an open tab.
    pub fn close_tab<'a>(
        &self,
        ledger: &mut Ledger<'a>,
        id: OrderId,
        payment_method: PaymentMethod,
        tip: Option<Money<'a, Currency>>,
    ) -> Result<(), CheckoutError> {
        let order = ledger.close_tab(id, payment_method, tip)?;

        info!(%id, total = %order.total, at = %self.clock.now(), "tab settled");

        Ok(())
    }

    /// Shared preconditions: an authenticated employee, a non-empty cart,
    /// and a passed age check whenever the cart holds alcohol.
    fn guard(cart: &Cart<'_>, session: &Session) -> Result<EmployeeKey, CheckoutError> {
        let employee = session.employee().ok_or(CheckoutError::NoEmployee)?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if cart.requires_age_check() && !cart.is_age_verified() {
            return Err(CheckoutError::AgeNotVerified);
        }

        Ok(employee)
    }

    fn build_order<'a>(
        &mut self,
        cart: &Cart<'a>,
        employee: EmployeeKey,
        payment_method: PaymentMethod,
        tip: Option<Money<'a, Currency>>,
        status: OrderStatus,
        tab_name: Option<String>,
    ) -> Order<'a> {
        let subtotal = cart.subtotal();
        let tax = cart.tax();

        if let Some(tip) = tip.as_ref() {
            debug_assert!(
                tip.currency() == cart.currency(),
                "tip currency must match the cart currency"
            );
        }

        let tip_minor = tip.as_ref().map_or(0, Money::to_minor_units);

        let total = Money::from_minor(
            subtotal.to_minor_units() + tax.to_minor_units() + tip_minor,
            cart.currency(),
        );

        Order {
            id: self.order_ids.next_id(),
            lines: cart.lines().to_vec(),
            subtotal,
            tax,
            total,
            payment_method,
            timestamp: self.clock.now(),
            employee,
            customer_age: cart.customer_age(),
            id_verified: cart.is_age_verified(),
            tip,
            status,
            tab_name,
        }
    }

    /// Decrement catalog stock for every line of a new order.
    fn move_stock(catalog: &mut Catalog<'_>, order: &Order<'_>) {
        for line in &order.lines {
            catalog.decrement_stock(line.product(), line.quantity());
        }
    }
}
