//! Order Ledger

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    auth::EmployeeKey,
    orders::{Order, OrderId, OrderStatus, PaymentMethod},
};

/// Errors related to ledger lookups and tab settlement.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No order with the given identifier.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// The order exists but is not an open tab.
    #[error("Order {0} is not an open tab")]
    NotAnOpenTab(OrderId),
}

/// Partial update merged into an existing order.
///
/// Fields left as `None` keep their current values. Merging a tip does not
/// touch the total; folding a tip into the total is the business of
/// [`Ledger::close_tab`].
#[derive(Debug, Default)]
pub struct OrderUpdate<'a> {
    /// New lifecycle status
    pub status: Option<OrderStatus>,

    /// New payment method
    pub payment_method: Option<PaymentMethod>,

    /// New tip
    pub tip: Option<Money<'a, Currency>>,

    /// New tab name
    pub tab_name: Option<String>,
}

/// Order Ledger
///
/// Append-only collection of finalized orders and open tabs, plus an
/// explicitly synchronized index of which orders are open tabs. Orders are
/// never deleted; the only mutation is the open-tab to completed
/// transition and field merges via [`Ledger::update_order`].
#[derive(Debug)]
pub struct Ledger<'a> {
    orders: Vec<Order<'a>>,
    open_tabs: SmallVec<[OrderId; 8]>,
    currency: &'static Currency,
}

impl<'a> Ledger<'a> {
    /// Create an empty ledger denominated in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Ledger {
            orders: Vec::new(),
            open_tabs: SmallVec::new(),
            currency,
        }
    }

    /// Append an order. Open tabs also enter the open-tabs index.
    pub fn add_order(&mut self, order: Order<'a>) {
        debug!(id = %order.id, status = ?order.status, "order appended");

        if order.is_open_tab() {
            self.open_tabs.push(order.id);
        }

        self.orders.push(order);
    }

    /// Look up an order by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::OrderNotFound`] if no order has the identifier.
    pub fn order(&self, id: OrderId) -> Result<&Order<'a>, LedgerError> {
        self.orders
            .iter()
            .find(|order| order.id == id)
            .ok_or(LedgerError::OrderNotFound(id))
    }

    /// Merge a partial update into an order.
    ///
    /// A status transition to or from `open-tab` synchronizes the open-tabs
    /// index.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::OrderNotFound`] if no order has the identifier.
    pub fn update_order(
        &mut self,
        id: OrderId,
        update: OrderUpdate<'a>,
    ) -> Result<&Order<'a>, LedgerError> {
        let order = self
            .orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(LedgerError::OrderNotFound(id))?;

        if let Some(status) = update.status {
            order.status = status;
        }

        if let Some(payment_method) = update.payment_method {
            order.payment_method = payment_method;
        }

        if let Some(tip) = update.tip {
            order.tip = Some(tip);
        }

        if let Some(tab_name) = update.tab_name {
            order.tab_name = Some(tab_name);
        }

        let is_open = order.is_open_tab();

        self.sync_open_tab(id, is_open);

        // Re-borrow immutably for the return value.
        self.order(id)
    }

    /// Settle an open tab: mark it completed, assign the payment method,
    /// and fold the tip into the total. The order leaves the open-tabs
    /// index but remains in the ledger.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::OrderNotFound`] if no order has the identifier.
    /// - [`LedgerError::NotAnOpenTab`] if the order is not an open tab.
    pub fn close_tab(
        &mut self,
        id: OrderId,
        payment_method: PaymentMethod,
        tip: Option<Money<'a, Currency>>,
    ) -> Result<&Order<'a>, LedgerError> {
        let order = self
            .orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(LedgerError::OrderNotFound(id))?;

        if !order.is_open_tab() {
            return Err(LedgerError::NotAnOpenTab(id));
        }

        let tip_minor = tip.as_ref().map_or(0, Money::to_minor_units);

        if let Some(tip) = tip.as_ref() {
            debug_assert!(
                tip.currency() == order.total.currency(),
                "tip currency must match the order currency"
            );
        }

        order.status = OrderStatus::Completed;
        order.payment_method = payment_method;
        order.tip = tip;
        order.total = Money::from_minor(
            order.total.to_minor_units() + tip_minor,
            order.total.currency(),
        );

        debug!(%id, method = ?payment_method, "tab closed");

        self.sync_open_tab(id, false);

        self.order(id)
    }

    /// The open tabs, in creation order.
    pub fn open_tabs(&self) -> impl Iterator<Item = &Order<'a>> {
        self.open_tabs.iter().filter_map(|id| {
            self.orders.iter().find(|order| order.id == *id)
        })
    }

    /// All orders, oldest first.
    #[must_use]
    pub fn orders(&self) -> &[Order<'a>] {
        &self.orders
    }

    /// The most recent orders, newest first, truncated to `limit`.
    #[must_use]
    pub fn recent_orders(&self, limit: usize) -> Vec<&Order<'a>> {
        let mut recent: Vec<&Order<'a>> = self.orders.iter().collect();

        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);

        recent
    }

    /// All orders rung up by one employee, oldest first.
    pub fn orders_by_employee(&self, key: EmployeeKey) -> impl Iterator<Item = &Order<'a>> {
        self.orders.iter().filter(move |order| order.employee == key)
    }

    /// Get the number of orders in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the currency of the ledger.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Add or remove an order from the open-tabs index to match its status.
    fn sync_open_tab(&mut self, id: OrderId, is_open: bool) {
        let position = self.open_tabs.iter().position(|tab| *tab == id);

        match (is_open, position) {
            (true, None) => self.open_tabs.push(id),
            (false, Some(index)) => {
                self.open_tabs.remove(index);
            }
            _ => {}
        }
    }
}
