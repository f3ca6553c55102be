//! Orders

use std::fmt;

use chrono::{DateTime, Utc};
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::EmployeeKey, cart::CartLine};

/// Order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(Uuid);

impl From<Uuid> for OrderId {
    fn from(id: Uuid) -> Self {
        OrderId(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Source of unique order identifiers.
pub trait OrderIds {
    /// Produce the next identifier.
    fn next_id(&mut self) -> OrderId;
}

/// Random (UUID v4) order identifiers.
#[derive(Debug, Default)]
pub struct UuidOrderIds;

impl OrderIds for UuidOrderIds {
    fn next_id(&mut self) -> OrderId {
        OrderId(Uuid::new_v4())
    }
}

/// Deterministic sequential identifiers, for tests and fixtures.
#[derive(Debug, Default)]
pub struct SequentialOrderIds(u128);

impl OrderIds for SequentialOrderIds {
    fn next_id(&mut self) -> OrderId {
        self.0 += 1;

        OrderId(Uuid::from_u128(self.0))
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash at the register
    Cash,

    /// Credit card
    Credit,

    /// Debit card
    Debit,

    /// Mobile wallet
    Mobile,
}

impl PaymentMethod {
    /// Human-readable label for display surfaces.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Credit => "Credit",
            PaymentMethod::Debit => "Debit",
            PaymentMethod::Mobile => "Mobile",
        }
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Paid and terminal
    Completed,

    /// Refunded after completion
    Refunded,

    /// An open tab awaiting settlement
    OpenTab,
}

/// Immutable record of a finalized transaction or an open tab.
///
/// Lines are value snapshots taken at sale time; later catalog edits never
/// reach an order. The only permitted mutation is the open-tab to completed
/// transition, performed by the ledger.
#[derive(Debug, Clone)]
pub struct Order<'a> {
    /// Unique identifier
    pub id: OrderId,

    /// Line snapshots from the cart at checkout
    pub lines: Vec<CartLine<'a>>,

    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Sales tax on the subtotal
    pub tax: Money<'a, Currency>,

    /// Subtotal plus tax plus any tip
    pub total: Money<'a, Currency>,

    /// How the order was (or will be) paid
    pub payment_method: PaymentMethod,

    /// When the order was created
    pub timestamp: DateTime<Utc>,

    /// The employee who rang it up
    pub employee: EmployeeKey,

    /// Age entered at the age check, if one was performed
    pub customer_age: Option<u8>,

    /// Whether the age check passed
    pub id_verified: bool,

    /// Tip, when one was added
    pub tip: Option<Money<'a, Currency>>,

    /// Lifecycle status
    pub status: OrderStatus,

    /// Name of the tab, for orders opened as tabs
    pub tab_name: Option<String>,
}

impl Order<'_> {
    /// Whether this order is an open tab.
    #[must_use]
    pub fn is_open_tab(&self) -> bool {
        self.status == OrderStatus::OpenTab
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(CartLine::quantity).sum()
    }
}
