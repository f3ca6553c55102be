//! Tapline prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    auth::{Employee, EmployeeKey, Role, Roster, Session},
    cart::{Cart, CartError, CartLine, MINIMUM_AGE},
    catalog::{Catalog, CatalogError},
    checkout::{Checkout, CheckoutError},
    clock::{Clock, FixedClock, SystemClock},
    fixtures::{Fixture, FixtureError},
    ledger::{Ledger, LedgerError, OrderUpdate},
    orders::{
        Order, OrderId, OrderIds, OrderStatus, PaymentMethod, SequentialOrderIds, UuidOrderIds,
    },
    products::{Category, Product, ProductKey},
    receipt::{Receipt, ReceiptError},
    reports::{DailySales, ProductSales, Timeframe},
};
