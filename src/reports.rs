//! Sales Reports
//!
//! Aggregations derived from the [`Ledger`]: totals over rolling windows,
//! top sellers at sale-time prices, and day-bucketed daily sales. Only
//! `completed` orders count towards revenue; open tabs and refunds do not.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::CartLine,
    ledger::Ledger,
    orders::{Order, OrderStatus},
    products::ProductKey,
};

/// Reporting window ending at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    /// Midnight (in the clock's zone) to now
    Today,

    /// Rolling seven days
    Week,

    /// Rolling calendar month
    Month,
}

impl Timeframe {
    /// Inclusive lower bound of the window ending at `now`.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Timeframe::Today => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
            Timeframe::Week => now - Duration::days(7),
            Timeframe::Month => now
                .checked_sub_months(Months::new(1))
                // Only reachable at the edge of the representable range.
                .unwrap_or(now - Duration::days(30)),
        }
    }
}

/// Aggregated sales for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales<'a> {
    /// The product the lines were snapshotted from
    pub product: ProductKey,

    /// Product name at sale time
    pub name: String,

    /// Total units sold
    pub quantity: u32,

    /// Total revenue at sale-time prices
    pub revenue: Money<'a, Currency>,
}

/// One day of aggregated sales.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySales<'a> {
    /// The day the orders fell on
    pub date: NaiveDate,

    /// Revenue for the day
    pub total: Money<'a, Currency>,

    /// Units sold across all orders of the day
    pub items_sold: u32,

    /// Number of completed orders
    pub transactions: u32,
}

impl<'a> Ledger<'a> {
    /// Revenue over `completed` orders whose timestamp falls inside the
    /// timeframe window ending at `now`.
    #[must_use]
    pub fn total_sales(&self, timeframe: Timeframe, now: DateTime<Utc>) -> Money<'a, Currency> {
        let start = timeframe.start(now);

        let minor: i64 = self
            .completed()
            .filter(|order| order.timestamp >= start && order.timestamp <= now)
            .map(|order| order.total.to_minor_units())
            .sum();

        Money::from_minor(minor, self.currency())
    }

    /// Top products by units sold over all `completed` orders.
    ///
    /// Revenue uses sale-time prices, not the current catalog. Ties on
    /// quantity break by product key ascending, which is stable for a
    /// catalog that only grows.
    #[must_use]
    pub fn top_selling_products(&self, limit: usize) -> Vec<ProductSales<'a>> {
        let mut by_product: FxHashMap<ProductKey, ProductSales<'a>> = FxHashMap::default();

        for order in self.completed() {
            for line in &order.lines {
                let entry = by_product
                    .entry(line.product())
                    .or_insert_with(|| ProductSales {
                        product: line.product(),
                        name: line.name().to_string(),
                        quantity: 0,
                        revenue: Money::from_minor(0, self.currency()),
                    });

                entry.quantity += line.quantity();
                entry.revenue = Money::from_minor(
                    entry.revenue.to_minor_units() + line.line_total().to_minor_units(),
                    self.currency(),
                );
            }
        }

        let mut ranked: Vec<ProductSales<'a>> = by_product.into_values().collect();

        ranked.sort_by(|a, b| {
            b.quantity
                .cmp(&a.quantity)
                .then_with(|| a.product.cmp(&b.product))
        });

        ranked.truncate(limit);

        ranked
    }

    /// Day-bucketed sales for the last `days` days, today included,
    /// oldest first. Days without completed orders appear with zeroes.
    #[must_use]
    pub fn daily_sales(&self, days: u32, now: DateTime<Utc>) -> Vec<DailySales<'a>> {
        let today = now.date_naive();

        let mut buckets: FxHashMap<NaiveDate, (i64, u32, u32)> = FxHashMap::default();

        for order in self.completed() {
            let date = order.timestamp.date_naive();
            let (total, items, transactions) = buckets.entry(date).or_default();

            *total += order.total.to_minor_units();
            *items += order.total_items();
            *transactions += 1;
        }

        (0..days)
            .rev()
            .filter_map(|offset| today.checked_sub_days(chrono::Days::new(u64::from(offset))))
            .map(|date| {
                let (total, items_sold, transactions) =
                    buckets.get(&date).copied().unwrap_or_default();

                DailySales {
                    date,
                    total: Money::from_minor(total, self.currency()),
                    items_sold,
                    transactions,
                }
            })
            .collect()
    }

    /// Number of units of every product sold over `completed` orders.
    #[must_use]
    pub fn units_sold(&self) -> u32 {
        self.completed()
            .flat_map(|order| order.lines.iter())
            .map(CartLine::quantity)
            .sum()
    }

    fn completed(&self) -> impl Iterator<Item = &Order<'a>> {
        self.orders()
            .iter()
            .filter(|order| order.status == OrderStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rusty_money::iso::USD;
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::{
        auth::EmployeeKey,
        orders::{OrderId, OrderIds, PaymentMethod, SequentialOrderIds},
        products::{Category, Product},
    };
    use decimal_percentage::Percentage;

    use super::*;

    fn now() -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(2025, 6, 10, 18, 0, 0).single()
    }

    fn product<'a>(name: &str, price_minor: i64) -> Product<'a> {
        Product {
            name: name.to_string(),
            brand: "House".to_string(),
            category: Category::Beer,
            sub_category: None,
            price: Money::from_minor(price_minor, USD),
            cost: Money::from_minor(price_minor / 2, USD),
            stock: 48,
            low_stock_threshold: 10,
            barcode: None,
            abv: Percentage::from(0.05),
            volume: "12oz".to_string(),
        }
    }

    fn order<'a>(
        id: OrderId,
        status: OrderStatus,
        timestamp: DateTime<Utc>,
        lines: Vec<CartLine<'a>>,
    ) -> Order<'a> {
        let subtotal_minor: i64 = lines
            .iter()
            .map(|line| line.line_total().to_minor_units())
            .sum();

        Order {
            id,
            lines,
            subtotal: Money::from_minor(subtotal_minor, USD),
            tax: Money::from_minor(0, USD),
            total: Money::from_minor(subtotal_minor, USD),
            payment_method: PaymentMethod::Credit,
            timestamp,
            employee: EmployeeKey::default(),
            customer_age: Some(28),
            id_verified: true,
            tip: None,
            status,
            tab_name: None,
        }
    }

    #[test]
    fn total_sales_today_ignores_yesterday() -> TestResult {
        let now = now().ok_or("invalid timestamp")?;
        let mut ids = SequentialOrderIds::default();
        let mut ledger = Ledger::new(USD);

        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let key = keys.insert(());
        let ipa = product("IPA Craft Beer", 599);

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now - Duration::hours(1),
            vec![CartLine::new(key, &ipa, 2)],
        ));

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now - Duration::days(1),
            vec![CartLine::new(key, &ipa, 1)],
        ));

        assert_eq!(
            ledger.total_sales(Timeframe::Today, now),
            Money::from_minor(1198, USD)
        );

        assert_eq!(
            ledger.total_sales(Timeframe::Week, now),
            Money::from_minor(1797, USD)
        );

        Ok(())
    }

    #[test]
    fn total_sales_excludes_open_tabs_and_refunds() -> TestResult {
        let now = now().ok_or("invalid timestamp")?;
        let mut ids = SequentialOrderIds::default();
        let mut ledger = Ledger::new(USD);

        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let key = keys.insert(());
        let ipa = product("IPA Craft Beer", 599);

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::OpenTab,
            now - Duration::hours(1),
            vec![CartLine::new(key, &ipa, 4)],
        ));

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Refunded,
            now - Duration::hours(2),
            vec![CartLine::new(key, &ipa, 4)],
        ));

        assert_eq!(
            ledger.total_sales(Timeframe::Today, now),
            Money::from_minor(0, USD)
        );

        Ok(())
    }

    #[test]
    fn total_sales_month_window_is_rolling() -> TestResult {
        let now = now().ok_or("invalid timestamp")?;
        let mut ids = SequentialOrderIds::default();
        let mut ledger = Ledger::new(USD);

        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let key = keys.insert(());
        let ipa = product("IPA Craft Beer", 599);

        // 20 days ago: inside the rolling month, outside the week.
        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now - Duration::days(20),
            vec![CartLine::new(key, &ipa, 1)],
        ));

        assert_eq!(
            ledger.total_sales(Timeframe::Week, now),
            Money::from_minor(0, USD)
        );

        assert_eq!(
            ledger.total_sales(Timeframe::Month, now),
            Money::from_minor(599, USD)
        );

        Ok(())
    }

    #[test]
    fn top_selling_products_ranks_by_quantity() -> TestResult {
        let now = now().ok_or("invalid timestamp")?;
        let mut ids = SequentialOrderIds::default();
        let mut ledger = Ledger::new(USD);

        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let ipa_key = keys.insert(());
        let tonic_key = keys.insert(());

        let ipa = product("IPA Craft Beer", 599);
        let tonic = product("Tonic Water", 399);

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now,
            vec![CartLine::new(ipa_key, &ipa, 2), CartLine::new(tonic_key, &tonic, 1)],
        ));

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now,
            vec![CartLine::new(ipa_key, &ipa, 3)],
        ));

        let top = ledger.top_selling_products(1);
        let best = top.first().ok_or("no products ranked")?;

        assert_eq!(best.name, "IPA Craft Beer");
        assert_eq!(best.quantity, 5);
        assert_eq!(best.revenue, Money::from_minor(2995, USD));

        Ok(())
    }

    #[test]
    fn top_selling_products_breaks_ties_by_key_order() -> TestResult {
        let now = now().ok_or("invalid timestamp")?;
        let mut ids = SequentialOrderIds::default();
        let mut ledger = Ledger::new(USD);

        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let first_key = keys.insert(());
        let second_key = keys.insert(());

        let lager = product("Light Lager", 499);
        let stout = product("Stout", 699);

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now,
            vec![
                CartLine::new(second_key, &stout, 2),
                CartLine::new(first_key, &lager, 2),
            ],
        ));

        let top = ledger.top_selling_products(2);

        let names: Vec<&str> = top.iter().map(|sales| sales.name.as_str()).collect();

        // Equal quantities: the earlier-inserted key wins.
        assert_eq!(names, vec!["Light Lager", "Stout"]);

        Ok(())
    }

    #[test]
    fn top_selling_products_uses_sale_time_revenue() -> TestResult {
        let now = now().ok_or("invalid timestamp")?;
        let mut ids = SequentialOrderIds::default();
        let mut ledger = Ledger::new(USD);

        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let key = keys.insert(());

        // Two sales of the same product at different historical prices.
        let before = product("Cabernet Sauvignon", 2499);
        let after = product("Cabernet Sauvignon", 2999);

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now,
            vec![CartLine::new(key, &before, 1)],
        ));

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now,
            vec![CartLine::new(key, &after, 1)],
        ));

        let top = ledger.top_selling_products(1);
        let best = top.first().ok_or("no products ranked")?;

        assert_eq!(best.revenue, Money::from_minor(5498, USD));

        Ok(())
    }

    #[test]
    fn daily_sales_buckets_by_day_and_fills_gaps() -> TestResult {
        let now = now().ok_or("invalid timestamp")?;
        let mut ids = SequentialOrderIds::default();
        let mut ledger = Ledger::new(USD);

        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let key = keys.insert(());
        let ipa = product("IPA Craft Beer", 599);

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now,
            vec![CartLine::new(key, &ipa, 2)],
        ));

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now - Duration::days(2),
            vec![CartLine::new(key, &ipa, 1)],
        ));

        let daily = ledger.daily_sales(7, now);

        assert_eq!(daily.len(), 7);

        let today = daily.last().ok_or("missing today")?;
        assert_eq!(today.total, Money::from_minor(1198, USD));
        assert_eq!(today.items_sold, 2);
        assert_eq!(today.transactions, 1);

        let two_days_ago = daily.get(4).ok_or("missing bucket")?;
        assert_eq!(two_days_ago.total, Money::from_minor(599, USD));
        assert_eq!(two_days_ago.transactions, 1);

        let yesterday = daily.get(5).ok_or("missing bucket")?;
        assert_eq!(yesterday.total, Money::from_minor(0, USD));
        assert_eq!(yesterday.transactions, 0);

        Ok(())
    }

    #[test]
    fn units_sold_counts_completed_lines_only() -> TestResult {
        let now = now().ok_or("invalid timestamp")?;
        let mut ids = SequentialOrderIds::default();
        let mut ledger = Ledger::new(USD);

        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let key = keys.insert(());
        let ipa = product("IPA Craft Beer", 599);

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::Completed,
            now,
            vec![CartLine::new(key, &ipa, 3)],
        ));

        ledger.add_order(order(
            ids.next_id(),
            OrderStatus::OpenTab,
            now,
            vec![CartLine::new(key, &ipa, 9)],
        ));

        assert_eq!(ledger.units_sold(), 3);

        Ok(())
    }
}
