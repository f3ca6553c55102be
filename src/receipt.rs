//! Receipt

use std::{fmt::Write as _, io};

use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{auth::Roster, orders::Order};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable receipt for a finalized order or an open tab.
#[derive(Debug)]
pub struct Receipt<'a> {
    order: &'a Order<'a>,
}

impl<'a> Receipt<'a> {
    /// Create a receipt for the given order.
    #[must_use]
    pub fn new(order: &'a Order<'a>) -> Self {
        Receipt { order }
    }

    /// Write the receipt to the given sink.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the sink rejects a write.
    pub fn write_to(&self, mut out: impl io::Write, roster: &Roster) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();
        let mut color_ops: SmallVec<[(usize, usize, Color); 16]> = smallvec![];

        builder.push_record(["", "Item", "Qty", "Unit", "Line Total"]);

        for (idx, line) in self.order.lines.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.name().to_string(),
                line.quantity().to_string(),
                format!("{}", line.unit_price()),
                format!("{}", line.line_total()),
            ]);

            // Header is row 0.
            color_ops.push((idx + 1, 0, color_dark_grey()));
        }

        write_receipt_table(&mut out, builder, color_ops)?;
        write_receipt_summary(&mut out, self.order, roster)?;

        Ok(())
    }
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    color_ops: SmallVec<[(usize, usize, Color); 16]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    order: &Order<'_>,
    roster: &Roster,
) -> Result<(), ReceiptError> {
    let subtotal_label = " Subtotal:";
    let tax_label = " Tax:";
    let tip_label = " Tip:";
    let total_label = " \x1b[1mTotal:\x1b[0m";

    let subtotal_val = format!("{}  ", order.subtotal);
    let tax_val = format!("{}  ", order.tax);
    let tip_val = order.tip.as_ref().map(|tip| format!("{tip}  "));
    let total_val = format!("{}  ", order.total);

    let label_width = visible_width(subtotal_label)
        .max(visible_width(tax_label))
        .max(visible_width(total_label));

    let value_width = subtotal_val
        .len()
        .max(tax_val.len())
        .max(total_val.len())
        .max(tip_val.as_deref().map_or(0, str::len));

    write_summary_line(out, subtotal_label, &subtotal_val, label_width, value_width)?;
    write_summary_line(out, tax_label, &tax_val, label_width, value_width)?;

    if let Some(tip_val) = tip_val.as_deref() {
        write_summary_line(out, tip_label, tip_val, label_width, value_width)?;
    }

    write_summary_line(
        out,
        total_label,
        &format!("\x1b[1m{total_val}\x1b[0m"),
        label_width,
        value_width,
    )?;

    let served_by = roster
        .employee(order.employee)
        .map_or("<unknown>", |employee| employee.name.as_str());

    writeln!(out).map_err(|_err| ReceiptError::IO)?;

    if let Some(tab_name) = order.tab_name.as_deref() {
        writeln!(out, " Tab: {tab_name}").map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out, " Paid: {}", order.payment_method.label()).map_err(|_err| ReceiptError::IO)?;
    writeln!(out, " Served by: {served_by}").map_err(|_err| ReceiptError::IO)?;
    writeln!(out, " {}", order.timestamp.format("%Y-%m-%d %H:%M")).map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
///
/// Box-drawing characters occupy the Unicode range U+2500..U+257F; runs of
/// them are grouped under a single grey escape sequence, leaving cell
/// content untouched.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_vis = visible_width(label);
    let value_vis = visible_width(value);

    let label_pad = label_col_width.saturating_sub(label_vis);
    let value_pad = value_col_width.saturating_sub(value_vis);

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use decimal_percentage::Percentage;
    use rusty_money::{Money, iso::USD};
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::{
        auth::{Employee, Role},
        cart::CartLine,
        orders::{OrderId, OrderStatus, PaymentMethod},
        products::{Category, Product, ProductKey},
    };

    use super::*;

    fn sample_order<'a>() -> Result<Order<'a>, Box<dyn std::error::Error>> {
        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let ipa_key = keys.insert(());
        let tonic_key = keys.insert(());

        let ipa = Product {
            name: "IPA Craft Beer".to_string(),
            brand: "Craft Brewery Co.".to_string(),
            category: Category::Beer,
            sub_category: Some("IPA".to_string()),
            price: Money::from_minor(599, USD),
            cost: Money::from_minor(250, USD),
            stock: 48,
            low_stock_threshold: 10,
            barcode: None,
            abv: Percentage::from(0.062),
            volume: "12oz".to_string(),
        };

        let tonic = Product {
            name: "Tonic Water".to_string(),
            brand: "Mixer Co.".to_string(),
            category: Category::Mixers,
            sub_category: None,
            price: Money::from_minor(399, USD),
            cost: Money::from_minor(125, USD),
            stock: 36,
            low_stock_threshold: 10,
            barcode: None,
            abv: Percentage::from(0.0),
            volume: "500ml".to_string(),
        };

        let timestamp = Utc
            .with_ymd_and_hms(2025, 6, 10, 18, 0, 0)
            .single()
            .ok_or("invalid timestamp")?;

        Ok(Order {
            id: OrderId::from(uuid::Uuid::from_u128(1)),
            lines: vec![
                CartLine::new(ipa_key, &ipa, 2),
                CartLine::new(tonic_key, &tonic, 1),
            ],
            subtotal: Money::from_minor(1597, USD),
            tax: Money::from_minor(160, USD),
            total: Money::from_minor(1757, USD),
            payment_method: PaymentMethod::Credit,
            timestamp,
            employee: crate::auth::EmployeeKey::default(),
            customer_age: Some(28),
            id_verified: true,
            tip: None,
            status: OrderStatus::Completed,
            tab_name: None,
        })
    }

    #[test]
    fn write_to_renders_lines_and_summary() -> TestResult {
        let order = sample_order()?;
        let roster = Roster::default();

        let mut out = Vec::new();
        Receipt::new(&order).write_to(&mut out, &roster)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("IPA Craft Beer"));
        assert!(output.contains("Tonic Water"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("Tax:"));
        assert!(output.contains("Total:"));
        assert!(output.contains("Paid: Credit"));

        Ok(())
    }

    #[test]
    fn write_to_names_the_employee_when_known() -> TestResult {
        let mut order = sample_order()?;
        let mut roster = Roster::new();

        order.employee = roster.add_employee(Employee {
            name: "Cashier User".to_string(),
            role: Role::Cashier,
            pin: "3456".to_string(),
            email: None,
        });

        let mut out = Vec::new();
        Receipt::new(&order).write_to(&mut out, &roster)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Served by: Cashier User"));

        Ok(())
    }

    #[test]
    fn write_to_unknown_employee_is_placeholder() -> TestResult {
        let order = sample_order()?;
        let roster = Roster::default();

        let mut out = Vec::new();
        Receipt::new(&order).write_to(&mut out, &roster)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Served by: <unknown>"));

        Ok(())
    }

    #[test]
    fn write_to_includes_tip_row_when_tipped() -> TestResult {
        let mut order = sample_order()?;
        order.tip = Some(Money::from_minor(500, USD));

        let roster = Roster::default();

        let mut out = Vec::new();
        Receipt::new(&order).write_to(&mut out, &roster)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Tip:"));

        Ok(())
    }

    #[test]
    fn write_to_includes_tab_name_for_tabs() -> TestResult {
        let mut order = sample_order()?;
        order.status = OrderStatus::OpenTab;
        order.tab_name = Some("John's Tab".to_string());

        let roster = Roster::default();

        let mut out = Vec::new();
        Receipt::new(&order).write_to(&mut out, &roster)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Tab: John's Tab"));

        Ok(())
    }

    #[test]
    fn colorize_borders_wraps_box_runs() {
        let colored = colorize_borders("──ab──");

        assert!(colored.starts_with("\x1b[90m"));
        assert!(colored.contains("ab"));
        assert!(colored.ends_with("\x1b[0m"));
    }

    #[test]
    fn visible_width_ignores_ansi_escapes() {
        assert_eq!(visible_width("\x1b[1mTotal:\x1b[0m"), 6);
        assert_eq!(visible_width("Total:"), 6);
    }
}
