//! Checkout Demo
//!
//! Runs a full register flow against a fixture set: sign in with a PIN,
//! ring up a sale, pass the age check, take payment, and print the receipt
//! followed by a short sales summary.
//!
//! Use `-f` to load a fixture set by name
//! Use `-p` to sign in with a different PIN
//! Use `-a` to change the customer age presented at the age check
//! Use `-t` to add a tip in cents

use std::io;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use rusty_money::Money;

use tapline::{
    auth::Session,
    cart::Cart,
    checkout::Checkout,
    clock::{Clock, SystemClock},
    fixtures::Fixture,
    orders::{PaymentMethod, UuidOrderIds},
    receipt::Receipt,
    reports::Timeframe,
    utils::DemoArgs,
};

/// Checkout Demo
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = DemoArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;

    let ipa = fixture.product_key("ipa")?;
    let tonic = fixture.product_key("tonic")?;
    let currency = fixture.currency()?;

    let clock = SystemClock;
    let mut ids = UuidOrderIds;

    let (mut catalog, roster, mut ledger) = fixture.into_stores(&clock, &mut ids)?;

    let mut session = Session::new();

    ensure!(session.login(&roster, &args.pin), "unknown PIN");

    let mut cart = Cart::new(currency);

    let ipa_product = catalog.product(ipa).context("missing product")?.clone();
    let tonic_product = catalog.product(tonic).context("missing product")?.clone();

    cart.add_product(ipa, &ipa_product, 2)?;
    cart.add_product(tonic, &tonic_product, 1)?;
    cart.verify_age(args.age);

    let tip = (args.tip > 0).then(|| Money::from_minor(args.tip, currency));

    let mut checkout = Checkout::new(clock, ids);

    let id = checkout.process_payment(
        &mut cart,
        &session,
        &mut catalog,
        &mut ledger,
        PaymentMethod::Credit,
        tip,
    )?;

    let order = ledger.order(id)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::new(order).write_to(&mut handle, &roster)?;

    let now = clock.now();

    println!(
        "\nToday's sales: {}",
        ledger.total_sales(Timeframe::Today, now)
    );

    println!("Top sellers:");

    for sales in ledger.top_selling_products(3) {
        println!("  {} x{} ({})", sales.name, sales.quantity, sales.revenue);
    }

    Ok(())
}
