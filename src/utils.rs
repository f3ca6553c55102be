//! Utils

use clap::Parser;

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Fixture set to load the catalog, employees and seed orders from
    #[clap(short, long, default_value = "bar")]
    pub fixture: String,

    /// Employee PIN used to sign in at the terminal
    #[clap(short, long, default_value = "3456")]
    pub pin: String,

    /// Customer age presented at the age check
    #[clap(short, long, default_value_t = 28)]
    pub age: u8,

    /// Tip in minor units (cents)
    #[clap(short, long, default_value_t = 0)]
    pub tip: i64,
}
