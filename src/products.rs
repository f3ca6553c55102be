//! Products

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Beers and ciders
    Beer,

    /// Still and sparkling wines
    Wine,

    /// Distilled spirits
    Spirits,

    /// Non-alcoholic mixers
    Mixers,

    /// Everything else
    Other,
}

impl Category {
    /// Human-readable label for display surfaces.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Beer => "Beer",
            Category::Wine => "Wine",
            Category::Spirits => "Spirits",
            Category::Mixers => "Mixers",
            Category::Other => "Other",
        }
    }
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Brand or producer name
    pub brand: String,

    /// Category used for menu filtering
    pub category: Category,

    /// Optional finer-grained category (e.g. "IPA", "Whiskey")
    pub sub_category: Option<String>,

    /// Retail price
    pub price: Money<'a, Currency>,

    /// Acquisition cost
    pub cost: Money<'a, Currency>,

    /// Units on hand
    pub stock: u32,

    /// Stock level at or below which the product counts as low stock
    pub low_stock_threshold: u32,

    /// Optional scan code, matched exactly by search
    pub barcode: Option<String>,

    /// Alcohol by volume as a fraction (`0` for mixers)
    pub abv: Percentage,

    /// Container volume label (e.g. "750ml", "12oz")
    pub volume: String,
}

impl Product<'_> {
    /// Whether selling this product is gated behind an age check.
    #[must_use]
    pub fn is_alcoholic(&self) -> bool {
        self.abv * Decimal::ONE > Decimal::ZERO
    }

    /// Whether the product is at or below its low-stock threshold.
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }

    /// Whether the product matches a free-text search term.
    ///
    /// Name and brand are matched case-insensitively as substrings; the
    /// barcode must match exactly. An empty term matches everything.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();

        self.name.to_lowercase().contains(&needle)
            || self.brand.to_lowercase().contains(&needle)
            || self.barcode.as_deref() == Some(term)
    }
}
