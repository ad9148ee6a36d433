use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A rentable item as listed in the storefront catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// List price before any discount.
    pub base_price: Decimal,
    /// Price from a pre-discounted catalog feed. Only honoured when strictly
    /// below `base_price`.
    #[serde(default)]
    pub effective_price: Option<Decimal>,
    #[serde(default)]
    pub is_on_discount: bool,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub track_inventory: bool,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub variations: Vec<Variation>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
}

fn default_available() -> bool {
    true
}

/// A mutually exclusive option, e.g. a rental duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub id: String,
    pub name: String,
    /// Added to the item's effective price. May be negative.
    pub price: Decimal,
}

/// An independently selectable extra. `quantity` is the per-selection count;
/// catalog entries carry `0` and selections carry the chosen amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: u32,
}

impl AddOn {
    /// Returns a copy of this add-on selected `quantity` times.
    #[must_use]
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}

/// Inventory indicator shown next to tracked items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    Available(i64),
    Limited(i64),
    Waitlist,
}

impl CatalogItem {
    /// Whether adding this item should open the customization step first.
    #[must_use]
    pub fn has_customizations(&self) -> bool {
        !self.variations.is_empty() || !self.add_ons.is_empty()
    }

    #[must_use]
    pub fn variation(&self, id: &str) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == id)
    }

    #[must_use]
    pub fn add_on(&self, id: &str) -> Option<&AddOn> {
        self.add_ons.iter().find(|a| a.id == id)
    }

    /// The variation preselected when customization opens.
    #[must_use]
    pub fn default_variation(&self) -> Option<&Variation> {
        self.variations.first()
    }

    /// Add-ons grouped by category label, categories in first-seen order.
    #[must_use]
    pub fn add_on_groups(&self) -> Vec<(&str, Vec<&AddOn>)> {
        let mut groups: Vec<(&str, Vec<&AddOn>)> = Vec::new();
        for add_on in &self.add_ons {
            match groups
                .iter_mut()
                .find(|(category, _)| *category == add_on.category)
            {
                Some((_, members)) => members.push(add_on),
                None => groups.push((add_on.category.as_str(), vec![add_on])),
            }
        }
        groups
    }

    /// Returns `None` for untracked items or when the stock count is unknown.
    #[must_use]
    pub fn stock_level(&self) -> Option<StockLevel> {
        if !self.track_inventory {
            return None;
        }
        let stock = self.stock_quantity?;
        Some(if stock > self.low_stock_threshold {
            StockLevel::Available(stock)
        } else if stock > 0 {
            StockLevel::Limited(stock)
        } else {
            StockLevel::Waitlist
        })
    }
}
