//! Order rows as stored by the hosted backend.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    DineIn,
    Pickup,
    Delivery,
}

impl ServiceType {
    /// Capitalized label used in order summaries, e.g. `"Delivery"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ServiceType::DineIn => "Dine-in",
            ServiceType::Pickup => "Pickup",
            ServiceType::Delivery => "Delivery",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::DineIn => write!(f, "dine-in"),
            ServiceType::Pickup => write!(f, "pickup"),
            ServiceType::Delivery => write!(f, "delivery"),
        }
    }
}

/// Inventory snapshot returned by the stock query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRow {
    pub id: String,
    #[serde(default)]
    pub track_inventory: bool,
    /// `NULL` stock on a tracked item counts as zero.
    pub stock_quantity: Option<i64>,
}

impl StockRow {
    /// `true` when the item is tracked and cannot cover `requested`.
    #[must_use]
    pub fn is_short_of(&self, requested: u32) -> bool {
        self.track_inventory && self.stock_quantity.unwrap_or(0) < i64::from(requested)
    }
}

/// Quantity to take off a catalog item's stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: String,
    pub quantity: u32,
}

/// Order header insert payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub contact_number: String,
    pub service_type: ServiceType,
    pub address: Option<String>,
    pub pickup_time: Option<String>,
    pub party_size: Option<i32>,
    pub dine_in_time: Option<DateTime<Utc>>,
    pub payment_method: String,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub total: Decimal,
    pub ip_address: Option<String>,
    pub receipt_url: Option<String>,
    pub renter_id_url: Option<String>,
    pub rental_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationSnapshot {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnSnapshot {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Order line insert payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrderItem {
    pub order_id: String,
    pub item_id: String,
    pub name: String,
    pub description: Option<String>,
    pub variation: Option<VariationSnapshot>,
    /// `None` rather than an empty list when no add-ons were chosen.
    pub add_ons: Option<Vec<AddOnSnapshot>>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

impl NewOrderItem {
    /// Snapshots a cart line under the given order.
    #[must_use]
    pub fn from_line(order_id: &str, line: &CartLine) -> Self {
        let add_ons: Vec<AddOnSnapshot> = line
            .add_ons()
            .iter()
            .map(|a| AddOnSnapshot {
                id: a.id.clone(),
                name: a.name.clone(),
                price: a.price,
                quantity: a.quantity,
            })
            .collect();

        Self {
            order_id: order_id.to_string(),
            item_id: line.item_id().to_string(),
            name: line.name().to_string(),
            description: line.description().map(str::to_string),
            variation: line.variation().map(|v| VariationSnapshot {
                id: v.id.clone(),
                name: v.name.clone(),
                price: v.price,
            }),
            add_ons: (!add_ons.is_empty()).then_some(add_ons),
            unit_price: line.unit_price(),
            quantity: line.quantity(),
            subtotal: line.line_total(),
        }
    }
}

/// A persisted order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub customer_name: String,
    pub contact_number: String,
    pub service_type: ServiceType,
    pub address: Option<String>,
    pub pickup_time: Option<String>,
    pub party_size: Option<i32>,
    pub dine_in_time: Option<DateTime<Utc>>,
    pub payment_method: String,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub total: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub renter_id_url: Option<String>,
    #[serde(default)]
    pub rental_start_date: Option<NaiveDate>,
}

impl OrderRecord {
    /// Last eight characters of the id, upper-cased.
    #[must_use]
    pub fn order_code(&self) -> String {
        order_code(&self.id)
    }
}

/// Last eight characters of an order id, upper-cased. Shorter ids are used whole.
#[must_use]
pub fn order_code(order_id: &str) -> String {
    let count = order_id.chars().count();
    order_id
        .chars()
        .skip(count.saturating_sub(8))
        .collect::<String>()
        .to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub id: String,
    pub item_id: String,
    pub name: String,
    pub description: Option<String>,
    pub variation: Option<VariationSnapshot>,
    pub add_ons: Option<Vec<AddOnSnapshot>>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

/// An order header with its lines, as returned by the embedded select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: OrderRecord,
    #[serde(default)]
    pub order_items: Vec<OrderItemRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Cart, CartActions};
    use crate::catalog::fixtures::{add_on, item, variation};

    #[test]
    fn order_code_takes_last_eight_upper_cased() {
        assert_eq!(
            order_code("7f3c2a9e-51b4-4d0c-9a77-0c9e1d2b4fab"),
            "1D2B4FAB"
        );
    }

    #[test]
    fn order_code_uses_short_ids_whole() {
        assert_eq!(order_code("ab12"), "AB12");
    }

    #[test]
    fn stock_row_short_only_when_tracked() {
        let untracked = StockRow {
            id: "tent".to_string(),
            track_inventory: false,
            stock_quantity: Some(0),
        };
        assert!(!untracked.is_short_of(5));

        let tracked = StockRow {
            id: "tent".to_string(),
            track_inventory: true,
            stock_quantity: Some(2),
        };
        assert!(tracked.is_short_of(3));
        assert!(!tracked.is_short_of(2));
    }

    #[test]
    fn null_stock_on_tracked_item_counts_as_zero() {
        let row = StockRow {
            id: "tent".to_string(),
            track_inventory: true,
            stock_quantity: None,
        };
        assert!(row.is_short_of(1));
    }

    #[test]
    fn new_order_item_snapshots_line() {
        let mut cart = Cart::new();
        let id = cart
            .add_line(
                &item("tent", 500),
                3,
                Some(&variation("3d", 150)),
                &[add_on("a", 50, 2)],
            )
            .unwrap();
        let line = cart.line(&id).unwrap();

        let row = NewOrderItem::from_line("order-1", line);
        assert_eq!(row.order_id, "order-1");
        assert_eq!(row.unit_price, Decimal::from(750));
        assert_eq!(row.subtotal, Decimal::from(2250));
        assert_eq!(row.variation.as_ref().map(|v| v.id.as_str()), Some("3d"));
        assert_eq!(row.add_ons.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn new_order_item_omits_empty_add_ons() {
        let mut cart = Cart::new();
        let id = cart.add_line(&item("tent", 500), 1, None, &[]).unwrap();
        let row = NewOrderItem::from_line("order-1", cart.line(&id).unwrap());
        assert!(row.add_ons.is_none());
        assert!(row.variation.is_none());
    }

    #[test]
    fn service_type_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&ServiceType::DineIn).unwrap();
        assert_eq!(json, "\"dine-in\"");
        let parsed: ServiceType = serde_json::from_str("\"delivery\"").unwrap();
        assert_eq!(parsed, ServiceType::Delivery);
    }

    #[test]
    fn order_with_items_parses_embedded_select() {
        let json = serde_json::json!({
            "id": "7f3c2a9e-51b4-4d0c-9a77-0c9e1d2b4fab",
            "customer_name": "Ana Cruz",
            "contact_number": "09171234567",
            "service_type": "pickup",
            "address": null,
            "pickup_time": null,
            "party_size": null,
            "dine_in_time": null,
            "payment_method": "gcash",
            "reference_number": null,
            "notes": null,
            "total": 2250,
            "status": "pending",
            "created_at": "2026-03-01T08:00:00Z",
            "receipt_url": null,
            "renter_id_url": "https://img.example/id.jpg",
            "rental_start_date": "2026-03-05",
            "ip_address": "203.0.113.9",
            "order_items": [{
                "id": "oi-1",
                "order_id": "7f3c2a9e-51b4-4d0c-9a77-0c9e1d2b4fab",
                "item_id": "tent",
                "name": "Dome Tent",
                "description": null,
                "variation": { "id": "3d", "name": "3 days", "price": 150 },
                "add_ons": null,
                "unit_price": 750,
                "quantity": 3,
                "subtotal": 2250
            }]
        });

        let parsed: OrderWithItems = serde_json::from_value(json).expect("valid order row");
        assert_eq!(parsed.order.order_code(), "1D2B4FAB");
        assert_eq!(parsed.order.total, Decimal::from(2250));
        assert_eq!(parsed.order_items.len(), 1);
        assert_eq!(parsed.order_items[0].quantity, 3);
    }
}
