//! In-memory cart: line identity, merge rule, and aggregate totals.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{AddOn, CatalogItem, Variation};
use crate::orders::StockAdjustment;
use crate::pricing::unit_price;

const NO_VARIATION: &str = "none";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("{0} is not available")]
    Unavailable(String),

    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("no cart line with id {0}")]
    UnknownLine(CartLineId),
}

/// Identity of a cart line: `"{item}|{variation}|{add-on}:{qty},..."`.
///
/// Add-ons are sorted by id so selection order never matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CartLineId(String);

impl CartLineId {
    /// `add_ons` must already be resolved (see [`resolve_add_ons`]).
    fn compose(item_id: &str, variation: Option<&Variation>, add_ons: &[AddOn]) -> Self {
        let variation_id = variation.map_or(NO_VARIATION, |v| v.id.as_str());
        let add_on_key = add_ons
            .iter()
            .map(|a| format!("{}:{}", a.id, a.quantity))
            .collect::<Vec<_>>()
            .join(",");
        Self(format!("{item_id}|{variation_id}|{add_on_key}"))
    }

    /// Identity the given selection would get, without touching any cart.
    #[must_use]
    pub fn for_selection(item_id: &str, variation: Option<&Variation>, add_ons: &[AddOn]) -> Self {
        Self::compose(item_id, variation, &resolve_add_ons(add_ons))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CartLineId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Collapses an add-on multiset: repeated ids are summed, zero quantities are
/// dropped, and the result is sorted by id.
#[must_use]
pub fn resolve_add_ons(add_ons: &[AddOn]) -> Vec<AddOn> {
    let mut merged: BTreeMap<&str, AddOn> = BTreeMap::new();
    for add_on in add_ons {
        merged
            .entry(add_on.id.as_str())
            .and_modify(|existing| {
                existing.quantity = existing.quantity.saturating_add(add_on.quantity);
            })
            .or_insert_with(|| add_on.clone());
    }
    merged.into_values().filter(|a| a.quantity > 0).collect()
}

/// One entry in the cart. The unit price is fixed when the line is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    id: CartLineId,
    item_id: String,
    name: String,
    description: Option<String>,
    quantity: u32,
    variation: Option<Variation>,
    add_ons: Vec<AddOn>,
    unit_price: Decimal,
}

impl CartLine {
    #[must_use]
    pub fn id(&self) -> &CartLineId {
        &self.id
    }

    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub fn variation(&self) -> Option<&Variation> {
        self.variation.as_ref()
    }

    /// Selected add-ons, sorted by id, each with quantity ≥ 1.
    #[must_use]
    pub fn add_ons(&self) -> &[AddOn] {
        &self.add_ons
    }

    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The cart-mutation capability handed to anything that edits the cart.
pub trait CartActions {
    /// Adds `quantity` of the customized item, merging into an existing line
    /// with the same identity. Returns the identity of the affected line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Unavailable`] for items marked unavailable and
    /// [`CartError::ZeroQuantity`] when `quantity` is zero.
    fn add_line(
        &mut self,
        item: &CatalogItem,
        quantity: u32,
        variation: Option<&Variation>,
        add_ons: &[AddOn],
    ) -> Result<CartLineId, CartError>;

    /// Sets a line's quantity; values ≤ 0 remove the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] when no line has the given id.
    fn update_quantity(&mut self, id: &CartLineId, quantity: i64) -> Result<(), CartError>;

    /// Returns the removed line, if it existed.
    fn remove_line(&mut self, id: &CartLineId) -> Option<CartLine>;

    fn clear(&mut self);

    /// Σ `unit_price × quantity` over all lines.
    fn total_price(&self) -> Decimal;

    /// Σ quantities over all lines.
    fn total_item_count(&self) -> u64;
}

/// Process-local cart state. Lines keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity of a catalog item across all of its customizations.
    #[must_use]
    pub fn quantity_for_item(&self, item_id: &str) -> u32 {
        self.lines
            .iter()
            .filter(|l| l.item_id == item_id)
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Requested quantity per catalog item, ordered by item id. Whether an
    /// item counts stock is left to the backend row.
    #[must_use]
    pub fn stock_adjustments(&self) -> Vec<StockAdjustment> {
        let mut per_item: BTreeMap<&str, u32> = BTreeMap::new();
        for line in &self.lines {
            let entry = per_item.entry(line.item_id.as_str()).or_insert(0);
            *entry = entry.saturating_add(line.quantity);
        }
        per_item
            .into_iter()
            .map(|(id, quantity)| StockAdjustment {
                id: id.to_string(),
                quantity,
            })
            .collect()
    }

    fn position(&self, id: &CartLineId) -> Option<usize> {
        self.lines.iter().position(|l| &l.id == id)
    }
}

impl CartActions for Cart {
    fn add_line(
        &mut self,
        item: &CatalogItem,
        quantity: u32,
        variation: Option<&Variation>,
        add_ons: &[AddOn],
    ) -> Result<CartLineId, CartError> {
        if !item.available {
            return Err(CartError::Unavailable(item.name.clone()));
        }
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let add_ons = resolve_add_ons(add_ons);
        let id = CartLineId::compose(&item.id, variation, &add_ons);

        if let Some(index) = self.position(&id) {
            let line = &mut self.lines[index];
            line.quantity = line.quantity.saturating_add(quantity);
            return Ok(id);
        }

        let price = unit_price(item, variation, &add_ons);
        self.lines.push(CartLine {
            id: id.clone(),
            item_id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            quantity,
            variation: variation.cloned(),
            add_ons,
            unit_price: price,
        });
        Ok(id)
    }

    fn update_quantity(&mut self, id: &CartLineId, quantity: i64) -> Result<(), CartError> {
        let index = self
            .position(id)
            .ok_or_else(|| CartError::UnknownLine(id.clone()))?;
        if quantity <= 0 {
            self.lines.remove(index);
        } else {
            self.lines[index].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        Ok(())
    }

    fn remove_line(&mut self, id: &CartLineId) -> Option<CartLine> {
        let index = self.position(id)?;
        Some(self.lines.remove(index))
    }

    fn clear(&mut self) {
        self.lines.clear();
    }

    fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
