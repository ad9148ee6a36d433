//! Offline cart building and pricing from JSON files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use storefront_core::{
    discount_badge, display_amount, effective_price, Cart, CartActions, CartLineId, CatalogItem,
    StockLevel,
};

#[derive(Debug, Subcommand)]
pub enum CartCommands {
    /// List catalog items with prices, discounts, stock and options
    Menu {
        /// Catalog JSON (array of catalog items)
        catalog: PathBuf,
        /// Currency symbol for printed amounts
        #[arg(long, default_value = "₱")]
        currency: String,
    },
    /// Price a set of selections against a catalog
    Quote {
        /// Catalog JSON (array of catalog items)
        catalog: PathBuf,
        /// Selections JSON (array of cart selections)
        selections: PathBuf,
        /// Currency symbol for printed amounts
        #[arg(long, default_value = "₱")]
        currency: String,
    },
}

fn one() -> u32 {
    1
}

/// One "add to bag" action.
#[derive(Debug, Deserialize)]
pub(crate) struct Selection {
    pub item: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub variation: Option<String>,
    #[serde(default)]
    pub add_ons: Vec<AddOnSelection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddOnSelection {
    pub id: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Replays selections into a fresh cart, resolving ids against the catalog.
pub(crate) fn build_cart(catalog: &[CatalogItem], selections: &[Selection]) -> anyhow::Result<Cart> {
    let mut cart = Cart::new();
    for selection in selections {
        let item = catalog
            .iter()
            .find(|i| i.id == selection.item)
            .with_context(|| format!("unknown catalog item '{}'", selection.item))?;

        let variation = selection
            .variation
            .as_deref()
            .map(|id| {
                item.variation(id)
                    .with_context(|| format!("'{}' has no variation '{id}'", item.id))
            })
            .transpose()?;

        let add_ons = selection
            .add_ons
            .iter()
            .map(|chosen| {
                item.add_on(&chosen.id)
                    .map(|a| a.with_quantity(chosen.quantity))
                    .with_context(|| format!("'{}' has no add-on '{}'", item.id, chosen.id))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let line_id = CartLineId::for_selection(&item.id, variation, &add_ons);
        if cart.line(&line_id).is_some() {
            tracing::debug!(line = %line_id, "selection merged into existing line");
        }
        cart.add_line(item, selection.quantity, variation, &add_ons)
            .with_context(|| format!("cannot add '{}' to the cart", item.id))?;
    }
    Ok(cart)
}

fn stock_label(level: StockLevel) -> String {
    match level {
        StockLevel::Available(n) => format!("{n} available"),
        StockLevel::Limited(n) => format!("only {n} left"),
        StockLevel::Waitlist => "waitlist".to_string(),
    }
}

pub(crate) fn format_menu(catalog: &[CatalogItem], currency: &str) -> String {
    let mut out = String::new();
    for item in catalog.iter().filter(|i| i.available) {
        let price = display_amount(effective_price(item));
        let mut header = format!("{}  {currency}{price}", item.name);
        if let Some(badge) = discount_badge(item) {
            let original = display_amount(badge.original_price);
            header.push_str(&format!(" (was {currency}{original}"));
            if let Some(percent) = badge.percent_off {
                header.push_str(&format!(", {percent}% off"));
            }
            header.push(')');
        }
        if let Some(level) = item.stock_level() {
            header.push_str(&format!("  [{}]", stock_label(level)));
        }
        out.push_str(&header);
        out.push('\n');

        if let Some(default) = item.default_variation() {
            let names: Vec<&str> = item.variations.iter().map(|v| v.name.as_str()).collect();
            out.push_str(&format!(
                "    options: {} (default {})\n",
                names.join(", "),
                default.name
            ));
        }
        for (category, add_ons) in item.add_on_groups() {
            let names: Vec<String> = add_ons
                .iter()
                .map(|a| format!("{} +{currency}{}", a.name, display_amount(a.price)))
                .collect();
            out.push_str(&format!("    {category}: {}\n", names.join(", ")));
        }
    }
    out
}

/// Requested quantities that exceed the catalog's stock count.
pub(crate) fn stock_warnings(catalog: &[CatalogItem], cart: &Cart) -> Vec<String> {
    let mut warnings = Vec::new();
    for item in catalog {
        let requested = cart.quantity_for_item(&item.id);
        if requested == 0 {
            continue;
        }
        match item.stock_level() {
            Some(StockLevel::Waitlist) => warnings.push(format!("{} is waitlisted", item.name)),
            Some(StockLevel::Available(n) | StockLevel::Limited(n))
                if i64::from(requested) > n =>
            {
                warnings.push(format!("{} x{requested} requested, {n} in stock", item.name));
            }
            _ => {}
        }
    }
    warnings
}

pub(crate) fn format_quote(cart: &Cart, currency: &str) -> String {
    let mut out = String::new();
    for line in cart.lines() {
        let mut label = line.name().to_string();
        if let Some(variation) = line.variation() {
            label.push_str(&format!(" ({})", variation.name));
        }
        for add_on in line.add_ons() {
            label.push_str(&format!(" + {} x{}", add_on.name, add_on.quantity));
        }
        out.push_str(&format!(
            "{:>3} x {label}  @ {currency}{}  = {currency}{}\n",
            line.quantity(),
            display_amount(line.unit_price()),
            display_amount(line.line_total()),
        ));
    }
    out.push_str(&format!(
        "Items: {}\nTotal: {currency}{}\n",
        cart.total_item_count(),
        display_amount(cart.total_price())
    ));
    out
}

pub(crate) fn run_menu(catalog: &Path, currency: &str) -> anyhow::Result<()> {
    let catalog: Vec<CatalogItem> = read_json(catalog)?;
    print!("{}", format_menu(&catalog, currency));
    Ok(())
}

pub(crate) fn run_quote(catalog: &Path, selections: &Path, currency: &str) -> anyhow::Result<()> {
    let catalog: Vec<CatalogItem> = read_json(catalog)?;
    let selections: Vec<Selection> = read_json(selections)?;
    let cart = build_cart(&catalog, &selections)?;
    tracing::debug!(lines = cart.lines().len(), "cart built");
    print!("{}", format_quote(&cart, currency));
    for warning in stock_warnings(&catalog, &cart) {
        println!("warning: {warning}");
    }
    Ok(())
}
