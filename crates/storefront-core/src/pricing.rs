//! Unit price computation and price display helpers.
//!
//! Prices are kept at full [`Decimal`] precision through every calculation;
//! rounding happens only in [`display_amount`] and [`plain_amount`].

use rust_decimal::{Decimal, RoundingStrategy};

use crate::catalog::{AddOn, CatalogItem, Variation};

/// Base price the item sells at before variations and add-ons.
///
/// Priority: an explicit discount (`is_on_discount` with a `discount_price`),
/// then a feed-level `effective_price` strictly below `base_price`, then
/// `base_price` itself.
#[must_use]
pub fn effective_price(item: &CatalogItem) -> Decimal {
    if item.is_on_discount {
        if let Some(discount) = item.discount_price {
            return discount;
        }
    }
    match item.effective_price {
        Some(price) if price < item.base_price => price,
        _ => item.base_price,
    }
}

/// `effective_price + variation delta + Σ add-on price × add-on quantity`.
#[must_use]
pub fn unit_price(item: &CatalogItem, variation: Option<&Variation>, add_ons: &[AddOn]) -> Decimal {
    let variation_delta = variation.map_or(Decimal::ZERO, |v| v.price);
    let add_on_total: Decimal = add_ons
        .iter()
        .map(|a| a.price * Decimal::from(a.quantity))
        .sum();
    effective_price(item) + variation_delta + add_on_total
}

/// Whole-number percentage saved, or `None` when `base_price` is zero.
#[must_use]
pub fn discount_percentage(base_price: Decimal, discounted_price: Decimal) -> Option<Decimal> {
    if base_price.is_zero() {
        return None;
    }
    let ratio = (base_price - discounted_price) / base_price * Decimal::ONE_HUNDRED;
    Some(ratio.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// What a catalog card shows when the item is discounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountBadge {
    pub original_price: Decimal,
    pub discounted_price: Decimal,
    /// `None` when the original price is zero.
    pub percent_off: Option<Decimal>,
}

/// Returns the badge to show when either an explicit or an implicit discount
/// applies, otherwise `None`.
#[must_use]
pub fn discount_badge(item: &CatalogItem) -> Option<DiscountBadge> {
    let explicit = item.discount_price.filter(|_| item.is_on_discount);
    let implicit = item.effective_price.filter(|p| *p < item.base_price);
    let discounted_price = explicit.or(implicit)?;
    Some(DiscountBadge {
        original_price: item.base_price,
        discounted_price,
        percent_off: discount_percentage(item.base_price, discounted_price),
    })
}

/// Rounds to cents and drops trailing zeros: `1250.00` → `"1250"`,
/// `99.50` → `"99.5"`.
#[must_use]
pub fn plain_amount(amount: Decimal) -> String {
    amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
        .to_string()
}

/// Like [`plain_amount`] but with `,` thousands separators: `12500` → `"12,500"`.
#[must_use]
pub fn display_amount(amount: Decimal) -> String {
    let plain = plain_amount(amount);
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
