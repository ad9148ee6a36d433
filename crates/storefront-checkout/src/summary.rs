//! The plain-text order summary and the messaging deep link that carries it.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rust_decimal::Decimal;
use storefront_core::{order_code, plain_amount, CartLine, ServiceType};

use crate::workflow::RenterDetails;

/// Characters `encodeURIComponent` leaves alone besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Branding used in the summary and the messaging link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffSettings {
    pub store_name: String,
    pub messenger_page_id: String,
    pub currency_symbol: String,
}

impl Default for HandoffSettings {
    fn default() -> Self {
        Self {
            store_name: "Recreational Gear rental".to_string(),
            messenger_page_id: "Recreationalgearrental".to_string(),
            currency_symbol: "₱".to_string(),
        }
    }
}

/// Everything the summary reports about one placed order.
pub struct SummaryInput<'a> {
    pub order_id: &'a str,
    pub details: &'a RenterDetails,
    pub lines: &'a [CartLine],
    pub total: Decimal,
    pub payment_label: &'a str,
    pub receipt_url: Option<&'a str>,
    pub renter_id_url: Option<&'a str>,
}

/// Percent-encodes `text` the way `encodeURIComponent` does.
#[must_use]
pub fn encode_uri_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// `https://m.me/<page-id>?text=<encoded summary>`.
#[must_use]
pub fn messenger_link(page_id: &str, text: &str) -> String {
    format!("https://m.me/{page_id}?text={}", encode_uri_component(text))
}

fn describe_line(line: &CartLine, currency: &str) -> String {
    let mut text = format!("• {}", line.name());
    if let Some(variation) = line.variation() {
        text.push_str(&format!(" ({})", variation.name));
    }
    if !line.add_ons().is_empty() {
        let add_ons = line
            .add_ons()
            .iter()
            .map(|a| {
                if a.quantity > 1 {
                    format!("{} x{}", a.name, a.quantity)
                } else {
                    a.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        text.push_str(&format!(" + {add_ons}"));
    }
    text.push_str(&format!(
        " x{} - {currency}{}",
        line.quantity(),
        plain_amount(line.line_total())
    ));
    text
}

/// Builds the multi-line booking message sent to the shop.
#[must_use]
pub fn compose_summary(settings: &HandoffSettings, input: &SummaryInput<'_>) -> String {
    let code = order_code(input.order_id);
    let currency = settings.currency_symbol.as_str();
    let details = input.details;
    let is_delivery = details.service_type == ServiceType::Delivery;

    let mut out: Vec<String> = vec![
        format!("🏕️ {} Booking", settings.store_name),
        format!("📋 Order Code: #{code}"),
        String::new(),
        format!("👤 Renter: {}", details.customer_name),
        format!("📞 Contact: {}", details.contact_number),
        format!("📅 Start Date: {}", details.rental_start_date.format("%Y-%m-%d")),
        format!("📍 Service: {}", details.service_type.label()),
    ];
    if is_delivery {
        out.push(format!(
            "🏠 Address: {}",
            details.address.as_deref().unwrap_or_default()
        ));
        if let Some(landmark) = details.landmark.as_deref().filter(|l| !l.is_empty()) {
            out.push(format!("🗺️ Landmark: {landmark}"));
        }
    }

    out.push(String::new());
    out.push("📋 ORDER DETAILS:".to_string());
    out.extend(input.lines.iter().map(|l| describe_line(l, currency)));

    out.push(String::new());
    out.push("📋 ITEM DESCRIPTIONS:".to_string());
    out.extend(input.lines.iter().map(|l| {
        format!(
            "💡 {}: {}",
            l.name(),
            l.description().filter(|d| !d.is_empty()).unwrap_or("N/A")
        )
    }));

    out.push(String::new());
    out.push(format!("💰 TOTAL: {currency}{}", plain_amount(input.total)));
    if is_delivery {
        out.push("🛵 DELIVERY FEE:".to_string());
    }

    out.push(String::new());
    out.push(format!("💳 Payment: {}", input.payment_label));
    out.push(match input.receipt_url {
        Some(url) => format!("📸 Payment Receipt: {url}"),
        None => "📸 Payment Screenshot: Please attach your payment receipt screenshot".to_string(),
    });
    if let Some(url) = input.renter_id_url {
        out.push(format!("🆔 Renter ID: {url}"));
    }

    if let Some(notes) = details.notes.as_deref().filter(|n| !n.is_empty()) {
        out.push(String::new());
        out.push(format!("📝 Notes: {notes}"));
    }

    out.push(String::new());
    out.push(format!(
        "Please confirm this gear reservation. Thank you for choosing {}! ⛰️",
        settings.store_name
    ));
    out.push(String::new());
    out.push(format!("📋 Order Code: #{code}"));

    out.join("\n")
}
