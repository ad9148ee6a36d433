//! Runs the full order submission against the hosted backend.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use storefront_checkout::{
    Checkout, CheckoutServices, Handoff, HandoffSettings, ImagePayload, PaymentChoice,
    RenterDetails,
};
use storefront_core::{AppConfig, CatalogItem};
use storefront_store::{lookup_client_ip, StoreClient, UploadClient};

use crate::cart::{build_cart, read_json, Selection};

/// Renter details plus the payment choice and document paths.
#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutFile {
    pub renter: RenterDetails,
    pub payment: PaymentChoice,
    pub renter_id_image: PathBuf,
    #[serde(default)]
    pub receipt_image: Option<PathBuf>,
}

/// Terminal hand-off: no clipboard, the redirect target is printed.
struct StdoutHandoff;

impl Handoff for StdoutHandoff {
    fn copy_to_clipboard(&self, _text: &str) -> bool {
        false
    }

    fn redirect(&self, url: &str) {
        println!("Open to send the booking: {url}");
    }
}

pub(crate) fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

fn load_image(path: &Path) -> anyhow::Result<ImagePayload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(ImagePayload {
        file_name,
        content_type: content_type_for(path).to_string(),
        bytes,
    })
}

pub(crate) async fn run_checkout(
    config: &AppConfig,
    catalog: &Path,
    selections: &Path,
    details: &Path,
) -> anyhow::Result<()> {
    let catalog: Vec<CatalogItem> = read_json(catalog)?;
    let selections: Vec<Selection> = read_json(selections)?;
    let input: CheckoutFile = read_json(details)?;
    let mut cart = build_cart(&catalog, &selections)?;

    let upload_config = config.upload.as_ref().context(
        "upload service is not configured (set STOREFRONT_UPLOAD_CLOUD_NAME and STOREFRONT_UPLOAD_PRESET)",
    )?;
    let store = StoreClient::new(config)?;
    let uploader = UploadClient::new(upload_config, config.request_timeout_secs)?;

    let settings = HandoffSettings {
        store_name: config.store_name.clone(),
        messenger_page_id: config.messenger_page_id.clone(),
        currency_symbol: config.currency_symbol.clone(),
    };
    let mut checkout = Checkout::new(settings, input.renter);
    checkout.select_renter_id(load_image(&input.renter_id_image)?);
    if let Some(path) = &input.receipt_image {
        checkout.select_receipt(load_image(path)?);
    }
    let client_ip = lookup_client_ip(&config.ip_lookup_url, config.ip_lookup_timeout()).await;
    checkout.set_client_ip(client_ip);

    if let Err(err) = checkout.proceed_to_payment(&cart) {
        anyhow::bail!("{}", err.notice());
    }
    checkout.upload_pending_documents(&uploader).await;
    checkout.select_payment(input.payment);

    let services = CheckoutServices {
        gateway: &store,
        uploader: &uploader,
        handoff: &StdoutHandoff,
    };
    match checkout.submit(&mut cart, services).await {
        Ok(redirect) => {
            println!("Order #{} placed.\n", redirect.order_code);
            println!("{}", redirect.summary);
            Ok(())
        }
        Err(err) => {
            let notice = err.notice();
            Err(anyhow::Error::new(err).context(notice))
        }
    }
}
