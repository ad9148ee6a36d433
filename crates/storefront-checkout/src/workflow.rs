//! Checkout state machine.
//!
//! ```text
//! CollectingDetails ──proceed──▶ AwaitingPaymentSelection ──submit──▶ Submitting ──▶ Redirected
//!         ▲                                │          ▲                    │
//!         └────────────back────────────────┘          └──────failure───────┘
//! ```
//!
//! Submission runs uploads, the stock check, the header insert, the item
//! insert, and the stock decrement strictly in that order. Nothing is rolled
//! back: a failed item insert leaves the order header behind, and a failed
//! stock decrement is only logged.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{
    order_code, Cart, CartActions, NewOrder, NewOrderItem, OrderRecord, ServiceType,
    StockAdjustment,
};

use crate::error::{CheckoutError, DocumentKind, ValidationFailure};
use crate::ports::{CheckoutServices, DocumentUploader, ImagePayload, OrderGateway};
use crate::summary::{compose_summary, messenger_link, HandoffSettings, SummaryInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStep {
    CollectingDetails,
    AwaitingPaymentSelection,
    Submitting,
    Redirected,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutStep::CollectingDetails => write!(f, "collecting details"),
            CheckoutStep::AwaitingPaymentSelection => write!(f, "awaiting payment selection"),
            CheckoutStep::Submitting => write!(f, "submitting"),
            CheckoutStep::Redirected => write!(f, "redirected"),
        }
    }
}

/// What the renter typed into the details form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenterDetails {
    pub customer_name: String,
    pub contact_number: String,
    pub service_type: ServiceType,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub landmark: Option<String>,
    pub rental_start_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
}

impl RenterDetails {
    #[must_use]
    pub fn new(rental_start_date: NaiveDate) -> Self {
        Self {
            customer_name: String::new(),
            contact_number: String::new(),
            service_type: ServiceType::Pickup,
            address: None,
            landmark: None,
            rental_start_date,
            notes: None,
            reference_number: None,
        }
    }

    /// Notes as persisted: the landmark, when given, is appended.
    #[must_use]
    pub fn merged_notes(&self) -> Option<String> {
        let notes = self.notes.as_deref().filter(|n| !n.is_empty());
        match self.landmark.as_deref().filter(|l| !l.is_empty()) {
            Some(landmark) => Some(match notes {
                Some(n) => format!("{n} | Landmark: {landmark}"),
                None => format!("Landmark: {landmark}"),
            }),
            None => notes.map(str::to_string),
        }
    }

    fn delivery_address(&self) -> Option<String> {
        if self.service_type == ServiceType::Delivery {
            self.address.clone()
        } else {
            None
        }
    }
}

/// A payment option as listed by the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentChoice {
    pub id: String,
    pub name: String,
}

/// A selectable document: the chosen file and, once uploaded, its URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSlot {
    file: Option<ImagePayload>,
    uploaded_url: Option<String>,
}

impl DocumentSlot {
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.file.is_some()
    }

    #[must_use]
    pub fn uploaded_url(&self) -> Option<&str> {
        self.uploaded_url.as_deref()
    }

    fn needs_upload(&self) -> bool {
        self.file.is_some() && self.uploaded_url.is_none()
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub order_id: String,
    pub order_code: String,
    pub summary: String,
    pub url: String,
}

pub struct Checkout {
    step: CheckoutStep,
    details: RenterDetails,
    payment: Option<PaymentChoice>,
    renter_id: DocumentSlot,
    receipt: DocumentSlot,
    client_ip: Option<String>,
    notice: Option<String>,
    upload_error: Option<String>,
    settings: HandoffSettings,
}

impl Checkout {
    #[must_use]
    pub fn new(settings: HandoffSettings, details: RenterDetails) -> Self {
        Self {
            step: CheckoutStep::CollectingDetails,
            details,
            payment: None,
            renter_id: DocumentSlot::default(),
            receipt: DocumentSlot::default(),
            client_ip: None,
            notice: None,
            upload_error: None,
            settings,
        }
    }

    #[must_use]
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub fn details(&self) -> &RenterDetails {
        &self.details
    }

    pub fn details_mut(&mut self) -> &mut RenterDetails {
        &mut self.details
    }

    /// Latest user-visible notice (progress or failure).
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Last upload failure reason, if the most recent upload attempt failed.
    #[must_use]
    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    #[must_use]
    pub fn renter_id(&self) -> &DocumentSlot {
        &self.renter_id
    }

    #[must_use]
    pub fn receipt(&self) -> &DocumentSlot {
        &self.receipt
    }

    #[must_use]
    pub fn payment(&self) -> Option<&PaymentChoice> {
        self.payment.as_ref()
    }

    pub fn select_payment(&mut self, choice: PaymentChoice) {
        self.payment = Some(choice);
    }

    /// Attached to the order header when known.
    pub fn set_client_ip(&mut self, ip: Option<String>) {
        self.client_ip = ip;
    }

    pub fn select_renter_id(&mut self, image: ImagePayload) {
        self.renter_id = DocumentSlot {
            file: Some(image),
            uploaded_url: None,
        };
        self.upload_error = None;
    }

    pub fn remove_renter_id(&mut self) {
        self.renter_id = DocumentSlot::default();
        self.upload_error = None;
    }

    pub fn select_receipt(&mut self, image: ImagePayload) {
        self.receipt = DocumentSlot {
            file: Some(image),
            uploaded_url: None,
        };
        self.upload_error = None;
    }

    pub fn remove_receipt(&mut self) {
        self.receipt = DocumentSlot::default();
        self.upload_error = None;
    }

    /// Eagerly uploads any selected document that has no URL yet. Failures are
    /// recorded in [`Checkout::upload_error`] and retried at submission.
    pub async fn upload_pending_documents(&mut self, uploader: &dyn DocumentUploader) {
        for kind in [DocumentKind::RenterId, DocumentKind::Receipt] {
            let slot = self.slot(kind);
            if !slot.needs_upload() {
                continue;
            }
            let Some(file) = slot.file.as_ref() else {
                continue;
            };
            let result = uploader.upload(file).await;
            match result {
                Ok(url) => {
                    tracing::debug!(document = %kind, %url, "background upload finished");
                    self.slot_mut(kind).uploaded_url = Some(url);
                }
                Err(err) => {
                    tracing::warn!(document = %kind, error = %err, "background upload failed");
                    self.upload_error = Some(err.reason);
                }
            }
        }
    }

    /// Checks the entry guard for the payment step.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationFailure`] found.
    pub fn validate_details(&self, cart: &Cart) -> Result<(), ValidationFailure> {
        let details = &self.details;
        if cart.is_empty() {
            return Err(ValidationFailure::EmptyCart);
        }
        if details.customer_name.trim().is_empty() {
            return Err(ValidationFailure::MissingName);
        }
        if details.contact_number.trim().is_empty() {
            return Err(ValidationFailure::MissingContactNumber);
        }
        if details.service_type == ServiceType::Delivery
            && details.address.as_deref().is_none_or(|a| a.trim().is_empty())
        {
            return Err(ValidationFailure::MissingAddress);
        }
        if !self.renter_id.is_selected() {
            return Err(ValidationFailure::MissingRenterId);
        }
        Ok(())
    }

    /// `CollectingDetails → AwaitingPaymentSelection`.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidStep`] outside `CollectingDetails`, or
    /// [`CheckoutError::Validation`] when the guard fails.
    pub fn proceed_to_payment(&mut self, cart: &Cart) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::CollectingDetails {
            return Err(CheckoutError::InvalidStep(self.step));
        }
        self.validate_details(cart)?;
        self.step = CheckoutStep::AwaitingPaymentSelection;
        Ok(())
    }

    /// `AwaitingPaymentSelection → CollectingDetails`, keeping entered data.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidStep`] outside `AwaitingPaymentSelection`.
    pub fn back_to_details(&mut self) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::AwaitingPaymentSelection {
            return Err(CheckoutError::InvalidStep(self.step));
        }
        self.step = CheckoutStep::CollectingDetails;
        Ok(())
    }

    /// Places the order and hands off to the messaging channel.
    ///
    /// On success the cart is cleared and the checkout ends in `Redirected`.
    /// On failure the notice is set, entered data is kept, and the checkout
    /// returns to `AwaitingPaymentSelection`.
    ///
    /// # Errors
    ///
    /// Any [`CheckoutError`]; see [`CheckoutError::notice`] for what the
    /// renter is shown.
    pub async fn submit(
        &mut self,
        cart: &mut Cart,
        services: CheckoutServices<'_>,
    ) -> Result<Redirect, CheckoutError> {
        if self.step != CheckoutStep::AwaitingPaymentSelection {
            return Err(CheckoutError::InvalidStep(self.step));
        }

        self.step = CheckoutStep::Submitting;
        match self.run_submission(cart, services).await {
            Ok(redirect) => {
                cart.clear();
                self.notice = None;
                self.step = CheckoutStep::Redirected;
                Ok(redirect)
            }
            Err(err) => {
                tracing::warn!(error = %err, "order submission failed");
                self.notice = Some(err.notice());
                self.step = CheckoutStep::AwaitingPaymentSelection;
                Err(err)
            }
        }
    }

    async fn run_submission(
        &mut self,
        cart: &Cart,
        services: CheckoutServices<'_>,
    ) -> Result<Redirect, CheckoutError> {
        self.validate_details(cart)?;
        let payment = self
            .payment
            .clone()
            .ok_or(ValidationFailure::MissingPaymentMethod)?;

        let renter_id_url = self
            .ensure_uploaded(DocumentKind::RenterId, services.uploader)
            .await?;
        let receipt_url = self
            .ensure_uploaded(DocumentKind::Receipt, services.uploader)
            .await?;

        let adjustments = cart.stock_adjustments();
        check_stock(services.gateway, cart, &adjustments).await?;

        let total = cart.total_price();
        let order = self.new_order(&payment, total, receipt_url.clone(), renter_id_url.clone());
        let record: OrderRecord = services.gateway.insert_order(&order).await?;
        tracing::info!(
            order_id = %record.id,
            lines = cart.lines().len(),
            total = %total,
            "order header created"
        );

        let items: Vec<NewOrderItem> = cart
            .lines()
            .iter()
            .map(|line| NewOrderItem::from_line(&record.id, line))
            .collect();
        if let Err(err) = services.gateway.insert_order_items(&items).await {
            tracing::error!(
                order_id = %record.id,
                error = %err,
                "order header persisted without its items"
            );
            return Err(err.into());
        }

        if !adjustments.is_empty() {
            if let Err(err) = services.gateway.decrement_stock(&adjustments).await {
                tracing::error!(order_id = %record.id, error = %err, "failed to decrement inventory");
            }
        }

        let summary = compose_summary(
            &self.settings,
            &SummaryInput {
                order_id: &record.id,
                details: &self.details,
                lines: cart.lines(),
                total,
                payment_label: &payment.name,
                receipt_url: receipt_url.as_deref(),
                renter_id_url: renter_id_url.as_deref(),
            },
        );
        let url = messenger_link(&self.settings.messenger_page_id, &summary);

        if !services.handoff.copy_to_clipboard(&summary) {
            tracing::debug!("clipboard unavailable; continuing with redirect");
        }
        services.handoff.redirect(&url);

        Ok(Redirect {
            order_code: order_code(&record.id),
            order_id: record.id,
            summary,
            url,
        })
    }

    /// Uploads the document now if it was chosen but has no URL yet.
    async fn ensure_uploaded(
        &mut self,
        kind: DocumentKind,
        uploader: &dyn DocumentUploader,
    ) -> Result<Option<String>, CheckoutError> {
        if !self.slot(kind).needs_upload() {
            return Ok(self.slot(kind).uploaded_url.clone());
        }

        self.upload_error = None;
        self.notice = Some(match kind {
            DocumentKind::RenterId => "Verifying ID status (Uploading)...".to_string(),
            DocumentKind::Receipt => "Verifying receipt status (Uploading)...".to_string(),
        });

        let Some(file) = self.slot(kind).file.as_ref() else {
            return Ok(None);
        };
        let result = uploader.upload(file).await;
        match result {
            Ok(url) => {
                self.slot_mut(kind).uploaded_url = Some(url.clone());
                Ok(Some(url))
            }
            Err(err) => {
                self.upload_error = Some(err.reason.clone());
                Err(CheckoutError::UploadFailed {
                    document: kind,
                    reason: err.reason,
                })
            }
        }
    }

    fn slot(&self, kind: DocumentKind) -> &DocumentSlot {
        match kind {
            DocumentKind::RenterId => &self.renter_id,
            DocumentKind::Receipt => &self.receipt,
        }
    }

    fn slot_mut(&mut self, kind: DocumentKind) -> &mut DocumentSlot {
        match kind {
            DocumentKind::RenterId => &mut self.renter_id,
            DocumentKind::Receipt => &mut self.receipt,
        }
    }

    fn new_order(
        &self,
        payment: &PaymentChoice,
        total: Decimal,
        receipt_url: Option<String>,
        renter_id_url: Option<String>,
    ) -> NewOrder {
        let details = &self.details;
        NewOrder {
            customer_name: details.customer_name.clone(),
            contact_number: details.contact_number.clone(),
            service_type: details.service_type,
            address: details.delivery_address(),
            pickup_time: None,
            party_size: None,
            dine_in_time: None,
            payment_method: payment.id.clone(),
            reference_number: details.reference_number.clone(),
            notes: details.merged_notes(),
            total,
            ip_address: self.client_ip.clone(),
            receipt_url,
            renter_id_url,
            rental_start_date: Some(details.rental_start_date),
        }
    }
}

/// Fails with the first item whose backend row tracks stock and cannot cover
/// the request. Items without a returned row are not checked.
async fn check_stock(
    gateway: &dyn OrderGateway,
    cart: &Cart,
    adjustments: &[StockAdjustment],
) -> Result<(), CheckoutError> {
    if adjustments.is_empty() {
        return Ok(());
    }

    let ids: Vec<String> = adjustments.iter().map(|a| a.id.clone()).collect();
    let snapshot = gateway.stock_levels(&ids).await?;

    let short = adjustments.iter().find(|adjustment| {
        snapshot
            .iter()
            .any(|row| row.id == adjustment.id && row.is_short_of(adjustment.quantity))
    });

    match short {
        Some(adjustment) => {
            let item_name = cart
                .lines()
                .iter()
                .find(|l| l.item_id() == adjustment.id)
                .map_or_else(|| "one of the items".to_string(), |l| l.name().to_string());
            Err(CheckoutError::InsufficientStock { item_name })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;
