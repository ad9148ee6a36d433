//! Collaborators the checkout drives. The hosted backend client implements
//! [`OrderGateway`] and [`DocumentUploader`]; the embedding front end supplies
//! [`Handoff`].

use std::fmt;

use async_trait::async_trait;
use storefront_core::{NewOrder, NewOrderItem, OrderRecord, StockAdjustment, StockRow};

use crate::error::{GatewayError, UploadError};

/// An image chosen by the renter, already compressed by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Stock, order, and order-item persistence.
///
/// Header and item inserts are separate calls; implementations are not
/// expected to make them atomic.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Current inventory for the given catalog item ids.
    async fn stock_levels(&self, item_ids: &[String]) -> Result<Vec<StockRow>, GatewayError>;

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderRecord, GatewayError>;

    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), GatewayError>;

    /// Server-side decrement of tracked stock.
    async fn decrement_stock(&self, adjustments: &[StockAdjustment]) -> Result<(), GatewayError>;
}

#[async_trait]
pub trait DocumentUploader: Send + Sync {
    /// Uploads the image and returns its public URL.
    async fn upload(&self, image: &ImagePayload) -> Result<String, UploadError>;
}

/// The final hand-off to the messaging channel.
pub trait Handoff {
    /// Best effort. Returns `false` when the clipboard is unavailable.
    fn copy_to_clipboard(&self, text: &str) -> bool;

    /// Navigates away from the storefront. Ends the session.
    fn redirect(&self, url: &str);
}

/// Everything [`crate::Checkout::submit`] talks to.
#[derive(Clone, Copy)]
pub struct CheckoutServices<'a> {
    pub gateway: &'a dyn OrderGateway,
    pub uploader: &'a dyn DocumentUploader,
    pub handoff: &'a dyn Handoff,
}
