//! Checkout port implementations backed by the HTTP clients.

use async_trait::async_trait;
use storefront_checkout::{DocumentUploader, GatewayError, ImagePayload, OrderGateway, UploadError};
use storefront_core::{NewOrder, NewOrderItem, OrderRecord, StockAdjustment, StockRow};

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::upload::UploadClient;

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        GatewayError::new(err.backend_message())
    }
}

impl From<StoreError> for UploadError {
    fn from(err: StoreError) -> Self {
        UploadError::new(err.backend_message())
    }
}

#[async_trait]
impl OrderGateway for StoreClient {
    async fn stock_levels(&self, item_ids: &[String]) -> Result<Vec<StockRow>, GatewayError> {
        Ok(StoreClient::stock_levels(self, item_ids).await?)
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderRecord, GatewayError> {
        Ok(StoreClient::insert_order(self, order).await?)
    }

    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), GatewayError> {
        Ok(StoreClient::insert_order_items(self, items).await?)
    }

    async fn decrement_stock(&self, adjustments: &[StockAdjustment]) -> Result<(), GatewayError> {
        Ok(StoreClient::decrement_stock(self, adjustments).await?)
    }
}

#[async_trait]
impl DocumentUploader for UploadClient {
    async fn upload(&self, image: &ImagePayload) -> Result<String, UploadError> {
        Ok(self.upload_image(image).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_the_backend_message() {
        let err = StoreError::Api {
            status: 429,
            message: "Rate limit exceeded".to_string(),
        };
        assert_eq!(GatewayError::from(err).message, "Rate limit exceeded");
    }

    #[test]
    fn other_errors_use_their_display_text() {
        let err = StoreError::EmptyResponse("orders insert".to_string());
        assert_eq!(
            GatewayError::from(err).message,
            "orders insert returned no rows"
        );
    }

    #[test]
    fn upload_rejections_become_upload_reasons() {
        let err = StoreError::UploadRejected("File size too large".to_string());
        assert_eq!(UploadError::from(err).reason, "File size too large");
    }
}
