//! HTTP client for the hosted REST data API (PostgREST dialect).
//!
//! Every request carries the project key twice, as `apikey` and as a bearer
//! token. Non-2xx responses are surfaced as [`StoreError::Api`] with the
//! backend's `message` so callers can classify them.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use storefront_core::{
    AppConfig, NewOrder, NewOrderItem, OrderRecord, OrderWithItems, StockAdjustment, StockRow,
};

use crate::error::StoreError;

const REST_PATH: &str = "rest/v1/";

/// Error envelope returned by the data API (`{message, code, details, hint}`).
/// Only the message is surfaced.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Client for the orders, order items and catalog stock tables.
///
/// Use [`StoreClient::new`] with the loaded configuration or
/// [`StoreClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct StoreClient {
    client: Client,
    api_key: String,
    rest_url: Url,
}

impl StoreClient {
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StoreError::InvalidBaseUrl`] if the
    /// configured API URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, StoreError> {
        Self::with_base_url(&config.api_url, &config.api_key, config.request_timeout_secs)
    }

    /// Creates a client rooted at `base_url` (the project URL, without the
    /// `/rest/v1` suffix).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StoreError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("storefront/0.1")
            .build()?;

        let normalised = format!("{}/{REST_PATH}", base_url.trim_end_matches('/'));
        let rest_url = Url::parse(&normalised).map_err(|e| StoreError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            rest_url,
        })
    }

    /// Current inventory fields for the given catalog item ids.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Api`] on a non-2xx status.
    /// - [`StoreError::Http`] on network failure.
    /// - [`StoreError::Deserialize`] if the rows do not match [`StockRow`].
    pub async fn stock_levels(&self, item_ids: &[String]) -> Result<Vec<StockRow>, StoreError> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = format!("in.({})", item_ids.join(","));
        let url = self.endpoint(
            "menu_items",
            &[
                ("select", "id,track_inventory,stock_quantity"),
                ("id", &filter),
            ],
        )?;
        let response = send(self.request(Method::GET, url)).await?;
        read_json(response, "menu_items stock").await
    }

    /// Inserts an order header and returns the created row.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Api`] on a non-2xx status (rate limits and stock
    ///   rejections arrive this way).
    /// - [`StoreError::Http`] on network failure.
    /// - [`StoreError::Deserialize`] if the returned row does not parse.
    /// - [`StoreError::EmptyResponse`] if no row is returned.
    pub async fn insert_order(&self, order: &NewOrder) -> Result<OrderRecord, StoreError> {
        let url = self.endpoint("orders", &[])?;
        let request = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(order);
        let response = send(request).await?;
        let rows: Vec<OrderRecord> = read_json(response, "orders insert").await?;
        let record = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::EmptyResponse("orders insert".to_string()))?;

        tracing::debug!(order_id = %record.id, "order row inserted");
        Ok(record)
    }

    /// Inserts all order lines in one request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] or [`StoreError::Http`] on failure.
    pub async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), StoreError> {
        let url = self.endpoint("order_items", &[])?;
        let request = self
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(items);
        send(request).await?;
        Ok(())
    }

    /// Calls the server-side stock decrement procedure.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] or [`StoreError::Http`] on failure.
    pub async fn decrement_stock(&self, adjustments: &[StockAdjustment]) -> Result<(), StoreError> {
        let url = self.endpoint("rpc/decrement_menu_item_stock", &[])?;
        let body = serde_json::json!({ "items": adjustments });
        send(self.request(Method::POST, url).json(&body)).await?;
        Ok(())
    }

    /// All orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Api`] on a non-2xx status.
    /// - [`StoreError::Http`] on network failure.
    /// - [`StoreError::Deserialize`] if a row does not parse.
    pub async fn fetch_orders(&self) -> Result<Vec<OrderWithItems>, StoreError> {
        let url = self.endpoint(
            "orders",
            &[
                ("select", "*,order_items(*)"),
                ("order", "created_at.desc"),
            ],
        )?;
        let response = send(self.request(Method::GET, url)).await?;
        read_json(response, "orders list").await
    }

    /// Sets an order's status, then returns the refreshed order list.
    ///
    /// # Errors
    ///
    /// Any error from the status patch or from [`StoreClient::fetch_orders`].
    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: &str,
    ) -> Result<Vec<OrderWithItems>, StoreError> {
        let filter = format!("eq.{order_id}");
        let url = self.endpoint("orders", &[("id", &filter)])?;
        let body = serde_json::json!({ "status": status });
        send(self.request(Method::PATCH, url).json(&body)).await?;

        tracing::info!(order_id, status, "order status updated");
        self.fetch_orders().await
    }

    /// Joins `path` onto the REST root and appends percent-encoded query pairs.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, StoreError> {
        let mut url = self
            .rest_url
            .join(path)
            .map_err(|e| StoreError::InvalidBaseUrl {
                url: format!("{}{path}", self.rest_url),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Sends the request and maps a non-2xx status onto [`StoreError::Api`].
async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body
            }
        });
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, StoreError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> StoreClient {
        StoreClient::with_base_url(base_url, "test-key", 30)
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_roots_paths_under_rest_v1() {
        let client = test_client("https://demo.example.co/");
        let url = client.endpoint("orders", &[]).unwrap();
        assert_eq!(url.as_str(), "https://demo.example.co/rest/v1/orders");
    }

    #[test]
    fn endpoint_encodes_filters() {
        let client = test_client("https://demo.example.co");
        let url = client.endpoint("orders", &[("id", "eq.abc 1")]).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, vec![("id".to_string(), "eq.abc 1".to_string())]);
    }

    #[test]
    fn rpc_paths_keep_their_prefix() {
        let client = test_client("https://demo.example.co");
        let url = client
            .endpoint("rpc/decrement_menu_item_stock", &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://demo.example.co/rest/v1/rpc/decrement_menu_item_stock"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = StoreClient::with_base_url("not a url", "k", 5);
        assert!(matches!(result, Err(StoreError::InvalidBaseUrl { .. })));
    }
}
