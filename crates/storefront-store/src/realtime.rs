//! Push-then-refetch: change notifications trigger a full reload of the order
//! list, published to every watcher.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use storefront_core::OrderWithItems;
use tokio::sync::watch;

use crate::client::StoreClient;
use crate::error::StoreError;

/// Tables whose changes invalidate the order list.
pub const WATCHED_TABLES: [&str; 2] = ["orders", "order_items"];

/// A row-level change notification. Only the table matters here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    #[serde(default, rename = "eventType")]
    pub event_type: Option<String>,
}

impl ChangeEvent {
    #[must_use]
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            event_type: None,
        }
    }

    #[must_use]
    pub fn touches_orders(&self) -> bool {
        WATCHED_TABLES.contains(&self.table.as_str())
    }
}

/// Anything that can produce the full order list.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_orders(&self) -> Result<Vec<OrderWithItems>, StoreError>;
}

#[async_trait]
impl OrderSource for StoreClient {
    async fn fetch_orders(&self) -> Result<Vec<OrderWithItems>, StoreError> {
        StoreClient::fetch_orders(self).await
    }
}

/// Loads the list once, then reloads it on every relevant event until the
/// event stream ends or every receiver is gone. Returns the number of
/// successful loads.
pub async fn run_refetch_loop<S>(
    source: &dyn OrderSource,
    mut events: S,
    orders: watch::Sender<Vec<OrderWithItems>>,
) -> usize
where
    S: Stream<Item = ChangeEvent> + Unpin,
{
    let mut loads = 0;
    if !refresh(source, &orders, &mut loads).await {
        return loads;
    }

    while let Some(event) = events.next().await {
        if !event.touches_orders() {
            tracing::trace!(table = %event.table, "ignoring change event");
            continue;
        }
        if !refresh(source, &orders, &mut loads).await {
            break;
        }
    }
    loads
}

/// Returns `false` once nobody is listening any more.
async fn refresh(
    source: &dyn OrderSource,
    orders: &watch::Sender<Vec<OrderWithItems>>,
    loads: &mut usize,
) -> bool {
    match source.fetch_orders().await {
        Ok(list) => {
            *loads += 1;
            tracing::debug!(count = list.len(), "order list refreshed");
            orders.send(list).is_ok()
        }
        Err(e) => {
            tracing::error!(error = %e, "order refetch failed");
            !orders.is_closed()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::stream;

    use super::*;

    struct CountingSource {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl OrderSource for CountingSource {
        async fn fetch_orders(&self) -> Result<Vec<OrderWithItems>, StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(call) {
                return Err(StoreError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn refetches_only_for_order_tables() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail_on: None,
        };
        let (tx, rx) = watch::channel(Vec::new());
        let events = stream::iter(vec![
            ChangeEvent::for_table("orders"),
            ChangeEvent::for_table("menu_items"),
            ChangeEvent::for_table("order_items"),
        ]);

        let loads = run_refetch_loop(&source, events, tx).await;

        assert_eq!(loads, 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        drop(rx);
    }

    #[tokio::test]
    async fn fetch_failures_do_not_stop_the_loop() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail_on: Some(1),
        };
        let (tx, _rx) = watch::channel(Vec::new());
        let events = stream::iter(vec![
            ChangeEvent::for_table("orders"),
            ChangeEvent::for_table("orders"),
        ]);

        let loads = run_refetch_loop(&source, events, tx).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(loads, 2);
    }

    #[tokio::test]
    async fn stops_when_no_receivers_remain() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail_on: None,
        };
        let (tx, rx) = watch::channel(Vec::new());
        drop(rx);
        let events = stream::iter(vec![ChangeEvent::for_table("orders")]);

        let loads = run_refetch_loop(&source, events, tx).await;

        assert_eq!(loads, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn change_events_parse_from_notification_payload() {
        let event: ChangeEvent =
            serde_json::from_str(r#"{"table":"orders","eventType":"UPDATE","schema":"public"}"#)
                .unwrap();
        assert!(event.touches_orders());
        assert_eq!(event.event_type.as_deref(), Some("UPDATE"));
    }
}
