//! Offset/limit pagination over the order-list endpoint.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::client::{Order, OrderPage, TransportError};

/// Anything that can serve order pages. The production implementation is
/// `OrderHistoryClient`; tests drive the loop with scripted sources.
#[async_trait]
pub trait PageSource {
    async fn fetch_page(&self, offset: u32, limit: u32) -> Result<OrderPage, TransportError>;
}

/// Lazy walk over the order list. One pass only: once a fetch comes back
/// empty or fails, the walk is over for good.
pub struct Paginator<S> {
    source: S,
    page_size: u32,
    delay: Duration,
    offset: u32,
    started: bool,
    done: bool,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S, page_size: u32, delay: Duration) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            delay,
            offset: 0,
            started: false,
            done: false,
        }
    }

    /// Next non-empty page of orders, or `None` once the upstream is
    /// exhausted. A transport failure also ends the walk: the error is
    /// logged and whatever was fetched before it stands.
    pub async fn next_page(&mut self) -> Option<Vec<Order>> {
        if self.done {
            return None;
        }
        if self.started && !self.delay.is_zero() {
            // Throttle so the order endpoint is not hammered.
            sleep(self.delay).await;
        }
        self.started = true;

        match self.source.fetch_page(self.offset, self.page_size).await {
            Ok(OrderPage::Orders(orders)) => {
                debug!(offset = self.offset, count = orders.len(), "fetched order page");
                self.offset += self.page_size;
                Some(orders)
            }
            Ok(OrderPage::End) => {
                debug!(offset = self.offset, "order list exhausted");
                self.done = true;
                None
            }
            Err(e) => {
                warn!(
                    offset = self.offset,
                    error = %e,
                    "order page fetch failed, keeping partial results"
                );
                self.done = true;
                None
            }
        }
    }
}
