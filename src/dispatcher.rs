//! Fan out requests with bounded concurrency, deliver responses in
//! request order (§4.4).
//!
//! A `tokio::sync::Semaphore` sized to the concurrency limit gates one
//! `tokio::spawn` per item, each acquiring a permit before doing the
//! work; the spawned handles are collected for the caller to await or
//! cancel. Here the "await" side is [`ResponseDriver`], which pulls slot
//! `k` for `k = 0, 1, 2, ...` rather than awaiting every handle up front,
//! so a consumer can start reading index 0 before index 9 has even
//! started.

use std::future::Future;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::cache::Cache;
use crate::config::DriverConfig;
use crate::error::Error;
use crate::fingerprint;
use crate::http;
use crate::queue::ResponseSlotQueue;
use crate::request::RequestRecord;
use crate::response::ResponseRecord;

/// Owns the shared HTTP client, concurrency gate, and cache used to
/// drive a batch of requests.
pub struct Dispatcher {
    client: Client,
    config: DriverConfig,
    cache: Arc<dyn Cache>,
}

impl Dispatcher {
    /// Build a dispatcher with the given configuration and cache backend.
    ///
    /// Rejects `batch_size == 0` immediately, at the construction
    /// boundary, rather than letting it silently collapse to an unusable
    /// zero-capacity gate (§7 `UsageError` policy; §4.4 Inputs requires
    /// `batch_size: int ≥ 1`).
    pub fn new(config: DriverConfig, cache: Arc<dyn Cache>) -> Result<Self, Error> {
        if config.batch_size == 0 {
            return Err(crate::error::UsageError::InvalidBatchSize(config.batch_size).into());
        }
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Dispatch `requests` and return a [`ResponseDriver`] that yields
    /// their responses in the same order, as each becomes available
    /// (§4.4).
    pub fn drive(&self, requests: Vec<RequestRecord>) -> ResponseDriver {
        let len = requests.len();
        let queue = Arc::new(ResponseSlotQueue::new(len));
        let semaphore = Arc::new(Semaphore::new(self.config.batch_size));

        let handles = requests
            .into_iter()
            .enumerate()
            .map(|(index, request)| {
                let client = self.client.clone();
                let cache = Arc::clone(&self.cache);
                let semaphore = Arc::clone(&semaphore);
                let queue = Arc::clone(&queue);
                let default_timeout = self.config.default_timeout;
                let log_errors = self.config.log_errors;

                tokio::spawn(async move {
                    let key = fingerprint::fingerprint(&request);

                    let response = if let Some(cached) = cache.get(&key).await {
                        // Cache hits bypass the concurrency gate entirely.
                        cached
                    } else {
                        let _permit = semaphore.acquire().await.expect("semaphore closed");
                        let response = http::send(&client, &request, default_timeout, log_errors).await;
                        // Cache write lands before the slot is published, so a
                        // consumer that reacts to delivery never races a cache
                        // miss for the same fingerprint.
                        cache.put(key, response.clone()).await;
                        response
                    };

                    // The dispatcher never reuses an index, so a double-put
                    // here would indicate a bug in this module itself.
                    let _ = queue.put(index, response);
                })
            })
            .collect();

        ResponseDriver {
            queue,
            handles,
            cursor: 0,
            len,
        }
    }
}

/// Pull-style iterator over responses, delivered in request order
/// regardless of completion order (§4.4).
///
/// Dropping a `ResponseDriver` before it is exhausted cancels every
/// outstanding worker task (§4.4 step 6) rather than leaking them to run
/// to completion in the background.
pub struct ResponseDriver {
    queue: Arc<ResponseSlotQueue>,
    handles: Vec<JoinHandle<()>>,
    cursor: usize,
    len: usize,
}

impl ResponseDriver {
    /// Await and return the next response in order, or `None` once every
    /// request has been delivered.
    pub async fn next(&mut self) -> Option<ResponseRecord> {
        if self.cursor >= self.len {
            return None;
        }
        let response = self
            .queue
            .get(self.cursor)
            .await
            .expect("slot indices are driven sequentially and never reused");
        self.cursor += 1;
        Some(response)
    }

    /// Total number of requests this driver was created for.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for ResponseDriver {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

impl futures::Stream for ResponseDriver {
    type Item = ResponseRecord;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.cursor >= this.len {
            return std::task::Poll::Ready(None);
        }
        let fut = this.queue.get(this.cursor);
        tokio::pin!(fut);
        match fut.poll(cx) {
            std::task::Poll::Ready(Ok(response)) => {
                this.cursor += 1;
                std::task::Poll::Ready(Some(response))
            }
            std::task::Poll::Ready(Err(_)) => std::task::Poll::Ready(None),
            std::task::Poll::Pending => std::task::Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.cursor;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, NoCache};
    use crate::request::Method;
    use futures::StreamExt;

    fn dispatcher(batch_size: usize) -> Dispatcher {
        Dispatcher::new(DriverConfig::with_batch_size(batch_size), Arc::new(NoCache)).unwrap()
    }

    #[test]
    fn zero_batch_size_is_rejected_at_construction() {
        let err = Dispatcher::new(DriverConfig::with_batch_size(0), Arc::new(NoCache)).unwrap_err();
        assert!(matches!(
            err,
            Error::Usage(crate::error::UsageError::InvalidBatchSize(0))
        ));
    }

    #[tokio::test]
    async fn empty_batch_yields_no_responses() {
        let d = dispatcher(5);
        let mut driver = d.drive(vec![]);
        assert!(driver.next().await.is_none());
    }

    #[tokio::test]
    async fn responses_are_delivered_in_request_order() {
        let d = dispatcher(2);
        let requests = vec![
            RequestRecord::new(Method::Get, "http://127.0.0.1:1"),
            RequestRecord::new(Method::Get, "http://127.0.0.1:2"),
            RequestRecord::new(Method::Get, "http://127.0.0.1:3"),
        ];
        let mut driver = d.drive(requests);

        let mut count = 0;
        while let Some(response) = driver.next().await {
            assert!(!response.ok); // unroutable hosts, all transport failures
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn stream_impl_yields_every_response() {
        let d = dispatcher(2);
        let requests = vec![
            RequestRecord::new(Method::Get, "http://127.0.0.1:1"),
            RequestRecord::new(Method::Get, "http://127.0.0.1:2"),
        ];
        let driver = d.drive(requests);
        let responses: Vec<_> = driver.collect().await;
        assert_eq!(responses.len(), 2);
    }

    #[tokio::test]
    async fn cache_hit_bypasses_the_gate_and_is_reused() {
        let cache = Arc::new(MemoryCache::new());
        let request = RequestRecord::new(Method::Get, "http://127.0.0.1:1");
        let key = fingerprint::fingerprint(&request);
        let mut prebuilt = ResponseRecord::transport_failure("prebuilt");
        prebuilt.status = 200;
        prebuilt.ok = true;
        cache.put(key, prebuilt).await;

        let d = Dispatcher::new(DriverConfig::with_batch_size(1), cache).unwrap();
        let mut driver = d.drive(vec![request]);
        let response = driver.next().await.unwrap();
        assert_eq!(response.reason, "prebuilt");
    }

    #[tokio::test]
    async fn dropping_driver_cancels_outstanding_workers() {
        let d = dispatcher(1);
        let requests = (0..5)
            .map(|i| RequestRecord::new(Method::Get, format!("http://127.0.0.1:{}", i + 1)))
            .collect();
        let driver = d.drive(requests);
        // Dropping immediately must not panic or hang.
        drop(driver);
    }
}
