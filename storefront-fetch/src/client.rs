//! Commerce API client.
//!
//! Wraps the host [`HttpClient`] with the storefront's request contract:
//! bearer credentials, 401 session purging, structured failures and
//! boundary mapping into core types.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use storefront_core::{
    ApiFailure, ApiResult, Banner, CommerceApi, CoreError, ListingPayload, ListingSlot,
    OrderReceipt, OrderRequest, OrderStatus, Product, ProductSummary, RateTable,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::FetchError;
use crate::host::http::{HttpClient, ResponseExt};
use crate::host::session::SessionVault;
use crate::retry::RetryStrategy;

// ============================================================================
// Commerce Client
// ============================================================================

/// HTTP implementation of [`CommerceApi`].
#[derive(Clone)]
pub struct CommerceClient {
    http: HttpClient,
    base_url: Url,
    session: Arc<dyn SessionVault>,
    retry: RetryStrategy,
}

impl fmt::Debug for CommerceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommerceClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl CommerceClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, session: Arc<dyn SessionVault>) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpClient::new()?,
            base_url: normalize_base(base_url)?,
            session,
            retry: RetryStrategy::default(),
        })
    }

    /// Replaces the underlying HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    /// Sets the retry strategy used for GET requests.
    #[must_use]
    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry = strategy;
        self
    }

    /// Returns the API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::from(e).into())
    }

    /// Builds `<base>/<prefix>/<segment>` with `segment` percent-encoded.
    fn endpoint_with_segment(&self, prefix: &str, segment: &str) -> ApiResult<Url> {
        let mut url = self.endpoint(prefix)?;
        url.path_segments_mut()
            .map_err(|()| ApiFailure::network("API base URL cannot have path segments"))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Runs a request, retrying idempotent calls on transient failures.
    async fn request<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<Value> {
        let max_attempts = if method == Method::GET {
            self.retry.max_attempts
        } else {
            1
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let token = self.session.token();
            let outcome = self
                .attempt(method.clone(), url.as_str(), token.as_deref(), body)
                .await;

            let failure = match outcome {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

            if failure.is_unauthorized() {
                warn!(url = %url, "API rejected credentials, purging session");
                self.session.purge();
            }

            if attempt < max_attempts && self.retry.should_retry_failure(&failure) {
                let delay = self.retry.delay_for_attempt(attempt);
                warn!(
                    url = %url,
                    attempt,
                    delay_ms = delay.as_millis(),
                    failure = %failure,
                    "Request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            return Err(failure);
        }
    }

    async fn attempt<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: Option<&B>,
    ) -> ApiResult<Value> {
        let response = self
            .http
            .send(method, url, bearer, body)
            .await
            .map_err(|e| ApiFailure::network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }
            let text = response
                .text()
                .await
                .map_err(|e| ApiFailure::network(e.to_string()))?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| {
                ApiFailure::new(format!("Invalid JSON in response: {e}"), status.as_u16())
            });
        }

        let retry_after = response
            .is_rate_limited()
            .then(|| response.retry_after_secs())
            .flatten();
        let text = response.text().await.unwrap_or_default();
        let mut message = failure_message(status, &text);
        if let Some(secs) = retry_after {
            message = format!("{message}; retry after {secs}s");
        }
        debug!(status = status.as_u16(), message = %message, "API returned failure");
        Err(ApiFailure::new(message, status.as_u16()))
    }

    async fn get(&self, url: Url) -> ApiResult<Value> {
        self.request::<()>(Method::GET, url, None).await
    }
}

#[async_trait]
impl CommerceApi for CommerceClient {
    async fn fetch_currencies(&self) -> ApiResult<RateTable> {
        let value = self.get(self.endpoint("currencies")?).await?;
        RateTable::from_json(value).map_err(unexpected_shape)
    }

    async fn fetch_listing(&self, slot: ListingSlot) -> ApiResult<ListingPayload> {
        let value = self.get(self.endpoint(listing_path(slot))?).await?;
        let payload = match slot {
            ListingSlot::Banners => Banner::list_from_json(value).map(ListingPayload::Banners),
            _ => ProductSummary::list_from_json(value).map(ListingPayload::Products),
        }
        .map_err(unexpected_shape)?;
        debug!(slot = %slot, rows = payload.len(), "Listing fetched");
        Ok(payload)
    }

    async fn fetch_product(&self, slug: &str) -> ApiResult<Product> {
        let value = self.get(self.endpoint_with_segment("products/", slug)?).await?;
        Product::from_json(value).map_err(unexpected_shape)
    }

    async fn place_order(&self, order: &OrderRequest) -> ApiResult<OrderReceipt> {
        let url = self.endpoint("orders")?;
        let value = self.request(Method::POST, url, Some(order)).await?;
        let receipt = OrderReceipt::from_json(value).map_err(unexpected_shape)?;
        info!(reference = %receipt.reference, "Order placed");
        Ok(receipt)
    }

    async fn fetch_order(&self, reference: &str) -> ApiResult<OrderStatus> {
        let url = self.endpoint_with_segment("orders/track/", reference)?;
        let value = self.get(url).await?;
        OrderStatus::from_json(value).map_err(unexpected_shape)
    }

    async fn track_referral(&self, code: &str, landing_path: &str) -> ApiResult<()> {
        let url = self.endpoint("affiliates/track")?;
        let body = json!({ "code": code, "landing_path": landing_path });
        self.request(Method::POST, url, Some(&body)).await?;
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Ensures the base URL ends in `/` so relative joins stay under it.
fn normalize_base(base_url: &str) -> Result<Url, FetchError> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&with_slash)?)
}

fn listing_path(slot: ListingSlot) -> &'static str {
    match slot {
        ListingSlot::Banners => "banners",
        ListingSlot::BestSellers => "products/best-sellers",
        ListingSlot::NewArrivals => "products/new-arrivals",
        ListingSlot::Unisex => "products?category=unisex",
    }
}

fn unexpected_shape(err: CoreError) -> ApiFailure {
    FetchError::from(err).into()
}

/// Pulls a human-readable message out of an error body.
fn failure_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::session::MemorySession;
    use storefront_core::{CurrencyCode, CustomerDetails};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serves the given responses, one per connection, and returns the raw
    /// requests received.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut socket).await);
                let reply = format!(
                    "HTTP/1.1 {status} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
            requests
        });
        (format!("http://{addr}/api"), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 2048];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|l| {
                        l.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().to_string())
                    })
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn client(base: &str, session: Arc<MemorySession>) -> CommerceClient {
        CommerceClient::new(base, session)
            .unwrap()
            .with_retry_strategy(RetryStrategy::new(2).with_base_delay(1))
    }

    #[tokio::test]
    async fn test_bearer_token_and_currency_mapping() {
        let (base, server) =
            serve(vec![(200, r#"{"data":[{"code":"USD","symbol":"$","rate":1500}]}"#)]).await;
        let session = Arc::new(MemorySession::with_token("tok-123"));

        let table = client(&base, session).fetch_currencies().await.unwrap();
        assert_eq!(table.find(CurrencyCode::Usd).map(|e| e.symbol.as_str()), Some("$"));

        let requests = server.await.unwrap();
        let request = requests[0].to_lowercase();
        assert!(request.starts_with("get /api/currencies "));
        assert!(request.contains("authorization: bearer tok-123"));
    }

    #[tokio::test]
    async fn test_anonymous_requests_carry_no_credential() {
        let (base, server) = serve(vec![(200, "[]")]).await;
        let session = Arc::new(MemorySession::new());

        let payload = client(&base, session)
            .fetch_listing(ListingSlot::Unisex)
            .await
            .unwrap();
        assert!(payload.is_empty());

        let requests = server.await.unwrap();
        let request = requests[0].to_lowercase();
        assert!(request.starts_with("get /api/products?category=unisex "));
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_unauthorized_purges_session() {
        let (base, server) = serve(vec![(401, r#"{"message":"Unauthenticated."}"#)]).await;
        let session = Arc::new(MemorySession::with_token("stale"));

        let failure = client(&base, session.clone())
            .fetch_order("ORD-1")
            .await
            .unwrap_err();
        assert!(!failure.success);
        assert_eq!(failure.status, Some(401));
        assert_eq!(failure.message, "Unauthenticated.");
        assert!(session.token().is_none());

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("GET /api/orders/track/ORD-1 "));
    }

    #[tokio::test]
    async fn test_non_success_is_structured_failure() {
        let (base, _server) = serve(vec![(404, "not json")]).await;
        let failure = client(&base, Arc::new(MemorySession::new()))
            .fetch_product("missing-shirt")
            .await
            .unwrap_err();
        assert_eq!(failure.status, Some(404));
        assert_eq!(failure.message, "Not Found");
    }

    #[tokio::test]
    async fn test_get_retries_transient_failures() {
        let (base, server) = serve(vec![
            (503, r#"{"error":"maintenance"}"#),
            (200, r#"[{"id":1,"image":"https://cdn/b.jpg"}]"#),
        ])
        .await;

        let payload = client(&base, Arc::new(MemorySession::new()))
            .fetch_listing(ListingSlot::Banners)
            .await
            .unwrap();
        assert_eq!(payload.banners().len(), 1);
        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_post_is_never_retried() {
        let (base, server) = serve(vec![(503, r#"{"message":"busy"}"#)]).await;
        let order = OrderRequest {
            customer: CustomerDetails {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: "0800".to_string(),
                address: "1 Marina".to_string(),
            },
            items: vec![],
            currency: CurrencyCode::Ngn,
            referral_code: None,
        };

        let failure = client(&base, Arc::new(MemorySession::new()))
            .place_order(&order)
            .await
            .unwrap_err();
        assert_eq!(failure.status, Some(503));

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("POST /api/orders "));
        assert!(requests[0].contains(r#""currency":"NGN""#));
    }

    #[tokio::test]
    async fn test_connection_failure_has_no_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let failure = CommerceClient::new(&format!("http://{addr}/"), Arc::new(MemorySession::new()))
            .unwrap()
            .with_retry_strategy(RetryStrategy::no_retry())
            .fetch_currencies()
            .await
            .unwrap_err();
        assert!(failure.status.is_none());
        assert!(failure.is_transient());
    }

    #[test]
    fn test_slug_segments_are_encoded() {
        let client = CommerceClient::new("https://shop.example.com/api", Arc::new(MemorySession::new()))
            .unwrap();
        let url = client.endpoint_with_segment("products/", "a b/c").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/products/a%20b%2Fc");
    }
}
