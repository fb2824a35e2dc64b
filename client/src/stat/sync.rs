use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use salesbook::{LedgerStore, NewSale, Record, SaleDoc, StoreError};
use tracing::debug;

/// Ledger store reached over the backend's `/sales` endpoints.
///
/// The backend stamps each sale with its own date; the date on the submitted
/// [`NewSale`] is not sent.
pub struct HttpLedgerStore {
    client: Client,
    base_url: String,
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::TimedOut(e.to_string())
    } else if e.is_decode() {
        StoreError::Corrupt(e.to_string())
    } else {
        StoreError::Unavailable(e.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> StoreError {
    let msg = if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{status}: {}", body.trim())
    };
    match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => StoreError::Unavailable(msg),
        StatusCode::GATEWAY_TIMEOUT => StoreError::TimedOut(msg),
        _ => StoreError::Rejected(msg),
    }
}

async fn check(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

impl HttpLedgerStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn sales_url(&self) -> String {
        format!("{}/sales", self.base_url)
    }
}

#[async_trait]
impl LedgerStore for HttpLedgerStore {
    async fn append(&self, sale: NewSale) -> Result<Record, StoreError> {
        let resp = self
            .client
            .post(self.sales_url())
            .json(&SaleDoc::from(&sale))
            .send()
            .await
            .map_err(transport_error)?;
        let record: Record = check(resp).await?.json().await.map_err(transport_error)?;
        debug!(record_id = %record.id(), "sale uploaded");
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let resp = self
            .client
            .get(self.sales_url())
            .send()
            .await
            .map_err(transport_error)?;
        check(resp).await?.json().await.map_err(transport_error)
    }
}
