use anchorwatch_canonical::HardwareId;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::sink::{LedgerEntry, LedgerSink};

/// Value of the `source` field on every write and history query.
pub const LEDGER_SOURCE: &str = "anchors";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct WriteRequest<'a> {
    event_type: &'a str,
    source: &'static str,
    anchor_id: &'a str,
    asset_id: Option<String>,
    payload: &'a Value,
    event_timestamp: String,
}

#[derive(Deserialize)]
struct WriteResponse {
    event_id: Option<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    events: Vec<Value>,
}

/// Ledger reached over HTTP.
///
/// `POST {base}/events` succeeds only with `201 Created` and a JSON body
/// carrying `event_id`. `GET {base}/events` returns `{"events": [...]}`.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpLedger {
    /// Creates a client with the default 30 second timeout.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, LedgerError> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl LedgerSink for HttpLedger {
    async fn write_event(&self, entry: &LedgerEntry) -> Result<Uuid, LedgerError> {
        let body = WriteRequest {
            event_type: entry.event_type.as_str(),
            source: LEDGER_SOURCE,
            anchor_id: entry.hardware_id.as_str(),
            asset_id: entry.asset_id.map(|id| id.to_string()),
            payload: &entry.payload,
            event_timestamp: entry.event_timestamp.to_rfc3339(),
        };

        let response = self
            .authorize(self.client.post(self.events_url()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %body, "ledger write rejected");
            return Err(LedgerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: WriteResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
        let event_id = parsed
            .event_id
            .ok_or_else(|| LedgerError::InvalidResponse("missing event_id".to_string()))?;
        let event_id = Uuid::parse_str(&event_id)
            .map_err(|e| LedgerError::InvalidResponse(format!("event_id {}: {}", event_id, e)))?;

        tracing::debug!(hardware_id = %entry.hardware_id, %event_id, "ledger write accepted");
        Ok(event_id)
    }

    async fn read_history(
        &self,
        hardware_id: &HardwareId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Value>, LedgerError> {
        let limit = limit.to_string();
        let offset = offset.to_string();
        let response = self
            .authorize(self.client.get(self.events_url()))
            .query(&[
                ("source", LEDGER_SOURCE),
                ("anchor_id", hardware_id.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let history: HistoryResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
        Ok(history.events)
    }
}
