use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use sprout_core::error::{Result, SproutError};
use std::time::Duration;

use crate::types::{ClientAccount, ClientUpdate, Portfolio, PortfolioStrategy};
use crate::InvestApi;

/// Status codes accepted for reads.
const READ_OK: &[u16] = &[200];
/// Status codes accepted for mutations.
const WRITE_OK: &[u16] = &[200, 201];

pub const MAX_SIMULATION_MONTHS: u32 = 12;

/// HTTP client for the InvestEase account API.
pub struct InvestClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl InvestClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SproutError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and decode the body when the status is in `ok`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        ok: &[u16],
        what: &str,
    ) -> Result<T> {
        let resp = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SproutError::Http {
                status: 0,
                body: format!("{what} request failed: {e}"),
            })?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| SproutError::Http {
            status,
            body: format!("{what} response read failed: {e}"),
        })?;

        if !ok.contains(&status) {
            tracing::warn!(status, %what, body = %text, "invest api call rejected");
            return Err(status_error(status, &text));
        }
        tracing::debug!(status, %what, "invest api call ok");

        serde_json::from_str(&text).map_err(|e| SproutError::Http {
            status,
            body: format!("{what} returned unexpected body: {e}"),
        })
    }
}

/// Map a non-success status to an error carrying the server's message.
fn status_error(status: u16, body: &str) -> SproutError {
    let message = error_message(body);
    if status == 409 {
        SproutError::Conflict(message)
    } else {
        SproutError::Api { status, message }
    }
}

/// Pull a human-readable message out of an error body, falling back to the
/// raw text when it isn't JSON with a known field.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error", "message", "detail"]
                .iter()
                .find_map(|key| v.get(key))
                .map(|field| match field.as_str() {
                    Some(s) => s.to_string(),
                    None => field.to_string(),
                })
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl InvestApi for InvestClient {
    async fn get_client(&self, client_id: &str) -> Result<ClientAccount> {
        let req = self.http.get(self.url(&format!("/clients/{client_id}")));
        self.send(req, READ_OK, "get_client").await
    }

    async fn update_client(&self, client_id: &str, update: &ClientUpdate) -> Result<ClientAccount> {
        if update.is_empty() {
            return Err(SproutError::Validation(
                "at least one of name or email must be provided".to_string(),
            ));
        }
        let req = self
            .http
            .put(self.url(&format!("/clients/{client_id}")))
            .json(update);
        self.send(req, WRITE_OK, "update_client").await
    }

    async fn deposit(&self, client_id: &str, amount: f64) -> Result<serde_json::Value> {
        let req = self
            .http
            .post(self.url(&format!("/clients/{client_id}/deposit")))
            .json(&json!({ "amount": amount }));
        self.send(req, WRITE_OK, "deposit").await
    }

    async fn list_portfolios(&self, client_id: &str) -> Result<Vec<Portfolio>> {
        let req = self
            .http
            .get(self.url(&format!("/clients/{client_id}/portfolios")));
        self.send(req, READ_OK, "list_portfolios").await
    }

    async fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        let req = self.http.get(self.url(&format!("/portfolios/{portfolio_id}")));
        self.send(req, READ_OK, "get_portfolio").await
    }

    async fn portfolio_analysis(&self, portfolio_id: &str) -> Result<serde_json::Value> {
        let req = self
            .http
            .get(self.url(&format!("/portfolios/{portfolio_id}/analysis")));
        self.send(req, READ_OK, "portfolio_analysis").await
    }

    async fn create_portfolio(
        &self,
        client_id: &str,
        strategy: PortfolioStrategy,
        initial_amount: f64,
    ) -> Result<Portfolio> {
        let req = self
            .http
            .post(self.url(&format!("/clients/{client_id}/portfolios")))
            .json(&json!({
                "type": strategy.as_str(),
                "initialAmount": initial_amount,
            }));
        self.send(req, WRITE_OK, "create_portfolio").await
    }

    async fn transfer(&self, portfolio_id: &str, amount: f64) -> Result<serde_json::Value> {
        let req = self
            .http
            .post(self.url(&format!("/portfolios/{portfolio_id}/transfer")))
            .json(&json!({ "amount": amount }));
        self.send(req, WRITE_OK, "transfer").await
    }

    async fn withdraw(&self, portfolio_id: &str, amount: f64) -> Result<serde_json::Value> {
        let req = self
            .http
            .post(self.url(&format!("/portfolios/{portfolio_id}/withdraw")))
            .json(&json!({ "amount": amount }));
        self.send(req, WRITE_OK, "withdraw").await
    }

    async fn simulate(&self, client_id: &str, months: u32) -> Result<serde_json::Value> {
        if !(1..=MAX_SIMULATION_MONTHS).contains(&months) {
            return Err(SproutError::Validation(format!(
                "months must be between 1 and {MAX_SIMULATION_MONTHS}"
            )));
        }
        let req = self
            .http
            .post(self.url(&format!("/clients/{client_id}/simulate")))
            .json(&json!({ "months": months }));
        self.send(req, READ_OK, "simulate").await
    }
}
