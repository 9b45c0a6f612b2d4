pub mod client;
pub mod types;

use async_trait::async_trait;
use sprout_core::error::Result;

use crate::types::{ClientAccount, ClientUpdate, Portfolio, PortfolioStrategy};

/// Operations the assistant performs against the InvestEase account API.
///
/// `client::InvestClient` is the HTTP implementation; the brain only sees
/// this trait so dispatch can run against an in-memory double.
#[async_trait]
pub trait InvestApi: Send + Sync {
    async fn get_client(&self, client_id: &str) -> Result<ClientAccount>;
    async fn update_client(&self, client_id: &str, update: &ClientUpdate) -> Result<ClientAccount>;
    /// Add money to the client's cash balance.
    async fn deposit(&self, client_id: &str, amount: f64) -> Result<serde_json::Value>;
    async fn list_portfolios(&self, client_id: &str) -> Result<Vec<Portfolio>>;
    async fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;
    /// Trailing and calendar returns of one portfolio.
    async fn portfolio_analysis(&self, portfolio_id: &str) -> Result<serde_json::Value>;
    /// Create a portfolio, moving `initial_amount` out of the client's cash.
    async fn create_portfolio(
        &self,
        client_id: &str,
        strategy: PortfolioStrategy,
        initial_amount: f64,
    ) -> Result<Portfolio>;
    /// Move cash into a portfolio.
    async fn transfer(&self, portfolio_id: &str, amount: f64) -> Result<serde_json::Value>;
    /// Move money out of a portfolio back into cash.
    async fn withdraw(&self, portfolio_id: &str, amount: f64) -> Result<serde_json::Value>;
    /// Project every portfolio of the client forward by `months` (1..=12).
    async fn simulate(&self, client_id: &str, months: u32) -> Result<serde_json::Value>;
}
