//! In-memory doubles for the account API and the LLM.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use sprout_core::error::{Result, SproutError};
use sprout_core::types::ChatMessage;
use sprout_invest::types::{ClientAccount, ClientUpdate, Portfolio, PortfolioStrategy};
use sprout_invest::InvestApi;

use crate::service::llm::ChatModel;

/// Records every call; `fail_with` makes every call answer with that API error.
#[derive(Default)]
pub struct MockInvest {
    pub calls: Mutex<Vec<String>>,
    pub portfolios: Mutex<Vec<Portfolio>>,
    pub fail_with: Mutex<Option<(u16, String)>>,
}

impl MockInvest {
    pub fn failing(status: u16, message: &str) -> Self {
        let mock = Self::default();
        *mock.fail_with.lock().unwrap() = Some((status, message.to_string()));
        mock
    }

    pub fn with_portfolio(self, id: &str, strategy: PortfolioStrategy) -> Self {
        self.portfolios.lock().unwrap().push(Portfolio {
            id: id.to_string(),
            kind: strategy.as_str().to_string(),
            invested_amount: 100.0,
            current_value: 110.0,
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match &*self.fail_with.lock().unwrap() {
            Some((status, message)) => Err(SproutError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InvestApi for MockInvest {
    async fn get_client(&self, client_id: &str) -> Result<ClientAccount> {
        self.record(format!("get_client {client_id}"))?;
        Ok(ClientAccount {
            id: client_id.to_string(),
            name: "Remote Name".to_string(),
            email: None,
            cash: 1000.0,
        })
    }

    async fn update_client(&self, client_id: &str, update: &ClientUpdate) -> Result<ClientAccount> {
        self.record(format!("update_client {client_id}"))?;
        Ok(ClientAccount {
            id: client_id.to_string(),
            name: update.name.clone().unwrap_or_default(),
            email: update.email.clone(),
            cash: 1000.0,
        })
    }

    async fn deposit(&self, client_id: &str, amount: f64) -> Result<serde_json::Value> {
        self.record(format!("deposit {client_id} {amount}"))?;
        Ok(json!({ "cash": 1000.0 + amount }))
    }

    async fn list_portfolios(&self, client_id: &str) -> Result<Vec<Portfolio>> {
        self.record(format!("list_portfolios {client_id}"))?;
        Ok(self.portfolios.lock().unwrap().clone())
    }

    async fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.record(format!("get_portfolio {portfolio_id}"))?;
        self.portfolios
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == portfolio_id)
            .cloned()
            .ok_or_else(|| SproutError::Api {
                status: 404,
                message: "Portfolio not found".to_string(),
            })
    }

    async fn portfolio_analysis(&self, portfolio_id: &str) -> Result<serde_json::Value> {
        self.record(format!("portfolio_analysis {portfolio_id}"))?;
        Ok(json!({
            "trailingReturns": { "1m": 0.8, "1y": 6.2 },
            "calendarReturns": { "2024": 7.1 }
        }))
    }

    async fn create_portfolio(
        &self,
        client_id: &str,
        strategy: PortfolioStrategy,
        initial_amount: f64,
    ) -> Result<Portfolio> {
        self.record(format!("create_portfolio {client_id} {strategy} {initial_amount}"))?;
        let mut portfolios = self.portfolios.lock().unwrap();
        let portfolio = Portfolio {
            id: format!("p-{}", portfolios.len() + 1),
            kind: strategy.as_str().to_string(),
            invested_amount: initial_amount,
            current_value: initial_amount,
        };
        portfolios.push(portfolio.clone());
        Ok(portfolio)
    }

    async fn transfer(&self, portfolio_id: &str, amount: f64) -> Result<serde_json::Value> {
        self.record(format!("transfer {portfolio_id} {amount}"))?;
        Ok(json!({ "status": "ok" }))
    }

    async fn withdraw(&self, portfolio_id: &str, amount: f64) -> Result<serde_json::Value> {
        self.record(format!("withdraw {portfolio_id} {amount}"))?;
        Ok(json!({ "status": "ok" }))
    }

    async fn simulate(&self, client_id: &str, months: u32) -> Result<serde_json::Value> {
        self.record(format!("simulate {client_id} {months}"))?;
        Ok(json!({ "months": months, "projected_value": 1234.5 }))
    }
}

/// Answers with queued responses in order and keeps every prompt it saw.
/// An exhausted queue is an LLM error.
#[derive(Default)]
pub struct ScriptedChat {
    responses: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SproutError::Llm {
                provider: "scripted".to_string(),
                message: "no scripted response left".to_string(),
            })
    }
}
