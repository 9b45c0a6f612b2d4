//! The conversation orchestrator and everything that needs a client's lock:
//! turns, daily routines and the channel commands.

mod channel;
mod routines;
mod turn;

pub use turn::TurnReply;

use std::collections::HashMap;
use std::sync::Arc;

use sprout_core::config::Config;
use sprout_invest::InvestApi;

use crate::action::Dispatcher;
use crate::clock::{system_clock, Clock};
use crate::portfolio_index::PortfolioIndex;
use crate::profile::{ClientProfile, ClientStore};
use crate::service::classifier::ActionClassifier;
use crate::service::llm::{ChatModel, LlmDispatch};

/// Name used when the account API does not know the client's name.
const DEFAULT_NAME: &str = "Friend";

#[derive(Debug, Clone)]
pub struct AdvisorSettings {
    pub history_limit: usize,
    pub initial_portfolio_amount: f64,
    /// Client used for senders missing from `senders`. Empty disables it.
    pub default_client_id: String,
    /// Channel address → client id.
    pub senders: HashMap<String, String>,
}

impl AdvisorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            history_limit: config.brain.history_limit,
            initial_portfolio_amount: config.invest.initial_portfolio_amount,
            default_client_id: config.whatsapp.default_client_id.clone(),
            senders: config.whatsapp.senders.clone(),
        }
    }
}

pub struct Advisor {
    store: ClientStore,
    dispatcher: Dispatcher,
    classifier: ActionClassifier,
    replier: Arc<dyn ChatModel>,
    invest: Arc<dyn InvestApi>,
    clock: Clock,
    settings: AdvisorSettings,
}

impl Advisor {
    pub fn new(
        invest: Arc<dyn InvestApi>,
        index: Arc<PortfolioIndex>,
        intent: Arc<dyn ChatModel>,
        replier: Arc<dyn ChatModel>,
        clock: Clock,
        settings: AdvisorSettings,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            invest.clone(),
            index,
            clock.clone(),
            settings.initial_portfolio_amount,
        );
        Self {
            store: ClientStore::new(),
            dispatcher,
            classifier: ActionClassifier::new(intent),
            replier,
            invest,
            clock,
            settings,
        }
    }

    /// Wire the configured LLM providers and wall clock.
    pub fn from_config(
        config: &Config,
        invest: Arc<dyn InvestApi>,
        index: Arc<PortfolioIndex>,
    ) -> Self {
        Self::new(
            invest,
            index,
            Arc::new(LlmDispatch::for_intent(config)),
            Arc::new(LlmDispatch::for_replies(config)),
            system_clock(config.brain.timezone_offset),
            AdvisorSettings::from_config(config),
        )
    }

    pub fn store(&self) -> &ClientStore {
        &self.store
    }

    /// Register a client with a fresh profile, taking the name and email
    /// from the account API when it answers.
    pub async fn register_client(&self, client_id: &str) -> bool {
        let mut profile = ClientProfile::new(client_id, DEFAULT_NAME);
        match self.invest.get_client(client_id).await {
            Ok(account) => {
                if !account.name.trim().is_empty() {
                    profile.name = account.name;
                }
                profile.email = account.email;
            }
            Err(e) => {
                tracing::warn!(client_id, error = %e, "could not fetch client account, using defaults");
            }
        }
        self.store.register(profile).await
    }
}
