use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, SproutError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model used for user-facing replies and routines.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Model used to classify messages into actions.
    /// Falls back to `llm` when the api key is not configured separately.
    #[serde(default)]
    pub intent: IntentConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub invest: InvestConfig,
    #[serde(default)]
    pub brain: BrainConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    /// Base URL for OpenAI-compatible providers (OpenAI, Groq, ...).
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_key: String::new(),
            base_url: default_openai_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_intent_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_intent_model() -> String {
    "deepseek-r1-distill-llama-70b".to_string()
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_intent_model(),
            api_key: String::new(),
            base_url: default_openai_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestConfig {
    #[serde(default = "default_invest_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Amount moved from cash into a newly created portfolio.
    #[serde(default = "default_initial_portfolio_amount")]
    pub initial_portfolio_amount: f64,
}

fn default_invest_url() -> String {
    "https://2dcq63co40.execute-api.us-east-1.amazonaws.com/dev".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_initial_portfolio_amount() -> f64 {
    100.0
}

impl Default for InvestConfig {
    fn default() -> Self {
        Self {
            base_url: default_invest_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            initial_portfolio_amount: default_initial_portfolio_amount(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainConfig {
    /// UTC offset in hours used for calendar-day streak checks.
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32,
    /// Messages kept in a client's history besides the persona message.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_index_path")]
    pub portfolio_index_path: String,
    /// Client ids registered at startup.
    #[serde(default)]
    pub clients: Vec<String>,
}

fn default_timezone_offset() -> i32 {
    -4
}

fn default_history_limit() -> usize {
    40
}

fn default_index_path() -> String {
    "portfolios.txt".to_string()
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            timezone_offset: default_timezone_offset(),
            history_limit: default_history_limit(),
            portfolio_index_path: default_index_path(),
            clients: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Client used for senders with no explicit mapping. Empty disables it.
    #[serde(default)]
    pub default_client_id: String,
    /// Sender address (e.g. "whatsapp:+15550001111") to client id.
    #[serde(default)]
    pub senders: HashMap<String, String>,
}

fn default_port() -> u16 {
    3000
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            default_client_id: String::new(),
            senders: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config: defaults → sprout.toml → env vars (env wins).
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| SproutError::Config(format!("failed to read config: {e}")))?;
            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SproutError::Config(format!("failed to parse config: {e}")))
    }

    /// Apply overrides from `lookup` (normally the process environment),
    /// then resolve fallbacks between sections.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("SPROUT_LLM_API_KEY") {
            self.llm.api_key = v;
        }
        if let Some(v) = lookup("SPROUT_INTENT_API_KEY") {
            self.intent.api_key = v;
        }
        if let Some(v) = lookup("SPROUT_INVEST_API_KEY") {
            self.invest.api_key = v;
        }
        if let Some(v) = lookup("SPROUT_INVEST_BASE_URL") {
            self.invest.base_url = v;
        }
        if let Some(v) = lookup("SPROUT_WHATSAPP_PORT") {
            self.whatsapp.port = v
                .parse()
                .map_err(|e| SproutError::Config(format!("invalid SPROUT_WHATSAPP_PORT: {e}")))?;
        }

        if self.intent.api_key.is_empty() {
            self.intent.api_key = self.llm.api_key.clone();
        }

        Ok(())
    }

    /// Every client id the process should register at startup.
    pub fn registered_clients(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        let candidates = self
            .brain
            .clients
            .iter()
            .chain(std::iter::once(&self.whatsapp.default_client_id))
            .chain(self.whatsapp.senders.values());
        for id in candidates {
            if !id.is_empty() && !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}
