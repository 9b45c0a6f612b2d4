pub mod twiml;
pub mod webhook;

use async_trait::async_trait;
use sprout_core::error::Result;

/// What the webhook needs from the conversation layer. `sender` is the raw
/// channel address (e.g. `whatsapp:+15551234567`).
#[async_trait]
pub trait ConversationHandler: Send + Sync {
    /// Messages to send back, in order. Empty means nothing useful to say.
    async fn handle_message(&self, sender: &str, text: &str) -> Result<Vec<String>>;

    async fn daily_quiz(&self, sender: &str) -> Result<Option<String>>;

    async fn daily_check(&self, sender: &str) -> Result<Option<String>>;
}
