use sprout_core::types::ChatMessage;

use super::Advisor;
use crate::action::{strip_reasoning, DispatchFailure, DispatchResult};
use crate::prompt::{FALLBACK_REPLY, RETRY_GUIDANCE};

/// What one turn produced for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    /// Sent before the reply, verbatim (e.g. the info card).
    pub direct: Vec<String>,
    pub reply: String,
}

impl Advisor {
    /// Run one conversational turn: classify and dispatch an action, then
    /// ask the reply model to answer. The client's lock is held throughout.
    ///
    /// Returns `None` for unregistered clients.
    pub async fn handle_turn(&self, client_id: &str, text: &str) -> Option<TurnReply> {
        let mut profile = self.store.lock(client_id).await?;
        let limit = self.settings.history_limit;
        profile.push_message(ChatMessage::user(text), limit);

        let result = match self.classifier.classify(&profile).await {
            Ok(request) => self.dispatcher.dispatch(&mut profile, &request).await,
            Err(e) => {
                tracing::warn!(client_id, error = %e, "intent classification failed");
                DispatchResult::failed(DispatchFailure::Classification(e.to_string()))
            }
        };

        match (&result.follow_up, result.success) {
            (Some(follow_up), _) => {
                profile.push_message(ChatMessage::system(follow_up.clone()), limit)
            }
            (None, false) => profile.push_message(ChatMessage::system(RETRY_GUIDANCE), limit),
            (None, true) => {}
        }

        let reply = match self.replier.complete(&profile.messages).await {
            Ok(raw) => {
                let reply = strip_reasoning(&raw).to_string();
                profile.push_message(ChatMessage::assistant(reply.clone()), limit);
                reply
            }
            Err(e) => {
                tracing::warn!(client_id, error = %e, "reply generation failed");
                FALLBACK_REPLY.to_string()
            }
        };

        Some(TurnReply {
            direct: result.direct_message.into_iter().collect(),
            reply,
        })
    }
}
