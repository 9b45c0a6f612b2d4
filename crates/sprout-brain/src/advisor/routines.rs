use sprout_core::error::Result;
use sprout_core::types::ChatMessage;

use super::Advisor;
use crate::action::strip_reasoning;
use crate::prompt::{check_prompt, quiz_prompt};

impl Advisor {
    /// Today's quiz question, at most once per calendar day. The question is
    /// kept in the history so the user's answer has context.
    pub async fn daily_quiz(&self, client_id: &str) -> Result<Option<String>> {
        let Some(mut profile) = self.store.lock(client_id).await else {
            return Ok(None);
        };
        let now = (self.clock)();
        if profile.quizzed_on(now) {
            tracing::debug!(client_id, "quiz already sent today");
            return Ok(None);
        }

        let mut prompt = profile.messages.clone();
        prompt.push(ChatMessage::system(quiz_prompt(&profile.summary())));
        let raw = self.replier.complete(&prompt).await?;
        let quiz = strip_reasoning(&raw).to_string();
        if quiz.is_empty() {
            return Ok(None);
        }

        profile.push_message(ChatMessage::assistant(quiz.clone()), self.settings.history_limit);
        profile.last_quiz_at = Some(now);
        tracing::info!(client_id, "daily quiz sent");
        Ok(Some(quiz))
    }

    /// A nudge when today's saving is not done yet.
    pub async fn daily_check(&self, client_id: &str) -> Result<Option<String>> {
        let Some(mut profile) = self.store.lock(client_id).await else {
            return Ok(None);
        };
        if profile.saved_on((self.clock)()) {
            return Ok(None);
        }

        let mut prompt = profile.messages.clone();
        prompt.push(ChatMessage::system(check_prompt(
            &profile.summary(),
            profile.daily_saving_amount,
            profile.streaks.saving,
        )));
        let raw = self.replier.complete(&prompt).await?;
        let nudge = strip_reasoning(&raw).to_string();
        if nudge.is_empty() {
            return Ok(None);
        }

        profile.push_message(ChatMessage::assistant(nudge.clone()), self.settings.history_limit);
        Ok(Some(nudge))
    }
}
