use std::sync::Arc;

use sprout_core::error::Result;
use sprout_core::types::ChatMessage;

use super::llm::ChatModel;
use crate::action::{parse_action_response, render_catalog, ActionRequest};
use crate::profile::ClientProfile;
use crate::prompt::{CLASSIFIER_INSTRUCTIONS, CLASSIFIER_PREAMBLE};

/// Turns a conversation into an [`ActionRequest`] using the intent model.
pub struct ActionClassifier {
    model: Arc<dyn ChatModel>,
}

impl ActionClassifier {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Ephemeral prompt: catalogue and rules, then the persisted history
    /// without its persona.
    pub fn build_prompt(profile: &ClientProfile) -> Vec<ChatMessage> {
        let system = format!(
            "{CLASSIFIER_PREAMBLE}\n\n{}\n\n{CLASSIFIER_INSTRUCTIONS}\n\nCurrent user profile: {}",
            render_catalog(),
            profile.summary()
        );
        let mut messages = Vec::with_capacity(profile.messages.len());
        messages.push(ChatMessage::system(system));
        messages.extend(profile.messages.iter().skip(1).cloned());
        messages
    }

    pub async fn classify(&self, profile: &ClientProfile) -> Result<ActionRequest> {
        let prompt = Self::build_prompt(profile);
        let raw = self.model.complete(&prompt).await?;
        let request = parse_action_response(&raw);
        tracing::debug!(client_id = %profile.id, action = %request.name, params = ?request.params, "classified");
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PERSONA;
    use crate::testing::ScriptedChat;

    #[test]
    fn test_prompt_replaces_persona() {
        let mut profile = ClientProfile::new("c-1", "Dana");
        profile.push_message(ChatMessage::user("save 5 a day"), 40);

        let prompt = ActionClassifier::build_prompt(&profile);
        assert_eq!(prompt.len(), 2);
        assert!(prompt[0].is_system());
        assert!(prompt[0].content.contains("SET_DAILY_SAVING_AMOUNT:"));
        assert!(prompt[0].content.contains("Name: Dana"));
        assert!(!prompt.iter().any(|m| m.content == PERSONA));
        assert_eq!(prompt[1].content, "save 5 a day");
    }

    #[tokio::test]
    async fn test_classify_parses_model_output() {
        let model = Arc::new(ScriptedChat::new(&["<think>hmm</think> DEPOSIT | 20"]));
        let classifier = ActionClassifier::new(model.clone());
        let mut profile = ClientProfile::new("c-1", "Dana");
        profile.push_message(ChatMessage::user("deposit 20"), 40);

        let request = classifier.classify(&profile).await.unwrap();
        assert_eq!(request, ActionRequest::new("DEPOSIT", vec!["20".to_string()]));
        // the history itself is untouched
        assert_eq!(profile.messages.len(), 2);
        assert_eq!(model.prompts().len(), 1);
    }
}
