use async_trait::async_trait;
use sprout_core::error::Result;
use sprout_whatsapp::ConversationHandler;

use super::Advisor;

const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "q"];
const EXIT_REPLY: &str = "You have exited the session. Type START to rejoin.";

impl Advisor {
    /// Client id for a channel address: explicit mapping first, then the
    /// default client.
    fn client_for(&self, sender: &str) -> Option<String> {
        if let Some(id) = self.settings.senders.get(sender) {
            return Some(id.clone());
        }
        if self.settings.default_client_id.is_empty() {
            tracing::warn!(sender, "message from unmapped sender");
            return None;
        }
        Some(self.settings.default_client_id.clone())
    }

    /// Registered clients ranked by level, then experience.
    pub async fn leaderboard(&self) -> String {
        let mut profiles = self.store.snapshots().await;
        profiles.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then(b.experience.cmp(&a.experience))
                .then_with(|| a.name.cmp(&b.name))
        });
        let mut board = String::from("🏆 Leaderboard:");
        for (rank, p) in profiles.iter().enumerate() {
            board.push_str(&format!(
                "\n{}. {} (Level: {}, Exp: {})",
                rank + 1,
                p.name,
                p.level,
                p.experience
            ));
        }
        board
    }
}

#[async_trait]
impl ConversationHandler for Advisor {
    async fn handle_message(&self, sender: &str, text: &str) -> Result<Vec<String>> {
        let Some(client_id) = self.client_for(sender) else {
            return Ok(Vec::new());
        };
        let command = text.trim().to_lowercase();

        if EXIT_COMMANDS.contains(&command.as_str()) {
            return Ok(vec![EXIT_REPLY.to_string()]);
        }
        if command == "info" {
            return Ok(self
                .store
                .snapshot(&client_id)
                .await
                .map(|p| p.info_card())
                .into_iter()
                .collect());
        }
        if command.contains("leaderboard") {
            return Ok(vec![self.leaderboard().await]);
        }

        let Some(turn) = self.handle_turn(&client_id, text).await else {
            return Ok(Vec::new());
        };
        let mut replies = turn.direct;
        if !turn.reply.is_empty() {
            replies.push(turn.reply);
        }
        Ok(replies)
    }

    async fn daily_quiz(&self, sender: &str) -> Result<Option<String>> {
        match self.client_for(sender) {
            Some(client_id) => Advisor::daily_quiz(self, &client_id).await,
            None => Ok(None),
        }
    }

    async fn daily_check(&self, sender: &str) -> Result<Option<String>> {
        match self.client_for(sender) {
            Some(client_id) => Advisor::daily_check(self, &client_id).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::harness;
    use super::*;
    use crate::testing::MockInvest;

    #[tokio::test]
    async fn test_exit_commands_skip_llm() {
        let h = harness(MockInvest::default(), &[], &[]);
        h.advisor.register_client("c-1").await;
        for text in ["exit", " QUIT ", "q"] {
            let replies = h.advisor.handle_message("whatsapp:+1", text).await.unwrap();
            assert_eq!(replies, vec![EXIT_REPLY]);
        }
        assert!(h.intent.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_info_returns_card() {
        let h = harness(MockInvest::default(), &[], &[]);
        h.advisor.register_client("c-1").await;
        let replies = h.advisor.handle_message("whatsapp:+1", "Info").await.unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Remote Name"));
    }

    #[tokio::test]
    async fn test_leaderboard_ranks_by_level_then_exp() {
        let h = harness(MockInvest::default(), &[], &[]);
        for id in ["c-1", "c-2", "c-3"] {
            h.advisor.register_client(id).await;
        }
        {
            let mut p = h.advisor.store().lock("c-2").await.unwrap();
            p.name = "Ana".to_string();
            p.add_experience(150);
        }
        {
            let mut p = h.advisor.store().lock("c-3").await.unwrap();
            p.name = "Bo".to_string();
            p.add_experience(50);
        }
        let replies = h
            .advisor
            .handle_message("whatsapp:+1", "show me the LEADERBOARD")
            .await
            .unwrap();
        let board = &replies[0];
        let ana = board.find("Ana").unwrap();
        let bo = board.find("Bo").unwrap();
        let remote = board.find("Remote Name").unwrap();
        assert!(ana < bo && bo < remote, "{board}");
        assert!(board.contains("1. Ana (Level: 2, Exp: 50)"));
    }

    #[tokio::test]
    async fn test_sender_mapping_and_turn() {
        let h = harness(MockInvest::default(), &["GET_INFO"], &["Sent!"]);
        h.advisor.register_client("c-2").await;
        let replies = h.advisor.handle_message("whatsapp:+2", "my stats?").await.unwrap();
        assert_eq!(replies.len(), 2);
        assert!(replies[0].contains("Level 1"));
        assert_eq!(replies[1], "Sent!");
    }

    #[tokio::test]
    async fn test_unregistered_default_client_is_silent() {
        let h = harness(MockInvest::default(), &[], &[]);
        let replies = h.advisor.handle_message("whatsapp:+9", "hello").await.unwrap();
        assert!(replies.is_empty());
    }
}
