mod store;

pub use store::ClientStore;

use chrono::{DateTime, FixedOffset};
use sprout_core::types::ChatMessage;

use crate::prompt::PERSONA;

/// Experience needed to leave level 1.
pub const BASE_EXP_THRESHOLD: u32 = 100;
/// Extra experience needed per level after the first.
pub const EXP_THRESHOLD_INCREMENT: u32 = 10;
pub const EXP_DAILY_SAVING: u32 = 20;
pub const EXP_WEEKLY_INVEST: u32 = 50;
pub const DEFAULT_DAILY_SAVING: f64 = 5.0;
/// Smallest history window: user message, injected follow-up, reply.
pub const MIN_HISTORY_LIMIT: usize = 3;

/// Threshold to reach the level after `level`, once `level` has been reached
/// by levelling up.
pub fn exp_threshold(level: u32) -> u32 {
    BASE_EXP_THRESHOLD + level * EXP_THRESHOLD_INCREMENT
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streaks {
    /// Days with a completed saving.
    pub saving: u32,
    /// Weeks with a completed investment.
    pub investing: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavingTarget {
    pub item: Option<String>,
    pub amount: f64,
}

impl std::fmt::Display for SavingTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.item {
            Some(item) => write!(f, "{item} (${:.2})", self.amount),
            None => write!(f, "not set (${:.2})", self.amount),
        }
    }
}

/// Result of marking a habit done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakOutcome {
    Recorded { streak: u32, levels_gained: u32 },
    /// Already recorded on the same calendar day; nothing changed.
    AlreadyDone { streak: u32 },
}

#[derive(Debug, Clone)]
pub struct ClientProfile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub level: u32,
    pub experience: u32,
    pub exp_to_next_level: u32,
    pub streaks: Streaks,
    pub target: SavingTarget,
    pub daily_saving_amount: f64,
    pub last_saving_at: Option<DateTime<FixedOffset>>,
    pub last_invest_at: Option<DateTime<FixedOffset>>,
    pub last_quiz_at: Option<DateTime<FixedOffset>>,
    /// Persisted conversation. The first entry is always the persona.
    pub messages: Vec<ChatMessage>,
}

impl ClientProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            level: 1,
            experience: 0,
            exp_to_next_level: BASE_EXP_THRESHOLD,
            streaks: Streaks::default(),
            target: SavingTarget::default(),
            daily_saving_amount: DEFAULT_DAILY_SAVING,
            last_saving_at: None,
            last_invest_at: None,
            last_quiz_at: None,
            messages: vec![ChatMessage::system(PERSONA)],
        }
    }

    /// Grant experience and level up while the threshold is reached.
    /// Returns the number of levels gained.
    pub fn add_experience(&mut self, exp: u32) -> u32 {
        self.experience += exp;
        let mut gained = 0;
        // threshold never drops below BASE_EXP_THRESHOLD, so this terminates
        while self.experience >= self.exp_to_next_level {
            self.experience -= self.exp_to_next_level;
            self.level += 1;
            self.exp_to_next_level = exp_threshold(self.level);
            gained += 1;
        }
        gained
    }

    pub fn complete_daily_saving(&mut self, now: DateTime<FixedOffset>) -> StreakOutcome {
        if same_day(self.last_saving_at, now) {
            return StreakOutcome::AlreadyDone {
                streak: self.streaks.saving,
            };
        }
        self.last_saving_at = Some(now);
        self.streaks.saving += 1;
        let levels_gained = self.add_experience(EXP_DAILY_SAVING);
        StreakOutcome::Recorded {
            streak: self.streaks.saving,
            levels_gained,
        }
    }

    /// Same calendar-day guard as daily saving, not a 7-day window.
    pub fn complete_weekly_invest(&mut self, now: DateTime<FixedOffset>) -> StreakOutcome {
        if same_day(self.last_invest_at, now) {
            return StreakOutcome::AlreadyDone {
                streak: self.streaks.investing,
            };
        }
        self.last_invest_at = Some(now);
        self.streaks.investing += 1;
        let levels_gained = self.add_experience(EXP_WEEKLY_INVEST);
        StreakOutcome::Recorded {
            streak: self.streaks.investing,
            levels_gained,
        }
    }

    pub fn saved_on(&self, now: DateTime<FixedOffset>) -> bool {
        same_day(self.last_saving_at, now)
    }

    pub fn quizzed_on(&self, now: DateTime<FixedOffset>) -> bool {
        same_day(self.last_quiz_at, now)
    }

    /// Append to the history, dropping the oldest non-persona messages once
    /// more than `limit` follow the persona. `limit` is raised to
    /// [`MIN_HISTORY_LIMIT`] so a turn never loses its own user message.
    pub fn push_message(&mut self, message: ChatMessage, limit: usize) {
        self.messages.push(message);
        let limit = limit.max(MIN_HISTORY_LIMIT);
        let excess = self.messages.len().saturating_sub(limit + 1);
        if excess > 0 {
            self.messages.drain(1..1 + excess);
        }
    }

    /// One-line summary handed to the LLM as context.
    pub fn summary(&self) -> String {
        format!(
            "Name: {}, Level: {}, Exp: {}, ExpToNextLevel: {}, \
             Streaks: Saving={}, Investing={}, \
             Saving Target: {}, Daily Saving Amount: ${:.2}",
            self.name,
            self.level,
            self.experience,
            self.exp_to_next_level,
            self.streaks.saving,
            self.streaks.investing,
            self.target,
            self.daily_saving_amount,
        )
    }

    /// Formatted card sent straight to the user.
    pub fn info_card(&self) -> String {
        let mut card = format!(
            "*{}*\nLevel {} ({}/{} exp)\nSaving streak: {} day(s)\nInvesting streak: {} week(s)\n",
            self.name,
            self.level,
            self.experience,
            self.exp_to_next_level,
            self.streaks.saving,
            self.streaks.investing,
        );
        match &self.target {
            SavingTarget { item: Some(item), amount } => {
                card.push_str(&format!("Saving for: {item} (${amount:.2})\n"));
            }
            SavingTarget { item: None, .. } => card.push_str("Saving for: not set yet\n"),
        }
        card.push_str(&format!("Daily saving: ${:.2}", self.daily_saving_amount));
        if let Some(email) = &self.email {
            card.push_str(&format!("\nEmail: {email}"));
        }
        card
    }
}

fn same_day(last: Option<DateTime<FixedOffset>>, now: DateTime<FixedOffset>) -> bool {
    last.is_some_and(|t| t.date_naive() == now.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 9, day, hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_profile_defaults() {
        let p = ClientProfile::new("c-1", "Dana");
        assert_eq!(p.level, 1);
        assert_eq!(p.experience, 0);
        assert_eq!(p.exp_to_next_level, 100);
        assert_eq!(p.daily_saving_amount, 5.0);
        assert_eq!(p.messages.len(), 1);
        assert!(p.messages[0].is_system());
    }

    #[test]
    fn test_add_experience_crosses_two_thresholds() {
        let mut p = ClientProfile::new("c", "n");
        let gained = p.add_experience(250);
        assert_eq!(gained, 2);
        assert_eq!(p.level, 3);
        // 250 - 100 - 120
        assert_eq!(p.experience, 30);
        assert_eq!(p.exp_to_next_level, 130);
        assert!(p.experience < p.exp_to_next_level);
    }

    #[test]
    fn test_add_experience_exact_threshold_levels_up() {
        let mut p = ClientProfile::new("c", "n");
        assert_eq!(p.add_experience(100), 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.experience, 0);
        assert_eq!(p.exp_to_next_level, 120);
    }

    #[test]
    fn test_add_experience_below_threshold() {
        let mut p = ClientProfile::new("c", "n");
        assert_eq!(p.add_experience(99), 0);
        assert_eq!(p.level, 1);
        assert_eq!(p.experience, 99);
    }

    #[test]
    fn test_daily_saving_once_per_day() {
        let mut p = ClientProfile::new("c", "n");
        assert_eq!(
            p.complete_daily_saving(at(1, 8)),
            StreakOutcome::Recorded { streak: 1, levels_gained: 0 }
        );
        assert_eq!(
            p.complete_daily_saving(at(1, 23)),
            StreakOutcome::AlreadyDone { streak: 1 }
        );
        assert_eq!(p.streaks.saving, 1);
        assert_eq!(p.experience, EXP_DAILY_SAVING);

        assert_eq!(
            p.complete_daily_saving(at(2, 0)),
            StreakOutcome::Recorded { streak: 2, levels_gained: 0 }
        );
        assert_eq!(p.experience, 2 * EXP_DAILY_SAVING);
    }

    #[test]
    fn test_weekly_invest_grants_more_exp() {
        let mut p = ClientProfile::new("c", "n");
        p.complete_weekly_invest(at(1, 9));
        p.complete_weekly_invest(at(1, 10));
        p.complete_weekly_invest(at(3, 10));
        assert_eq!(p.streaks.investing, 2);
        // 100 exp: exactly one level
        assert_eq!(p.level, 2);
        assert_eq!(p.experience, 0);
    }

    #[test]
    fn test_push_message_keeps_persona() {
        let mut p = ClientProfile::new("c", "n");
        for i in 0..5 {
            p.push_message(ChatMessage::user(format!("m{i}")), 3);
        }
        assert_eq!(p.messages.len(), 4);
        assert_eq!(p.messages[0].content, PERSONA);
        assert_eq!(p.messages[1].content, "m2");
        assert_eq!(p.messages[3].content, "m4");
    }

    #[test]
    fn test_tiny_limit_keeps_current_turn() {
        let mut p = ClientProfile::new("c", "n");
        p.push_message(ChatMessage::user("older"), 1);
        p.push_message(ChatMessage::user("I want a bike"), 1);
        p.push_message(ChatMessage::system("follow-up"), 1);
        let contents: Vec<&str> = p.messages[1..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["older", "I want a bike", "follow-up"]);

        p.push_message(ChatMessage::assistant("Nice!"), 0);
        let contents: Vec<&str> = p.messages[1..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["I want a bike", "follow-up", "Nice!"]);
    }

    #[test]
    fn test_summary_and_card_show_target() {
        let mut p = ClientProfile::new("c", "Dana");
        assert!(p.info_card().contains("not set yet"));
        p.target = SavingTarget {
            item: Some("bike".to_string()),
            amount: 200.0,
        };
        assert!(p.summary().contains("Saving Target: bike ($200.00)"));
        assert!(p.info_card().contains("Saving for: bike ($200.00)"));
    }
}
