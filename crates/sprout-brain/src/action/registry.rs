use std::fmt;

use sprout_invest::types::PortfolioStrategy;

/// Every action the classifier may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    SetTargetItem,
    SetDailySavingAmount,
    DoneDailySaving,
    DoneWeeklyInvest,
    GetInfo,
    NeedMoreInfo,
    Withdraw,
    Transfer,
    Deposit,
    CreatePortfolio,
    GetPortfolios,
    AnalyzePortfolio,
    SimulatePortfolios,
    UpdateName,
    UpdateEmail,
    NoAction,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetTargetItem => "SET_TARGET_ITEM",
            Self::SetDailySavingAmount => "SET_DAILY_SAVING_AMOUNT",
            Self::DoneDailySaving => "DONE_DAILY_SAVING",
            Self::DoneWeeklyInvest => "DONE_WEEKLY_INVEST",
            Self::GetInfo => "GET_INFO",
            Self::NeedMoreInfo => "NEED_MORE_INFO",
            Self::Withdraw => "WITHDRAW",
            Self::Transfer => "TRANSFER",
            Self::Deposit => "DEPOSIT",
            Self::CreatePortfolio => "CREATE_PORTFOLIO",
            Self::GetPortfolios => "GET_PORTFOLIOS",
            Self::AnalyzePortfolio => "ANALYZE_PORTFOLIO",
            Self::SimulatePortfolios => "SIMULATE_PORTFOLIOS",
            Self::UpdateName => "UPDATE_NAME",
            Self::UpdateEmail => "UPDATE_EMAIL",
            Self::NoAction => "NO_ACTION",
        }
    }

    /// Exact match after trimming and uppercasing. Anything else, including
    /// names with extra words around them, is unknown.
    pub fn parse(token: &str) -> Option<Self> {
        let normalized = token.trim().to_uppercase();
        ACTIONS
            .iter()
            .map(|d| d.kind)
            .find(|kind| kind.name() == normalized)
    }

    pub fn descriptor(&self) -> &'static ActionDescriptor {
        // ACTIONS is in variant declaration order
        &ACTIONS[*self as usize]
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic type of a parameter. Drives both the prompt text and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Non-empty free text.
    Text,
    /// Free text where `null` means "clear it".
    OptionalText,
    /// Number ≥ 0.
    Amount,
    /// Number > 0.
    PositiveAmount,
    /// Whole number of months.
    Months,
    Strategy,
    /// Portfolio id, or a strategy name the client holds.
    Portfolio,
    Email,
}

impl ParamKind {
    fn label(&self) -> String {
        match self {
            Self::Text => "string".to_string(),
            Self::OptionalText => "string, or 'null' to clear".to_string(),
            Self::Amount => "number".to_string(),
            Self::PositiveAmount => "number greater than 0".to_string(),
            Self::Months => "whole number from 1 to 12".to_string(),
            Self::Strategy => format!("one of: {}", PortfolioStrategy::names()),
            Self::Portfolio => "portfolio id or strategy name".to_string(),
            Self::Email => "email address".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct ActionDescriptor {
    pub kind: ActionKind,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ActionDescriptor {
    /// Delimited parameter layout, e.g. `item | amount`.
    pub fn format(&self) -> String {
        self.params
            .iter()
            .map(|p| p.name)
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Catalogue entry for the classifier prompt.
    pub fn render(&self) -> String {
        let params = if self.params.is_empty() {
            "none".to_string()
        } else {
            self.params
                .iter()
                .map(|p| format!("{} ({}) - {}", p.name, p.kind.label(), p.description))
                .collect::<Vec<_>>()
                .join("; ")
        };
        let usage = if self.params.is_empty() {
            self.kind.name().to_string()
        } else {
            format!("{} | {}", self.kind.name(), self.format())
        };
        format!(
            "{}:\nDescription: {}\nParameters: {params}\nFormat: {usage}",
            self.kind.name(),
            self.description
        )
    }
}

/// The action catalogue, in prompt order. NO_ACTION stays last.
pub static ACTIONS: &[ActionDescriptor] = &[
    ActionDescriptor {
        kind: ActionKind::SetTargetItem,
        description: "The user states a savings goal (an item to save for) AND the amount needed. Example: 'I want to save $200 for a bike.'",
        params: &[
            ParamSpec { name: "item", kind: ParamKind::OptionalText, description: "what the user is saving for" },
            ParamSpec { name: "amount", kind: ParamKind::Amount, description: "amount needed for the item" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::SetDailySavingAmount,
        description: "The user sets or changes how much they want to save each day. Example: 'Save $5 daily.'",
        params: &[
            ParamSpec { name: "amount", kind: ParamKind::Amount, description: "daily saving amount" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::DoneDailySaving,
        description: "The user confirms they completed today's saving. Example: 'I saved my $5 today.'",
        params: &[],
    },
    ActionDescriptor {
        kind: ActionKind::DoneWeeklyInvest,
        description: "The user confirms they completed this week's investing. Example: 'I did my weekly investment.'",
        params: &[],
    },
    ActionDescriptor {
        kind: ActionKind::GetInfo,
        description: "The user asks for their own info: level, exp, streaks, target, daily saving amount. Example: 'What is my level?'",
        params: &[],
    },
    ActionDescriptor {
        kind: ActionKind::NeedMoreInfo,
        description: "ONLY when the user clearly wants an action but left out required details (amount, portfolio, item). Ask one specific follow-up question. Example: 'I want to invest' without an amount.",
        params: &[
            ParamSpec { name: "question", kind: ParamKind::Text, description: "the clarifying question to ask" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::Withdraw,
        description: "The user wants to take money out of one of their portfolios back to cash. Example: 'Withdraw $100 from my growth portfolio.'",
        params: &[
            ParamSpec { name: "amount", kind: ParamKind::PositiveAmount, description: "amount to withdraw" },
            ParamSpec { name: "portfolio", kind: ParamKind::Portfolio, description: "portfolio to withdraw from" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::Transfer,
        description: "The user wants to invest cash into one of their portfolios. Example: 'Put $50 into my balanced portfolio.'",
        params: &[
            ParamSpec { name: "amount", kind: ParamKind::PositiveAmount, description: "amount to invest" },
            ParamSpec { name: "portfolio", kind: ParamKind::Portfolio, description: "portfolio to invest in" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::Deposit,
        description: "The user wants to add money to their cash balance. Example: 'Deposit $20 into my account.'",
        params: &[
            ParamSpec { name: "amount", kind: ParamKind::PositiveAmount, description: "amount to deposit" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::CreatePortfolio,
        description: "The user wants to open a new investment portfolio with a given strategy. Example: 'Open a conservative portfolio.'",
        params: &[
            ParamSpec { name: "strategy", kind: ParamKind::Strategy, description: "investment strategy" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::GetPortfolios,
        description: "The user asks which portfolios they have or how they are doing. Example: 'Show my portfolios.'",
        params: &[],
    },
    ActionDescriptor {
        kind: ActionKind::AnalyzePortfolio,
        description: "The user asks how one specific portfolio has performed: its past returns. Example: 'How has my growth portfolio done this year?'",
        params: &[
            ParamSpec { name: "portfolio", kind: ParamKind::Portfolio, description: "portfolio to analyze" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::SimulatePortfolios,
        description: "The user asks how their portfolios could grow over the next months. Example: 'What will my investments look like in 6 months?'",
        params: &[
            ParamSpec { name: "months", kind: ParamKind::Months, description: "how many months to project" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::UpdateName,
        description: "The user wants to change the name on their account. Example: 'Call me Sam from now on.'",
        params: &[
            ParamSpec { name: "name", kind: ParamKind::Text, description: "new display name" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::UpdateEmail,
        description: "The user wants to change their account email. Example: 'My new email is sam@example.com.'",
        params: &[
            ParamSpec { name: "email", kind: ParamKind::Email, description: "new email address" },
        ],
    },
    ActionDescriptor {
        kind: ActionKind::NoAction,
        description: "The message does not correspond to any action above; just chat.",
        params: &[],
    },
];

/// Render the whole catalogue for the classifier prompt.
pub fn render_catalog() -> String {
    ACTIONS
        .iter()
        .map(ActionDescriptor::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_kind_has_one_descriptor() {
        let kinds: HashSet<ActionKind> = ACTIONS.iter().map(|d| d.kind).collect();
        assert_eq!(kinds.len(), ACTIONS.len());
        for (i, descriptor) in ACTIONS.iter().enumerate() {
            assert_eq!(descriptor.kind as usize, i);
            assert_eq!(descriptor.kind.descriptor().kind, descriptor.kind);
        }
    }

    #[test]
    fn test_no_name_is_substring_of_another() {
        for a in ACTIONS {
            for b in ACTIONS {
                if a.kind != b.kind {
                    assert!(
                        !b.kind.name().contains(a.kind.name()),
                        "{} is contained in {}",
                        a.kind,
                        b.kind
                    );
                }
            }
        }
    }

    #[test]
    fn test_parse_is_exact_and_case_insensitive() {
        assert_eq!(ActionKind::parse("no_action"), Some(ActionKind::NoAction));
        assert_eq!(ActionKind::parse("  GET_INFO \n"), Some(ActionKind::GetInfo));
        assert_eq!(ActionKind::parse("Action: GET_INFO"), None);
        assert_eq!(ActionKind::parse("GET_INFO."), None);
        assert_eq!(ActionKind::parse("SET_DAILY_SAVING"), None);
        assert_eq!(ActionKind::parse(""), None);
    }

    #[test]
    fn test_format_and_render() {
        let d = ActionKind::SetTargetItem.descriptor();
        assert_eq!(d.format(), "item | amount");
        let rendered = d.render();
        assert!(rendered.starts_with("SET_TARGET_ITEM:\n"));
        assert!(rendered.contains("Format: SET_TARGET_ITEM | item | amount"));

        let rendered = ActionKind::NoAction.descriptor().render();
        assert!(rendered.contains("Parameters: none"));
        assert!(rendered.ends_with("Format: NO_ACTION"));
    }

    #[test]
    fn test_catalog_lists_every_action() {
        let catalog = render_catalog();
        for d in ACTIONS {
            assert!(catalog.contains(&format!("{}:\n", d.kind.name())));
        }
        assert!(catalog.contains("very_conservative"));
    }
}
