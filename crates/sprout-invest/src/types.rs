use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Investment strategies the account API offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioStrategy {
    AggressiveGrowth,
    Growth,
    Balanced,
    Conservative,
    VeryConservative,
}

impl PortfolioStrategy {
    pub const ALL: [PortfolioStrategy; 5] = [
        Self::AggressiveGrowth,
        Self::Growth,
        Self::Balanced,
        Self::Conservative,
        Self::VeryConservative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AggressiveGrowth => "aggressive_growth",
            Self::Growth => "growth",
            Self::Balanced => "balanced",
            Self::Conservative => "conservative",
            Self::VeryConservative => "very_conservative",
        }
    }

    /// Comma-separated list of every strategy name, for prompts and errors.
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for PortfolioStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortfolioStrategy {
    type Err = String;

    /// Accepts the API spelling case-insensitively, with spaces or hyphens
    /// in place of underscores ("Very Conservative" parses).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| format!("unknown strategy '{s}', expected one of: {}", Self::names()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cash: f64,
}

/// Body of a client update. At least one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ClientUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: None,
        }
    }

    pub fn email(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: Some(email.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, alias = "investedAmount")]
    pub invested_amount: f64,
    #[serde(default, alias = "currentValue")]
    pub current_value: f64,
}

impl Portfolio {
    /// Parsed strategy, `None` when the server reports a type we don't know.
    pub fn strategy(&self) -> Option<PortfolioStrategy> {
        self.kind.parse().ok()
    }
}

/// Sums across a client's portfolios.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PortfolioTotals {
    pub invested: f64,
    pub current_value: f64,
}

impl PortfolioTotals {
    pub fn of(portfolios: &[Portfolio]) -> Self {
        portfolios.iter().fold(Self::default(), |acc, p| Self {
            invested: acc.invested + p.invested_amount,
            current_value: acc.current_value + p.current_value,
        })
    }

    pub fn gain(&self) -> f64 {
        self.current_value - self.invested
    }
}
