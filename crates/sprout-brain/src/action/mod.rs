//! Intent-to-action core: the catalogue, the response parser, parameter
//! validation into a typed [`Action`], and the dispatcher that executes it.

mod dispatch;
mod handlers;
pub mod parser;
pub mod registry;

pub use dispatch::Dispatcher;
pub use parser::{parse_action_response, strip_reasoning, ActionRequest};
pub use registry::{render_catalog, ActionDescriptor, ActionKind, ParamKind, ParamSpec, ACTIONS};

use sprout_invest::client::MAX_SIMULATION_MONTHS;
use sprout_invest::types::PortfolioStrategy;

/// Token meaning "no value" for optional text parameters.
const NULL_TOKEN: &str = "null";

/// Where money goes to or comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioRef {
    Id(String),
    /// Resolved to the client's portfolio of this strategy.
    Strategy(PortfolioStrategy),
}

impl std::fmt::Display for PortfolioRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "portfolio {id}"),
            Self::Strategy(s) => write!(f, "{s} portfolio"),
        }
    }
}

/// A validated action, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetTargetItem { item: Option<String>, amount: f64 },
    SetDailySavingAmount { amount: f64 },
    DoneDailySaving,
    DoneWeeklyInvest,
    GetInfo,
    NeedMoreInfo { question: String },
    Withdraw { amount: f64, portfolio: PortfolioRef },
    Transfer { amount: f64, portfolio: PortfolioRef },
    Deposit { amount: f64 },
    CreatePortfolio { strategy: PortfolioStrategy },
    GetPortfolios,
    AnalyzePortfolio { portfolio: PortfolioRef },
    SimulatePortfolios { months: u32 },
    UpdateName { name: String },
    UpdateEmail { email: String },
    NoAction,
}

impl Action {
    /// Check arity against the descriptor, then the type of every parameter.
    pub fn from_request(kind: ActionKind, params: &[String]) -> Result<Self, DispatchFailure> {
        let descriptor = kind.descriptor();
        if params.len() != descriptor.params.len() {
            return Err(DispatchFailure::Arity {
                action: kind,
                expected: descriptor.params.len(),
                got: params.len(),
            });
        }

        let values = descriptor
            .params
            .iter()
            .zip(params)
            .map(|(spec, raw)| {
                validate_param(spec.kind, raw)
                    .map(|value| (spec.name, value))
                    .map_err(|reason| DispatchFailure::InvalidParam {
                        action: kind,
                        param: spec.name,
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut values = Values::new(kind, values);

        let action = match kind {
            ActionKind::SetTargetItem => Self::SetTargetItem {
                item: values.text()?,
                amount: values.number()?,
            },
            ActionKind::SetDailySavingAmount => Self::SetDailySavingAmount {
                amount: values.number()?,
            },
            ActionKind::DoneDailySaving => Self::DoneDailySaving,
            ActionKind::DoneWeeklyInvest => Self::DoneWeeklyInvest,
            ActionKind::GetInfo => Self::GetInfo,
            ActionKind::NeedMoreInfo => Self::NeedMoreInfo {
                question: values.required_text()?,
            },
            ActionKind::Withdraw => Self::Withdraw {
                amount: values.number()?,
                portfolio: values.portfolio()?,
            },
            ActionKind::Transfer => Self::Transfer {
                amount: values.number()?,
                portfolio: values.portfolio()?,
            },
            ActionKind::Deposit => Self::Deposit {
                amount: values.number()?,
            },
            ActionKind::CreatePortfolio => Self::CreatePortfolio {
                strategy: values.strategy()?,
            },
            ActionKind::GetPortfolios => Self::GetPortfolios,
            ActionKind::AnalyzePortfolio => Self::AnalyzePortfolio {
                portfolio: values.portfolio()?,
            },
            ActionKind::SimulatePortfolios => Self::SimulatePortfolios {
                months: values.number()? as u32,
            },
            ActionKind::UpdateName => Self::UpdateName {
                name: values.required_text()?,
            },
            ActionKind::UpdateEmail => Self::UpdateEmail {
                email: values.required_text()?,
            },
            ActionKind::NoAction => Self::NoAction,
        };
        Ok(action)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::SetTargetItem { .. } => ActionKind::SetTargetItem,
            Self::SetDailySavingAmount { .. } => ActionKind::SetDailySavingAmount,
            Self::DoneDailySaving => ActionKind::DoneDailySaving,
            Self::DoneWeeklyInvest => ActionKind::DoneWeeklyInvest,
            Self::GetInfo => ActionKind::GetInfo,
            Self::NeedMoreInfo { .. } => ActionKind::NeedMoreInfo,
            Self::Withdraw { .. } => ActionKind::Withdraw,
            Self::Transfer { .. } => ActionKind::Transfer,
            Self::Deposit { .. } => ActionKind::Deposit,
            Self::CreatePortfolio { .. } => ActionKind::CreatePortfolio,
            Self::GetPortfolios => ActionKind::GetPortfolios,
            Self::AnalyzePortfolio { .. } => ActionKind::AnalyzePortfolio,
            Self::SimulatePortfolios { .. } => ActionKind::SimulatePortfolios,
            Self::UpdateName { .. } => ActionKind::UpdateName,
            Self::UpdateEmail { .. } => ActionKind::UpdateEmail,
            Self::NoAction => ActionKind::NoAction,
        }
    }
}

enum ParamValue {
    Text(Option<String>),
    Number(f64),
    Strategy(PortfolioStrategy),
    Portfolio(PortfolioRef),
}

/// Validated parameters in descriptor order. Taking a value of the wrong
/// shape is an `InvalidParam`, never a silent default.
struct Values {
    action: ActionKind,
    items: std::vec::IntoIter<(&'static str, ParamValue)>,
}

impl Values {
    fn new(action: ActionKind, items: Vec<(&'static str, ParamValue)>) -> Self {
        Self {
            action,
            items: items.into_iter(),
        }
    }

    fn invalid(&self, param: &'static str, reason: &str) -> DispatchFailure {
        DispatchFailure::InvalidParam {
            action: self.action,
            param,
            reason: reason.to_string(),
        }
    }

    fn next(&mut self) -> Result<(&'static str, ParamValue), DispatchFailure> {
        self.items
            .next()
            .ok_or_else(|| self.invalid("?", "missing value"))
    }

    fn text(&mut self) -> Result<Option<String>, DispatchFailure> {
        match self.next()? {
            (_, ParamValue::Text(text)) => Ok(text),
            (param, _) => Err(self.invalid(param, "expected text")),
        }
    }

    fn required_text(&mut self) -> Result<String, DispatchFailure> {
        match self.next()? {
            (_, ParamValue::Text(Some(text))) => Ok(text),
            (param, _) => Err(self.invalid(param, "expected text")),
        }
    }

    fn number(&mut self) -> Result<f64, DispatchFailure> {
        match self.next()? {
            (_, ParamValue::Number(n)) => Ok(n),
            (param, _) => Err(self.invalid(param, "expected a number")),
        }
    }

    fn strategy(&mut self) -> Result<PortfolioStrategy, DispatchFailure> {
        match self.next()? {
            (_, ParamValue::Strategy(strategy)) => Ok(strategy),
            (param, _) => Err(self.invalid(param, "not a strategy")),
        }
    }

    fn portfolio(&mut self) -> Result<PortfolioRef, DispatchFailure> {
        match self.next()? {
            (_, ParamValue::Portfolio(portfolio)) => Ok(portfolio),
            (_, ParamValue::Strategy(strategy)) => Ok(PortfolioRef::Strategy(strategy)),
            (param, _) => Err(self.invalid(param, "expected a portfolio")),
        }
    }
}

fn validate_param(kind: ParamKind, raw: &str) -> Result<ParamValue, String> {
    let raw = raw.trim();
    match kind {
        ParamKind::Text => non_empty(raw).map(|s| ParamValue::Text(Some(s))),
        ParamKind::OptionalText => {
            if raw.eq_ignore_ascii_case(NULL_TOKEN) {
                Ok(ParamValue::Text(None))
            } else {
                non_empty(raw).map(|s| ParamValue::Text(Some(s)))
            }
        }
        ParamKind::Amount => {
            let n = parse_number(raw)?;
            if n < 0.0 {
                return Err(format!("'{raw}' must not be negative"));
            }
            Ok(ParamValue::Number(n))
        }
        ParamKind::PositiveAmount => {
            let n = parse_number(raw)?;
            if n <= 0.0 {
                return Err(format!("'{raw}' must be greater than zero"));
            }
            Ok(ParamValue::Number(n))
        }
        ParamKind::Months => {
            let months: u32 = raw
                .parse()
                .map_err(|_| format!("'{raw}' is not a whole number of months"))?;
            if !(1..=MAX_SIMULATION_MONTHS).contains(&months) {
                return Err(format!("months must be between 1 and {MAX_SIMULATION_MONTHS}"));
            }
            Ok(ParamValue::Number(f64::from(months)))
        }
        ParamKind::Strategy => raw.parse().map(ParamValue::Strategy),
        ParamKind::Portfolio => {
            let id = non_empty(raw)?;
            Ok(ParamValue::Portfolio(match id.parse::<PortfolioStrategy>() {
                Ok(strategy) => PortfolioRef::Strategy(strategy),
                Err(_) => PortfolioRef::Id(id),
            }))
        }
        ParamKind::Email => {
            let email = non_empty(raw)?;
            let valid = !email.contains(char::is_whitespace)
                && email
                    .split_once('@')
                    .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
            if !valid {
                return Err(format!("'{email}' is not an email address"));
            }
            Ok(ParamValue::Text(Some(email)))
        }
    }
}

fn non_empty(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        Err("value is empty".to_string())
    } else {
        Ok(raw.to_string())
    }
}

/// Parse a finite number, tolerating a leading `$`.
fn parse_number(raw: &str) -> Result<f64, String> {
    let digits = raw.strip_prefix('$').unwrap_or(raw).trim();
    match digits.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(format!("'{raw}' is not a number")),
    }
}

/// Why an action did not complete.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchFailure {
    /// The classifier could not be reached.
    Classification(String),
    UnknownAction(String),
    Arity {
        action: ActionKind,
        expected: usize,
        got: usize,
    },
    InvalidParam {
        action: ActionKind,
        param: &'static str,
        reason: String,
    },
    /// A business rule refused the action (duplicate strategy, unknown portfolio).
    Rejected(String),
    /// The account API returned an error; carries its message.
    Remote(String),
}

impl std::fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classification(msg) => write!(f, "classification failed: {msg}"),
            Self::UnknownAction(name) => write!(f, "unknown action '{name}'"),
            Self::Arity { action, expected, got } => {
                write!(f, "{action} expects {expected} parameter(s), got {got}")
            }
            Self::InvalidParam { action, param, reason } => {
                write!(f, "{action} parameter '{param}': {reason}")
            }
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
            Self::Remote(msg) => write!(f, "remote error: {msg}"),
        }
    }
}

/// Outcome of one dispatch, consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DispatchResult {
    /// No further correction is needed before the reply.
    pub success: bool,
    /// Guidance for the next LLM call, never shown verbatim.
    pub follow_up: Option<String>,
    /// Text delivered to the user as-is.
    pub direct_message: Option<String>,
    pub failure: Option<DispatchFailure>,
}

impl DispatchResult {
    pub fn done() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn done_with(follow_up: impl Into<String>) -> Self {
        Self {
            success: true,
            follow_up: Some(follow_up.into()),
            ..Self::default()
        }
    }

    /// Not a failure, but the task is not complete either.
    pub fn unresolved(follow_up: impl Into<String>) -> Self {
        Self {
            success: false,
            follow_up: Some(follow_up.into()),
            ..Self::default()
        }
    }

    pub fn failed(failure: DispatchFailure) -> Self {
        Self {
            success: false,
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn failed_with(failure: DispatchFailure, follow_up: impl Into<String>) -> Self {
        Self {
            follow_up: Some(follow_up.into()),
            ..Self::failed(failure)
        }
    }

    pub fn with_direct(mut self, message: impl Into<String>) -> Self {
        self.direct_message = Some(message.into());
        self
    }
}
