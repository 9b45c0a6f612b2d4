use std::sync::Arc;

use sprout_invest::InvestApi;

use super::{Action, ActionKind, ActionRequest, DispatchFailure, DispatchResult};
use crate::clock::Clock;
use crate::portfolio_index::PortfolioIndex;
use crate::profile::ClientProfile;

/// Validates classifier requests and runs their handlers against one
/// client's profile. Never looks clients up; the caller holds the lock.
pub struct Dispatcher {
    pub(super) invest: Arc<dyn InvestApi>,
    pub(super) index: Arc<PortfolioIndex>,
    pub(super) clock: Clock,
    pub(super) initial_portfolio_amount: f64,
}

impl Dispatcher {
    pub fn new(
        invest: Arc<dyn InvestApi>,
        index: Arc<PortfolioIndex>,
        clock: Clock,
        initial_portfolio_amount: f64,
    ) -> Self {
        Self {
            invest,
            index,
            clock,
            initial_portfolio_amount,
        }
    }

    pub async fn dispatch(
        &self,
        profile: &mut ClientProfile,
        request: &ActionRequest,
    ) -> DispatchResult {
        let Some(kind) = ActionKind::parse(&request.name) else {
            tracing::warn!(client_id = %profile.id, action = %request.name, "unknown action");
            return DispatchResult::failed(DispatchFailure::UnknownAction(request.name.clone()));
        };

        let action = match Action::from_request(kind, &request.params) {
            Ok(action) => action,
            Err(failure) => {
                tracing::warn!(client_id = %profile.id, %failure, "action rejected");
                return DispatchResult::failed(failure);
            }
        };

        tracing::info!(client_id = %profile.id, action = %kind, "dispatching");
        let result = self.execute(profile, action).await;
        if let Some(failure) = &result.failure {
            tracing::warn!(client_id = %profile.id, action = %kind, %failure, "action failed");
        }
        result
    }
}
