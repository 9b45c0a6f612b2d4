use sprout_core::error::SproutError;
use sprout_invest::types::{ClientUpdate, PortfolioStrategy, PortfolioTotals};

use super::{Action, DispatchFailure, DispatchResult, Dispatcher, PortfolioRef};
use crate::profile::{ClientProfile, SavingTarget, StreakOutcome};

/// Which way money moves for a portfolio action.
#[derive(Clone, Copy)]
enum Movement {
    Withdraw,
    Transfer,
}

impl Movement {
    fn verb(self) -> &'static str {
        match self {
            Self::Withdraw => "withdrawal",
            Self::Transfer => "investment",
        }
    }
}

impl Dispatcher {
    pub(super) async fn execute(&self, profile: &mut ClientProfile, action: Action) -> DispatchResult {
        match action {
            Action::SetTargetItem { item, amount } => {
                let previous = std::mem::replace(&mut profile.target, SavingTarget { item, amount });
                DispatchResult::done_with(format!(
                    "The saving target changed from {previous} to {}. Tell the user whether it \
                     was set for the first time or updated.",
                    profile.target
                ))
            }
            Action::SetDailySavingAmount { amount } => {
                let previous = profile.daily_saving_amount;
                profile.daily_saving_amount = amount;
                DispatchResult::done_with(format!(
                    "The daily saving amount changed from ${previous:.2} to ${amount:.2}. Confirm it to the user."
                ))
            }
            Action::DoneDailySaving => {
                let outcome = profile.complete_daily_saving((self.clock)());
                streak_follow_up(profile, "daily saving", "day", outcome)
            }
            Action::DoneWeeklyInvest => {
                let outcome = profile.complete_weekly_invest((self.clock)());
                streak_follow_up(profile, "weekly investment", "week", outcome)
            }
            Action::GetInfo => DispatchResult::done_with(
                "The user's info card was already sent to them. Do not repeat it; \
                 just let them know it has been sent.",
            )
            .with_direct(profile.info_card()),
            Action::NeedMoreInfo { question } => DispatchResult::unresolved(format!(
                "Ask the user, whose profile is {}, the following: {question}",
                profile.summary()
            )),
            Action::Withdraw { amount, portfolio } => {
                self.move_money(profile, Movement::Withdraw, amount, &portfolio)
                    .await
            }
            Action::Transfer { amount, portfolio } => {
                self.move_money(profile, Movement::Transfer, amount, &portfolio)
                    .await
            }
            Action::Deposit { amount } => match self.invest.deposit(&profile.id, amount).await {
                Ok(_) => DispatchResult::done_with(format!(
                    "${amount:.2} was deposited into the user's cash balance. Confirm it."
                )),
                Err(e) => remote_failure("deposit", e),
            },
            Action::CreatePortfolio { strategy } => self.create_portfolio(profile, strategy).await,
            Action::GetPortfolios => match self.invest.list_portfolios(&profile.id).await {
                Ok(portfolios) if portfolios.is_empty() => DispatchResult::done_with(format!(
                    "The user has no portfolios yet. Suggest creating one with one of these \
                     strategies: {}.",
                    PortfolioStrategy::names()
                )),
                Ok(portfolios) => {
                    let lines = portfolios
                        .iter()
                        .map(|p| {
                            format!(
                                "- {} ({}): invested ${:.2}, now worth ${:.2}",
                                p.id, p.kind, p.invested_amount, p.current_value
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    let totals = PortfolioTotals::of(&portfolios);
                    DispatchResult::done_with(format!(
                        "The user's portfolios:\n{lines}\nIn total: invested ${:.2}, now worth \
                         ${:.2} (gain ${:.2}). Summarize them briefly.",
                        totals.invested,
                        totals.current_value,
                        totals.gain()
                    ))
                }
                Err(e) => remote_failure("portfolio lookup", e),
            },
            Action::AnalyzePortfolio { portfolio } => {
                let portfolio_id = match self.resolve_portfolio(&profile.id, &portfolio).await {
                    Ok(id) => id,
                    Err(result) => return result,
                };
                match self.invest.portfolio_analysis(&portfolio_id).await {
                    Ok(analysis) => DispatchResult::done_with(format!(
                        "Performance analysis of the user's {portfolio}: {analysis}. Explain the \
                         returns simply and note past returns do not guarantee future ones."
                    )),
                    Err(e) => remote_failure("portfolio analysis", e),
                }
            }
            Action::SimulatePortfolios { months } => {
                match self.invest.simulate(&profile.id, months).await {
                    Ok(result) => DispatchResult::done_with(format!(
                        "Projection of the user's portfolios over {months} month(s): {result}. \
                         Explain it simply and remind them it is an estimate."
                    )),
                    Err(e) => remote_failure("simulation", e),
                }
            }
            Action::UpdateName { name } => {
                match self
                    .invest
                    .update_client(&profile.id, &ClientUpdate::name(name.clone()))
                    .await
                {
                    Ok(_) => {
                        let previous = std::mem::replace(&mut profile.name, name);
                        DispatchResult::done_with(format!(
                            "The user's name changed from {previous} to {}. Greet them by the new name.",
                            profile.name
                        ))
                    }
                    Err(e) => remote_failure("name update", e),
                }
            }
            Action::UpdateEmail { email } => {
                match self
                    .invest
                    .update_client(&profile.id, &ClientUpdate::email(email.clone()))
                    .await
                {
                    Ok(_) => {
                        profile.email = Some(email);
                        DispatchResult::done_with("The user's email was updated. Confirm it.")
                    }
                    Err(e) => remote_failure("email update", e),
                }
            }
            Action::NoAction => DispatchResult::done(),
        }
    }

    async fn move_money(
        &self,
        profile: &ClientProfile,
        movement: Movement,
        amount: f64,
        portfolio: &PortfolioRef,
    ) -> DispatchResult {
        let portfolio_id = match self.resolve_portfolio(&profile.id, portfolio).await {
            Ok(id) => id,
            Err(result) => return result,
        };
        let outcome = match movement {
            Movement::Withdraw => self.invest.withdraw(&portfolio_id, amount).await,
            Movement::Transfer => self.invest.transfer(&portfolio_id, amount).await,
        };
        match outcome {
            Ok(_) => DispatchResult::done_with(format!(
                "The {} of ${amount:.2} for {portfolio} went through. Confirm it to the user.",
                movement.verb()
            )),
            Err(e) => remote_failure(movement.verb(), e),
        }
    }

    /// Map a portfolio reference to an id. Strategy names are looked up in
    /// the index first, then in the remote listing.
    async fn resolve_portfolio(
        &self,
        client_id: &str,
        portfolio: &PortfolioRef,
    ) -> Result<String, DispatchResult> {
        let strategy = match portfolio {
            PortfolioRef::Id(id) => return Ok(id.clone()),
            PortfolioRef::Strategy(strategy) => *strategy,
        };

        for id in self.index.portfolios(client_id) {
            match self.invest.get_portfolio(&id).await {
                Ok(p) if p.strategy() == Some(strategy) => return Ok(id),
                Ok(_) => {}
                Err(e) => tracing::warn!(client_id, portfolio_id = %id, error = %e, "indexed portfolio lookup failed"),
            }
        }

        let portfolios = match self.invest.list_portfolios(client_id).await {
            Ok(portfolios) => portfolios,
            Err(e) => return Err(remote_failure("portfolio lookup", e)),
        };
        portfolios
            .into_iter()
            .find(|p| p.strategy() == Some(strategy))
            .map(|p| p.id)
            .ok_or_else(|| {
                DispatchResult::failed_with(
                    DispatchFailure::Rejected(format!("no {strategy} portfolio")),
                    format!(
                        "The user has no {strategy} portfolio. Tell them and offer to create one."
                    ),
                )
            })
    }

    async fn create_portfolio(
        &self,
        profile: &ClientProfile,
        strategy: PortfolioStrategy,
    ) -> DispatchResult {
        let existing = match self.invest.list_portfolios(&profile.id).await {
            Ok(portfolios) => portfolios,
            Err(e) => return remote_failure("portfolio lookup", e),
        };
        if existing.iter().any(|p| p.strategy() == Some(strategy)) {
            return DispatchResult::failed_with(
                DispatchFailure::Rejected(format!("{strategy} portfolio already exists")),
                format!(
                    "The user already has a {strategy} portfolio, so a new one was not created. \
                     Tell them they can invest more into it instead."
                ),
            );
        }

        let portfolio = match self
            .invest
            .create_portfolio(&profile.id, strategy, self.initial_portfolio_amount)
            .await
        {
            Ok(portfolio) => portfolio,
            Err(e) => return remote_failure("portfolio creation", e),
        };

        if let Err(e) = self.index.append(&profile.id, &portfolio.id) {
            tracing::warn!(client_id = %profile.id, portfolio_id = %portfolio.id, error = %e, "failed to index new portfolio");
        }
        tracing::info!(client_id = %profile.id, portfolio_id = %portfolio.id, %strategy, "portfolio created");

        DispatchResult::done_with(format!(
            "A {strategy} portfolio ({}) was created with ${:.2}. Congratulate the user.",
            portfolio.id, self.initial_portfolio_amount
        ))
    }
}

fn streak_follow_up(
    profile: &ClientProfile,
    habit: &str,
    unit: &str,
    outcome: StreakOutcome,
) -> DispatchResult {
    match outcome {
        StreakOutcome::Recorded { streak, levels_gained } => {
            let mut follow_up = format!(
                "The user's {habit} was recorded. Their streak is now {streak} {unit}(s)."
            );
            if levels_gained > 0 {
                follow_up.push_str(&format!(
                    " They reached level {}! Celebrate it.",
                    profile.level
                ));
            }
            DispatchResult::done_with(follow_up)
        }
        StreakOutcome::AlreadyDone { streak } => {
            tracing::warn!(client_id = %profile.id, habit, "already recorded today");
            DispatchResult::done_with(format!(
                "The user's {habit} was already recorded today; the streak stays at {streak} \
                 {unit}(s). Let them know nothing changed."
            ))
        }
    }
}

fn remote_failure(what: &str, error: SproutError) -> DispatchResult {
    let message = error.remote_message();
    DispatchResult::failed_with(
        DispatchFailure::Remote(message.clone()),
        format!("The {what} failed with this message from the bank: {message}. Explain it to the user briefly."),
    )
}
