pub mod action;
pub mod advisor;
pub mod clock;
pub mod portfolio_index;
pub mod profile;
pub mod prompt;
pub mod service;

#[cfg(test)]
mod testing;
