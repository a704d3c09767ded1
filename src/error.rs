//! Error handling for the application

use crate::config::ConfigError;
use crate::dispatch::DispatchError;
use crate::pricing::PricingError;
use crate::tax::TaxError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Tax error: {0}")]
    Tax(#[from] TaxError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(#[from] serde_json::Error),
}

impl AppError {
    /// Whether retrying the same input could succeed.
    ///
    /// Only a lost worker qualifies, and only after a restart.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Dispatch(DispatchError::WorkerUnavailable))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
