//! Taxi fare engine.
//!
//! - [`pricing`]: tariff table and fare calculator
//! - [`tax`]: GST determination and quotes
//! - [`dispatch`]: request-correlated async worker around the calculator
//! - [`quoting`]: one JSON quote per input line

pub mod config;
pub mod dispatch;
pub mod error;
pub mod pricing;
pub mod quoting;
pub mod tax;

pub use config::Config;
pub use dispatch::{FareDispatcher, SharedFareDispatcher};
pub use error::{AppError, Result};
