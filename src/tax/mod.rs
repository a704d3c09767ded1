//! GST on fares.

pub mod gst;
pub mod quote;

pub use gst::{calculate_gst, determine_type, state_code, GstBreakdown, GstRate, GstType};
pub use quote::{quote, ExternalCharges, Quote};

/// Tax configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaxError {
    #[error("Unsupported GST rate: {0}%")]
    UnsupportedRate(u32),

    #[error("Invalid GST rate: {0}")]
    InvalidRate(String),

    #[error("Tax amount overflow in {0}")]
    Overflow(&'static str),
}
