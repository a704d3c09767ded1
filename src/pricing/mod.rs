//! Fare engine module.
//!
//! Prices taxi trips (distance or package charge, driver bata, surcharges)
//! from a static per-vehicle tariff table. Tax is applied separately by
//! [`crate::tax`].

pub mod calculators;
pub mod requests;
pub mod responses;
pub mod services;
pub mod tariffs;

// Re-export commonly used items
pub use calculators::round_rupees;
pub use requests::{FareArgs, FareRequest, LocalPackage, ServiceType};
pub use responses::{FareDetails, FareLine, FareResult, LineKind};
pub use services::{FareCalculator, PricingError};
pub use tariffs::{TariffRepository, TripLimits, VehicleCategory, VehicleTariff};
