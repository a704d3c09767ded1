//! Fare computation service.
//!
//! Combines the tariff table with the pure calculators into a priced
//! breakdown. Holds no mutable state, so one instance can be shared freely.

use rust_decimal::Decimal;
use tracing::debug;

use super::calculators::{
    checked_product, checked_sum, drop_distance, drop_driver_bata, local_base_charge,
    local_extra_hours, round_trip_days, round_trip_distance,
};
use super::requests::{FareRequest, ServiceType};
use super::responses::{FareDetails, FareLine, FareResult, LineKind};
use super::tariffs::TariffRepository;

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid service type: {0}")]
    InvalidServiceType(String),

    #[error("Invalid {field}: {message}")]
    InvalidRequest {
        field: &'static str,
        message: String,
    },

    #[error("Fare amount overflow in {0}")]
    Overflow(&'static str),
}

/// Prices trips against a tariff table.
#[derive(Debug, Clone, Default)]
pub struct FareCalculator {
    tariffs: TariffRepository,
}

impl FareCalculator {
    pub fn new(tariffs: TariffRepository) -> Self {
        Self { tariffs }
    }

    pub fn tariffs(&self) -> &TariffRepository {
        &self.tariffs
    }

    /// Price a trip.
    ///
    /// Toll, permit and parking are never added here; pet and night charges
    /// are taken as supplied.
    pub fn compute(&self, req: &FareRequest) -> Result<FareResult, PricingError> {
        req.validate()?;

        let tariff = self.tariffs.lookup(req.vehicle_category);
        let limits = self.tariffs.limits();

        let rate_used = match req.service_type {
            ServiceType::LocalHourly => Decimal::ZERO,
            ServiceType::RoundTrip => positive(req.rate_override).unwrap_or(tariff.round_trip_rate),
            ServiceType::OneWay => positive(req.rate_override).unwrap_or(tariff.one_way_rate),
        };

        let mut lines = Vec::new();
        let mut details = FareDetails::default();
        let mut extra_hours_line = None;
        let effective_distance;

        match req.service_type {
            ServiceType::RoundTrip => {
                let days = round_trip_days(req.distance_km, req.days, limits);
                effective_distance = round_trip_distance(req.distance_km, days, tariff)?;
                details.days = days;
                details.distance_charge =
                    checked_product(effective_distance, rate_used, "distance charge")?;
                details.driver_batta = match req.driver_bata_override {
                    Some(amount) => amount,
                    None => {
                        checked_product(tariff.driver_bata, Decimal::from(days), "driver bata")?
                    }
                };

                lines.push(FareLine {
                    kind: LineKind::BaseCharge,
                    label: format!(
                        "Round trip {} km × ₹{}/km",
                        effective_distance.normalize(),
                        rate_used.normalize()
                    ),
                    amount: details.distance_charge,
                });
                lines.push(FareLine {
                    kind: LineKind::DriverBata,
                    label: format!("Driver bata ({} {})", days, plural_days(days)),
                    amount: details.driver_batta,
                });
            }
            ServiceType::OneWay => {
                effective_distance = drop_distance(req.distance_km, tariff);
                details.days = req.days;
                details.distance_charge =
                    checked_product(effective_distance, rate_used, "distance charge")?;
                details.driver_batta = match req.driver_bata_override {
                    Some(amount) => amount,
                    None => drop_driver_bata(req.distance_km, tariff, limits)?,
                };

                lines.push(FareLine {
                    kind: LineKind::BaseCharge,
                    label: format!(
                        "Drop {} km × ₹{}/km",
                        effective_distance.normalize(),
                        rate_used.normalize()
                    ),
                    amount: details.distance_charge,
                });
                lines.push(FareLine {
                    kind: LineKind::DriverBata,
                    label: "Driver bata".to_string(),
                    amount: details.driver_batta,
                });
            }
            ServiceType::LocalHourly => {
                let package = req.local_package_id.unwrap_or_default();
                let extra_hours = local_extra_hours(package, req.extra_hours, req.actual_hours);
                let (package_price, extra_charge) =
                    local_base_charge(package, extra_hours, tariff)?;

                effective_distance = package.base_km();
                details.days = req.days;
                details.distance_charge =
                    checked_sum([package_price, extra_charge], "local charge")?;
                details.extra_hour_charge = extra_charge;
                details.driver_batta = req.driver_bata_override.unwrap_or(Decimal::ZERO);

                lines.push(FareLine {
                    kind: LineKind::BaseCharge,
                    label: format!("Local package {}", package.as_str()),
                    amount: package_price,
                });
                lines.push(FareLine {
                    kind: LineKind::DriverBata,
                    label: "Driver bata".to_string(),
                    amount: details.driver_batta,
                });
                // Listed last, after the surcharges.
                extra_hours_line = Some(FareLine {
                    kind: LineKind::ExtraHours,
                    label: format!(
                        "Extra hours {} hr × ₹{}/hr",
                        extra_hours.normalize(),
                        tariff.extra_hr_rate.normalize()
                    ),
                    amount: extra_charge,
                });
            }
        }

        details.hill_station = match req.hill_station_override {
            Some(amount) => amount,
            None if req.force_hill_station => tariff.default_hill_station_charge(),
            None => Decimal::ZERO,
        };
        details.pet_charge = req.pet_charge;
        details.night_charge = req.night_charge;

        lines.push(FareLine {
            kind: LineKind::HillStation,
            label: "Hill station charge".to_string(),
            amount: details.hill_station,
        });
        lines.push(FareLine {
            kind: LineKind::PetCharge,
            label: "Pet charge".to_string(),
            amount: details.pet_charge,
        });
        lines.push(FareLine {
            kind: LineKind::NightCharge,
            label: "Night charge".to_string(),
            amount: details.night_charge,
        });
        lines.extend(extra_hours_line);

        lines.retain(|line| !line.amount.is_zero());
        let total_fare = checked_sum(lines.iter().map(|line| line.amount), "total fare")?;
        let breakdown = lines.iter().map(FareLine::render).collect();

        debug!(
            category = %req.vehicle_category,
            service_type = %req.service_type,
            effective_distance = %effective_distance,
            total_fare = %total_fare,
            "Fare computed"
        );

        Ok(FareResult {
            total_fare,
            breakdown,
            lines,
            effective_distance,
            rate_used,
            details,
        })
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

fn plural_days(days: u32) -> &'static str {
    if days == 1 {
        "day"
    } else {
        "days"
    }
}
