//! Core pricing calculation functions.
//!
//! Pure functions for fare math - no I/O, no shared state.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::requests::LocalPackage;
use super::services::PricingError;
use super::tariffs::{TripLimits, VehicleTariff};

/// Drop trips longer than this always pay driver bata.
pub const DROP_BATA_THRESHOLD_KM: Decimal = dec!(40);

/// Round to whole currency units, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use taxi_fare_engine::pricing::round_rupees;
///
/// assert_eq!(round_rupees(dec!(262.5)), dec!(263));
/// assert_eq!(round_rupees(dec!(262.49)), dec!(262));
/// ```
pub fn round_rupees(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `a * b`, or an overflow error naming the charge being computed.
pub fn checked_product(
    a: Decimal,
    b: Decimal,
    charge: &'static str,
) -> Result<Decimal, PricingError> {
    a.checked_mul(b).ok_or(PricingError::Overflow(charge))
}

/// Sum of `amounts`, or an overflow error naming the charge being computed.
pub fn checked_sum(
    amounts: impl IntoIterator<Item = Decimal>,
    charge: &'static str,
) -> Result<Decimal, PricingError> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).ok_or(PricingError::Overflow(charge))
    })
}

/// Number of days a distance needs at `max_km_per_day`, rounded up.
pub fn days_for_distance(distance_km: Decimal, limits: TripLimits) -> u32 {
    if limits.max_km_per_day <= Decimal::ZERO {
        return 0;
    }
    (distance_km / limits.max_km_per_day)
        .ceil()
        .to_u32()
        .unwrap_or(u32::MAX)
}

/// Billable days for a round trip: never fewer than the distance requires.
pub fn round_trip_days(distance_km: Decimal, requested_days: u32, limits: TripLimits) -> u32 {
    requested_days.max(days_for_distance(distance_km, limits))
}

/// Billable distance for a round trip: at least `min_km_per_day` per day.
pub fn round_trip_distance(
    distance_km: Decimal,
    days: u32,
    tariff: &VehicleTariff,
) -> Result<Decimal, PricingError> {
    let minimum = checked_product(Decimal::from(days), tariff.min_km_per_day, "minimum distance")?;
    Ok(distance_km.max(minimum))
}

/// Billable distance for a drop: at least the vehicle's minimum drop distance.
pub fn drop_distance(distance_km: Decimal, tariff: &VehicleTariff) -> Decimal {
    distance_km.max(tariff.min_drop_km)
}

/// Driver bata for a drop.
///
/// Short drops in light vehicles carry no bata; otherwise one bata per
/// day the distance needs.
pub fn drop_driver_bata(
    distance_km: Decimal,
    tariff: &VehicleTariff,
    limits: TripLimits,
) -> Result<Decimal, PricingError> {
    if distance_km > DROP_BATA_THRESHOLD_KM || tariff.is_heavy_vehicle {
        let days = Decimal::from(days_for_distance(distance_km, limits));
        checked_product(tariff.driver_bata, days, "driver bata")
    } else {
        Ok(Decimal::ZERO)
    }
}

/// Hours billed beyond a local package.
///
/// When the booked hours are known they decide; otherwise `extra_hours`
/// already counts hours past the package.
pub fn local_extra_hours(
    package: LocalPackage,
    extra_hours: Decimal,
    actual_hours: Option<Decimal>,
) -> Decimal {
    match actual_hours {
        Some(actual) => (actual - package.base_hours()).max(Decimal::ZERO),
        None => extra_hours.max(Decimal::ZERO),
    }
}

/// Package price plus extra-hour charge for a local trip.
pub fn local_base_charge(
    package: LocalPackage,
    extra_hours: Decimal,
    tariff: &VehicleTariff,
) -> Result<(Decimal, Decimal), PricingError> {
    let package_price = package.price(&tariff.local_packages);
    let extra_charge = checked_product(extra_hours, tariff.extra_hr_rate, "extra hours")?;
    Ok((package_price, extra_charge))
}
