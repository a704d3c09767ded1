//! Result types for fare computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Component a breakdown line belongs to, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    BaseCharge,
    DriverBata,
    HillStation,
    PetCharge,
    NightCharge,
    ExtraHours,
}

/// One nonzero priced component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareLine {
    pub kind: LineKind,
    pub label: String,
    pub amount: Decimal,
}

impl FareLine {
    pub fn render(&self) -> String {
        format!("{}: ₹{}", self.label, self.amount.normalize())
    }
}

/// Per-component amounts, zero when a component does not apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareDetails {
    /// Distance charge, or package price plus extra hours for local trips
    pub distance_charge: Decimal,
    pub driver_batta: Decimal,
    pub hill_station: Decimal,
    pub pet_charge: Decimal,
    pub night_charge: Decimal,
    pub extra_hour_charge: Decimal,
    pub days: u32,
}

/// Priced trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareResult {
    pub total_fare: Decimal,
    pub breakdown: Vec<String>,
    pub lines: Vec<FareLine>,
    pub effective_distance: Decimal,
    pub rate_used: Decimal,
    pub details: FareDetails,
}

impl FareResult {
    /// Sum of the structured breakdown lines.
    pub fn lines_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.amount).sum()
    }
}
