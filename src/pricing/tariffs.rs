//! Static tariff table: vehicle category -> pricing parameters.
//!
//! The table is built once at startup and never mutated. Lookups are total:
//! an unknown category id resolves to [`VehicleCategory::Sedan`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hill-station surcharge applied to light vehicles when none is supplied.
pub const LIGHT_HILL_STATION_CHARGE: Decimal = dec!(500);

/// Hill-station surcharge applied to heavy vehicles when none is supplied.
pub const HEAVY_HILL_STATION_CHARGE: Decimal = dec!(1000);

/// Vehicle categories offered by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum VehicleCategory {
    Hatchback,
    #[default]
    Sedan,
    Suv,
    InnovaCrysta,
    TempoTraveller,
    MiniBus,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 6] = [
        VehicleCategory::Hatchback,
        VehicleCategory::Sedan,
        VehicleCategory::Suv,
        VehicleCategory::InnovaCrysta,
        VehicleCategory::TempoTraveller,
        VehicleCategory::MiniBus,
    ];

    /// Position of the category in [`VehicleCategory::ALL`].
    pub const fn index(self) -> usize {
        match self {
            VehicleCategory::Hatchback => 0,
            VehicleCategory::Sedan => 1,
            VehicleCategory::Suv => 2,
            VehicleCategory::InnovaCrysta => 3,
            VehicleCategory::TempoTraveller => 4,
            VehicleCategory::MiniBus => 5,
        }
    }

    /// Category id as used on the wire.
    pub fn id(self) -> &'static str {
        match self {
            VehicleCategory::Hatchback => "hatchback",
            VehicleCategory::Sedan => "sedan",
            VehicleCategory::Suv => "suv",
            VehicleCategory::InnovaCrysta => "innova_crysta",
            VehicleCategory::TempoTraveller => "tempo_traveller",
            VehicleCategory::MiniBus => "mini_bus",
        }
    }

    /// Parse a category id, returning `None` for ids that are not offered.
    pub fn parse_strict(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "hatchback" => Some(VehicleCategory::Hatchback),
            "sedan" => Some(VehicleCategory::Sedan),
            "suv" => Some(VehicleCategory::Suv),
            "innova_crysta" | "innova" | "muv" => Some(VehicleCategory::InnovaCrysta),
            "tempo_traveller" | "tempo" | "traveller" => Some(VehicleCategory::TempoTraveller),
            "mini_bus" | "minibus" => Some(VehicleCategory::MiniBus),
            _ => None,
        }
    }

    /// Parse a category id. Unknown ids fall back to `Sedan`; callers that
    /// must reject them should use [`VehicleCategory::parse_strict`] first.
    pub fn from_id(id: &str) -> Self {
        Self::parse_strict(id).unwrap_or_else(|| {
            debug!(category = id, "Unknown vehicle category, using sedan");
            VehicleCategory::Sedan
        })
    }
}

impl From<String> for VehicleCategory {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl From<&str> for VehicleCategory {
    fn from(id: &str) -> Self {
        Self::from_id(id)
    }
}

impl std::fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Fixed-price local packages (hours, included km, price).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPackagePrices {
    pub hr2_km20: Decimal,
    pub hr4_km40: Decimal,
    pub hr8_km80: Decimal,
    pub hr12_km120: Decimal,
}

/// Pricing parameters for one vehicle category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleTariff {
    pub category: VehicleCategory,
    pub display_name: &'static str,
    pub is_heavy_vehicle: bool,
    pub min_km_per_day: Decimal,
    pub round_trip_rate: Decimal,
    pub one_way_rate: Decimal,
    /// Driver allowance per day
    pub driver_bata: Decimal,
    pub local_packages: LocalPackagePrices,
    pub extra_hr_rate: Decimal,
    pub min_drop_km: Decimal,
}

impl VehicleTariff {
    /// Hill-station surcharge used when the trip is flagged but no amount is given.
    pub fn default_hill_station_charge(&self) -> Decimal {
        if self.is_heavy_vehicle {
            HEAVY_HILL_STATION_CHARGE
        } else {
            LIGHT_HILL_STATION_CHARGE
        }
    }
}

/// Trip-wide limits shared by all categories.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripLimits {
    /// Used only to estimate the number of days a distance needs.
    pub max_km_per_day: Decimal,
}

impl Default for TripLimits {
    fn default() -> Self {
        Self {
            max_km_per_day: dec!(600),
        }
    }
}

/// Read-only tariff table keyed by category.
#[derive(Debug, Clone)]
pub struct TariffRepository {
    tariffs: [VehicleTariff; 6],
    limits: TripLimits,
}

impl TariffRepository {
    /// The operator's standard tariff card.
    pub fn standard() -> Self {
        Self {
            tariffs: VehicleCategory::ALL.map(standard_tariff),
            limits: TripLimits::default(),
        }
    }

    pub fn lookup(&self, category: VehicleCategory) -> &VehicleTariff {
        &self.tariffs[category.index()]
    }

    /// Resolve a raw category id, falling back to sedan for unknown ids.
    pub fn lookup_id(&self, id: &str) -> &VehicleTariff {
        self.lookup(VehicleCategory::from_id(id))
    }

    pub fn limits(&self) -> TripLimits {
        self.limits
    }

    pub fn categories(&self) -> &[VehicleTariff] {
        &self.tariffs
    }
}

impl Default for TariffRepository {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_tariff(category: VehicleCategory) -> VehicleTariff {
    match category {
        VehicleCategory::Hatchback => VehicleTariff {
            category,
            display_name: "Hatchback",
            is_heavy_vehicle: false,
            min_km_per_day: dec!(250),
            round_trip_rate: dec!(12),
            one_way_rate: dec!(14),
            driver_bata: dec!(300),
            local_packages: LocalPackagePrices {
                hr2_km20: dec!(700),
                hr4_km40: dec!(1200),
                hr8_km80: dec!(1900),
                hr12_km120: dec!(2700),
            },
            extra_hr_rate: dec!(200),
            min_drop_km: dec!(130),
        },
        VehicleCategory::Sedan => VehicleTariff {
            category,
            display_name: "Sedan",
            is_heavy_vehicle: false,
            min_km_per_day: dec!(250),
            round_trip_rate: dec!(14),
            one_way_rate: dec!(16),
            driver_bata: dec!(300),
            local_packages: LocalPackagePrices {
                hr2_km20: dec!(800),
                hr4_km40: dec!(1400),
                hr8_km80: dec!(2200),
                hr12_km120: dec!(3100),
            },
            extra_hr_rate: dec!(250),
            min_drop_km: dec!(130),
        },
        VehicleCategory::Suv => VehicleTariff {
            category,
            display_name: "SUV",
            is_heavy_vehicle: false,
            min_km_per_day: dec!(250),
            round_trip_rate: dec!(18),
            one_way_rate: dec!(20),
            driver_bata: dec!(400),
            local_packages: LocalPackagePrices {
                hr2_km20: dec!(1100),
                hr4_km40: dec!(1900),
                hr8_km80: dec!(3000),
                hr12_km120: dec!(4200),
            },
            extra_hr_rate: dec!(300),
            min_drop_km: dec!(130),
        },
        VehicleCategory::InnovaCrysta => VehicleTariff {
            category,
            display_name: "Innova Crysta",
            is_heavy_vehicle: false,
            min_km_per_day: dec!(250),
            round_trip_rate: dec!(19),
            one_way_rate: dec!(22),
            driver_bata: dec!(400),
            local_packages: LocalPackagePrices {
                hr2_km20: dec!(1200),
                hr4_km40: dec!(2100),
                hr8_km80: dec!(3300),
                hr12_km120: dec!(4600),
            },
            extra_hr_rate: dec!(350),
            min_drop_km: dec!(130),
        },
        VehicleCategory::TempoTraveller => VehicleTariff {
            category,
            display_name: "Tempo Traveller",
            is_heavy_vehicle: true,
            min_km_per_day: dec!(300),
            round_trip_rate: dec!(26),
            one_way_rate: dec!(30),
            driver_bata: dec!(500),
            local_packages: LocalPackagePrices {
                hr2_km20: dec!(2000),
                hr4_km40: dec!(3200),
                hr8_km80: dec!(5000),
                hr12_km120: dec!(7000),
            },
            extra_hr_rate: dec!(500),
            min_drop_km: dec!(200),
        },
        VehicleCategory::MiniBus => VehicleTariff {
            category,
            display_name: "Mini Bus",
            is_heavy_vehicle: true,
            min_km_per_day: dec!(300),
            round_trip_rate: dec!(34),
            one_way_rate: dec!(38),
            driver_bata: dec!(600),
            local_packages: LocalPackagePrices {
                hr2_km20: dec!(2800),
                hr4_km40: dec!(4500),
                hr8_km80: dec!(7000),
                hr12_km120: dec!(9800),
            },
            extra_hr_rate: dec!(700),
            min_drop_km: dec!(200),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_matches_requested_category() {
        let repo = TariffRepository::standard();
        for category in VehicleCategory::ALL {
            assert_eq!(repo.lookup(category).category, category);
        }
    }

    #[test]
    fn test_index_matches_position_in_all() {
        for (position, category) in VehicleCategory::ALL.into_iter().enumerate() {
            assert_eq!(category.index(), position);
        }

        let repo = TariffRepository::standard();
        assert_eq!(repo.categories().len(), VehicleCategory::ALL.len());
        for tariff in repo.categories() {
            assert_eq!(repo.lookup(tariff.category).display_name, tariff.display_name);
        }
    }

    #[test]
    fn test_unknown_category_falls_back_to_sedan() {
        let repo = TariffRepository::standard();
        assert_eq!(repo.lookup_id("rickshaw").category, VehicleCategory::Sedan);
        assert_eq!(repo.lookup_id("").category, VehicleCategory::Sedan);
        assert_eq!(VehicleCategory::parse_strict("rickshaw"), None);
    }

    #[test]
    fn test_category_aliases() {
        assert_eq!(VehicleCategory::from_id(" SUV "), VehicleCategory::Suv);
        assert_eq!(VehicleCategory::from_id("innova"), VehicleCategory::InnovaCrysta);
        assert_eq!(VehicleCategory::from_id("tempo"), VehicleCategory::TempoTraveller);
    }

    #[test]
    fn test_category_deserializes_with_fallback() {
        let known: VehicleCategory = serde_json::from_str("\"suv\"").unwrap();
        assert_eq!(known, VehicleCategory::Suv);

        let unknown: VehicleCategory = serde_json::from_str("\"limousine\"").unwrap();
        assert_eq!(unknown, VehicleCategory::Sedan);
    }

    #[test]
    fn test_sedan_card() {
        let sedan = TariffRepository::standard().lookup(VehicleCategory::Sedan).clone();
        assert_eq!(sedan.one_way_rate, dec!(16));
        assert_eq!(sedan.round_trip_rate, dec!(14));
        assert_eq!(sedan.min_km_per_day, dec!(250));
        assert_eq!(sedan.driver_bata, dec!(300));
        assert_eq!(sedan.min_drop_km, dec!(130));
        assert_eq!(sedan.local_packages.hr8_km80, dec!(2200));
        assert_eq!(sedan.extra_hr_rate, dec!(250));
    }

    #[test]
    fn test_hill_station_default_by_weight() {
        let repo = TariffRepository::standard();
        assert_eq!(
            repo.lookup(VehicleCategory::Sedan).default_hill_station_charge(),
            dec!(500)
        );
        assert_eq!(
            repo.lookup(VehicleCategory::TempoTraveller)
                .default_hill_station_charge(),
            dec!(1000)
        );
    }

    #[test]
    fn test_trip_limits() {
        assert_eq!(TariffRepository::standard().limits().max_km_per_day, dec!(600));
    }
}
