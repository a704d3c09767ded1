//! Request types for fare computation.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::services::PricingError;
use super::tariffs::{LocalPackagePrices, VehicleCategory};

/// Kind of service being priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Point-to-point drop
    OneWay,
    /// Outstation trip including the return leg
    RoundTrip,
    /// Bundled hours + km rental
    LocalHourly,
}

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::OneWay => "one_way",
            ServiceType::RoundTrip => "round_trip",
            ServiceType::LocalHourly => "local_hourly",
        }
    }
}

impl FromStr for ServiceType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_way" => Ok(ServiceType::OneWay),
            "round_trip" => Ok(ServiceType::RoundTrip),
            "local_hourly" => Ok(ServiceType::LocalHourly),
            other => Err(PricingError::InvalidServiceType(other.to_string())),
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local hourly packages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalPackage {
    #[serde(rename = "2hr_20km")]
    Hr2Km20,
    #[serde(rename = "4hr_40km")]
    Hr4Km40,
    #[default]
    #[serde(rename = "8hr_80km")]
    Hr8Km80,
    #[serde(rename = "12hr_120km")]
    Hr12Km120,
}

impl LocalPackage {
    pub fn as_str(self) -> &'static str {
        match self {
            LocalPackage::Hr2Km20 => "2hr_20km",
            LocalPackage::Hr4Km40 => "4hr_40km",
            LocalPackage::Hr8Km80 => "8hr_80km",
            LocalPackage::Hr12Km120 => "12hr_120km",
        }
    }

    /// Hours included in the package
    pub fn base_hours(self) -> Decimal {
        match self {
            LocalPackage::Hr2Km20 => Decimal::from(2),
            LocalPackage::Hr4Km40 => Decimal::from(4),
            LocalPackage::Hr8Km80 => Decimal::from(8),
            LocalPackage::Hr12Km120 => Decimal::from(12),
        }
    }

    /// Kilometres included in the package
    pub fn base_km(self) -> Decimal {
        match self {
            LocalPackage::Hr2Km20 => Decimal::from(20),
            LocalPackage::Hr4Km40 => Decimal::from(40),
            LocalPackage::Hr8Km80 => Decimal::from(80),
            LocalPackage::Hr12Km120 => Decimal::from(120),
        }
    }

    pub fn price(self, prices: &LocalPackagePrices) -> Decimal {
        match self {
            LocalPackage::Hr2Km20 => prices.hr2_km20,
            LocalPackage::Hr4Km40 => prices.hr4_km40,
            LocalPackage::Hr8Km80 => prices.hr8_km80,
            LocalPackage::Hr12Km120 => prices.hr12_km120,
        }
    }
}

impl FromStr for LocalPackage {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2hr_20km" => Ok(LocalPackage::Hr2Km20),
            "4hr_40km" => Ok(LocalPackage::Hr4Km40),
            "8hr_80km" => Ok(LocalPackage::Hr8Km80),
            "12hr_120km" => Ok(LocalPackage::Hr12Km120),
            other => Err(PricingError::InvalidRequest {
                field: "localPackageId",
                message: format!("unknown local package '{}'", other),
            }),
        }
    }
}

fn default_days() -> u32 {
    1
}

/// Trip parameters for a fare computation.
///
/// Toll, permit and parking amounts are deliberately absent: they are added
/// by the caller after pricing and never enter `total_fare`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareRequest {
    pub service_type: ServiceType,
    #[serde(default)]
    pub vehicle_category: VehicleCategory,
    #[serde(default)]
    pub distance_km: Decimal,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub extra_hours: Decimal,
    #[serde(default)]
    pub force_hill_station: bool,
    #[serde(default)]
    pub rate_override: Option<Decimal>,
    #[serde(default)]
    pub driver_bata_override: Option<Decimal>,
    #[serde(default)]
    pub hill_station_override: Option<Decimal>,
    #[serde(default)]
    pub pet_charge: Decimal,
    #[serde(default)]
    pub night_charge: Decimal,
    #[serde(default)]
    pub local_package_id: Option<LocalPackage>,
    /// Total hours booked for a local trip; when set, extra hours are derived from it.
    #[serde(default)]
    pub actual_hours: Option<Decimal>,
}

impl FareRequest {
    /// A request with every optional charge and override left empty.
    pub fn new(
        service_type: ServiceType,
        vehicle_category: VehicleCategory,
        distance_km: Decimal,
    ) -> Self {
        Self {
            service_type,
            vehicle_category,
            distance_km,
            days: 1,
            extra_hours: Decimal::ZERO,
            force_hill_station: false,
            rate_override: None,
            driver_bata_override: None,
            hill_station_override: None,
            pet_charge: Decimal::ZERO,
            night_charge: Decimal::ZERO,
            local_package_id: None,
            actual_hours: None,
        }
    }

    /// Reject inputs outside their documented domain.
    pub fn validate(&self) -> Result<(), PricingError> {
        non_negative("distanceKm", self.distance_km)?;
        if self.days < 1 {
            return Err(PricingError::InvalidRequest {
                field: "days",
                message: "must be at least 1".to_string(),
            });
        }
        non_negative("extraHours", self.extra_hours)?;
        non_negative("petCharge", self.pet_charge)?;
        non_negative("nightCharge", self.night_charge)?;
        if let Some(hours) = self.actual_hours {
            non_negative("actualHours", hours)?;
        }
        if let Some(rate) = self.rate_override {
            non_negative("rateOverride", rate)?;
        }
        if let Some(bata) = self.driver_bata_override {
            non_negative("driverBataOverride", bata)?;
        }
        if let Some(hill) = self.hill_station_override {
            non_negative("hillStationOverride", hill)?;
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PricingError::InvalidRequest {
            field,
            message: format!("must not be negative (got {})", value),
        });
    }
    Ok(())
}

/// Positional form of a [`FareRequest`] as carried in a dispatch envelope.
///
/// Serializes as a JSON array in the order: service type, vehicle category,
/// distance, days, extra hours, force hill station, rate override, driver
/// bata override, hill station override, pet charge, night charge, local
/// package id, and optionally actual hours. The twelve-position form is
/// accepted and produced whenever actual hours are absent.
#[derive(Debug, Clone)]
pub struct FareArgs(
    pub String,
    pub String,
    pub Decimal,
    pub u32,
    pub Decimal,
    pub bool,
    pub Option<Decimal>,
    pub Option<Decimal>,
    pub Option<Decimal>,
    pub Decimal,
    pub Decimal,
    pub Option<String>,
    pub Option<Decimal>,
);

impl Serialize for FareArgs {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.12.is_some() { 13 } else { 12 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.0)?;
        seq.serialize_element(&self.1)?;
        seq.serialize_element(&self.2)?;
        seq.serialize_element(&self.3)?;
        seq.serialize_element(&self.4)?;
        seq.serialize_element(&self.5)?;
        seq.serialize_element(&self.6)?;
        seq.serialize_element(&self.7)?;
        seq.serialize_element(&self.8)?;
        seq.serialize_element(&self.9)?;
        seq.serialize_element(&self.10)?;
        seq.serialize_element(&self.11)?;
        if let Some(hours) = &self.12 {
            seq.serialize_element(hours)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for FareArgs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(FareArgsVisitor)
    }
}

struct FareArgsVisitor;

impl<'de> Visitor<'de> for FareArgsVisitor {
    type Value = FareArgs;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of 12 or 13 fare arguments")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<FareArgs, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let args = FareArgs(
            required(&mut seq, 0)?,
            required(&mut seq, 1)?,
            required(&mut seq, 2)?,
            required(&mut seq, 3)?,
            required(&mut seq, 4)?,
            required(&mut seq, 5)?,
            required(&mut seq, 6)?,
            required(&mut seq, 7)?,
            required(&mut seq, 8)?,
            required(&mut seq, 9)?,
            required(&mut seq, 10)?,
            required(&mut seq, 11)?,
            seq.next_element::<Option<Decimal>>()?.flatten(),
        );

        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(14, &self));
        }
        Ok(args)
    }
}

fn required<'de, T, A>(seq: &mut A, index: usize) -> Result<T, A::Error>
where
    T: Deserialize<'de>,
    A: SeqAccess<'de>,
{
    seq.next_element()?
        .ok_or_else(|| de::Error::invalid_length(index, &FareArgsVisitor))
}

impl From<&FareRequest> for FareArgs {
    fn from(req: &FareRequest) -> Self {
        FareArgs(
            req.service_type.as_str().to_string(),
            req.vehicle_category.id().to_string(),
            req.distance_km,
            req.days,
            req.extra_hours,
            req.force_hill_station,
            req.rate_override,
            req.driver_bata_override,
            req.hill_station_override,
            req.pet_charge,
            req.night_charge,
            req.local_package_id.map(|p| p.as_str().to_string()),
            req.actual_hours,
        )
    }
}

impl TryFrom<FareArgs> for FareRequest {
    type Error = PricingError;

    fn try_from(args: FareArgs) -> Result<Self, Self::Error> {
        let FareArgs(
            service_type,
            vehicle_category,
            distance_km,
            days,
            extra_hours,
            force_hill_station,
            rate_override,
            driver_bata_override,
            hill_station_override,
            pet_charge,
            night_charge,
            local_package_id,
            actual_hours,
        ) = args;

        Ok(FareRequest {
            service_type: service_type.parse()?,
            vehicle_category: VehicleCategory::from_id(&vehicle_category),
            distance_km,
            days,
            extra_hours,
            force_hill_station,
            rate_override,
            driver_bata_override,
            hill_station_override,
            pet_charge,
            night_charge,
            local_package_id: local_package_id
                .as_deref()
                .map(str::parse::<LocalPackage>)
                .transpose()?,
            actual_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_service_type_parse() {
        assert_eq!("one_way".parse::<ServiceType>().unwrap(), ServiceType::OneWay);
        assert_eq!(
            "local_hourly".parse::<ServiceType>().unwrap(),
            ServiceType::LocalHourly
        );

        let err = "airport_transfer".parse::<ServiceType>().unwrap_err();
        assert!(matches!(err, PricingError::InvalidServiceType(ref s) if s == "airport_transfer"));
    }

    #[test]
    fn test_request_deserializes_camel_case_with_defaults() {
        let req: FareRequest = serde_json::from_str(
            r#"{"serviceType":"round_trip","vehicleCategory":"suv","distanceKm":"420.5","petCharge":300}"#,
        )
        .unwrap();

        assert_eq!(req.service_type, ServiceType::RoundTrip);
        assert_eq!(req.vehicle_category, VehicleCategory::Suv);
        assert_eq!(req.distance_km, dec!(420.5));
        assert_eq!(req.days, 1);
        assert_eq!(req.pet_charge, dec!(300));
        assert!(req.rate_override.is_none());
        assert!(req.local_package_id.is_none());
    }

    #[test]
    fn test_request_rejects_unknown_service_type() {
        let result = serde_json::from_str::<FareRequest>(r#"{"serviceType":"shuttle"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_local_package_ids() {
        let pkg: LocalPackage = serde_json::from_str("\"12hr_120km\"").unwrap();
        assert_eq!(pkg, LocalPackage::Hr12Km120);
        assert_eq!(pkg.base_hours(), dec!(12));
        assert_eq!(pkg.base_km(), dec!(120));
        assert!("3hr_30km".parse::<LocalPackage>().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_distance_and_zero_days() {
        let mut req = FareRequest::new(ServiceType::OneWay, VehicleCategory::Sedan, dec!(-1));
        assert!(matches!(
            req.validate(),
            Err(PricingError::InvalidRequest { field: "distanceKm", .. })
        ));

        req.distance_km = dec!(10);
        req.days = 0;
        assert!(matches!(
            req.validate(),
            Err(PricingError::InvalidRequest { field: "days", .. })
        ));

        req.days = 2;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_fare_args_are_positional() {
        let mut req = FareRequest::new(ServiceType::LocalHourly, VehicleCategory::Suv, dec!(0));
        req.local_package_id = Some(LocalPackage::Hr4Km40);

        let json = serde_json::to_value(FareArgs::from(&req)).unwrap();
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 12);
        assert_eq!(items[0], "local_hourly");
        assert_eq!(items[1], "suv");
        assert_eq!(items[11], "4hr_40km");

        req.actual_hours = Some(dec!(10));
        let json = serde_json::to_value(FareArgs::from(&req)).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 13);
    }

    #[test]
    fn test_fare_args_accept_twelve_positions() {
        let args: FareArgs = serde_json::from_str(
            r#"["one_way","sedan",20,1,0,false,null,null,null,0,0,null]"#,
        )
        .unwrap();
        let req = FareRequest::try_from(args).unwrap();

        assert_eq!(req.service_type, ServiceType::OneWay);
        assert_eq!(req.distance_km, dec!(20));
        assert!(req.actual_hours.is_none());
        assert!(req.local_package_id.is_none());
    }

    #[test]
    fn test_fare_args_take_actual_hours_in_thirteenth_position() {
        let args: FareArgs = serde_json::from_str(
            r#"["local_hourly","sedan",0,1,0,false,null,null,null,0,0,"8hr_80km","10"]"#,
        )
        .unwrap();
        let req = FareRequest::try_from(args).unwrap();

        assert_eq!(req.local_package_id, Some(LocalPackage::Hr8Km80));
        assert_eq!(req.actual_hours, Some(dec!(10)));
    }

    #[test]
    fn test_fare_args_reject_wrong_lengths() {
        let short = serde_json::from_str::<FareArgs>(r#"["one_way","sedan",20]"#);
        assert!(short.unwrap_err().to_string().contains("invalid length 3"));

        let long = serde_json::from_str::<FareArgs>(
            r#"["one_way","sedan",20,1,0,false,null,null,null,0,0,null,null,"x"]"#,
        );
        assert!(long.is_err());
    }

    #[test]
    fn test_validate_rejects_negative_rate_override() {
        let mut req = FareRequest::new(ServiceType::OneWay, VehicleCategory::Sedan, dec!(50));
        req.rate_override = Some(dec!(-5));
        assert!(matches!(
            req.validate(),
            Err(PricingError::InvalidRequest { field: "rateOverride", .. })
        ));

        req.rate_override = Some(dec!(0));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_fare_args_convert_back() {
        let mut req = FareRequest::new(ServiceType::RoundTrip, VehicleCategory::MiniBus, dec!(900));
        req.days = 3;
        req.hill_station_override = Some(dec!(750));

        let back = FareRequest::try_from(FareArgs::from(&req)).unwrap();
        assert_eq!(back.service_type, ServiceType::RoundTrip);
        assert_eq!(back.vehicle_category, VehicleCategory::MiniBus);
        assert_eq!(back.days, 3);
        assert_eq!(back.hill_station_override, Some(dec!(750)));
    }

    #[test]
    fn test_fare_args_with_bad_service_type() {
        let mut args = FareArgs::from(&FareRequest::new(
            ServiceType::OneWay,
            VehicleCategory::Sedan,
            dec!(10),
        ));
        args.0 = "helicopter".to_string();

        assert!(matches!(
            FareRequest::try_from(args),
            Err(PricingError::InvalidServiceType(_))
        ));
    }
}
