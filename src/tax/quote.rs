//! Customer-facing quote: fare, tax, and externally estimated charges.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::FareResult;

use super::gst::{calculate_gst, GstBreakdown, GstRate};
use super::TaxError;

/// Charges estimated outside the fare engine (route tolls, state permits,
/// parking). They are passed through untaxed and never enter `total_fare`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCharges {
    #[serde(default)]
    pub toll_charge: Decimal,
    #[serde(default)]
    pub permit_charge: Decimal,
    #[serde(default)]
    pub parking_charge: Decimal,
}

impl ExternalCharges {
    pub fn total(&self) -> Result<Decimal, TaxError> {
        [self.toll_charge, self.permit_charge, self.parking_charge]
            .into_iter()
            .try_fold(Decimal::ZERO, Decimal::checked_add)
            .ok_or(TaxError::Overflow("external charges"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub fare: FareResult,
    pub gst: GstBreakdown,
    pub external: ExternalCharges,
    pub grand_total: Decimal,
}

/// Tax the fare and add external charges on top.
pub fn quote(
    fare: FareResult,
    rate: GstRate,
    supplier_gstin: Option<&str>,
    customer_gstin: Option<&str>,
    external: ExternalCharges,
) -> Result<Quote, TaxError> {
    let gst = calculate_gst(fare.total_fare, rate, supplier_gstin, customer_gstin)?;
    let grand_total = gst
        .total_amount
        .checked_add(external.total()?)
        .ok_or(TaxError::Overflow("grand total"))?;

    Ok(Quote {
        fare,
        gst,
        external,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{FareCalculator, FareRequest, ServiceType, VehicleCategory};
    use rust_decimal_macros::dec;

    #[test]
    fn test_external_charges_added_after_tax() {
        let fare = FareCalculator::default()
            .compute(&FareRequest::new(
                ServiceType::OneWay,
                VehicleCategory::Sedan,
                dec!(20),
            ))
            .unwrap();
        let external = ExternalCharges {
            toll_charge: dec!(120),
            permit_charge: dec!(0),
            parking_charge: dec!(50),
        };

        let q = quote(fare, GstRate::Five, Some("33AAACT1234F1Z5"), None, external).unwrap();

        assert_eq!(q.gst.taxable_amount, dec!(2080));
        assert_eq!(q.gst.total_tax, dec!(104));
        assert_eq!(q.fare.total_fare, dec!(2080));
        assert_eq!(q.grand_total, dec!(2354)); // 2080 + 104 + 170
    }

    #[test]
    fn test_external_charges_overflow_is_an_error() {
        let fare = FareCalculator::default()
            .compute(&FareRequest::new(
                ServiceType::OneWay,
                VehicleCategory::Sedan,
                dec!(20),
            ))
            .unwrap();
        let external = ExternalCharges {
            toll_charge: Decimal::MAX,
            permit_charge: dec!(0),
            parking_charge: dec!(50),
        };
        assert_eq!(external.total(), Err(TaxError::Overflow("external charges")));

        let result = quote(fare, GstRate::Five, None, None, external);
        assert_eq!(result, Err(TaxError::Overflow("external charges")));
    }
}
