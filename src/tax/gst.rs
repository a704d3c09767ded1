//! GST determination for passenger transport.
//!
//! Pure functions: the tax type is decided from the state codes of the
//! supplier's and customer's GSTINs, and components are rounded to whole
//! rupees.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::round_rupees;

use super::TaxError;

/// Supported GST rates for passenger transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum GstRate {
    /// Without input tax credit
    #[default]
    Five,
    /// With input tax credit
    Twelve,
}

impl GstRate {
    pub fn percent(self) -> u32 {
        match self {
            GstRate::Five => 5,
            GstRate::Twelve => 12,
        }
    }
}

impl From<GstRate> for u32 {
    fn from(rate: GstRate) -> Self {
        rate.percent()
    }
}

impl TryFrom<u32> for GstRate {
    type Error = TaxError;

    fn try_from(percent: u32) -> Result<Self, Self::Error> {
        match percent {
            5 => Ok(GstRate::Five),
            12 => Ok(GstRate::Twelve),
            other => Err(TaxError::UnsupportedRate(other)),
        }
    }
}

impl std::str::FromStr for GstRate {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let percent = s
            .trim()
            .trim_end_matches('%')
            .parse::<u32>()
            .map_err(|_| TaxError::InvalidRate(s.to_string()))?;
        GstRate::try_from(percent)
    }
}

/// Which levy applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GstType {
    /// Inter-state: single integrated tax
    #[serde(rename = "IGST")]
    Igst,
    /// Intra-state: paired central and state tax
    #[serde(rename = "CGST_SGST")]
    CgstSgst,
}

/// Tax on one taxable amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstBreakdown {
    pub taxable_amount: Decimal,
    pub rate: GstRate,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_tax: Decimal,
    pub total_amount: Decimal,
    pub is_inter_state: bool,
    #[serde(rename = "type")]
    pub gst_type: GstType,
}

/// Leading state code of a GSTIN-style identifier.
///
/// Identifiers are not validated: whatever the first two characters are,
/// they are the state code. Blank identifiers have none.
pub fn state_code(gstin: &str) -> Option<&str> {
    let trimmed = gstin.trim();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed
        .char_indices()
        .nth(2)
        .map(|(idx, _)| idx)
        .unwrap_or(trimmed.len());
    Some(&trimmed[..end])
}

/// Decide between IGST and CGST+SGST.
///
/// Without a supplier GSTIN, or without a customer GSTIN (unregistered
/// buyer), the supply is treated as intra-state. Place-of-supply rules for
/// passenger transport are not modelled beyond this.
pub fn determine_type(supplier_gstin: Option<&str>, customer_gstin: Option<&str>) -> GstType {
    let supplier = supplier_gstin.and_then(state_code);
    let customer = customer_gstin.and_then(state_code);

    match (supplier, customer) {
        (Some(supplier), Some(customer)) if supplier != customer => GstType::Igst,
        _ => GstType::CgstSgst,
    }
}

/// Compute GST on `amount`.
///
/// CGST and SGST are each rounded from half the rate, not split from a
/// rounded total, so their sum can differ by one rupee from
/// `round(amount * rate / 100)`.
///
/// Fails only when an amount no longer fits in a `Decimal`.
pub fn calculate_gst(
    amount: Decimal,
    rate: GstRate,
    supplier_gstin: Option<&str>,
    customer_gstin: Option<&str>,
) -> Result<GstBreakdown, TaxError> {
    let gst_type = determine_type(supplier_gstin, customer_gstin);
    let percent = Decimal::from(rate.percent());
    // Divide first so the tax never exceeds the amount it is levied on.
    let levy = |divisor: u32| {
        amount
            .checked_div(Decimal::from(divisor))
            .and_then(|part| part.checked_mul(percent))
            .map(round_rupees)
            .ok_or(TaxError::Overflow("tax"))
    };

    let (cgst, sgst, igst) = match gst_type {
        GstType::Igst => (Decimal::ZERO, Decimal::ZERO, levy(100)?),
        GstType::CgstSgst => {
            let half = levy(200)?;
            (half, half, Decimal::ZERO)
        }
    };
    let total_tax = cgst + sgst + igst;
    let total_amount = amount
        .checked_add(total_tax)
        .ok_or(TaxError::Overflow("total amount"))?;

    Ok(GstBreakdown {
        taxable_amount: amount,
        rate,
        cgst,
        sgst,
        igst,
        total_tax,
        total_amount,
        is_inter_state: gst_type == GstType::Igst,
        gst_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_inter_state_igst() {
        let gst = calculate_gst(
            dec!(10000),
            GstRate::Five,
            Some("33AAACT1234F1Z5"),
            Some("29AABCU9603R1ZM"),
        )
        .unwrap();

        assert_eq!(gst.gst_type, GstType::Igst);
        assert!(gst.is_inter_state);
        assert_eq!(gst.igst, dec!(500));
        assert_eq!(gst.cgst, dec!(0));
        assert_eq!(gst.sgst, dec!(0));
        assert_eq!(gst.total_tax, dec!(500));
        assert_eq!(gst.total_amount, dec!(10500));
    }

    #[test]
    fn test_unregistered_customer_is_intra_state() {
        let gst =
            calculate_gst(dec!(10000), GstRate::Five, Some("33AAACT1234F1Z5"), None).unwrap();

        assert_eq!(gst.gst_type, GstType::CgstSgst);
        assert_eq!(gst.cgst, dec!(250));
        assert_eq!(gst.sgst, dec!(250));
        assert_eq!(gst.igst, dec!(0));
        assert_eq!(gst.total_tax, dec!(500));
        assert_eq!(gst.total_amount, dec!(10500));
    }

    #[test]
    fn test_same_state_is_intra_state() {
        let gst = calculate_gst(
            dec!(2080),
            GstRate::Twelve,
            Some("33AAACT1234F1Z5"),
            Some("33BBBCT9999F1Z1"),
        )
        .unwrap();
        assert_eq!(gst.gst_type, GstType::CgstSgst);
        assert_eq!(gst.cgst, gst.sgst);
        assert_eq!(gst.cgst, dec!(125)); // 124.8
    }

    #[test]
    fn test_no_supplier_defaults_to_intra_state() {
        assert_eq!(determine_type(None, Some("29AABCU9603R1ZM")), GstType::CgstSgst);
        assert_eq!(determine_type(Some("  "), Some("29AABCU9603R1ZM")), GstType::CgstSgst);
    }

    #[test]
    fn test_components_rounded_independently() {
        // 105 * 5 / 200 = 2.625 -> 3 each; the rounded total would be 5
        let gst = calculate_gst(dec!(105), GstRate::Five, None, None).unwrap();
        assert_eq!(gst.cgst, dec!(3));
        assert_eq!(gst.sgst, dec!(3));
        assert_eq!(gst.total_tax, dec!(6));
        assert_eq!(round_rupees(dec!(105) * dec!(5) / dec!(100)), dec!(5));
    }

    #[test]
    fn test_malformed_ids_compare_by_prefix() {
        assert_eq!(state_code("x"), Some("x"));
        assert_eq!(state_code("  ab-123 "), Some("ab"));
        assert_eq!(state_code(""), None);
        assert_eq!(determine_type(Some("3"), Some("33")), GstType::Igst);
        assert_eq!(determine_type(Some("ZZ"), Some("ZZtop")), GstType::CgstSgst);
    }

    #[test]
    fn test_calculate_gst_is_deterministic() {
        let a = calculate_gst(dec!(4321.5), GstRate::Twelve, Some("07"), Some("09")).unwrap();
        let b = calculate_gst(dec!(4321.5), GstRate::Twelve, Some("07"), Some("09")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rate_conversions() {
        assert_eq!(GstRate::try_from(12).unwrap(), GstRate::Twelve);
        assert!(matches!(GstRate::try_from(18), Err(TaxError::UnsupportedRate(18))));
        assert_eq!("5%".parse::<GstRate>().unwrap(), GstRate::Five);
        assert!(matches!("five".parse::<GstRate>(), Err(TaxError::InvalidRate(_))));
    }

    #[test]
    fn test_breakdown_serializes_type_tag() {
        let gst = calculate_gst(dec!(1000), GstRate::Five, Some("33"), Some("29")).unwrap();
        let json = serde_json::to_value(&gst).unwrap();
        assert_eq!(json["type"], "IGST");
        assert_eq!(json["rate"], 5);
        assert_eq!(json["isInterState"], true);
    }

    #[test]
    fn test_overflowing_total_is_an_error() {
        assert_eq!(
            calculate_gst(Decimal::MAX, GstRate::Twelve, None, None),
            Err(TaxError::Overflow("total amount"))
        );
        assert_eq!(
            calculate_gst(Decimal::MAX, GstRate::Five, Some("33"), Some("29")),
            Err(TaxError::Overflow("total amount"))
        );

        // Largest taxable amounts still compute their levy.
        let gst = calculate_gst(Decimal::MAX / Decimal::from(2), GstRate::Five, None, None)
            .unwrap();
        assert_eq!(gst.cgst, gst.sgst);
    }
}
