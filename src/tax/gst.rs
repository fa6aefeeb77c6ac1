//! GST (Goods and Services Tax) rules for road freight

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::{GstLiableParty, Location};

/// Which GST treatment applies to a consignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GstRegime {
    /// Origin and destination in the same state: CGST + SGST on the subtotal
    IntraState,
    /// Crosses a state border: IGST on the subtotal
    InterState,
    /// Transporter is liable: CGST + SGST on freight only, whatever the route
    TransportForwardCharge,
}

impl GstRegime {
    /// Select the regime for a route and liable party
    pub fn determine(
        origin: &Location,
        destination: &Location,
        liable_party: GstLiableParty,
    ) -> Self {
        match liable_party {
            GstLiableParty::Transport => GstRegime::TransportForwardCharge,
            GstLiableParty::Consignor | GstLiableParty::Consignee => {
                if origin.same_state(destination) {
                    GstRegime::IntraState
                } else {
                    GstRegime::InterState
                }
            }
        }
    }

    /// Tax is levied on freight alone rather than the whole subtotal
    pub fn taxes_freight_only(self) -> bool {
        self == GstRegime::TransportForwardCharge
    }
}

/// Percentage split of a GST rate into its components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstRate {
    /// Total rate in percent, e.g. 18 for 18%
    pub total_rate: BigDecimal,
    pub cgst_rate: BigDecimal,
    pub sgst_rate: BigDecimal,
    pub igst_rate: BigDecimal,
}

impl GstRate {
    /// Equal CGST and SGST halves
    pub fn intra_state(total_rate: BigDecimal) -> Self {
        let half_rate = &total_rate / BigDecimal::from(2);
        Self {
            total_rate,
            cgst_rate: half_rate.clone(),
            sgst_rate: half_rate,
            igst_rate: BigDecimal::from(0),
        }
    }

    /// Whole rate as IGST
    pub fn inter_state(total_rate: BigDecimal) -> Self {
        Self {
            total_rate: total_rate.clone(),
            cgst_rate: BigDecimal::from(0),
            sgst_rate: BigDecimal::from(0),
            igst_rate: total_rate,
        }
    }

    /// Check that the components add up and are not mixed across regimes
    pub fn validate(&self) -> Result<(), GstError> {
        let zero = BigDecimal::from(0);

        for (name, rate) in [
            ("total", &self.total_rate),
            ("CGST", &self.cgst_rate),
            ("SGST", &self.sgst_rate),
            ("IGST", &self.igst_rate),
        ] {
            if *rate < zero || *rate > BigDecimal::from(100) {
                return Err(GstError::InvalidRate(format!(
                    "{} rate must be between 0 and 100, got {}",
                    name, rate
                )));
            }
        }

        let calculated_total = &self.cgst_rate + &self.sgst_rate + &self.igst_rate;
        if calculated_total != self.total_rate {
            return Err(GstError::InvalidRate(format!(
                "GST components don't add up to total rate: {} != {}",
                calculated_total, self.total_rate
            )));
        }

        if self.igst_rate == zero && self.cgst_rate != self.sgst_rate {
            return Err(GstError::InvalidRate(
                "CGST and SGST rates must be equal".to_string(),
            ));
        }

        if self.igst_rate > zero && (self.cgst_rate > zero || self.sgst_rate > zero) {
            return Err(GstError::InvalidRate(
                "IGST cannot be combined with CGST or SGST".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configured GST rates for freight services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstSchedule {
    /// Total rate when the consignor or consignee is liable
    pub standard_rate: BigDecimal,
    /// Total rate when the transporter pays on freight
    pub forward_charge_rate: BigDecimal,
}

impl Default for GstSchedule {
    fn default() -> Self {
        Self {
            standard_rate: BigDecimal::from(18),
            forward_charge_rate: BigDecimal::from(5),
        }
    }
}

impl GstSchedule {
    /// Component rates for a regime
    pub fn rate_for(&self, regime: GstRegime) -> GstRate {
        match regime {
            GstRegime::IntraState => GstRate::intra_state(self.standard_rate.clone()),
            GstRegime::InterState => GstRate::inter_state(self.standard_rate.clone()),
            GstRegime::TransportForwardCharge => {
                GstRate::intra_state(self.forward_charge_rate.clone())
            }
        }
    }

    pub fn validate(&self) -> Result<(), GstError> {
        for regime in [
            GstRegime::IntraState,
            GstRegime::InterState,
            GstRegime::TransportForwardCharge,
        ] {
            self.rate_for(regime).validate()?;
        }
        Ok(())
    }
}

/// GST amounts for one taxable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstCalculation {
    pub base_amount: BigDecimal,
    pub gst_rate: GstRate,
    pub cgst_amount: BigDecimal,
    pub sgst_amount: BigDecimal,
    pub igst_amount: BigDecimal,
    pub total_gst_amount: BigDecimal,
}

impl GstCalculation {
    /// Apply a rate to a base amount. No rounding is done here.
    pub fn calculate(base_amount: BigDecimal, gst_rate: GstRate) -> Result<Self, GstError> {
        gst_rate.validate()?;

        if base_amount < BigDecimal::from(0) {
            return Err(GstError::Calculation(format!(
                "Taxable value cannot be negative: {}",
                base_amount
            )));
        }

        let cgst_amount = (&base_amount * &gst_rate.cgst_rate) / BigDecimal::from(100);
        let sgst_amount = (&base_amount * &gst_rate.sgst_rate) / BigDecimal::from(100);
        let igst_amount = (&base_amount * &gst_rate.igst_rate) / BigDecimal::from(100);
        let total_gst_amount = &cgst_amount + &sgst_amount + &igst_amount;

        Ok(Self {
            base_amount,
            gst_rate,
            cgst_amount,
            sgst_amount,
            igst_amount,
            total_gst_amount,
        })
    }
}

/// GST-related errors
#[derive(Debug, thiserror::Error)]
pub enum GstError {
    #[error("Invalid GST rate: {0}")]
    InvalidRate(String),
    #[error("Calculation error: {0}")]
    Calculation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn parse_rate(raw: &str) -> Result<BigDecimal, bigdecimal::ParseBigDecimalError> {
        BigDecimal::from_str(raw)
    }

    fn loc(raw: &str) -> Location {
        Location::parse(raw).unwrap()
    }

    #[test]
    fn test_gst_rate_intra_state() {
        let rate = GstRate::intra_state(BigDecimal::from(18));
        assert_eq!(rate.cgst_rate, BigDecimal::from(9));
        assert_eq!(rate.sgst_rate, BigDecimal::from(9));
        assert_eq!(rate.igst_rate, BigDecimal::from(0));
        assert!(rate.validate().is_ok());
    }

    #[test]
    fn test_gst_rate_inter_state() {
        let rate = GstRate::inter_state(BigDecimal::from(18));
        assert_eq!(rate.cgst_rate, BigDecimal::from(0));
        assert_eq!(rate.igst_rate, BigDecimal::from(18));
        assert!(rate.validate().is_ok());
    }

    #[test]
    fn test_mixed_rate_is_rejected() {
        let rate = GstRate {
            total_rate: BigDecimal::from(18),
            cgst_rate: BigDecimal::from(4),
            sgst_rate: BigDecimal::from(5),
            igst_rate: BigDecimal::from(9),
        };
        assert!(matches!(rate.validate(), Err(GstError::InvalidRate(_))));
    }

    #[test]
    fn test_regime_selection() {
        let mumbai = loc("Mumbai, Maharashtra");
        let pune = loc("Pune, Maharashtra");
        let delhi = loc("New Delhi, Delhi");

        assert_eq!(
            GstRegime::determine(&mumbai, &pune, GstLiableParty::Consignor),
            GstRegime::IntraState
        );
        assert_eq!(
            GstRegime::determine(&mumbai, &delhi, GstLiableParty::Consignee),
            GstRegime::InterState
        );
        assert_eq!(
            GstRegime::determine(&mumbai, &delhi, GstLiableParty::Transport),
            GstRegime::TransportForwardCharge
        );
    }

    #[test]
    fn test_forward_charge_split() {
        let rate = GstSchedule::default().rate_for(GstRegime::TransportForwardCharge);
        assert_eq!(rate.cgst_rate, parse_rate("2.5").unwrap());
        assert_eq!(rate.sgst_rate, parse_rate("2.5").unwrap());
        assert_eq!(rate.igst_rate, BigDecimal::from(0));
    }

    #[test]
    fn test_gst_calculation() {
        let calculation =
            GstCalculation::calculate(BigDecimal::from(1000), GstRate::intra_state(BigDecimal::from(18)))
                .unwrap();
        assert_eq!(calculation.cgst_amount, BigDecimal::from(90));
        assert_eq!(calculation.sgst_amount, BigDecimal::from(90));
        assert_eq!(calculation.total_gst_amount, BigDecimal::from(180));
    }

    #[test]
    fn test_gst_calculation_keeps_precision() {
        let calculation = GstCalculation::calculate(
            parse_rate("333.33").unwrap(),
            GstRate::inter_state(BigDecimal::from(18)),
        )
        .unwrap();
        assert_eq!(calculation.igst_amount, parse_rate("59.9994").unwrap());
    }

    #[test]
    fn test_schedule_rejects_out_of_range_rate() {
        let schedule = GstSchedule {
            standard_rate: BigDecimal::from(180),
            forward_charge_rate: BigDecimal::from(5),
        };
        assert!(schedule.validate().is_err());
    }
}
