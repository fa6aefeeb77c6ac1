//! Billing configuration

use serde::{Deserialize, Serialize};

use crate::tax::gst::GstSchedule;
use crate::types::{BillingError, BillingResult};

/// Settings for bill numbering, payment terms, GST rates and invoice header text.
///
/// Every field has a default, so a partial JSON/TOML document only needs to
/// name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub gst: GstSchedule,
    /// Days between bill date and due date
    pub payment_terms_days: u32,
    /// Bill numbers are `<prefix><sequence>`, sequence zero padded to three digits
    pub bill_number_prefix: String,
    pub issuer_name: String,
    pub issuer_tagline: String,
    pub terms: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            gst: GstSchedule::default(),
            payment_terms_days: 30,
            bill_number_prefix: "BILL".to_string(),
            issuer_name: "Vahan Sarthi".to_string(),
            issuer_tagline: "Your Trusted Logistics Partner".to_string(),
            terms: "Payment due within 30 days. Please make all cheques payable to Vahan Sarthi Logistics.".to_string(),
        }
    }
}

impl BillingConfig {
    pub fn validate(&self) -> BillingResult<()> {
        self.gst.validate()?;

        if self.bill_number_prefix.trim().is_empty() {
            return Err(BillingError::validation(
                "bill_number_prefix",
                "Bill number prefix cannot be empty",
            ));
        }

        if self.payment_terms_days > 365 {
            return Err(BillingError::validation(
                "payment_terms_days",
                "Payment terms cannot exceed 365 days",
            ));
        }

        Ok(())
    }

    /// Bill number for the given 1-based sequence
    pub fn bill_number(&self, sequence: usize) -> String {
        format!("{}{:03}", self.bill_number_prefix, sequence)
    }
}
