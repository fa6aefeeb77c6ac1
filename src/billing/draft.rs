//! Raw bill form input and its conversion into typed articles and charges

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::*;

/// One article row as typed into the bill form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleInput {
    pub quantity: String,
    pub package_type: String,
    pub details: String,
    pub amount: String,
}

impl ArticleInput {
    pub fn new(
        quantity: impl Into<String>,
        package_type: impl Into<String>,
        details: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            quantity: quantity.into(),
            package_type: package_type.into(),
            details: details.into(),
            amount: amount.into(),
        }
    }

    /// Parse the row; `index` is used to address errors, e.g. `articles[2].amount`
    pub fn parse(&self, index: usize) -> BillingResult<Article> {
        let quantity_field = format!("articles[{}].quantity", index);
        let amount_field = format!("articles[{}].amount", index);

        let quantity = parse_quantity(&quantity_field, &self.quantity)?;
        let amount = parse_amount(&amount_field, &self.amount, true)?;

        Ok(Article {
            quantity,
            package_type: self.package_type.trim().to_string(),
            details: self.details.trim().to_string(),
            amount,
        })
    }

    /// Row as it would be shown when editing an existing article
    pub fn from_article(article: &Article) -> Self {
        Self {
            quantity: article.quantity.to_string(),
            package_type: article.package_type.clone(),
            details: article.details.clone(),
            amount: article.amount.to_string(),
        }
    }
}

/// Charge fields as typed into the bill form. Blank means zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargesInput {
    pub freight: String,
    pub surcharge: String,
    pub hamali: String,
    pub door_delivery: String,
    pub other: String,
}

impl ChargesInput {
    fn raw(&self, kind: ChargeKind) -> &str {
        match kind {
            ChargeKind::Freight => &self.freight,
            ChargeKind::Surcharge => &self.surcharge,
            ChargeKind::Hamali => &self.hamali,
            ChargeKind::DoorDelivery => &self.door_delivery,
            ChargeKind::Other => &self.other,
        }
    }

    pub fn parse(&self) -> BillingResult<ChargeSet> {
        let mut charges = ChargeSet::default();
        for kind in ChargeKind::ALL {
            let field = format!("charges.{}", kind.field());
            let amount = parse_amount(&field, self.raw(kind), false)?;
            charges.set(kind, amount);
        }
        Ok(charges)
    }

    pub fn from_charges(charges: &ChargeSet) -> Self {
        Self {
            freight: charges.freight.to_string(),
            surcharge: charges.surcharge.to_string(),
            hamali: charges.hamali.to_string(),
            door_delivery: charges.door_delivery.to_string(),
            other: charges.other.to_string(),
        }
    }
}

/// Parse every article row, stopping at the first bad field
pub fn parse_articles(rows: &[ArticleInput]) -> BillingResult<Vec<Article>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| row.parse(index))
        .collect()
}

fn parse_quantity(field: &str, raw: &str) -> BillingResult<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BillingError::validation(field, "Quantity is required"));
    }

    let value = i64::from_str(raw).map_err(|_| {
        BillingError::validation(field, format!("'{}' is not a whole number", raw))
    })?;
    if value < 0 {
        return Err(BillingError::validation(
            field,
            "Quantity cannot be negative",
        ));
    }

    u32::try_from(value)
        .map_err(|_| BillingError::validation(field, format!("Quantity {} is too large", value)))
}

fn parse_amount(field: &str, raw: &str, required: bool) -> BillingResult<BigDecimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        if required {
            return Err(BillingError::validation(field, "Amount is required"));
        }
        return Ok(BigDecimal::from(0));
    }

    let amount = plain_decimal(raw)
        .and_then(|text| BigDecimal::from_str(&text).ok())
        .ok_or_else(|| {
            BillingError::validation(field, format!("'{}' is not a valid amount", raw))
        })?;
    crate::utils::validation::validate_non_negative_amount(field, &amount)?;
    Ok(amount)
}

// Digits with at most one decimal point and an optional leading sign,
// rewritten as `[-]<whole>.<fraction>`. Exponent notation is not accepted.
fn plain_decimal(raw: &str) -> Option<String> {
    let (sign, unsigned) = match raw.chars().next() {
        Some('-') => ("-", &raw[1..]),
        Some('+') => ("", &raw[1..]),
        _ => ("", raw),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };

    let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction) {
        return None;
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let fraction = if fraction.is_empty() { "0" } else { fraction };
    Some(format!("{}{}.{}", sign, whole, fraction))
}
