//! Validation utilities

use bigdecimal::BigDecimal;

use crate::billing::bill::BillDraft;
use crate::traits::*;
use crate::types::*;

/// Largest number of digits before the decimal point in an input amount
pub const MAX_AMOUNT_WHOLE_DIGITS: i64 = 15;
/// Largest number of decimal places in an input amount
pub const MAX_AMOUNT_SCALE: i64 = 6;

/// Validate that an amount has a sane number of whole and fractional digits.
///
/// Checked on digits and exponent only, so huge exponents are rejected
/// without ever being expanded.
pub fn validate_amount_magnitude(field: &str, amount: &BigDecimal) -> BillingResult<()> {
    let (digits, scale) = amount.as_bigint_and_exponent();
    if scale > MAX_AMOUNT_SCALE {
        return Err(BillingError::validation(
            field,
            format!("Amount cannot have more than {} decimal places", MAX_AMOUNT_SCALE),
        ));
    }

    let digit_count = digits.to_string().trim_start_matches('-').len() as i64;
    if digit_count.saturating_sub(scale) > MAX_AMOUNT_WHOLE_DIGITS {
        return Err(BillingError::validation(field, "Amount is too large"));
    }

    Ok(())
}

/// Validate that an amount is zero or more and within bounds
pub fn validate_non_negative_amount(field: &str, amount: &BigDecimal) -> BillingResult<()> {
    validate_amount_magnitude(field, amount)?;
    if *amount < BigDecimal::from(0) {
        Err(BillingError::validation(field, "Amount cannot be negative"))
    } else {
        Ok(())
    }
}

/// Validate a record id (LR number, bill number, branch or vehicle code)
pub fn validate_record_id(field: &str, id: &str) -> BillingResult<()> {
    if id.trim().is_empty() {
        return Err(BillingError::validation(field, "ID cannot be empty"));
    }

    if id.len() > 50 {
        return Err(BillingError::validation(
            field,
            "ID cannot exceed 50 characters",
        ));
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(BillingError::validation(
            field,
            "ID can only contain letters, digits, dashes, and underscores",
        ));
    }

    Ok(())
}

/// Validate a person, company or branch name
pub fn validate_name(field: &str, name: &str) -> BillingResult<()> {
    if name.trim().is_empty() {
        return Err(BillingError::validation(field, "Name cannot be empty"));
    }

    if name.len() > 100 {
        return Err(BillingError::validation(
            field,
            "Name cannot exceed 100 characters",
        ));
    }

    Ok(())
}

/// Validate a GSTIN: 15 characters, two-digit state code, uppercase alphanumerics
pub fn validate_gstin(field: &str, gstin: &str) -> BillingResult<()> {
    let gstin = gstin.trim();
    if gstin.len() != 15 {
        return Err(BillingError::validation(
            field,
            "GSTIN must be 15 characters",
        ));
    }

    if !gstin.chars().take(2).all(|c| c.is_ascii_digit()) {
        return Err(BillingError::validation(
            field,
            "GSTIN must start with a two-digit state code",
        ));
    }

    if !gstin
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    {
        return Err(BillingError::validation(
            field,
            "GSTIN can only contain digits and uppercase letters",
        ));
    }

    Ok(())
}

/// Validate a 10-digit phone number
pub fn validate_phone(field: &str, phone: &str) -> BillingResult<()> {
    let phone = phone.trim();
    if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(BillingError::validation(
            field,
            "Phone number must be 10 digits",
        ));
    }
    Ok(())
}

/// Validate a consignor/consignee block; `prefix` names the party in errors
pub fn validate_customer(prefix: &str, customer: &Customer) -> BillingResult<()> {
    validate_name(&format!("{}.name", prefix), &customer.name)?;

    if let Some(gstin) = customer.gstin.as_deref().filter(|g| !g.trim().is_empty()) {
        validate_gstin(&format!("{}.gstin", prefix), gstin)?;
    }
    if let Some(phone) = customer.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        validate_phone(&format!("{}.phone", prefix), phone)?;
    }

    Ok(())
}

/// Validate a shipment before it is registered
pub fn validate_shipment(shipment: &Shipment) -> BillingResult<()> {
    validate_record_id("shipment.id", &shipment.id)?;
    validate_customer("consignor", &shipment.consignor)?;
    validate_customer("consignee", &shipment.consignee)?;
    validate_non_negative_amount("shipment.weight", &shipment.weight)?;
    validate_non_negative_amount("shipment.value", &shipment.value)?;
    Ok(())
}

/// Stricter bill rules: described articles and no deletion of paid bills
pub struct EnhancedBillValidator;

impl BillValidator for EnhancedBillValidator {
    fn validate_draft(&self, draft: &BillDraft) -> BillingResult<()> {
        DefaultBillValidator.validate_draft(draft)?;

        for (index, article) in draft.articles.iter().enumerate() {
            if article.package_type.trim().is_empty() {
                return Err(BillingError::validation(
                    format!("articles[{}].package_type", index),
                    "Package type is required",
                ));
            }
            if article.details.trim().is_empty() {
                return Err(BillingError::validation(
                    format!("articles[{}].details", index),
                    "Article details are required",
                ));
            }
        }

        Ok(())
    }

    fn validate_bill_deletion(&self, bill: &Bill) -> BillingResult<()> {
        if bill.status == BillStatus::Paid {
            return Err(BillingError::Conflict(format!(
                "Bill '{}' is paid and cannot be deleted",
                bill.id
            )));
        }
        Ok(())
    }
}
