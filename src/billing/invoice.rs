//! Invoice totals: article and charge aggregation plus GST

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::tax::gst::{GstCalculation, GstRate, GstRegime, GstSchedule};
use crate::types::*;
use crate::utils::validation::validate_amount_magnitude;

/// Computed money figures for a bill, kept at full precision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub article_total: BigDecimal,
    pub charge_total: BigDecimal,
    /// Articles plus charges, before tax
    pub subtotal: BigDecimal,
    pub regime: GstRegime,
    /// Component rates the tax amounts were computed with
    pub gst_rate: GstRate,
    /// Amount GST was levied on
    pub taxable_value: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
    pub grand_total: BigDecimal,
}

impl InvoiceTotals {
    pub fn total_gst(&self) -> BigDecimal {
        &self.cgst + &self.sgst + &self.igst
    }
}

/// Computes invoice totals against a GST schedule
#[derive(Debug, Clone, Default)]
pub struct InvoiceCalculator {
    schedule: GstSchedule,
}

impl InvoiceCalculator {
    /// Calculator for the given schedule; the schedule is validated up front
    pub fn new(schedule: GstSchedule) -> BillingResult<Self> {
        schedule.validate()?;
        Ok(Self { schedule })
    }

    pub fn schedule(&self) -> &GstSchedule {
        &self.schedule
    }

    /// Compute totals for one bill.
    ///
    /// Standard regime: 18% of the subtotal, split CGST/SGST within a state and
    /// IGST across states. Transport liable: 2.5% CGST plus 2.5% SGST on freight
    /// alone. Nothing is rounded.
    pub fn compute(
        &self,
        origin: &Location,
        destination: &Location,
        articles: &[Article],
        charges: &ChargeSet,
        liable_party: GstLiableParty,
    ) -> BillingResult<InvoiceTotals> {
        validate_route(origin, destination)?;
        validate_articles(articles)?;
        validate_charges(charges)?;

        let article_total: BigDecimal = articles.iter().map(|a| &a.amount).sum();
        let charge_total = charges.total();
        let subtotal = &article_total + &charge_total;

        let regime = GstRegime::determine(origin, destination, liable_party);
        let taxable_value = if regime.taxes_freight_only() {
            charges.freight.clone()
        } else {
            subtotal.clone()
        };

        let gst = GstCalculation::calculate(taxable_value, self.schedule.rate_for(regime))?;
        let grand_total = &subtotal + &gst.total_gst_amount;

        Ok(InvoiceTotals {
            article_total,
            charge_total,
            subtotal,
            regime,
            gst_rate: gst.gst_rate,
            taxable_value: gst.base_amount,
            cgst: gst.cgst_amount,
            sgst: gst.sgst_amount,
            igst: gst.igst_amount,
            grand_total,
        })
    }

    /// Compute totals for a bill against its shipment's route
    pub fn compute_for_shipment(
        &self,
        shipment: &Shipment,
        articles: &[Article],
        charges: &ChargeSet,
        liable_party: GstLiableParty,
    ) -> BillingResult<InvoiceTotals> {
        self.compute(
            &shipment.origin,
            &shipment.destination,
            articles,
            charges,
            liable_party,
        )
    }
}

/// Compute invoice totals with the standard freight GST schedule
pub fn compute_invoice_totals(
    origin: &Location,
    destination: &Location,
    articles: &[Article],
    charges: &ChargeSet,
    liable_party: GstLiableParty,
) -> BillingResult<InvoiceTotals> {
    InvoiceCalculator::default().compute(origin, destination, articles, charges, liable_party)
}

/// Same as [`compute_invoice_totals`] but for legacy `"<city>, <state>"` strings
pub fn compute_invoice_totals_from_addresses(
    origin: &str,
    destination: &str,
    articles: &[Article],
    charges: &ChargeSet,
    liable_party: GstLiableParty,
) -> BillingResult<InvoiceTotals> {
    let origin = Location::parse(origin).map_err(|e| relabel(e, "origin"))?;
    let destination = Location::parse(destination).map_err(|e| relabel(e, "destination"))?;
    compute_invoice_totals(&origin, &destination, articles, charges, liable_party)
}

fn relabel(err: BillingError, field: &str) -> BillingError {
    match err {
        BillingError::Validation { message, .. } => BillingError::validation(field, message),
        other => other,
    }
}

// Locations built by hand can bypass `Location::new`.
fn validate_route(origin: &Location, destination: &Location) -> BillingResult<()> {
    for (field, location) in [("origin", origin), ("destination", destination)] {
        if location.state.trim().is_empty() {
            return Err(BillingError::validation(
                format!("{}.state", field),
                "State is required to decide GST jurisdiction",
            ));
        }
        if location.city.trim().is_empty() {
            return Err(BillingError::validation(
                format!("{}.city", field),
                "City cannot be empty",
            ));
        }
    }
    Ok(())
}

fn validate_articles(articles: &[Article]) -> BillingResult<()> {
    let zero = BigDecimal::from(0);
    for (index, article) in articles.iter().enumerate() {
        validate_amount_magnitude(&format!("articles[{}].amount", index), &article.amount)?;
        if article.amount < zero {
            return Err(BillingError::validation(
                format!("articles[{}].amount", index),
                format!("Amount cannot be negative: {}", article.amount),
            ));
        }
    }
    Ok(())
}

fn validate_charges(charges: &ChargeSet) -> BillingResult<()> {
    let zero = BigDecimal::from(0);
    for (kind, amount) in charges.iter() {
        validate_amount_magnitude(&format!("charges.{}", kind.field()), amount)?;
        if *amount < zero {
            return Err(BillingError::validation(
                format!("charges.{}", kind.field()),
                format!("{} cannot be negative: {}", kind.label(), amount),
            ));
        }
    }
    Ok(())
}
