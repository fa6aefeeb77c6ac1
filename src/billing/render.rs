//! Invoice presentation: display rounding, rupee formatting and the printable view model

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use crate::config::BillingConfig;
use crate::tax::gst::{GstRate, GstRegime};
use crate::types::*;

/// Round half-up to paise. Only used for display.
pub fn round_for_display(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

/// Two decimals with Indian digit grouping, e.g. `12,34,567.50`
pub fn format_amount(amount: &BigDecimal) -> String {
    let (digits, scale) = round_for_display(amount).as_bigint_and_exponent();
    let digits = digits.to_string();
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest.to_string()),
        None => (false, digits),
    };

    let scale = scale.max(0) as usize;
    let padded = format!("{:0>width$}", digits, width = scale + 1);
    let (whole, fraction) = padded.split_at(padded.len() - scale);

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_indian(whole));
    if scale > 0 {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Amount with the rupee sign
pub fn format_inr(amount: &BigDecimal) -> String {
    format!("₹{}", format_amount(amount))
}

// Last three digits, then pairs: 1234567 -> 12,34,567
fn group_indian(whole: &str) -> String {
    if whole.len() <= 3 {
        return whole.to_string();
    }

    let (head, tail) = whole.split_at(whole.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Party block on the invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyView {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub gstin: Option<String>,
}

impl From<&Customer> for PartyView {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            address: customer.address.clone(),
            phone: customer.phone.clone(),
            gstin: customer.gstin.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRow {
    pub quantity: u32,
    pub package_type: String,
    pub description: String,
    /// Shipment weight, shown on the first row only
    pub weight_kg: Option<String>,
    pub amount: String,
}

/// Label and formatted amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountRow {
    pub label: String,
    pub amount: String,
}

/// Everything a printed or on-screen invoice shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceView {
    pub issuer_name: String,
    pub issuer_tagline: String,
    pub bill_id: String,
    pub date: String,
    pub due_date: String,
    pub lr_number: String,
    pub consignor: PartyView,
    pub consignee: PartyView,
    pub articles: Vec<ArticleRow>,
    pub article_total: String,
    /// Non-zero charge heads only
    pub charges: Vec<AmountRow>,
    pub subtotal: String,
    pub taxes: Vec<AmountRow>,
    pub grand_total: String,
    pub vehicle_number: Option<String>,
    pub driver_name: Option<String>,
    pub status: String,
    pub charge_status: String,
    pub terms: String,
}

impl InvoiceView {
    /// Build the view from stored records. Totals are taken from the bill as saved.
    pub fn build(
        config: &BillingConfig,
        bill: &Bill,
        shipment: &Shipment,
        vehicle: Option<&Vehicle>,
        driver: Option<&Driver>,
    ) -> Self {
        let zero = BigDecimal::from(0);

        let articles = bill
            .articles
            .iter()
            .enumerate()
            .map(|(index, article)| ArticleRow {
                quantity: article.quantity,
                package_type: article.package_type.clone(),
                description: article.details.clone(),
                weight_kg: (index == 0).then(|| format_amount(&shipment.weight)),
                amount: format_inr(&article.amount),
            })
            .collect();

        let charges = bill
            .charges
            .iter()
            .filter(|(_, amount)| **amount > zero)
            .map(|(kind, amount)| AmountRow {
                label: kind.label().to_string(),
                amount: format_inr(amount),
            })
            .collect();

        let totals = &bill.totals;
        let taxes = tax_rows(
            totals.regime,
            &totals.gst_rate,
            &totals.cgst,
            &totals.sgst,
            &totals.igst,
        );

        Self {
            issuer_name: config.issuer_name.clone(),
            issuer_tagline: config.issuer_tagline.clone(),
            bill_id: bill.id.clone(),
            date: bill.date.format("%d/%m/%Y").to_string(),
            due_date: bill.due_date.format("%d/%m/%Y").to_string(),
            lr_number: shipment.id.clone(),
            consignor: PartyView::from(&shipment.consignor),
            consignee: PartyView::from(&shipment.consignee),
            articles,
            article_total: format_inr(&totals.article_total),
            charges,
            subtotal: format_inr(&totals.subtotal),
            taxes,
            grand_total: format_inr(&totals.grand_total),
            vehicle_number: vehicle.map(|v| v.registration_number.clone()),
            driver_name: driver.map(|d| d.name.clone()),
            status: bill.status.to_string(),
            charge_status: bill.charge_status.to_string(),
            terms: config.terms.clone(),
        }
    }
}

fn tax_rows(
    regime: GstRegime,
    rate: &GstRate,
    cgst: &BigDecimal,
    sgst: &BigDecimal,
    igst: &BigDecimal,
) -> Vec<AmountRow> {
    let row = |name: &str, pct: &BigDecimal, amount: &BigDecimal| AmountRow {
        label: format!("{} ({}%)", name, pct.normalized()),
        amount: format!("+ {}", format_inr(amount)),
    };

    match regime {
        GstRegime::IntraState | GstRegime::TransportForwardCharge => vec![
            row("CGST", &rate.cgst_rate, cgst),
            row("SGST", &rate.sgst_rate, sgst),
        ],
        GstRegime::InterState => vec![row("IGST", &rate.igst_rate, igst)],
    }
}
