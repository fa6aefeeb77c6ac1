//! Bill drafting and finalization

use bigdecimal::BigDecimal;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::billing::draft::{parse_articles, ArticleInput, ChargesInput};
use crate::billing::invoice::{InvoiceCalculator, InvoiceTotals};
use crate::types::*;

/// Editable contents of a bill, before totals are fixed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDraft {
    pub date: NaiveDate,
    pub status: BillStatus,
    pub charge_status: ChargeStatus,
    pub gst_paid_by: GstLiableParty,
    pub articles: Vec<Article>,
    pub charges: ChargeSet,
}

impl BillDraft {
    /// Empty draft with the form defaults: unpaid, to pay, consignor liable
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            status: BillStatus::Unpaid,
            charge_status: ChargeStatus::ToPay,
            gst_paid_by: GstLiableParty::Consignor,
            articles: Vec::new(),
            charges: ChargeSet::default(),
        }
    }

    /// Draft from raw form rows
    pub fn from_form(
        date: NaiveDate,
        gst_paid_by: GstLiableParty,
        charge_status: ChargeStatus,
        articles: &[ArticleInput],
        charges: &ChargesInput,
    ) -> BillingResult<Self> {
        Ok(Self {
            date,
            status: BillStatus::Unpaid,
            charge_status,
            gst_paid_by,
            articles: parse_articles(articles)?,
            charges: charges.parse()?,
        })
    }

    /// Reopen a saved bill for editing
    pub fn from_bill(bill: &Bill) -> Self {
        Self {
            date: bill.date,
            status: bill.status,
            charge_status: bill.charge_status,
            gst_paid_by: bill.gst_paid_by,
            articles: bill.articles.clone(),
            charges: bill.charges.clone(),
        }
    }

    /// Live totals for the draft against the shipment's route
    pub fn preview(
        &self,
        calculator: &InvoiceCalculator,
        shipment: &Shipment,
    ) -> BillingResult<InvoiceTotals> {
        calculator.compute_for_shipment(shipment, &self.articles, &self.charges, self.gst_paid_by)
    }

    pub fn total_quantity(&self) -> u64 {
        self.articles.iter().map(|a| u64::from(a.quantity)).sum()
    }

    /// Fix totals and produce the bill record
    pub fn finalize(
        self,
        id: String,
        shipment: &Shipment,
        calculator: &InvoiceCalculator,
        payment_terms_days: u32,
    ) -> BillingResult<Bill> {
        let totals = self.preview(calculator, shipment)?;
        let due_date = due_date(self.date, payment_terms_days)?;
        let now = chrono::Utc::now().naive_utc();

        Ok(Bill {
            id,
            shipment_id: shipment.id.clone(),
            date: self.date,
            due_date,
            status: self.status,
            charge_status: self.charge_status,
            gst_paid_by: self.gst_paid_by,
            articles: self.articles,
            charges: self.charges,
            totals,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply the draft to an existing bill, recomputing its totals
    pub fn apply_to(
        self,
        bill: &mut Bill,
        shipment: &Shipment,
        calculator: &InvoiceCalculator,
        payment_terms_days: u32,
    ) -> BillingResult<()> {
        let totals = self.preview(calculator, shipment)?;
        bill.due_date = due_date(self.date, payment_terms_days)?;
        bill.date = self.date;
        bill.status = self.status;
        bill.charge_status = self.charge_status;
        bill.gst_paid_by = self.gst_paid_by;
        bill.articles = self.articles;
        bill.charges = self.charges;
        bill.totals = totals;
        bill.updated_at = chrono::Utc::now().naive_utc();
        Ok(())
    }
}

/// Bill date plus payment terms
pub fn due_date(date: NaiveDate, payment_terms_days: u32) -> BillingResult<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(payment_terms_days)))
        .ok_or_else(|| BillingError::validation("date", "Due date is out of range"))
}

/// Builder for bill drafts
#[derive(Debug)]
pub struct BillBuilder {
    draft: BillDraft,
}

impl BillBuilder {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            draft: BillDraft::new(date),
        }
    }

    pub fn gst_paid_by(mut self, party: GstLiableParty) -> Self {
        self.draft.gst_paid_by = party;
        self
    }

    pub fn charge_status(mut self, status: ChargeStatus) -> Self {
        self.draft.charge_status = status;
        self
    }

    pub fn status(mut self, status: BillStatus) -> Self {
        self.draft.status = status;
        self
    }

    /// Add an article row
    pub fn article(
        mut self,
        quantity: u32,
        package_type: impl Into<String>,
        details: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        self.draft
            .articles
            .push(Article::new(quantity, package_type, details, amount));
        self
    }

    /// Set one charge head, replacing any earlier value
    pub fn charge(mut self, kind: ChargeKind, amount: BigDecimal) -> Self {
        self.draft.charges.set(kind, amount);
        self
    }

    pub fn freight(self, amount: BigDecimal) -> Self {
        self.charge(ChargeKind::Freight, amount)
    }

    /// Build the draft, rejecting negative money fields
    pub fn build(self) -> BillingResult<BillDraft> {
        for (index, article) in self.draft.articles.iter().enumerate() {
            crate::utils::validation::validate_non_negative_amount(
                &format!("articles[{}].amount", index),
                &article.amount,
            )?;
        }
        for (kind, amount) in self.draft.charges.iter() {
            crate::utils::validation::validate_non_negative_amount(
                &format!("charges.{}", kind.field()),
                amount,
            )?;
        }
        Ok(self.draft)
    }
}
