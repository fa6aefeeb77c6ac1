//! Bill lifecycle against a storage backend

use tracing::{debug, info, warn};

use crate::billing::bill::BillDraft;
use crate::billing::filter::BillFilter;
use crate::billing::invoice::{InvoiceCalculator, InvoiceTotals};
use crate::billing::render::InvoiceView;
use crate::config::BillingConfig;
use crate::traits::*;
use crate::types::*;

/// Opens, edits, searches and renders bills
pub struct BillingDesk<S: BillingStorage> {
    pub(crate) storage: S,
    config: BillingConfig,
    calculator: InvoiceCalculator,
    validator: Box<dyn BillValidator>,
}

impl<S: BillingStorage> BillingDesk<S> {
    /// Create a desk with the default configuration
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: BillingConfig::default(),
            calculator: InvoiceCalculator::default(),
            validator: Box::new(DefaultBillValidator),
        }
    }

    /// Create a desk with a custom configuration
    pub fn with_config(storage: S, config: BillingConfig) -> BillingResult<Self> {
        config.validate()?;
        let calculator = InvoiceCalculator::new(config.gst.clone())?;
        Ok(Self {
            storage,
            config,
            calculator,
            validator: Box::new(DefaultBillValidator),
        })
    }

    /// Replace the bill validator
    pub fn with_validator(mut self, validator: Box<dyn BillValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub fn calculator(&self) -> &InvoiceCalculator {
        &self.calculator
    }

    /// Raise a bill for a shipment that has none yet
    pub async fn open_bill(&mut self, shipment_id: &str, draft: BillDraft) -> BillingResult<Bill> {
        let mut shipment = self.require_shipment(shipment_id).await?;
        if let Some(existing) = &shipment.bill_id {
            return Err(BillingError::Conflict(format!(
                "Shipment '{}' is already billed as '{}'",
                shipment.id, existing
            )));
        }

        self.validator.validate_draft(&draft)?;

        let bill_id = self.next_bill_number().await?;
        let bill = draft.finalize(
            bill_id,
            &shipment,
            &self.calculator,
            self.config.payment_terms_days,
        )?;

        self.storage.save_bill(&bill).await?;
        shipment.bill_id = Some(bill.id.clone());
        if let Err(err) = self.storage.update_shipment(&shipment).await {
            if let Err(rollback) = self.storage.delete_bill(&bill.id).await {
                warn!(
                    bill_id = %bill.id,
                    error = %rollback,
                    "could not remove bill after shipment update failed"
                );
            }
            return Err(err);
        }

        info!(
            bill_id = %bill.id,
            shipment_id = %shipment.id,
            regime = ?bill.totals.regime,
            grand_total = %bill.totals.grand_total,
            "bill opened"
        );
        Ok(bill)
    }

    /// Replace a bill's contents and recompute its totals
    pub async fn update_bill(&mut self, bill_id: &str, draft: BillDraft) -> BillingResult<Bill> {
        let mut bill = self.require_bill(bill_id).await?;
        let shipment = self.require_shipment(&bill.shipment_id).await?;

        self.validator.validate_draft(&draft)?;
        draft.apply_to(
            &mut bill,
            &shipment,
            &self.calculator,
            self.config.payment_terms_days,
        )?;
        self.storage.update_bill(&bill).await?;

        info!(
            bill_id = %bill.id,
            grand_total = %bill.totals.grand_total,
            "bill updated"
        );
        Ok(bill)
    }

    pub async fn set_bill_status(
        &mut self,
        bill_id: &str,
        status: BillStatus,
    ) -> BillingResult<Bill> {
        let mut bill = self.require_bill(bill_id).await?;
        let previous = bill.status;
        bill.status = status;
        bill.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_bill(&bill).await?;

        info!(bill_id = %bill.id, from = %previous, to = %status, "bill status changed");
        Ok(bill)
    }

    /// Delete a bill and release its shipment for rebilling
    pub async fn delete_bill(&mut self, bill_id: &str) -> BillingResult<()> {
        let bill = self.require_bill(bill_id).await?;
        self.validator.validate_bill_deletion(&bill)?;

        self.storage.delete_bill(&bill.id).await?;

        match self.storage.get_shipment(&bill.shipment_id).await? {
            Some(mut shipment) if shipment.bill_id.as_deref() == Some(bill.id.as_str()) => {
                shipment.bill_id = None;
                self.storage.update_shipment(&shipment).await?;
            }
            Some(_) => {}
            None => warn!(
                bill_id = %bill.id,
                shipment_id = %bill.shipment_id,
                "deleted bill referenced a missing shipment"
            ),
        }

        info!(bill_id = %bill.id, "bill deleted");
        Ok(())
    }

    pub async fn get_bill(&self, bill_id: &str) -> BillingResult<Option<Bill>> {
        self.storage.get_bill(bill_id).await
    }

    pub async fn list_bills(&self) -> BillingResult<Vec<Bill>> {
        self.storage.list_bills().await
    }

    /// Bills matching the filter, in bill id order
    pub async fn search_bills(&self, filter: &BillFilter) -> BillingResult<Vec<Bill>> {
        let from_branch = self.resolve_branch(filter.from_branch.as_deref()).await?;
        let to_branch = self.resolve_branch(filter.to_branch.as_deref()).await?;

        let mut matched = Vec::new();
        for bill in self.storage.list_bills().await? {
            let Some(shipment) = self.storage.get_shipment(&bill.shipment_id).await? else {
                debug!(bill_id = %bill.id, "skipping bill without shipment");
                continue;
            };
            if filter.matches(&bill, &shipment, from_branch.as_ref(), to_branch.as_ref()) {
                matched.push(bill);
            }
        }

        debug!(matched = matched.len(), "bill search");
        Ok(matched)
    }

    /// Live totals for an unsaved draft
    pub async fn preview_totals(
        &self,
        shipment_id: &str,
        draft: &BillDraft,
    ) -> BillingResult<InvoiceTotals> {
        let shipment = self.require_shipment(shipment_id).await?;
        draft.preview(&self.calculator, &shipment)
    }

    /// Printable invoice for a saved bill
    pub async fn invoice_view(&self, bill_id: &str) -> BillingResult<InvoiceView> {
        let bill = self.require_bill(bill_id).await?;
        let shipment = self.require_shipment(&bill.shipment_id).await?;

        let vehicle = match &shipment.vehicle_id {
            Some(id) => self.storage.get_vehicle(id).await?,
            None => None,
        };
        let driver = match vehicle.as_ref().and_then(|v| v.driver_id.as_ref()) {
            Some(id) => self.storage.get_driver(id).await?,
            None => None,
        };

        Ok(InvoiceView::build(
            &self.config,
            &bill,
            &shipment,
            vehicle.as_ref(),
            driver.as_ref(),
        ))
    }

    // Sequence follows the bill count; skips numbers already taken.
    async fn next_bill_number(&self) -> BillingResult<String> {
        let mut seq = self.storage.list_bills().await?.len() + 1;
        loop {
            let candidate = self.config.bill_number(seq);
            if self.storage.get_bill(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            seq += 1;
        }
    }

    async fn require_bill(&self, bill_id: &str) -> BillingResult<Bill> {
        self.storage
            .get_bill(bill_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Bill", bill_id))
    }

    async fn require_shipment(&self, shipment_id: &str) -> BillingResult<Shipment> {
        self.storage
            .get_shipment(shipment_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Shipment", shipment_id))
    }

    async fn resolve_branch(&self, branch_id: Option<&str>) -> BillingResult<Option<Branch>> {
        match branch_id {
            Some(id) => self
                .storage
                .get_branch(id)
                .await?
                .map(Some)
                .ok_or_else(|| BillingError::not_found("Branch", id)),
            None => Ok(None),
        }
    }
}
