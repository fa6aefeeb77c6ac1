//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::billing::bill::BillDraft;
use crate::types::*;

/// Storage abstraction for the back office.
///
/// `save_*` inserts or replaces. `update_*` and `delete_*` fail with
/// `BillingError::NotFound` when the record does not exist. List methods
/// return records ordered by id.
#[async_trait]
pub trait BillingStorage: Send + Sync {
    /// Save a branch
    async fn save_branch(&mut self, branch: &Branch) -> BillingResult<()>;
    /// Get a branch by code
    async fn get_branch(&self, branch_id: &str) -> BillingResult<Option<Branch>>;
    /// List all branches
    async fn list_branches(&self) -> BillingResult<Vec<Branch>>;
    /// Delete a branch
    async fn delete_branch(&mut self, branch_id: &str) -> BillingResult<()>;

    /// Save a vehicle
    async fn save_vehicle(&mut self, vehicle: &Vehicle) -> BillingResult<()>;
    /// Get a vehicle by id
    async fn get_vehicle(&self, vehicle_id: &str) -> BillingResult<Option<Vehicle>>;
    /// List all vehicles
    async fn list_vehicles(&self) -> BillingResult<Vec<Vehicle>>;
    /// Update an existing vehicle
    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> BillingResult<()>;
    /// Delete a vehicle
    async fn delete_vehicle(&mut self, vehicle_id: &str) -> BillingResult<()>;

    /// Save a driver
    async fn save_driver(&mut self, driver: &Driver) -> BillingResult<()>;
    /// Get a driver by id
    async fn get_driver(&self, driver_id: &str) -> BillingResult<Option<Driver>>;
    /// List all drivers
    async fn list_drivers(&self) -> BillingResult<Vec<Driver>>;
    /// Update an existing driver
    async fn update_driver(&mut self, driver: &Driver) -> BillingResult<()>;
    /// Delete a driver
    async fn delete_driver(&mut self, driver_id: &str) -> BillingResult<()>;

    /// Save a shipment
    async fn save_shipment(&mut self, shipment: &Shipment) -> BillingResult<()>;
    /// Get a shipment by lorry receipt number
    async fn get_shipment(&self, shipment_id: &str) -> BillingResult<Option<Shipment>>;
    /// List all shipments
    async fn list_shipments(&self) -> BillingResult<Vec<Shipment>>;
    /// Update an existing shipment
    async fn update_shipment(&mut self, shipment: &Shipment) -> BillingResult<()>;

    /// Save a bill
    async fn save_bill(&mut self, bill: &Bill) -> BillingResult<()>;
    /// Get a bill by id
    async fn get_bill(&self, bill_id: &str) -> BillingResult<Option<Bill>>;
    /// List all bills
    async fn list_bills(&self) -> BillingResult<Vec<Bill>>;
    /// Update an existing bill
    async fn update_bill(&mut self, bill: &Bill) -> BillingResult<()>;
    /// Delete a bill
    async fn delete_bill(&mut self, bill_id: &str) -> BillingResult<()>;

    /// Save a loading sheet
    async fn save_loading_sheet(&mut self, sheet: &LoadingSheet) -> BillingResult<()>;
    /// Get a loading sheet by id
    async fn get_loading_sheet(&self, sheet_id: &str) -> BillingResult<Option<LoadingSheet>>;
    /// List all loading sheets
    async fn list_loading_sheets(&self) -> BillingResult<Vec<LoadingSheet>>;
}

/// Rules a bill must satisfy before it is saved or removed
pub trait BillValidator: Send + Sync {
    /// Validate draft contents before totals are fixed
    fn validate_draft(&self, draft: &BillDraft) -> BillingResult<()>;

    /// Validate that a bill may be deleted
    fn validate_bill_deletion(&self, bill: &Bill) -> BillingResult<()>;
}

/// Default rules: at least one article, each with a quantity
pub struct DefaultBillValidator;

impl BillValidator for DefaultBillValidator {
    fn validate_draft(&self, draft: &BillDraft) -> BillingResult<()> {
        if draft.articles.is_empty() {
            return Err(BillingError::validation(
                "articles",
                "A bill needs at least one article",
            ));
        }

        for (index, article) in draft.articles.iter().enumerate() {
            if article.quantity == 0 {
                return Err(BillingError::validation(
                    format!("articles[{}].quantity", index),
                    "Quantity is required",
                ));
            }
        }

        Ok(())
    }

    fn validate_bill_deletion(&self, _bill: &Bill) -> BillingResult<()> {
        Ok(())
    }
}
