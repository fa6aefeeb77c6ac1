//! Branches, vehicles, drivers, shipments and loading sheets

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{validate_name, validate_record_id, validate_shipment};

/// Which dated document an alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    VehiclePermit,
    VehicleMaintenance,
    DriverLicense,
}

/// A permit, maintenance date or license that is due soon or already past
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAlert {
    pub kind: DocumentKind,
    /// Vehicle or driver id
    pub record_id: String,
    /// Registration number or driver name
    pub label: String,
    pub due: NaiveDate,
    pub expired: bool,
}

/// Manages the operational records bills are raised against
pub struct FleetDesk<S: BillingStorage> {
    pub(crate) storage: S,
}

impl<S: BillingStorage> FleetDesk<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn register_branch(&mut self, branch: Branch) -> BillingResult<Branch> {
        validate_record_id("branch.id", &branch.id)?;
        validate_name("branch.name", &branch.name)?;
        if self.storage.get_branch(&branch.id).await?.is_some() {
            return Err(BillingError::Conflict(format!(
                "Branch '{}' already exists",
                branch.id
            )));
        }

        self.storage.save_branch(&branch).await?;
        info!(branch_id = %branch.id, location = %branch.location, "branch registered");
        Ok(branch)
    }

    pub async fn register_vehicle(&mut self, mut vehicle: Vehicle) -> BillingResult<Vehicle> {
        validate_record_id("vehicle.id", &vehicle.id)?;
        if vehicle.registration_number.trim().is_empty() {
            return Err(BillingError::validation(
                "vehicle.registration_number",
                "Registration number is required",
            ));
        }
        if self.storage.get_vehicle(&vehicle.id).await?.is_some() {
            return Err(BillingError::Conflict(format!(
                "Vehicle '{}' already exists",
                vehicle.id
            )));
        }

        // Pairings are made through assign_driver only.
        vehicle.driver_id = None;
        self.storage.save_vehicle(&vehicle).await?;
        info!(vehicle_id = %vehicle.id, registration = %vehicle.registration_number, "vehicle registered");
        Ok(vehicle)
    }

    pub async fn register_driver(&mut self, mut driver: Driver) -> BillingResult<Driver> {
        validate_record_id("driver.id", &driver.id)?;
        validate_name("driver.name", &driver.name)?;
        if driver.license_number.trim().is_empty() {
            return Err(BillingError::validation(
                "driver.license_number",
                "License number is required",
            ));
        }
        if self.storage.get_driver(&driver.id).await?.is_some() {
            return Err(BillingError::Conflict(format!(
                "Driver '{}' already exists",
                driver.id
            )));
        }

        driver.vehicle_id = None;
        self.storage.save_driver(&driver).await?;
        info!(driver_id = %driver.id, "driver registered");
        Ok(driver)
    }

    pub async fn register_shipment(&mut self, shipment: Shipment) -> BillingResult<Shipment> {
        validate_shipment(&shipment)?;
        if self.storage.get_shipment(&shipment.id).await?.is_some() {
            return Err(BillingError::Conflict(format!(
                "Shipment '{}' already exists",
                shipment.id
            )));
        }
        if let Some(vehicle_id) = &shipment.vehicle_id {
            self.require_vehicle(vehicle_id).await?;
        }

        self.storage.save_shipment(&shipment).await?;
        info!(
            shipment_id = %shipment.id,
            origin = %shipment.origin,
            destination = %shipment.destination,
            "shipment registered"
        );
        Ok(shipment)
    }

    pub async fn list_branches(&self) -> BillingResult<Vec<Branch>> {
        self.storage.list_branches().await
    }

    pub async fn list_vehicles(&self) -> BillingResult<Vec<Vehicle>> {
        self.storage.list_vehicles().await
    }

    pub async fn list_drivers(&self) -> BillingResult<Vec<Driver>> {
        self.storage.list_drivers().await
    }

    pub async fn list_shipments(&self) -> BillingResult<Vec<Shipment>> {
        self.storage.list_shipments().await
    }

    pub async fn get_shipment(&self, shipment_id: &str) -> BillingResult<Option<Shipment>> {
        self.storage.get_shipment(shipment_id).await
    }

    pub async fn get_vehicle(&self, vehicle_id: &str) -> BillingResult<Option<Vehicle>> {
        self.storage.get_vehicle(vehicle_id).await
    }

    pub async fn get_driver(&self, driver_id: &str) -> BillingResult<Option<Driver>> {
        self.storage.get_driver(driver_id).await
    }

    /// Pair a driver with a vehicle, releasing both from any earlier pairing
    pub async fn assign_driver(&mut self, vehicle_id: &str, driver_id: &str) -> BillingResult<()> {
        let mut vehicle = self.require_vehicle(vehicle_id).await?;
        let mut driver = self.require_driver(driver_id).await?;

        if let Some(previous) = vehicle.driver_id.as_deref().filter(|id| *id != driver.id) {
            if let Some(mut old_driver) = self.storage.get_driver(previous).await? {
                old_driver.vehicle_id = None;
                self.storage.update_driver(&old_driver).await?;
            }
        }
        if let Some(previous) = driver.vehicle_id.as_deref().filter(|id| *id != vehicle.id) {
            if let Some(mut old_vehicle) = self.storage.get_vehicle(previous).await? {
                old_vehicle.driver_id = None;
                self.storage.update_vehicle(&old_vehicle).await?;
            }
        }

        vehicle.driver_id = Some(driver.id.clone());
        driver.vehicle_id = Some(vehicle.id.clone());
        self.storage.update_vehicle(&vehicle).await?;
        self.storage.update_driver(&driver).await?;

        info!(vehicle_id = %vehicle.id, driver_id = %driver.id, "driver assigned");
        Ok(())
    }

    /// Remove the vehicle's driver, if any
    pub async fn unassign_driver(&mut self, vehicle_id: &str) -> BillingResult<()> {
        let mut vehicle = self.require_vehicle(vehicle_id).await?;
        let Some(driver_id) = vehicle.driver_id.take() else {
            return Ok(());
        };

        if let Some(mut driver) = self.storage.get_driver(&driver_id).await? {
            driver.vehicle_id = None;
            self.storage.update_driver(&driver).await?;
        }
        self.storage.update_vehicle(&vehicle).await?;

        info!(vehicle_id = %vehicle.id, driver_id = %driver_id, "driver unassigned");
        Ok(())
    }

    pub async fn set_vehicle_status(
        &mut self,
        vehicle_id: &str,
        status: VehicleStatus,
    ) -> BillingResult<Vehicle> {
        let mut vehicle = self.require_vehicle(vehicle_id).await?;
        vehicle.status = status;
        self.storage.update_vehicle(&vehicle).await?;
        Ok(vehicle)
    }

    /// Move a shipment along its lifecycle
    pub async fn update_shipment_status(
        &mut self,
        shipment_id: &str,
        status: ShipmentStatus,
    ) -> BillingResult<Shipment> {
        let mut shipment = self.require_shipment(shipment_id).await?;
        if !shipment.status.can_transition_to(status) {
            return Err(BillingError::Conflict(format!(
                "Shipment '{}' cannot move from {} to {}",
                shipment.id, shipment.status, status
            )));
        }

        let previous = shipment.status;
        shipment.status = status;
        self.storage.update_shipment(&shipment).await?;

        info!(shipment_id = %shipment.id, from = %previous, to = %status, "shipment status changed");
        Ok(shipment)
    }

    /// Load open shipments onto a vehicle at a branch
    pub async fn create_loading_sheet(
        &mut self,
        date: NaiveDate,
        vehicle_id: &str,
        branch_id: &str,
        shipment_ids: &[String],
    ) -> BillingResult<LoadingSheet> {
        if shipment_ids.is_empty() {
            return Err(BillingError::validation(
                "shipment_ids",
                "A loading sheet needs at least one shipment",
            ));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = shipment_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(BillingError::validation(
                "shipment_ids",
                format!("Shipment '{}' is listed twice", duplicate),
            ));
        }

        let vehicle = self.require_vehicle(vehicle_id).await?;
        if vehicle.status == VehicleStatus::Maintenance {
            return Err(BillingError::Conflict(format!(
                "Vehicle '{}' is under maintenance",
                vehicle.id
            )));
        }
        let driver_id = vehicle.driver_id.clone().ok_or_else(|| {
            BillingError::Conflict(format!("Vehicle '{}' has no driver assigned", vehicle.id))
        })?;
        if self.storage.get_branch(branch_id).await?.is_none() {
            return Err(BillingError::not_found("Branch", branch_id));
        }

        let mut shipments = Vec::with_capacity(shipment_ids.len());
        for id in shipment_ids {
            let shipment = self.require_shipment(id).await?;
            if !shipment.status.is_open() {
                return Err(BillingError::Conflict(format!(
                    "Shipment '{}' is {} and cannot be loaded",
                    shipment.id, shipment.status
                )));
            }
            if let Some(sheet) = &shipment.loading_sheet_id {
                return Err(BillingError::Conflict(format!(
                    "Shipment '{}' is already on loading sheet '{}'",
                    shipment.id, sheet
                )));
            }
            shipments.push(shipment);
        }

        let sheet = LoadingSheet {
            id: Uuid::new_v4().to_string(),
            date,
            vehicle_id: vehicle.id.clone(),
            driver_id,
            branch_id: branch_id.to_string(),
            shipment_ids: shipment_ids.to_vec(),
        };
        self.storage.save_loading_sheet(&sheet).await?;

        for mut shipment in shipments {
            if shipment.vehicle_id.as_deref().is_some_and(|v| v != vehicle.id) {
                warn!(shipment_id = %shipment.id, "reassigning shipment to a new vehicle");
            }
            shipment.loading_sheet_id = Some(sheet.id.clone());
            shipment.vehicle_id = Some(vehicle.id.clone());
            self.storage.update_shipment(&shipment).await?;
        }

        info!(
            sheet_id = %sheet.id,
            vehicle_id = %sheet.vehicle_id,
            shipments = sheet.shipment_ids.len(),
            "loading sheet created"
        );
        Ok(sheet)
    }

    pub async fn list_loading_sheets(&self) -> BillingResult<Vec<LoadingSheet>> {
        self.storage.list_loading_sheets().await
    }

    pub async fn get_loading_sheet(&self, sheet_id: &str) -> BillingResult<Option<LoadingSheet>> {
        self.storage.get_loading_sheet(sheet_id).await
    }

    /// Edit a driver's details. The vehicle pairing is kept as stored;
    /// change it with `assign_driver` / `unassign_driver`.
    pub async fn update_driver(&mut self, mut driver: Driver) -> BillingResult<Driver> {
        validate_name("driver.name", &driver.name)?;
        if driver.license_number.trim().is_empty() {
            return Err(BillingError::validation(
                "driver.license_number",
                "License number is required",
            ));
        }
        let stored = self.require_driver(&driver.id).await?;

        driver.vehicle_id = stored.vehicle_id;
        self.storage.update_driver(&driver).await?;
        info!(driver_id = %driver.id, "driver updated");
        Ok(driver)
    }

    /// Edit a vehicle's details, keeping its stored driver pairing
    pub async fn update_vehicle(&mut self, mut vehicle: Vehicle) -> BillingResult<Vehicle> {
        if vehicle.registration_number.trim().is_empty() {
            return Err(BillingError::validation(
                "vehicle.registration_number",
                "Registration number is required",
            ));
        }
        let stored = self.require_vehicle(&vehicle.id).await?;

        vehicle.driver_id = stored.driver_id;
        self.storage.update_vehicle(&vehicle).await?;
        info!(vehicle_id = %vehicle.id, "vehicle updated");
        Ok(vehicle)
    }

    /// Delete a driver who has no vehicle and is not on an active loading sheet
    pub async fn delete_driver(&mut self, driver_id: &str) -> BillingResult<()> {
        let driver = self.require_driver(driver_id).await?;
        self.check_driver_deletable(&driver).await?;

        self.storage.delete_driver(&driver.id).await?;
        info!(driver_id = %driver.id, "driver deleted");
        Ok(())
    }

    /// Delete several drivers. Every driver is checked before any is removed.
    pub async fn delete_drivers(&mut self, driver_ids: &[String]) -> BillingResult<()> {
        let mut drivers = Vec::with_capacity(driver_ids.len());
        for id in driver_ids {
            let driver = self.require_driver(id).await?;
            self.check_driver_deletable(&driver).await?;
            drivers.push(driver);
        }

        for driver in &drivers {
            self.storage.delete_driver(&driver.id).await?;
        }
        info!(count = drivers.len(), "drivers deleted");
        Ok(())
    }

    /// Delete a vehicle with no driver, no open shipments and no active loading sheet
    pub async fn delete_vehicle(&mut self, vehicle_id: &str) -> BillingResult<()> {
        let vehicle = self.require_vehicle(vehicle_id).await?;
        if let Some(driver_id) = &vehicle.driver_id {
            return Err(BillingError::Conflict(format!(
                "Vehicle '{}' is assigned to driver '{}'",
                vehicle.id, driver_id
            )));
        }

        let carrying = self.storage.list_shipments().await?.into_iter().find(|s| {
            s.status.is_open() && s.vehicle_id.as_deref() == Some(vehicle.id.as_str())
        });
        if let Some(shipment) = carrying {
            return Err(BillingError::Conflict(format!(
                "Vehicle '{}' is carrying open shipment '{}'",
                vehicle.id, shipment.id
            )));
        }

        if let Some(sheet) = self
            .find_active_sheet(|sheet| sheet.vehicle_id == vehicle.id)
            .await?
        {
            return Err(BillingError::Conflict(format!(
                "Vehicle '{}' is on active loading sheet '{}'",
                vehicle.id, sheet.id
            )));
        }

        self.storage.delete_vehicle(&vehicle.id).await?;
        info!(vehicle_id = %vehicle.id, "vehicle deleted");
        Ok(())
    }

    /// Delete a branch no active loading sheet was raised at
    pub async fn delete_branch(&mut self, branch_id: &str) -> BillingResult<()> {
        if self.storage.get_branch(branch_id).await?.is_none() {
            return Err(BillingError::not_found("Branch", branch_id));
        }
        if let Some(sheet) = self
            .find_active_sheet(|sheet| sheet.branch_id == branch_id)
            .await?
        {
            return Err(BillingError::Conflict(format!(
                "Branch '{}' has active loading sheet '{}'",
                branch_id, sheet.id
            )));
        }

        self.storage.delete_branch(branch_id).await?;
        info!(branch_id = %branch_id, "branch deleted");
        Ok(())
    }

    async fn check_driver_deletable(&self, driver: &Driver) -> BillingResult<()> {
        if let Some(vehicle_id) = &driver.vehicle_id {
            return Err(BillingError::Conflict(format!(
                "Driver '{}' is assigned to vehicle '{}'",
                driver.id, vehicle_id
            )));
        }
        if let Some(sheet) = self
            .find_active_sheet(|sheet| sheet.driver_id == driver.id)
            .await?
        {
            return Err(BillingError::Conflict(format!(
                "Driver '{}' is on active loading sheet '{}'",
                driver.id, sheet.id
            )));
        }
        Ok(())
    }

    // A sheet is active while any of its shipments is still pending or in transit.
    async fn find_active_sheet(
        &self,
        matches: impl Fn(&LoadingSheet) -> bool,
    ) -> BillingResult<Option<LoadingSheet>> {
        for sheet in self.storage.list_loading_sheets().await? {
            if !matches(&sheet) {
                continue;
            }
            for shipment_id in &sheet.shipment_ids {
                let open = self
                    .storage
                    .get_shipment(shipment_id)
                    .await?
                    .is_some_and(|s| s.status.is_open());
                if open {
                    return Ok(Some(sheet));
                }
            }
        }
        Ok(None)
    }

    /// Permits, maintenance dates and licenses due within `within_days` of
    /// `on`, including those already past. Sorted by due date.
    pub async fn expiring_documents(
        &self,
        on: NaiveDate,
        within_days: u32,
    ) -> BillingResult<Vec<DocumentAlert>> {
        let horizon = on
            .checked_add_days(Days::new(u64::from(within_days)))
            .ok_or_else(|| BillingError::validation("within_days", "Horizon is out of range"))?;

        let mut alerts = Vec::new();
        for vehicle in self.storage.list_vehicles().await? {
            if vehicle.permit_expiry <= horizon {
                alerts.push(DocumentAlert {
                    kind: DocumentKind::VehiclePermit,
                    record_id: vehicle.id.clone(),
                    label: vehicle.registration_number.clone(),
                    due: vehicle.permit_expiry,
                    expired: vehicle.permit_expired(on),
                });
            }
            if vehicle.maintenance_due <= horizon {
                alerts.push(DocumentAlert {
                    kind: DocumentKind::VehicleMaintenance,
                    record_id: vehicle.id.clone(),
                    label: vehicle.registration_number.clone(),
                    due: vehicle.maintenance_due,
                    expired: vehicle.maintenance_overdue(on),
                });
            }
        }
        for driver in self.storage.list_drivers().await? {
            if driver.license_expiry <= horizon {
                alerts.push(DocumentAlert {
                    kind: DocumentKind::DriverLicense,
                    record_id: driver.id.clone(),
                    label: driver.name.clone(),
                    due: driver.license_expiry,
                    expired: driver.license_expired(on),
                });
            }
        }

        alerts.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.record_id.cmp(&b.record_id)));
        Ok(alerts)
    }

    async fn require_vehicle(&self, vehicle_id: &str) -> BillingResult<Vehicle> {
        self.storage
            .get_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Vehicle", vehicle_id))
    }

    async fn require_driver(&self, driver_id: &str) -> BillingResult<Driver> {
        self.storage
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Driver", driver_id))
    }

    async fn require_shipment(&self, shipment_id: &str) -> BillingResult<Shipment> {
        self.storage
            .get_shipment(shipment_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Shipment", shipment_id))
    }
}
