//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

type Table<T> = Arc<RwLock<BTreeMap<String, T>>>;

/// In-memory storage for tests and single-session use.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    branches: Table<Branch>,
    vehicles: Table<Vehicle>,
    drivers: Table<Driver>,
    shipments: Table<Shipment>,
    bills: Table<Bill>,
    loading_sheets: Table<LoadingSheet>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> BillingResult<()> {
        write(&self.branches)?.clear();
        write(&self.vehicles)?.clear();
        write(&self.drivers)?.clear();
        write(&self.shipments)?.clear();
        write(&self.bills)?.clear();
        write(&self.loading_sheets)?.clear();
        Ok(())
    }
}

fn read<T>(table: &Table<T>) -> BillingResult<RwLockReadGuard<'_, BTreeMap<String, T>>> {
    table
        .read()
        .map_err(|_| BillingError::Storage("storage lock poisoned".to_string()))
}

fn write<T>(table: &Table<T>) -> BillingResult<RwLockWriteGuard<'_, BTreeMap<String, T>>> {
    table
        .write()
        .map_err(|_| BillingError::Storage("storage lock poisoned".to_string()))
}

fn insert<T: Clone>(table: &Table<T>, id: &str, record: &T) -> BillingResult<()> {
    write(table)?.insert(id.to_string(), record.clone());
    Ok(())
}

fn get<T: Clone>(table: &Table<T>, id: &str) -> BillingResult<Option<T>> {
    Ok(read(table)?.get(id).cloned())
}

fn list<T: Clone>(table: &Table<T>) -> BillingResult<Vec<T>> {
    Ok(read(table)?.values().cloned().collect())
}

fn replace<T: Clone>(
    table: &Table<T>,
    entity: &'static str,
    id: &str,
    record: &T,
) -> BillingResult<()> {
    let mut guard = write(table)?;
    match guard.get_mut(id) {
        Some(slot) => {
            *slot = record.clone();
            Ok(())
        }
        None => Err(BillingError::not_found(entity, id)),
    }
}

fn remove<T>(table: &Table<T>, entity: &'static str, id: &str) -> BillingResult<()> {
    if write(table)?.remove(id).is_some() {
        Ok(())
    } else {
        Err(BillingError::not_found(entity, id))
    }
}

#[async_trait]
impl BillingStorage for MemoryStorage {
    async fn save_branch(&mut self, branch: &Branch) -> BillingResult<()> {
        insert(&self.branches, &branch.id, branch)
    }

    async fn get_branch(&self, branch_id: &str) -> BillingResult<Option<Branch>> {
        get(&self.branches, branch_id)
    }

    async fn list_branches(&self) -> BillingResult<Vec<Branch>> {
        list(&self.branches)
    }

    async fn delete_branch(&mut self, branch_id: &str) -> BillingResult<()> {
        remove(&self.branches, "Branch", branch_id)
    }

    async fn save_vehicle(&mut self, vehicle: &Vehicle) -> BillingResult<()> {
        insert(&self.vehicles, &vehicle.id, vehicle)
    }

    async fn get_vehicle(&self, vehicle_id: &str) -> BillingResult<Option<Vehicle>> {
        get(&self.vehicles, vehicle_id)
    }

    async fn list_vehicles(&self) -> BillingResult<Vec<Vehicle>> {
        list(&self.vehicles)
    }

    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> BillingResult<()> {
        replace(&self.vehicles, "Vehicle", &vehicle.id, vehicle)
    }

    async fn delete_vehicle(&mut self, vehicle_id: &str) -> BillingResult<()> {
        remove(&self.vehicles, "Vehicle", vehicle_id)
    }

    async fn save_driver(&mut self, driver: &Driver) -> BillingResult<()> {
        insert(&self.drivers, &driver.id, driver)
    }

    async fn get_driver(&self, driver_id: &str) -> BillingResult<Option<Driver>> {
        get(&self.drivers, driver_id)
    }

    async fn list_drivers(&self) -> BillingResult<Vec<Driver>> {
        list(&self.drivers)
    }

    async fn update_driver(&mut self, driver: &Driver) -> BillingResult<()> {
        replace(&self.drivers, "Driver", &driver.id, driver)
    }

    async fn delete_driver(&mut self, driver_id: &str) -> BillingResult<()> {
        remove(&self.drivers, "Driver", driver_id)
    }

    async fn save_shipment(&mut self, shipment: &Shipment) -> BillingResult<()> {
        insert(&self.shipments, &shipment.id, shipment)
    }

    async fn get_shipment(&self, shipment_id: &str) -> BillingResult<Option<Shipment>> {
        get(&self.shipments, shipment_id)
    }

    async fn list_shipments(&self) -> BillingResult<Vec<Shipment>> {
        list(&self.shipments)
    }

    async fn update_shipment(&mut self, shipment: &Shipment) -> BillingResult<()> {
        replace(&self.shipments, "Shipment", &shipment.id, shipment)
    }

    async fn save_bill(&mut self, bill: &Bill) -> BillingResult<()> {
        insert(&self.bills, &bill.id, bill)
    }

    async fn get_bill(&self, bill_id: &str) -> BillingResult<Option<Bill>> {
        get(&self.bills, bill_id)
    }

    async fn list_bills(&self) -> BillingResult<Vec<Bill>> {
        list(&self.bills)
    }

    async fn update_bill(&mut self, bill: &Bill) -> BillingResult<()> {
        replace(&self.bills, "Bill", &bill.id, bill)
    }

    async fn delete_bill(&mut self, bill_id: &str) -> BillingResult<()> {
        remove(&self.bills, "Bill", bill_id)
    }

    async fn save_loading_sheet(&mut self, sheet: &LoadingSheet) -> BillingResult<()> {
        insert(&self.loading_sheets, &sheet.id, sheet)
    }

    async fn get_loading_sheet(&self, sheet_id: &str) -> BillingResult<Option<LoadingSheet>> {
        get(&self.loading_sheets, sheet_id)
    }

    async fn list_loading_sheets(&self) -> BillingResult<Vec<LoadingSheet>> {
        list(&self.loading_sheets)
    }
}
