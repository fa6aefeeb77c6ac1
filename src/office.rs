//! Back office orchestrator that coordinates billing and fleet operations

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::billing::core::BillingDesk;
use crate::config::BillingConfig;
use crate::fleet::FleetDesk;
use crate::traits::*;
use crate::types::*;

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Sum of grand totals over all bills
    pub billed: BigDecimal,
    /// Sum over paid bills
    pub collected: BigDecimal,
    /// Sum over unpaid and overdue bills
    pub outstanding: BigDecimal,
    /// Unpaid bills whose due date has passed
    pub past_due_bills: usize,
    pub shipments: usize,
    pub in_transit: usize,
    pub vehicles_on_road: usize,
    pub vehicles_total: usize,
    pub drivers_without_vehicle: usize,
}

/// Billing and fleet desks sharing one storage backend
pub struct BackOffice<S: BillingStorage> {
    billing: BillingDesk<S>,
    fleet: FleetDesk<S>,
}

impl<S: BillingStorage + Clone> BackOffice<S> {
    /// Create a back office with the default configuration
    pub fn new(storage: S) -> Self {
        Self {
            billing: BillingDesk::new(storage.clone()),
            fleet: FleetDesk::new(storage),
        }
    }

    /// Create a back office with a custom billing configuration and validator
    pub fn with_config(
        storage: S,
        config: BillingConfig,
        validator: Box<dyn BillValidator>,
    ) -> BillingResult<Self> {
        Ok(Self {
            billing: BillingDesk::with_config(storage.clone(), config)?.with_validator(validator),
            fleet: FleetDesk::new(storage),
        })
    }

    pub fn billing(&self) -> &BillingDesk<S> {
        &self.billing
    }

    pub fn billing_mut(&mut self) -> &mut BillingDesk<S> {
        &mut self.billing
    }

    pub fn fleet(&self) -> &FleetDesk<S> {
        &self.fleet
    }

    pub fn fleet_mut(&mut self) -> &mut FleetDesk<S> {
        &mut self.fleet
    }

    /// Revenue, collection and fleet counts as of `on`
    pub async fn dashboard_summary(&self, on: NaiveDate) -> BillingResult<DashboardSummary> {
        let bills = self.billing.list_bills().await?;
        let shipments = self.fleet.list_shipments().await?;
        let vehicles = self.fleet.list_vehicles().await?;
        let drivers = self.fleet.list_drivers().await?;

        let billed: BigDecimal = bills.iter().map(|b| b.grand_total()).sum();
        let collected: BigDecimal = bills
            .iter()
            .filter(|b| b.status == BillStatus::Paid)
            .map(|b| b.grand_total())
            .sum();
        let outstanding: BigDecimal = bills
            .iter()
            .filter(|b| b.status.is_outstanding())
            .map(|b| b.grand_total())
            .sum();

        Ok(DashboardSummary {
            billed,
            collected,
            outstanding,
            past_due_bills: bills.iter().filter(|b| b.is_past_due(on)).count(),
            shipments: shipments.len(),
            in_transit: shipments
                .iter()
                .filter(|s| s.status == ShipmentStatus::InTransit)
                .count(),
            vehicles_on_road: vehicles
                .iter()
                .filter(|v| v.status == VehicleStatus::OnRoad)
                .count(),
            vehicles_total: vehicles.len(),
            drivers_without_vehicle: drivers.iter().filter(|d| d.vehicle_id.is_none()).count(),
        })
    }
}
