//! Core types and data structures for the freight back office

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::billing::invoice::InvoiceTotals;
use crate::tax::gst::GstError;

/// A place on the network, identified by city and state.
///
/// The state decides GST jurisdiction, so it is kept as its own field
/// rather than being recovered from a display string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
}

impl Location {
    /// Create a location, rejecting blank city or state
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> BillingResult<Self> {
        let city: String = city.into();
        let state: String = state.into();
        let city = city.trim().to_string();
        let state = state.trim().to_string();

        if city.is_empty() {
            return Err(BillingError::validation("location.city", "City cannot be empty"));
        }
        if state.is_empty() {
            return Err(BillingError::validation(
                "location.state",
                "State cannot be empty",
            ));
        }

        Ok(Self { city, state })
    }

    /// Parse a legacy `"<city>, <state>"` string.
    ///
    /// Exactly one `", "` separator is accepted. Anything else is an error;
    /// an unparseable address never falls back to a default jurisdiction.
    pub fn parse(raw: &str) -> BillingResult<Self> {
        let parts: Vec<&str> = raw.split(", ").collect();
        if parts.len() != 2 {
            return Err(BillingError::validation(
                "location",
                format!("Expected \"<city>, <state>\", got \"{}\"", raw),
            ));
        }
        Self::new(parts[0], parts[1])
    }

    /// Whether both locations fall in the same state.
    ///
    /// Fields are public and may come from storage, so padding is ignored here
    /// as well as in `new`.
    pub fn same_state(&self, other: &Location) -> bool {
        self.state.trim().eq_ignore_ascii_case(other.state.trim())
    }
}

impl FromStr for Location {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.state)
    }
}

/// Sender or receiver on a consignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub address: String,
    /// GSTIN, when the party is registered
    pub gstin: Option<String>,
    pub phone: Option<String>,
}

impl Customer {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            gstin: None,
            phone: None,
        }
    }

    pub fn with_gstin(mut self, gstin: impl Into<String>) -> Self {
        self.gstin = Some(gstin.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Services offered at a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchType {
    #[serde(rename = "Delivery & Pickup")]
    DeliveryAndPickup,
    #[serde(rename = "Delivery Only")]
    DeliveryOnly,
}

/// Company branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub location: Location,
    pub pincode: String,
    pub branch_type: BranchType,
    pub contact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "20ft Container")]
    Container20Ft,
    #[serde(rename = "40ft Container")]
    Container40Ft,
    #[serde(rename = "Open Body")]
    OpenBody,
    Tanker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleStatus {
    #[serde(rename = "On Road")]
    OnRoad,
    Available,
    Maintenance,
}

/// Truck in the fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub registration_number: String,
    pub model: String,
    pub vehicle_type: VehicleType,
    pub driver_id: Option<String>,
    pub status: VehicleStatus,
    pub permit_expiry: NaiveDate,
    pub maintenance_due: NaiveDate,
}

impl Vehicle {
    /// Permit is no longer valid on the given day
    pub fn permit_expired(&self, on: NaiveDate) -> bool {
        self.permit_expiry < on
    }

    /// Scheduled maintenance date has passed
    pub fn maintenance_overdue(&self, on: NaiveDate) -> bool {
        self.maintenance_due < on
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    pub vehicle_id: Option<String>,
    pub salary: BigDecimal,
}

impl Driver {
    pub fn license_expired(&self, on: NaiveDate) -> bool {
        self.license_expiry < on
    }
}

/// Consignment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    Pending,
    #[serde(rename = "In Transit")]
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    /// Pending -> In Transit -> Delivered, with cancellation allowed until delivery
    pub fn can_transition_to(self, next: ShipmentStatus) -> bool {
        use ShipmentStatus::*;
        matches!(
            (self, next),
            (Pending, InTransit) | (InTransit, Delivered) | (Pending, Cancelled) | (InTransit, Cancelled)
        )
    }

    /// Still moving through the network
    pub fn is_open(self) -> bool {
        matches!(self, ShipmentStatus::Pending | ShipmentStatus::InTransit)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// Consignment note, keyed by LR number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// LR number
    pub id: String,
    pub date: NaiveDate,
    pub origin: Location,
    pub destination: Location,
    pub consignor: Customer,
    pub consignee: Customer,
    pub packages: u32,
    /// Gross weight in kilograms
    pub weight: BigDecimal,
    /// Declared goods value
    pub value: BigDecimal,
    pub status: ShipmentStatus,
    pub vehicle_id: Option<String>,
    pub bill_id: Option<String>,
    pub loading_sheet_id: Option<String>,
}

impl Shipment {
    /// Create a pending shipment with no vehicle, bill or loading sheet
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        date: NaiveDate,
        origin: Location,
        destination: Location,
        consignor: Customer,
        consignee: Customer,
        packages: u32,
        weight: BigDecimal,
        value: BigDecimal,
    ) -> Self {
        Self {
            id,
            date,
            origin,
            destination,
            consignor,
            consignee,
            packages,
            weight,
            value,
            status: ShipmentStatus::Pending,
            vehicle_id: None,
            bill_id: None,
            loading_sheet_id: None,
        }
    }

    pub fn is_intra_state(&self) -> bool {
        self.origin.same_state(&self.destination)
    }
}

/// One article row on a bill. `amount` is the flat line total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub quantity: u32,
    pub package_type: String,
    pub details: String,
    pub amount: BigDecimal,
}

impl Article {
    pub fn new(
        quantity: u32,
        package_type: impl Into<String>,
        details: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            quantity,
            package_type: package_type.into(),
            details: details.into(),
            amount,
        }
    }
}

/// Named charge heads on a freight bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargeKind {
    Freight,
    Surcharge,
    Hamali,
    DoorDelivery,
    Other,
}

impl ChargeKind {
    pub const ALL: [ChargeKind; 5] = [
        ChargeKind::Freight,
        ChargeKind::Surcharge,
        ChargeKind::Hamali,
        ChargeKind::DoorDelivery,
        ChargeKind::Other,
    ];

    /// Row label on a printed invoice
    pub fn label(self) -> &'static str {
        match self {
            ChargeKind::Freight => "Freight Charges",
            ChargeKind::Surcharge => "Surcharge",
            ChargeKind::Hamali => "Hamali Charges",
            ChargeKind::DoorDelivery => "Door Delivery",
            ChargeKind::Other => "Other Charges",
        }
    }

    /// Field name used in validation errors
    pub fn field(self) -> &'static str {
        match self {
            ChargeKind::Freight => "freight",
            ChargeKind::Surcharge => "surcharge",
            ChargeKind::Hamali => "hamali",
            ChargeKind::DoorDelivery => "door_delivery",
            ChargeKind::Other => "other",
        }
    }
}

/// Charges billed on top of the articles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeSet {
    pub freight: BigDecimal,
    pub surcharge: BigDecimal,
    pub hamali: BigDecimal,
    pub door_delivery: BigDecimal,
    pub other: BigDecimal,
}

impl ChargeSet {
    /// Charge set with only freight filled in
    pub fn freight_only(freight: BigDecimal) -> Self {
        Self {
            freight,
            ..Self::default()
        }
    }

    pub fn get(&self, kind: ChargeKind) -> &BigDecimal {
        match kind {
            ChargeKind::Freight => &self.freight,
            ChargeKind::Surcharge => &self.surcharge,
            ChargeKind::Hamali => &self.hamali,
            ChargeKind::DoorDelivery => &self.door_delivery,
            ChargeKind::Other => &self.other,
        }
    }

    pub fn set(&mut self, kind: ChargeKind, amount: BigDecimal) {
        match kind {
            ChargeKind::Freight => self.freight = amount,
            ChargeKind::Surcharge => self.surcharge = amount,
            ChargeKind::Hamali => self.hamali = amount,
            ChargeKind::DoorDelivery => self.door_delivery = amount,
            ChargeKind::Other => self.other = amount,
        }
    }

    /// All five heads in invoice order
    pub fn iter(&self) -> impl Iterator<Item = (ChargeKind, &BigDecimal)> {
        ChargeKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn total(&self) -> BigDecimal {
        self.iter().map(|(_, amount)| amount).sum()
    }
}

/// Party that bears GST on the consignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GstLiableParty {
    Consignor,
    Consignee,
    /// Transporter pays under forward charge
    Transport,
}

/// Payment state of a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillStatus {
    Paid,
    Unpaid,
    Overdue,
}

impl BillStatus {
    /// Money still to be collected
    pub fn is_outstanding(self) -> bool {
        matches!(self, BillStatus::Unpaid | BillStatus::Overdue)
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillStatus::Paid => "Paid",
            BillStatus::Unpaid => "Unpaid",
            BillStatus::Overdue => "Overdue",
        };
        f.write_str(label)
    }
}

/// Who settles the freight charges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargeStatus {
    Paid,
    #[serde(rename = "To Pay")]
    ToPay,
    /// To be billed
    #[serde(rename = "TBB")]
    Tbb,
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChargeStatus::Paid => "Paid",
            ChargeStatus::ToPay => "To Pay",
            ChargeStatus::Tbb => "TBB",
        };
        f.write_str(label)
    }
}

/// Freight bill raised against a shipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub shipment_id: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    pub charge_status: ChargeStatus,
    pub gst_paid_by: GstLiableParty,
    pub articles: Vec<Article>,
    pub charges: ChargeSet,
    /// Totals as computed when the bill was last saved
    pub totals: InvoiceTotals,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Bill {
    pub fn grand_total(&self) -> &BigDecimal {
        &self.totals.grand_total
    }

    /// Sum of article quantities
    pub fn total_quantity(&self) -> u64 {
        self.articles.iter().map(|a| u64::from(a.quantity)).sum()
    }

    /// Past due and not paid
    pub fn is_past_due(&self, on: NaiveDate) -> bool {
        self.status != BillStatus::Paid && self.due_date < on
    }
}

/// Trip manifest: shipments loaded onto one vehicle at a branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingSheet {
    pub id: String,
    pub date: NaiveDate,
    pub vehicle_id: String,
    pub driver_id: String,
    pub branch_id: String,
    pub shipment_ids: Vec<String>,
}

/// Errors raised by the billing and fleet operations
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Gst(#[from] GstError),
}

impl BillingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        BillingError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Field name for validation errors, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            BillingError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for billing operations
pub type BillingResult<T> = Result<T, BillingError>;
