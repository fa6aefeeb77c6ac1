//! Bill list filtering

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Criteria for the bill list. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillFilter {
    /// Case-insensitive match on bill id, consignor name or consignee name
    pub search: Option<String>,
    /// Branch id the shipment must start from
    pub from_branch: Option<String>,
    /// Branch id the shipment must be headed to
    pub to_branch: Option<String>,
    /// Inclusive bounds on the grand total
    pub amount_min: Option<BigDecimal>,
    pub amount_max: Option<BigDecimal>,
    /// Inclusive bounds on the bill date
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<BillStatus>,
    pub charge_status: Option<ChargeStatus>,
}

impl BillFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn route(mut self, from_branch: Option<String>, to_branch: Option<String>) -> Self {
        self.from_branch = from_branch;
        self.to_branch = to_branch;
        self
    }

    pub fn amount_between(mut self, min: Option<BigDecimal>, max: Option<BigDecimal>) -> Self {
        self.amount_min = min;
        self.amount_max = max;
        self
    }

    pub fn dated_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn status(mut self, status: BillStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn charge_status(mut self, status: ChargeStatus) -> Self {
        self.charge_status = Some(status);
        self
    }

    /// Whether any criterion is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check a bill and its shipment against the filter.
    ///
    /// `from_branch` and `to_branch` are the branches already resolved from
    /// the ids in the filter; a branch matches when its location is the
    /// shipment's origin or destination.
    pub fn matches(
        &self,
        bill: &Bill,
        shipment: &Shipment,
        from_branch: Option<&Branch>,
        to_branch: Option<&Branch>,
    ) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = bill.id.to_lowercase().contains(&term)
                || shipment.consignor.name.to_lowercase().contains(&term)
                || shipment.consignee.name.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if let Some(branch) = from_branch {
            if !same_place(&branch.location, &shipment.origin) {
                return false;
            }
        }
        if let Some(branch) = to_branch {
            if !same_place(&branch.location, &shipment.destination) {
                return false;
            }
        }

        let total = bill.grand_total();
        if let Some(min) = &self.amount_min {
            if total < min {
                return false;
            }
        }
        if let Some(max) = &self.amount_max {
            if total > max {
                return false;
            }
        }

        if let Some(from) = self.date_from {
            if bill.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if bill.date > to {
                return false;
            }
        }

        if let Some(status) = self.status {
            if bill.status != status {
                return false;
            }
        }
        if let Some(charge_status) = self.charge_status {
            if bill.charge_status != charge_status {
                return false;
            }
        }

        true
    }
}

fn same_place(a: &Location, b: &Location) -> bool {
    a.city.trim().eq_ignore_ascii_case(b.city.trim()) && a.same_state(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::bill::BillBuilder;
    use crate::billing::invoice::InvoiceCalculator;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> (Bill, Shipment) {
        let shipment = Shipment::new(
            "LRN2025001".to_string(),
            date(2025, 7, 15),
            Location::parse("Mumbai, Maharashtra").unwrap(),
            Location::parse("New Delhi, Delhi").unwrap(),
            Customer::new("ABC Textiles", "123 Textile Market, Mumbai"),
            Customer::new("XYZ Retail", "456 Karol Bagh, New Delhi"),
            50,
            BigDecimal::from(5000),
            BigDecimal::from(800000),
        );
        let mut bill = BillBuilder::new(date(2025, 7, 16))
            .gst_paid_by(GstLiableParty::Consignee)
            .freight(BigDecimal::from(50000))
            .build()
            .unwrap()
            .finalize("BILL001".to_string(), &shipment, &InvoiceCalculator::default(), 30)
            .unwrap();
        bill.status = BillStatus::Paid;
        bill.charge_status = ChargeStatus::Paid;
        (bill, shipment)
    }

    fn branch(id: &str, location: &str) -> Branch {
        Branch {
            id: id.to_string(),
            name: id.to_string(),
            location: Location::parse(location).unwrap(),
            pincode: "000000".to_string(),
            branch_type: BranchType::DeliveryAndPickup,
            contact: String::new(),
        }
    }

    #[test]
    fn test_empty_filter_matches() {
        let (bill, shipment) = fixture();
        let filter = BillFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&bill, &shipment, None, None));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let (bill, shipment) = fixture();
        assert!(BillFilter::new().search("xyz").matches(&bill, &shipment, None, None));
        assert!(BillFilter::new().search("bill00").matches(&bill, &shipment, None, None));
        assert!(!BillFilter::new().search("pharma").matches(&bill, &shipment, None, None));
    }

    #[test]
    fn test_route_filter() {
        let (bill, shipment) = fixture();
        let mumbai = branch("B001", "Mumbai, Maharashtra");
        let delhi = branch("B002", "New Delhi, Delhi");
        let filter = BillFilter::new().route(Some("B001".into()), Some("B002".into()));

        assert!(filter.matches(&bill, &shipment, Some(&mumbai), Some(&delhi)));
        assert!(!filter.matches(&bill, &shipment, Some(&delhi), Some(&mumbai)));
    }

    #[test]
    fn test_amount_and_date_bounds_are_inclusive() {
        let (bill, shipment) = fixture();
        let exact = BillFilter::new()
            .amount_between(Some(BigDecimal::from(59000)), Some(BigDecimal::from(59000)))
            .dated_between(Some(date(2025, 7, 16)), Some(date(2025, 7, 16)));
        assert!(exact.matches(&bill, &shipment, None, None));

        let too_high = BillFilter::new().amount_between(Some(BigDecimal::from(59001)), None);
        assert!(!too_high.matches(&bill, &shipment, None, None));

        let too_early = BillFilter::new().dated_between(None, Some(date(2025, 7, 15)));
        assert!(!too_early.matches(&bill, &shipment, None, None));
    }

    #[test]
    fn test_status_filters() {
        let (bill, shipment) = fixture();
        assert!(BillFilter::new()
            .status(BillStatus::Paid)
            .charge_status(ChargeStatus::Paid)
            .matches(&bill, &shipment, None, None));
        assert!(!BillFilter::new()
            .status(BillStatus::Overdue)
            .matches(&bill, &shipment, None, None));
        assert!(!BillFilter::new()
            .charge_status(ChargeStatus::Tbb)
            .matches(&bill, &shipment, None, None));
    }
}
