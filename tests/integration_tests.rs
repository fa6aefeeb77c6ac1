//! Integration tests for freight-billing

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use freight_billing::{
    compute_invoice_totals_from_addresses, utils::EnhancedBillValidator, utils::MemoryStorage,
    Article, ArticleInput, BackOffice, BillBuilder, BillDraft, BillFilter, BillStatus,
    BillingConfig, BillingError, Branch, BranchType, ChargeSet, ChargeStatus, ChargesInput,
    Customer, Driver, GstLiableParty, GstRegime, Location, Shipment, ShipmentStatus, Vehicle,
    VehicleStatus, VehicleType,
};
use std::str::FromStr;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn branch(id: &str, name: &str, location: &str, pincode: &str) -> Branch {
    Branch {
        id: id.to_string(),
        name: name.to_string(),
        location: Location::parse(location).unwrap(),
        pincode: pincode.to_string(),
        branch_type: BranchType::DeliveryAndPickup,
        contact: "022-23456789".to_string(),
    }
}

fn vehicle(id: &str, registration: &str, status: VehicleStatus) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        registration_number: registration.to_string(),
        model: "Tata Prima".to_string(),
        vehicle_type: VehicleType::Container20Ft,
        driver_id: None,
        status,
        permit_expiry: date(2026, 3, 31),
        maintenance_due: date(2025, 9, 10),
    }
}

fn driver(id: &str, name: &str, license_expiry: NaiveDate) -> Driver {
    Driver {
        id: id.to_string(),
        name: name.to_string(),
        phone: "9876543210".to_string(),
        license_number: format!("DL14{}", id),
        license_expiry,
        vehicle_id: None,
        salary: BigDecimal::from(35000),
    }
}

#[allow(clippy::too_many_arguments)]
fn shipment(
    id: &str,
    on: NaiveDate,
    origin: &str,
    destination: &str,
    consignor: Customer,
    consignee: Customer,
    packages: u32,
    weight: i64,
) -> Shipment {
    Shipment::new(
        id.to_string(),
        on,
        Location::parse(origin).unwrap(),
        Location::parse(destination).unwrap(),
        consignor,
        consignee,
        packages,
        BigDecimal::from(weight),
        BigDecimal::from(500000),
    )
}

/// Back office loaded with three branches, two trucks and three shipments
async fn seeded_office() -> BackOffice<MemoryStorage> {
    let mut office = BackOffice::new(MemoryStorage::new());
    let fleet = office.fleet_mut();

    fleet
        .register_branch(branch("B001", "Mumbai Central", "Mumbai, Maharashtra", "400001"))
        .await
        .unwrap();
    fleet
        .register_branch(branch("B002", "Delhi Hub", "New Delhi, Delhi", "110001"))
        .await
        .unwrap();
    fleet
        .register_branch(branch("B006", "Pune Hub", "Pune, Maharashtra", "411001"))
        .await
        .unwrap();

    fleet
        .register_vehicle(vehicle("V001", "MH 01 AB 1234", VehicleStatus::OnRoad))
        .await
        .unwrap();
    fleet
        .register_vehicle(vehicle("V002", "DL 1C CD 5678", VehicleStatus::Available))
        .await
        .unwrap();
    fleet
        .register_driver(driver("D01", "Ramesh Kumar", date(2028, 10, 15)))
        .await
        .unwrap();
    fleet
        .register_driver(driver("D02", "Suresh Singh", date(2025, 8, 1)))
        .await
        .unwrap();
    fleet.assign_driver("V001", "D01").await.unwrap();

    fleet
        .register_shipment(shipment(
            "LRN2025001",
            date(2025, 7, 15),
            "Mumbai, Maharashtra",
            "New Delhi, Delhi",
            Customer::new("ABC Textiles", "123 Textile Market, Mumbai")
                .with_gstin("27AAAAA0000A1Z5")
                .with_phone("9811111111"),
            Customer::new("XYZ Retail", "456 Karol Bagh, New Delhi")
                .with_gstin("07BBBBB0000B1Z5"),
            50,
            5000,
        ))
        .await
        .unwrap();
    fleet
        .register_shipment(shipment(
            "LRN2025003",
            date(2025, 7, 20),
            "Pune, Maharashtra",
            "Mumbai, Maharashtra",
            Customer::new("Pharma Co", "321 MIDC, Mumbai"),
            Customer::new("HealthCare Ltd", "654 Hinjewadi, Pune"),
            100,
            1000,
        ))
        .await
        .unwrap();
    fleet
        .register_shipment(shipment(
            "LRN2025005",
            date(2025, 7, 22),
            "New Delhi, Delhi",
            "Jaipur, Rajasthan",
            Customer::new("Crafts Emporium", "777 Dilli Haat, New Delhi"),
            Customer::new("Rajasthali", "888 MI Road, Jaipur"),
            150,
            1500,
        ))
        .await
        .unwrap();

    office
}

/// Bills for the three seeded shipments, with their usual statuses
async fn bill_everything(office: &mut BackOffice<MemoryStorage>) {
    let billing = office.billing_mut();

    let textiles = BillBuilder::new(date(2025, 7, 16))
        .gst_paid_by(GstLiableParty::Consignee)
        .charge_status(ChargeStatus::Paid)
        .article(50, "Bale", "Cotton Bales", BigDecimal::from(0))
        .freight(BigDecimal::from(50000))
        .build()
        .unwrap();
    let bill = billing.open_bill("LRN2025001", textiles).await.unwrap();
    assert_eq!(bill.id, "BILL001");

    let crafts = BillBuilder::new(date(2025, 7, 23))
        .article(150, "Box", "Handicrafts", BigDecimal::from(0))
        .freight(BigDecimal::from(20000))
        .build()
        .unwrap();
    let bill = billing.open_bill("LRN2025005", crafts).await.unwrap();
    assert_eq!(bill.id, "BILL002");

    let pharma = BillBuilder::new(date(2025, 7, 21))
        .charge_status(ChargeStatus::Tbb)
        .article(100, "Carton", "Medicines", BigDecimal::from(0))
        .freight(BigDecimal::from(15000))
        .build()
        .unwrap();
    let bill = billing.open_bill("LRN2025003", pharma).await.unwrap();
    assert_eq!(bill.id, "BILL003");

    billing
        .set_bill_status("BILL001", BillStatus::Paid)
        .await
        .unwrap();
    billing
        .set_bill_status("BILL003", BillStatus::Overdue)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_complete_billing_workflow() {
    let mut office = seeded_office().await;
    bill_everything(&mut office).await;

    let billing = office.billing();
    let mumbai_delhi = billing.get_bill("BILL001").await.unwrap().unwrap();
    assert_eq!(mumbai_delhi.totals.regime, GstRegime::InterState);
    assert_eq!(mumbai_delhi.totals.igst, BigDecimal::from(9000));
    assert_eq!(mumbai_delhi.totals.cgst, BigDecimal::from(0));
    assert_eq!(*mumbai_delhi.grand_total(), BigDecimal::from(59000));
    assert_eq!(mumbai_delhi.due_date, date(2025, 8, 15));

    let delhi_jaipur = billing.get_bill("BILL002").await.unwrap().unwrap();
    assert_eq!(delhi_jaipur.totals.igst, BigDecimal::from(3600));
    assert_eq!(*delhi_jaipur.grand_total(), BigDecimal::from(23600));

    let pune_mumbai = billing.get_bill("BILL003").await.unwrap().unwrap();
    assert_eq!(pune_mumbai.totals.regime, GstRegime::IntraState);
    assert_eq!(pune_mumbai.totals.cgst, BigDecimal::from(1350));
    assert_eq!(pune_mumbai.totals.sgst, BigDecimal::from(1350));
    assert_eq!(*pune_mumbai.grand_total(), BigDecimal::from(17700));

    let summary = office.dashboard_summary(date(2025, 8, 25)).await.unwrap();
    assert_eq!(summary.billed, BigDecimal::from(100300));
    assert_eq!(summary.collected, BigDecimal::from(59000));
    assert_eq!(summary.outstanding, BigDecimal::from(41300));
    assert_eq!(summary.past_due_bills, 2);
    assert_eq!(summary.shipments, 3);
    assert_eq!(summary.vehicles_on_road, 1);
    assert_eq!(summary.vehicles_total, 2);
    assert_eq!(summary.drivers_without_vehicle, 1);
}

#[tokio::test]
async fn test_bill_search() {
    let mut office = seeded_office().await;
    bill_everything(&mut office).await;
    let billing = office.billing();

    let ids = |bills: Vec<freight_billing::Bill>| -> Vec<String> {
        bills.into_iter().map(|b| b.id).collect()
    };

    let all = billing.search_bills(&BillFilter::new()).await.unwrap();
    assert_eq!(ids(all), vec!["BILL001", "BILL002", "BILL003"]);

    let route = BillFilter::new().route(Some("B001".to_string()), Some("B002".to_string()));
    assert_eq!(ids(billing.search_bills(&route).await.unwrap()), vec!["BILL001"]);

    let from_pune = BillFilter::new().route(Some("B006".to_string()), None);
    assert_eq!(ids(billing.search_bills(&from_pune).await.unwrap()), vec!["BILL003"]);

    let by_name = BillFilter::new().search("PHARMA");
    assert_eq!(ids(billing.search_bills(&by_name).await.unwrap()), vec!["BILL003"]);

    let large = BillFilter::new().amount_between(Some(BigDecimal::from(20000)), None);
    assert_eq!(
        ids(billing.search_bills(&large).await.unwrap()),
        vec!["BILL001", "BILL002"]
    );

    let dated = BillFilter::new().dated_between(Some(date(2025, 7, 21)), Some(date(2025, 7, 23)));
    assert_eq!(
        ids(billing.search_bills(&dated).await.unwrap()),
        vec!["BILL002", "BILL003"]
    );

    let overdue_tbb = BillFilter::new()
        .status(BillStatus::Overdue)
        .charge_status(ChargeStatus::Tbb);
    assert_eq!(
        ids(billing.search_bills(&overdue_tbb).await.unwrap()),
        vec!["BILL003"]
    );

    let unknown = BillFilter::new().route(None, Some("B404".to_string()));
    let err = billing.search_bills(&unknown).await.unwrap_err();
    assert!(matches!(err, BillingError::NotFound { entity: "Branch", .. }));
}

#[tokio::test]
async fn test_invoice_view_resolves_vehicle_and_driver() {
    let mut office = seeded_office().await;

    let sheet = office
        .fleet_mut()
        .create_loading_sheet(
            date(2025, 7, 15),
            "V001",
            "B001",
            &["LRN2025001".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(sheet.driver_id, "D01");

    bill_everything(&mut office).await;

    let view = office.billing().invoice_view("BILL001").await.unwrap();
    assert_eq!(view.issuer_name, "Vahan Sarthi");
    assert_eq!(view.lr_number, "LRN2025001");
    assert_eq!(view.date, "16/07/2025");
    assert_eq!(view.vehicle_number.as_deref(), Some("MH 01 AB 1234"));
    assert_eq!(view.driver_name.as_deref(), Some("Ramesh Kumar"));
    assert_eq!(view.consignee.name, "XYZ Retail");
    assert_eq!(view.articles.len(), 1);
    assert_eq!(view.articles[0].weight_kg.as_deref(), Some("5,000.00"));
    assert_eq!(view.subtotal, "₹50,000.00");
    assert_eq!(view.taxes.len(), 1);
    assert_eq!(view.taxes[0].label, "IGST (18%)");
    assert_eq!(view.grand_total, "₹59,000.00");
    assert_eq!(view.status, "Paid");

    // No loading sheet, no vehicle on the invoice
    let view = office.billing().invoice_view("BILL003").await.unwrap();
    assert!(view.vehicle_number.is_none());
    assert!(view.driver_name.is_none());
    assert_eq!(view.taxes[0].label, "CGST (9%)");
    assert_eq!(view.taxes[1].label, "SGST (9%)");
}

#[tokio::test]
async fn test_form_draft_with_transport_forward_charge() {
    let mut office = seeded_office().await;

    let charges = ChargesInput {
        freight: "12000".to_string(),
        surcharge: "".to_string(),
        hamali: "350".to_string(),
        door_delivery: "500".to_string(),
        other: "".to_string(),
    };
    let draft = BillDraft::from_form(
        date(2025, 7, 23),
        GstLiableParty::Transport,
        ChargeStatus::ToPay,
        &[
            ArticleInput::new("100", "Box", "Handicrafts", "1500"),
            ArticleInput::new("50", "Crate", "Pottery", "650.50"),
        ],
        &charges,
    )
    .unwrap();

    let preview = office
        .billing()
        .preview_totals("LRN2025005", &draft)
        .await
        .unwrap();
    assert_eq!(preview.regime, GstRegime::TransportForwardCharge);
    assert_eq!(preview.taxable_value, BigDecimal::from(12000));
    assert_eq!(preview.cgst, BigDecimal::from(300));
    assert_eq!(preview.sgst, BigDecimal::from(300));
    assert_eq!(preview.igst, BigDecimal::from(0));

    let bill = office
        .billing_mut()
        .open_bill("LRN2025005", draft)
        .await
        .unwrap();
    assert_eq!(bill.totals, preview);
    assert_eq!(
        *bill.grand_total(),
        BigDecimal::from_str("15600.50").unwrap()
    );
    assert_eq!(bill.total_quantity(), 150);

    let view = office.billing().invoice_view(&bill.id).await.unwrap();
    let labels: Vec<&str> = view.charges.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels.len(), 3);
    assert_eq!(view.taxes[0].label, "CGST (2.5%)");
    assert_eq!(view.grand_total, "₹15,600.50");
}

#[tokio::test]
async fn test_draft_errors_name_the_field() {
    let err = BillDraft::from_form(
        date(2025, 7, 23),
        GstLiableParty::Consignor,
        ChargeStatus::ToPay,
        &[
            ArticleInput::new("10", "Box", "Spares", "100"),
            ArticleInput::new("5", "Box", "Spares", "abc"),
        ],
        &ChargesInput::default(),
    )
    .unwrap_err();
    assert_eq!(err.field(), Some("articles[1].amount"));

    let charges = ChargesInput {
        freight: "-10".to_string(),
        ..ChargesInput::default()
    };
    let err = BillDraft::from_form(
        date(2025, 7, 23),
        GstLiableParty::Consignor,
        ChargeStatus::ToPay,
        &[ArticleInput::new("10", "Box", "Spares", "100")],
        &charges,
    )
    .unwrap_err();
    assert_eq!(err.field(), Some("charges.freight"));
}

#[tokio::test]
async fn test_update_and_delete_bill() {
    let mut office = seeded_office().await;
    bill_everything(&mut office).await;
    let billing = office.billing_mut();

    let bill = billing.get_bill("BILL002").await.unwrap().unwrap();
    let mut draft = BillDraft::from_bill(&bill);
    draft.charges.set(
        freight_billing::ChargeKind::DoorDelivery,
        BigDecimal::from(1000),
    );
    let updated = billing.update_bill("BILL002", draft).await.unwrap();
    assert_eq!(updated.id, "BILL002");
    assert_eq!(updated.shipment_id, "LRN2025005");
    assert_eq!(updated.totals.igst, BigDecimal::from(3780));
    assert_eq!(*updated.grand_total(), BigDecimal::from(24780));

    billing.delete_bill("BILL002").await.unwrap();
    assert!(billing.get_bill("BILL002").await.unwrap().is_none());

    let shipment = office
        .fleet()
        .get_shipment("LRN2025005")
        .await
        .unwrap()
        .unwrap();
    assert!(shipment.bill_id.is_none());

    // Count is two again, so the next number skips the surviving BILL003
    let draft = BillBuilder::new(date(2025, 7, 24))
        .article(150, "Box", "Handicrafts", BigDecimal::from(0))
        .freight(BigDecimal::from(20000))
        .build()
        .unwrap();
    let rebilled = office
        .billing_mut()
        .open_bill("LRN2025005", draft)
        .await
        .unwrap();
    assert_eq!(rebilled.id, "BILL004");
}

#[tokio::test]
async fn test_custom_config_and_validator() {
    let config: BillingConfig = serde_json::from_str(
        r#"{ "bill_number_prefix": "VS/25-26/", "payment_terms_days": 15 }"#,
    )
    .unwrap();
    let mut office = BackOffice::with_config(
        MemoryStorage::new(),
        config,
        Box::new(EnhancedBillValidator),
    )
    .unwrap();

    office
        .fleet_mut()
        .register_shipment(shipment(
            "LRN2025003",
            date(2025, 7, 20),
            "Pune, Maharashtra",
            "Mumbai, Maharashtra",
            Customer::new("Pharma Co", "321 MIDC, Mumbai"),
            Customer::new("HealthCare Ltd", "654 Hinjewadi, Pune"),
            100,
            1000,
        ))
        .await
        .unwrap();

    let undescribed = BillBuilder::new(date(2025, 7, 21))
        .article(100, "Carton", "", BigDecimal::from(0))
        .freight(BigDecimal::from(15000))
        .build()
        .unwrap();
    let err = office
        .billing_mut()
        .open_bill("LRN2025003", undescribed)
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("articles[0].details"));

    let draft = BillBuilder::new(date(2025, 7, 21))
        .article(100, "Carton", "Medicines", BigDecimal::from(0))
        .freight(BigDecimal::from(15000))
        .build()
        .unwrap();
    let bill = office
        .billing_mut()
        .open_bill("LRN2025003", draft)
        .await
        .unwrap();
    assert_eq!(bill.id, "VS/25-26/001");
    assert_eq!(bill.due_date, date(2025, 8, 5));

    office
        .billing_mut()
        .set_bill_status(&bill.id, BillStatus::Paid)
        .await
        .unwrap();
    let err = office.billing_mut().delete_bill(&bill.id).await.unwrap_err();
    assert!(matches!(err, BillingError::Conflict(_)));
}

#[tokio::test]
async fn test_fleet_operations() {
    let mut office = seeded_office().await;
    let fleet = office.fleet_mut();

    fleet
        .update_shipment_status("LRN2025001", ShipmentStatus::InTransit)
        .await
        .unwrap();
    fleet
        .update_shipment_status("LRN2025001", ShipmentStatus::Delivered)
        .await
        .unwrap();

    // Delivered shipments cannot be loaded
    fleet.assign_driver("V002", "D02").await.unwrap();
    let err = fleet
        .create_loading_sheet(
            date(2025, 7, 21),
            "V002",
            "B002",
            &["LRN2025005".to_string(), "LRN2025001".to_string()],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::Conflict(_)));

    // Nothing was linked by the failed attempt
    let untouched = fleet.get_shipment("LRN2025005").await.unwrap().unwrap();
    assert!(untouched.loading_sheet_id.is_none());

    fleet
        .set_vehicle_status("V002", VehicleStatus::Maintenance)
        .await
        .unwrap();
    let err = fleet
        .create_loading_sheet(
            date(2025, 7, 21),
            "V002",
            "B002",
            &["LRN2025005".to_string()],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::Conflict(_)));

    let alerts = fleet.expiring_documents(date(2025, 7, 20), 30).await.unwrap();
    let ids: Vec<&str> = alerts.iter().map(|a| a.record_id.as_str()).collect();
    assert_eq!(ids, vec!["D02"]);
    assert!(!alerts[0].expired);

    let summary = office.dashboard_summary(date(2025, 7, 20)).await.unwrap();
    assert_eq!(summary.in_transit, 0);
    assert_eq!(summary.drivers_without_vehicle, 0);
}

#[test]
fn test_totals_from_address_strings() {
    let totals = compute_invoice_totals_from_addresses(
        "Bangalore, Karnataka",
        "Chennai, Tamil Nadu",
        &[Article::new(200, "Box", "Computer Parts", BigDecimal::from(0))],
        &ChargeSet::freight_only(BigDecimal::from(25000)),
        GstLiableParty::Consignor,
    )
    .unwrap();
    assert_eq!(totals.igst, BigDecimal::from(4500));

    let err = compute_invoice_totals_from_addresses(
        "Unknown",
        "Chennai, Tamil Nadu",
        &[],
        &ChargeSet::default(),
        GstLiableParty::Consignor,
    )
    .unwrap_err();
    assert_eq!(err.field(), Some("origin"));
}
