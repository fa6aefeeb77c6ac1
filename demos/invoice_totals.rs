//! Invoice totals and billing examples

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use freight_billing::{
    compute_invoice_totals_from_addresses, format_inr, utils::MemoryStorage, Article,
    ArticleInput, BackOffice, BillDraft, ChargeSet, ChargeStatus, ChargesInput, Customer,
    GstLiableParty, Location, Shipment,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚚 Freight Billing - Invoice Totals Examples\n");

    // 1. The three GST treatments for the same freight
    let articles = [Article::new(50, "Bale", "Cotton Bales", BigDecimal::from(0))];
    let charges = ChargeSet::freight_only(BigDecimal::from(50000));
    let cases = [
        ("Mumbai, Maharashtra", "Pune, Maharashtra", GstLiableParty::Consignor),
        ("Mumbai, Maharashtra", "New Delhi, Delhi", GstLiableParty::Consignee),
        ("Mumbai, Maharashtra", "New Delhi, Delhi", GstLiableParty::Transport),
    ];

    for (origin, destination, party) in cases {
        let totals =
            compute_invoice_totals_from_addresses(origin, destination, &articles, &charges, party)?;
        println!("📦 {} -> {} ({:?} liable)", origin, destination, party);
        println!("  Regime:      {:?}", totals.regime);
        println!("  Subtotal:    {}", format_inr(&totals.subtotal));
        println!("  CGST:        {}", format_inr(&totals.cgst));
        println!("  SGST:        {}", format_inr(&totals.sgst));
        println!("  IGST:        {}", format_inr(&totals.igst));
        println!("  Grand Total: {}", format_inr(&totals.grand_total));
        println!();
    }

    // 2. Malformed addresses are rejected
    match compute_invoice_totals_from_addresses(
        "Unknown",
        "Pune, Maharashtra",
        &articles,
        &charges,
        GstLiableParty::Consignor,
    ) {
        Ok(_) => println!("❌ Unexpected success"),
        Err(e) => println!("✅ Rejected bad address: {}\n", e),
    }

    // 3. A bill raised from form input, then rendered
    let mut office = BackOffice::new(MemoryStorage::new());
    let date = NaiveDate::from_ymd_opt(2025, 7, 22).ok_or("bad date")?;
    office
        .fleet_mut()
        .register_shipment(Shipment::new(
            "LRN2025005".to_string(),
            date,
            Location::parse("New Delhi, Delhi")?,
            Location::parse("Jaipur, Rajasthan")?,
            Customer::new("Crafts Emporium", "777 Dilli Haat, New Delhi"),
            Customer::new("Rajasthali", "888 MI Road, Jaipur"),
            150,
            BigDecimal::from(1500),
            BigDecimal::from(450000),
        ))
        .await?;

    let draft = BillDraft::from_form(
        date,
        GstLiableParty::Consignor,
        ChargeStatus::ToPay,
        &[ArticleInput::new("150", "Box", "Handicrafts", "0")],
        &ChargesInput {
            freight: "20000".to_string(),
            hamali: "450".to_string(),
            ..ChargesInput::default()
        },
    )?;
    let bill = office.billing_mut().open_bill("LRN2025005", draft).await?;
    let view = office.billing().invoice_view(&bill.id).await?;

    println!("🧾 {} - {}", view.issuer_name, view.bill_id);
    println!("  Date: {}  Due: {}", view.date, view.due_date);
    println!("  From: {}  To: {}", view.consignor.name, view.consignee.name);
    for row in &view.articles {
        println!("  {} x {} ({}): {}", row.quantity, row.package_type, row.description, row.amount);
    }
    for row in view.charges.iter().chain(view.taxes.iter()) {
        println!("  {:<22} {}", row.label, row.amount);
    }
    println!("  {:<22} {}", "Grand Total", view.grand_total);

    Ok(())
}
