//! # Freight Billing
//!
//! Back-office core for a road freight operator: shipments, fleet records,
//! loading sheets and GST-compliant freight invoices.
//!
//! ## Features
//!
//! - **Invoice totals**: article and charge aggregation with CGST/SGST, IGST and
//!   the transport forward charge, at full decimal precision
//! - **Bill lifecycle**: numbering, due dates, edits, status changes and search
//! - **Invoice rendering**: display rounding and Indian rupee formatting
//! - **Fleet operations**: vehicle/driver pairing, document expiry alerts,
//!   shipment status and loading sheets
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use freight_billing::{compute_invoice_totals_from_addresses, Article, ChargeSet, GstLiableParty};
//! use bigdecimal::BigDecimal;
//!
//! let totals = compute_invoice_totals_from_addresses(
//!     "Mumbai, Maharashtra",
//!     "New Delhi, Delhi",
//!     &[Article::new(50, "Bale", "Cotton Bales", BigDecimal::from(0))],
//!     &ChargeSet::freight_only(BigDecimal::from(50000)),
//!     GstLiableParty::Consignee,
//! )
//! .unwrap();
//!
//! assert_eq!(totals.igst, BigDecimal::from(9000));
//! assert_eq!(totals.grand_total, BigDecimal::from(59000));
//! ```

pub mod billing;
pub mod config;
pub mod fleet;
pub mod office;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use billing::{
    compute_invoice_totals, compute_invoice_totals_from_addresses, format_amount, format_inr,
    round_for_display, ArticleInput, BillBuilder, BillDraft, BillFilter, BillingDesk,
    ChargesInput, InvoiceCalculator, InvoiceTotals, InvoiceView,
};
pub use config::BillingConfig;
pub use fleet::{DocumentAlert, DocumentKind, FleetDesk};
pub use office::{BackOffice, DashboardSummary};
pub use tax::gst::*;
pub use traits::*;
pub use types::*;
