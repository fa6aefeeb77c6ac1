//! Freight billing: totals, drafts, filtering and invoice rendering

pub mod bill;
pub mod core;
pub mod draft;
pub mod filter;
pub mod invoice;
pub mod render;

pub use bill::*;
pub use self::core::*;
pub use draft::*;
pub use filter::*;
pub use invoice::*;
pub use render::*;
