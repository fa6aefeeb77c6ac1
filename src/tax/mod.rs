//! Tax rules

pub mod gst;

pub use gst::*;
