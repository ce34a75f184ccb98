//! Application layer - logic composed over the ports.
//!
//! - `LifecycleController`: the check-in / check-out state machine
//! - `QualityAnalyzer`: adapter turning provider completions into
//!   quality reports, with the never-failing fallback

pub mod analyzer;
pub mod controller;

pub use analyzer::QualityAnalyzer;
pub use controller::{CheckInOutcome, CheckOutOutcome, LifecycleController};
