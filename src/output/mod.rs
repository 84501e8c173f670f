//! Human-readable and machine-readable round reports.

pub mod json;
pub mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::{format_round, format_summary};
