//! Display helpers shared by the terminal front end and log output.

pub mod formatting;

pub use formatting::{format_delivery_time, format_price, preview};
