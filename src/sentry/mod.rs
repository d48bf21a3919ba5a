//! Sentry webhook payloads
//!
//! Turns a decoded webhook body into display fields.
//!
//! # Usage
//! - [`classify`] - decide which payload shape a body matches
//! - [`extract`] - derive fully-defaulted fields from a classified body
//!
//! Both are pure; nothing here performs I/O.

mod extract;
mod fields;
mod time;
pub mod types;

pub use extract::{classify, extract};
pub use types::{EventVariant, Extracted};
