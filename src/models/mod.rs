//! Source row types — one struct per store table, as read by the fetchers.
//!
//! Timestamps stay as the raw strings the store returns; parsing happens
//! once at the engine boundary (`timestamp::parse_timestamp`).

pub mod appointment;
pub mod billing;
pub mod consultation;
pub mod filters;
pub mod lab;
pub mod patient;
pub mod prescription;
pub mod queue;

pub use appointment::*;
pub use billing::*;
pub use consultation::*;
pub use filters::*;
pub use lab::*;
pub use patient::*;
pub use prescription::*;
pub use queue::*;
