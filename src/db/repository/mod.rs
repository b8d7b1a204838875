//! Repository layer — table-scoped read operations behind the history
//! engine's source fetchers.
//!
//! Every list fetch is batched: it takes the full id set for the request
//! (or page) and issues a bounded number of statements, never one per id.

mod access;
mod appointment;
mod billing;
mod consultation;
mod doctor;
mod lab_result;
mod patient;
mod prescription;
mod query;
mod queue;

#[cfg(test)]
pub(crate) mod seed;

pub use access::*;
pub use appointment::*;
pub use billing::*;
pub use consultation::*;
pub use doctor::*;
pub use lab_result::*;
pub use patient::*;
pub use prescription::*;
pub use queue::*;
