//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Audit logger — every request, including rejected ones
//! 2. Clinician validator — protected routes only

pub mod audit;
pub mod clinician;
