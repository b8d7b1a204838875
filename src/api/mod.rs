//! History HTTP API.
//!
//! Read-only JSON endpoints over the projection engine. Routes are nested
//! under `/api/`; every route except `/api/health` requires the
//! `X-Clinician-Id` header set by the upstream gateway.
//!
//! The router is composable: `history_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::history_api_router;
pub use server::{start_server, ApiServer, ServerError, ServerSession};
pub use types::ApiContext;
