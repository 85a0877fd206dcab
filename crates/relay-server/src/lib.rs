//! # relay-server
//!
//! HTTP front end for batch-relay: the route table, middleware, and the
//! server that binds it to a port.

mod error;
pub mod routes;
mod server;

pub use error::ApiError;
pub use routes::router;
pub use server::RelayServer;
