//! HTTP API for tierqa

pub mod routes;
pub mod server;

pub use routes::AppState;
pub use server::{ApiServer, ApiServerConfig};
