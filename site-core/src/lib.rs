//! site-core: Shared infrastructure for the storefront backend.
pub mod error;
pub mod middleware;
pub mod observability;
pub mod utils;

pub use axum;
pub use mongodb;
pub use serde;
pub use serde_json;
pub use tracing;
pub use validator;
