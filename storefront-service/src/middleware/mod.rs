pub mod auth;

pub use auth::{AdminContext, CustomerContext};
