pub mod signature;
pub mod validation;

pub use validation::ValidatedJson;
