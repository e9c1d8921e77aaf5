pub mod api;
pub mod error;

// Convenience re-exports
pub use api::client::PlannerClient;
pub use api::types;
pub use error::{PlannerError, Result};
