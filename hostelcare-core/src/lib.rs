//! hostelcare-core: shared infrastructure for the hostelcare session client.
pub mod config;
pub mod error;
pub mod observability;

pub use error::CoreError;
pub use reqwest;
pub use serde;
pub use serde_json;
pub use tracing;
