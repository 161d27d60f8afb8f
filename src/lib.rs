pub mod api;
pub mod cli;
pub mod commands;
pub mod driver;
pub mod error;
pub mod paths;
pub mod readiness;
pub mod registry;
pub mod types;
pub mod utils;

// Re-export core types for convenience
pub use driver::{Driver, DriverConfig, MultinodeConfig};
pub use error::{DriverError, ReadinessError};
pub use types::{BypassSpec, BypassStatus, ContainerInterfaces, PortMapping};
