//! dres Domain Layer
pub mod config;
pub mod errors;
pub mod network;

pub use config::{CliOverrides, Config, ConfigError, ResolverSpec};
pub use errors::DomainError;
pub use network::{Network, NetworkClassifier};
