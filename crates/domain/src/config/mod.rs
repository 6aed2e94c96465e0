pub mod errors;
pub mod logging;
pub mod resolvers;
pub mod root;
pub mod server;

pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use resolvers::{parse_socket, ResolverSpec, DEFAULT_DNS_PORT};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
