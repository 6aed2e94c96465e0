use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::resolvers::{parse_socket, ResolverSpec};
use super::server::ServerConfig;
use crate::network::Network;

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["config.json", "/etc/dres/config.json"];

/// Main configuration structure for dres
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener and upstream timeouts
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Network name → CIDR
    #[serde(default)]
    pub cidrs: BTreeMap<String, String>,

    /// Resolver name → resolver definition
    #[serde(default)]
    pub resolvers: BTreeMap<String, ResolverSpec>,

    /// Network name → ordered resolver chain
    #[serde(default)]
    pub configuration: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Load configuration from file
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. config.json in current directory
    /// 3. /etc/dres/config.json
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_string(),
            None => Self::get_config_path()
                .ok_or_else(|| ConfigError::NotFound(DEFAULT_CONFIG_PATHS.join(", ")))?,
        };

        let mut config = Self::from_file(&path)?;
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file. `.toml` files are read as
    /// TOML, anything else as JSON.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;

        let is_toml = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    ///
    /// Every CIDR must parse, every network in `configuration` must be declared
    /// in `cidrs` and every resolver it names must be declared in `resolvers`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.server.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "query_timeout_ms must be greater than 0".to_string(),
            ));
        }

        for (name, cidr) in &self.cidrs {
            Network::parse(name, cidr).map_err(|e| ConfigError::Validation(e.to_string()))?;
        }

        for (name, spec) in &self.resolvers {
            Self::validate_resolver(name, spec)?;
        }

        for (network, chain) in &self.configuration {
            if !self.cidrs.contains_key(network) {
                return Err(ConfigError::Validation(format!(
                    "Network '{}' has resolvers but no CIDR in 'cidrs'",
                    network
                )));
            }

            for resolver in chain {
                if !self.resolvers.contains_key(resolver) {
                    return Err(ConfigError::Validation(format!(
                        "Network '{}' references unknown resolver '{}'",
                        network, resolver
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_resolver(name: &str, spec: &ResolverSpec) -> Result<(), ConfigError> {
        match spec {
            ResolverSpec::Delegating { socket } => {
                parse_socket(socket).map_err(|e| {
                    ConfigError::Validation(format!("Resolver '{}': {}", name, e))
                })?;
            }
            ResolverSpec::StaticHosts { hosts } => {
                for (host, address) in hosts {
                    if address.trim().parse::<IpAddr>().is_err() {
                        return Err(ConfigError::Validation(format!(
                            "Resolver '{}': invalid address '{}' for {}",
                            name, address, host
                        )));
                    }
                }
            }
            ResolverSpec::HostsFile { path } => {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "Resolver '{}': hosts-file path cannot be empty",
                        name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .find(|p| Path::new(p).exists())
            .map(|p| p.to_string())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}
