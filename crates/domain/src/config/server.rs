use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Upper bound for one upstream exchange made by a delegating resolver.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_true")]
    pub tcp_enabled: bool,

    #[serde(default = "default_tcp_idle_timeout_ms")]
    pub tcp_idle_timeout_ms: u64,
}

impl ServerConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn tcp_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.tcp_idle_timeout_ms)
    }

    pub fn listen_address(&self) -> String {
        if self.bind_address.contains(':') && !self.bind_address.starts_with('[') {
            format!("[{}]:{}", self.bind_address, self.dns_port)
        } else {
            format!("{}:{}", self.bind_address, self.dns_port)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            dns_port: default_dns_port(),
            query_timeout_ms: default_query_timeout_ms(),
            tcp_enabled: true,
            tcp_idle_timeout_ms: default_tcp_idle_timeout_ms(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_dns_port() -> u16 {
    53
}

fn default_query_timeout_ms() -> u64 {
    2000
}

fn default_tcp_idle_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}
