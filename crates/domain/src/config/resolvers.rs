use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::DomainError;

pub const DEFAULT_DNS_PORT: u16 = 53;

/// One entry of the `resolvers` table, tagged by its `type` field.
///
/// ```json
/// { "type": "delegating", "socket": "1.1.1.1:53" }
/// { "type": "static", "hosts": { "nas.home": "10.0.0.10" } }
/// { "type": "hosts-file", "path": "/etc/dres/hosts" }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ResolverSpec {
    Delegating {
        socket: String,
    },

    #[serde(rename = "static")]
    StaticHosts {
        #[serde(default)]
        hosts: BTreeMap<String, String>,
    },

    HostsFile {
        path: PathBuf,
    },
}

impl ResolverSpec {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Delegating { .. } => "delegating",
            Self::StaticHosts { .. } => "static",
            Self::HostsFile { .. } => "hosts-file",
        }
    }
}

/// Upstream address of a delegating resolver. A bare IP gets port 53.
pub fn parse_socket(socket: &str) -> Result<SocketAddr, DomainError> {
    let socket = socket.trim();

    if let Ok(addr) = socket.parse::<SocketAddr>() {
        return Ok(addr);
    }

    socket
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
        .map_err(|_| {
            DomainError::InvalidIpAddress(format!(
                "'{}' is not a socket address (expected ip:port or ip)",
                socket
            ))
        })
}
