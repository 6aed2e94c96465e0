use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR format: {0}")]
    InvalidCidr(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Query has no question")]
    EmptyQuestion,

    #[error("Unable to handle more than one question (got {0})")]
    UnsupportedMultiQuestion(usize),

    #[error("Unable to handle question of type {0}")]
    UnsupportedQueryType(String),

    #[error("Static mapping for {0} not found")]
    NoStaticMapping(String),

    #[error("Static mapping for {name} is not an IPv4 address: {address}")]
    MappingNotIpv4 { name: String, address: String },

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Transport connection reset by {server}")]
    TransportConnectionReset { server: String },

    #[error("Transport error with {server}: {reason}")]
    TransportError { server: String, reason: String },

    #[error("Unknown network '{0}' in resolver configuration")]
    UnknownNetwork(String),

    #[error("Network '{network}' references unknown resolver '{resolver}'")]
    UnknownResolver { network: String, resolver: String },
}

impl DomainError {
    /// Classify an I/O error raised while talking to `server`.
    pub fn from_transport_io(server: impl ToString, error: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        let server = server.to_string();
        match error.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => Self::TransportTimeout { server },
            ErrorKind::ConnectionRefused => Self::TransportConnectionRefused { server },
            ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe => {
                Self::TransportConnectionReset { server }
            }
            _ => Self::TransportError {
                server,
                reason: error.to_string(),
            },
        }
    }
}
