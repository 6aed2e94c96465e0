pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use dres_domain::DomainError;
use std::time::Duration;

pub use tcp::{read_frame, write_frame, TcpTransport};
pub use udp::UdpTransport;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

/// One request/response exchange with a fixed upstream server.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}
