//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Standard DNS transport. Messages are sent as-is (no framing).
//! If the response has the TC (truncated) bit set, the caller should retry via TCP.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use dres_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let server = self.server_addr;

        let socket = UdpSocket::bind(self.bind_addr())
            .await
            .map_err(|e| DomainError::from_transport_io(server, &e))?;

        let bytes_sent = socket
            .send_to(message_bytes, server)
            .await
            .map_err(|e| DomainError::from_transport_io(server, &e))?;

        debug!(server = %server, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let (bytes_received, from_addr) = socket
                .recv_from(&mut recv_buf)
                .await
                .map_err(|e| DomainError::from_transport_io(server, &e))?;

            // Stray datagrams on the ephemeral port are ignored.
            if from_addr != server {
                warn!(
                    expected = %server,
                    received_from = %from_addr,
                    "UDP response from unexpected source"
                );
                continue;
            }

            recv_buf.truncate(bytes_received);
            debug!(server = %server, bytes_received, "UDP response received");
            return Ok(recv_buf);
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })??;

        Ok(TransportResponse {
            bytes,
            protocol_used: self.protocol_name(),
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
