use dres_application::ports::DnsRequest;
use dres_domain::DomainError;
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::dns::transport::{DnsTransport, TcpTransport, UdpTransport};
use crate::dns::wire;

/// Forwards queries verbatim to one upstream server.
///
/// The query goes out over UDP; a truncated reply is asked again over TCP.
/// The whole exchange is bounded by `timeout`. Nothing is retried here, a
/// chain that wants a retry lists the resolver twice.
pub struct DelegatingResolver {
    name: Arc<str>,
    upstream: SocketAddr,
    timeout: Duration,
    udp: UdpTransport,
    tcp: TcpTransport,
}

impl DelegatingResolver {
    pub fn new(name: impl Into<Arc<str>>, upstream: SocketAddr, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            upstream,
            timeout,
            udp: UdpTransport::new(upstream),
            tcp: TcpTransport::new(upstream),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn upstream(&self) -> SocketAddr {
        self.upstream
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn handle(&self, request: &DnsRequest) -> Result<Message, DomainError> {
        tokio::time::timeout(self.timeout, self.exchange(request))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.upstream.to_string(),
            })?
    }

    async fn exchange(&self, request: &DnsRequest) -> Result<Message, DomainError> {
        let query_bytes = wire::encode(&request.message)?;

        let response = self.ask(&self.udp, &query_bytes, request.id()).await?;
        if !response.truncated() {
            return Ok(response);
        }

        debug!(
            resolver = %self.name,
            upstream = %self.upstream,
            from = self.udp.protocol_name(),
            to = self.tcp.protocol_name(),
            "Truncated response, asking again"
        );
        self.ask(&self.tcp, &query_bytes, request.id()).await
    }

    async fn ask<T: DnsTransport>(
        &self,
        transport: &T,
        query_bytes: &[u8],
        expected_id: u16,
    ) -> Result<Message, DomainError> {
        let reply = transport.send(query_bytes, self.timeout).await?;
        let response = wire::decode(&reply.bytes)?;

        if response.id() != expected_id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "{} answered with id {} over {}, expected {}",
                self.upstream,
                response.id(),
                reply.protocol_used,
                expected_id
            )));
        }

        debug!(
            resolver = %self.name,
            upstream = %self.upstream,
            protocol = reply.protocol_used,
            rcode = ?response.response_code(),
            answers = response.answers().len(),
            "Upstream answered"
        );
        Ok(response)
    }
}
