//! TCP Transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Every message is preceded by its length as a two byte big-endian prefix.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use dres_domain::DomainError;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let server = self.server_addr;
        let io_err = |e: io::Error| DomainError::from_transport_io(server, &e);

        let mut stream = TcpStream::connect(server).await.map_err(io_err)?;
        stream.set_nodelay(true).map_err(io_err)?;

        write_frame(&mut stream, message_bytes).await.map_err(io_err)?;
        debug!(server = %server, message_len = message_bytes.len(), "TCP query sent");

        let response = read_frame(&mut stream).await.map_err(io_err)?.ok_or_else(|| {
            DomainError::TransportConnectionReset {
                server: server.to_string(),
            }
        })?;

        debug!(server = %server, response_len = response.len(), "TCP response received");
        Ok(response)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
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
        "TCP"
    }
}

/// Write one length-prefixed DNS message.
pub async fn write_frame<S>(stream: &mut S, message_bytes: &[u8]) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "DNS message too large for TCP: {} bytes (max {})",
                message_bytes.len(),
                MAX_TCP_MESSAGE_SIZE
            ),
        )
    })?;

    let mut frame = Vec::with_capacity(message_bytes.len() + 2);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(message_bytes);

    stream.write_all(&frame).await?;
    stream.flush().await
}

/// Read one length-prefixed DNS message. `Ok(None)` means the peer closed the
/// connection before sending another length prefix.
pub async fn read_frame<S>(stream: &mut S) -> io::Result<Option<Vec<u8>>>
where
    S: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 2];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let message_len = u16::from_be_bytes(len_buf) as usize;
    let mut message = vec![0u8; message_len];
    stream.read_exact(&mut message).await?;

    Ok(Some(message))
}
