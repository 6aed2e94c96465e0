use dres_application::ports::DnsRequest;
use hickory_proto::op::{Message, MessageType};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error};

use super::engine::RoutingEngine;
use super::wire;

/// Glue between the listeners and the routing engine: raw query bytes in,
/// raw response bytes out.
///
/// `None` means "no reply": the UDP listener drops the datagram and the TCP
/// listener closes the connection.
#[derive(Clone)]
pub struct DnsServerHandler {
    engine: Arc<RoutingEngine>,
}

impl DnsServerHandler {
    pub fn new(engine: Arc<RoutingEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &RoutingEngine {
        &self.engine
    }

    /// Stream transports carry responses of any size.
    pub async fn handle_raw(&self, query_buf: &[u8], client_ip: IpAddr) -> Option<Vec<u8>> {
        let response = self.resolve(query_buf, client_ip).await?;
        encode(&response, client_ip)
    }

    /// Like [`handle_raw`](Self::handle_raw), but a response larger than the
    /// client's UDP payload limit is replaced by an empty one with TC set, so
    /// the client asks again over TCP.
    pub async fn handle_raw_udp(&self, query_buf: &[u8], client_ip: IpAddr) -> Option<Vec<u8>> {
        let response = self.resolve(query_buf, client_ip).await?;
        let bytes = encode(&response, client_ip)?;

        let limit = wire::udp_payload_limit(query_buf);
        if bytes.len() <= limit {
            return Some(bytes);
        }

        debug!(
            client = %client_ip,
            id = response.id(),
            size = bytes.len(),
            limit,
            "Response exceeds UDP payload limit, sending truncated reply"
        );
        encode(&truncated(&response), client_ip)
    }

    async fn resolve(&self, query_buf: &[u8], client_ip: IpAddr) -> Option<Message> {
        let message = match wire::decode(query_buf) {
            Ok(message) => message,
            Err(e) => {
                debug!(client = %client_ip, error = %e, "Dropping unparsable query");
                return None;
            }
        };

        if message.message_type() != MessageType::Query {
            debug!(client = %client_ip, id = message.id(), "Dropping non-query message");
            return None;
        }

        let request = DnsRequest::new(client_ip, message);
        self.engine.execute(&request).await
    }
}

fn encode(response: &Message, client_ip: IpAddr) -> Option<Vec<u8>> {
    match wire::encode(response) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!(client = %client_ip, error = %e, "Failed to serialize response");
            None
        }
    }
}

/// Header and question of `response` with TC set and every record section
/// left empty.
fn truncated(response: &Message) -> Message {
    let mut reply = Message::new(response.id(), MessageType::Response, response.op_code());
    reply.set_recursion_desired(response.recursion_desired());
    reply.set_recursion_available(response.recursion_available());
    reply.set_authoritative(response.authoritative());
    reply.set_response_code(response.response_code());
    reply.set_truncated(true);
    for question in response.queries() {
        reply.add_query(question.clone());
    }
    reply
}
