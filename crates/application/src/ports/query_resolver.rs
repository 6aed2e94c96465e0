use async_trait::async_trait;
use dres_domain::DomainError;
use hickory_proto::op::{Message, Query};
use std::net::IpAddr;
use std::sync::Arc;

/// An inbound query together with the address it came from.
#[derive(Debug, Clone)]
pub struct DnsRequest {
    pub client_ip: IpAddr,
    pub message: Arc<Message>,
}

impl DnsRequest {
    pub fn new(client_ip: IpAddr, message: Message) -> Self {
        Self {
            client_ip,
            message: Arc::new(message),
        }
    }

    pub fn questions(&self) -> &[Query] {
        self.message.queries()
    }

    pub fn id(&self) -> u16 {
        self.message.id()
    }

    /// First question rendered as `name TYPE`, for log fields.
    pub fn describe(&self) -> String {
        match self.questions().first() {
            Some(q) => format!("{} {}", q.name(), q.query_type()),
            None => "<no question>".to_string(),
        }
    }
}

/// A resolution backend: answers a query or reports why it could not.
#[async_trait]
pub trait QueryResolver: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, request: &DnsRequest) -> Result<Message, DomainError>;
}
