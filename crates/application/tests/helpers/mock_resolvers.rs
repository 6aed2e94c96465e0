#![allow(dead_code)]

use async_trait::async_trait;
use dres_application::ports::{DnsRequest, QueryResolver};
use dres_domain::DomainError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

pub enum MockBehaviour {
    Answer(Ipv4Addr),
    Fail(DomainError),
}

/// Resolver double that answers (or fails) the same way every time and
/// counts how often it was asked.
pub struct MockResolver {
    name: String,
    behaviour: MockBehaviour,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn answering(name: &str, ip: &str) -> Self {
        Self {
            name: name.to_string(),
            behaviour: MockBehaviour::Answer(ip.parse().unwrap()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self::failing_with(
            name,
            DomainError::TransportTimeout {
                server: "192.0.2.1:53".to_string(),
            },
        )
    }

    pub fn failing_with(name: &str, error: DomainError) -> Self {
        Self {
            name: name.to_string(),
            behaviour: MockBehaviour::Fail(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryResolver for MockResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, request: &DnsRequest) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behaviour {
            MockBehaviour::Answer(ip) => {
                let mut response =
                    Message::new(request.id(), MessageType::Response, OpCode::Query);
                for query in request.questions() {
                    response.add_query(query.clone());
                    response.add_answer(Record::from_rdata(
                        query.name().clone(),
                        60,
                        RData::A(A(*ip)),
                    ));
                }
                Ok(response)
            }
            MockBehaviour::Fail(error) => Err(error.clone()),
        }
    }
}

pub fn a_query(domain: &str) -> Message {
    let mut query = Query::new();
    query.set_name(Name::from_str(domain).unwrap());
    query.set_query_type(RecordType::A);

    let mut message = Message::new(4242, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    message
}

pub fn request_from(client: &str, domain: &str) -> DnsRequest {
    DnsRequest::new(client.parse::<IpAddr>().unwrap(), a_query(domain))
}

pub fn answered_ip(message: &Message) -> Option<Ipv4Addr> {
    message.answers().iter().find_map(|r| match r.data() {
        RData::A(a) => Some(a.0),
        _ => None,
    })
}
