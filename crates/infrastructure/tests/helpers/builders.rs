use dres_application::ports::DnsRequest;
use dres_infrastructure::dns::wire;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RData, RecordType};
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tempfile::NamedTempFile;

pub const QUERY_ID: u16 = 0x1d2c;

pub fn question(domain: &str, record_type: RecordType) -> Query {
    let mut query = Query::new();
    query.set_name(Name::from_str(domain).unwrap());
    query.set_query_type(record_type);
    query
}

/// Question whose name keeps its case and punycode labels, like a name
/// decoded from a client packet.
pub fn question_ascii(domain: &str, record_type: RecordType) -> Query {
    let mut query = Query::new();
    query.set_name(Name::from_ascii(domain).unwrap());
    query.set_query_type(record_type);
    query
}

pub fn query_message(questions: &[(&str, RecordType)]) -> Message {
    let mut message = Message::new(QUERY_ID, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    for (domain, record_type) in questions {
        message.add_query(question(domain, *record_type));
    }
    message
}

pub fn request(client: &str, questions: &[(&str, RecordType)]) -> DnsRequest {
    DnsRequest::new(client.parse::<IpAddr>().unwrap(), query_message(questions))
}

pub fn a_request(client: &str, domain: &str) -> DnsRequest {
    request(client, &[(domain, RecordType::A)])
}

/// A query for `domain` as received from the network: built with the name
/// verbatim, then encoded and decoded again.
pub fn wire_a_request(client: &str, domain: &str) -> DnsRequest {
    let mut message = Message::new(QUERY_ID, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(question_ascii(domain, RecordType::A));

    let bytes = wire::encode(&message).unwrap();
    DnsRequest::new(client.parse::<IpAddr>().unwrap(), wire::decode(&bytes).unwrap())
}

pub fn a_answers(message: &Message) -> Vec<Ipv4Addr> {
    message
        .answers()
        .iter()
        .filter_map(|r| match r.data() {
            RData::A(a) => Some(a.0),
            _ => None,
        })
        .collect()
}

pub fn hosts_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Appends an EDNS0 OPT record advertising `payload` bytes to an encoded
/// query without additional records.
pub fn with_edns(mut bytes: Vec<u8>, payload: u16) -> Vec<u8> {
    bytes[11] = 1;
    bytes.extend_from_slice(&[0x00, 0x00, 0x29]);
    bytes.extend_from_slice(&payload.to_be_bytes());
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    bytes
}
