use dres_application::ports::DnsRequest;
use dres_domain::DomainError;
use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record, RecordType};
use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::hosts_file::{HostsFileLoader, HostsTable};

/// Answers `A` questions from a fixed name → address table.
///
/// Names are matched exactly against the question name as it appeared on the
/// wire (case kept, IDN labels left in punycode) with its trailing dot
/// removed, so the table holds `host-a`, not `host-a.`.
pub struct StaticHostsResolver {
    name: Arc<str>,
    hosts: HostsTable,
}

impl StaticHostsResolver {
    pub fn new(name: impl Into<Arc<str>>, hosts: HostsTable) -> Self {
        Self {
            name: name.into(),
            hosts,
        }
    }

    /// Build from the `hosts` map of a `static` resolver definition.
    pub fn from_records(
        name: impl Into<Arc<str>>,
        records: &BTreeMap<String, String>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let mut hosts = HashMap::with_capacity(records.len());

        for (host, address) in records {
            let ip: IpAddr = address.trim().parse().map_err(|_| {
                DomainError::InvalidIpAddress(format!(
                    "resolver {}: '{}' for {}",
                    name, address, host
                ))
            })?;
            hosts.insert(host.clone(), ip);
        }

        Ok(Self::new(name, hosts))
    }

    /// Build from a hosts file, read once.
    pub fn from_hosts_file(name: impl Into<Arc<str>>, path: &Path) -> Result<Self, DomainError> {
        let name = name.into();
        let started = Instant::now();

        let hosts = HostsFileLoader::load(path)?;

        info!(
            resolver = %name,
            path = %path.display(),
            entries = hosts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Hosts file resolver loaded"
        );

        Ok(Self::new(name, hosts))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn lookup(&self, host: &str) -> Option<IpAddr> {
        self.hosts.get(host).copied()
    }

    pub fn handle(&self, request: &DnsRequest) -> Result<Message, DomainError> {
        let question = match request.questions() {
            [] => return Err(DomainError::EmptyQuestion),
            [question] => question,
            many => return Err(DomainError::UnsupportedMultiQuestion(many.len())),
        };

        if question.query_type() != RecordType::A {
            return Err(DomainError::UnsupportedQueryType(
                question.query_type().to_string(),
            ));
        }

        let fqdn = question.name().to_ascii();
        let host = fqdn.strip_suffix('.').unwrap_or(&fqdn);

        let ipv4 = match self.lookup(host) {
            Some(IpAddr::V4(ipv4)) => ipv4,
            Some(IpAddr::V6(ipv6)) => {
                return Err(DomainError::MappingNotIpv4 {
                    name: host.to_string(),
                    address: ipv6.to_string(),
                })
            }
            None => return Err(DomainError::NoStaticMapping(host.to_string())),
        };

        let query = &request.message;
        let mut response = Message::new(query.id(), MessageType::Response, query.op_code());
        response.set_recursion_desired(query.recursion_desired());
        response.set_authoritative(true);
        response.add_query(question.clone());
        response.add_answer(Record::from_rdata(
            question.name().clone(),
            0,
            RData::A(A(ipv4)),
        ));

        Ok(response)
    }
}
