pub mod delegating;
pub mod hosts_file;
pub mod static_hosts;

use async_trait::async_trait;
use dres_application::ports::{DnsRequest, QueryResolver};
use dres_domain::config::parse_socket;
use dres_domain::{DomainError, ResolverSpec};
use hickory_proto::op::Message;
use std::time::Duration;

pub use delegating::DelegatingResolver;
pub use hosts_file::{HostsFileLoader, HostsTable};
pub use static_hosts::StaticHostsResolver;

/// The closed set of resolver backends. `hosts-file` definitions become
/// `StaticHosts` once the file is loaded.
pub enum Resolver {
    Delegating(DelegatingResolver),
    StaticHosts(StaticHostsResolver),
}

impl Resolver {
    /// Instantiate one resolver definition. Hosts files are read here.
    pub fn from_spec(
        name: &str,
        spec: &ResolverSpec,
        query_timeout: Duration,
    ) -> Result<Self, DomainError> {
        match spec {
            ResolverSpec::Delegating { socket } => Ok(Self::Delegating(DelegatingResolver::new(
                name,
                parse_socket(socket)?,
                query_timeout,
            ))),
            ResolverSpec::StaticHosts { hosts } => Ok(Self::StaticHosts(
                StaticHostsResolver::from_records(name, hosts)?,
            )),
            ResolverSpec::HostsFile { path } => Ok(Self::StaticHosts(
                StaticHostsResolver::from_hosts_file(name, path)?,
            )),
        }
    }
}

#[async_trait]
impl QueryResolver for Resolver {
    fn name(&self) -> &str {
        match self {
            Self::Delegating(r) => r.name(),
            Self::StaticHosts(r) => r.name(),
        }
    }

    async fn handle(&self, request: &DnsRequest) -> Result<Message, DomainError> {
        match self {
            Self::Delegating(r) => r.handle(request).await,
            Self::StaticHosts(r) => r.handle(request),
        }
    }
}
