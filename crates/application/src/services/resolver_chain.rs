use hickory_proto::op::Message;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ports::{DnsRequest, QueryResolver};

/// Routing table: network name → ordered resolver chain.
///
/// Resolvers are shared, the same instance may sit in several chains.
pub struct ResolverChainDispatcher<R> {
    chains: HashMap<Arc<str>, Vec<Arc<R>>>,
}

impl<R> Default for ResolverChainDispatcher<R> {
    fn default() -> Self {
        Self {
            chains: HashMap::new(),
        }
    }
}

impl<R: QueryResolver> ResolverChainDispatcher<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, network: impl Into<Arc<str>>, resolvers: Vec<Arc<R>>) -> Self {
        self.insert_chain(network, resolvers);
        self
    }

    pub fn insert_chain(&mut self, network: impl Into<Arc<str>>, resolvers: Vec<Arc<R>>) {
        self.chains.insert(network.into(), resolvers);
    }

    pub fn chain(&self, network: &str) -> &[Arc<R>] {
        self.chains.get(network).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Try the chain of `network` in order and return the first answer.
    ///
    /// Failures are logged and the next resolver is tried; once one succeeds
    /// the rest of the chain is never invoked. `None` means nobody could
    /// answer and the exchange must be dropped without a reply.
    pub async fn dispatch(&self, network: Option<&str>, request: &DnsRequest) -> Option<Message> {
        let Some(network) = network else {
            debug!(client = %request.client_ip, "Client matches no network, dropping query");
            return None;
        };

        let chain = self.chain(network);
        if chain.is_empty() {
            debug!(network, "No resolvers configured for network, dropping query");
            return None;
        }

        for resolver in chain {
            match resolver.handle(request).await {
                Ok(response) => {
                    debug!(
                        network,
                        resolver = resolver.name(),
                        query = %request.describe(),
                        answers = response.answers().len(),
                        "Query resolved"
                    );
                    return Some(response);
                }
                Err(e) => {
                    warn!(
                        network,
                        resolver = resolver.name(),
                        query = %request.describe(),
                        error = %e,
                        "Resolver failed, trying next"
                    );
                }
            }
        }

        warn!(
            network,
            query = %request.describe(),
            attempted = chain.len(),
            "All resolvers failed, dropping query"
        );
        None
    }
}
