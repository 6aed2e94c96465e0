use dres_application::services::ResolverChainDispatcher;
use dres_application::use_cases::RouteQueryUseCase;
use dres_domain::{Config, DomainError, NetworkClassifier};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::resolvers::Resolver;

/// The routing engine as served by the binary.
pub type RoutingEngine = RouteQueryUseCase<Resolver>;

/// Builds a [`RoutingEngine`] from a loaded [`Config`].
///
/// Every resolver is instantiated once (hosts files are read here) and shared
/// by all chains that name it. Unknown networks or resolvers in the routing
/// table are errors.
pub struct RoutingEngineBuilder<'a> {
    config: &'a Config,
    query_timeout: Duration,
}

impl<'a> RoutingEngineBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            query_timeout: config.server.query_timeout(),
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<RoutingEngine, DomainError> {
        let resolvers = self.load_resolvers()?;
        let classifier = self.load_networks()?;
        let dispatcher = self.load_routing_table(&classifier, &resolvers)?;

        info!(
            networks = classifier.len(),
            resolvers = resolvers.len(),
            "Routing engine ready"
        );

        Ok(RouteQueryUseCase::new(classifier, dispatcher))
    }

    fn load_resolvers(&self) -> Result<HashMap<&'a str, Arc<Resolver>>, DomainError> {
        let config = self.config;
        let mut resolvers = HashMap::with_capacity(config.resolvers.len());

        for (name, spec) in &config.resolvers {
            let resolver = Resolver::from_spec(name, spec, self.query_timeout)?;
            info!(resolver = %name, kind = spec.type_name(), "Loaded resolver");
            resolvers.insert(name.as_str(), Arc::new(resolver));
        }

        Ok(resolvers)
    }

    fn load_networks(&self) -> Result<NetworkClassifier, DomainError> {
        let classifier = NetworkClassifier::from_cidrs(
            self.config
                .cidrs
                .iter()
                .map(|(name, cidr)| (name.as_str(), cidr.as_str())),
        )?;

        for network in classifier.networks() {
            info!(network = %network.name, cidr = %network.cidr, "Loaded network");
        }

        Ok(classifier)
    }

    fn load_routing_table(
        &self,
        classifier: &NetworkClassifier,
        resolvers: &HashMap<&'a str, Arc<Resolver>>,
    ) -> Result<ResolverChainDispatcher<Resolver>, DomainError> {
        let mut dispatcher = ResolverChainDispatcher::new();

        for (network, names) in &self.config.configuration {
            if !classifier.contains_network(network) {
                return Err(DomainError::UnknownNetwork(network.clone()));
            }

            let chain = names
                .iter()
                .map(|resolver| {
                    resolvers.get(resolver.as_str()).cloned().ok_or_else(|| {
                        DomainError::UnknownResolver {
                            network: network.clone(),
                            resolver: resolver.clone(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if chain.is_empty() {
                warn!(network = %network, "Network has an empty resolver chain");
            }
            info!(network = %network, chain = ?names, "Loaded resolver chain");

            dispatcher.insert_chain(network.as_str(), chain);
        }

        for network in classifier.networks() {
            if !self.config.configuration.contains_key(network.name.as_ref()) {
                debug!(network = %network.name, "Network has no resolver chain, its queries will be dropped");
            }
        }

        Ok(dispatcher)
    }
}
