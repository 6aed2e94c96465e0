use dres_domain::NetworkClassifier;
use hickory_proto::op::Message;
use std::net::IpAddr;
use tracing::instrument;

use crate::ports::{DnsRequest, QueryResolver};
use crate::services::ResolverChainDispatcher;

/// Entry point for every inbound query: classify the client, then run the
/// resolver chain of its network.
pub struct RouteQueryUseCase<R> {
    classifier: NetworkClassifier,
    dispatcher: ResolverChainDispatcher<R>,
}

impl<R: QueryResolver> RouteQueryUseCase<R> {
    pub fn new(classifier: NetworkClassifier, dispatcher: ResolverChainDispatcher<R>) -> Self {
        Self {
            classifier,
            dispatcher,
        }
    }

    #[instrument(skip_all, fields(client = %request.client_ip, id = request.id()))]
    pub async fn execute(&self, request: &DnsRequest) -> Option<Message> {
        let network = self.classifier.classify(request.client_ip);
        self.dispatcher.dispatch(network, request).await
    }

    /// Route `query` as if it arrived from `source`.
    pub async fn route(&self, source: IpAddr, query: Message) -> Option<Message> {
        self.execute(&DnsRequest::new(source, query)).await
    }

    pub fn classifier(&self) -> &NetworkClassifier {
        &self.classifier
    }
}
