mod resolver_chain;

pub use resolver_chain::ResolverChainDispatcher;
