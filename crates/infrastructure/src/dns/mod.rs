pub mod engine;
pub mod resolvers;
pub mod server;
pub mod transport;
pub mod wire;

pub use engine::{RoutingEngine, RoutingEngineBuilder};
pub use resolvers::{
    DelegatingResolver, HostsFileLoader, HostsTable, Resolver, StaticHostsResolver,
};
pub use server::DnsServerHandler;
