mod query_resolver;

pub use query_resolver::{DnsRequest, QueryResolver};

// Re-export for convenience
pub use dres_domain::DomainError;
