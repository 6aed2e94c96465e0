pub mod dns;

pub use dns::RouteQueryUseCase;
