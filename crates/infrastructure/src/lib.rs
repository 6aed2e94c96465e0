//! dres Infrastructure Layer
pub mod dns;
