//! HTTP transport to the remote assistant service.

mod gateway;

pub use gateway::HttpGateway;
