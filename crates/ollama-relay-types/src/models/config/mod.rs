//! Gateway and upstream configuration models.

mod gateway;
mod upstream;

pub use gateway::GatewayConfig;
pub use upstream::UpstreamConfig;
