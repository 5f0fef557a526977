pub mod connector_integration;
pub mod transport;
