//! Client for the AprovaFacil card gateway.
//!
//! [`ClientSession`] authorizes, confirms and cancels card transactions and
//! keeps the outcome of the last call of each kind so it can be inspected
//! afterwards.

pub mod configs;
pub mod error;
pub mod logger;
pub mod session;

pub use common_utils::CustomResult;
pub use domain_types::{
    connector_flow::Flow,
    errors::{ApiClientError, ConnectorError},
    router_request_types::{FieldName, ParamValue, ParameterSet},
    router_response_types::{OperationResult, ResponseDocument, VALIDATION_ERRORS_KEY},
    types::{AprovaFacilParams, Mode, Proxy},
    validation::{ErrorKind, ValidationError},
};
pub use external_services::HttpTransport;
pub use interfaces::transport::ConnectorTransport;
pub use session::ClientSession;
