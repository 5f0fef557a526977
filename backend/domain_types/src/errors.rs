use crate::connector_flow::Flow;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ApiClientError {
    #[error("Header map construction failed")]
    HeaderMapConstructionFailed,
    #[error("Invalid proxy configuration")]
    InvalidProxyConfiguration,
    #[error("Client construction failed")]
    ClientConstructionFailed,
    #[error("URL encoding of request payload failed")]
    UrlEncodingFailed,
    #[error("Failed to send request to connector {0}")]
    RequestNotSent(String),
    #[error("Failed to decode response")]
    ResponseDecodingFailed,
    #[error("Server responded with Request Timeout")]
    RequestTimeoutReceived,
    #[error("Server responded with status code {status_code}")]
    ErrorStatusReceived { status_code: u16 },
    #[error("Unexpected state reached/Invariants conflicted")]
    UnexpectedServerResponse,
}

impl ApiClientError {
    pub fn is_upstream_timeout(&self) -> bool {
        self == &Self::RequestTimeoutReceived
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConnectorError {
    #[error("You should set {} in the configuration with the correct {flow} URL", flow.endpoint_key())]
    FailedToObtainIntegrationUrl { flow: Flow },
    #[error("Call this method after {}", flow.session_call())]
    FlowNotExecuted { flow: Flow },
    #[error("Failed to deserialize connector response")]
    ResponseDeserializationFailed,
    #[error("Failed to execute a processing step: {0:?}")]
    ProcessingStepFailed(Option<String>),
    #[error("Invalid Configuration")]
    InvalidConnectorConfig { config: &'static str },
}
