use common_utils::{
    request::{Method, Request, RequestBuilder, RequestContent},
    CustomResult,
};
use domain_types::{
    connector_flow::Flow, errors::ConnectorError, router_request_types::ParameterSet,
    router_response_types::OperationResult, validation::ValidationError,
};

/// Everything a connector has to provide for one gateway flow.
pub trait ConnectorIntegration {
    /// Name used in logs.
    fn id(&self) -> &'static str;

    /// Checks the caller's fields. An empty list means the request may be sent.
    fn validate_request(&self, flow: Flow, params: &ParameterSet) -> Vec<ValidationError>;

    fn get_url(&self, flow: Flow) -> CustomResult<String, ConnectorError>;

    fn get_request_body(
        &self,
        flow: Flow,
        params: &ParameterSet,
    ) -> CustomResult<RequestContent, ConnectorError>;

    fn get_http_method(&self) -> Method {
        Method::Post
    }

    fn build_request(
        &self,
        flow: Flow,
        params: &ParameterSet,
    ) -> CustomResult<Request, ConnectorError> {
        Ok(RequestBuilder::new()
            .method(self.get_http_method())
            .url(&self.get_url(flow)?)
            .attach_default_headers()
            .set_body(self.get_request_body(flow, params)?)
            .build())
    }

    /// Turns the raw gateway body into an operation result.
    fn handle_response(
        &self,
        flow: Flow,
        body: &[u8],
    ) -> CustomResult<OperationResult, ConnectorError>;
}
