pub mod transformers;

use common_utils::{request::RequestContent, CustomResult};
use domain_types::{
    connector_flow::Flow,
    errors::ConnectorError,
    router_request_types::ParameterSet,
    router_response_types::OperationResult,
    types::{AprovaFacilParams, Mode},
    validation::ValidationError,
};
use error_stack::report;
use interfaces::connector_integration::ConnectorIntegration;

use crate::utils::validation;

/// The AprovaFacil card gateway: APC, CAP and CAN over form posts.
#[derive(Debug, Clone, Default)]
pub struct AprovaFacil {
    params: AprovaFacilParams,
}

impl AprovaFacil {
    pub fn new(params: AprovaFacilParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AprovaFacilParams {
        &self.params
    }

    pub fn mode(&self) -> Mode {
        self.params.mode
    }
}

impl ConnectorIntegration for AprovaFacil {
    fn id(&self) -> &'static str {
        "aprovafacil"
    }

    fn validate_request(&self, flow: Flow, params: &ParameterSet) -> Vec<ValidationError> {
        validation::validate(params, &transformers::rules_for(flow, params))
    }

    fn get_url(&self, flow: Flow) -> CustomResult<String, ConnectorError> {
        self.params
            .endpoint(flow)
            .map(ToString::to_string)
            .ok_or_else(|| report!(ConnectorError::FailedToObtainIntegrationUrl { flow }))
    }

    fn get_request_body(
        &self,
        _flow: Flow,
        params: &ParameterSet,
    ) -> CustomResult<RequestContent, ConnectorError> {
        Ok(transformers::AprovaFacilRequest::from(params).into())
    }

    fn handle_response(
        &self,
        flow: Flow,
        body: &[u8],
    ) -> CustomResult<OperationResult, ConnectorError> {
        let result = transformers::parse_response(body)?;
        tracing::debug!(
            %flow,
            result_message = result.get_str(transformers::message_key(flow, self.mode())),
            "gateway answered"
        );
        Ok(result)
    }
}
