use common_utils::{
    request::{FormFields, RequestContent},
    CustomResult,
};
use domain_types::{
    connector_flow::Flow,
    errors::ConnectorError,
    router_request_types::{FieldName, ParameterSet},
    router_response_types::OperationResult,
    types::Mode,
};
use hyperswitch_masking::{Maskable, Secret};
use serde_json::{Map, Value};

use crate::utils::{
    validation::{FieldRule, LengthBound},
    xml_utils,
};

// ===== RESPONSE KEYS =====

pub const APPROVED_KEY: &str = "TransacaoAprovada";
pub const TRANSACTION_KEY: &str = "Transacao";
pub const APPROVAL_MESSAGE_KEY: &str = "ResultadoSolicitacaoAprovacao";
pub const CONFIRMATION_MESSAGE_KEY: &str = "ResultadoSolicitacaoConfirmacao";
pub const CANCELLATION_MESSAGE_KEY: &str = "ResultadoSolicitacaoCancelamento";

/// Result messages are `%20`-separated words.
const MESSAGE_SEPARATOR: &str = "%20";

// ===== VALIDATION RULES =====

pub const CARD_BRANDS: &[&str] = &[
    "VISA",
    "MASTERCARD",
    "DINERS",
    "AMEX",
    "HIPERCARD",
    "JCB",
    "SOROCRED",
    "AURA",
];

const AUTHORIZE_RULES: &[FieldRule] = &[
    FieldRule::presence(FieldName::ValueAmount),
    FieldRule::presence(FieldName::InstallmentCount),
    FieldRule::length(FieldName::DocumentNumber, LengthBound::Maximum(50)),
    FieldRule::numericality(FieldName::ValueAmount, false),
    FieldRule::numericality(FieldName::InstallmentCount, true),
];

// Skipped when authorizing against a prior transaction.
const CARD_RULES: &[FieldRule] = &[
    FieldRule::presence(FieldName::CardNumber),
    FieldRule::presence(FieldName::ExpiryMonth),
    FieldRule::presence(FieldName::ExpiryYear),
    FieldRule::presence(FieldName::SecurityCode),
    FieldRule::presence(FieldName::BuyerIpAddress),
    FieldRule::length(FieldName::CardholderName, LengthBound::Maximum(50)),
    FieldRule::length(FieldName::CardNumber, LengthBound::Maximum(19)),
    FieldRule::inclusion(FieldName::CardBrand, CARD_BRANDS),
];

/// The rules that apply to a flow, given which optional fields were supplied.
pub fn rules_for(flow: Flow, params: &ParameterSet) -> Vec<FieldRule> {
    match flow {
        Flow::Authorize => {
            let mut rules = AUTHORIZE_RULES.to_vec();
            if !params.contains(FieldName::PriorTransaction) {
                rules.extend_from_slice(CARD_RULES);
            }
            rules
        }
        // Either identifier is enough to find the transaction.
        Flow::Capture | Flow::Void => {
            let mut rules = Vec::with_capacity(2);
            if !params.contains(FieldName::TransactionId) {
                rules.push(FieldRule::presence(FieldName::DocumentNumber));
            }
            if !params.contains(FieldName::DocumentNumber) {
                rules.push(FieldRule::presence(FieldName::TransactionId));
            }
            rules
        }
    }
}

// ===== REQUEST =====

/// Form body carrying every supplied field under its wire name.
#[derive(Debug, Clone, PartialEq)]
pub struct AprovaFacilRequest {
    fields: FormFields,
}

impl From<&ParameterSet> for AprovaFacilRequest {
    fn from(params: &ParameterSet) -> Self {
        let fields = params
            .iter()
            .map(|(field, value)| {
                let value = value.to_string();
                let value = if field.is_sensitive() {
                    Maskable::new_masked(Secret::new(value))
                } else {
                    Maskable::new_normal(value)
                };
                (field.to_string(), value)
            })
            .collect();
        Self { fields }
    }
}

impl From<AprovaFacilRequest> for RequestContent {
    fn from(request: AprovaFacilRequest) -> Self {
        Self::FormUrlEncoded(request.fields)
    }
}

// ===== RESPONSE =====

/// A decoded and trimmed gateway answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AprovaFacilResponse(Map<String, Value>);

impl TryFrom<&[u8]> for AprovaFacilResponse {
    type Error = error_stack::Report<ConnectorError>;

    fn try_from(body: &[u8]) -> Result<Self, Self::Error> {
        let document = xml_utils::decode_xml(body)?;
        match xml_utils::normalize(Value::Object(document)) {
            Value::Object(document) => Ok(Self(document)),
            _ => Err(error_stack::report!(
                ConnectorError::ResponseDeserializationFailed
            )),
        }
    }
}

impl From<AprovaFacilResponse> for OperationResult {
    fn from(response: AprovaFacilResponse) -> Self {
        Self::from_response(response.0)
    }
}

pub fn parse_response(body: &[u8]) -> CustomResult<OperationResult, ConnectorError> {
    AprovaFacilResponse::try_from(body).map(OperationResult::from)
}

// ===== RESULT CLASSIFICATION =====

/// Key of the human-readable result message for a flow.
///
/// CGI accounts answer a confirmation with the approval message key.
pub fn message_key(flow: Flow, mode: Mode) -> &'static str {
    match (flow, mode) {
        (Flow::Authorize, _) | (Flow::Capture, Mode::Cgi) => APPROVAL_MESSAGE_KEY,
        (Flow::Capture, Mode::Webservice) => CONFIRMATION_MESSAGE_KEY,
        (Flow::Void, _) => CANCELLATION_MESSAGE_KEY,
    }
}

fn message_starts_with(result: &OperationResult, key: &str, expected: &[&str]) -> bool {
    let Some(message) = result.get_str(key) else {
        return false;
    };
    let mut tokens = message.split(MESSAGE_SEPARATOR);
    expected
        .iter()
        .all(|expected| tokens.next() == Some(*expected))
}

pub fn is_approved(result: &OperationResult) -> bool {
    result.get_str(APPROVED_KEY) == Some("True")
}

pub fn is_confirmed(result: &OperationResult, mode: Mode) -> bool {
    message_starts_with(result, message_key(Flow::Capture, mode), &["Confirmado"])
}

pub fn is_cancelled(result: &OperationResult) -> bool {
    message_starts_with(result, CANCELLATION_MESSAGE_KEY, &["Cancelado"])
}

/// The cancellation was accepted and queued rather than applied immediately.
pub fn is_marked_for_cancellation(result: &OperationResult) -> bool {
    message_starts_with(
        result,
        CANCELLATION_MESSAGE_KEY,
        &["Cancelamento", "marcado", "para", "envio"],
    )
}
