use std::{
    collections::HashMap,
    str::FromStr,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use common_utils::{
    request::{Headers, Method, Request, RequestContent},
    CustomResult,
};
use domain_types::{
    connector_flow::Flow,
    errors::{ApiClientError, ConnectorError},
    router_request_types::ParameterSet,
    router_response_types::OperationResult,
    types::Proxy,
};
use error_stack::{report, ResultExt};
use interfaces::{connector_integration::ConnectorIntegration, transport::ConnectorTransport};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::field::Empty;

/// Runs one gateway flow: local validation, request building, the round trip
/// and response handling.
///
/// Validation failures short-circuit before the endpoint URL is even looked up,
/// so a rejected call never touches the transport.
#[tracing::instrument(
    name = "execute_connector_processing_step",
    skip_all,
    fields(
        connector = connector.id(),
        flow = %flow,
        request.url = Empty,
        request.method = Empty,
        request.body = Empty,
        response.body = Empty,
        message_ = "Golden Log Line (outgoing)",
        latency = Empty,
    )
)]
pub fn execute_connector_processing_step<C, T>(
    transport: &T,
    connector: &C,
    flow: Flow,
    params: &ParameterSet,
) -> CustomResult<OperationResult, ConnectorError>
where
    C: ConnectorIntegration + ?Sized,
    T: ConnectorTransport + ?Sized,
{
    if let Some(rejected) = validate_connector_request(connector, flow, params) {
        return Ok(rejected);
    }

    let start = std::time::Instant::now();
    let request = connector.build_request(flow, params)?;

    let masked_request = request
        .body
        .as_ref()
        .map(RequestContent::masked_serialize)
        .unwrap_or(Value::Null);
    tracing::Span::current().record("request.url", tracing::field::display(&request.url));
    tracing::Span::current().record("request.method", tracing::field::display(request.method));
    tracing::Span::current().record("request.body", tracing::field::display(&masked_request));

    let body = transport
        .send(request)
        .inspect_err(|err| {
            error_log(
                Tag::OutgoingApi,
                &json!(format!(
                    "Failed getting response from connector. Error: {:?}",
                    err
                )),
            );
        })
        .change_context(ConnectorError::ProcessingStepFailed(Some(format!(
            "{flow} call to {} failed",
            connector.id()
        ))))?;
    tracing::Span::current().record(
        "response.body",
        tracing::field::display(String::from_utf8_lossy(&body)),
    );

    let result = connector.handle_response(flow, &body);

    tracing::Span::current().record("latency", start.elapsed().as_millis());
    tracing::info!(tag = ?Tag::OutgoingApi, log_type = "api", "Outgoing Request completed");
    result
}

/// Runs the connector's local checks on `params`.
///
/// `Some` carries the rejection to hand back in place of a gateway answer. No
/// configuration is needed, so callers can reject a request before loading one.
pub fn validate_connector_request<C>(
    connector: &C,
    flow: Flow,
    params: &ParameterSet,
) -> Option<OperationResult>
where
    C: ConnectorIntegration + ?Sized,
{
    let validation_errors = connector.validate_request(flow, params);
    if validation_errors.is_empty() {
        return None;
    }
    info_log(
        Tag::LocalValidation,
        &json!({
            "flow": flow.to_string(),
            "errors": validation_errors,
        }),
    );
    Some(OperationResult::validation_failed(validation_errors))
}

/// Blocking HTTP transport backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    proxy: Proxy,
}

impl HttpTransport {
    pub fn new(proxy: Proxy) -> Self {
        Self { proxy }
    }
}

impl ConnectorTransport for HttpTransport {
    fn send(&self, request: Request) -> CustomResult<Vec<u8>, ApiClientError> {
        call_connector_api(&self.proxy, request)
    }
}

pub fn call_connector_api(
    proxy: &Proxy,
    request: Request,
) -> CustomResult<Vec<u8>, ApiClientError> {
    let url =
        reqwest::Url::parse(&request.url).change_context(ApiClientError::UrlEncodingFailed)?;

    let should_bypass_proxy = proxy.bypass_proxy_urls.contains(&url.to_string());

    let client = get_base_client(proxy, should_bypass_proxy)?;

    let headers = request.headers.construct_header_map()?;

    let request = match request.method {
        Method::Get => client.get(url),
        Method::Post => {
            let client = client.post(url);
            match request.body {
                Some(content) => client.body(
                    content
                        .get_inner_value()
                        .change_context(ApiClientError::UrlEncodingFailed)?,
                ),
                None => client,
            }
        }
    }
    .add_headers(headers);

    let response = request.send().map_err(|error| {
        let api_error = match error {
            error if error.is_timeout() => ApiClientError::RequestTimeoutReceived,
            _ => ApiClientError::RequestNotSent(error.to_string()),
        };
        info_log(
            Tag::OutgoingApi,
            &json!("Unable to send request to connector."),
        );
        report!(api_error)
    })?;

    handle_response(response)
}

/// The client settings a pooled client was built with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    http_proxy: Option<String>,
    https_proxy: Option<String>,
    idle_pool_connection_timeout: Option<u64>,
}

impl ClientKey {
    fn new(proxy_config: &Proxy, should_bypass_proxy: bool) -> Self {
        let proxied = proxy_config.is_proxy_configured(should_bypass_proxy);
        Self {
            http_proxy: proxy_config.http_url.clone().filter(|_| proxied),
            https_proxy: proxy_config.https_url.clone().filter(|_| proxied),
            idle_pool_connection_timeout: proxy_config.idle_pool_connection_timeout,
        }
    }
}

// One client per distinct proxy setup, shared by every session using it.
static CLIENTS: Lazy<Mutex<HashMap<ClientKey, Client>>> = Lazy::new(Default::default);

fn get_base_client(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
) -> CustomResult<Client, ApiClientError> {
    let key = ClientKey::new(proxy_config, should_bypass_proxy);
    let mut clients = CLIENTS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(client) = clients.get(&key) {
        return Ok(client.clone());
    }

    let client = get_client_builder(proxy_config, should_bypass_proxy)?
        .build()
        .change_context(ApiClientError::ClientConstructionFailed)
        .inspect_err(|err| {
            error_log(
                Tag::General,
                &json!(format!("Failed to construct base client. Error: {:?}", err)),
            );
        })?;
    clients.insert(key, client.clone());
    Ok(client)
}

fn get_client_builder(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
) -> CustomResult<reqwest::blocking::ClientBuilder, ApiClientError> {
    let mut client_builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_idle_timeout(Duration::from_secs(
            proxy_config
                .idle_pool_connection_timeout
                .unwrap_or_default(),
        ));

    if should_bypass_proxy {
        return Ok(client_builder);
    }

    // Proxy all HTTPS traffic through the configured HTTPS proxy
    if let Some(url) = proxy_config.https_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::https(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    error_log(
                        Tag::General,
                        &json!(format!("HTTPS proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    // Proxy all HTTP traffic through the configured HTTP proxy
    if let Some(url) = proxy_config.http_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::http(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    error_log(
                        Tag::General,
                        &json!(format!("HTTP proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    Ok(client_builder)
}

/// Hands back the raw body of a successful answer. Decoding is left to the
/// connector, which knows the document's declared encoding.
fn handle_response(
    response: reqwest::blocking::Response,
) -> CustomResult<Vec<u8>, ApiClientError> {
    let status_code = response.status().as_u16();
    match status_code {
        200..=202 | 204 | 302 => {
            let bytes = response
                .bytes()
                .change_context(ApiClientError::ResponseDecodingFailed)?;
            Ok(bytes.to_vec())
        }
        400..=599 => {
            let bytes = response
                .bytes()
                .change_context(ApiClientError::ResponseDecodingFailed)?;
            let body = String::from_utf8_lossy(&bytes).into_owned();
            error_log(
                Tag::IncomingApi,
                &json!({ "status_code": status_code, "body": body }),
            );
            Err(report!(ApiClientError::ErrorStatusReceived { status_code })
                .attach_printable(body))
        }
        _ => {
            info_log(
                Tag::IncomingApi,
                &json!("Unexpected response from server."),
            );
            Err(report!(ApiClientError::UnexpectedServerResponse))
        }
    }
}

pub(super) trait HeaderExt {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError>;
}

impl HeaderExt for Headers {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError> {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        self.into_iter().try_fold(
            HeaderMap::new(),
            |mut header_map, (header_name, header_value)| {
                let header_name = HeaderName::from_str(&header_name)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                let header_value = header_value.into_inner();
                let header_value = HeaderValue::from_str(&header_value)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                header_map.append(header_name, header_value);
                Ok(header_map)
            },
        )
    }
}

pub(super) trait RequestBuilderExt {
    fn add_headers(self, headers: reqwest::header::HeaderMap) -> Self;
}

impl RequestBuilderExt for reqwest::blocking::RequestBuilder {
    fn add_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self = self.headers(headers);
        self
    }
}

#[derive(Debug, Default, serde::Deserialize, Clone, Copy, strum::EnumString)]
pub enum Tag {
    /// General.
    #[default]
    General,
    /// Request rejected before leaving the process.
    LocalValidation,
    /// Api Outgoing Request
    OutgoingApi,
    /// Incoming response
    IncomingApi,
}

#[inline]
pub fn info_log(tag: Tag, message: &Value) {
    tracing::info!(tags = ?tag, json_value = %message);
}

#[inline]
pub fn error_log(tag: Tag, message: &Value) {
    tracing::error!(tags = ?tag, json_value = %message);
}
