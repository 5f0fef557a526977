use std::path::{Path, PathBuf};

use common_utils::CustomResult;
use connector_integration::connectors::{aprovafacil::transformers, AprovaFacil};
use domain_types::{
    connector_flow::Flow,
    errors::ConnectorError,
    router_request_types::ParameterSet,
    router_response_types::OperationResult,
    types::{AprovaFacilParams, Mode},
};
use error_stack::{report, ResultExt};
use external_services::{
    execute_connector_processing_step, validate_connector_request, HttpTransport,
};
use interfaces::transport::ConnectorTransport;
use once_cell::sync::OnceCell;

use crate::{
    configs::{self, Config, DEFAULT_ENVIRONMENT},
    error::ConfigurationError,
    logger,
};

#[derive(Debug, Clone)]
enum ConfigSource {
    File { path: PathBuf, environment: String },
    InMemory,
}

/// One caller's conversation with the gateway.
///
/// Keeps the last authorize, confirm and cancel results so the outcome
/// predicates can be asked after the fact. Not meant to be shared between
/// threads; every call that talks to the gateway takes `&mut self`.
pub struct ClientSession {
    source: ConfigSource,
    config: OnceCell<Config>,
    transport: Option<Box<dyn ConnectorTransport>>,
    authorize_result: Option<OperationResult>,
    confirm_result: Option<OperationResult>,
    cancel_result: Option<OperationResult>,
    last_response: Option<OperationResult>,
    transaction: Option<String>,
    error_message: Option<String>,
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("source", &self.source)
            .field("config", &self.config.get())
            .field("custom_transport", &self.transport.is_some())
            .field("transaction", &self.transaction)
            .field("error_message", &self.error_message)
            .finish_non_exhaustive()
    }
}

impl ClientSession {
    /// Session over the `test` environment of a configuration file.
    pub fn new(config_path: impl AsRef<Path>) -> CustomResult<Self, ConfigurationError> {
        Self::with_environment(config_path, DEFAULT_ENVIRONMENT)
    }

    /// Session over one environment of a configuration file.
    ///
    /// The file must exist. It is only parsed on first use.
    pub fn with_environment(
        config_path: impl AsRef<Path>,
        environment: &str,
    ) -> CustomResult<Self, ConfigurationError> {
        let path = configs::validate_config_path(config_path.as_ref())?;
        Ok(Self::from_source(
            ConfigSource::File {
                path,
                environment: environment.to_string(),
            },
            OnceCell::new(),
        ))
    }

    /// Session over an already-built connector configuration.
    pub fn from_params(params: AprovaFacilParams) -> Self {
        Self::from_source(ConfigSource::InMemory, OnceCell::with_value(params.into()))
    }

    fn from_source(source: ConfigSource, config: OnceCell<Config>) -> Self {
        Self {
            source,
            config,
            transport: None,
            authorize_result: None,
            confirm_result: None,
            cancel_result: None,
            last_response: None,
            transaction: None,
            error_message: None,
        }
    }

    /// Replaces the HTTP transport, e.g. with a recording one in tests.
    #[must_use]
    pub fn with_transport(mut self, transport: impl ConnectorTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn config_path(&self) -> Option<&Path> {
        match &self.source {
            ConfigSource::File { path, .. } => Some(path),
            ConfigSource::InMemory => None,
        }
    }

    pub fn environment(&self) -> &str {
        match &self.source {
            ConfigSource::File { environment, .. } => environment,
            ConfigSource::InMemory => DEFAULT_ENVIRONMENT,
        }
    }

    /// The configuration of this session's environment, parsed once.
    pub fn config(&self) -> CustomResult<&Config, ConfigurationError> {
        self.config.get_or_try_init(|| match &self.source {
            ConfigSource::File { path, environment } => {
                Config::new_with_config_path(path, environment)
            }
            ConfigSource::InMemory => Ok(Config::default()),
        })
    }

    pub fn mode(&self) -> CustomResult<Mode, ConnectorError> {
        Ok(self.connector_config()?.mode)
    }

    pub fn is_cgi_mode(&self) -> CustomResult<bool, ConnectorError> {
        Ok(self.mode()? == Mode::Cgi)
    }

    fn connector_config(&self) -> CustomResult<&Config, ConnectorError> {
        self.config()
            .change_context(ConnectorError::InvalidConnectorConfig {
                config: "aprovafacil",
            })
    }

    fn execute(
        &self,
        flow: Flow,
        params: &ParameterSet,
    ) -> CustomResult<OperationResult, ConnectorError> {
        // Field checks never depend on the configuration.
        if let Some(rejected) = validate_connector_request(&AprovaFacil::default(), flow, params)
        {
            return Ok(rejected);
        }

        let config = self.connector_config()?;
        let connector = AprovaFacil::new(config.connector_params());
        match self.transport.as_deref() {
            Some(transport) => {
                execute_connector_processing_step(transport, &connector, flow, params)
            }
            None => {
                let transport = HttpTransport::new(config.proxy.clone());
                execute_connector_processing_step(&transport, &connector, flow, params)
            }
        }
    }

    /// Authorizes a transaction (APC).
    ///
    /// Validation failures come back inside the result and nothing is sent.
    pub fn apc(&self, params: &ParameterSet) -> CustomResult<OperationResult, ConnectorError> {
        self.execute(Flow::Authorize, params)
    }

    /// Confirms a transaction (CAP).
    pub fn cap(&self, params: &ParameterSet) -> CustomResult<OperationResult, ConnectorError> {
        self.execute(Flow::Capture, params)
    }

    /// Cancels a transaction (CAN).
    pub fn can(&self, params: &ParameterSet) -> CustomResult<OperationResult, ConnectorError> {
        self.execute(Flow::Void, params)
    }

    /// Authorizes and records the outcome. Returns whether the gateway approved.
    pub fn approve(&mut self, params: &ParameterSet) -> CustomResult<bool, ConnectorError> {
        let result = self.apc(params)?;
        let approved = transformers::is_approved(&result);

        self.transaction = result
            .get_str(transformers::TRANSACTION_KEY)
            .map(ToString::to_string);
        self.error_message = if approved {
            None
        } else {
            failure_message(&result, Flow::Authorize, Mode::Webservice)
        };
        self.record(Flow::Authorize, result);
        Ok(approved)
    }

    /// Confirms and records the outcome. Returns whether the gateway confirmed.
    pub fn confirm(&mut self, params: &ParameterSet) -> CustomResult<bool, ConnectorError> {
        let result = self.cap(params)?;
        let mode = self.mode()?;
        let confirmed = transformers::is_confirmed(&result, mode);

        self.error_message = if confirmed {
            None
        } else {
            failure_message(&result, Flow::Capture, mode)
        };
        self.record(Flow::Capture, result);
        Ok(confirmed)
    }

    /// Cancels and records the outcome.
    ///
    /// Returns true when the transaction was cancelled or queued for cancellation.
    pub fn cancel(&mut self, params: &ParameterSet) -> CustomResult<bool, ConnectorError> {
        let result = self.can(params)?;
        let cancelled = transformers::is_cancelled(&result)
            || transformers::is_marked_for_cancellation(&result);

        self.error_message = if cancelled {
            None
        } else {
            failure_message(&result, Flow::Void, Mode::Webservice)
        };
        self.record(Flow::Void, result);
        Ok(cancelled)
    }

    fn record(&mut self, flow: Flow, result: OperationResult) {
        logger::info!(
            %flow,
            error = self.error_message.as_deref(),
            transaction = self.transaction.as_deref(),
            "recorded gateway outcome"
        );
        self.last_response = Some(result.clone());
        match flow {
            Flow::Authorize => self.authorize_result = Some(result),
            Flow::Capture => self.confirm_result = Some(result),
            Flow::Void => self.cancel_result = Some(result),
        }
    }

    fn result_of(&self, flow: Flow) -> CustomResult<&OperationResult, ConnectorError> {
        match flow {
            Flow::Authorize => self.authorize_result.as_ref(),
            Flow::Capture => self.confirm_result.as_ref(),
            Flow::Void => self.cancel_result.as_ref(),
        }
        .ok_or_else(|| report!(ConnectorError::FlowNotExecuted { flow }))
    }

    /// Whether the last authorization was approved. Fails before [`Self::approve`].
    pub fn is_approved(&self) -> CustomResult<bool, ConnectorError> {
        self.result_of(Flow::Authorize).map(transformers::is_approved)
    }

    /// Whether the last confirmation succeeded. Fails before [`Self::confirm`].
    pub fn is_confirmed(&self) -> CustomResult<bool, ConnectorError> {
        let result = self.result_of(Flow::Capture)?;
        Ok(transformers::is_confirmed(result, self.mode()?))
    }

    /// Whether the last cancellation was applied. Fails before [`Self::cancel`].
    pub fn is_cancelled(&self) -> CustomResult<bool, ConnectorError> {
        self.result_of(Flow::Void).map(transformers::is_cancelled)
    }

    /// Whether the last cancellation was queued for sending. Fails before [`Self::cancel`].
    pub fn is_marked_for_cancellation(&self) -> CustomResult<bool, ConnectorError> {
        self.result_of(Flow::Void)
            .map(transformers::is_marked_for_cancellation)
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn transaction(&self) -> Option<&str> {
        self.transaction.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn last_response(&self) -> Option<&OperationResult> {
        self.last_response.as_ref()
    }
}

/// The gateway's own message for a call that did not succeed.
///
/// Locally rejected calls carry no gateway message.
fn failure_message(result: &OperationResult, flow: Flow, mode: Mode) -> Option<String> {
    result
        .get_str(transformers::message_key(flow, mode))
        .map(ToString::to_string)
}
