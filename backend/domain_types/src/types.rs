use serde::{Deserialize, Serialize};

use crate::connector_flow::Flow;

/// How the gateway account is integrated.
///
/// The CGI endpoints answer a confirmation with the approval-result key
/// instead of the confirmation-result key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Webservice,
    Cgi,
}

/// Connector configuration for one environment.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct AprovaFacilParams {
    #[serde(default)]
    pub mode: Mode,
    /// Authorize endpoint
    pub apc_url: Option<String>,
    /// Confirm endpoint
    pub cap_url: Option<String>,
    /// Cancel endpoint
    pub can_url: Option<String>,
    #[serde(default)]
    pub proxy: Proxy,
}

impl AprovaFacilParams {
    pub fn endpoint(&self, flow: Flow) -> Option<&str> {
        match flow {
            Flow::Authorize => self.apc_url.as_deref(),
            Flow::Capture => self.cap_url.as_deref(),
            Flow::Void => self.can_url.as_deref(),
        }
        .filter(|url| !url.trim().is_empty())
    }

    pub fn is_cgi_mode(&self) -> bool {
        self.mode == Mode::Cgi
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct Proxy {
    pub http_url: Option<String>,
    pub https_url: Option<String>,
    pub idle_pool_connection_timeout: Option<u64>,
    pub bypass_proxy_urls: Vec<String>,
}

impl Proxy {
    pub fn is_proxy_configured(&self, should_bypass_proxy: bool) -> bool {
        !should_bypass_proxy && (self.http_url.is_some() || self.https_url.is_some())
    }
}
