use std::path::{Path, PathBuf};

use common_utils::CustomResult;
use domain_types::types::{AprovaFacilParams, Mode, Proxy};
use error_stack::{report, ResultExt};

use crate::{error::ConfigurationError, logger::config::Log};

/// Prefix of the environment variables overriding file values,
/// e.g. `APROVAFACIL__PRODUCTION__APC_URL`.
pub const ENV_PREFIX: &str = "APROVAFACIL";

pub const DEFAULT_ENVIRONMENT: &str = "test";

/// The configuration table of one environment.
#[derive(Clone, serde::Deserialize, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub mode: Mode,
    pub apc_url: Option<String>,
    pub cap_url: Option<String>,
    pub can_url: Option<String>,
    #[serde(default)]
    pub proxy: Proxy,
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Reads the `environment` table of the file at `config_path`, applying
    /// environment-variable overrides.
    pub fn new_with_config_path(
        config_path: &Path,
        environment: &str,
    ) -> CustomResult<Self, ConfigurationError> {
        let source = config::Config::builder()
            .add_source(config::File::from(config_path.to_path_buf()).required(true))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key(&format!("{environment}.proxy.bypass_proxy_urls")),
            )
            .build()
            .change_context(ConfigurationError::ConfigParsingFailed)
            .attach_printable_lazy(|| config_path.display().to_string())?;

        let table = match source.get::<config::Value>(environment) {
            Ok(table) => table,
            Err(config::ConfigError::NotFound(_)) => {
                return Err(report!(ConfigurationError::EnvironmentNotFound {
                    environment: environment.to_string(),
                }))
            }
            Err(error) => {
                return Err(report!(error).change_context(ConfigurationError::ConfigParsingFailed))
            }
        };

        let config: Self = serde_path_to_error::deserialize(table)
            .change_context(ConfigurationError::ConfigParsingFailed)
            .attach_printable_lazy(|| format!("in environment {environment:?}"))?;

        tracing::debug!(
            environment,
            mode = %config.mode,
            path = %config_path.display(),
            "loaded gateway configuration"
        );
        Ok(config)
    }

    pub fn connector_params(&self) -> AprovaFacilParams {
        AprovaFacilParams {
            mode: self.mode,
            apc_url: self.apc_url.clone(),
            cap_url: self.cap_url.clone(),
            can_url: self.can_url.clone(),
            proxy: self.proxy.clone(),
        }
    }
}

impl From<AprovaFacilParams> for Config {
    fn from(params: AprovaFacilParams) -> Self {
        let AprovaFacilParams {
            mode,
            apc_url,
            cap_url,
            can_url,
            proxy,
        } = params;
        Self {
            mode,
            apc_url,
            cap_url,
            can_url,
            proxy,
            log: Log::default(),
        }
    }
}

/// Checks that a session can be pointed at `config_path`.
pub fn validate_config_path(config_path: &Path) -> CustomResult<PathBuf, ConfigurationError> {
    if config_path.as_os_str().is_empty() {
        return Err(report!(ConfigurationError::MissingConfigPath));
    }
    if !config_path.is_file() {
        return Err(report!(ConfigurationError::ConfigFileNotFound(
            config_path.to_path_buf()
        )));
    }
    Ok(config_path.to_path_buf())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::io::Write;

    use domain_types::connector_flow::Flow;

    use super::*;

    const CONFIG: &str = r#"
[test]
mode = "webservice"
apc_url = "http://teste.aprovafacil.com/cgi-bin/APFW/usuario/APC"
cap_url = "http://teste.aprovafacil.com/cgi-bin/APFW/usuario/CAP"

[development]
mode = "cgi"
can_url = "http://teste.aprovafacil.com/cgi-bin/APFW/usuario/CAN"

[development.proxy]
https_url = "https://proxy.local:3128"
bypass_proxy_urls = ["http://localhost/"]

[development.log.console]
enabled = true
level = "DEBUG"
log_format = "default"
"#;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temporary config file");
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_the_requested_environment() {
        let file = config_file(CONFIG);

        let test = Config::new_with_config_path(file.path(), "test").unwrap();
        assert_eq!(test.mode, Mode::Webservice);
        assert_eq!(
            test.apc_url.as_deref(),
            Some("http://teste.aprovafacil.com/cgi-bin/APFW/usuario/APC")
        );
        assert_eq!(test.can_url, None);
        assert!(!test.log.console.enabled);

        let development = Config::new_with_config_path(file.path(), "development").unwrap();
        assert_eq!(development.mode, Mode::Cgi);
        assert_eq!(
            development.proxy.https_url.as_deref(),
            Some("https://proxy.local:3128")
        );
        assert_eq!(development.proxy.bypass_proxy_urls, vec!["http://localhost/"]);
        assert!(development.log.console.enabled);
        assert_eq!(
            development.log.console.level.into_level(),
            tracing::Level::DEBUG
        );
        assert!(development.connector_params().is_cgi_mode());
    }

    #[test]
    fn bundled_config_defines_every_endpoint() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/aprovafacil.toml");
        for environment in ["test", "production"] {
            let params = Config::new_with_config_path(&path, environment)
                .unwrap()
                .connector_params();
            assert_eq!(params.mode, Mode::Webservice);
            for flow in [Flow::Authorize, Flow::Capture, Flow::Void] {
                assert!(params.endpoint(flow).is_some(), "{environment} lacks {flow}");
            }
        }
    }

    #[test]
    fn unknown_environment_is_reported() {
        let file = config_file(CONFIG);
        let err = Config::new_with_config_path(file.path(), "production").unwrap_err();
        assert!(matches!(
            err.current_context(),
            ConfigurationError::EnvironmentNotFound { environment } if environment == "production"
        ));
    }

    #[test]
    fn unparsable_file_is_reported() {
        let file = config_file("[test]\nmode = \"ftp\"\n");
        let err = Config::new_with_config_path(file.path(), "test").unwrap_err();
        assert!(matches!(
            err.current_context(),
            ConfigurationError::ConfigParsingFailed
        ));
    }

    #[test]
    fn config_path_must_exist() {
        assert!(matches!(
            validate_config_path(Path::new("")).unwrap_err().current_context(),
            ConfigurationError::MissingConfigPath
        ));

        let missing = Path::new("/tmp/config-file-that-does-not-exists.toml");
        let err = validate_config_path(missing).unwrap_err();
        assert_eq!(
            err.current_context().to_string(),
            "No such file or directory - /tmp/config-file-that-does-not-exists.toml"
        );

        let file = config_file(CONFIG);
        assert_eq!(validate_config_path(file.path()).unwrap(), file.path());
    }
}
