use common_utils::CustomResult;
use error_stack::ResultExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::config::{Log, LogFormat};
use crate::error::ConfigurationError;

/// Installs the global subscriber described by `config`.
///
/// Does nothing when console logging is disabled. Fails if a global subscriber
/// is already installed.
pub fn setup(config: &Log) -> CustomResult<(), ConfigurationError> {
    let console = &config.console;
    if !console.enabled {
        return Ok(());
    }

    let directive = console.directive();
    let filter = EnvFilter::try_new(&directive)
        .change_context(ConfigurationError::LoggerInitFailed)
        .attach_printable_lazy(|| format!("invalid filtering directive {directive:?}"))?;

    let registry = tracing_subscriber::registry().with(filter);
    match console.log_format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Default => registry.with(fmt::layer().pretty()).try_init(),
    }
    .change_context(ConfigurationError::LoggerInitFailed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logger::config::LogConsole;

    #[test]
    fn disabled_console_installs_nothing() {
        assert!(setup(&Log::default()).is_ok());
    }

    #[test]
    fn invalid_directive_is_rejected() {
        let config = Log {
            console: LogConsole {
                enabled: true,
                filtering_directive: Some("aprovafacil=notalevel".to_string()),
                ..Default::default()
            },
        };
        let err = setup(&config).unwrap_err();
        assert!(matches!(
            err.current_context(),
            ConfigurationError::LoggerInitFailed
        ));
    }
}
