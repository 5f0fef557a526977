use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("config_file must be a valid file path")]
    MissingConfigPath,
    #[error("No such file or directory - {}", .0.display())]
    ConfigFileNotFound(PathBuf),
    #[error("Environment {environment:?} is not defined in the configuration")]
    EnvironmentNotFound { environment: String },
    #[error("Unable to parse the configuration")]
    ConfigParsingFailed,
    #[error("Unable to initialize the logger")]
    LoggerInitFailed,
}
