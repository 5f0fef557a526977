use serde::{Deserialize, Serialize};

/// The `[<environment>.log]` table.
#[derive(Debug, Default, Deserialize, Clone, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Log {
    pub console: LogConsole,
}

/// Console sink. Off unless the environment turns it on.
#[derive(Debug, Default, Deserialize, Clone, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConsole {
    pub enabled: bool,
    pub level: Level,
    pub log_format: LogFormat,
    /// `EnvFilter` directive such as `aprovafacil_client=debug,external_services=info`.
    /// Takes precedence over `level`.
    pub filtering_directive: Option<String>,
}

impl LogConsole {
    /// The `EnvFilter` directive this console logs with.
    pub fn directive(&self) -> String {
        self.filtering_directive
            .clone()
            .unwrap_or_else(|| self.level.into_level().as_str().to_lowercase())
    }
}

/// A `tracing` level read from its name, in any case (`"debug"`, `"DEBUG"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level(pub(super) tracing::Level);

impl Level {
    pub fn into_level(&self) -> tracing::Level {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Self(tracing::Level::INFO)
    }
}

impl Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use std::str::FromStr as _;

        let name = String::deserialize(deserializer)?;
        tracing::Level::from_str(&name)
            .map(Level)
            .map_err(|_| serde::de::Error::custom(format!("unknown log level {name:?}")))
    }
}

/// `json` for log shippers, `default` for a human at a terminal.
#[derive(Default, Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Default,
    #[default]
    Json,
}
