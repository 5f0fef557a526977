use serde::Serialize;

use crate::router_request_types::FieldName;

/// Why a field failed validation.
///
/// Serialized with the message symbols callers of the gateway already know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Blank,
    TooShort,
    TooLong,
    WrongLength,
    NotANumber,
    #[serde(rename = "inclusion")]
    #[strum(serialize = "inclusion")]
    NotInSet,
}

/// One field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ValidationError {
    pub field: FieldName,
    #[serde(rename = "message")]
    pub kind: ErrorKind,
}

impl ValidationError {
    pub fn new(field: FieldName, kind: ErrorKind) -> Self {
        Self { field, kind }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.kind)
    }
}
