use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::ValidationError;

/// Key under which validation failures are reported in an operation result.
pub const VALIDATION_ERRORS_KEY: &str = "ErroValidacao";

/// A decoded gateway document: string leaves, sequences and mappings.
///
/// An element without text or children decodes to an empty mapping, which is
/// not the same as an absent key.
pub type ResponseDocument = Value;

/// Outcome of one gateway operation.
///
/// Either the call never left the process because validation failed, or it
/// carries the normalized gateway response.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    validation_errors: Option<Vec<ValidationError>>,
    response: Map<String, Value>,
}

impl OperationResult {
    /// Result of a call that was rejected locally. No remote call was made.
    pub fn validation_failed(errors: Vec<ValidationError>) -> Self {
        Self {
            validation_errors: Some(errors),
            response: Map::new(),
        }
    }

    /// Result of a call that reached the gateway.
    pub fn from_response(response: Map<String, Value>) -> Self {
        Self {
            validation_errors: None,
            response,
        }
    }

    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        self.validation_errors.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_none()
    }

    /// Looks up a key of the gateway response.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.response.get(key)
    }

    /// Looks up a key of the gateway response holding text.
    ///
    /// Empty elements (`{}`) are present but carry no text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn response(&self) -> &Map<String, Value> {
        &self.response
    }

    /// The merged mapping: the validation slot plus every response key.
    ///
    /// Response keys win on collision.
    pub fn to_document(&self) -> ResponseDocument {
        let mut document = Map::with_capacity(self.response.len() + 1);
        document.insert(
            VALIDATION_ERRORS_KEY.to_string(),
            match &self.validation_errors {
                Some(errors) => Value::Array(
                    errors
                        .iter()
                        .map(|error| {
                            serde_json::json!({
                                "field": error.field.as_ref(),
                                "message": error.kind.to_string(),
                            })
                        })
                        .collect(),
                ),
                None => Value::Null,
            },
        );
        document.extend(self.response.clone());
        Value::Object(document)
    }
}

impl Serialize for OperationResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_document().serialize(serializer)
    }
}
