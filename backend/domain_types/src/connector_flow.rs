use serde::Serialize;

/// The three remote operations exposed by the gateway.
///
/// The `Display` form is the operation code the gateway uses in its URLs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString,
)]
pub enum Flow {
    /// Authorize a card transaction (APC).
    #[strum(serialize = "APC")]
    Authorize,
    /// Confirm a previously authorized transaction (CAP).
    #[strum(serialize = "CAP")]
    Capture,
    /// Cancel a transaction (CAN).
    #[strum(serialize = "CAN")]
    Void,
}

impl Flow {
    /// Name of the configuration key holding this flow's endpoint.
    pub fn endpoint_key(self) -> &'static str {
        match self {
            Self::Authorize => "apc_url",
            Self::Capture => "cap_url",
            Self::Void => "can_url",
        }
    }

    /// Name of the session call that must run before this flow's predicates.
    pub fn session_call(self) -> &'static str {
        match self {
            Self::Authorize => "approve",
            Self::Capture => "confirm",
            Self::Void => "cancel",
        }
    }
}
