use thiserror::Error;

/// A frame or payload that does not conform to the event contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Not valid JSON, unknown event name, or a required field is missing
    #[error("malformed event: {0}")]
    Malformed(String),

    /// A required identifier or text field is present but empty
    #[error("field `{field}` cannot be empty")]
    EmptyField { field: &'static str },

    /// A required list is present but has no elements
    #[error("list `{field}` cannot be empty")]
    EmptyList { field: &'static str },
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        ContractError::Malformed(err.to_string())
    }
}
