use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors raised while discovering topology or assigning roles.
///
/// Nothing is recovered locally: every variant aborts the bootstrap run and
/// carries enough context to diagnose it without re-running.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("transport error talking to {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{operation}: response envelope has no `data` field")]
    Protocol { operation: String, payload: Value },

    #[error("{operation}: malformed response: {message}")]
    Decode { operation: String, message: String },

    #[error("control plane at {endpoint} is not reachable: {message}")]
    Unreachable { endpoint: String, message: String },

    #[error("role `{role}` is not a known role (known: [{}])", .known_roles.join(", "))]
    UnknownRole { role: String, known_roles: Vec<String> },

    #[error(
        "failed to assign [{}] to {node_uri}: {}",
        .roles.join(", "),
        first_error_message(.payload).unwrap_or("no `join_server` result in response")
    )]
    Assignment {
        roles: Vec<String>,
        node_uri: String,
        payload: Value,
    },

    #[error("control plane reported no servers")]
    EmptyDiscovery,

    #[error("self uri `{self_uri}` is not among discovered servers [{}]", .discovered.join(", "))]
    SelfNotDiscovered {
        self_uri: String,
        discovered: Vec<String>,
    },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl TopologyError {
    /// Raw response payload attached to this error, if the control plane sent one.
    pub fn diagnostic_payload(&self) -> Option<&Value> {
        match self {
            TopologyError::Protocol { payload, .. } | TopologyError::Assignment { payload, .. } => {
                Some(payload)
            }
            _ => None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        TopologyError::Config {
            message: message.into(),
        }
    }
}

/// First `errors[].message` of a response envelope.
pub fn first_error_message(envelope: &Value) -> Option<&str> {
    envelope
        .get("errors")?
        .as_array()?
        .iter()
        .find_map(|e| e.get("message").and_then(Value::as_str))
}
