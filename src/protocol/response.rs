//! Response definitions
//!
//! Represents the reply printed for one command.

/// A reply to one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Lookup hit
    Value(u32),

    /// Lookup miss
    NotFound,

    /// Set applied
    Stored,

    /// Recoverable error; the session continues
    Error(String),
}

impl Response {
    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }

    /// Build the reply for a lookup result
    pub fn lookup(value: Option<u32>) -> Self {
        match value {
            Some(value) => Response::Value(value),
            None => Response::NotFound,
        }
    }
}
