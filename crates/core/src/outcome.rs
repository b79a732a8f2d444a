//! Terminal result of a single machine operation.

use crate::error::DispenseError;

/// What the caller gets back from a prepare or refill request.
///
/// Created fresh per operation and never partially successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    success: bool,
    message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DispenseError> for Outcome {
    fn from(value: DispenseError) -> Self {
        Outcome::error(value.to_string())
    }
}

impl core::fmt::Display for Outcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}
