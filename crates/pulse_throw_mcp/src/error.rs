//! Error types for the MCP server.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("API error: {0}")]
    Api(#[from] pulse_throw_client::PulseError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<McpError> for String {
    fn from(err: McpError) -> Self {
        err.to_string()
    }
}

/// Result type alias for MCP operations.
pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_throw_client::{PulseError, WorkloadError};

    #[test]
    fn workload_errors_surface_through_api_variant() {
        let err: McpError = PulseError::from(WorkloadError::DivisionUndefined).into();
        let msg: String = err.into();
        assert!(msg.starts_with("API error: "));
        assert!(msg.contains("chronic workload is zero"));
    }

    #[test]
    fn validation_message() {
        let msg: String = McpError::Validation("bad date".into()).into();
        assert_eq!(msg, "Validation error: bad date");
    }
}
