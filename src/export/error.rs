use std::fmt;

/// Error types for export operations
#[derive(Debug)]
pub enum ExportError {
    /// Selection document missing or malformed
    ConfigParse(String),

    /// Invalid input or parameter (e.g. tenant URL)
    InvalidInput(String),

    /// Token request rejected or endpoint not authorized
    Authentication(String),

    /// Jamf Pro API returned an error status
    ProviderApi {
        path: String,
        status: u16,
        message: String,
    },

    /// Response body did not have the expected shape
    UnexpectedResponse { path: String, message: String },

    /// Every enabled resource kind failed to fetch
    NothingFetched { failures: Vec<(String, String)> },

    /// File system operation failed
    FileSystem(String),

    /// General I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::ConfigParse(msg) => {
                write!(f, "Failed to parse configuration: {}", msg)
            }
            ExportError::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            ExportError::Authentication(msg) => {
                write!(f, "Authentication failed: {}", msg)
            }
            ExportError::ProviderApi {
                path,
                status,
                message,
            } => {
                write!(f, "Jamf Pro API error on '{}' (status {})", path, status)?;

                if !message.is_empty() {
                    write!(f, ": {}", message)?;
                }

                Ok(())
            }
            ExportError::UnexpectedResponse { path, message } => {
                write!(f, "Unexpected response from '{}': {}", path, message)
            }
            ExportError::NothingFetched { failures } => {
                write!(
                    f,
                    "No resource kind could be fetched ({} failed)",
                    failures.len()
                )?;

                for (kind, message) in failures {
                    write!(f, "\n  - {}: {}", kind, message)?;
                }

                Ok(())
            }
            ExportError::FileSystem(msg) => {
                write!(f, "File system error: {}", msg)
            }
            ExportError::Io(err) => {
                write!(f, "I/O error: {}", err)
            }
            ExportError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
