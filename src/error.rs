use thiserror::Error;

/// Reasons a transcript is rejected before any remote call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Transcript cannot be empty")]
    EmptyInput,
    #[error("Transcript too short for meaningful analysis ({length} < {minimum} characters)")]
    TooShort { length: usize, minimum: usize },
}

/// Failures of the remote language model capability
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request never produced an HTTP response (DNS, connect, timeout, body read)
    #[error("Language model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status
    #[error("Language model API error: {status} - {body}")]
    Status { status: u16, body: String },
    /// The response body could not be interpreted
    #[error("Malformed language model response: {0}")]
    Malformed(String),
    /// The response was well-formed but carried no usable text
    #[error("Language model returned an empty {field}")]
    Empty { field: &'static str },
}

/// Failures of the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record store I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Record store CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Record store is unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::EmptyInput.to_string(),
            "Transcript cannot be empty"
        );
        let err = ValidationError::TooShort {
            length: 4,
            minimum: 10,
        };
        assert!(err.to_string().contains("4 < 10"));
    }

    #[test]
    fn test_model_status_message() {
        let err = ModelError::Status {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Language model API error: 429 - rate limited"
        );
    }
}
