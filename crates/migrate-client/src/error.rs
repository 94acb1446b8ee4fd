use migrate_model::ModelError;

/// Errors talking to the remote API
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Request never got a response
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Request URL
        url: String,
        /// Underlying error
        #[source]
        source: reqwest::Error,
    },

    /// API answered with a non-success status
    #[error("{url} returned {status}: {body}")]
    Status {
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// Response body is not a valid document
    #[error(transparent)]
    Decode(#[from] ModelError),

    /// Request body could not be encoded
    #[error("unable to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// HTTP client could not be built
    #[error("unable to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    /// Whether retrying the same request may succeed
    ///
    /// Rate limiting, server errors, timeouts and connection failures are
    /// transient. Everything else is sticky.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect() || source.is_request(),
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Decode(_) | Self::Encode(_) | Self::Build(_) => false,
        }
    }

    /// HTTP status of the response, if there was one
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ClientError {
        ClientError::Status {
            url: "https://api.datadoghq.com/api/v1/monitor/1".into(),
            status: code,
            body: String::new(),
        }
    }

    #[test]
    fn transient_statuses() {
        assert!(status(429).is_transient());
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(400).is_transient());
        assert!(!status(403).is_transient());
        assert!(!status(404).is_transient());
    }

    #[test]
    fn decode_is_sticky() {
        let err = ClientError::from(ModelError::UnknownKind("x".into()));
        assert!(!err.is_transient());
        assert_eq!(err.status(), None);
    }
}
