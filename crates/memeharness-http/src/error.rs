//! Error types for the request executor.

/// Errors surfaced by the executor.
///
/// HTTP status codes are never represented here: any response the service
/// produces, 4xx and 5xx included, is handed back to the caller as data.
/// These variants cover the cases where no final response could be obtained.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request timed out after {attempts} attempt(s)")]
    Timeout {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("connection failed after {attempts} attempt(s)")]
    Connect {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("invalid header value for '{name}'")]
    InvalidHeader { name: String },

    #[error("request failed after exhausting all retries")]
    RetriesExhausted,
}

/// Transient transport failures that qualify for retry.
///
/// The transport must distinguish timeouts and connection failures from all
/// other outcomes; only these two classes are retried.
#[derive(Debug)]
pub enum TransportError {
    /// The attempt exceeded the configured connect/request timeout.
    Timeout(reqwest::Error),
    /// The connection could not be established.
    Connect(reqwest::Error),
}

impl TransportError {
    /// Convert into the terminal error reported after the final attempt.
    pub fn into_fatal(self, attempts: u32) -> HttpError {
        match self {
            TransportError::Timeout(source) => HttpError::Timeout { attempts, source },
            TransportError::Connect(source) => HttpError::Connect { attempts, source },
        }
    }

    /// Short label for retry diagnostics.
    pub fn reason(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "timeout",
            TransportError::Connect(_) => "connection failure",
        }
    }
}
