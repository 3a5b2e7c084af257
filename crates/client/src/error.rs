use batoners_core::error::CoreError;

/// Errors surfaced by the game client.
///
/// Background sync never propagates these; they are logged and the next
/// scheduled tick acts as the retry.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Reading or writing the local snapshot failed.
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The local snapshot could not be encoded or decoded.
    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A protected call was made before a successful login.
    #[error("Not logged in")]
    NotInitialized,

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ClientResult<T> = Result<T, ClientError>;
