/// Application-level errors
///
/// Every error class the client can encounter: transport failures, non-2xx
/// statuses (with the parsed body preserved so fallback payloads survive),
/// malformed JSON, and application-level error envelopes. None of these are
/// fatal; the session layer recovers all of them with cached or sample data.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("HTTP status {status}")]
    Status {
        status: u16,
        /// Parsed response body. Error responses from the recommend and
        /// popular endpoints may carry a usable fallback list in here.
        body: serde_json::Value,
    },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;
