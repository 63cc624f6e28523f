use thiserror::Error;

/// Failure of a single upstream call. Callers treat any variant as
/// "this unit of work yields nothing" and keep going.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{context}: request failed with status {status}: {body}")]
    Status {
        context: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{context}: service reported an error: {message}")]
    Api { context: String, message: String },

    #[error("{context}: failed to send request")]
    Request {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{context}: failed to parse response")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("observation time {0} is out of range")]
    Timestamp(i64),
}

impl SourceError {
    /// HTTP status of a non-success response, if that is what failed.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
