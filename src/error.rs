use thiserror::Error;

/// A backend call that did not produce a usable body.
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend answered HTTP {0}")]
    Status(u16),
    #[error("malformed JSON body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Why a `/status` poll could not yield a live reading.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error(transparent)]
    Request(#[from] RequestFailure),
    #[error("status payload has no timestamp")]
    MissingTimestamp,
}

/// Form input rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{field} must be a number, got {raw:?}")]
    NotANumber { field: &'static str, raw: String },
    #[error("{field} must be a whole number of cycles, got {raw:?}")]
    NotACount { field: &'static str, raw: String },
}

impl InputError {
    pub fn field(&self) -> &'static str {
        match self {
            InputError::NotANumber { field, .. } | InputError::NotACount { field, .. } => field,
        }
    }
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error("prediction request failed: {0}")]
    Request(#[from] RequestFailure),
}
