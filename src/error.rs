use thiserror::Error;

/// Malformed upstream data or invalid engine input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("missing required field `{field}` in {context}")]
    MissingField { field: &'static str, context: String },

    #[error("invalid value for `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("odds table is empty")]
    EmptyOddsTable,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl DataError {
    pub fn missing(field: &'static str, context: impl Into<String>) -> Self {
        DataError::MissingField { field, context: context.into() }
    }
}

/// Failure talking to the odds provider.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("odds api returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("odds api request failed: {0}")]
    Transport(reqwest::Error),

    #[error("decode odds api json failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("odds api still failing after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<FetchError> },
}

// The api key travels in the query string, so request urls never reach the message.
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.without_url())
    }
}

impl FetchError {
    /// Server errors, rate limiting and transport hiccups are worth another try.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            FetchError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Decode(_) | FetchError::Exhausted { .. } => false,
        }
    }
}
