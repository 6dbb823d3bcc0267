//! Error type shared by the capture engine.

/// Errors reported synchronously by session setup, key options and property access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A malformed option string, end-key spec or match list.
    #[error("Parse error at '{token}' in \"{input}\"")]
    Parse { token: String, input: String },

    /// An unrecognized flag letter passed to `KeyOpt`.
    #[error("Invalid option: '{0}'")]
    InvalidOption(char),

    /// A required argument was missing.
    #[error("Too few parameters")]
    TooFewParams,

    /// An operation was invoked with the wrong arity, value or in the wrong state.
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),
}

impl Error {
    pub(crate) fn parse(token: impl Into<String>, input: &str) -> Self {
        Error::Parse {
            token: token.into(),
            input: input.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
