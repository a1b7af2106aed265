use std::time::Duration;

/// Core error type.
///
/// Adapter crates map their specific errors into this type so the dispatcher
/// can turn any handler failure into a single localized reply.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("generation timed out after {}s", .0.as_secs())]
    GenerationTimeout(Duration),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("invalid input: {0}")]
    UserInput(#[from] UserInputError),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// True for an elapsed generator bound, and for generator failures whose
    /// message reports a timeout (HTTP client deadlines, upstream 504s).
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::GenerationTimeout(_) => true,
            Error::Generation(msg) => {
                let lower = msg.to_lowercase();
                lower.contains("timeout") || lower.contains("timed out")
            }
            _ => false,
        }
    }
}

/// Problems with what the user typed. Surfaced immediately; nothing is generated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UserInputError {
    #[error("/{command} requires an argument")]
    MissingArgument { command: String },

    #[error("search keyword is empty")]
    EmptyKeyword,
}

pub type Result<T> = std::result::Result<T, Error>;
