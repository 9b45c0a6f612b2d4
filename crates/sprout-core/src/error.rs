#[derive(Debug, thiserror::Error)]
pub enum SproutError {
    #[error("config error: {0}")]
    Config(String),

    #[error("llm error ({provider}): {message}")]
    Llm { provider: String, message: String },

    /// Transport-level failure or unexpected status from a non-API endpoint.
    #[error("http error ({status}): {body}")]
    Http { status: u16, body: String },

    /// The investment API answered with a non-success status.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The investment API answered 409.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("channel error: {0}")]
    Channel(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl SproutError {
    /// Message suitable for handing back to the LLM as-is.
    ///
    /// Remote errors surface the server's own text, everything else its
    /// display form.
    pub fn remote_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Conflict(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SproutError>;
