use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    /// The only recoverable condition: the bootstrap falls through to prompting.
    #[error("no token found in the credential store")]
    CredentialNotFound,

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("no token entered at the prompt")]
    NoTokenEntered,

    #[error("Bad credentials: {0}")]
    AuthenticationRejected(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    pub fn is_bad_credentials(&self) -> bool {
        matches!(self, WatchError::AuthenticationRejected(_))
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
