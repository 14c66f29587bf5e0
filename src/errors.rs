pub type WmResult<T> = Result<T, WmError>;

#[derive(Debug, thiserror::Error)]
pub enum WmError {
    #[error(transparent)]
    X11(X11Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("another window manager is already running")]
    OtherWmRunning,
}

#[derive(Debug, thiserror::Error)]
pub enum X11Error {
    #[error(transparent)]
    ConnectError(#[from] x11rb::errors::ConnectError),
    #[error(transparent)]
    ConnectionError(#[from] x11rb::errors::ConnectionError),
    #[error(transparent)]
    ReplyError(#[from] x11rb::errors::ReplyError),
    #[error(transparent)]
    ReplyOrIdError(#[from] x11rb::errors::ReplyOrIdError),
    #[error("fatal protocol error: request code {request_code}, error {error_kind}")]
    Protocol {
        request_code: u8,
        error_kind: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse RON config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    #[error("Invalid modkey: {0}")]
    InvalidModkey(String),
    #[error("Unknown key: {0}")]
    UnknownKey(String),
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),
    #[error("Unknown attach mode: {0}")]
    UnknownAttachMode(String),
    #[error("Expected {expected} tags, found {found}")]
    TagCount { expected: usize, found: usize },
    #[error("At most {max} scratchpads are supported, found {found}")]
    TooManyScratchpads { max: usize, found: usize },
    #[error("Tag rule refers to tag {0}, which does not exist")]
    InvalidTagRule(usize),
    #[error("Invalid variable name '{0}': must start with $")]
    InvalidVariableName(String),
    #[error("Invalid #DEFINE syntax: '{0}'. Expected: #DEFINE $var_name = value")]
    InvalidDefine(String),
    #[error("Undefined variable '{0}': define it with #DEFINE before use")]
    UndefinedVariable(String),
}

impl WmError {
    /// Errors the event loop cannot carry on after: the connection is gone or the server
    /// reported something outside the tolerated set.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::OtherWmRunning
                | Self::X11(
                    X11Error::ConnectError(_)
                        | X11Error::ConnectionError(_)
                        | X11Error::Protocol { .. }
                )
        )
    }
}

impl<T: Into<X11Error>> From<T> for WmError {
    fn from(value: T) -> Self {
        Self::X11(value.into())
    }
}
