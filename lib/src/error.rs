use std::error;
use std::fmt;

/// Body of an error response returned by Mailgun.
///
/// Mailgun normally answers with JSON (`{"message": "..."}`), but proxies
/// and load balancers in front of it do not, so the raw text is kept
/// whenever the body fails to decode.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorBody {
    Json(serde_json::Value),
    Raw(String),
}

impl ErrorBody {
    pub fn from_bytes(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(String::from_utf8_lossy(body).into_owned()),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Json(ref value) => write!(f, "{}", value),
            Self::Raw(ref text) => f.write_str(text),
        }
    }
}

/// All possible mailshot errors
#[derive(Debug)]
pub enum Error {
    /// Mailgun answered with a non-200 status
    Api { status: u16, body: ErrorBody },
    /// No response was obtained; the transport's own error is kept as-is
    Transport(Box<dyn error::Error + Send + Sync>),
    /// A 200 response that does not carry a message id
    Decode(String),
    /// A path-referenced attachment could not be read
    Attachment(String),
    Config(String),
}

impl Error {
    /// HTTP status reported by Mailgun, if any
    pub fn status(&self) -> Option<u16> {
        match *self {
            Self::Api { status, .. } => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Api { status, ref body } => write!(f, "Api ({}): {}", status, body),
            Error::Transport(ref e) => write!(f, "Transport: {}", e),
            Error::Decode(ref msg) => write!(f, "Decode: {}", msg),
            Error::Attachment(ref msg) => write!(f, "Attachment: {}", msg),
            Error::Config(ref msg) => write!(f, "Config: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Transport(ref e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}
