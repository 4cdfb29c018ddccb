//! Error types for netdoctor.
//!
//! Every failure the chat client can observe, from a dropped connection to
//! an upload of the wrong kind of file, is represented by [`Error`].  Errors
//! never escape the chat controller as panics; they end up as the single
//! banner message shown to the user.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The main error type for netdoctor.
#[derive(Clone, Debug)]
pub enum Error {
    /// The endpoint answered with a non-success status that is not retried
    /// (or with a 429 after the retry budget was spent).
    Http {
        /// HTTP status code.
        status_code: u16,
        /// Canonical reason phrase for the status, if known.
        status_text: Option<String>,
        /// Message extracted from an `{"error": {"message": ...}}` body, if any.
        message: Option<String>,
    },

    /// The endpoint answered successfully but the body carried an `error`
    /// object instead of candidates.
    Api {
        /// Human-readable error message from the endpoint.
        message: String,
    },

    /// The endpoint answered successfully with neither candidates nor error.
    EmptyResponse,

    /// Request timed out at the transport.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection could not be established.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Any other failure inside the HTTP client.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// An uploaded file does not declare a `text/*` media type.
    UnsupportedFileType {
        /// Name of the rejected file.
        name: String,
        /// Media type the file declared.
        media_type: String,
    },

    /// An uploaded file could not be read.
    FileRead {
        /// Name of the file.
        name: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// Error during JSON or YAML serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// A URL parsing error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// Invalid configuration.
    Config {
        /// Human-readable error message.
        message: String,
        /// Setting that failed validation.
        param: Option<String>,
    },
}

impl Error {
    /// Creates a new HTTP status error.
    pub fn http(status_code: u16, status_text: Option<String>, message: Option<String>) -> Self {
        Error::Http {
            status_code,
            status_text,
            message,
        }
    }

    /// Creates a new API error.
    pub fn api(message: impl Into<String>) -> Self {
        Error::Api {
            message: message.into(),
        }
    }

    /// Creates a new empty-response error.
    pub fn empty_response() -> Self {
        Error::EmptyResponse
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new unsupported-file-type error.
    pub fn unsupported_file_type(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Error::UnsupportedFileType {
            name: name.into(),
            media_type: media_type.into(),
        }
    }

    /// Creates a new file-read error.
    pub fn file_read(name: impl Into<String>, source: io::Error) -> Self {
        Error::FileRead {
            name: name.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Config {
            message: message.into(),
            param,
        }
    }

    /// Returns true if this error happened below HTTP, before any status
    /// was received.  These are the failures the retrying client retries.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Connection { .. } | Error::HttpClient { .. }
        )
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns true if this error is a terminal rate-limit response.
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            Error::Http {
                status_code: 429,
                ..
            }
        )
    }

    /// Returns true if the endpoint returned an empty response.
    pub fn is_empty_response(&self) -> bool {
        matches!(self, Error::EmptyResponse)
    }

    /// Returns true if this error concerns an uploaded file.
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFileType { .. } | Error::FileRead { .. }
        )
    }

    /// Returns true if this error rejects a file's media type.
    pub fn is_unsupported_file_type(&self) -> bool {
        matches!(self, Error::UnsupportedFileType { .. })
    }

    /// Returns true if this error is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http {
                status_code,
                status_text,
                message,
            } => {
                let status_text = status_text.as_deref().unwrap_or("unknown status");
                match message {
                    Some(message) => write!(
                        f,
                        "API error: {status_text} (Status: {status_code}): {message}"
                    ),
                    None => write!(f, "API error: {status_text} (Status: {status_code})"),
                }
            }
            Error::Api { message } => {
                write!(f, "API reported an error: {message}")
            }
            Error::EmptyResponse => {
                write!(f, "Unexpected or empty API response")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::UnsupportedFileType { name, media_type } => {
                write!(
                    f,
                    "Unsupported file type for {name}: {media_type} (only text files are accepted)"
                )
            }
            Error::FileRead { name, source } => {
                write!(f, "Failed to read {name}: {source}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::Config { message, param } => {
                if let Some(param) = param {
                    write!(f, "Configuration error: {message} (setting: {param})")
                } else {
                    write!(f, "Configuration error: {message}")
                }
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::FileRead { source, .. } => Some(source.as_ref()),
            Error::Io { source, .. } => Some(source.as_ref()),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::serialization(format!("YAML error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for netdoctor operations.
pub type Result<T> = std::result::Result<T, Error>;
