use std::{error::Error as StdError, fmt, panic::Location};

/// Boxed cause carried inside [`PropertyDataError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Closed set of reasons an API call can fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// No response was received (DNS, connect, timeout, reset).
    Connection,
    /// HTTP 401.
    Authentication,
    /// HTTP 429.
    RateLimit,
    /// HTTP 5xx.
    ServerError,
    /// Any other HTTP 4xx.
    ClientError,
    /// Empty body, undecodable body, or a body that is not a JSON container.
    MalformedResponse,
    /// Invalid client setup or invalid caller input. Never retried.
    Configuration,
}

impl ErrorKind {
    /// Whether a failure of this kind is worth another attempt.
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Connection | Self::ServerError)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Authentication => "authentication",
            Self::RateLimit => "rate_limit",
            Self::ServerError => "server_error",
            Self::ClientError => "client_error",
            Self::MalformedResponse => "malformed_response",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type returned by this crate.
///
/// Every failed call surfaces exactly one of these. The [`ErrorKind`] decides
/// retry behavior; `status` keeps the HTTP status code (0 when no response
/// was involved) and `source` keeps the underlying cause chain.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct PropertyDataError {
    kind: ErrorKind,
    message: String,
    status: u16,
    #[source]
    source: Option<BoxError>,
    location: &'static Location<'static>,
}

impl PropertyDataError {
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: 0,
            source: None,
            location: Location::caller(),
        }
    }

    /// Attaches the HTTP status code of the failed response.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Attaches the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[track_caller]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    #[track_caller]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code, or 0 when the failure did not involve a response.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Source file and line where the error was raised.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Message of the immediate cause, if any.
    pub fn cause_message(&self) -> Option<String> {
        self.source.as_ref().map(|source| source.to_string())
    }
}

/// Rejected caller input, detected before any request is built.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "invalid UK postcode format, expected \"SW1A 1AA\" (full), \"SW1A\" (district) or \"SW1A 1\" (sector)"
    )]
    Postcode,
    #[error("invalid location format, expected lat,lng (e.g. 51.501,-0.141)")]
    Location,
    #[error("invalid latitude, must be between -90 and 90 degrees")]
    Latitude,
    #[error("invalid longitude, must be between -180 and 180 degrees")]
    Longitude,
    #[error("invalid what3words format, expected word.word.word (e.g. pretty.needed.chill)")]
    ThreeWordAddress,
    #[error("at least one location parameter is required: postcode, location (lat,lng), w3w or town")]
    LocationRequired,
    #[error("town name is too long (max 100 characters)")]
    TownTooLong,
    #[error("town name contains invalid characters")]
    TownCharacters,
    #[error("page number must be at least 1")]
    Page,
    #[error("items per page must be between 1 and 100")]
    PerPage,
    #[error("address cannot be empty")]
    EmptyAddress,
    #[error("address is too long (max 500 characters)")]
    AddressTooLong,
    #[error("invalid UPRN format, expected a numeric string of up to 12 digits")]
    Uprn,
    #[error("invalid title number format, expected a value like \"DN123456\"")]
    TitleNumber,
    #[error("{field} must be a positive number")]
    NotPositive { field: String },
    #[error("{field} cannot be negative")]
    Negative { field: String },
    #[error("max age must be between 14 and 1500 days")]
    MaxAge,
    #[error("number of storeys must be between 1 and 4")]
    Storeys,
    #[error("internal area must be at least 300 square feet")]
    InternalArea,
}

impl From<ValidationError> for PropertyDataError {
    #[track_caller]
    fn from(err: ValidationError) -> Self {
        PropertyDataError::configuration(err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::{ErrorKind, PropertyDataError, ValidationError};

    #[test]
    fn only_connection_and_server_errors_are_retryable() {
        let retryable: Vec<_> = [
            ErrorKind::Connection,
            ErrorKind::Authentication,
            ErrorKind::RateLimit,
            ErrorKind::ServerError,
            ErrorKind::ClientError,
            ErrorKind::MalformedResponse,
            ErrorKind::Configuration,
        ]
        .into_iter()
        .filter(|kind| kind.is_retryable())
        .collect();

        assert_eq!(retryable, vec![ErrorKind::Connection, ErrorKind::ServerError]);
    }

    #[test]
    fn validation_error_becomes_configuration_with_cause() {
        let err: PropertyDataError = ValidationError::Uprn.into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.status(), 0);
        assert!(!err.is_retryable());
        assert!(err.source().is_some());
        assert!(err.message().contains("UPRN"));
    }

    #[test]
    fn records_status_and_location() {
        let err = PropertyDataError::new(ErrorKind::ServerError, "boom").with_status(503);
        assert_eq!(err.status(), 503);
        assert_eq!(err.to_string(), "boom");
        assert!(err.location().file().ends_with("error.rs"));
        assert_eq!(err.cause_message(), None);
    }
}
