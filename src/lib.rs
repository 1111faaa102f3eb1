//! `propertydata-http` is a resilient async client for the PropertyData API.
//!
//! Calls go through three layers:
//! - [`validate`] rejects malformed input before anything is sent;
//! - the request executor issues one GET and classifies the outcome into an
//!   [`ErrorKind`];
//! - the [`RetryCoordinator`] retries [`ErrorKind::Connection`] and
//!   [`ErrorKind::ServerError`] with capped exponential backoff.
//!
//! Endpoint-specific helpers are left to callers, which build
//! [`QueryParams`] and call [`PropertyDataClient::get`].

mod classify;
mod client;
mod config;
mod error;
mod executor;
mod options;
mod params;
mod retry;
mod sink;
mod types;

pub mod validate;

pub use classify::{classify_status, parse_body};
pub use client::PropertyDataClient;
pub use config::{ClientConfig, LoggingConfig, RetryConfig, DEFAULT_BASE_URL};
pub use error::{BoxError, ErrorKind, PropertyDataError, ValidationError};
pub use executor::USER_AGENT;
pub use options::{ClientOptions, LoggingOptions};
pub use params::{
    EndpointRequest, LocationQuery, Pagination, QueryParams, QueryValue, CREDENTIAL_PARAM,
};
pub use retry::{RetryCoordinator, RetryPolicy, MAX_BACKOFF};
pub use sink::{ClientEvent, LogSink, NoopSink, SinkError, TracingSink, REDACTED};
pub use types::RawResult;

pub type Result<T> = std::result::Result<T, PropertyDataError>;
