use std::fmt;

use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    classify,
    params::CREDENTIAL_PARAM,
    sink::{redact, EventEmitter},
    ClientEvent, ClientOptions, PropertyDataError, QueryParams, RawResult, Result,
};

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("propertydata-http/", env!("CARGO_PKG_VERSION"));

/// Issues single GET attempts and turns the outcome into a [`RawResult`] or
/// a classified [`PropertyDataError`].
///
/// Holds no per-call state; the `reqwest::Client` connection pool is shared
/// by clones and safe for concurrent use.
#[derive(Clone)]
pub(crate) struct RequestExecutor {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    events: EventEmitter,
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("events", &self.events)
            .finish()
    }
}

impl RequestExecutor {
    pub(crate) fn new(
        base_url: &str,
        api_key: &str,
        options: &ClientOptions,
        events: EventEmitter,
    ) -> Result<Self> {
        validate_config(base_url, api_key)?;
        validate_timeouts(options)?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(options.timeout())
            .connect_timeout(options.connect_timeout())
            .build()
            .map_err(|err| {
                PropertyDataError::configuration("failed to build HTTP client").with_source(err)
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            events,
        })
    }

    pub(crate) fn set_events(&mut self, events: EventEmitter) {
        self.events = events;
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins the base address and `path` with exactly one `/`.
    pub(crate) fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Performs one attempt. Cancelling `cancel` aborts the in-flight request.
    pub(crate) async fn execute(
        &self,
        path: &str,
        params: &QueryParams,
        cancel: &CancellationToken,
    ) -> Result<RawResult> {
        let url = self.endpoint_url(path);
        let mut query = params.clone();
        query.insert(CREDENTIAL_PARAM, self.api_key.as_str());

        self.events.emit(ClientEvent::Request {
            method: "GET",
            url: &url,
            parameters: &redact(&query),
        });

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PropertyDataError::connection("request cancelled")),
            result = self.send(&url, &query) => result,
        };

        if let Err(err) = &result {
            self.events.error(err);
        }
        result
    }

    async fn send(&self, url: &str, query: &QueryParams) -> Result<RawResult> {
        let response = self
            .http
            .get(url)
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(classify::transport_error)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(classify::transport_error)?;

        if let Some(kind) = classify::classify_status(status) {
            return Err(classify::status_error(kind, status, &body));
        }

        let result = classify::parse_body(&body)?;
        self.events.emit(ClientEvent::Response {
            url,
            status,
            body_size: body.len(),
        });
        Ok(result)
    }
}

fn validate_config(base_url: &str, api_key: &str) -> Result<()> {
    if base_url.trim().is_empty() {
        return Err(PropertyDataError::configuration(
            "PropertyData API base URL is not configured",
        ));
    }
    if api_key.trim().is_empty() {
        return Err(PropertyDataError::configuration(
            "PropertyData API key is not configured",
        ));
    }

    let parsed = Url::parse(base_url.trim()).map_err(|err| {
        PropertyDataError::configuration("invalid PropertyData API base URL format")
            .with_source(err)
    })?;
    if !parsed.has_host() {
        return Err(PropertyDataError::configuration(
            "invalid PropertyData API base URL format",
        ));
    }
    Ok(())
}

fn validate_timeouts(options: &ClientOptions) -> Result<()> {
    if options.timeout_ms == 0 {
        return Err(PropertyDataError::configuration(
            "PropertyData API timeout must be greater than zero",
        ));
    }
    if options.connect_timeout_ms == 0 {
        return Err(PropertyDataError::configuration(
            "PropertyData API connect timeout must be greater than zero",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_config, validate_timeouts, RequestExecutor};
    use crate::{sink::EventEmitter, ClientOptions, ErrorKind};

    fn executor(base_url: &str) -> RequestExecutor {
        RequestExecutor::new(
            base_url,
            "secret-key",
            &ClientOptions::default(),
            EventEmitter::disabled(),
        )
        .expect("valid configuration")
    }

    #[test]
    fn endpoint_url_uses_single_separator() {
        let exec = executor("https://api.propertydata.co.uk/");
        assert_eq!(exec.base_url(), "https://api.propertydata.co.uk");
        assert_eq!(
            exec.endpoint_url("/account/credits"),
            "https://api.propertydata.co.uk/account/credits"
        );
        assert_eq!(
            exec.endpoint_url("prices"),
            "https://api.propertydata.co.uk/prices"
        );
    }

    #[test]
    fn rejects_missing_or_malformed_configuration() {
        for (base_url, key) in [
            ("", "key"),
            ("   ", "key"),
            ("https://api.propertydata.co.uk", ""),
            ("not a url", "key"),
            ("api.propertydata.co.uk", "key"),
            ("mailto:someone@example.com", "key"),
        ] {
            let err = validate_config(base_url, key).expect_err(base_url);
            assert_eq!(err.kind(), ErrorKind::Configuration, "{base_url:?}");
        }
    }

    #[test]
    fn rejects_zero_timeouts() {
        let zero_total = ClientOptions {
            timeout_ms: 0,
            ..ClientOptions::default()
        };
        let zero_connect = ClientOptions {
            connect_timeout_ms: 0,
            ..ClientOptions::default()
        };
        for options in [zero_total, zero_connect] {
            let err = validate_timeouts(&options).expect_err("zero timeout");
            assert_eq!(err.kind(), ErrorKind::Configuration);
            let err = RequestExecutor::new(
                "https://api.propertydata.co.uk",
                "secret-key",
                &options,
                EventEmitter::disabled(),
            )
            .expect_err("construction must fail");
            assert_eq!(err.kind(), ErrorKind::Configuration);
        }
        assert!(validate_timeouts(&ClientOptions::default()).is_ok());
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", executor("https://api.propertydata.co.uk"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }
}
