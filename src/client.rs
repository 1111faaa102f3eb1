use std::{fmt, sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
    executor::RequestExecutor,
    retry::RetryCoordinator,
    sink::{EventEmitter, TracingSink},
    ClientConfig, ClientOptions, EndpointRequest, LogSink, QueryParams, RawResult, Result,
    RetryPolicy,
};

#[derive(Clone)]
/// Client for the PropertyData API.
///
/// Every call goes through the retry coordinator: connection failures and
/// server errors are retried with exponential backoff, every other failure is
/// returned immediately as a typed [`crate::PropertyDataError`].
pub struct PropertyDataClient {
    executor: RequestExecutor,
    retry: RetryCoordinator,
    options: ClientOptions,
}

impl fmt::Debug for PropertyDataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDataClient")
            .field("base_url", &self.executor.base_url())
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl PropertyDataClient {
    /// Creates a client with default options.
    ///
    /// Fails with a configuration error if either value is empty or the base
    /// URL is not an absolute URL.
    pub fn new(base_url: impl AsRef<str>, api_key: impl AsRef<str>) -> Result<Self> {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Creates a client with explicit options, logging through [`TracingSink`]
    /// on the configured channel.
    pub fn with_options(
        base_url: impl AsRef<str>,
        api_key: impl AsRef<str>,
        options: ClientOptions,
    ) -> Result<Self> {
        let sink = Arc::new(TracingSink::new(options.logging.channel.clone()));
        Self::build(base_url.as_ref(), api_key.as_ref(), options, sink)
    }

    /// Creates a client from a loaded [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_options(&config.base_url, &config.api_key, config.options())
    }

    /// Creates a client from `PROPERTY_DATA_*` environment variables.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use propertydata_http::PropertyDataClient;
    ///
    /// let client = PropertyDataClient::from_env().expect("missing PROPERTY_DATA_API_KEY");
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    /// Replaces the log sink. Has no effect when logging is disabled.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        let events = EventEmitter::new(self.options.logging.enabled, sink);
        self.executor.set_events(events.clone());
        self.retry.set_events(events);
        self
    }

    fn build(
        base_url: &str,
        api_key: &str,
        options: ClientOptions,
        sink: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let events = EventEmitter::new(options.logging.enabled, sink);
        let executor = RequestExecutor::new(base_url, api_key, &options, events.clone())?;
        let retry = RetryCoordinator::with_events(options.retry, events);
        Ok(Self {
            executor,
            retry,
            options,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.retry.policy()
    }

    /// Enables or disables retries.
    pub fn set_retry_enabled(&mut self, enabled: bool) -> &mut Self {
        self.retry.policy_mut().set_enabled(enabled);
        self.options.retry = *self.retry.policy();
        self
    }

    /// Sets the maximum number of attempts per call (at least 1).
    pub fn set_max_retry_attempts(&mut self, attempts: u32) -> &mut Self {
        self.retry.policy_mut().set_max_attempts(attempts);
        self.options.retry = *self.retry.policy();
        self
    }

    /// Sets the base backoff delay.
    pub fn set_retry_delay(&mut self, delay: Duration) -> &mut Self {
        self.retry.policy_mut().set_base_delay(delay);
        self.options.retry = *self.retry.policy();
        self
    }

    /// Issues a GET to `path` with `params`, retrying transient failures.
    ///
    /// The API key is appended automatically.
    pub async fn get<P: Into<QueryParams>>(&self, path: &str, params: P) -> Result<RawResult> {
        self.get_with_cancel(path, params, &CancellationToken::new())
            .await
    }

    /// Same as [`PropertyDataClient::get`], aborting the in-flight attempt
    /// and any pending backoff once `cancel` fires.
    pub async fn get_with_cancel<P: Into<QueryParams>>(
        &self,
        path: &str,
        params: P,
        cancel: &CancellationToken,
    ) -> Result<RawResult> {
        let params = params.into();
        self.retry
            .run(cancel, |_| self.executor.execute(path, &params, cancel))
            .await
    }

    /// Executes a prepared [`EndpointRequest`].
    pub async fn send(&self, request: &EndpointRequest) -> Result<RawResult> {
        self.get(&request.path, request.params.clone()).await
    }

    /// Remaining credits for the configured API key.
    pub async fn account_credits(&self) -> Result<RawResult> {
        self.get("account/credits", ()).await
    }

    /// Returns whether the API accepts the configured key.
    ///
    /// Any failure, not only authentication, yields `false`.
    pub async fn test_connection(&self) -> bool {
        match self.account_credits().await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(kind = %err.kind(), error = %err, "connection test failed");
                false
            }
        }
    }

    /// Version of this crate.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
