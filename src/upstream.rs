/// HTTP client for provider listing endpoints and the universal catalog.
/// Uses reqwest-middleware for transient-failure retries.
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{
    default_on_request_failure, default_on_request_success, policies::ExponentialBackoff, Retryable,
    RetryTransientMiddleware, RetryableStrategy,
};
use std::time::Duration;

/// Default transient classification, except that a timed-out attempt is
/// final. Each call gets one `timeout` budget, not one per attempt.
struct TimeoutIsFatal;

impl RetryableStrategy for TimeoutIsFatal {
    fn handle(&self, res: &Result<reqwest::Response, reqwest_middleware::Error>) -> Option<Retryable> {
        match res {
            Ok(resp) => default_on_request_success(resp),
            Err(reqwest_middleware::Error::Reqwest(e)) if e.is_timeout() => Some(Retryable::Fatal),
            Err(e) => default_on_request_failure(e),
        }
    }
}

#[derive(Clone)]
pub struct UpstreamClient {
    client: ClientWithMiddleware,
}

impl UpstreamClient {
    /// `timeout` bounds the call; a timeout is not retried and is reported
    /// like any other transport failure.
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, reqwest::Error> {
        let reqwest_client = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .user_agent(concat!("modelcat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Retries only fire on connection failures, 5xx, 408 and 429.
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

        let client = ClientBuilder::new(reqwest_client)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                TimeoutIsFatal,
            ))
            .build();

        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }
}
