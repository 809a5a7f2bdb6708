use crate::backend::{HttpBackend, RawResponse, Request};
use crate::clock::{Clock, TokioClock};
use crate::ratelimit::{
    header_str, parse_seconds, seconds, BucketTable, GlobalGate, RateLimitHeaders, GLOBAL_HEADER,
    RETRY_AFTER_HEADER,
};
use crate::Result;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Sends requests through an [`HttpBackend`], waiting out the per-bucket and global
/// limits predicted from earlier responses.
///
/// Each limit is waited for at most once per call and nothing is retried: a 429 is
/// returned to the caller like any other response.
pub struct RateLimitedTransport {
    backend: Arc<dyn HttpBackend>,
    clock: Arc<dyn Clock>,
    buckets: Mutex<BucketTable>,
    global: Mutex<GlobalGate>,
}

#[derive(Deserialize)]
struct RateLimitedBody {
    retry_after: f64,
}

impl RateLimitedTransport {
    pub fn new(backend: Arc<dyn HttpBackend>) -> Self {
        Self::with_clock(backend, Arc::new(TokioClock))
    }

    pub fn with_clock(backend: Arc<dyn HttpBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            buckets: Mutex::new(BucketTable::default()),
            global: Mutex::new(GlobalGate::default()),
        }
    }

    pub async fn send(&self, request: Request) -> Result<RawResponse> {
        let route = request.route();

        let global_wait = self.global.lock().wait_until(self.clock.now());
        if let Some(deadline) = global_wait {
            debug!(%route, "Waiting for global rate limit");
            self.clock.sleep_until(deadline).await;
        }

        let bucket_wait = self
            .buckets
            .lock()
            .get(&route)
            .and_then(|bucket| bucket.wait_until(self.clock.now()));

        if let Some(deadline) = bucket_wait {
            debug!(%route, "Waiting for bucket to reset");
            self.clock.sleep_until(deadline).await;
        }

        let res = self.backend.execute(request).await?;
        self.observe(&route, &res);

        Ok(res)
    }

    fn observe(&self, route: &str, res: &RawResponse) {
        let now = self.clock.now();

        match RateLimitHeaders::parse(&res.headers) {
            Some(Ok(headers)) => self.buckets.lock().observe(route, headers, now),
            Some(Err(header)) => warn!(%route, header, "Malformed rate limit header"),
            None => self.global.lock().clear(),
        }

        if res.status == StatusCode::TOO_MANY_REQUESTS && res.headers.contains_key(GLOBAL_HEADER)
        {
            let retry_after = header_str(&res.headers, RETRY_AFTER_HEADER)
                .and_then(parse_seconds)
                .or_else(|| {
                    serde_json::from_slice::<RateLimitedBody>(&res.body)
                        .ok()
                        .and_then(|body| seconds(body.retry_after))
                });

            match retry_after {
                Some(retry_after) => {
                    warn!(%route, ?retry_after, "Hit global rate limit");
                    self.global.lock().activate(now + retry_after);
                }
                None => warn!(%route, "Hit global rate limit without a retry-after value"),
            }
        }
    }

    pub fn global_gate(&self) -> GlobalGate {
        *self.global.lock()
    }

    /// Time left before `route` may be called again, if anything is known about it.
    pub fn bucket_reset_in(&self, route: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.buckets
            .lock()
            .get(route)
            .map(|bucket| bucket.reset_at.saturating_duration_since(now))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ratelimit::{BUCKET_HEADER, LIMIT_HEADER, REMAINING_HEADER, RESET_AFTER_HEADER};
    use crate::Error;
    use async_trait::async_trait;
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::Method;
    use std::collections::VecDeque;

    /// Backend replaying canned responses and recording when each request arrived.
    #[derive(Default)]
    pub(crate) struct ScriptedBackend {
        responses: Mutex<VecDeque<RawResponse>>,
        pub(crate) calls: Mutex<Vec<(Instant, Request)>>,
    }

    impl ScriptedBackend {
        pub(crate) fn push(&self, res: RawResponse) {
            self.responses.lock().push_back(res);
        }

        pub(crate) fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().iter().map(|(at, _)| *at).collect()
        }
    }

    #[async_trait]
    impl HttpBackend for ScriptedBackend {
        async fn execute(&self, request: Request) -> Result<RawResponse> {
            self.calls.lock().push((Instant::now(), request));

            match self.responses.lock().pop_front() {
                Some(res) => Ok(res),
                None => Err(Error::Network("connection refused".into())),
            }
        }
    }

    pub(crate) fn response(
        status: StatusCode,
        headers: &[(&'static str, &'static str)],
        body: &str,
    ) -> RawResponse {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(value));
        }

        RawResponse {
            status,
            headers: map,
            body: body.as_bytes().to_vec(),
        }
    }

    fn exhausted(bucket: &'static str, reset_after: &'static str) -> RawResponse {
        response(
            StatusCode::OK,
            &[
                (BUCKET_HEADER, bucket),
                (LIMIT_HEADER, "5"),
                (REMAINING_HEADER, "0"),
                (RESET_AFTER_HEADER, reset_after),
            ],
            "{}",
        )
    }

    fn setup() -> (Arc<ScriptedBackend>, RateLimitedTransport) {
        let backend = Arc::new(ScriptedBackend::default());
        let transport = RateLimitedTransport::new(backend.clone());
        (backend, transport)
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_exhausted_bucket() {
        let (backend, transport) = setup();
        backend.push(exhausted("abcd", "2.5"));
        backend.push(response(StatusCode::OK, &[], "{}"));

        let start = Instant::now();
        transport.send(Request::new(Method::GET, "/channels/1")).await.unwrap();
        transport.send(Request::new(Method::GET, "/channels/1")).await.unwrap();

        let times = backend.call_times();
        assert_eq!(times[0], start);
        assert!(times[1] >= start + Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_routes_are_not_delayed_by_bucket() {
        let (backend, transport) = setup();
        backend.push(exhausted("abcd", "10"));
        backend.push(response(StatusCode::OK, &[], "{}"));

        let start = Instant::now();
        transport.send(Request::new(Method::GET, "/channels/1")).await.unwrap();
        transport.send(Request::new(Method::GET, "/users/2")).await.unwrap();

        assert_eq!(backend.call_times()[1], start);
        assert_eq!(
            transport.bucket_reset_in("GET /channels/1"),
            Some(Duration::from_secs(10))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_limit_delays_every_route() {
        let (backend, transport) = setup();
        backend.push(response(
            StatusCode::TOO_MANY_REQUESTS,
            &[(GLOBAL_HEADER, "true"), (RETRY_AFTER_HEADER, "3")],
            r#"{"message":"You are being rate limited.","retry_after":3,"global":true}"#,
        ));
        backend.push(response(StatusCode::OK, &[], "{}"));

        let start = Instant::now();
        let res = transport.send(Request::new(Method::POST, "/channels/1/messages")).await.unwrap();
        assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
        assert!(transport.global_gate().active);

        transport.send(Request::new(Method::GET, "/guilds/9")).await.unwrap();
        assert!(backend.call_times()[1] >= start + Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_retry_after_from_body() {
        let (backend, transport) = setup();
        backend.push(response(
            StatusCode::TOO_MANY_REQUESTS,
            &[(GLOBAL_HEADER, "true")],
            r#"{"retry_after":1.5,"global":true}"#,
        ));
        backend.push(response(StatusCode::OK, &[], "{}"));

        let start = Instant::now();
        transport.send(Request::new(Method::GET, "/users/1")).await.unwrap();
        transport.send(Request::new(Method::GET, "/users/2")).await.unwrap();

        assert!(backend.call_times()[1] >= start + Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_without_headers_clears_gate() {
        let (backend, transport) = setup();
        backend.push(response(
            StatusCode::TOO_MANY_REQUESTS,
            &[(GLOBAL_HEADER, "true"), (RETRY_AFTER_HEADER, "1")],
            "{}",
        ));
        backend.push(response(StatusCode::OK, &[], "{}"));

        transport.send(Request::new(Method::GET, "/users/1")).await.unwrap();
        assert!(transport.global_gate().active);

        transport.send(Request::new(Method::GET, "/users/1")).await.unwrap();
        assert_eq!(transport.global_gate(), GlobalGate::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_global_429_is_returned_as_is() {
        let (backend, transport) = setup();
        backend.push(response(
            StatusCode::TOO_MANY_REQUESTS,
            &[(RETRY_AFTER_HEADER, "5")],
            "{}",
        ));

        let res = transport.send(Request::new(Method::GET, "/users/1")).await.unwrap();
        assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
        assert!(!transport.global_gate().active);
        assert_eq!(backend.calls.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure() {
        let (_backend, transport) = setup();
        let res = transport.send(Request::new(Method::GET, "/users/1")).await;
        assert!(matches!(res, Err(Error::Network(_))));
    }
}
