use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

pub const BUCKET_HEADER: &str = "x-ratelimit-bucket";
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_AFTER_HEADER: &str = "x-ratelimit-reset-after";
pub const GLOBAL_HEADER: &str = "x-ratelimit-global";
pub const RETRY_AFTER_HEADER: &str = "retry-after";

/// Last reported state of a remote bucket. `remaining` is never decremented locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: Instant,
}

impl Bucket {
    /// Deadline to wait for before calling again, if the bucket looked exhausted.
    pub fn wait_until(&self, now: Instant) -> Option<Instant> {
        (self.remaining == 0 && now < self.reset_at).then_some(self.reset_at)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalGate {
    pub active: bool,
    pub reset_at: Option<Instant>,
}

impl GlobalGate {
    pub fn activate(&mut self, reset_at: Instant) {
        self.active = true;
        self.reset_at = Some(reset_at);
    }

    pub fn clear(&mut self) {
        *self = GlobalGate::default();
    }

    pub fn wait_until(&self, now: Instant) -> Option<Instant> {
        match self.reset_at {
            Some(reset_at) if self.active && now < reset_at => Some(reset_at),
            _ => None,
        }
    }
}

/// Rate limit headers of a single response.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitHeaders {
    pub bucket: Box<str>,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl RateLimitHeaders {
    /// `None` when the response carries no bucket header. `Some(Err(..))` when the bucket
    /// is named but the accompanying values are missing or malformed.
    pub fn parse(headers: &HeaderMap) -> Option<Result<RateLimitHeaders, &'static str>> {
        let bucket = header_str(headers, BUCKET_HEADER)?;

        Some(RateLimitHeaders::parse_values(bucket, headers))
    }

    fn parse_values(bucket: &str, headers: &HeaderMap) -> Result<RateLimitHeaders, &'static str> {
        let limit = header_str(headers, LIMIT_HEADER)
            .and_then(|s| s.parse().ok())
            .ok_or(LIMIT_HEADER)?;

        let remaining = header_str(headers, REMAINING_HEADER)
            .and_then(|s| s.parse().ok())
            .ok_or(REMAINING_HEADER)?;

        let reset_after = header_str(headers, RESET_AFTER_HEADER)
            .and_then(parse_seconds)
            .ok_or(RESET_AFTER_HEADER)?;

        Ok(RateLimitHeaders {
            bucket: Box::from(bucket),
            limit,
            remaining,
            reset_after,
        })
    }
}

/// Bucket table plus the route to bucket id aliases learnt from responses.
#[derive(Debug, Default)]
pub struct BucketTable {
    buckets: HashMap<Box<str>, Bucket>,
    routes: HashMap<Box<str>, Box<str>>,
}

impl BucketTable {
    pub fn get(&self, route: &str) -> Option<&Bucket> {
        let key = self.routes.get(route).map(|b| &**b).unwrap_or(route);
        self.buckets.get(key)
    }

    pub fn observe(&mut self, route: &str, headers: RateLimitHeaders, now: Instant) {
        let bucket = Bucket {
            limit: headers.limit,
            remaining: headers.remaining,
            reset_at: now + headers.reset_after,
        };

        self.routes.insert(Box::from(route), headers.bucket.clone());
        self.buckets.insert(headers.bucket, bucket);
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Fractional seconds, as sent in `x-ratelimit-reset-after` and `retry-after`.
pub(crate) fn parse_seconds(s: &str) -> Option<Duration> {
    s.trim().parse::<f64>().ok().and_then(seconds)
}

pub(crate) fn seconds(secs: f64) -> Option<Duration> {
    (secs.is_finite() && secs >= 0.0).then(|| Duration::from_secs_f64(secs))
}
