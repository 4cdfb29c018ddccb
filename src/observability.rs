use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("netdoctor.client.requests");
pub(crate) static CLIENT_TRANSPORT_ERRORS: Counter =
    Counter::new("netdoctor.client.transport_errors");
pub(crate) static CLIENT_RATE_LIMITED: Counter = Counter::new("netdoctor.client.rate_limited");
pub(crate) static CLIENT_REQUEST_RETRIES: Counter = Counter::new("netdoctor.client.retries");
pub(crate) static CLIENT_RETRIES_EXHAUSTED: Counter =
    Counter::new("netdoctor.client.retries_exhausted");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("netdoctor.client.request_duration_seconds");
pub(crate) static CLIENT_RETRY_BACKOFF: Moments =
    Moments::new("netdoctor.client.retry_backoff_seconds");

pub(crate) static CHAT_SUBMISSIONS: Counter = Counter::new("netdoctor.chat.submissions");
pub(crate) static CHAT_REPLIES: Counter = Counter::new("netdoctor.chat.replies");
pub(crate) static CHAT_ERRORS: Counter = Counter::new("netdoctor.chat.errors");

pub(crate) static INGEST_FILES: Counter = Counter::new("netdoctor.ingest.files");
pub(crate) static INGEST_REJECTED: Counter = Counter::new("netdoctor.ingest.rejected");
pub(crate) static INGEST_BYTES: Counter = Counter::new("netdoctor.ingest.bytes");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_TRANSPORT_ERRORS);
    collector.register_counter(&CLIENT_RATE_LIMITED);
    collector.register_counter(&CLIENT_REQUEST_RETRIES);
    collector.register_counter(&CLIENT_RETRIES_EXHAUSTED);
    collector.register_moments(&CLIENT_REQUEST_DURATION);
    collector.register_moments(&CLIENT_RETRY_BACKOFF);

    collector.register_counter(&CHAT_SUBMISSIONS);
    collector.register_counter(&CHAT_REPLIES);
    collector.register_counter(&CHAT_ERRORS);

    collector.register_counter(&INGEST_FILES);
    collector.register_counter(&INGEST_REJECTED);
    collector.register_counter(&INGEST_BYTES);
}
