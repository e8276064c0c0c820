use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("deskmate.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("deskmate.client.request_errors");
pub(crate) static CLIENT_NON_SUCCESS_STATUS: Counter =
    Counter::new("deskmate.client.non_success_status");

pub(crate) static STREAM_FRAMES: Counter = Counter::new("deskmate.stream.frames");
pub(crate) static STREAM_MALFORMED: Counter = Counter::new("deskmate.stream.malformed");
pub(crate) static STREAM_INBAND_ERRORS: Counter = Counter::new("deskmate.stream.inband_errors");

pub(crate) static SESSIONS_INITIALIZED: Counter = Counter::new("deskmate.session.initialized");
pub(crate) static TURNS_SAVED: Counter = Counter::new("deskmate.session.turns_saved");

pub(crate) static RECONNECT_ATTEMPTS: Counter = Counter::new("deskmate.reconnect.attempts");
pub(crate) static RECONNECTS_EXHAUSTED: Counter = Counter::new("deskmate.reconnect.exhausted");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_NON_SUCCESS_STATUS);

    collector.register_counter(&STREAM_FRAMES);
    collector.register_counter(&STREAM_MALFORMED);
    collector.register_counter(&STREAM_INBAND_ERRORS);

    collector.register_counter(&SESSIONS_INITIALIZED);
    collector.register_counter(&TURNS_SAVED);

    collector.register_counter(&RECONNECT_ATTEMPTS);
    collector.register_counter(&RECONNECTS_EXHAUSTED);
}
