//! Wire-dump logging capability.
//!
//! `RestClient` hands every outgoing request and incoming response, rendered
//! as text, to a [`Logger`]. The dumps contain the `Authorization` header in
//! plaintext, so only attach a logger where Basic credentials may be written
//! out.

/// Receives formatted messages from the client.
pub trait Logger: Send + Sync {
    fn record(&self, text: &str);

    /// When `false` the client skips rendering dumps altogether.
    fn enabled(&self) -> bool {
        true
    }
}

/// Discards everything. Used when no logger is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn record(&self, _text: &str) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Forwards messages to `tracing` at debug level under the `rest_facade::wire`
/// target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn record(&self, text: &str) {
        tracing::debug!(target: "rest_facade::wire", "{text}");
    }
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn record(&self, text: &str) {
        self(text)
    }
}
