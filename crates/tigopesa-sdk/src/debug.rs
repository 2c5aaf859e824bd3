//! Traffic dumps for debug mode.
//!
//! When debug mode is on, the transport and the inbound dispatcher hand
//! a rendered dump of every request and response to a [`DebugLog`].
//! Logging never blocks the call path: entries go through a bounded
//! channel drained by a single background task, and are dropped (and
//! counted) when the channel is full. The drain task lives on the runtime
//! that logged first; if that runtime shuts down, the next entry starts a
//! new drain on the current one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Capacity of the channel between callers and the drain task.
pub const DEBUG_CHANNEL_CAPACITY: usize = 256;

/// One rendered dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEntry {
    /// What was dumped, e.g. `"outbound request"`.
    pub label: &'static str,
    /// HTTP/1.1-style rendering of the message.
    pub dump: String,
}

impl DebugEntry {
    /// A new entry.
    pub fn new(label: &'static str, dump: String) -> Self {
        Self { label, dump }
    }
}

/// Destination of debug dumps.
pub trait DebugSink: Send + Sync + 'static {
    /// Write one entry. Called from the drain task, one entry at a time.
    fn write(&self, entry: &DebugEntry);
}

/// Default sink: emits each dump as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn write(&self, entry: &DebugEntry) {
        tracing::debug!(target: "tigopesa::dump", label = entry.label, "\n{}", entry.dump);
    }
}

impl<F> DebugSink for F
where
    F: Fn(&DebugEntry) + Send + Sync + 'static,
{
    fn write(&self, entry: &DebugEntry) {
        self(entry);
    }
}

// ---------------------------------------------------------------------------
// DebugLog
// ---------------------------------------------------------------------------

/// Non-blocking handle to a [`DebugSink`]; cheap to clone.
#[derive(Clone, Default)]
pub struct DebugLog {
    inner: Option<Arc<Inner>>,
}

struct Inner {
    sink: Arc<dyn DebugSink>,
    tx: Mutex<Option<mpsc::Sender<DebugEntry>>>,
    dropped: AtomicU64,
}

impl DebugLog {
    /// A log that discards everything.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// A log writing to `sink`.
    pub fn new(sink: Arc<dyn DebugSink>) -> Self {
        Self {
            inner: Some(Arc::new(Inner {
                sink,
                tx: Mutex::new(None),
                dropped: AtomicU64::new(0),
            })),
        }
    }

    /// Whether entries are recorded at all.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Number of entries dropped because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.inner
            .as_ref()
            .map_or(0, |inner| inner.dropped.load(Ordering::Relaxed))
    }

    /// Offer an entry without waiting.
    ///
    /// Outside a Tokio runtime the entry is written synchronously.
    pub fn log(&self, entry: DebugEntry) {
        let Some(inner) = &self.inner else {
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            inner.sink.write(&entry);
            return;
        };

        let mut slot = inner.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let stale = match slot.as_ref() {
            Some(tx) => tx.is_closed(),
            None => true,
        };
        if stale {
            *slot = Some(spawn_drain(&handle, Arc::clone(&inner.sink)));
        }
        let Some(tx) = slot.as_ref() else {
            return;
        };

        match tx.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                inner.dropped.fetch_add(1, Ordering::Relaxed);
            }
            // Drain task died with its runtime between the check and the send.
            Err(TrySendError::Closed(entry)) => {
                let tx = spawn_drain(&handle, Arc::clone(&inner.sink));
                if tx.try_send(entry).is_err() {
                    inner.dropped.fetch_add(1, Ordering::Relaxed);
                }
                *slot = Some(tx);
            }
        }
    }
}

fn spawn_drain(handle: &Handle, sink: Arc<dyn DebugSink>) -> mpsc::Sender<DebugEntry> {
    let (tx, mut rx) = mpsc::channel::<DebugEntry>(DEBUG_CHANNEL_CAPACITY);
    handle.spawn(async move {
        while let Some(entry) = rx.recv().await {
            sink.write(&entry);
        }
    });
    tx
}

impl fmt::Debug for DebugLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugLog")
            .field("enabled", &self.is_enabled())
            .field("dropped", &self.dropped())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn is_secret_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("authorization") || name.eq_ignore_ascii_case("password")
}

fn write_headers<'a>(out: &mut String, headers: impl IntoIterator<Item = (&'a str, &'a str)>) {
    for (name, value) in headers {
        let value = if is_secret_header(name) { "<redacted>" } else { value };
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push_str("\r\n");
    }
}

/// Render a request as `METHOD target HTTP/1.1`, headers, blank line, body.
pub(crate) fn render_request<'a>(
    method: &str,
    target: &str,
    headers: impl IntoIterator<Item = (&'a str, &'a str)>,
    body: &[u8],
) -> String {
    let mut out = format!("{method} {target} HTTP/1.1\r\n");
    write_headers(&mut out, headers);
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(body));
    out
}

/// Render a response as `HTTP/1.1 status`, headers, blank line, body.
pub(crate) fn render_response<'a>(
    status: u16,
    headers: impl IntoIterator<Item = (&'a str, &'a str)>,
    body: &[u8],
) -> String {
    let mut out = format!("HTTP/1.1 {status}\r\n");
    write_headers(&mut out, headers);
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(body));
    out
}

/// Header pairs of an `http::HeaderMap`, skipping non-UTF-8 values.
pub(crate) fn header_pairs(headers: &axum::http::HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<DebugEntry>>>);

    impl DebugSink for Collect {
        fn write(&self, entry: &DebugEntry) {
            self.0.lock().unwrap().push(entry.clone());
        }
    }

    #[test]
    fn request_dump_redacts_credentials() {
        let dump = render_request(
            "POST",
            "http://provider.test/billpay",
            [
                ("Authorization", "bearer abc"),
                ("Content-Type", "application/json"),
                ("password", "s3cret"),
            ],
            br#"{"Amount":1}"#,
        );
        assert!(dump.starts_with("POST http://provider.test/billpay HTTP/1.1\r\n"));
        assert!(dump.contains("Content-Type: application/json\r\n"));
        assert!(!dump.contains("abc"));
        assert!(!dump.contains("s3cret"));
        assert!(dump.ends_with("\r\n\r\n{\"Amount\":1}"));
    }

    #[test]
    fn response_dump_has_status_line() {
        let dump = render_response(404, [("Content-Type", "text/plain")], b"nope");
        assert!(dump.starts_with("HTTP/1.1 404\r\n"));
        assert!(dump.ends_with("nope"));
    }

    #[test]
    fn disabled_log_is_inert() {
        let log = DebugLog::disabled();
        assert!(!log.is_enabled());
        log.log(DebugEntry::new("x", String::new()));
        assert_eq!(log.dropped(), 0);
    }

    #[test]
    fn without_runtime_writes_synchronously() {
        let sink = Collect::default();
        let log = DebugLog::new(Arc::new(sink.clone()));
        log.log(DebugEntry::new("sync", "body".into()));
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn entries_reach_sink_in_order() {
        let sink = Collect::default();
        let log = DebugLog::new(Arc::new(sink.clone()));
        for i in 0..5 {
            log.log(DebugEntry::new("n", i.to_string()));
        }

        for _ in 0..50 {
            if sink.0.lock().unwrap().len() == 5 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let dumps: Vec<String> = sink.0.lock().unwrap().iter().map(|e| e.dump.clone()).collect();
        assert_eq!(dumps, ["0", "1", "2", "3", "4"]);
        assert_eq!(log.dropped(), 0);
    }

    fn wait_for(sink: &Collect, count: usize) {
        for _ in 0..50 {
            if sink.0.lock().unwrap().len() >= count {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn log_outliving_its_first_runtime_keeps_delivering() {
        let sink = Collect::default();
        let log = DebugLog::new(Arc::new(sink.clone()));

        let first = tokio::runtime::Runtime::new().unwrap();
        first.block_on(async { log.log(DebugEntry::new("first", "a".into())) });
        wait_for(&sink, 1);
        drop(first);

        let second = tokio::runtime::Runtime::new().unwrap();
        second.block_on(async { log.log(DebugEntry::new("second", "b".into())) });
        wait_for(&sink, 2);

        let labels: Vec<&str> = sink.0.lock().unwrap().iter().map(|e| e.label).collect();
        assert_eq!(labels, ["first", "second"]);
        assert_eq!(log.dropped(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn full_channel_drops_instead_of_blocking() {
        let sink = Collect::default();
        let log = DebugLog::new(Arc::new(sink.clone()));
        // The drain task cannot run until this task yields.
        let extra = 10;
        for i in 0..DEBUG_CHANNEL_CAPACITY + extra {
            log.log(DebugEntry::new("n", i.to_string()));
        }
        assert_eq!(log.dropped(), extra as u64);
    }
}
