//! Audible completion signal.
//!
//! Completing waypoint `k` plays `k` identical pulses. Delivery is
//! fire-and-forget: pulses are queued to a worker task, and a pulse the sink
//! fails to deliver is logged and skipped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use navseq_core::error::{CoreError, Domain, ErrorKind, Payload};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::log_core_error;
use crate::navigation::BoxFuture;

/// One tone of the notification signal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Pulse {
    pub frequency_hz: u16,
    pub duration: Duration,
}

impl Default for Pulse {
    fn default() -> Self {
        Self {
            frequency_hz: 500,
            duration: Duration::from_secs(1),
        }
    }
}

/// Audio/notification transport. No acknowledgment is expected.
pub trait NotificationSink: Send + Sync + 'static {
    type Error: fmt::Display + Send + Sync + 'static;

    fn emit_pulse<'a>(&'a self, pulse: &'a Pulse) -> BoxFuture<'a, Result<(), Self::Error>>;
}

/// Queues pulse bursts onto a single worker so bursts never interleave.
pub struct Notifier {
    tx: mpsc::UnboundedSender<u32>,
    worker: JoinHandle<()>,
}

impl Notifier {
    /// Spawn the delivery worker. `gap` is the pause between two pulses of
    /// the same burst.
    pub fn spawn<S: NotificationSink>(sink: Arc<S>, pulse: Pulse, gap: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();

        let worker = tokio::spawn(async move {
            while let Some(count) = rx.recv().await {
                for n in 1..=count {
                    if let Err(err) = sink.emit_pulse(&pulse).await {
                        log_core_error(delivery_error(n, count, err));
                    } else {
                        debug!("pulse {n}/{count} at {} Hz", pulse.frequency_hz);
                    }

                    if n < count && !gap.is_zero() {
                        tokio::time::sleep(gap).await;
                    }
                }
            }
        });

        Self { tx, worker }
    }

    /// Queue `count` pulses. Never blocks and never fails the caller.
    pub fn notify(&self, count: u32) {
        if count == 0 {
            return;
        }
        if self.tx.send(count).is_err() {
            log_core_error(
                CoreError::warn()
                    .domain(Domain::Notification)
                    .kind(ErrorKind::DeliveryFailed)
                    .msg("notification worker stopped; dropping pulses")
                    .payload(Payload::Code(count))
                    .build(),
            );
        }
    }

    /// Stop accepting bursts and wait until queued pulses are delivered.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(err) = self.worker.await {
            tracing::warn!("notification worker ended abnormally: {err}");
        }
    }
}

fn delivery_error<E: fmt::Display>(n: u32, count: u32, err: E) -> CoreError {
    CoreError::warn()
        .domain(Domain::Notification)
        .kind(ErrorKind::DeliveryFailed)
        .msgf(format_args!("pulse {n}/{count} not delivered: {err}"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct DummyError;

    impl fmt::Display for DummyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "dummy error")
        }
    }

    /// Fails every `fail_every`-th pulse (0 = never).
    struct CountingSink {
        calls: AtomicUsize,
        fail_every: usize,
        seen: Mutex<Vec<Pulse>>,
    }

    impl CountingSink {
        fn new(fail_every: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_every,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl NotificationSink for CountingSink {
        type Error = DummyError;

        fn emit_pulse<'a>(&'a self, pulse: &'a Pulse) -> BoxFuture<'a, Result<(), Self::Error>> {
            Box::pin(async move {
                let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                if self.fail_every != 0 && n % self.fail_every == 0 {
                    return Err(DummyError);
                }
                self.seen.lock().unwrap().push(*pulse);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn emits_exactly_count_pulses() {
        let sink = Arc::new(CountingSink::new(0));
        let notifier = Notifier::spawn(sink.clone(), Pulse::default(), Duration::ZERO);

        notifier.notify(1);
        notifier.notify(2);
        notifier.notify(0);
        notifier.close().await;

        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
        assert!(sink
            .seen
            .lock()
            .unwrap()
            .iter()
            .all(|p| p.frequency_hz == 500 && p.duration == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn failed_pulse_does_not_stop_the_burst() {
        let sink = Arc::new(CountingSink::new(2));
        let notifier = Notifier::spawn(sink.clone(), Pulse::default(), Duration::ZERO);

        notifier.notify(3);
        notifier.close().await;

        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
        assert_eq!(sink.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn gap_separates_pulses_of_one_burst() {
        let sink = Arc::new(CountingSink::new(0));
        let notifier = Notifier::spawn(sink.clone(), Pulse::default(), Duration::from_millis(300));

        let started = tokio::time::Instant::now();
        notifier.notify(3);
        notifier.close().await;

        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(600));
    }
}
