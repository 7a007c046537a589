use std::convert::Infallible;

use navseq_tokio::navigation::BoxFuture;
use navseq_tokio::{NotificationSink, Pulse};
use tracing::info;

/// Stand-in audio output: logs each pulse and holds for its duration the way
/// a speaker would.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    type Error = Infallible;

    fn emit_pulse<'a>(&'a self, pulse: &'a Pulse) -> BoxFuture<'a, Result<(), Self::Error>> {
        Box::pin(async move {
            info!(
                "beep: {} Hz for {} ms",
                pulse.frequency_hz,
                pulse.duration.as_millis()
            );
            tokio::time::sleep(pulse.duration).await;
            Ok(())
        })
    }
}
