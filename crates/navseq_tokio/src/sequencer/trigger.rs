use std::time::Duration;

use navseq_core::error::Result;
use tokio::task::JoinHandle;
use tracing::debug;

use super::SequencerHandle;
use crate::error::log_core_error;

/// One-shot delayed start, fired once after the node comes up.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StartTrigger {
    delay: Duration,
}

impl StartTrigger {
    pub fn after(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the delay, then start the sequence. A failed start is
    /// logged and also returned through the join handle.
    pub fn spawn(self, handle: SequencerHandle) -> JoinHandle<Result<()>> {
        tokio::spawn(async move {
            tokio::time::sleep(self.delay).await;
            debug!("start trigger fired after {:?}", self.delay);

            let result = handle.start().await;
            if let Err(err) = &result {
                log_core_error(err.clone());
            }
            result
        })
    }
}
