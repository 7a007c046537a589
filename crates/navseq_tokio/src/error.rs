use std::fmt;
use std::sync::{Mutex, MutexGuard};

use navseq_core::error::{CoreError, Domain, ErrorKind, Payload, Severity};

pub fn log_core_error(err: CoreError) {
    match err.severity {
        Severity::Info => tracing::info!("{err}"),
        Severity::Warn => tracing::warn!("{err}"),
        Severity::Error => tracing::error!("{err}"),
    }
}

/// Wrap an error reported by a navigation service implementation.
pub(crate) fn navigation_error<E: fmt::Display>(what: &'static str, err: E) -> CoreError {
    CoreError::error()
        .domain(Domain::Navigation)
        .kind(ErrorKind::Transport)
        .msgf(format_args!("{what}: {err}"))
        .payload(Payload::Context {
            key: "where",
            value: what.into(),
        })
        .build()
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poison) => {
            tracing::warn!("{what} mutex poisoned");
            poison.into_inner()
        }
    }
}
