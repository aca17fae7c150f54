//! Polling a VM until it reports a target status.
//!
//! [`StatusWatch`] exposes each poll as a [`WaitEvent`] so callers can drive
//! progress output; [`wait_for_status`] drains the watch for callers that only
//! need the final VM. Lookup failures during the wait are logged and retried
//! on the next poll.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::api::types::Vm;
use crate::api::{ApiError, FluenceClient};

/// Future returned by [`VmSource::fetch_vm`].
pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<Vm, ApiError>> + Send + 'a>>;

/// Anything that can report the current state of a VM.
pub trait VmSource {
    /// Fetches the VM with the given identifier.
    fn fetch_vm<'a>(&'a self, vm_id: &'a str) -> LookupFuture<'a>;
}

impl VmSource for FluenceClient {
    fn fetch_vm<'a>(&'a self, vm_id: &'a str) -> LookupFuture<'a> {
        Box::pin(self.get_vm(vm_id))
    }
}

/// Timing for a status wait.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WaitOptions {
    timeout: Duration,
    interval: Duration,
}

impl WaitOptions {
    /// Validates and stores the timeout and poll interval.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidOptions`] when either duration is zero.
    pub fn new(timeout: Duration, interval: Duration) -> Result<Self, WaitError> {
        if timeout.is_zero() {
            return Err(WaitError::InvalidOptions(String::from(
                "timeout must be greater than zero",
            )));
        }
        if interval.is_zero() {
            return Err(WaitError::InvalidOptions(String::from(
                "poll interval must be greater than zero",
            )));
        }
        Ok(Self { timeout, interval })
    }

    /// Overall time allowed for the wait.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Delay between polls.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

/// Progress reported after each poll.
#[derive(Debug)]
pub enum WaitEvent {
    /// The VM was fetched but has not reached the target yet.
    Polled {
        /// Latest VM state.
        vm: Box<Vm>,
        /// Time since the wait started.
        elapsed: Duration,
    },
    /// The lookup failed; the wait continues.
    FetchFailed {
        /// Failure reported by the source.
        error: ApiError,
        /// Time since the wait started.
        elapsed: Duration,
    },
    /// The VM reached the target status. No further events follow.
    Reached {
        /// VM in its target state.
        vm: Box<Vm>,
        /// Time since the wait started.
        elapsed: Duration,
    },
}

impl WaitEvent {
    /// Time since the wait started.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Polled { elapsed, .. }
            | Self::FetchFailed { elapsed, .. }
            | Self::Reached { elapsed, .. } => *elapsed,
        }
    }
}

/// Pull-based poll loop over a [`VmSource`].
#[derive(Debug)]
pub struct StatusWatch<'a, S: ?Sized> {
    source: &'a S,
    vm_id: String,
    target: String,
    options: WaitOptions,
    started: Instant,
    polls: u32,
    finished: bool,
}

impl<'a, S> StatusWatch<'a, S>
where
    S: VmSource + ?Sized,
{
    /// Starts watching `vm_id` until it reports `target`.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidOptions`] when the id or target is blank.
    pub fn new(
        source: &'a S,
        vm_id: &str,
        target: &str,
        options: WaitOptions,
    ) -> Result<Self, WaitError> {
        let id = vm_id.trim();
        if id.is_empty() {
            return Err(WaitError::InvalidOptions(String::from(
                "VM id must not be empty",
            )));
        }
        let status = target.trim();
        if status.is_empty() {
            return Err(WaitError::InvalidOptions(String::from(
                "target status must not be empty",
            )));
        }
        Ok(Self {
            source,
            vm_id: id.to_owned(),
            target: status.to_owned(),
            options,
            started: Instant::now(),
            polls: 0,
            finished: false,
        })
    }

    /// VM being watched.
    #[must_use]
    pub fn vm_id(&self) -> &str {
        &self.vm_id
    }

    /// Status being waited for.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Number of lookups performed so far.
    #[must_use]
    pub const fn polls(&self) -> u32 {
        self.polls
    }

    /// Sleeps for the poll interval when a poll already happened, then polls
    /// once. Returns `None` after the target was reached or the wait timed
    /// out.
    pub async fn next_event(&mut self) -> Option<Result<WaitEvent, WaitError>> {
        if self.finished {
            return None;
        }

        if self.polls > 0 {
            let remaining = self.options.timeout.saturating_sub(self.started.elapsed());
            sleep(self.options.interval.min(remaining)).await;
        }

        if self.started.elapsed() >= self.options.timeout {
            self.finished = true;
            return Some(Err(self.timeout_error()));
        }

        self.polls = self.polls.saturating_add(1);
        let result = self.source.fetch_vm(&self.vm_id).await;
        let elapsed = self.started.elapsed();
        let event = match result {
            Ok(vm) if vm.status_is(&self.target) => {
                debug!(vm_id = %self.vm_id, status = %vm.status, "VM reached target status");
                self.finished = true;
                WaitEvent::Reached {
                    vm: Box::new(vm),
                    elapsed,
                }
            }
            Ok(vm) => {
                debug!(
                    vm_id = %self.vm_id,
                    status = %vm.status,
                    target = %self.target,
                    "VM not ready"
                );
                WaitEvent::Polled {
                    vm: Box::new(vm),
                    elapsed,
                }
            }
            Err(error) => {
                warn!(vm_id = %self.vm_id, error = %error, "status lookup failed; retrying");
                WaitEvent::FetchFailed { error, elapsed }
            }
        };
        Some(Ok(event))
    }

    pub(crate) fn timeout_error(&self) -> WaitError {
        WaitError::Timeout {
            vm_id: self.vm_id.clone(),
            target: self.target.clone(),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Polls until `vm_id` reports `target`, returning the VM in that state.
///
/// # Errors
///
/// Returns [`WaitError::InvalidOptions`] for blank inputs and
/// [`WaitError::Timeout`] when the deadline passes first.
pub async fn wait_for_status<S>(
    source: &S,
    vm_id: &str,
    target: &str,
    options: WaitOptions,
) -> Result<Vm, WaitError>
where
    S: VmSource + ?Sized,
{
    let mut watch = StatusWatch::new(source, vm_id, target, options)?;
    while let Some(event) = watch.next_event().await {
        if let WaitEvent::Reached { vm, .. } = event? {
            return Ok(*vm);
        }
    }
    Err(watch.timeout_error())
}

/// Errors raised while waiting for a status.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WaitError {
    /// Raised before polling when the inputs are unusable.
    #[error("invalid wait options: {0}")]
    InvalidOptions(String),
    /// Raised when the VM does not reach the target status in time.
    #[error(
        "timed out after {}s waiting for VM {vm_id} to reach status {target}",
        elapsed.as_secs()
    )]
    Timeout {
        /// VM that was being watched.
        vm_id: String,
        /// Status that was expected.
        target: String,
        /// Time spent waiting.
        elapsed: Duration,
    },
}
