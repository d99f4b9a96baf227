//! Error types shared by sources and schedulers.
//!
//! - [`RxError`]: errors produced by the crate itself, either returned
//!   synchronously from a factory (invalid arguments) or delivered through a
//!   consumer's error channel (scheduler failures, timeouts).
//! - [`SchedulerError`]: a scheduler refused or failed to accept work.
//!
//! Sources that need to report crate errors to a consumer require the
//! consumer's error type to implement `From<RxError>`.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by `rxcore` sources.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RxError {
  /// A factory argument violated its contract. Returned before any
  /// subscription exists, never delivered to a consumer.
  #[error("invalid argument `{name}`: {reason}")]
  InvalidArgument {
    /// Name of the offending parameter.
    name: &'static str,
    /// What is wrong with it.
    reason: String,
  },

  /// Work could not be handed to a scheduler.
  #[error("scheduler failure: {0}")]
  Scheduler(#[from] SchedulerError),

  /// A pending result did not resolve within its deadline.
  #[error("timed out after {0:?}")]
  Timeout(Duration),
}

impl RxError {
  /// Returns a short stable label (snake_case) for use in logs.
  ///
  /// # Example
  /// ```
  /// use rxcore::RxError;
  /// use std::time::Duration;
  ///
  /// assert_eq!(RxError::Timeout(Duration::from_secs(1)).as_label(), "rx_timeout");
  /// ```
  pub fn as_label(&self) -> &'static str {
    match self {
      RxError::InvalidArgument { .. } => "rx_invalid_argument",
      RxError::Scheduler(_) => "rx_scheduler_failure",
      RxError::Timeout(_) => "rx_timeout",
    }
  }

  pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
    RxError::InvalidArgument { name, reason: reason.into() }
  }
}

/// Errors produced by a [`Scheduler`](crate::scheduler::Scheduler) when it
/// cannot accept a task.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
  /// A worker (thread, pool task) could not be started.
  #[error("failed to spawn worker: {0}")]
  Spawn(String),

  /// The scheduler needs a runtime that is not available.
  #[error("no runtime available: {0}")]
  NoRuntime(String),

  /// Periodic work was requested with a zero period.
  #[error("periodic task requires a non-zero period")]
  InvalidPeriod,
}

impl SchedulerError {
  /// Returns a short stable label (snake_case) for use in logs.
  pub fn as_label(&self) -> &'static str {
    match self {
      SchedulerError::Spawn(_) => "scheduler_spawn",
      SchedulerError::NoRuntime(_) => "scheduler_no_runtime",
      SchedulerError::InvalidPeriod => "scheduler_invalid_period",
    }
  }
}
