//! Time and execution-placement authority for delayed and periodic work.
//!
//! A [`Scheduler`] accepts two kinds of work:
//!
//! - once tasks, run after an optional delay;
//! - periodic tasks, first run after an initial delay, then every period.
//!   Firings are anchored to the previous *scheduled* time, not to when the
//!   previous firing actually ran, so lateness does not accumulate.
//!
//! Both return a [`TaskHandle`]. Cancelling a handle before the task fires
//! prevents it from running; cancelling during or after a firing is a no-op.
//!
//! Provided schedulers:
//!
//! | Scheduler | Runs tasks on |
//! |-----------|---------------|
//! | [`TrampolineScheduler`] | the calling thread, queued instead of nested |
//! | [`NewThreadScheduler`] | a fresh OS thread per task |
//! | [`TestScheduler`] | whoever advances its virtual clock |
//! | `TokioScheduler` | a tokio runtime (feature `tokio-scheduler`) |

use crate::{
  error::SchedulerError,
  subscription::{Subscription, SubscriptionHandle},
};

pub use std::time::{Duration, Instant};

mod test_scheduler;
mod thread_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
mod trampoline;

pub use test_scheduler::TestScheduler;
pub use thread_scheduler::NewThreadScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;
pub use trampoline::TrampolineScheduler;

/// A Scheduler is an object to order tasks and schedule their execution.
///
/// Implementations provide the `*_with` methods, which take the handle up
/// front. A caller that must be able to cancel a task before `schedule`
/// returns, for example because the scheduler may run or wait inline,
/// registers the handle first and then hands it over.
pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Runs `task` once, no earlier than `delay` from now.
  fn schedule<T>(&self, task: T, delay: Option<Duration>) -> Result<TaskHandle, SchedulerError>
  where
    T: FnOnce() + Send + 'static,
  {
    let handle = TaskHandle::new();
    self.schedule_with(&handle, task, delay)?;
    Ok(handle)
  }

  /// Runs `task` after `initial_delay`, then every `period`, until the handle
  /// is cancelled or `task` returns `false`.
  ///
  /// A zero `period` is rejected with [`SchedulerError::InvalidPeriod`].
  fn schedule_periodic<T>(
    &self, task: T, initial_delay: Duration, period: Duration,
  ) -> Result<TaskHandle, SchedulerError>
  where
    T: FnMut() -> bool + Send + 'static,
  {
    let handle = TaskHandle::new();
    self.schedule_periodic_with(&handle, task, initial_delay, period)?;
    Ok(handle)
  }

  /// [`schedule`](Self::schedule), reporting through `handle`.
  fn schedule_with<T>(&self, handle: &TaskHandle, task: T, delay: Option<Duration>) -> Result<(), SchedulerError>
  where
    T: FnOnce() + Send + 'static;

  /// [`schedule_periodic`](Self::schedule_periodic), reporting through
  /// `handle`.
  fn schedule_periodic_with<T>(
    &self, handle: &TaskHandle, task: T, initial_delay: Duration, period: Duration,
  ) -> Result<(), SchedulerError>
  where
    T: FnMut() -> bool + Send + 'static;
}

/// Cancellation handle of a scheduled task.
///
/// A once task is *finished* as soon as it starts running; a periodic task
/// when it asks to stop. Both end states make `unsubscribe` a no-op.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle(SubscriptionHandle);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  #[inline]
  pub fn is_finished(&self) -> bool { self.0.is_terminated() }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.is_cancelled() }

  /// Marks a once task as started. `false` if it was cancelled first.
  #[inline]
  pub(crate) fn claim(&self) -> bool { self.0.try_terminate() }

  /// Ends a periodic task on its own initiative.
  pub(crate) fn stop(&self) {
    if self.0.try_terminate() {
      self.0.release();
    }
  }

  /// Registers a hook run when the task is cancelled or has finished.
  pub(crate) fn on_release<F>(&self, f: F)
  where
    F: FnOnce() + Send + 'static,
  {
    self.0.add_teardown(f)
  }

  #[inline]
  pub(crate) fn release(&self) { self.0.release() }
}

impl Subscription for TaskHandle {
  #[inline]
  fn unsubscribe(&self) { self.0.cancel() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

pub(crate) fn validate_period(period: Duration) -> Result<(), SchedulerError> {
  if period.is_zero() { Err(SchedulerError::InvalidPeriod) } else { Ok(()) }
}

pub(crate) enum Job {
  Once(Box<dyn FnOnce() + Send>),
  Periodic { task: Box<dyn FnMut() -> bool + Send>, period: Duration },
}

/// A task waiting in some scheduler's queue.
pub(crate) struct Queued {
  pub(crate) handle: TaskHandle,
  pub(crate) job: Job,
}

impl Queued {
  pub(crate) fn once<T>(handle: TaskHandle, task: T) -> Self
  where
    T: FnOnce() + Send + 'static,
  {
    Queued { handle, job: Job::Once(Box::new(task)) }
  }

  pub(crate) fn periodic<T>(handle: TaskHandle, task: T, period: Duration) -> Self
  where
    T: FnMut() -> bool + Send + 'static,
  {
    Queued { handle, job: Job::Periodic { task: Box::new(task), period } }
  }

  /// Fires the task once. A periodic task that wants to keep going comes
  /// back with the delay after which it is due again.
  pub(crate) fn run(self) -> Option<(Duration, Queued)> {
    let Queued { handle, job } = self;
    match job {
      Job::Once(task) => {
        if handle.claim() {
          task();
          handle.release();
        }
        None
      }
      Job::Periodic { mut task, period } => {
        if handle.is_closed() {
          return None;
        }
        if task() && !handle.is_closed() {
          Some((period, Queued { handle, job: Job::Periodic { task, period } }))
        } else {
          handle.stop();
          None
        }
      }
    }
  }
}

/// Rejects every task, for exercising the failure paths of sources.
#[cfg(test)]
#[derive(Clone)]
pub(crate) struct RefusingScheduler;

#[cfg(test)]
impl Scheduler for RefusingScheduler {
  fn schedule_with<T>(&self, _: &TaskHandle, _: T, _: Option<Duration>) -> Result<(), SchedulerError>
  where
    T: FnOnce() + Send + 'static,
  {
    Err(SchedulerError::Spawn("no workers".into()))
  }

  fn schedule_periodic_with<T>(&self, _: &TaskHandle, _: T, _: Duration, _: Duration) -> Result<(), SchedulerError>
  where
    T: FnMut() -> bool + Send + 'static,
  {
    Err(SchedulerError::Spawn("no workers".into()))
  }
}
