use super::{validate_period, Duration, Instant, Queued, Scheduler, TaskHandle};
use crate::error::SchedulerError;
use std::{
  sync::{
    mpsc::{channel, Receiver, RecvTimeoutError},
    Arc,
  },
  thread,
};
use tracing::debug;

/// Spawns a dedicated OS thread for every scheduled task.
///
/// The thread sleeps until the task is due. Cancelling the handle wakes it up
/// so a cancelled task does not keep its thread parked until the deadline.
#[derive(Clone, Debug, Default)]
pub struct NewThreadScheduler {
  name: Option<Arc<str>>,
}

impl NewThreadScheduler {
  pub fn new() -> Self { Self::default() }

  /// Gives every worker thread the name `name`, which shows up in debuggers
  /// and panic messages.
  pub fn named(name: impl Into<Arc<str>>) -> Self { NewThreadScheduler { name: Some(name.into()) } }

  fn spawn(&self, handle: &TaskHandle, due: Instant, queued: Queued) -> Result<(), SchedulerError> {
    let (wake, sleeper) = channel::<()>();
    handle.on_release(move || {
      let _ = wake.send(());
    });

    let mut builder = thread::Builder::new();
    if let Some(name) = &self.name {
      builder = builder.name(name.to_string());
    }
    builder
      .spawn(move || {
        let mut due = due;
        let mut queued = queued;
        loop {
          if !wait_until(&sleeper, due) {
            return;
          }
          match queued.run() {
            Some((period, next)) => {
              due += period;
              queued = next;
            }
            None => return,
          }
        }
      })
      .map(|_| ())
      .map_err(|e| {
        debug!(error = %e, "failed to spawn scheduler thread");
        SchedulerError::Spawn(e.to_string())
      })
  }
}

/// Parks until `due`. Returns `false` if the task was released first.
fn wait_until(sleeper: &Receiver<()>, due: Instant) -> bool {
  let now = Instant::now();
  if due <= now {
    return !matches!(sleeper.try_recv(), Ok(()));
  }
  matches!(sleeper.recv_timeout(due - now), Err(RecvTimeoutError::Timeout))
}

impl Scheduler for NewThreadScheduler {
  fn schedule_with<T>(&self, handle: &TaskHandle, task: T, delay: Option<Duration>) -> Result<(), SchedulerError>
  where
    T: FnOnce() + Send + 'static,
  {
    let due = Instant::now() + delay.unwrap_or_default();
    self.spawn(handle, due, Queued::once(handle.clone(), task))
  }

  fn schedule_periodic_with<T>(
    &self, handle: &TaskHandle, task: T, initial_delay: Duration, period: Duration,
  ) -> Result<(), SchedulerError>
  where
    T: FnMut() -> bool + Send + 'static,
  {
    validate_period(period)?;
    let due = Instant::now() + initial_delay;
    self.spawn(handle, due, Queued::periodic(handle.clone(), task, period))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::subscription::Subscription;
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc, Mutex,
  };

  #[test]
  fn runs_on_another_thread() {
    let (tx, rx) = mpsc::channel();
    let caller = thread::current().id();
    NewThreadScheduler::named("rx-worker")
      .schedule(
        move || {
          let current = thread::current();
          tx.send((current.id(), current.name().map(str::to_owned))).unwrap();
        },
        None,
      )
      .unwrap();
    let (id, name) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(id, caller);
    assert_eq!(name.as_deref(), Some("rx-worker"));
  }

  #[test]
  fn respects_delay() {
    let (tx, rx) = mpsc::channel();
    let start = Instant::now();
    NewThreadScheduler::new()
      .schedule(move || tx.send(Instant::now()).unwrap(), Some(Duration::from_millis(20)))
      .unwrap();
    let fired = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(fired - start >= Duration::from_millis(20));
  }

  #[test]
  fn cancel_before_due_prevents_run() {
    let hits = Arc::new(AtomicUsize::new(0));
    let c_hits = hits.clone();
    let handle = NewThreadScheduler::new()
      .schedule(
        move || {
          c_hits.fetch_add(1, Ordering::SeqCst);
        },
        Some(Duration::from_millis(200)),
      )
      .unwrap();
    handle.unsubscribe();
    thread::sleep(Duration::from_millis(300));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn periodic_until_stopped() {
    let (tx, rx) = mpsc::channel();
    let count = Arc::new(Mutex::new(0));
    let c_count = count.clone();
    NewThreadScheduler::new()
      .schedule_periodic(
        move || {
          let mut count = c_count.lock().unwrap();
          *count += 1;
          if *count == 3 {
            tx.send(()).unwrap();
          }
          *count < 3
        },
        Duration::ZERO,
        Duration::from_millis(5),
      )
      .unwrap();
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(*count.lock().unwrap(), 3);
  }
}
