use super::{validate_period, Duration, Queued, Scheduler, TaskHandle};
use crate::error::SchedulerError;
use tokio::{runtime::Handle, time};

/// Runs tasks as tokio tasks on a runtime.
///
/// Cancelling a [`TaskHandle`] aborts the tokio task, so a pending delay or
/// periodic loop is dropped at its next await point.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
  runtime: Handle,
}

impl TokioScheduler {
  /// Uses the runtime the caller is running in.
  pub fn current() -> Result<Self, SchedulerError> {
    Handle::try_current()
      .map(|runtime| TokioScheduler { runtime })
      .map_err(|e| SchedulerError::NoRuntime(e.to_string()))
  }

  pub fn from_handle(runtime: Handle) -> Self { TokioScheduler { runtime } }
}

impl Scheduler for TokioScheduler {
  fn schedule_with<T>(&self, handle: &TaskHandle, task: T, delay: Option<Duration>) -> Result<(), SchedulerError>
  where
    T: FnOnce() + Send + 'static,
  {
    let queued = Queued::once(handle.clone(), task);
    let join = self.runtime.spawn(async move {
      if let Some(delay) = delay {
        time::sleep(delay).await;
      }
      queued.run();
    });
    let abort = join.abort_handle();
    handle.on_release(move || abort.abort());
    Ok(())
  }

  fn schedule_periodic_with<T>(
    &self, handle: &TaskHandle, task: T, initial_delay: Duration, period: Duration,
  ) -> Result<(), SchedulerError>
  where
    T: FnMut() -> bool + Send + 'static,
  {
    validate_period(period)?;
    let mut queued = Queued::periodic(handle.clone(), task, period);
    let join = self.runtime.spawn(async move {
      // missed ticks burst to catch up, keeping firings on the period grid
      let mut ticks = time::interval_at(time::Instant::now() + initial_delay, period);
      loop {
        ticks.tick().await;
        match queued.run() {
          Some((_, next)) => queued = next,
          None => break,
        }
      }
    });
    let abort = join.abort_handle();
    handle.on_release(move || abort.abort());
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::subscription::Subscription;
  use std::sync::{Arc, Mutex};

  #[test]
  fn no_runtime_outside_tokio() {
    assert!(matches!(TokioScheduler::current(), Err(SchedulerError::NoRuntime(_))));
  }

  #[tokio::test(start_paused = true)]
  async fn delayed_task() {
    let scheduler = TokioScheduler::current().unwrap();
    let hit = Arc::new(Mutex::new(false));
    let c_hit = hit.clone();
    scheduler
      .schedule(move || *c_hit.lock().unwrap() = true, Some(Duration::from_millis(50)))
      .unwrap();
    time::sleep(Duration::from_millis(40)).await;
    assert!(!*hit.lock().unwrap());
    time::sleep(Duration::from_millis(20)).await;
    assert!(*hit.lock().unwrap());
  }

  #[tokio::test(start_paused = true)]
  async fn periodic_and_cancel() {
    let scheduler = TokioScheduler::current().unwrap();
    let ticks = Arc::new(Mutex::new(0));
    let c_ticks = ticks.clone();
    let handle = scheduler
      .schedule_periodic(
        move || {
          *c_ticks.lock().unwrap() += 1;
          true
        },
        Duration::from_millis(10),
        Duration::from_millis(10),
      )
      .unwrap();
    time::sleep(Duration::from_millis(35)).await;
    assert_eq!(*ticks.lock().unwrap(), 3);
    handle.unsubscribe();
    time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*ticks.lock().unwrap(), 3);
  }
}
