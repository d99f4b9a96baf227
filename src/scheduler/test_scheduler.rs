//! Virtual-time scheduler for deterministic tests of time-based sources.
//!
//! Time only moves when the test says so:
//!
//! ```rust
//! use rxcore::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let scheduler = TestScheduler::new();
//! let ticks = Arc::new(Mutex::new(vec![]));
//! let c_ticks = ticks.clone();
//! let period = Duration::from_millis(100);
//! interval(period, period, scheduler.clone())
//!   .subscribe_err(move |v| c_ticks.lock().unwrap().push(v), |_| {});
//!
//! scheduler.advance_by(Duration::from_millis(350));
//! assert_eq!(*ticks.lock().unwrap(), vec![0, 1, 2]);
//! ```
//!
//! Clones share one clock and one queue, unlike the thread-local state of
//! [`TrampolineScheduler`](super::TrampolineScheduler), so a clone may be
//! moved into a source while the test keeps another to drive time.

use super::{validate_period, Duration, Queued, Scheduler, TaskHandle};
use crate::{error::SchedulerError, subscription::Subscription, util::lock};
use std::{
  collections::BTreeMap,
  sync::{Arc, Mutex},
};

#[derive(Clone, Default)]
pub struct TestScheduler(Arc<Mutex<VirtualClock>>);

#[derive(Default)]
struct VirtualClock {
  now: Duration,
  seq: u64,
  tasks: BTreeMap<(Duration, u64), Queued>,
}

impl VirtualClock {
  fn enqueue(&mut self, due: Duration, queued: Queued) {
    self.seq += 1;
    self.tasks.insert((due, self.seq), queued);
  }

  fn pop_due(&mut self, until: Duration) -> Option<(Duration, Queued)> {
    let (&key, _) = self.tasks.iter().next()?;
    if key.0 > until {
      return None;
    }
    let queued = self.tasks.remove(&key)?;
    Some((key.0, queued))
  }
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Virtual time elapsed since the scheduler was created.
  pub fn now(&self) -> Duration { lock(&self.0).now }

  /// Number of tasks waiting in the queue, cancelled ones excluded.
  pub fn pending(&self) -> usize {
    lock(&self.0)
      .tasks
      .values()
      .filter(|q| !q.handle.is_closed())
      .count()
  }

  /// Moves the clock forward by `delta`, running every task that falls due on
  /// the way. See [`advance_to`](Self::advance_to).
  pub fn advance_by(&self, delta: Duration) {
    let target = self.now() + delta;
    self.advance_to(target);
  }

  /// Moves the clock to `target`, running every task due at or before it in
  /// due order. During each run the clock reads the task's due time, and
  /// tasks scheduled by a running task are picked up if they fall due before
  /// `target`. A `target` in the past leaves the clock untouched.
  pub fn advance_to(&self, target: Duration) {
    loop {
      // the lock is released while the task runs, tasks may schedule more
      let next = {
        let mut clock = lock(&self.0);
        let next = clock.pop_due(target);
        if let Some((due, _)) = next {
          clock.now = clock.now.max(due);
        }
        next
      };
      let Some((due, queued)) = next else { break };
      if let Some((period, again)) = queued.run() {
        lock(&self.0).enqueue(due + period, again);
      }
    }
    let mut clock = lock(&self.0);
    clock.now = clock.now.max(target);
  }
}

impl Scheduler for TestScheduler {
  fn schedule_with<T>(&self, handle: &TaskHandle, task: T, delay: Option<Duration>) -> Result<(), SchedulerError>
  where
    T: FnOnce() + Send + 'static,
  {
    let mut clock = lock(&self.0);
    let due = clock.now + delay.unwrap_or_default();
    clock.enqueue(due, Queued::once(handle.clone(), task));
    Ok(())
  }

  fn schedule_periodic_with<T>(
    &self, handle: &TaskHandle, task: T, initial_delay: Duration, period: Duration,
  ) -> Result<(), SchedulerError>
  where
    T: FnMut() -> bool + Send + 'static,
  {
    validate_period(period)?;
    let mut clock = lock(&self.0);
    let due = clock.now + initial_delay;
    clock.enqueue(due, Queued::periodic(handle.clone(), task, period));
    Ok(())
  }
}
