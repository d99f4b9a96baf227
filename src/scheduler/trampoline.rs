use super::{validate_period, Duration, Instant, Queued, Scheduler, TaskHandle};
use crate::{error::SchedulerError, subscription::Subscription};
use std::{cell::RefCell, collections::BTreeMap, mem, thread};

/// Runs tasks on the calling thread.
///
/// The first task scheduled on an idle thread runs immediately, inside the
/// `schedule` call. Tasks scheduled while that task runs are queued, ordered
/// by due time then by insertion, and drained after it returns. Work that
/// keeps rescheduling itself therefore loops instead of recursing, and the
/// call stack stays flat.
///
/// Delays block the current thread until the task is due. The wait ends early
/// when the task's handle is cancelled, from any thread, so register the
/// handle before scheduling (see [`Scheduler::schedule_with`]) when another
/// thread may need to call the task off.
///
/// A periodic task keeps the thread busy until it stops itself or its handle
/// is cancelled. Because `schedule_periodic` only returns once the task is
/// over, the returned handle cannot be used for that.
///
/// If a task panics, the tasks still queued on this thread are cancelled
/// rather than left for the next, unrelated `schedule` call.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrampolineScheduler;

#[derive(Default)]
struct TrampolineState {
  seq: u64,
  draining: bool,
  queue: BTreeMap<(Instant, u64), Queued>,
}

impl TrampolineState {
  fn enqueue(&mut self, due: Instant, queued: Queued) {
    self.seq = self.seq.wrapping_add(1);
    self.queue.insert((due, self.seq), queued);
  }
}

thread_local! {
  static STATE: RefCell<TrampolineState> = RefCell::new(TrampolineState::default());
}

fn enqueue(due: Instant, queued: Queued) { STATE.with(|s| s.borrow_mut().enqueue(due, queued)); }

struct DrainGuard;

impl Drop for DrainGuard {
  fn drop(&mut self) {
    let stale = STATE.with(|s| {
      let mut state = s.borrow_mut();
      state.draining = false;
      if thread::panicking() { mem::take(&mut state.queue) } else { BTreeMap::new() }
    });
    for queued in stale.into_values() {
      queued.handle.unsubscribe();
    }
  }
}

fn drain() {
  if STATE.with(|s| mem::replace(&mut s.borrow_mut().draining, true)) {
    return;
  }
  let _guard = DrainGuard;
  while let Some(((due, _), queued)) = STATE.with(|s| s.borrow_mut().queue.pop_first()) {
    if !wait_until(&queued.handle, due) {
      continue;
    }
    if let Some((period, next)) = queued.run() {
      enqueue(due + period, next);
    }
  }
}

/// Parks until `due`. Returns `false` if the handle was closed first.
fn wait_until(handle: &TaskHandle, due: Instant) -> bool {
  loop {
    if handle.is_closed() {
      return false;
    }
    let now = Instant::now();
    if now >= due {
      return true;
    }
    thread::park_timeout(due - now);
  }
}

/// Wakes this thread when `handle` is released, so a pending wait notices a
/// cancellation coming from another thread.
fn wake_on_release(handle: &TaskHandle) {
  let waiter = thread::current();
  handle.on_release(move || waiter.unpark());
}

impl Scheduler for TrampolineScheduler {
  fn schedule_with<T>(&self, handle: &TaskHandle, task: T, delay: Option<Duration>) -> Result<(), SchedulerError>
  where
    T: FnOnce() + Send + 'static,
  {
    let due = Instant::now() + delay.unwrap_or_default();
    if delay.is_some() {
      wake_on_release(handle);
    }
    enqueue(due, Queued::once(handle.clone(), task));
    drain();
    Ok(())
  }

  fn schedule_periodic_with<T>(
    &self, handle: &TaskHandle, task: T, initial_delay: Duration, period: Duration,
  ) -> Result<(), SchedulerError>
  where
    T: FnMut() -> bool + Send + 'static,
  {
    validate_period(period)?;
    wake_on_release(handle);
    enqueue(Instant::now() + initial_delay, Queued::periodic(handle.clone(), task, period));
    drain();
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn runs_inline_when_idle() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    let handle = TrampolineScheduler
      .schedule(move || c_log.lock().unwrap().push(1), None)
      .unwrap();
    assert_eq!(*log.lock().unwrap(), vec![1]);
    assert!(handle.is_finished());
  }

  #[test]
  fn nested_schedules_are_queued_not_nested() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    TrampolineScheduler
      .schedule(
        move || {
          let inner_log = c_log.clone();
          TrampolineScheduler
            .schedule(move || inner_log.lock().unwrap().push("inner"), None)
            .unwrap();
          c_log.lock().unwrap().push("outer");
        },
        None,
      )
      .unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
  }

  #[test]
  fn deep_self_rescheduling_keeps_stack_flat() {
    fn step(left: Arc<Mutex<usize>>) {
      let more = {
        let mut left = left.lock().unwrap();
        *left -= 1;
        *left > 0
      };
      if more {
        TrampolineScheduler.schedule(move || step(left), None).unwrap();
      }
    }
    let left = Arc::new(Mutex::new(200_000));
    let c_left = left.clone();
    TrampolineScheduler.schedule(move || step(c_left), None).unwrap();
    assert_eq!(*left.lock().unwrap(), 0);
  }

  #[test]
  fn periodic_runs_until_it_stops() {
    let ticks = Arc::new(Mutex::new(0));
    let c_ticks = ticks.clone();
    let handle = TrampolineScheduler
      .schedule_periodic(
        move || {
          let mut ticks = c_ticks.lock().unwrap();
          *ticks += 1;
          *ticks < 3
        },
        Duration::ZERO,
        Duration::from_millis(1),
      )
      .unwrap();
    assert_eq!(*ticks.lock().unwrap(), 3);
    assert!(handle.is_finished());
  }

  #[test]
  fn wait_is_cut_short_by_cancel_from_another_thread() {
    let handle = TaskHandle::new();
    let canceller = handle.clone();
    let hits = Arc::new(Mutex::new(0));
    let c_hits = hits.clone();
    thread::spawn(move || {
      thread::sleep(Duration::from_millis(20));
      canceller.unsubscribe();
    });

    let start = Instant::now();
    TrampolineScheduler
      .schedule_with(&handle, move || *c_hits.lock().unwrap() += 1, Some(Duration::from_secs(10)))
      .unwrap();
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(*hits.lock().unwrap(), 0);
    assert!(handle.is_cancelled());
  }

  #[test]
  fn panic_cancels_queued_tasks() {
    let stale = Arc::new(Mutex::new(0));
    let c_stale = stale.clone();
    let inner = Arc::new(Mutex::new(None));
    let c_inner = inner.clone();
    let result = std::panic::catch_unwind(move || {
      TrampolineScheduler
        .schedule(
          move || {
            let handle = TrampolineScheduler
              .schedule(move || *c_stale.lock().unwrap() += 1, None)
              .unwrap();
            *c_inner.lock().unwrap() = Some(handle);
            panic!("task failed");
          },
          None,
        )
        .unwrap();
    });
    assert!(result.is_err());

    TrampolineScheduler.schedule(|| {}, None).unwrap();
    assert_eq!(*stale.lock().unwrap(), 0);
    assert!(inner.lock().unwrap().as_ref().unwrap().is_cancelled());
  }
}
