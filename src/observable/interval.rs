use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Duration, Scheduler, TaskHandle},
  subscriber::Subscriber,
};
use tracing::warn;

/// Creates an observable which will fire `0` after `initial_delay`, then an
/// increasing count every `period`, until the subscription is cancelled.
///
/// Ticks are anchored to the schedule, a late tick does not push back the
/// following ones. If the scheduler rejects the periodic task, for example
/// because `period` is zero, the consumer receives
/// [`RxError::Scheduler`] and no tick happens.
///
/// On the [`TrampolineScheduler`](crate::scheduler::TrampolineScheduler) the
/// ticks run inside the `subscribe*` call, which only returns once the
/// observer reports [`is_finished`](crate::observer::Observer::is_finished).
/// The returned handle arrives too late to stop it, so pick a scheduler with
/// its own execution context when the ticks are to be cancelled from outside.
pub fn interval<S>(initial_delay: Duration, period: Duration, scheduler: S) -> Interval<S> {
  Interval { initial_delay, period, scheduler }
}

#[derive(Clone)]
pub struct Interval<S> {
  initial_delay: Duration,
  period: Duration,
  scheduler: S,
}

impl<S, O> Observable<u64, RxError, O> for Interval<S>
where
  S: Scheduler,
  O: Observer<u64, RxError> + Send + 'static,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    let Self { initial_delay, period, scheduler } = self;
    let mut ticker = subscriber.clone();
    let mut seq = 0;
    let task = move || interval_task(&mut ticker, &mut seq);
    let handle = TaskHandle::new();
    subscriber.subscription().add(handle.clone());
    if let Err(e) = scheduler.schedule_periodic_with(&handle, task, initial_delay, period) {
      warn!(error = %e, label = e.as_label(), "interval could not be scheduled");
      subscriber.error(e.into());
    }
  }
}

impl<S> ObservableExt<u64, RxError> for Interval<S> {}

fn interval_task<O>(observer: &mut Subscriber<O>, seq: &mut u64) -> bool
where
  O: Observer<u64, RxError>,
{
  if observer.is_finished() {
    return false;
  }
  observer.next(*seq);
  *seq += 1;
  !observer.is_finished()
}
