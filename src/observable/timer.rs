use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Duration, Scheduler, TaskHandle},
  subscriber::Subscriber,
};
use tracing::warn;

/// Returns an observable which emits a single `0` after `delay` on
/// `scheduler`, then completes.
pub fn timer<S>(delay: Duration, scheduler: S) -> Timer<S> { Timer { delay, scheduler } }

#[derive(Clone)]
pub struct Timer<S> {
  delay: Duration,
  scheduler: S,
}

impl<S, O> Observable<u64, RxError, O> for Timer<S>
where
  S: Scheduler,
  O: Observer<u64, RxError> + Send + 'static,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    let fire = subscriber.clone();
    let handle = TaskHandle::new();
    subscriber.subscription().add(handle.clone());
    let task = move || fire.next_and_complete::<u64, RxError>(0);
    if let Err(e) = self.scheduler.schedule_with(&handle, task, Some(self.delay)) {
      warn!(error = %e, label = e.as_label(), "timer could not be scheduled");
      subscriber.error(e.into());
    }
  }
}

impl<S> ObservableExt<u64, RxError> for Timer<S> {}
