use crate::{
  error::{RxError, SchedulerError},
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Duration, Scheduler, TaskHandle},
  subscriber::Subscriber,
};
use futures::{
  executor::ThreadPool,
  future::{abortable, Aborted, Future, FutureExt},
  task::SpawnExt,
};
use once_cell::sync::Lazy;
use tracing::{debug, warn};

/// Process-wide pool driving the futures of [`from_future`].
pub(crate) static DEFAULT_RUNTIME: Lazy<Result<ThreadPool, String>> = Lazy::new(|| {
  ThreadPool::builder()
    .name_prefix("rxcore-future-")
    .create()
    .map_err(|e| e.to_string())
});

/// Converts a `Future` resolving to a `Result` into an observable. `Ok`
/// emits the value then completes, `Err` is delivered as the error.
///
/// The future is driven on a shared thread pool. Cancelling the subscription
/// aborts it. A pool that cannot be started, or that rejects the future,
/// reaches the consumer as [`RxError::Scheduler`].
///
/// ```rust
/// use rxcore::prelude::*;
/// use std::sync::mpsc;
///
/// let (tx, rx) = mpsc::channel();
/// from_future(async { Ok::<_, RxError>(42) })
///   .subscribe_err(move |v| tx.send(v).unwrap(), |_| {});
/// assert_eq!(rx.recv().unwrap(), 42);
/// ```
pub fn from_future<F, Item, Err>(future: F) -> FromFuture<F, NoTimeout>
where
  F: Future<Output = Result<Item, Err>>,
{
  FromFuture { future, deadline: NoTimeout }
}

/// Deadline marker of a [`FromFuture`] without a timeout.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTimeout;

/// Deadline of a [`FromFuture`] built with [`FromFuture::timeout`].
#[derive(Clone)]
pub struct Timeout<S> {
  duration: Duration,
  scheduler: S,
}

#[derive(Clone)]
pub struct FromFuture<F, D> {
  future: F,
  deadline: D,
}

impl<F> FromFuture<F, NoTimeout> {
  /// Races the future against a deadline of `duration` on `scheduler`. When
  /// the deadline passes first the consumer receives [`RxError::Timeout`]
  /// and the future is aborted. When the future wins, the deadline task is
  /// cancelled.
  pub fn timeout<S: Scheduler>(self, duration: Duration, scheduler: S) -> FromFuture<F, Timeout<S>> {
    FromFuture {
      future: self.future,
      deadline: Timeout { duration, scheduler },
    }
  }
}

impl<F, Item, Err, O> Observable<Item, Err, O> for FromFuture<F, NoTimeout>
where
  F: Future<Output = Result<Item, Err>> + Send + 'static,
  O: Observer<Item, Err> + Send + 'static,
  Err: From<RxError>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    if let Err(e) = spawn_future(self.future, subscriber.clone()) {
      warn!(error = %e, label = e.as_label(), "future could not be spawned");
      subscriber.error(RxError::from(e).into());
    }
  }
}

impl<F, S, Item, Err, O> Observable<Item, Err, O> for FromFuture<F, Timeout<S>>
where
  F: Future<Output = Result<Item, Err>> + Send + 'static,
  S: Scheduler,
  O: Observer<Item, Err> + Send + 'static,
  Err: From<RxError>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    let Timeout { duration, scheduler } = self.deadline;
    if let Err(e) = spawn_future(self.future, subscriber.clone()) {
      warn!(error = %e, label = e.as_label(), "future could not be spawned");
      subscriber.error(RxError::from(e).into());
      return;
    }
    if subscriber.is_finished() {
      return;
    }

    let expire = subscriber.clone();
    let deadline = move || {
      if !expire.is_finished() {
        debug!(?duration, "future timed out");
        expire.error(RxError::Timeout(duration).into());
      }
    };
    // registered before scheduling, a scheduler waiting inline must be
    // interruptible by the future winning
    let handle = TaskHandle::new();
    subscriber.subscription().add(handle.clone());
    if let Err(e) = scheduler.schedule_with(&handle, deadline, Some(duration)) {
      warn!(error = %e, label = e.as_label(), "timeout could not be scheduled");
      subscriber.error(RxError::from(e).into());
    }
  }
}

impl<F, D, Item, Err> ObservableExt<Item, Err> for FromFuture<F, D> where
  F: Future<Output = Result<Item, Err>>
{
}

/// Spawns `future` on the shared pool, delivering its outcome to
/// `subscriber`. The abort handle is registered on the subscription first, so
/// whichever terminal event wins also stops the future.
fn spawn_future<F, Item, Err, O>(future: F, subscriber: Subscriber<O>) -> Result<(), SchedulerError>
where
  F: Future<Output = Result<Item, Err>> + Send + 'static,
  O: Observer<Item, Err> + Send + 'static,
{
  let pool = DEFAULT_RUNTIME
    .as_ref()
    .map_err(|e| SchedulerError::Spawn(e.clone()))?;
  let (future, abort) = abortable(future);
  subscriber.subscription().add_teardown(move || abort.abort());

  let task = future.map(move |resolved| match resolved {
    Ok(Ok(value)) => subscriber.next_and_complete::<Item, Err>(value),
    Ok(Err(err)) => subscriber.error(err),
    Err(Aborted) => debug!("future aborted by cancellation"),
  });
  pool.spawn(task).map_err(|e| SchedulerError::Spawn(e.to_string()))
}
