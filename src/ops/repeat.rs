use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Scheduler, TaskHandle},
  subscriber::Subscriber,
};
use tracing::{trace, warn};

/// Resubscribes to `source` every time it completes.
///
/// Created by [`ObservableExt::repeat`] and [`ObservableExt::repeat_on`].
/// `count` is the total number of subscriptions to `source`, `None` meaning
/// no limit. An error from `source` ends the repetition and is forwarded.
#[derive(Clone)]
pub struct Repeat<S, Sch> {
  source: S,
  count: Option<usize>,
  scheduler: Sch,
}

impl<S, Sch> Repeat<S, Sch> {
  pub(crate) fn new(source: S, count: Option<usize>, scheduler: Sch) -> Self {
    Repeat { source, count, scheduler }
  }
}

/// Observer for the repeat operator.
///
/// # Internal Implementation Detail
///
/// This struct is public to satisfy type trait bounds in the public API,
/// but it is an internal implementation detail of the `repeat` operator.
pub struct RepeatObserver<S, Sch, O> {
  source: S,
  remaining: Option<usize>,
  downstream: Subscriber<O>,
  scheduler: Sch,
  // use function pointer to avoid circular type bounds requirements
  subscribe_fn: fn(Self),
}

impl<S, Sch, O, Item, Err> Observable<Item, Err, O> for Repeat<S, Sch>
where
  S: Observable<Item, Err, RepeatObserver<S, Sch, O>> + Clone + Send + 'static,
  Sch: Scheduler,
  O: Observer<Item, Err> + Send + 'static,
  Err: From<RxError>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    if self.count == Some(0) {
      subscriber.complete();
      return;
    }
    RepeatObserver {
      source: self.source,
      remaining: self.count,
      downstream: subscriber,
      scheduler: self.scheduler,
      subscribe_fn: RepeatObserver::subscribe_round::<Item, Err>,
    }
    .schedule_round::<Item, Err>();
  }
}

impl<S, Sch, Item, Err> ObservableExt<Item, Err> for Repeat<S, Sch> where S: ObservableExt<Item, Err> {}

impl<S, Sch, O> RepeatObserver<S, Sch, O> {
  /// Subscribes `source` once more, unless the consumer has gone away. The
  /// round's own subscription is registered on the consumer's, so cancelling
  /// the consumer also stops the round in flight.
  fn subscribe_round<Item, Err>(self)
  where
    S: Observable<Item, Err, Self> + Clone,
    O: Observer<Item, Err>,
  {
    if self.downstream.is_finished() {
      return;
    }
    trace!(remaining = ?self.remaining, "repeat subscribes a new round");
    let source = self.source.clone();
    let downstream = self.downstream.subscription().clone();
    let round = Subscriber::new(self);
    downstream.add(round.subscription().clone());
    source.actual_subscribe(round);
  }

  /// Hands the next round to the scheduler, so a source completing
  /// synchronously does not recurse into the next subscription.
  fn schedule_round<Item, Err>(self)
  where
    S: Send + 'static,
    Sch: Scheduler,
    O: Observer<Item, Err> + Send + 'static,
    Err: From<RxError>,
  {
    let downstream = self.downstream.clone();
    let scheduler = self.scheduler.clone();
    let subscribe_fn = self.subscribe_fn;
    let handle = TaskHandle::new();
    downstream.subscription().add(handle.clone());
    if let Err(e) = scheduler.schedule_with(&handle, move || subscribe_fn(self), None) {
      warn!(error = %e, label = e.as_label(), "repeat could not schedule the next round");
      downstream.error(RxError::from(e).into());
    }
  }
}

impl<S, Sch, O, Item, Err> Observer<Item, Err> for RepeatObserver<S, Sch, O>
where
  S: Send + 'static,
  Sch: Scheduler,
  O: Observer<Item, Err> + Send + 'static,
  Err: From<RxError>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.downstream.next(value); }

  #[inline]
  fn error(self, err: Err) { self.downstream.error(err); }

  fn complete(mut self) {
    match self.remaining {
      Some(n) if n <= 1 => self.downstream.complete(),
      Some(n) => {
        self.remaining = Some(n - 1);
        self.schedule_round::<Item, Err>();
      }
      None => self.schedule_round::<Item, Err>(),
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.downstream.is_finished() }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, scheduler::RefusingScheduler};
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  #[derive(Default)]
  struct Log {
    values: Vec<i32>,
    errors: Vec<RxError>,
    completes: usize,
  }

  #[derive(Clone, Default)]
  struct Recorder(Arc<Mutex<Log>>);

  impl Observer<i32, RxError> for Recorder {
    fn next(&mut self, v: i32) { self.0.lock().unwrap().values.push(v); }
    fn error(self, e: RxError) { self.0.lock().unwrap().errors.push(e); }
    fn complete(self) { self.0.lock().unwrap().completes += 1; }
    fn is_finished(&self) -> bool { false }
  }

  #[test]
  fn repeats_count_times() {
    let recorder = Recorder::default();
    of(1).repeat(Some(3)).subscribe_with(recorder.clone());
    let log = recorder.0.lock().unwrap();
    assert_eq!(log.values, vec![1, 1, 1]);
    assert_eq!(log.completes, 1);
  }

  #[test]
  fn zero_count_completes_without_subscribing() {
    let subscribed = Arc::new(AtomicUsize::new(0));
    let c_subscribed = subscribed.clone();
    let source = defer(move || {
      c_subscribed.fetch_add(1, Ordering::SeqCst);
      Ok(of(1))
    });
    let recorder = Recorder::default();
    source.repeat(Some(0)).subscribe_with(recorder.clone());
    assert_eq!(subscribed.load(Ordering::SeqCst), 0);
    assert_eq!(recorder.0.lock().unwrap().completes, 1);
  }

  #[test]
  fn error_stops_repetition() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let c_attempts = attempts.clone();
    let source = defer(move || {
      let n = c_attempts.fetch_add(1, Ordering::SeqCst);
      let round = if n < 1 { Ok(n as i32) } else { Err(RxError::Timeout(Duration::ZERO)) };
      Ok(from_iter_result(vec![round]))
    });
    let recorder = Recorder::default();
    source.repeat(None).subscribe_with(recorder.clone());
    let log = recorder.0.lock().unwrap();
    assert_eq!(log.values, vec![0]);
    assert_eq!(log.errors, vec![RxError::Timeout(Duration::ZERO)]);
    assert_eq!(log.completes, 0);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
  }

  struct Take(Arc<Mutex<Vec<i32>>>, usize);

  impl Observer<i32, RxError> for Take {
    fn next(&mut self, v: i32) { self.0.lock().unwrap().push(v); }
    fn error(self, _: RxError) {}
    fn complete(self) {}
    fn is_finished(&self) -> bool { self.0.lock().unwrap().len() >= self.1 }
  }

  #[test]
  fn unbounded_sync_repeat_keeps_stack_flat() {
    let seen = Arc::new(Mutex::new(vec![]));
    let handle = of(7).repeat(None).subscribe_with(Take(seen.clone(), 100_000));
    assert_eq!(seen.lock().unwrap().len(), 100_000);
    assert!(handle.is_closed());
  }

  #[test]
  fn delayed_rounds_on_test_scheduler() {
    let scheduler = TestScheduler::new();
    let recorder = Recorder::default();
    timer(Duration::from_millis(10), scheduler.clone())
      .repeat_on(Some(3), scheduler.clone())
      .subscribe_with(MapU64(recorder.clone()));

    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(recorder.0.lock().unwrap().values, vec![0]);
    scheduler.advance_by(Duration::from_millis(20));
    let log = recorder.0.lock().unwrap();
    assert_eq!(log.values, vec![0, 0, 0]);
    assert_eq!(log.completes, 1);
  }

  #[test]
  fn cancel_stops_pending_round() {
    let scheduler = TestScheduler::new();
    let recorder = Recorder::default();
    let handle = of(1)
      .repeat_on(None, scheduler.clone())
      .subscribe_with(recorder.clone());
    assert_eq!(scheduler.pending(), 1);
    handle.unsubscribe();
    assert_eq!(scheduler.pending(), 0);
    scheduler.advance_by(Duration::ZERO);
    assert!(recorder.0.lock().unwrap().values.is_empty());
  }

  struct MapU64(Recorder);

  impl Observer<u64, RxError> for MapU64 {
    fn next(&mut self, v: u64) { self.0.next(v as i32); }
    fn error(self, e: RxError) { self.0.error(e); }
    fn complete(self) { self.0.complete(); }
    fn is_finished(&self) -> bool { self.0.is_finished() }
  }

  #[test]
  fn scheduler_failure_ends_repetition() {
    let recorder = Recorder::default();
    let handle = of(1)
      .repeat_on(Some(3), RefusingScheduler)
      .subscribe_with(recorder.clone());
    let log = recorder.0.lock().unwrap();
    assert!(log.values.is_empty());
    assert_eq!(
      log.errors,
      vec![RxError::Scheduler(SchedulerError::Spawn("no workers".into()))]
    );
    assert_eq!(log.completes, 0);
    assert!(handle.is_closed());
  }
}
