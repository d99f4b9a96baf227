use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Scheduler, TaskHandle},
  subscriber::Subscriber,
};
use tracing::warn;

/// Subscribes to the source from a task on a scheduler.
///
/// Created by [`ObservableExt::subscribe_on`]. Cancelling before the task ran
/// cancels the task, so the source is never subscribed.
#[derive(Clone)]
pub struct SubscribeOn<S, Sch> {
  source: S,
  scheduler: Sch,
}

impl<S, Sch> SubscribeOn<S, Sch> {
  pub(crate) fn new(source: S, scheduler: Sch) -> Self { SubscribeOn { source, scheduler } }
}

impl<S, Sch, O, Item, Err> Observable<Item, Err, O> for SubscribeOn<S, Sch>
where
  S: Observable<Item, Err, O> + Send + 'static,
  Sch: Scheduler,
  O: Observer<Item, Err> + Send + 'static,
  Err: From<RxError>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    let source = self.source;
    let task_subscriber = subscriber.clone();
    let handle = TaskHandle::new();
    subscriber.subscription().add(handle.clone());
    let task = move || source.actual_subscribe(task_subscriber);
    if let Err(e) = self.scheduler.schedule_with(&handle, task, None) {
      warn!(error = %e, label = e.as_label(), "subscribe_on could not schedule the subscription");
      subscriber.error(RxError::from(e).into());
    }
  }
}

impl<S, Sch, Item, Err> ObservableExt<Item, Err> for SubscribeOn<S, Sch> where S: ObservableExt<Item, Err> {}

#[cfg(test)]
mod test {
  use crate::{prelude::*, scheduler::RefusingScheduler};
  use std::{
    sync::{mpsc, Arc, Mutex},
    thread,
  };

  #[test]
  fn new_thread() {
    let (tx, rx) = mpsc::channel();
    let c_tx = tx.clone();
    from_iter(1..5).subscribe_on(NewThreadScheduler::new()).subscribe_all(
      move |v| c_tx.send(Some((v, thread::current().id()))).unwrap(),
      |_: RxError| {},
      move || tx.send(None).unwrap(),
    );

    let mut values = vec![];
    while let Some((v, id)) = rx.recv().unwrap() {
      assert_ne!(id, thread::current().id());
      values.push(v);
    }
    assert_eq!(values, vec![1, 2, 3, 4]);
  }

  #[test]
  fn cancel_before_subscribe() {
    let scheduler = TestScheduler::new();
    let subscribed = Arc::new(Mutex::new(false));
    let c_subscribed = subscribed.clone();
    let handle = defer(move || {
      *c_subscribed.lock().unwrap() = true;
      Ok(of(1))
    })
    .subscribe_on(scheduler.clone())
    .subscribe_err(|_| {}, |_: RxError| {});

    handle.unsubscribe();
    scheduler.advance_by(Duration::ZERO);
    assert!(!*subscribed.lock().unwrap());
  }

  #[test]
  fn scheduler_failure_is_delivered() {
    let err = Arc::new(Mutex::new(None));
    let c_err = err.clone();
    of(1)
      .subscribe_on(RefusingScheduler)
      .subscribe_err(|_| {}, move |e: RxError| *c_err.lock().unwrap() = Some(e));
    assert_eq!(
      *err.lock().unwrap(),
      Some(RxError::Scheduler(SchedulerError::Spawn("no workers".into())))
    );
  }
}
