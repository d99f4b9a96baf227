use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  ops::subscribe_on::SubscribeOn,
  scheduler::Scheduler,
  subscriber::Subscriber,
  type_hint::TypeHint,
};

/// Creates an observable emitting `count` consecutive integers starting at
/// `start`, then completing.
///
/// Arguments are checked here, before anything is subscribed: a negative
/// `count`, or a range whose last value `start + count - 1` does not fit in
/// an `i64`, is rejected with [`RxError::InvalidArgument`].
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let mut values = vec![];
/// range(5, 3)?.subscribe(|v| values.push(v));
/// assert_eq!(values, vec![5, 6, 7]);
///
/// assert!(range::<()>(0, -1).is_err());
/// assert!(range::<()>(i64::MAX, 2).is_err());
/// # Ok::<(), RxError>(())
/// ```
pub fn range<Err>(start: i64, count: i64) -> Result<Range<Err>, RxError> {
  if count < 0 {
    return Err(RxError::invalid_argument("count", format!("must not be negative, got {count}")));
  }
  if count > 0 && start.checked_add(count - 1).is_none() {
    return Err(RxError::invalid_argument(
      "count",
      format!("range starting at {start} with {count} values overflows i64"),
    ));
  }
  Ok(Range { start, count, _hint: TypeHint::new() })
}

/// [`range`] with the emissions happening inside a task on `scheduler`.
pub fn range_on<Err, S>(start: i64, count: i64, scheduler: S) -> Result<SubscribeOn<Range<Err>, S>, RxError>
where
  S: Scheduler,
{
  Ok(range(start, count)?.subscribe_on(scheduler))
}

pub struct Range<Err> {
  start: i64,
  count: i64,
  _hint: TypeHint<Err>,
}

impl<Err> Clone for Range<Err> {
  fn clone(&self) -> Self { *self }
}

impl<Err> Copy for Range<Err> {}

impl<Err, O> Observable<i64, Err, O> for Range<Err>
where
  O: Observer<i64, Err>,
{
  fn actual_subscribe(self, mut subscriber: Subscriber<O>) {
    for offset in 0..self.count {
      if subscriber.is_finished() {
        return;
      }
      subscriber.next(self.start + offset);
    }
    subscriber.complete();
  }
}

impl<Err> ObservableExt<i64, Err> for Range<Err> {}
