use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{SubscriptionHandle, SubscriptionWrapper},
};

#[derive(Clone)]
pub struct ObserverErr<N, E> {
  next: N,
  error: E,
}

impl<Item, Err, N, E> Observer<Item, Err> for ObserverErr<N, E>
where
  N: FnMut(Item),
  E: FnOnce(Err),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }
  #[inline]
  fn error(self, err: Err) { (self.error)(err); }
  #[inline]
  fn complete(self) {}
  #[inline]
  fn is_finished(&self) -> bool { false }
}

pub trait SubscribeErr<Item, Err>: Sized {
  /// Invokes an execution of an Observable and registers Observer handlers for
  /// notifications it will emit.
  ///
  /// * `error`: A handler for a terminal event resulting from an error.
  fn subscribe_err<N, E>(self, next: N, error: E) -> SubscriptionWrapper<SubscriptionHandle>
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    Self: Observable<Item, Err, ObserverErr<N, E>>;
}

impl<Item, Err, S> SubscribeErr<Item, Err> for S
where
  S: ObservableExt<Item, Err>,
{
  fn subscribe_err<N, E>(self, next: N, error: E) -> SubscriptionWrapper<SubscriptionHandle>
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    Self: Observable<Item, Err, ObserverErr<N, E>>,
  {
    self.subscribe_with(ObserverErr { next, error })
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn error_reaches_handler() {
    let mut values = vec![];
    let mut err = None;
    from_iter_result(vec![Ok(1), Err("bad"), Ok(3)])
      .subscribe_err(|v| values.push(v), |e| err = Some(e));
    assert_eq!(values, vec![1]);
    assert_eq!(err, Some("bad"));
  }
}
