use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{SubscriptionHandle, SubscriptionWrapper},
};

#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  #[inline(always)]
  pub fn new(next: N, error: E, complete: C) -> Self { ObserverAll { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  #[inline(always)]
  fn next(&mut self, value: Item) { (self.next)(value); }
  #[inline(always)]
  fn error(self, err: Err) { (self.error)(err); }
  #[inline(always)]
  fn complete(self) { (self.complete)(); }
  #[inline(always)]
  fn is_finished(&self) -> bool { false }
}

pub trait SubscribeAll<Item, Err>: Sized {
  /// Invokes an execution of an Observable and registers Observer handlers for
  /// notifications it will emit.
  ///
  /// * `error`: A handler for a terminal event resulting from an error.
  /// * `complete`: A handler for a terminal event resulting from successful
  /// completion.
  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> SubscriptionWrapper<SubscriptionHandle>
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    C: FnOnce(),
    Self: Observable<Item, Err, ObserverAll<N, E, C>>;
}

impl<Item, Err, S> SubscribeAll<Item, Err> for S
where
  S: ObservableExt<Item, Err>,
{
  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> SubscriptionWrapper<SubscriptionHandle>
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    C: FnOnce(),
    Self: Observable<Item, Err, ObserverAll<N, E, C>>,
  {
    self.subscribe_with(ObserverAll::new(next, error, complete))
  }
}
