use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{SubscriptionHandle, SubscriptionWrapper},
};
use std::convert::Infallible;

#[derive(Clone)]
pub struct ObserverComp<N, C> {
  next: N,
  complete: C,
}

impl<Item, N, C> Observer<Item, Infallible> for ObserverComp<N, C>
where
  N: FnMut(Item),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }
  #[inline]
  fn error(self, err: Infallible) { match err {} }
  #[inline]
  fn complete(self) { (self.complete)(); }
  #[inline]
  fn is_finished(&self) -> bool { false }
}

pub trait SubscribeComplete<Item>: Sized {
  /// Invokes an execution of an Observable that cannot fail and registers
  /// handlers for its values and its completion.
  fn subscribe_complete<N, C>(self, next: N, complete: C) -> SubscriptionWrapper<SubscriptionHandle>
  where
    N: FnMut(Item),
    C: FnOnce(),
    Self: Observable<Item, Infallible, ObserverComp<N, C>>;
}

impl<Item, S> SubscribeComplete<Item> for S
where
  S: ObservableExt<Item, Infallible>,
{
  fn subscribe_complete<N, C>(self, next: N, complete: C) -> SubscriptionWrapper<SubscriptionHandle>
  where
    N: FnMut(Item),
    C: FnOnce(),
    Self: Observable<Item, Infallible, ObserverComp<N, C>>,
  {
    self.subscribe_with(ObserverComp { next, complete })
  }
}
