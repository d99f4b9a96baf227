use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{SubscriptionHandle, SubscriptionWrapper},
};
use std::convert::Infallible;

#[derive(Clone)]
pub struct ObserverNext<N>(N);

impl<Item, N> Observer<Item, Infallible> for ObserverNext<N>
where
  N: FnMut(Item),
{
  #[inline(always)]
  fn next(&mut self, value: Item) { (self.0)(value); }
  #[inline(always)]
  fn error(self, err: Infallible) { match err {} }
  #[inline(always)]
  fn complete(self) {}
  #[inline(always)]
  fn is_finished(&self) -> bool { false }
}

pub trait SubscribeNext<Item>: Sized {
  /// Invokes an execution of an Observable that cannot fail and registers a
  /// handler for the values it will emit.
  fn subscribe<N>(self, next: N) -> SubscriptionWrapper<SubscriptionHandle>
  where
    N: FnMut(Item),
    Self: Observable<Item, Infallible, ObserverNext<N>>;
}

impl<Item, S> SubscribeNext<Item> for S
where
  S: ObservableExt<Item, Infallible>,
{
  fn subscribe<N>(self, next: N) -> SubscriptionWrapper<SubscriptionHandle>
  where
    N: FnMut(Item),
    Self: Observable<Item, Infallible, ObserverNext<N>>,
  {
    self.subscribe_with(ObserverNext(next))
  }
}
