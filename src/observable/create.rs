use crate::{
  observable::{Observable, ObservableExt},
  observer::{Emitter, Observer},
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionHandle},
  type_hint::TypeHint,
};

/// Creates an observable from a producer function.
///
/// On every subscription `producer` receives an [`Emitter`] and may call
/// `next` any number of times followed by one `error` or `complete`. Events
/// sent after the terminal event, or after the consumer cancelled, are
/// dropped. The producer returns a teardown, `()` when there is nothing to
/// release, which runs when the subscription is cancelled or terminates.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let mut values = vec![];
/// create(|emitter: &mut dyn Emitter<i32, ()>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
/// })
/// .subscribe_err(|v| values.push(v), |_| {});
/// assert_eq!(values, vec![1, 2]);
/// ```
pub fn create<F, Item, Err, U>(producer: F) -> Create<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: Subscription + Send + Sync + 'static,
{
  Create { producer, _hint: TypeHint::new() }
}

pub struct Create<F, Item, Err> {
  producer: F,
  _hint: TypeHint<(Item, Err)>,
}

impl<F: Clone, Item, Err> Clone for Create<F, Item, Err> {
  fn clone(&self) -> Self { Create { producer: self.producer.clone(), _hint: TypeHint::new() } }
}

struct CreateEmitter<O> {
  subscriber: Option<Subscriber<O>>,
  subscription: SubscriptionHandle,
}

impl<O, Item, Err> Emitter<Item, Err> for CreateEmitter<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) {
    if let Some(subscriber) = &mut self.subscriber {
      subscriber.next(value);
    }
  }

  #[inline]
  fn error(&mut self, err: Err) {
    if let Some(subscriber) = self.subscriber.take() {
      subscriber.error(err);
    }
  }

  #[inline]
  fn complete(&mut self) {
    if let Some(subscriber) = self.subscriber.take() {
      subscriber.complete();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.subscriber.is_none() || self.subscription.is_closed() }

  #[inline]
  fn subscription(&self) -> &SubscriptionHandle { &self.subscription }
}

impl<F, Item, Err, U, O> Observable<Item, Err, O> for Create<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: Subscription + Send + Sync + 'static,
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    let subscription = subscriber.subscription().clone();
    let mut emitter = CreateEmitter { subscriber: Some(subscriber), subscription: subscription.clone() };
    let teardown = (self.producer)(&mut emitter);
    // released right away if the producer already terminated
    subscription.add(teardown);
  }
}

impl<F, Item, Err> ObservableExt<Item, Err> for Create<F, Item, Err> {}
