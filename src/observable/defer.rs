use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  type_hint::TypeHint,
};

/// Creates an observable that will on subscription defer to another observable
/// that is supplied by a supplier-function which will be run once at each
/// subscription.
///
/// Building the inner observable may fail: an `Err` returned by the supplier
/// reaches the consumer as its terminal error instead of escaping to the
/// caller of `subscribe`.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let mut values = vec![];
/// defer(|| Ok(of(1))).subscribe_err(|v| values.push(v), |_: ()| {});
/// assert_eq!(values, vec![1]);
/// ```
pub fn defer<F, S, Item, Err>(supplier: F) -> Defer<F, Item, Err>
where
  F: FnOnce() -> Result<S, Err>,
{
  Defer(supplier, TypeHint::new())
}

pub struct Defer<F, Item, Err>(F, TypeHint<(Item, Err)>);

impl<F: Clone, Item, Err> Clone for Defer<F, Item, Err> {
  fn clone(&self) -> Self { Defer(self.0.clone(), TypeHint::new()) }
}

impl<F, S, Item, Err, O> Observable<Item, Err, O> for Defer<F, Item, Err>
where
  F: FnOnce() -> Result<S, Err>,
  S: Observable<Item, Err, O>,
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    match (self.0)() {
      Ok(source) => source.actual_subscribe(subscriber),
      Err(e) => subscriber.error(e),
    }
  }
}

impl<F, Item, Err> ObservableExt<Item, Err> for Defer<F, Item, Err> {}
