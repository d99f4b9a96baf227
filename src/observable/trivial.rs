use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  type_hint::TypeHint,
};

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
///
/// # Examples
/// ```
/// use rxcore::prelude::*;
///
/// let mut completed = false;
/// empty::<i32, _>().subscribe_complete(|_| {}, || completed = true);
/// assert!(completed);
/// ```
pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(TypeHint::new()) }

pub struct Empty<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err> Clone for Empty<Item, Err> {
  fn clone(&self) -> Self { *self }
}

impl<Item, Err> Copy for Empty<Item, Err> {}

impl<Item, Err, O> Observable<Item, Err, O> for Empty<Item, Err>
where
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) { subscriber.complete(); }
}

impl<Item, Err> ObservableExt<Item, Err> for Empty<Item, Err> {}

/// Creates an observable that never emits anything.
///
/// Neither emits a value, nor completes, nor emits an error. The subscription
/// stays open until it is cancelled.
pub fn never<Item, Err>() -> Never<Item, Err> { Never(TypeHint::new()) }

pub struct Never<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err> Clone for Never<Item, Err> {
  fn clone(&self) -> Self { *self }
}

impl<Item, Err> Copy for Never<Item, Err> {}

impl<Item, Err, O> Observable<Item, Err, O> for Never<Item, Err>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn actual_subscribe(self, _: Subscriber<O>) {}
}

impl<Item, Err> ObservableExt<Item, Err> for Never<Item, Err> {}

/// Creates an observable that emits no items, just terminates with an error.
///
/// # Arguments
///
/// * `e` - An error to emit and terminate with
pub fn throw_err<Item, Err>(e: Err) -> ThrowErr<Item, Err> { ThrowErr(e, TypeHint::new()) }

pub struct ThrowErr<Item, Err>(Err, TypeHint<Item>);

impl<Item, Err: Clone> Clone for ThrowErr<Item, Err> {
  fn clone(&self) -> Self { ThrowErr(self.0.clone(), TypeHint::new()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for ThrowErr<Item, Err>
where
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) { subscriber.error(self.0); }
}

impl<Item, Err> ObservableExt<Item, Err> for ThrowErr<Item, Err> {}
