use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  type_hint::TypeHint,
};

/// Creates an observable producing a multiple values.
///
/// Completes immediately after emitting the values given. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
/// use rxcore::of_sequence;
///
/// let mut values = vec![];
/// of_sequence!(1, 2, 3).subscribe(|v| values.push(v));
/// assert_eq!(values, vec![1, 2, 3]);
/// ```
#[macro_export]
macro_rules! of_sequence {
  ( $( $item:expr ),* $(,)? ) => {
    $crate::observable::from_iter([ $( $item ),* ])
  };
}

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// of(123).subscribe(|v| println!("{},", v));
/// ```
pub fn of<Item, Err>(v: Item) -> Of<Item, Err> { Of(v, TypeHint::new()) }

pub struct Of<Item, Err>(Item, TypeHint<Err>);

impl<Item: Clone, Err> Clone for Of<Item, Err> {
  fn clone(&self) -> Self { Of(self.0.clone(), TypeHint::new()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for Of<Item, Err>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn actual_subscribe(self, subscriber: Subscriber<O>) { subscriber.next_and_complete::<Item, Err>(self.0) }
}

impl<Item, Err> ObservableExt<Item, Err> for Of<Item, Err> {}

/// Creates an observable that emits value or the error from a [`Result`] given.
///
/// Completes immediately after the value, an error is terminal on its own.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut failure = None;
/// of_result(Err::<i32, _>("An error")).subscribe_err(|_| {}, |e| failure = Some(e));
/// assert_eq!(failure, Some("An error"));
/// ```
pub fn of_result<Item, Err>(r: Result<Item, Err>) -> OfResult<Item, Err> { OfResult(r) }

#[derive(Clone)]
pub struct OfResult<Item, Err>(Result<Item, Err>);

impl<Item, Err, O> Observable<Item, Err, O> for OfResult<Item, Err>
where
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    match self.0 {
      Ok(v) => subscriber.next_and_complete::<Item, Err>(v),
      Err(e) => subscriber.error(e),
    }
  }
}

impl<Item, Err> ObservableExt<Item, Err> for OfResult<Item, Err> {}

/// Creates an observable that potentially emits a single value from
/// [`Option`].
///
/// Emits the value if is there, and completes immediately after. When the
/// given option has not value, completes immediately. Never emits an error.
pub fn of_option<Item, Err>(o: Option<Item>) -> OfOption<Item, Err> { OfOption(o, TypeHint::new()) }

pub struct OfOption<Item, Err>(Option<Item>, TypeHint<Err>);

impl<Item: Clone, Err> Clone for OfOption<Item, Err> {
  fn clone(&self) -> Self { OfOption(self.0.clone(), TypeHint::new()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for OfOption<Item, Err>
where
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, subscriber: Subscriber<O>) {
    match self.0 {
      Some(v) => subscriber.next_and_complete::<Item, Err>(v),
      None => subscriber.complete(),
    }
  }
}

impl<Item, Err> ObservableExt<Item, Err> for OfOption<Item, Err> {}
