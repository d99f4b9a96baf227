use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  type_hint::TypeHint,
};

/// Creates an observable that produces values from an iterator.
///
/// Elements are pulled one at a time and the subscription is checked before
/// every pull, so a cancelled consumer stops the iteration. Completes when
/// all elements have been emitted. Never emits an error.
///
/// # Examples
///
/// A simple example for a range:
///
/// ```
/// use rxcore::prelude::*;
///
/// from_iter(0..10).subscribe(|v| println!("{},", v));
/// ```
///
/// Or with a vector:
///
/// ```
/// use rxcore::prelude::*;
///
/// from_iter(vec![0, 1, 2, 3]).subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> FromIter<Iter, Err>
where
  Iter: IntoIterator,
{
  FromIter(iter, TypeHint::new())
}

pub struct FromIter<Iter, Err>(Iter, TypeHint<Err>);

impl<Iter: Clone, Err> Clone for FromIter<Iter, Err> {
  fn clone(&self) -> Self { FromIter(self.0.clone(), TypeHint::new()) }
}

impl<Iter, Err, O> Observable<Iter::Item, Err, O> for FromIter<Iter, Err>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Err>,
{
  fn actual_subscribe(self, mut subscriber: Subscriber<O>) {
    let mut iter = self.0.into_iter();
    loop {
      if subscriber.is_finished() {
        return;
      }
      match iter.next() {
        Some(v) => subscriber.next(v),
        None => break,
      }
    }
    subscriber.complete();
  }
}

impl<Iter, Err> ObservableExt<Iter::Item, Err> for FromIter<Iter, Err> where Iter: IntoIterator {}

/// Creates an observable from an iterator of `Result`s.
///
/// `Ok` values are emitted in order. The first `Err` terminates the
/// subscription with that error and nothing more is pulled.
///
/// ```
/// use rxcore::prelude::*;
///
/// let lines = vec!["1", "2", "x", "4"].into_iter().map(|s| s.parse::<i32>());
/// let mut values = vec![];
/// let mut failed = false;
/// from_iter_result(lines).subscribe_err(|v| values.push(v), |_| failed = true);
/// assert_eq!(values, vec![1, 2]);
/// assert!(failed);
/// ```
pub fn from_iter_result<Iter, Item, Err>(iter: Iter) -> FromIterResult<Iter>
where
  Iter: IntoIterator<Item = Result<Item, Err>>,
{
  FromIterResult(iter)
}

#[derive(Clone)]
pub struct FromIterResult<Iter>(Iter);

impl<Iter, Item, Err, O> Observable<Item, Err, O> for FromIterResult<Iter>
where
  Iter: IntoIterator<Item = Result<Item, Err>>,
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, mut subscriber: Subscriber<O>) {
    let mut iter = self.0.into_iter();
    loop {
      if subscriber.is_finished() {
        return;
      }
      match iter.next() {
        Some(Ok(v)) => subscriber.next(v),
        Some(Err(e)) => {
          subscriber.error(e);
          return;
        }
        None => break,
      }
    }
    subscriber.complete();
  }
}

impl<Iter, Item, Err> ObservableExt<Item, Err> for FromIterResult<Iter> where
  Iter: IntoIterator<Item = Result<Item, Err>>
{
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::cell::Cell;

  #[test]
  fn from_range() {
    let mut hit_count = 0;
    let mut completed = false;
    from_iter(0..100).subscribe_complete(|_| hit_count += 1, || completed = true);

    assert_eq!(hit_count, 100);
    assert!(completed);
  }

  #[test]
  fn from_vec() {
    let mut hit_count = 0;
    let mut completed = false;
    from_iter(vec![0; 100]).subscribe_complete(|_| hit_count += 1, || completed = true);

    assert_eq!(hit_count, 100);
    assert!(completed);
  }

  #[test]
  fn empty_iter_behaves_as_empty() {
    let mut hits = 0;
    let mut completed = false;
    from_iter(Vec::<i32>::new()).subscribe_complete(|_| hits += 1, || completed = true);
    assert_eq!(hits, 0);
    assert!(completed);
  }

  #[test]
  fn single_element_behaves_as_of() {
    let mut values = vec![];
    let mut completes = 0;
    from_iter([42]).subscribe_complete(|v| values.push(v), || completes += 1);
    assert_eq!(values, vec![42]);
    assert_eq!(completes, 1);
  }

  #[test]
  fn lazy_pull_stops_after_cancel() {
    let pulled = Cell::new(0);
    let source = (0..).inspect(|_| pulled.set(pulled.get() + 1));
    let mut seen = vec![];
    from_iter(source).subscribe_with(TakeN { seen: &mut seen, n: 3 });
    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(pulled.get(), 3);
  }

  #[test]
  fn stops_pulling_after_error() {
    let pulled = Cell::new(0);
    let source = vec![Ok(1), Err("boom"), Ok(3)]
      .into_iter()
      .inspect(|_| pulled.set(pulled.get() + 1));
    let mut values = vec![];
    let mut err = None;
    from_iter_result(source).subscribe_err(|v| values.push(v), |e| err = Some(e));
    assert_eq!(values, vec![1]);
    assert_eq!(err, Some("boom"));
    assert_eq!(pulled.get(), 2);
  }

  #[test]
  fn finished_observer_receives_nothing() {
    let mut seen = vec![];
    let handle = from_iter(0..).subscribe_with(TakeN { seen: &mut seen, n: 0 });
    assert!(handle.is_closed());
    assert!(seen.is_empty());
  }

  struct TakeN<'a> {
    seen: &'a mut Vec<i32>,
    n: usize,
  }

  impl<'a> Observer<i32, ()> for TakeN<'a> {
    fn next(&mut self, value: i32) { self.seen.push(value); }
    fn error(self, _: ()) {}
    fn complete(self) {}
    fn is_finished(&self) -> bool { self.seen.len() >= self.n }
  }
}
