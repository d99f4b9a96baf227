use crate::{
  observer::Observer,
  subscription::{Subscription, SubscriptionHandle},
  util::lock,
};
use std::sync::{Arc, Mutex, TryLockError};

/// Binds an observer to the [`SubscriptionHandle`] of one subscription.
///
/// While the Observer is the public API for consuming the values of an
/// Observable, every observer is wrapped in a `Subscriber` at subscribe time.
/// The subscriber enforces the emission protocol on behalf of the observer:
///
/// - values arriving after cancellation or termination are dropped;
/// - only the first terminal event (or a cancellation) wins, later ones are
///   dropped;
/// - events never overlap, the observer sits behind a mutex.
///
/// Clones share the observer and the handle, so producers running on other
/// threads can hold their own copy.
pub struct Subscriber<O> {
  observer: Arc<Mutex<Option<O>>>,
  subscription: SubscriptionHandle,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self {
    Subscriber {
      observer: Arc::new(Mutex::new(Some(observer))),
      subscription: SubscriptionHandle::new(),
    }
  }

  #[inline]
  pub fn subscription(&self) -> &SubscriptionHandle { &self.subscription }

  /// Delivers `value` followed by completion as one step: once the terminal
  /// slot is claimed no competing terminal event can slip in between.
  pub(crate) fn next_and_complete<Item, Err>(self, value: Item)
  where
    O: Observer<Item, Err>,
  {
    if <Self as Observer<Item, Err>>::is_finished(&self) {
      return;
    }
    self.terminate(|mut o| {
      o.next(value);
      o.complete();
    })
  }

  /// Claims the terminal slot and hands the observer to `deliver`, then
  /// releases the resources registered on the subscription.
  fn terminate(self, deliver: impl FnOnce(O)) {
    if self.subscription.try_terminate() {
      let observer = lock(&self.observer).take();
      if let Some(observer) = observer {
        deliver(observer);
      }
      self.subscription.release();
    }
  }
}

impl<O> Clone for Subscriber<O> {
  fn clone(&self) -> Self {
    Subscriber {
      observer: self.observer.clone(),
      subscription: self.subscription.clone(),
    }
  }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.subscription.is_closed() {
      return;
    }
    let mut observer = lock(&self.observer);
    // a cancel may have landed while we waited for the lock
    if self.subscription.is_closed() {
      return;
    }
    let finished = match observer.as_mut() {
      Some(observer) if !observer.is_finished() => {
        observer.next(value);
        observer.is_finished()
      }
      _ => true,
    };
    drop(observer);
    // an observer may decide it has seen enough
    if finished {
      self.subscription.cancel();
    }
  }

  fn error(self, err: Err) { self.terminate(|o| o.error(err)) }

  fn complete(self) { self.terminate(|o| o.complete()) }

  /// Also asks the observer, so a loop-based source stops before pulling a
  /// value nobody wants. An observer reporting `true` cancels the session.
  fn is_finished(&self) -> bool {
    if self.subscription.is_closed() {
      return true;
    }
    let finished = match self.observer.try_lock() {
      Ok(observer) => observer.as_ref().map_or(true, Observer::is_finished),
      Err(TryLockError::Poisoned(e)) => e.into_inner().as_ref().map_or(true, Observer::is_finished),
      // a delivery is in flight, `next` settles the question once it returns
      Err(TryLockError::WouldBlock) => false,
    };
    if finished {
      self.subscription.cancel();
    }
    finished
  }
}
