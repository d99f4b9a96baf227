use crate::util::lock;
use smallvec::SmallVec;
use std::{
  any::Any,
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicU8, Ordering},
    Arc, Mutex,
  },
};
use tracing::trace;

/// A resource that can be released: a live subscription, a pending scheduler
/// task, an aborted future...
///
/// `unsubscribe` must be idempotent and safe to call from any thread.
pub trait Subscription {
  /// Releases the resource. Calling it again is a no-op.
  fn unsubscribe(&self);

  /// Returns `true` once the resource has been released or has finished on
  /// its own.
  fn is_closed(&self) -> bool;
}

const ACTIVE: u8 = 0;
const CANCELLED: u8 = 1;
const TERMINATED: u8 = 2;

type Teardown = Box<dyn Subscription + Send + Sync>;

/// Tracks one consumer session.
///
/// The state moves one way, `Active → Cancelled` (via [`cancel`]) or
/// `Active → Terminated` (via [`try_terminate`]), and both end states are
/// absorbing. Resources registered with [`add`] are released exactly once,
/// when the session leaves `Active`.
///
/// Handles are cheap to clone; clones observe and drive the same session.
///
/// [`cancel`]: SubscriptionHandle::cancel
/// [`try_terminate`]: SubscriptionHandle::try_terminate
/// [`add`]: SubscriptionHandle::add
#[derive(Clone, Default)]
pub struct SubscriptionHandle(Arc<Inner>);

#[derive(Default)]
struct Inner {
  state: AtomicU8,
  teardown: Mutex<SmallVec<[Teardown; 1]>>,
}

impl SubscriptionHandle {
  pub fn new() -> Self { Self::default() }

  /// Cancels the session and releases every registered resource. Idempotent,
  /// and a no-op once the session has terminated.
  pub fn cancel(&self) {
    if self.transition(CANCELLED) {
      trace!("subscription cancelled");
      self.release();
    }
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.state() == CANCELLED }

  #[inline]
  pub fn is_terminated(&self) -> bool { self.state() == TERMINATED }

  /// Claims the single terminal slot of this session. Only the first caller
  /// (across terminal attempts and [`cancel`](Self::cancel)) gets `true`.
  ///
  /// The winner is expected to deliver its terminal event and then call
  /// [`release`](Self::release).
  #[inline]
  pub fn try_terminate(&self) -> bool { self.transition(TERMINATED) }

  /// Registers a resource to release when the session ends. If the session
  /// has already ended the resource is released immediately.
  pub fn add<U>(&self, subscription: U)
  where
    U: Subscription + Send + Sync + 'static,
  {
    if subscription.is_closed() || self.is_same(&subscription) {
      return;
    }
    let mut teardown = lock(&self.0.teardown);
    if self.is_closed() {
      drop(teardown);
      subscription.unsubscribe();
    } else {
      teardown.retain(|t| !t.is_closed());
      teardown.push(Box::new(subscription));
    }
  }

  /// Registers a closure to run when the session ends.
  pub fn add_teardown<F>(&self, f: F)
  where
    F: FnOnce() + Send + 'static,
  {
    self.add(ClosureSubscription::new(f))
  }

  /// Releases every registered resource. Resources added afterwards are
  /// released on registration since the session is no longer active.
  pub fn release(&self) {
    let drained = std::mem::take(&mut *lock(&self.0.teardown));
    for t in drained {
      t.unsubscribe();
    }
  }

  pub(crate) fn teardown_size(&self) -> usize { lock(&self.0.teardown).len() }

  #[inline]
  fn state(&self) -> u8 { self.0.state.load(Ordering::Acquire) }

  #[inline]
  fn transition(&self, to: u8) -> bool {
    self
      .0
      .state
      .compare_exchange(ACTIVE, to, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }

  fn is_same(&self, other: &dyn Any) -> bool {
    if let Some(other) = other.downcast_ref::<Self>() {
      Arc::ptr_eq(&self.0, &other.0)
    } else {
      false
    }
  }
}

impl Subscription for SubscriptionHandle {
  #[inline]
  fn unsubscribe(&self) { self.cancel() }

  #[inline]
  fn is_closed(&self) -> bool { self.state() != ACTIVE }
}

impl Debug for SubscriptionHandle {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = match self.state() {
      ACTIVE => "active",
      CANCELLED => "cancelled",
      _ => "terminated",
    };
    f.debug_struct("SubscriptionHandle")
      .field("state", &state)
      .field("teardown_count", &self.teardown_size())
      .finish()
  }
}

/// A subscription that runs a closure once when unsubscribed.
pub struct ClosureSubscription<F>(Mutex<Option<F>>);

impl<F: FnOnce()> ClosureSubscription<F> {
  pub fn new(f: F) -> Self { ClosureSubscription(Mutex::new(Some(f))) }
}

impl<F: FnOnce()> Subscription for ClosureSubscription<F> {
  fn unsubscribe(&self) {
    let f = lock(&self.0).take();
    if let Some(f) = f {
      f();
    }
  }

  fn is_closed(&self) -> bool { lock(&self.0).is_none() }
}

/// "Nothing to release."
impl Subscription for () {
  #[inline]
  fn unsubscribe(&self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: ?Sized + Subscription> Subscription for Box<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

impl<T: ?Sized + Subscription> Subscription for Arc<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
#[derive(Debug, Clone)]
pub struct SubscriptionWrapper<T: Subscription>(pub(crate) T);

impl<T: Subscription> SubscriptionWrapper<T> {
  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> { SubscriptionGuard(self.0) }

  /// Consumes this wrapper and returns the underlying subscription.
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: Subscription> Subscription for SubscriptionWrapper<T> {
  #[inline]
  fn unsubscribe(&self) { self.0.unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(pub(crate) T);

impl<T: Subscription> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(subscription) }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
  };

  fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let hits = Arc::new(AtomicUsize::new(0));
    let c_hits = hits.clone();
    (hits, move || {
      c_hits.fetch_add(1, Ordering::SeqCst);
    })
  }

  #[test]
  fn cancel_releases_once() {
    let handle = SubscriptionHandle::new();
    let (hits, teardown) = counter();
    handle.add_teardown(teardown);

    handle.cancel();
    handle.cancel();
    handle.clone().unsubscribe();

    assert!(handle.is_cancelled());
    assert!(handle.is_closed());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn add_after_close_releases_immediately() {
    let handle = SubscriptionHandle::new();
    handle.cancel();
    let (hits, teardown) = counter();
    handle.add_teardown(teardown);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(handle.teardown_size(), 0);
  }

  #[test]
  fn terminal_slot_has_one_winner() {
    let handle = SubscriptionHandle::new();
    assert!(handle.try_terminate());
    assert!(!handle.try_terminate());

    // cancel after terminate changes nothing
    handle.cancel();
    assert!(handle.is_terminated());
    assert!(!handle.is_cancelled());
  }

  #[test]
  fn cancel_loses_after_terminate_but_release_still_runs() {
    let handle = SubscriptionHandle::new();
    let (hits, teardown) = counter();
    handle.add_teardown(teardown);
    assert!(handle.try_terminate());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    handle.release();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn concurrent_cancel_and_terminate() {
    for _ in 0..64 {
      let handle = SubscriptionHandle::new();
      let (hits, teardown) = counter();
      handle.add_teardown(teardown);
      let winners = Arc::new(AtomicUsize::new(0));

      let workers: Vec<_> = (0..4)
        .map(|i| {
          let handle = handle.clone();
          let winners = winners.clone();
          thread::spawn(move || {
            if i % 2 == 0 {
              handle.cancel();
            } else if handle.try_terminate() {
              winners.fetch_add(1, Ordering::SeqCst);
              handle.release();
            }
          })
        })
        .collect();
      for w in workers {
        w.join().unwrap();
      }

      assert!(handle.is_closed());
      assert!(winners.load(Ordering::SeqCst) <= 1);
      assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
  }

  #[test]
  fn closed_entries_are_pruned() {
    let parent = SubscriptionHandle::new();
    let l1 = SubscriptionHandle::new();
    let l2 = SubscriptionHandle::new();
    parent.add(l1.clone());
    parent.add(l2.clone());
    assert_eq!(parent.teardown_size(), 2);

    l1.cancel();
    parent.add(SubscriptionHandle::new());
    assert_eq!(parent.teardown_size(), 2);
  }

  #[test]
  fn ignores_self_and_closed() {
    let handle = SubscriptionHandle::new();
    handle.add(handle.clone());
    handle.add(());
    assert_eq!(handle.teardown_size(), 0);
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let handle = SubscriptionHandle::new();
    {
      let _guard = SubscriptionWrapper(handle.clone()).unsubscribe_when_dropped();
      assert!(!handle.is_closed());
    }
    assert!(handle.is_cancelled());
  }
}
