//! Observer trait and the emitter facade handed to `create` producers.
//!
//! An [`Observer`] receives `next` values followed by at most one terminal
//! event, `error` or `complete`. Both terminal methods consume the observer,
//! so a single observer value cannot be terminated twice.

use crate::subscription::SubscriptionHandle;

/// The consumer of a reactive sequence.
pub trait Observer<Item, Err> {
  /// Receive the next value.
  fn next(&mut self, value: Item);

  /// Receive the terminal error. No more events follow.
  fn error(self, err: Err);

  /// Receive the terminal completion. No more events follow.
  fn complete(self);

  /// Returns `true` once the observer will not accept more events, because
  /// it was cancelled or already terminated.
  ///
  /// Loop-based sources check this before every emission.
  fn is_finished(&self) -> bool;
}

/// Emits events to a subscriber through a mutable reference.
///
/// Unlike [`Observer`], terminal methods take `&mut self`, which keeps the
/// trait object safe: `create` hands its producer a `&mut dyn Emitter` so the
/// producer's type does not depend on the concrete downstream observer.
/// Events sent after a terminal event or after cancellation are dropped.
pub trait Emitter<Item, Err> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: Err);
  fn complete(&mut self);

  /// Returns `true` once no more events will be delivered.
  fn is_finished(&self) -> bool;

  /// The session this emitter feeds. Producers may register resources on it
  /// or cancel it.
  fn subscription(&self) -> &SubscriptionHandle;
}

/// `None` ignores all events, `Some` delegates to the inner observer.
impl<O, Item, Err> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_finished(&self) -> bool { self.as_ref().map_or(true, Observer::is_finished) }
}
