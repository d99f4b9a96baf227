//! Lazy, cold sources.
//!
//! Every factory in this module returns a plain value describing how to
//! produce events. Nothing runs until one of the `subscribe*` methods is
//! called, and every subscription runs the emission procedure from scratch.
//! Sources are reused by cloning them.

use crate::{
  observer::Observer,
  ops::{repeat::Repeat, subscribe_on::SubscribeOn},
  scheduler::{Scheduler, TrampolineScheduler},
  subscriber::Subscriber,
  subscription::{SubscriptionHandle, SubscriptionWrapper},
};

mod create;
pub use create::*;
mod defer;
pub use defer::*;
#[cfg(feature = "futures-scheduler")]
mod from_future;
#[cfg(feature = "futures-scheduler")]
pub use from_future::*;
mod from_iter;
pub use from_iter::*;
mod interval;
pub use interval::*;
mod of;
pub use of::*;
mod range;
pub use range::*;
mod timer;
pub use timer::*;
mod trivial;
pub use trivial::*;

mod observable_all;
pub use observable_all::*;
mod observable_comp;
pub use observable_comp::*;
mod observable_err;
pub use observable_err::*;
mod observable_next;
pub use observable_next::*;

/// A source that can feed observers of type `O`.
///
/// Implementations emit through the [`Subscriber`], which enforces the
/// emission protocol: nothing is delivered after a terminal event or after
/// the subscription was cancelled.
pub trait Observable<Item, Err, O> {
  fn actual_subscribe(self, subscriber: Subscriber<O>);
}

/// Operators and subscribe entry points shared by every source.
pub trait ObservableExt<Item, Err>: Sized {
  /// Subscribes `observer` and returns the handle of the new subscription.
  fn subscribe_with<O>(self, observer: O) -> SubscriptionWrapper<SubscriptionHandle>
  where
    O: Observer<Item, Err>,
    Self: Observable<Item, Err, O>,
  {
    let subscriber = Subscriber::new(observer);
    let handle = subscriber.subscription().clone();
    self.actual_subscribe(subscriber);
    SubscriptionWrapper(handle)
  }

  /// Resubscribes to this source each time it completes, until `count`
  /// subscriptions in total have completed. `None` repeats forever.
  ///
  /// Resubscriptions go through the [`TrampolineScheduler`], so a source that
  /// completes synchronously loops instead of growing the stack.
  ///
  /// ```rust
  /// use rxcore::prelude::*;
  /// use std::sync::{Arc, Mutex};
  ///
  /// let values = Arc::new(Mutex::new(vec![]));
  /// let c_values = values.clone();
  /// of(1)
  ///   .repeat(Some(3))
  ///   .subscribe_err(move |v| c_values.lock().unwrap().push(v), |_: RxError| {});
  /// assert_eq!(*values.lock().unwrap(), vec![1, 1, 1]);
  /// ```
  fn repeat(self, count: Option<usize>) -> Repeat<Self, TrampolineScheduler> {
    Repeat::new(self, count, TrampolineScheduler)
  }

  /// Like [`repeat`](Self::repeat), with every round scheduled on
  /// `scheduler`.
  fn repeat_on<S: Scheduler>(self, count: Option<usize>, scheduler: S) -> Repeat<Self, S> {
    Repeat::new(self, count, scheduler)
  }

  /// Subscribes to this source from a task on `scheduler`, so synchronous
  /// emissions happen in the scheduler's execution context.
  fn subscribe_on<S: Scheduler>(self, scheduler: S) -> SubscribeOn<Self, S> {
    SubscribeOn::new(self, scheduler)
  }
}
