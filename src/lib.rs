//! # rxcore: lazy, cold reactive sources
//!
//! A small reactive-stream core: sources that describe how to produce a
//! sequence of events, an emission protocol enforced at every subscription,
//! and a pluggable [`Scheduler`] deciding where and when work runs.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let mut sum = 0;
//! range(1, 4)?.subscribe(|v| sum += v);
//! assert_eq!(sum, 10);
//! # Ok::<(), RxError>(())
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A cold source, subscribed to through [`ObservableExt`] |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Scheduler`] | Runs delayed and periodic tasks |
//!
//! Every subscription delivers zero or more values followed by at most one
//! terminal event, either `error` or `complete`. Nothing is delivered after a
//! terminal event or after the subscription was cancelled.
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `from_future`, driven on a shared
//!   `futures` thread pool
//! - **`tokio-scheduler`**: a [`Scheduler`] running on a tokio runtime
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: observable::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler
#[cfg(test)]
#[macro_use]
extern crate bencher;

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subscriber;
pub mod subscription;
pub mod type_hint;
mod util;

pub use error::{RxError, SchedulerError};

#[cfg(doctest)]
mod readme {
  #![doc = include_str!("../README.md")]
}
