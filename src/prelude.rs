//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core traits
pub use crate::observable::{Observable, ObservableExt};
// Creation/Factories and their observables
pub use crate::observable::*;
// Observer and emitter
pub use crate::observer::{Emitter, Observer};
pub use crate::subscriber::Subscriber;
// Operators
pub use crate::ops::{repeat::Repeat, subscribe_on::SubscribeOn};
// Scheduler Core types
pub use crate::scheduler::{Duration, Instant, Scheduler, TaskHandle};
// Schedulers
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
pub use crate::scheduler::{NewThreadScheduler, TestScheduler, TrampolineScheduler};
// Subscription
pub use crate::subscription::*;
// Errors
pub use crate::error::{RxError, SchedulerError};
pub use crate::of_sequence;
