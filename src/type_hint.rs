use std::marker::PhantomData;

/// Zero-sized marker carrying the `Item`/`Err` types of a source that stores
/// no value of those types (`empty`, `never`, ...).
///
/// Uses `fn() -> T` so the marker is `Send + Sync + Copy` whatever `T` is.
pub struct TypeHint<T>(PhantomData<fn() -> T>);

impl<T> TypeHint<T> {
  #[inline]
  pub fn new() -> Self { TypeHint(PhantomData) }
}

impl<T> Default for TypeHint<T> {
  #[inline]
  fn default() -> Self { Self::new() }
}

impl<T> Clone for TypeHint<T> {
  #[inline]
  fn clone(&self) -> Self { *self }
}

impl<T> Copy for TypeHint<T> {}
