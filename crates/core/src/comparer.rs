//! Element equality and ordering
//!
//! Collections never reach for a process-wide default comparer. Every
//! collection is handed a [`Comparer`] at construction; [`NaturalOrder`] is
//! the zero-sized choice for `T: Ord`.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Equality and ordering strategy for `T`.
///
/// `equals` must agree with `compare(a, b) == Ordering::Equal` unless an
/// implementation overrides it deliberately (e.g. equality by key with a
/// secondary sort order).
pub trait Comparer<T>: Send + Sync {
    /// Total order used by `sort`
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Equality used by `contains`, `remove`, `index_of` and `try_add`
    fn equals(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// Shared handle to a comparer
pub type SharedComparer<T> = Arc<dyn Comparer<T>>;

/// `Ord`/`Eq` of `T`.
pub struct NaturalOrder<T>(PhantomData<fn(&T)>);

impl<T> NaturalOrder<T> {
    /// Create the natural-order comparer
    pub const fn new() -> Self {
        NaturalOrder(PhantomData)
    }
}

impl<T> Default for NaturalOrder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NaturalOrder<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for NaturalOrder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NaturalOrder")
    }
}

impl<T: Ord> Comparer<T> for NaturalOrder<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Comparer built from a closure.
///
/// ```
/// use lockstep_core::comparer::{Comparer, FnComparer};
///
/// let by_len = FnComparer::new(|a: &String, b: &String| a.len().cmp(&b.len()));
/// assert!(by_len.equals(&"ab".to_string(), &"cd".to_string()));
/// ```
pub struct FnComparer<F> {
    f: F,
}

impl<F> FnComparer<F> {
    /// Wrap an ordering closure
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> Comparer<T> for FnComparer<F>
where
    F: Fn(&T, &T) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.f)(a, b)
    }
}

/// Orders by a projected key.
pub struct KeyComparer<F> {
    key: F,
}

impl<F> KeyComparer<F> {
    /// Compare elements by `key(element)`
    pub fn new(key: F) -> Self {
        Self { key }
    }
}

impl<T, K, F> Comparer<T> for KeyComparer<F>
where
    F: Fn(&T) -> K + Send + Sync,
    K: Ord,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.key)(a).cmp(&(self.key)(b))
    }
}

/// Reverses another comparer's order, keeping its equality
pub struct Reversed<C>(pub C);

impl<T, C: Comparer<T>> Comparer<T> for Reversed<C> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(a, b).reverse()
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        self.0.equals(a, b)
    }
}

/// Shared natural-order comparer for `T`
pub fn natural<T: Ord + 'static>() -> SharedComparer<T> {
    Arc::new(NaturalOrder::<T>::new())
}
