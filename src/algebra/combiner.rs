//! Closure-backed operator triple
//!
//! Lets callers supply the three operators as plain closures or function
//! pointers instead of implementing [`Operators`] on a type.

use std::fmt;
use std::marker::PhantomData;

use super::Operators;

/// Operators built from three closures
pub struct FnOperators<V, C, P, E> {
    combine: C,
    compose: P,
    expand: E,
    _value: PhantomData<fn(V) -> V>,
}

impl<V, C, P, E> FnOperators<V, C, P, E>
where
    C: Fn(Option<V>, Option<V>) -> Option<V>,
    P: Fn(Option<V>, V) -> V,
    E: Fn(V, usize, usize) -> V,
{
    /// Bundle `combine`, `compose` and `expand`.
    pub fn new(combine: C, compose: P, expand: E) -> Self {
        Self {
            combine,
            compose,
            expand,
            _value: PhantomData,
        }
    }
}

impl<V, C, P, E> Operators<V> for FnOperators<V, C, P, E>
where
    C: Fn(Option<V>, Option<V>) -> Option<V>,
    P: Fn(Option<V>, V) -> V,
    E: Fn(V, usize, usize) -> V,
{
    #[inline]
    fn combine(&self, a: Option<V>, b: Option<V>) -> Option<V> {
        (self.combine)(a, b)
    }

    #[inline]
    fn compose(&self, a: Option<V>, b: V) -> V {
        (self.compose)(a, b)
    }

    #[inline]
    fn expand(&self, tag: V, first: usize, last: usize) -> V {
        (self.expand)(tag, first, last)
    }
}

impl<V, C, P, E> fmt::Debug for FnOperators<V, C, P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperators").finish_non_exhaustive()
    }
}
