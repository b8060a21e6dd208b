//! Concurrent, fail-fast aggregation of futures.
//!
//! [`Future::sequence`] starts every member at once and joins their outcomes
//! through a shared `Join`: a pending counter, one slot per member and a
//! completion guard (the aggregate resolver, taken by whichever outcome
//! settles the join). The first failure settles the aggregate; members still
//! running are neither cancelled nor awaited, and their later outcomes are
//! ignored.

use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Future, Resolver};
use crate::error::{Error, FutureError};

/// A collection of futures that can be joined into one future.
///
/// Implemented for `Vec<Future<T>>`, producing `Vec<T>`, and for tuples of up
/// to eight futures with independent value types, producing the tuple of
/// values.
///
/// # Examples
///
/// ```rust
/// use cbfuture::{Future, Sequence};
///
/// let mixed = (Future::successful(1), Future::successful("a"), Future::successful(2));
/// assert_eq!(mixed.into_sequence().wait().unwrap(), (1, "a", 2));
///
/// let same = vec![Future::successful(1), Future::successful(2)];
/// assert_eq!(Future::sequence(same).wait().unwrap(), vec![1, 2]);
/// ```
pub trait Sequence {
    /// The collected values.
    type Output: Send + 'static;

    /// Builds the joined future.
    fn into_sequence(self) -> Future<Self::Output>;
}

impl<T: Send + 'static> Future<T> {
    /// Joins several futures into one.
    ///
    /// When started, every member is started concurrently and its own handlers
    /// fire as usual. The joined future succeeds with the values in input
    /// order once every member succeeded, or fails with the first error in
    /// completion order.
    pub fn sequence<S>(members: S) -> Self
    where
        S: Sequence<Output = T>,
    {
        members.into_sequence()
    }
}

// =============================================================================
// Join
// =============================================================================

trait Slots: Default + Send + 'static {
    type Output: Send + 'static;

    fn fill(self) -> Option<Self::Output>;
}

struct JoinState<S: Slots> {
    resolver: Option<Resolver<S::Output>>,
    slots: S,
    pending: usize,
}

struct Join<S: Slots> {
    state: Mutex<JoinState<S>>,
}

impl<S: Slots> Join<S> {
    fn new(resolver: Resolver<S::Output>, pending: usize, slots: S) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(JoinState {
                resolver: Some(resolver),
                slots,
                pending,
            }),
        })
    }

    fn settle<V, P>(&self, index: usize, outcome: Result<V, Error>, place: P)
    where
        P: FnOnce(&mut S, V),
    {
        let mut state = self.state.lock();
        if state.resolver.is_none() {
            tracing::trace!(index, "sequence already settled; member outcome ignored");
            return;
        }

        match outcome {
            Ok(value) => {
                place(&mut state.slots, value);
                state.pending = state.pending.saturating_sub(1);
                if state.pending > 0 {
                    return;
                }
                let resolver = state.resolver.take();
                let slots = mem::take(&mut state.slots);
                drop(state);

                if let Some(resolver) = resolver {
                    match slots.fill() {
                        Some(values) => resolver.succeed(values),
                        None => resolver.fail(FutureError::Abandoned),
                    }
                }
            }
            Err(error) => {
                let resolver = state.resolver.take();
                let pending = state.pending;
                drop(state);

                tracing::debug!(index, pending, error = %error, "sequence member failed");
                if let Some(resolver) = resolver {
                    resolver.fail(error);
                }
            }
        }
    }
}

// =============================================================================
// Vec
// =============================================================================

impl<T: Send + 'static> Slots for Vec<Option<T>> {
    type Output = Vec<T>;

    fn fill(self) -> Option<Vec<T>> {
        self.into_iter().collect()
    }
}

impl<T: Send + 'static> Sequence for Vec<Future<T>> {
    type Output = Vec<T>;

    fn into_sequence(self) -> Future<Vec<T>> {
        let members: Arc<[Future<T>]> = self.into();
        Future::new(move |resolver| {
            if members.is_empty() {
                resolver.succeed(Vec::new());
                return;
            }
            let slots: Vec<Option<T>> = members.iter().map(|_| None).collect();
            let join = Join::new(resolver, members.len(), slots);
            for (index, member) in members.iter().enumerate() {
                let join = Arc::clone(&join);
                member.run(move |outcome| {
                    join.settle(index, outcome, |slots: &mut Vec<Option<T>>, value| {
                        slots[index] = Some(value);
                    });
                });
            }
        })
    }
}

// =============================================================================
// Tuples
// =============================================================================

macro_rules! impl_sequence_for_tuple {
    ($count:expr; $($value:ident : $index:tt),+) => {
        impl<$($value: Send + 'static),+> Slots for ($(Option<$value>,)+) {
            type Output = ($($value,)+);

            fn fill(self) -> Option<Self::Output> {
                Some(($(self.$index?,)+))
            }
        }

        impl<$($value: Send + 'static),+> Sequence for ($(Future<$value>,)+) {
            type Output = ($($value,)+);

            fn into_sequence(self) -> Future<Self::Output> {
                let members = self;
                Future::new(move |resolver| {
                    let slots = <($(Option<$value>,)+) as Default>::default();
                    let join = Join::new(resolver, $count, slots);
                    $(
                        {
                            let join = Arc::clone(&join);
                            members.$index.run(move |outcome| {
                                join.settle($index, outcome, |slots, value| {
                                    slots.$index = Some(value);
                                });
                            });
                        }
                    )+
                })
            }
        }
    };
}

impl_sequence_for_tuple!(1; A: 0);
impl_sequence_for_tuple!(2; A: 0, B: 1);
impl_sequence_for_tuple!(3; A: 0, B: 1, C: 2);
impl_sequence_for_tuple!(4; A: 0, B: 1, C: 2, D: 3);
impl_sequence_for_tuple!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_sequence_for_tuple!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_sequence_for_tuple!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_sequence_for_tuple!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
