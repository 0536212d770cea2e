//! Collection fields and the reconciler that synchronizes them.
//!
//! A destination collection is never replaced once present. Its contents are
//! brought in line with the transformed source sequence:
//!
//! - simple elements are cleared and refilled in source order;
//! - record elements are merged under an [`Equivalence`], so elements that
//!   survive keep their identity and any fields no binding covers.

use std::collections::VecDeque;
use std::fmt;
use std::ptr;
use std::sync::Arc;

use tracing::trace;

use crate::classify::Member;

/// A growable sequence of members.
pub trait Collection: Send + Sync + 'static {
    type Item: Member;

    fn items(&self) -> impl Iterator<Item = &Self::Item>;

    fn clear(&mut self);

    fn add(&mut self, item: Self::Item);

    /// Keeps only the elements for which `keep` returns true, in order.
    fn retain_items<P>(&mut self, keep: P)
    where
        P: FnMut(&Self::Item) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Member> Collection for Vec<T> {
    type Item = T;

    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn add(&mut self, item: T) {
        self.push(item);
    }

    fn retain_items<P>(&mut self, keep: P)
    where
        P: FnMut(&T) -> bool,
    {
        self.retain(keep);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl<T: Member> Collection for VecDeque<T> {
    type Item = T;

    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }

    fn add(&mut self, item: T) {
        self.push_back(item);
    }

    fn retain_items<P>(&mut self, keep: P)
    where
        P: FnMut(&T) -> bool,
    {
        self.retain(keep);
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }
}

/// The declared type of a collection field: a collection, or an optional one.
pub trait CollectionField: Default + Send + Sync + 'static {
    type Collection: Collection;

    /// The collection, `None` when absent.
    fn collection(&self) -> Option<&Self::Collection>;

    fn collection_mut(&mut self) -> Option<&mut Self::Collection>;

    /// Stores a new collection in the field.
    fn install(&mut self, collection: Self::Collection);
}

macro_rules! collection_fields {
    ($($collection:ident),*) => {
        $(
            impl<T: Member> CollectionField for $collection<T> {
                type Collection = $collection<T>;

                fn collection(&self) -> Option<&Self::Collection> {
                    Some(self)
                }

                fn collection_mut(&mut self) -> Option<&mut Self::Collection> {
                    Some(self)
                }

                fn install(&mut self, collection: Self::Collection) {
                    *self = collection;
                }
            }

            impl<T: Member> CollectionField for Option<$collection<T>> {
                type Collection = $collection<T>;

                fn collection(&self) -> Option<&Self::Collection> {
                    self.as_ref()
                }

                fn collection_mut(&mut self) -> Option<&mut Self::Collection> {
                    self.as_mut()
                }

                fn install(&mut self, collection: Self::Collection) {
                    *self = Some(collection);
                }
            }
        )*
    };
}

collection_fields!(Vec, VecDeque);

/// An equivalence relation over collection elements.
pub struct Equivalence<T> {
    relation: Arc<dyn Fn(&T, &T) -> bool + Send + Sync>,
}

impl<T> Clone for Equivalence<T> {
    fn clone(&self) -> Self {
        Self {
            relation: Arc::clone(&self.relation),
        }
    }
}

impl<T> fmt::Debug for Equivalence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Equivalence").finish_non_exhaustive()
    }
}

impl<T: 'static> Equivalence<T> {
    pub fn new<F>(relation: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            relation: Arc::new(relation),
        }
    }

    /// Two elements are equivalent only if they are the same instance.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(|a: &T, b: &T| ptr::eq(a, b))
    }

    #[must_use]
    pub fn by_eq() -> Self
    where
        T: PartialEq,
    {
        Self::new(|a: &T, b: &T| a == b)
    }

    /// Elements are equivalent when their keys are equal.
    pub fn by_key<K, F>(key: F) -> Self
    where
        K: PartialEq,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::new(move |a: &T, b: &T| key(a) == key(b))
    }

    pub fn equivalent(&self, a: &T, b: &T) -> bool {
        (self.relation)(a, b)
    }
}

/// Synchronizes `destination` with an already transformed source sequence.
///
/// Simple elements are refilled; record elements are merged.
pub fn reconcile<C: Collection>(
    destination: &mut C,
    transformed: Vec<C::Item>,
    equivalence: &Equivalence<C::Item>,
) {
    if <C::Item as Member>::classification().is_simple() {
        refill(destination, transformed);
    } else {
        merge(destination, transformed, equivalence);
    }
}

/// Clears `destination` and appends `items` in order.
pub fn refill<C: Collection>(destination: &mut C, items: Vec<C::Item>) {
    destination.clear();
    for item in items {
        destination.add(item);
    }
}

/// Removes destination elements with no equivalent in `transformed`, then
/// appends each transformed element with no equivalent already present.
pub fn merge<C: Collection>(
    destination: &mut C,
    transformed: Vec<C::Item>,
    equivalence: &Equivalence<C::Item>,
) {
    let before = destination.len();
    destination.retain_items(|existing| {
        transformed
            .iter()
            .any(|candidate| equivalence.equivalent(existing, candidate))
    });
    let kept = destination.len();

    for item in transformed {
        let present = destination
            .items()
            .any(|existing| equivalence.equivalent(existing, &item));
        if !present {
            destination.add(item);
        }
    }
    trace!(
        removed = before - kept,
        added = destination.len() - kept,
        "merged collection"
    );
}
