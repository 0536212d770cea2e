//! Per-pair mappers.
//!
//! A [`TypeMapper`] owns the ordered bindings of one registered pair
//! `(A, B)` and applies them in registration order, in either direction.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tracing::trace;

use crate::binding::{Binding, BindingInfo, CollectionBinding, CollectionSide, FieldBinding};
use crate::classify::Member;
use crate::collection::CollectionField;
use crate::error::{MapError, Result};
use crate::field::{FieldRef, MemberId};
use crate::record::Record;
use crate::registry::MapContext;

/// Mapping operations between two record types.
pub trait Mapper<A: Record, B: Record> {
    /// Maps `source` into an existing `destination`, field by field.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a binding; fields bound before it
    /// have already been written.
    fn apply_forward(&self, source: &A, destination: &mut B) -> Result<()>;

    /// Maps `source` into an existing `destination`, field by field.
    ///
    /// # Errors
    ///
    /// See [`apply_forward`](Self::apply_forward).
    fn apply_reverse(&self, source: &B, destination: &mut A) -> Result<()>;

    /// Maps an optional `source` into the caller's `destination` slot.
    ///
    /// A `None` source empties the slot. Otherwise the instance in the slot
    /// is updated in place, after being created when the slot is empty.
    ///
    /// # Errors
    ///
    /// See [`apply_forward`](Self::apply_forward).
    fn map_forward(&self, source: Option<&A>, destination: &mut Option<B>) -> Result<()> {
        match source {
            None => {
                *destination = None;
                Ok(())
            }
            Some(source) => self.apply_forward(source, destination.get_or_insert_with(B::default)),
        }
    }

    /// The reverse of [`map_forward`](Self::map_forward).
    ///
    /// # Errors
    ///
    /// See [`apply_forward`](Self::apply_forward).
    fn map_reverse(&self, source: Option<&B>, destination: &mut Option<A>) -> Result<()> {
        match source {
            None => {
                *destination = None;
                Ok(())
            }
            Some(source) => self.apply_reverse(source, destination.get_or_insert_with(A::default)),
        }
    }

    /// Maps `source` into a new `B`.
    ///
    /// # Errors
    ///
    /// See [`apply_forward`](Self::apply_forward).
    fn forward(&self, source: &A) -> Result<B> {
        let mut destination = B::default();
        self.apply_forward(source, &mut destination)?;
        Ok(destination)
    }

    /// Maps `source` into a new `A`.
    ///
    /// # Errors
    ///
    /// See [`apply_forward`](Self::apply_forward).
    fn reverse(&self, source: &B) -> Result<A> {
        let mut destination = A::default();
        self.apply_reverse(source, &mut destination)?;
        Ok(destination)
    }
}

type Bindings<A, B> = Vec<(MemberId, Arc<dyn Binding<A, B>>)>;

/// The bindings registered for the pair `(A, B)`.
///
/// Bindings are keyed by the identity of their `A` member; adding a binding
/// for a member that is already bound replaces it in place. Bindings should
/// be declared before the first mapping call.
pub struct TypeMapper<A, B> {
    context: MapContext,
    bindings: RwLock<Bindings<A, B>>,
}

impl<A: Record, B: Record> TypeMapper<A, B> {
    pub(crate) fn new(context: MapContext) -> Self {
        Self {
            context,
            bindings: RwLock::new(Vec::new()),
        }
    }

    /// Adds `binding` under `member`, replacing any binding with the same
    /// member identity at its original position.
    pub fn add_binding(&self, member: MemberId, binding: Arc<dyn Binding<A, B>>) {
        let mut bindings = self
            .bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match bindings.iter_mut().find(|(existing, _)| *existing == member) {
            Some(slot) => {
                trace!(member = member.name(), "replacing binding");
                slot.1 = binding;
            }
            None => bindings.push((member, binding)),
        }
    }

    /// Binds field `left` of `A` to field `right` of `B`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidFieldReference`] when either reference does
    /// not resolve to a field of its record.
    pub fn bind<F: Member, G: Member>(
        &self,
        left: FieldRef<A, F>,
        right: FieldRef<B, G>,
    ) -> Result<()> {
        let member = left.resolve()?;
        right.resolve()?;
        self.add_binding(member, Arc::new(FieldBinding::new(left, right)));
        Ok(())
    }

    /// Binds collection field `left` of `A` to collection field `right` of `B`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidFieldReference`] when either field
    /// reference does not resolve to a field of its record.
    pub fn bind_collection<F, G>(
        &self,
        left: CollectionSide<A, F>,
        right: CollectionSide<B, G>,
    ) -> Result<()>
    where
        F: CollectionField,
        G: CollectionField,
    {
        let member = left.field().resolve()?;
        right.field().resolve()?;
        self.add_binding(member, Arc::new(CollectionBinding::new(left, right)));
        Ok(())
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Describes the bindings in registration order.
    pub fn bindings(&self) -> Vec<BindingInfo> {
        self.snapshot()
            .iter()
            .map(|binding| binding.describe())
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Bindings<A, B>> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clones the binding list so no lock is held while bindings run.
    fn snapshot(&self) -> Vec<Arc<dyn Binding<A, B>>> {
        self.read()
            .iter()
            .map(|(_, binding)| Arc::clone(binding))
            .collect()
    }
}

impl<A: Record, B: Record> Mapper<A, B> for TypeMapper<A, B> {
    fn apply_forward(&self, source: &A, destination: &mut B) -> Result<()> {
        let bindings = self.snapshot();
        trace!(
            source = type_name::<A>(),
            destination = type_name::<B>(),
            bindings = bindings.len(),
            "mapping forward"
        );
        for binding in bindings {
            binding.map_forward(&self.context, source, destination)?;
        }
        Ok(())
    }

    fn apply_reverse(&self, source: &B, destination: &mut A) -> Result<()> {
        let bindings = self.snapshot();
        trace!(
            source = type_name::<B>(),
            destination = type_name::<A>(),
            bindings = bindings.len(),
            "mapping reverse"
        );
        for binding in bindings {
            binding.map_reverse(&self.context, source, destination)?;
        }
        Ok(())
    }
}

impl<A, B> fmt::Debug for TypeMapper<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self
            .bindings
            .read()
            .map(|bindings| bindings.len())
            .unwrap_or_default();
        f.debug_struct("TypeMapper")
            .field("left", &type_name::<A>())
            .field("right", &type_name::<B>())
            .field("bindings", &bindings)
            .finish()
    }
}

/// Which way a type-erased mapper is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Reverse,
}

/// A mapper applied to records behind `dyn Any`, for nested lookups.
pub(crate) trait ErasedMapper: Send + Sync {
    fn apply_erased(
        &self,
        direction: Direction,
        source: &dyn Any,
        destination: &mut dyn Any,
    ) -> Result<()>;
}

impl<A: Record, B: Record> ErasedMapper for TypeMapper<A, B> {
    fn apply_erased(
        &self,
        direction: Direction,
        source: &dyn Any,
        destination: &mut dyn Any,
    ) -> Result<()> {
        match direction {
            Direction::Forward => {
                match (source.downcast_ref::<A>(), destination.downcast_mut::<B>()) {
                    (Some(source), Some(destination)) => self.apply_forward(source, destination),
                    _ => Err(MapError::NotRegistered {
                        from: type_name::<A>(),
                        to: type_name::<B>(),
                    }),
                }
            }
            Direction::Reverse => {
                match (source.downcast_ref::<B>(), destination.downcast_mut::<A>()) {
                    (Some(source), Some(destination)) => self.apply_reverse(source, destination),
                    _ => Err(MapError::NotRegistered {
                        from: type_name::<B>(),
                        to: type_name::<A>(),
                    }),
                }
            }
        }
    }
}

/// A registered `(B, A)` mapper seen as a mapper from `A` to `B`.
pub struct InverseMapper<A, B> {
    inner: Arc<TypeMapper<B, A>>,
}

impl<A: Record, B: Record> InverseMapper<A, B> {
    #[must_use]
    pub fn new(inner: Arc<TypeMapper<B, A>>) -> Self {
        Self { inner }
    }

    /// The registered mapper this view swaps.
    #[must_use]
    pub fn inner(&self) -> &Arc<TypeMapper<B, A>> {
        &self.inner
    }
}

impl<A, B> Clone for InverseMapper<A, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, B> fmt::Debug for InverseMapper<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InverseMapper").field(&self.inner).finish()
    }
}

impl<A: Record, B: Record> Mapper<A, B> for InverseMapper<A, B> {
    fn apply_forward(&self, source: &A, destination: &mut B) -> Result<()> {
        self.inner.apply_reverse(source, destination)
    }

    fn apply_reverse(&self, source: &B, destination: &mut A) -> Result<()> {
        self.inner.apply_forward(source, destination)
    }
}

/// The result of a registry lookup for `(A, B)`.
pub enum ResolvedMapper<A, B> {
    /// `(A, B)` itself was registered.
    Forward(Arc<TypeMapper<A, B>>),
    /// `(B, A)` was registered.
    Inverse(InverseMapper<A, B>),
}

impl<A: Record, B: Record> ResolvedMapper<A, B> {
    #[must_use]
    pub fn is_inverse(&self) -> bool {
        matches!(self, Self::Inverse(_))
    }

    /// Describes the underlying bindings, left side first as registered.
    pub fn bindings(&self) -> Vec<BindingInfo> {
        match self {
            Self::Forward(mapper) => mapper.bindings(),
            Self::Inverse(inverse) => inverse.inner().bindings(),
        }
    }
}

impl<A, B> Clone for ResolvedMapper<A, B> {
    fn clone(&self) -> Self {
        match self {
            Self::Forward(mapper) => Self::Forward(Arc::clone(mapper)),
            Self::Inverse(inverse) => Self::Inverse(inverse.clone()),
        }
    }
}

impl<A, B> fmt::Debug for ResolvedMapper<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward(mapper) => f.debug_tuple("Forward").field(mapper).finish(),
            Self::Inverse(inverse) => f.debug_tuple("Inverse").field(inverse).finish(),
        }
    }
}

impl<A: Record, B: Record> Mapper<A, B> for ResolvedMapper<A, B> {
    fn apply_forward(&self, source: &A, destination: &mut B) -> Result<()> {
        match self {
            Self::Forward(mapper) => mapper.apply_forward(source, destination),
            Self::Inverse(inverse) => inverse.apply_forward(source, destination),
        }
    }

    fn apply_reverse(&self, source: &B, destination: &mut A) -> Result<()> {
        match self {
            Self::Forward(mapper) => mapper.apply_reverse(source, destination),
            Self::Inverse(inverse) => inverse.apply_reverse(source, destination),
        }
    }
}
