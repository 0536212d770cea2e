//! Field references and member identity.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::size_of;
use std::ptr;

use crate::error::{MapError, Result};
use crate::record::Record;

/// A reference to one field `F` of record `R`, as a pair of projections.
///
/// `F` is a [`Member`](crate::Member) for field bindings and a
/// [`CollectionField`](crate::CollectionField) for collection bindings.
///
/// Build it with [`field!`](crate::field), which guarantees both projections
/// name the same field. Hand-built references are checked by
/// [`resolve`](Self::resolve) when they are bound.
pub struct FieldRef<R, F> {
    name: &'static str,
    get: fn(&R) -> &F,
    get_mut: fn(&mut R) -> &mut F,
}

impl<R, F> Clone for FieldRef<R, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, F> Copy for FieldRef<R, F> {}

impl<R, F> fmt::Debug for FieldRef<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRef")
            .field("record", &type_name::<R>())
            .field("name", &self.name)
            .finish()
    }
}

impl<R, F> FieldRef<R, F> {
    #[must_use]
    pub const fn new(
        name: &'static str,
        get: fn(&R) -> &F,
        get_mut: fn(&mut R) -> &mut F,
    ) -> Self {
        Self { name, get, get_mut }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn get<'r>(&self, record: &'r R) -> &'r F {
        (self.get)(record)
    }

    pub fn get_mut<'r>(&self, record: &'r mut R) -> &'r mut F {
        (self.get_mut)(record)
    }
}

impl<R: Record, F: 'static> FieldRef<R, F> {
    /// Resolves the reference to the identity of the field it names.
    ///
    /// Both projections are applied to a default instance; they must land on
    /// the same address, inside the record's own storage.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidFieldReference`] otherwise.
    pub fn resolve(&self) -> Result<MemberId> {
        let mut probe = R::default();
        let base = ptr::from_ref(&probe).addr();
        let shared = ptr::from_ref((self.get)(&probe)).addr();
        let exclusive = ptr::from_mut((self.get_mut)(&mut probe)).addr();

        if shared != exclusive {
            return Err(self.invalid("accessors resolve to different members"));
        }
        let offset = shared.wrapping_sub(base);
        if shared < base || offset + size_of::<F>() > size_of::<R>() {
            return Err(self.invalid(
                "accessor does not resolve to a field stored inside the record",
            ));
        }
        Ok(MemberId {
            offset,
            field_type: TypeId::of::<F>(),
            name: self.name,
        })
    }

    fn invalid(&self, reason: &'static str) -> MapError {
        MapError::InvalidFieldReference {
            record: type_name::<R>(),
            field: self.name,
            reason,
        }
    }
}

/// Identity of a field within its record.
///
/// Equality ignores the declared name: two references reaching the same
/// bytes with the same type name the same member.
#[derive(Debug, Clone, Copy)]
pub struct MemberId {
    offset: usize,
    field_type: TypeId,
    name: &'static str,
}

impl MemberId {
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MemberId {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.field_type == other.field_type
    }
}

impl Eq for MemberId {}

impl Hash for MemberId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
        self.field_type.hash(state);
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Builds a [`FieldRef`] to a named field of a record.
///
/// ```
/// #[derive(Default)]
/// struct Order {
///     total: i64,
/// }
/// shapemap_core::record!(Order);
///
/// let total = shapemap_core::field!(Order, total);
/// assert_eq!(total.name(), "total");
/// ```
#[macro_export]
macro_rules! field {
    ($record:ty, $field:ident) => {
        $crate::FieldRef::<$record, _>::new(
            ::std::stringify!($field),
            |record| &record.$field,
            |record| &mut record.$field,
        )
    };
}
