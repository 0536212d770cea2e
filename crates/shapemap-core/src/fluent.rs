//! Declaration helpers that read left to right.
//!
//! ```
//! use shapemap_core::{Registry, field, record};
//!
//! #[derive(Default)]
//! struct Row {
//!     id: i64,
//! }
//!
//! #[derive(Default)]
//! struct Dto {
//!     id: i32,
//! }
//!
//! record!(Row, Dto);
//!
//! let registry = Registry::new();
//! let mapper = registry.create_mapper::<Row, Dto>()?;
//! mapper.property(field!(Row, id)).maps_to(field!(Dto, id))?;
//! # Ok::<(), shapemap_core::MapError>(())
//! ```

use crate::binding::{CollectionSide, IntoCollectionSide};
use crate::classify::Member;
use crate::collection::CollectionField;
use crate::error::Result;
use crate::field::FieldRef;
use crate::mapper::TypeMapper;
use crate::record::Record;

/// Pending field binding started by [`TypeMapper::property`].
#[must_use = "a property does nothing until `maps_to` is called"]
pub struct PropertyBuilder<'m, A, B, F> {
    mapper: &'m TypeMapper<A, B>,
    field: FieldRef<A, F>,
}

impl<A: Record, B: Record, F: Member> PropertyBuilder<'_, A, B, F> {
    /// Completes the binding with a field of `B`.
    ///
    /// # Errors
    ///
    /// See [`TypeMapper::bind`].
    pub fn maps_to<G: Member>(self, other: FieldRef<B, G>) -> Result<()> {
        self.mapper.bind(self.field, other)
    }
}

/// Pending collection binding started by [`TypeMapper::collection`].
#[must_use = "a collection does nothing until `maps_to` is called"]
pub struct CollectionBuilder<'m, A, B, F: CollectionField> {
    mapper: &'m TypeMapper<A, B>,
    side: CollectionSide<A, F>,
}

impl<A: Record, B: Record, F: CollectionField> CollectionBuilder<'_, A, B, F> {
    /// Completes the binding with a collection field of `B`.
    ///
    /// # Errors
    ///
    /// See [`TypeMapper::bind_collection`].
    pub fn maps_to<S: IntoCollectionSide<B>>(self, other: S) -> Result<()> {
        self.mapper.bind_collection(self.side, other.into_side())
    }
}

impl<A: Record, B: Record> TypeMapper<A, B> {
    /// Starts a field binding from `field` of `A`.
    pub fn property<F: Member>(&self, field: FieldRef<A, F>) -> PropertyBuilder<'_, A, B, F> {
        PropertyBuilder {
            mapper: self,
            field,
        }
    }

    /// Starts a collection binding from a collection field of `A`.
    pub fn collection<S: IntoCollectionSide<A>>(
        &self,
        side: S,
    ) -> CollectionBuilder<'_, A, B, S::Field> {
        CollectionBuilder {
            mapper: self,
            side: side.into_side(),
        }
    }
}
