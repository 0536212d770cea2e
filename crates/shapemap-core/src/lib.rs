//! Binding-driven, bidirectional mapping between record types.
//!
//! Register a pair of records once, declare how their fields correspond,
//! then map instances either way:
//!
//! ```
//! use shapemap_core::{Mapper, Registry, field, record};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Stored {
//!     id: i64,
//!     label: String,
//! }
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Wire {
//!     id: i32,
//!     name: String,
//! }
//!
//! record!(Stored, Wire);
//!
//! let registry = Registry::new();
//! let mapper = registry.create_mapper::<Stored, Wire>()?;
//! mapper.bind(field!(Stored, id), field!(Wire, id))?;
//! mapper.bind(field!(Stored, label), field!(Wire, name))?;
//!
//! let wire: Wire = registry.map(&Stored { id: 7, label: "seven".into() })?;
//! assert_eq!(wire, Wire { id: 7, name: "seven".into() });
//!
//! let back: Stored = registry.map(&wire)?;
//! assert_eq!(back.id, 7);
//! # Ok::<(), shapemap_core::MapError>(())
//! ```

pub mod binding;
pub mod classify;
pub mod coerce;
pub mod collection;
pub mod error;
pub mod field;
pub mod fluent;
pub mod mapper;
pub mod options;
pub mod record;
pub mod registry;
pub mod scalar;

pub use binding::{
    Binding, BindingInfo, BindingKind, CollectionBinding, CollectionSide, Element, FieldBinding,
    IntoCollectionSide,
};
pub use classify::{Classification, Member, SimpleKind, TypeClass, classify};
pub use coerce::Strategy;
pub use collection::{Collection, CollectionField, Equivalence};
pub use error::{MapError, Result};
pub use field::{FieldRef, MemberId};
pub use fluent::{CollectionBuilder, PropertyBuilder};
pub use mapper::{InverseMapper, Mapper, ResolvedMapper, TypeMapper};
pub use options::{AbsentCollection, MapOptions, NullPolicy};
pub use record::{NestedRecord, Record};
pub use registry::{MapContext, Registry, create_mapper, get_mapper, map, map_into};
pub use scalar::Scalar;
