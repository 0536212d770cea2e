//! Record types: the complex side of the classifier.

use std::any::{Any, TypeId, type_name};

use crate::classify::{Classification, Member};

/// A structured type mapped field by field through a registered mapper.
///
/// Implement it with [`record!`](crate::record), which also provides the
/// [`Member`] impl so the record can sit behind a bound field or inside a
/// bound collection. `Box<R>`, `Option<R>` and `Option<Box<R>>` are members
/// for every record `R`, which allows recursive shapes.
pub trait Record: Default + Send + Sync + 'static {}

/// A value that owns a record: the record itself, or a box around it.
///
/// Implemented by [`record!`](crate::record) and for `Box<R>`.
pub trait NestedRecord: Default + Send + Sync + 'static {
    type Target: Record;

    fn inner(&self) -> &Self::Target;

    fn inner_mut(&mut self) -> &mut Self::Target;
}

/// Declares one or more structs as mappable records.
///
/// ```
/// #[derive(Default)]
/// struct Customer {
///     name: String,
/// }
///
/// shapemap_core::record!(Customer);
/// ```
#[macro_export]
macro_rules! record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Record for $ty {}

            impl $crate::NestedRecord for $ty {
                type Target = $ty;

                fn inner(&self) -> &$ty {
                    self
                }

                fn inner_mut(&mut self) -> &mut $ty {
                    self
                }
            }

            impl $crate::Member for $ty {
                fn classification() -> $crate::Classification {
                    $crate::record::complex::<$ty>()
                }

                fn record(&self) -> ::std::option::Option<&dyn ::std::any::Any> {
                    ::std::option::Option::Some(self)
                }

                fn record_mut(&mut self) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                    ::std::option::Option::Some(self)
                }
            }
        )+
    };
}

#[doc(hidden)]
#[must_use]
pub fn complex<R: Record>() -> Classification {
    Classification::Complex {
        record: TypeId::of::<R>(),
        name: type_name::<R>(),
    }
}

impl<R: Record> NestedRecord for Box<R> {
    type Target = R;

    fn inner(&self) -> &R {
        self
    }

    fn inner_mut(&mut self) -> &mut R {
        self
    }
}

impl<R: Record> Member for Box<R> {
    fn classification() -> Classification {
        complex::<R>()
    }

    fn record(&self) -> Option<&dyn Any> {
        Some(self.inner() as &dyn Any)
    }

    fn record_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self.inner_mut() as &mut dyn Any)
    }
}

impl<N: NestedRecord> Member for Option<N> {
    fn classification() -> Classification {
        complex::<N::Target>()
    }

    fn record(&self) -> Option<&dyn Any> {
        self.as_ref().map(|nested| nested.inner() as &dyn Any)
    }

    fn record_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self.get_or_insert_with(N::default).inner_mut() as &mut dyn Any)
    }
}
