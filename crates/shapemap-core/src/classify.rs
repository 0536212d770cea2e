//! Type classification for bound fields.
//!
//! Every type that can sit behind a bound field implements [`Member`]. The
//! classification decides which strategy a binding compiles to:
//!
//! - *simple* types are leaf values that are copied or converted in place;
//! - *complex* types are records mapped recursively through the registry.
//!
//! The simple set is closed: the fixed-width integers, both floats, `bool`,
//! `char`, [`Decimal`], `String`, [`Uuid`], the three temporal types
//! ([`NaiveDateTime`], [`TimeDelta`], `DateTime<FixedOffset>`) and `Option`
//! of each of these. Records opt in through [`record!`](crate::record).

use std::any::{Any, TypeId, type_name};
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MapError, Result};
use crate::scalar::Scalar;

/// The value domain of a simple type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimpleKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    Text,
    Uuid,
    /// A calendar date and time without offset.
    Instant,
    Duration,
    /// A calendar date and time with a fixed UTC offset.
    OffsetInstant,
}

impl SimpleKind {
    /// Returns the display name of the kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Uuid => "uuid",
            Self::Instant => "instant",
            Self::Duration => "duration",
            Self::OffsetInstant => "offset instant",
        }
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// True for kinds that take part in numeric casts.
    ///
    /// `char` participates through its code point.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || matches!(self, Self::Decimal | Self::Char)
    }

    /// Returns true if a value of this kind has a native conversion to `to`.
    ///
    /// Individual values can still fail to convert (a non-finite float into a
    /// decimal, an integer that is not a Unicode scalar value into a char).
    #[must_use]
    pub fn converts_to(&self, to: SimpleKind) -> bool {
        if *self == to {
            return true;
        }
        if self.is_numeric() && to.is_numeric() {
            return true;
        }
        matches!(
            (self, to),
            (Self::Instant, Self::OffsetInstant) | (Self::OffsetInstant, Self::Instant)
        )
    }
}

impl fmt::Display for SimpleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Simple,
    Complex,
}

/// Full classification of a member type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A leaf value, possibly wrapped in `Option`.
    Simple { kind: SimpleKind, nullable: bool },
    /// A record (or `Option` of a record) identified by the record type.
    Complex {
        record: TypeId,
        name: &'static str,
    },
}

impl Classification {
    #[must_use]
    pub fn class(&self) -> TypeClass {
        match self {
            Self::Simple { .. } => TypeClass::Simple,
            Self::Complex { .. } => TypeClass::Complex,
        }
    }

    #[must_use]
    pub fn is_simple(&self) -> bool {
        matches!(self, Self::Simple { .. })
    }

    #[must_use]
    pub fn simple_kind(&self) -> Option<SimpleKind> {
        match self {
            Self::Simple { kind, .. } => Some(*kind),
            Self::Complex { .. } => None,
        }
    }
}

/// A type that can be the value of a bound field or a collection element.
///
/// Simple types implement the scalar hooks; records implement the record
/// hooks. The defaults reject the operation that does not apply.
pub trait Member: Default + Send + Sync + 'static {
    /// Classifies the type. Pure and total.
    fn classification() -> Classification;

    /// Reads the value as a scalar; `None` for an absent nullable value.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidScalarType`] for complex types.
    fn to_scalar(&self) -> Result<Option<Scalar>> {
        Err(MapError::InvalidScalarType {
            type_name: type_name::<Self>(),
        })
    }

    /// Builds a value from a scalar of exactly this type's kind.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidScalarType`] for complex types,
    /// [`MapError::UnsupportedConversion`] for a scalar of another kind and
    /// [`MapError::NullValue`] for `None` into a non-nullable type.
    fn from_scalar(value: Option<Scalar>) -> Result<Self> {
        let _ = value;
        Err(MapError::InvalidScalarType {
            type_name: type_name::<Self>(),
        })
    }

    /// The record held by this value, `None` when absent or not a record.
    fn record(&self) -> Option<&dyn Any> {
        None
    }

    /// The record held by this value, instantiated first when absent.
    ///
    /// Returns `None` only for simple types.
    fn record_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }

    /// Resets the value to its default (`None` for optional values).
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Classifies `T`.
#[must_use]
pub fn classify<T: Member>() -> Classification {
    T::classification()
}

/// Returns the identity used for registry lookups of a member type.
///
/// Complex members resolve to their record type; simple members to
/// themselves, which never matches a registered pair.
pub(crate) fn lookup_identity<T: Member>() -> (TypeId, &'static str) {
    match T::classification() {
        Classification::Complex { record, name } => (record, name),
        Classification::Simple { .. } => (TypeId::of::<T>(), type_name::<T>()),
    }
}

fn kind_mismatch(found: &Scalar, expected: SimpleKind) -> MapError {
    MapError::UnsupportedConversion {
        from: found.kind(),
        to: expected,
        reason: "scalar kind does not match the destination",
    }
}

macro_rules! simple_members {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Member for $ty {
                fn classification() -> Classification {
                    Classification::Simple {
                        kind: SimpleKind::$kind,
                        nullable: false,
                    }
                }

                fn to_scalar(&self) -> Result<Option<Scalar>> {
                    Ok(Some(Scalar::$kind(self.clone())))
                }

                fn from_scalar(value: Option<Scalar>) -> Result<Self> {
                    match value {
                        Some(Scalar::$kind(v)) => Ok(v),
                        Some(other) => Err(kind_mismatch(&other, SimpleKind::$kind)),
                        None => Err(MapError::NullValue {
                            from: "None",
                            to: type_name::<$ty>(),
                        }),
                    }
                }
            }

            impl Member for Option<$ty> {
                fn classification() -> Classification {
                    Classification::Simple {
                        kind: SimpleKind::$kind,
                        nullable: true,
                    }
                }

                fn to_scalar(&self) -> Result<Option<Scalar>> {
                    Ok(self.clone().map(Scalar::$kind))
                }

                fn from_scalar(value: Option<Scalar>) -> Result<Self> {
                    match value {
                        Some(Scalar::$kind(v)) => Ok(Some(v)),
                        Some(other) => Err(kind_mismatch(&other, SimpleKind::$kind)),
                        None => Ok(None),
                    }
                }
            }
        )*
    };
}

simple_members! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => Text,
    Uuid => Uuid,
    NaiveDateTime => Instant,
    TimeDelta => Duration,
    DateTime<FixedOffset> => OffsetInstant,
}
