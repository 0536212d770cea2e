//! Scalar coercion: copy or convert a simple value between two members.
//!
//! Complex members never reach these functions through a binding; the
//! binding selects [`Strategy::Recurse`] for them and maps through the
//! registry instead.

use std::any::{TypeId, type_name};
use std::fmt;

use crate::classify::{Classification, Member, SimpleKind};
use crate::error::{MapError, Result};
use crate::options::NullPolicy;

/// How a binding moves a value from its source member to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Same simple type on both sides.
    Copy,
    /// Two different simple types.
    Convert { from: SimpleKind, to: SimpleKind },
    /// At least one side is a record.
    Recurse,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => f.write_str("copy"),
            Self::Convert { from, to } => write!(f, "convert {from} -> {to}"),
            Self::Recurse => f.write_str("map"),
        }
    }
}

/// Picks the strategy for moving an `S` into a `D`.
#[must_use]
pub fn select_strategy<S: Member, D: Member>() -> Strategy {
    match (S::classification(), D::classification()) {
        (Classification::Simple { .. }, Classification::Simple { .. })
            if TypeId::of::<S>() == TypeId::of::<D>() =>
        {
            Strategy::Copy
        }
        (Classification::Simple { kind: from, .. }, Classification::Simple { kind: to, .. }) => {
            Strategy::Convert { from, to }
        }
        _ => Strategy::Recurse,
    }
}

/// Copies a simple value into `destination`.
///
/// # Errors
///
/// Returns [`MapError::InvalidScalarType`] when `T` is complex.
pub fn copy<T: Member>(source: &T, destination: &mut T) -> Result<()> {
    *destination = transfer(source)?;
    Ok(())
}

/// Moves a simple value into a type of the same kind and nullability.
pub(crate) fn transfer<S: Member, D: Member>(source: &S) -> Result<D> {
    D::from_scalar(source.to_scalar()?)
}

/// Converts a simple value and writes it into `destination`.
///
/// # Errors
///
/// See [`convert_value`].
pub fn convert<S: Member, D: Member>(
    source: &S,
    destination: &mut D,
    policy: NullPolicy,
) -> Result<()> {
    *destination = convert_value(source, policy)?;
    Ok(())
}

/// Converts a simple value of type `S` into a new `D`.
///
/// A missing source value stays missing for a nullable `D`; for a
/// non-nullable `D` it is resolved by `policy`.
///
/// # Errors
///
/// Returns [`MapError::InvalidScalarType`] when either type is complex,
/// [`MapError::UnsupportedConversion`] when the kinds do not convert and
/// [`MapError::NullValue`] for a rejected missing value.
pub fn convert_value<S: Member, D: Member>(source: &S, policy: NullPolicy) -> Result<D> {
    let Classification::Simple { kind, nullable } = D::classification() else {
        return Err(MapError::InvalidScalarType {
            type_name: type_name::<D>(),
        });
    };
    match source.to_scalar()? {
        Some(value) => D::from_scalar(Some(value.cast(kind)?)),
        None if nullable => D::from_scalar(None),
        None => match policy {
            NullPolicy::Reject => Err(MapError::NullValue {
                from: type_name::<S>(),
                to: type_name::<D>(),
            }),
            NullPolicy::UseDefault => Ok(D::default()),
        },
    }
}
