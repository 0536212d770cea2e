//! Error types for mapper registration and mapping.

use thiserror::Error;

use crate::classify::SimpleKind;

/// Errors raised while declaring bindings or mapping instances.
///
/// Every variant describes a usage defect of the caller; nothing here is
/// transient, so callers should not retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// A mapper already exists for the pair, in either order.
    #[error("type \"{first}\" has already been mapped to type \"{second}\"")]
    AlreadyRegistered {
        first: &'static str,
        second: &'static str,
    },
    /// No mapper exists for the pair in either order.
    #[error("type \"{from}\" has not been mapped to type \"{to}\"")]
    NotRegistered {
        from: &'static str,
        to: &'static str,
    },
    /// A nested record was mapped after every handle to the registry that
    /// created the mapper had been dropped.
    #[error("cannot map nested \"{from}\" to \"{to}\": the registry has been dropped")]
    RegistryDropped {
        from: &'static str,
        to: &'static str,
    },
    /// A field reference does not resolve to a field stored in its record.
    #[error("invalid field reference {record}::{field}: {reason}")]
    InvalidFieldReference {
        record: &'static str,
        field: &'static str,
        reason: &'static str,
    },
    /// A scalar copy or conversion was attempted on a complex type.
    #[error("type \"{type_name}\" is not a simple type")]
    InvalidScalarType { type_name: &'static str },
    /// The two simple kinds have no native conversion between them.
    #[error("cannot convert {from} to {to}: {reason}")]
    UnsupportedConversion {
        from: SimpleKind,
        to: SimpleKind,
        reason: &'static str,
    },
    /// A missing value was written into a non-nullable destination.
    #[error("cannot write a missing \"{from}\" value into non-nullable \"{to}\"")]
    NullValue {
        from: &'static str,
        to: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, MapError>;
