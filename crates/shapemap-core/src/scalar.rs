//! Scalar values and native casts between simple kinds.
//!
//! Casts follow unchecked native cast semantics: widening is lossless,
//! narrowing truncates (float to integer truncates toward zero, integer to a
//! smaller integer keeps the low bits). No range errors are raised.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use uuid::Uuid;

use crate::classify::SimpleKind;
use crate::error::{MapError, Result};

/// A present value of a simple type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Text(String),
    Uuid(Uuid),
    Instant(NaiveDateTime),
    Duration(TimeDelta),
    OffsetInstant(DateTime<FixedOffset>),
}

/// Widest lossless carrier for a numeric cast.
#[derive(Debug, Clone, Copy)]
enum Numeric {
    Int(i128),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
}

impl Scalar {
    #[must_use]
    pub fn kind(&self) -> SimpleKind {
        match self {
            Self::Bool(_) => SimpleKind::Bool,
            Self::Char(_) => SimpleKind::Char,
            Self::I8(_) => SimpleKind::I8,
            Self::I16(_) => SimpleKind::I16,
            Self::I32(_) => SimpleKind::I32,
            Self::I64(_) => SimpleKind::I64,
            Self::U8(_) => SimpleKind::U8,
            Self::U16(_) => SimpleKind::U16,
            Self::U32(_) => SimpleKind::U32,
            Self::U64(_) => SimpleKind::U64,
            Self::F32(_) => SimpleKind::F32,
            Self::F64(_) => SimpleKind::F64,
            Self::Decimal(_) => SimpleKind::Decimal,
            Self::Text(_) => SimpleKind::Text,
            Self::Uuid(_) => SimpleKind::Uuid,
            Self::Instant(_) => SimpleKind::Instant,
            Self::Duration(_) => SimpleKind::Duration,
            Self::OffsetInstant(_) => SimpleKind::OffsetInstant,
        }
    }

    /// Casts the value to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnsupportedConversion`] when the kinds have no
    /// native conversion, or when this particular value has no
    /// representation in `to` (non-finite float into decimal, an integer that
    /// is not a Unicode scalar value into char).
    pub fn cast(self, to: SimpleKind) -> Result<Scalar> {
        let from = self.kind();
        if from == to {
            return Ok(self);
        }
        if let Some(numeric) = self.numeric() {
            return numeric_to(numeric, from, to);
        }
        match (self, to) {
            (Self::Instant(value), SimpleKind::OffsetInstant) => {
                Ok(Self::OffsetInstant(value.and_utc().fixed_offset()))
            }
            (Self::OffsetInstant(value), SimpleKind::Instant) => {
                Ok(Self::Instant(value.naive_utc()))
            }
            _ => Err(unsupported(from, to, "no native conversion between these kinds")),
        }
    }

    fn numeric(&self) -> Option<Numeric> {
        let numeric = match *self {
            Self::Char(v) => Numeric::Int(u32::from(v).into()),
            Self::I8(v) => Numeric::Int(v.into()),
            Self::I16(v) => Numeric::Int(v.into()),
            Self::I32(v) => Numeric::Int(v.into()),
            Self::I64(v) => Numeric::Int(v.into()),
            Self::U8(v) => Numeric::Int(v.into()),
            Self::U16(v) => Numeric::Int(v.into()),
            Self::U32(v) => Numeric::Int(v.into()),
            Self::U64(v) => Numeric::Int(v.into()),
            Self::F32(v) => Numeric::F32(v),
            Self::F64(v) => Numeric::F64(v),
            Self::Decimal(v) => Numeric::Decimal(v),
            _ => return None,
        };
        Some(numeric)
    }
}

fn unsupported(from: SimpleKind, to: SimpleKind, reason: &'static str) -> MapError {
    MapError::UnsupportedConversion { from, to, reason }
}

/// Truncates a numeric value to an integer carrier.
fn integral(value: Numeric, from: SimpleKind, to: SimpleKind) -> Result<i128> {
    match value {
        Numeric::Int(v) => Ok(v),
        Numeric::F32(v) => Ok(v as i128),
        Numeric::F64(v) => Ok(v as i128),
        Numeric::Decimal(v) => v
            .trunc()
            .to_i128()
            .ok_or_else(|| unsupported(from, to, "decimal has no integral value")),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn numeric_to(value: Numeric, from: SimpleKind, to: SimpleKind) -> Result<Scalar> {
    let scalar = match to {
        SimpleKind::I8 => Scalar::I8(integral(value, from, to)? as i8),
        SimpleKind::I16 => Scalar::I16(integral(value, from, to)? as i16),
        SimpleKind::I32 => Scalar::I32(integral(value, from, to)? as i32),
        SimpleKind::I64 => Scalar::I64(integral(value, from, to)? as i64),
        SimpleKind::U8 => Scalar::U8(integral(value, from, to)? as u8),
        SimpleKind::U16 => Scalar::U16(integral(value, from, to)? as u16),
        SimpleKind::U32 => Scalar::U32(integral(value, from, to)? as u32),
        SimpleKind::U64 => Scalar::U64(integral(value, from, to)? as u64),
        SimpleKind::Char => {
            let code = integral(value, from, to)? as u32;
            let ch = char::from_u32(code)
                .ok_or_else(|| unsupported(from, to, "value is not a unicode scalar value"))?;
            Scalar::Char(ch)
        }
        SimpleKind::F32 => Scalar::F32(match value {
            Numeric::Int(v) => v as f32,
            Numeric::F32(v) => v,
            Numeric::F64(v) => v as f32,
            Numeric::Decimal(v) => v
                .to_f32()
                .ok_or_else(|| unsupported(from, to, "decimal out of f32 range"))?,
        }),
        SimpleKind::F64 => Scalar::F64(match value {
            Numeric::Int(v) => v as f64,
            Numeric::F32(v) => v.into(),
            Numeric::F64(v) => v,
            Numeric::Decimal(v) => v
                .to_f64()
                .ok_or_else(|| unsupported(from, to, "decimal out of f64 range"))?,
        }),
        SimpleKind::Decimal => Scalar::Decimal(match value {
            Numeric::Int(v) => Decimal::try_from_i128_with_scale(v, 0)
                .map_err(|_| unsupported(from, to, "integer out of decimal range"))?,
            Numeric::F32(v) => Decimal::from_f32(v)
                .ok_or_else(|| unsupported(from, to, "float is not finite"))?,
            Numeric::F64(v) => Decimal::from_f64(v)
                .ok_or_else(|| unsupported(from, to, "float is not finite"))?,
            Numeric::Decimal(v) => v,
        }),
        _ => return Err(unsupported(from, to, "no native conversion between these kinds")),
    };
    Ok(scalar)
}
