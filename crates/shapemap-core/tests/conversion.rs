//! Numeric conversion properties.
//!
//! Field conversions must agree with native `as` casts: truncation toward
//! zero for floats, low-bit truncation for narrowing integers.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shapemap_core::{MapOptions, NullPolicy, Registry, Scalar, SimpleKind, field, record};

#[derive(Debug, Default)]
struct Source {
    ratio: f64,
    count: i64,
    small: Option<u8>,
}

#[derive(Debug, Default)]
struct Target {
    ratio: i32,
    count: u16,
    small: Decimal,
}

record!(Source, Target);

fn registry() -> Registry {
    let registry =
        Registry::with_options(MapOptions::default().with_null_policy(NullPolicy::UseDefault));
    let mapper = registry.create_mapper::<Source, Target>().unwrap();
    mapper.bind(field!(Source, ratio), field!(Target, ratio)).unwrap();
    mapper.bind(field!(Source, count), field!(Target, count)).unwrap();
    mapper.bind(field!(Source, small), field!(Target, small)).unwrap();
    registry
}

proptest! {
    #[test]
    fn float_fields_truncate_like_casts(ratio in -1.0e9_f64..1.0e9_f64) {
        let registry = registry();
        let target: Target = registry
            .map(&Source { ratio, ..Source::default() })
            .unwrap();
        prop_assert_eq!(target.ratio, ratio as i32);
    }

    #[test]
    fn narrowing_integers_keep_low_bits(count in any::<i64>()) {
        let registry = registry();
        let target: Target = registry
            .map(&Source { count, ..Source::default() })
            .unwrap();
        prop_assert_eq!(target.count, count as u16);
    }

    #[test]
    fn nullable_integers_widen_into_decimal(small in proptest::option::of(any::<u8>())) {
        let registry = registry();
        let target: Target = registry
            .map(&Source { small, ..Source::default() })
            .unwrap();
        prop_assert_eq!(target.small, Decimal::from(small.unwrap_or_default()));
    }

    #[test]
    fn integer_round_trip_through_wider_kind_is_lossless(value in any::<i32>()) {
        let widened = Scalar::I32(value).cast(SimpleKind::F64).unwrap();
        prop_assert_eq!(widened.cast(SimpleKind::I32).unwrap(), Scalar::I32(value));
    }

    #[test]
    fn decimal_to_integer_truncates_toward_zero(units in -1_000_000_i64..1_000_000, scale in 0_u32..6) {
        let value = Decimal::new(units, scale);
        let expected = units / 10_i64.pow(scale);
        prop_assert_eq!(
            Scalar::Decimal(value).cast(SimpleKind::I64).unwrap(),
            Scalar::I64(expected)
        );
    }
}
