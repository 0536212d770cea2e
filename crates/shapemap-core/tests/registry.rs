//! Registration, lookup and reset.

use std::any::type_name;

use shapemap_core::{MapError, Mapper, Registry, ResolvedMapper, field, record};

#[derive(Debug, Default, Clone, PartialEq)]
struct Left {
    value: i32,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Right {
    value: i32,
}

#[derive(Debug, Default)]
struct Unrelated;

record!(Left, Right, Unrelated);

#[test]
fn duplicate_registration_fails_until_reset() {
    let registry = Registry::new();
    registry.create_mapper::<Left, Right>().unwrap();

    let err = registry.create_mapper::<Left, Right>().unwrap_err();
    assert_eq!(
        err,
        MapError::AlreadyRegistered {
            first: type_name::<Left>(),
            second: type_name::<Right>(),
        }
    );
    assert!(registry.create_mapper::<Right, Left>().is_err());

    registry.reset();
    assert!(registry.is_empty());
    assert!(registry.create_mapper::<Left, Right>().is_ok());
    assert_eq!(registry.len(), 1);
}

#[test]
fn reversed_lookup_returns_an_inverse_view() {
    let registry = Registry::new();
    registry
        .create_mapper::<Left, Right>()
        .unwrap()
        .bind(field!(Left, value), field!(Right, value))
        .unwrap();

    let forward = registry.get_mapper::<Left, Right>().unwrap();
    let inverse = registry.get_mapper::<Right, Left>().unwrap();
    assert!(!forward.is_inverse());
    assert!(inverse.is_inverse());

    let left = Left { value: 3 };
    let via_forward = forward.forward(&left).unwrap();
    let via_inverse = inverse.reverse(&left).unwrap();
    assert_eq!(via_forward, via_inverse);
    assert_eq!(inverse.forward(&via_forward).unwrap(), left);

    let ResolvedMapper::Inverse(view) = inverse else {
        panic!("expected an inverse view");
    };
    assert_eq!(view.inner().len(), 1);
}

#[test]
fn unregistered_pairs_are_reported() {
    let registry = Registry::new();
    registry.create_mapper::<Left, Right>().unwrap();

    let err = registry.get_mapper::<Left, Unrelated>().unwrap_err();
    assert_eq!(
        err,
        MapError::NotRegistered {
            from: type_name::<Left>(),
            to: type_name::<Unrelated>(),
        }
    );
    assert!(registry.map::<Unrelated, Right>(&Unrelated).is_err());

    let mut slot: Option<Right> = None;
    assert!(registry.map_option::<Unrelated, Right>(None, &mut slot).is_err());
}

#[test]
fn registries_are_isolated() {
    let first = Registry::new();
    let second = Registry::new();
    first.create_mapper::<Left, Right>().unwrap();

    assert!(second.create_mapper::<Left, Right>().is_ok());
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
}

#[test]
fn global_registry_serves_the_free_functions() {
    #[derive(Debug, Default, PartialEq)]
    struct GlobalSource {
        code: u8,
    }
    #[derive(Debug, Default, PartialEq)]
    struct GlobalTarget {
        code: u64,
    }
    record!(GlobalSource, GlobalTarget);

    shapemap_core::create_mapper::<GlobalSource, GlobalTarget>()
        .unwrap()
        .bind(field!(GlobalSource, code), field!(GlobalTarget, code))
        .unwrap();

    let target: GlobalTarget = shapemap_core::map(&GlobalSource { code: 200 }).unwrap();
    assert_eq!(target, GlobalTarget { code: 200 });

    let mut source = GlobalSource::default();
    shapemap_core::map_into(&target, &mut source).unwrap();
    assert_eq!(source.code, 200);

    assert!(shapemap_core::get_mapper::<GlobalTarget, GlobalSource>()
        .unwrap()
        .is_inverse());
}

#[test]
fn held_mappers_outlive_their_registry() {
    #[derive(Debug, Default, PartialEq)]
    struct Outer {
        value: i32,
        inner: Option<Left>,
    }
    #[derive(Debug, Default, PartialEq)]
    struct OuterView {
        value: i64,
        inner: Option<Right>,
    }
    record!(Outer, OuterView);

    let registry = Registry::new();
    let flat = registry.create_mapper::<Left, Right>().unwrap();
    flat.bind(field!(Left, value), field!(Right, value)).unwrap();
    let nested = registry.create_mapper::<Outer, OuterView>().unwrap();
    nested
        .bind(field!(Outer, value), field!(OuterView, value))
        .unwrap();
    nested
        .bind(field!(Outer, inner), field!(OuterView, inner))
        .unwrap();
    drop(registry);

    assert_eq!(flat.forward(&Left { value: 3 }).unwrap(), Right { value: 3 });
    assert_eq!(flat.reverse(&Right { value: 4 }).unwrap(), Left { value: 4 });

    let err = nested
        .forward(&Outer {
            value: 1,
            inner: Some(Left { value: 2 }),
        })
        .unwrap_err();
    assert_eq!(
        err,
        MapError::RegistryDropped {
            from: type_name::<Left>(),
            to: type_name::<Right>(),
        }
    );
}
