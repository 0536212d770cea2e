//! Field binding behavior through the public API.

use std::ptr;
use std::sync::Arc;
use std::thread;

use shapemap_core::{
    FieldRef, MapError, MapOptions, Mapper, NullPolicy, Registry, SimpleKind, field, record,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Account {
    id: i64,
    owner: String,
    balance: f64,
    limit: Option<i32>,
    note: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct AccountView {
    id: i32,
    owner: String,
    balance: i64,
    limit: i64,
    flagged: bool,
}

record!(Account, AccountView);

fn account_registry(options: MapOptions) -> Registry {
    let registry = Registry::with_options(options);
    let mapper = registry.create_mapper::<Account, AccountView>().unwrap();
    mapper.bind(field!(Account, id), field!(AccountView, id)).unwrap();
    mapper
        .bind(field!(Account, owner), field!(AccountView, owner))
        .unwrap();
    mapper
        .bind(field!(Account, balance), field!(AccountView, balance))
        .unwrap();
    mapper
        .bind(field!(Account, limit), field!(AccountView, limit))
        .unwrap();
    registry
}

fn sample() -> Account {
    Account {
        id: 42,
        owner: "ada".to_string(),
        balance: 10.75,
        limit: Some(500),
        note: "unbound".to_string(),
    }
}

#[test]
fn scalar_round_trip_preserves_bound_fields() {
    let registry = account_registry(MapOptions::default());
    let original = sample();

    let view: AccountView = registry.map(&original).unwrap();
    assert_eq!(
        view,
        AccountView {
            id: 42,
            owner: "ada".to_string(),
            balance: 10,
            limit: 500,
            flagged: false,
        }
    );

    let back: Account = registry.map(&view).unwrap();
    assert_eq!(back.id, original.id);
    assert_eq!(back.owner, original.owner);
    assert_eq!(back.limit, original.limit);
    assert_eq!(back.note, "");
}

#[test]
fn mapping_into_destination_keeps_identity_and_unbound_fields() {
    let registry = account_registry(MapOptions::default());
    let mut destination = AccountView {
        flagged: true,
        ..AccountView::default()
    };
    let address = ptr::from_ref(&destination);

    registry.map_into(&sample(), &mut destination).unwrap();

    assert_eq!(ptr::from_ref(&destination), address);
    assert!(destination.flagged);
    assert_eq!(destination.id, 42);
}

#[test]
fn null_source_empties_the_destination_slot() {
    let registry = account_registry(MapOptions::default());
    let mut slot = Some(AccountView {
        id: 9,
        ..AccountView::default()
    });

    registry
        .map_option::<Account, AccountView>(None, &mut slot)
        .unwrap();
    assert_eq!(slot, None);

    registry.map_option(Some(&sample()), &mut slot).unwrap();
    assert_eq!(slot.map(|view| view.id), Some(42));
}

#[test]
fn map_forward_updates_the_instance_already_in_the_slot() {
    let registry = account_registry(MapOptions::default());
    let mapper = registry.get_mapper::<Account, AccountView>().unwrap();
    let mut slot = Some(AccountView {
        flagged: true,
        ..AccountView::default()
    });

    mapper.map_forward(Some(&sample()), &mut slot).unwrap();
    let view = slot.unwrap();
    assert!(view.flagged);
    assert_eq!(view.owner, "ada");
}

#[test]
fn float_to_integer_truncates_directly_and_through_a_wider_field() {
    #[derive(Default)]
    struct Reading {
        value: f32,
    }
    #[derive(Default)]
    struct Wide {
        value: f64,
    }
    #[derive(Default)]
    struct Narrow {
        value: i32,
    }
    record!(Reading, Wide, Narrow);

    let registry = Registry::new();
    registry
        .create_mapper::<Reading, Narrow>()
        .unwrap()
        .bind(field!(Reading, value), field!(Narrow, value))
        .unwrap();
    registry
        .create_mapper::<Reading, Wide>()
        .unwrap()
        .bind(field!(Reading, value), field!(Wide, value))
        .unwrap();
    registry
        .create_mapper::<Wide, Narrow>()
        .unwrap()
        .bind(field!(Wide, value), field!(Narrow, value))
        .unwrap();

    let reading = Reading { value: 1.1 };
    let direct: Narrow = registry.map(&reading).unwrap();
    let wide: Wide = registry.map(&reading).unwrap();
    let indirect: Narrow = registry.map(&wide).unwrap();

    assert_eq!(direct.value, 1);
    assert_eq!(indirect.value, direct.value);
}

#[test]
fn missing_value_follows_the_null_policy() {
    let rejecting = account_registry(MapOptions::default());
    let source = Account {
        limit: None,
        ..sample()
    };
    let err = rejecting.map::<Account, AccountView>(&source).unwrap_err();
    assert!(matches!(err, MapError::NullValue { to: "i64", .. }));

    let lenient =
        account_registry(MapOptions::default().with_null_policy(NullPolicy::UseDefault));
    let view: AccountView = lenient.map(&source).unwrap();
    assert_eq!(view.limit, 0);

    let back: Account = lenient.map(&view).unwrap();
    assert_eq!(back.limit, Some(0));
}

#[test]
fn later_binding_for_the_same_member_replaces_the_earlier_one() {
    let registry = Registry::new();
    let mapper = registry.create_mapper::<Account, AccountView>().unwrap();
    mapper.bind(field!(Account, id), field!(AccountView, id)).unwrap();
    mapper
        .bind(field!(Account, owner), field!(AccountView, owner))
        .unwrap();
    let same_member = FieldRef::<Account, i64>::new("account_id", |a| &a.id, |a| &mut a.id);
    mapper
        .bind(same_member, field!(AccountView, limit))
        .unwrap();

    assert_eq!(mapper.len(), 2);
    let targets: Vec<_> = mapper.bindings().iter().map(|info| info.right).collect();
    assert_eq!(targets, ["limit", "owner"]);

    let view: AccountView = registry.map(&sample()).unwrap();
    assert_eq!(view.id, 0);
    assert_eq!(view.limit, 42);
}

#[test]
fn invalid_field_reference_is_rejected_at_bind_time() {
    let registry = Registry::new();
    let mapper = registry.create_mapper::<Account, AccountView>().unwrap();
    let crossed = FieldRef::<Account, String>::new("owner", |a| &a.owner, |a| &mut a.note);

    let err = mapper
        .bind(crossed, field!(AccountView, owner))
        .unwrap_err();
    assert!(matches!(
        err,
        MapError::InvalidFieldReference { field: "owner", .. }
    ));
    assert!(mapper.is_empty());
}

#[derive(Debug, Default)]
struct Label {
    text: Option<String>,
    words: Vec<String>,
}

#[derive(Debug, Default)]
struct Code {
    value: Option<u32>,
    numbers: Vec<u32>,
}

record!(Label, Code);

fn assert_text_to_u32(err: MapError) {
    assert!(
        matches!(
            err,
            MapError::UnsupportedConversion {
                from: SimpleKind::Text,
                to: SimpleKind::U32,
                ..
            }
        ),
        "unexpected error: {err}"
    );
}

#[test]
fn unsupported_conversion_fails_whatever_the_value() {
    let registry = Registry::new();
    registry
        .create_mapper::<Label, Code>()
        .unwrap()
        .bind(field!(Label, text), field!(Code, value))
        .unwrap();

    let err = registry
        .map::<Label, Code>(&Label {
            text: Some("12".to_string()),
            ..Label::default()
        })
        .unwrap_err();
    assert_text_to_u32(err);

    // A missing value fails the same way.
    let err = registry.map::<Label, Code>(&Label::default()).unwrap_err();
    assert_text_to_u32(err);
}

#[test]
fn unsupported_element_conversion_fails_for_empty_collections() {
    let registry = Registry::new();
    registry
        .create_mapper::<Label, Code>()
        .unwrap()
        .collection(field!(Label, words))
        .maps_to(field!(Code, numbers))
        .unwrap();

    let err = registry.map::<Label, Code>(&Label::default()).unwrap_err();
    assert_text_to_u32(err);

    let err = registry
        .map::<Label, Code>(&Label {
            words: vec!["7".to_string()],
            ..Label::default()
        })
        .unwrap_err();
    assert_text_to_u32(err);
}

#[test]
fn concurrent_first_use_maps_consistently() {
    let registry = account_registry(MapOptions::default());
    let mapper = Arc::new(registry.get_mapper::<Account, AccountView>().unwrap());

    let handles: Vec<_> = (0..8_i64)
        .map(|n| {
            let mapper = Arc::clone(&mapper);
            thread::spawn(move || {
                let source = Account { id: n, ..sample() };
                let view = mapper.forward(&source).unwrap();
                let back = mapper.reverse(&view).unwrap();
                (view.id, back.id)
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let expected = i32::try_from(n).unwrap();
        assert_eq!(handle.join().unwrap(), (expected, i64::from(expected)));
    }
}
