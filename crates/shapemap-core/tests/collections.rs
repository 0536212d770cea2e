//! Collection bindings and in-place reconciliation.

use std::collections::VecDeque;

use shapemap_core::{
    AbsentCollection, CollectionSide, Equivalence, MapOptions, Registry, field, record,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Item {
    sku: String,
    quantity: i32,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct ItemDto {
    sku: String,
    quantity: i64,
    picked: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Basket {
    items: Vec<Item>,
    codes: Vec<i32>,
    history: Option<VecDeque<u16>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct BasketDto {
    items: Option<Vec<ItemDto>>,
    codes: Vec<i64>,
    history: VecDeque<u32>,
}

record!(Item, ItemDto, Basket, BasketDto);

fn registry(options: MapOptions) -> Registry {
    let registry = Registry::with_options(options);

    let items = registry.create_mapper::<Item, ItemDto>().unwrap();
    items.bind(field!(Item, sku), field!(ItemDto, sku)).unwrap();
    items
        .bind(field!(Item, quantity), field!(ItemDto, quantity))
        .unwrap();

    let baskets = registry.create_mapper::<Basket, BasketDto>().unwrap();
    baskets
        .collection(
            CollectionSide::new(field!(Basket, items))
                .with_comparer(Equivalence::by_key(|item: &Item| item.sku.clone())),
        )
        .maps_to(
            CollectionSide::new(field!(BasketDto, items))
                .with_comparer(Equivalence::by_key(|item: &ItemDto| item.sku.clone())),
        )
        .unwrap();
    baskets
        .collection(field!(Basket, codes))
        .maps_to(field!(BasketDto, codes))
        .unwrap();
    baskets
        .collection(field!(Basket, history))
        .maps_to(field!(BasketDto, history))
        .unwrap();

    registry
}

fn item(sku: &str, quantity: i32) -> Item {
    Item {
        sku: sku.to_string(),
        quantity,
    }
}

fn dto(sku: &str, quantity: i64, picked: bool) -> ItemDto {
    ItemDto {
        sku: sku.to_string(),
        quantity,
        picked,
    }
}

#[test]
fn absent_destination_collection_is_created() {
    let registry = registry(MapOptions::default());
    let basket = Basket {
        items: vec![item("a", 1), item("b", 2)],
        codes: vec![3],
        history: Some(VecDeque::from(vec![1, 2])),
    };

    let mapped: BasketDto = registry.map(&basket).unwrap();

    assert_eq!(
        mapped.items,
        Some(vec![dto("a", 1, false), dto("b", 2, false)])
    );
    assert_eq!(mapped.codes, vec![3]);
    assert_eq!(mapped.history, VecDeque::from(vec![1, 2]));
}

#[test]
fn simple_collections_are_refilled_with_source_cardinality() {
    let registry = registry(MapOptions::default());
    let basket = Basket {
        codes: vec![5, 5, 1],
        ..Basket::default()
    };
    let mut destination = BasketDto {
        codes: vec![9, 9, 9, 9, 9],
        ..BasketDto::default()
    };

    registry.map_into(&basket, &mut destination).unwrap();

    assert_eq!(destination.codes, vec![5, 5, 1]);
}

#[test]
fn record_collections_are_reconciled_in_place() {
    let registry = registry(MapOptions::default());
    let basket = Basket {
        items: vec![item("y", 10), item("z", 3)],
        ..Basket::default()
    };
    let mut destination = BasketDto {
        items: Some(vec![dto("x", 1, true), dto("y", 2, true)]),
        ..BasketDto::default()
    };

    registry.map_into(&basket, &mut destination).unwrap();

    // `y` survives untouched; `x` is removed; `z` is added.
    assert_eq!(
        destination.items,
        Some(vec![dto("y", 2, true), dto("z", 3, false)])
    );
}

#[test]
fn reverse_direction_uses_the_other_sides_comparer() {
    let registry = registry(MapOptions::default());
    let source = BasketDto {
        items: Some(vec![dto("k", 4, true)]),
        ..BasketDto::default()
    };
    let mut destination = Basket {
        items: vec![item("k", 99), item("gone", 1)],
        ..Basket::default()
    };

    registry.map_into(&source, &mut destination).unwrap();

    assert_eq!(destination.items, vec![item("k", 99)]);
}

#[test]
fn absent_source_collection_is_treated_as_empty_by_default() {
    let registry = registry(MapOptions::default());
    let source = BasketDto::default();
    let mut destination = Basket {
        items: vec![item("old", 1)],
        history: Some(VecDeque::from(vec![7])),
        ..Basket::default()
    };

    registry.map_into(&source, &mut destination).unwrap();

    assert!(destination.items.is_empty());
    assert_eq!(destination.history, Some(VecDeque::new()));
}

#[test]
fn absent_source_collection_can_be_skipped() {
    let options = MapOptions::default().with_absent_source_collection(AbsentCollection::Skip);
    let registry = registry(options);
    let mut destination = Basket {
        items: vec![item("old", 1)],
        ..Basket::default()
    };

    registry
        .map_into(&BasketDto::default(), &mut destination)
        .unwrap();

    assert_eq!(destination.items, vec![item("old", 1)]);
}

#[test]
fn identity_comparer_replaces_record_elements() {
    let registry = Registry::new();
    let items = registry.create_mapper::<Item, ItemDto>().unwrap();
    items.bind(field!(Item, sku), field!(ItemDto, sku)).unwrap();
    registry
        .create_mapper::<Basket, BasketDto>()
        .unwrap()
        .collection(field!(Basket, items))
        .maps_to(field!(BasketDto, items))
        .unwrap();

    let mut destination = BasketDto {
        items: Some(vec![dto("a", 0, true)]),
        ..BasketDto::default()
    };
    let source = Basket {
        items: vec![item("a", 5)],
        ..Basket::default()
    };
    registry.map_into(&source, &mut destination).unwrap();

    assert_eq!(destination.items, Some(vec![dto("a", 0, false)]));
}

#[test]
fn custom_factory_builds_the_destination_collection() {
    let registry = Registry::new();
    registry
        .create_mapper::<BasketDto, Basket>()
        .unwrap()
        .bind_collection(
            CollectionSide::new(field!(BasketDto, history)),
            CollectionSide::new(field!(Basket, history))
                .with_factory(|| VecDeque::with_capacity(64)),
        )
        .unwrap();

    let mapped: Basket = registry
        .map(&BasketDto {
            history: VecDeque::from(vec![70_000]),
            ..BasketDto::default()
        })
        .unwrap();

    let history = mapped.history.unwrap();
    assert_eq!(history, VecDeque::from(vec![4_464]));
    assert!(history.capacity() >= 64);
}
