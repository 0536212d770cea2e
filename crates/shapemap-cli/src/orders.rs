//! Order shapes used by the `shapemap` commands.
//!
//! `Stored*` types are the persisted form; `*Dto` types are what travels over
//! the wire. The two differ in field names, numeric widths and optionality,
//! which is what the bindings in [`register`] reconcile.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shapemap_core::{CollectionSide, Equivalence, Registry, Result, field, record};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredOrder {
    pub id: Uuid,
    pub customer: String,
    pub placed_at: NaiveDateTime,
    pub total_cents: i64,
    pub discount: Option<f64>,
    pub lines: Vec<StoredLine>,
    pub tags: Vec<String>,
    pub shipping: Option<StoredAddress>,
    pub priority: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredLine {
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Warehouse note; never leaves storage.
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDto {
    pub order_id: Uuid,
    pub customer_name: String,
    pub placed_at: DateTime<FixedOffset>,
    pub total_cents: i64,
    pub discount: Option<f32>,
    pub lines: Option<Vec<LineDto>>,
    pub tags: Vec<String>,
    pub ship_to: Option<AddressDto>,
    pub priority: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineDto {
    pub sku: String,
    pub qty: i64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressDto {
    pub street: String,
    pub city: String,
    pub zip: String,
}

record!(
    StoredOrder,
    StoredLine,
    StoredAddress,
    OrderDto,
    LineDto,
    AddressDto,
);

/// Registers the order pairs with `registry`.
///
/// Nested pairs are registered before the order pair that refers to them.
///
/// # Errors
///
/// Fails if any of the pairs is already registered.
pub fn register(registry: &Registry) -> Result<()> {
    let addresses = registry.create_mapper::<StoredAddress, AddressDto>()?;
    addresses.bind(field!(StoredAddress, street), field!(AddressDto, street))?;
    addresses.bind(field!(StoredAddress, city), field!(AddressDto, city))?;
    addresses.bind(field!(StoredAddress, postal_code), field!(AddressDto, zip))?;

    let lines = registry.create_mapper::<StoredLine, LineDto>()?;
    lines.bind(field!(StoredLine, sku), field!(LineDto, sku))?;
    lines.bind(field!(StoredLine, quantity), field!(LineDto, qty))?;
    lines.bind(field!(StoredLine, unit_price), field!(LineDto, unit_price))?;

    let orders = registry.create_mapper::<StoredOrder, OrderDto>()?;
    orders
        .property(field!(StoredOrder, id))
        .maps_to(field!(OrderDto, order_id))?;
    orders
        .property(field!(StoredOrder, customer))
        .maps_to(field!(OrderDto, customer_name))?;
    orders
        .property(field!(StoredOrder, placed_at))
        .maps_to(field!(OrderDto, placed_at))?;
    orders
        .property(field!(StoredOrder, total_cents))
        .maps_to(field!(OrderDto, total_cents))?;
    orders
        .property(field!(StoredOrder, discount))
        .maps_to(field!(OrderDto, discount))?;
    orders
        .property(field!(StoredOrder, priority))
        .maps_to(field!(OrderDto, priority))?;
    orders
        .property(field!(StoredOrder, shipping))
        .maps_to(field!(OrderDto, ship_to))?;
    orders
        .collection(
            CollectionSide::new(field!(StoredOrder, lines))
                .with_comparer(Equivalence::by_key(|line: &StoredLine| line.sku.clone())),
        )
        .maps_to(
            CollectionSide::new(field!(OrderDto, lines))
                .with_comparer(Equivalence::by_key(|line: &LineDto| line.sku.clone())),
        )?;
    orders
        .collection(field!(StoredOrder, tags))
        .maps_to(field!(OrderDto, tags))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_three_pairs() {
        let registry = Registry::new();
        register(&registry).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(register(&registry).is_err());
    }

    #[test]
    fn storage_only_note_survives_transport() {
        let registry = Registry::new();
        register(&registry).unwrap();

        let line = StoredLine {
            sku: "A-1".into(),
            quantity: 2,
            unit_price: Decimal::new(1250, 2),
            note: Some("fragile".into()),
        };
        let dto: LineDto = registry.map(&line).unwrap();
        assert_eq!(dto.qty, 2);
        assert!((dto.unit_price - 12.5).abs() < f64::EPSILON);

        let mut stored = line.clone();
        registry.map_into(&dto, &mut stored).unwrap();
        assert_eq!(stored, line);
    }
}
