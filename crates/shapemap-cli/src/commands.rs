use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use shapemap_core::{BindingInfo, BindingKind, MapOptions, Record, Registry};
use tracing::{debug, info};

use crate::orders::{
    AddressDto, LineDto, OrderDto, StoredAddress, StoredLine, StoredOrder, register,
};

/// Bindings of one registered pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairListing {
    pub pair: String,
    pub bindings: Vec<BindingInfo>,
}

/// A registry with the order pairs registered.
///
/// # Errors
///
/// Fails if registration fails.
pub fn order_registry(options: MapOptions) -> Result<Registry> {
    let registry = Registry::with_options(options);
    register(&registry).context("register order mappers")?;
    Ok(registry)
}

/// Maps a stored order document to its transport form.
///
/// # Errors
///
/// Fails on malformed JSON or a mapping error.
pub fn to_transport(registry: &Registry, stored_json: &str) -> Result<String> {
    let stored: StoredOrder = serde_json::from_str(stored_json).context("parse stored order")?;
    let dto: OrderDto = registry.map(&stored).context("map stored order")?;
    serde_json::to_string_pretty(&dto).context("serialize transport order")
}

/// Maps a transport order document to its stored form.
///
/// With `existing`, the mapping updates that stored document in place, so
/// storage-only values such as line notes are kept.
///
/// # Errors
///
/// Fails on malformed JSON or a mapping error.
pub fn to_storage(registry: &Registry, dto_json: &str, existing: Option<&str>) -> Result<String> {
    let dto: OrderDto = serde_json::from_str(dto_json).context("parse transport order")?;
    let mut stored = match existing {
        Some(json) => serde_json::from_str(json).context("parse existing stored order")?,
        None => StoredOrder::default(),
    };
    registry
        .map_into(&dto, &mut stored)
        .context("map transport order")?;
    serde_json::to_string_pretty(&stored).context("serialize stored order")
}

/// Bindings of every order pair, in registration order.
///
/// # Errors
///
/// Fails if a pair is missing from `registry`.
pub fn listings(registry: &Registry) -> Result<Vec<PairListing>> {
    Ok(vec![
        listing::<StoredAddress, AddressDto>(registry, "StoredAddress -> AddressDto")?,
        listing::<StoredLine, LineDto>(registry, "StoredLine -> LineDto")?,
        listing::<StoredOrder, OrderDto>(registry, "StoredOrder -> OrderDto")?,
    ])
}

fn listing<A: Record, B: Record>(registry: &Registry, pair: &str) -> Result<PairListing> {
    let mapper = registry
        .get_mapper::<A, B>()
        .with_context(|| format!("look up {pair}"))?;
    Ok(PairListing {
        pair: pair.to_string(),
        bindings: mapper.bindings(),
    })
}

/// Plain-text rendering of `listings`, one binding per line.
#[must_use]
pub fn render_listings(listings: &[PairListing]) -> String {
    let mut out = String::new();
    for listing in listings {
        let _ = writeln!(out, "{}", listing.pair);
        for info in &listing.bindings {
            let _ = writeln!(
                out,
                "  {} = {} [{} | {}]",
                info.left, info.right, info.forward, info.reverse
            );
        }
    }
    out
}

pub fn run_to_transport(input: &Path, options: MapOptions) -> Result<()> {
    let registry = order_registry(options)?;
    let json = read_input(input)?;
    let output = to_transport(&registry, &json)?;
    info!(input = %input.display(), "mapped order to transport shape");
    println!("{output}");
    Ok(())
}

pub fn run_to_storage(input: &Path, merge_into: Option<&Path>, options: MapOptions) -> Result<()> {
    let registry = order_registry(options)?;
    let json = read_input(input)?;
    let existing = merge_into.map(read_input).transpose()?;
    let output = to_storage(&registry, &json, existing.as_deref())?;
    info!(
        input = %input.display(),
        merged = merge_into.is_some(),
        "mapped order to storage shape"
    );
    println!("{output}");
    Ok(())
}

pub fn run_bindings(options: MapOptions, json: bool) -> Result<()> {
    let registry = order_registry(options)?;
    let listings = listings(&registry)?;
    if json {
        let output = serde_json::to_string_pretty(&listings).context("serialize bindings")?;
        println!("{output}");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Pair"),
        header_cell("Kind"),
        header_cell("Left"),
        header_cell("Right"),
        header_cell("Forward"),
        header_cell("Reverse"),
    ]);
    apply_table_style(&mut table);
    for listing in &listings {
        for info in &listing.bindings {
            let kind = match info.kind {
                BindingKind::Field => "field",
                BindingKind::Collection => "collection",
            };
            table.add_row(vec![
                Cell::new(&listing.pair),
                Cell::new(kind),
                Cell::new(info.left),
                Cell::new(info.right),
                strategy_cell(&info.forward),
                strategy_cell(&info.reverse),
            ]);
        }
    }
    println!("{table}");
    Ok(())
}

/// Reads `path`, or stdin when `path` is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        debug!("reading document from stdin");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("read stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn strategy_cell(strategy: &str) -> Cell {
    match strategy {
        "copy" => Cell::new(strategy).fg(Color::DarkGrey),
        "map" => Cell::new(strategy).fg(Color::Green),
        _ => Cell::new(strategy),
    }
}
