//! Field and collection bindings.
//!
//! A binding holds one declared correspondence between a member of `A` and a
//! member of `B`. Each direction is compiled on first use into a closure that
//! captures the selected [`Strategy`]; the closure is then reused for the
//! lifetime of the binding.

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{Member, SimpleKind};
use crate::coerce::{self, Strategy, select_strategy};
use crate::collection::{Collection, CollectionField, Equivalence, reconcile};
use crate::error::{MapError, Result};
use crate::field::FieldRef;
use crate::options::AbsentCollection;
use crate::record::Record;
use crate::registry::MapContext;

/// Element type of a collection field.
pub type Element<F> = <<F as CollectionField>::Collection as Collection>::Item;

type Compiled<S, D> = Box<dyn Fn(&MapContext, &S, &mut D) -> Result<()> + Send + Sync>;

/// One bidirectional correspondence between a member of `A` and one of `B`.
pub trait Binding<A, B>: Send + Sync {
    /// Moves the bound value from `source` into `destination`.
    fn map_forward(&self, context: &MapContext, source: &A, destination: &mut B) -> Result<()>;

    fn map_reverse(&self, context: &MapContext, source: &B, destination: &mut A) -> Result<()>;

    fn describe(&self) -> BindingInfo;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Field,
    Collection,
}

/// Summary of a binding for listings and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
    pub kind: BindingKind,
    pub left: &'static str,
    pub right: &'static str,
    pub forward: String,
    pub reverse: String,
}

/// Binds field `F` of `A` to field `G` of `B`.
pub struct FieldBinding<A, B, F, G> {
    left: FieldRef<A, F>,
    right: FieldRef<B, G>,
    forward: OnceLock<Compiled<A, B>>,
    reverse: OnceLock<Compiled<B, A>>,
}

impl<A, B, F, G> FieldBinding<A, B, F, G>
where
    A: Record,
    B: Record,
    F: Member,
    G: Member,
{
    #[must_use]
    pub fn new(left: FieldRef<A, F>, right: FieldRef<B, G>) -> Self {
        Self {
            left,
            right,
            forward: OnceLock::new(),
            reverse: OnceLock::new(),
        }
    }
}

impl<A, B, F, G> Binding<A, B> for FieldBinding<A, B, F, G>
where
    A: Record,
    B: Record,
    F: Member,
    G: Member,
{
    fn map_forward(&self, context: &MapContext, source: &A, destination: &mut B) -> Result<()> {
        let compiled = self
            .forward
            .get_or_init(|| compile_field(self.left, self.right));
        compiled(context, source, destination)
    }

    fn map_reverse(&self, context: &MapContext, source: &B, destination: &mut A) -> Result<()> {
        let compiled = self
            .reverse
            .get_or_init(|| compile_field(self.right, self.left));
        compiled(context, source, destination)
    }

    fn describe(&self) -> BindingInfo {
        BindingInfo {
            kind: BindingKind::Field,
            left: self.left.name(),
            right: self.right.name(),
            forward: select_strategy::<F, G>().to_string(),
            reverse: select_strategy::<G, F>().to_string(),
        }
    }
}

impl<A, B, F, G> fmt::Debug for FieldBinding<A, B, F, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("forward_compiled", &self.forward.get().is_some())
            .field("reverse_compiled", &self.reverse.get().is_some())
            .finish()
    }
}

fn log_strategy<S, D>(strategy: Strategy, from: &'static str, to: &'static str) {
    debug!(
        source = type_name::<S>(),
        destination = type_name::<D>(),
        from,
        to,
        %strategy,
        "compiled binding"
    );
    if let Strategy::Convert { from: kind, to: target } = strategy
        && !kind.converts_to(target)
    {
        warn!(
            from,
            to,
            "{kind} has no conversion to {target}; mapping this binding will fail"
        );
    }
}

/// A binding between kinds with no native conversion fails on every call,
/// whatever the values involved.
fn unsupported<S: 'static, D: 'static>(from: SimpleKind, to: SimpleKind) -> Compiled<S, D> {
    Box::new(move |_: &MapContext, _: &S, _: &mut D| {
        Err(MapError::UnsupportedConversion {
            from,
            to,
            reason: "no native conversion between these kinds",
        })
    })
}

fn compile_field<S, D, F, G>(from: FieldRef<S, F>, to: FieldRef<D, G>) -> Compiled<S, D>
where
    S: Record,
    D: Record,
    F: Member,
    G: Member,
{
    let strategy = select_strategy::<F, G>();
    log_strategy::<S, D>(strategy, from.name(), to.name());
    match strategy {
        Strategy::Copy => Box::new(move |_: &MapContext, source: &S, destination: &mut D| {
            *to.get_mut(destination) = coerce::transfer(from.get(source))?;
            Ok(())
        }),
        Strategy::Convert { from: kind, to: target } if !kind.converts_to(target) => {
            unsupported(kind, target)
        }
        Strategy::Convert { .. } => {
            Box::new(move |context: &MapContext, source: &S, destination: &mut D| {
                let policy = context.options().null_policy;
                *to.get_mut(destination) = coerce::convert_value(from.get(source), policy)?;
                Ok(())
            })
        }
        Strategy::Recurse => Box::new(move |context: &MapContext, source: &S, destination: &mut D| {
            context.map_member(from.get(source), to.get_mut(destination))
        }),
    }
}

/// One side of a collection binding.
///
/// When this side is the destination, `factory` creates the collection for
/// an absent field and `comparer` decides which existing record elements
/// survive a merge. Without a comparer, elements are compared by identity.
pub struct CollectionSide<R, F: CollectionField> {
    field: FieldRef<R, F>,
    factory: Arc<dyn Fn() -> F::Collection + Send + Sync>,
    comparer: Option<Equivalence<Element<F>>>,
}

impl<R, F: CollectionField> Clone for CollectionSide<R, F> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            factory: Arc::clone(&self.factory),
            comparer: self.comparer.clone(),
        }
    }
}

impl<R, F: CollectionField> CollectionSide<R, F> {
    /// A side whose factory builds the collection's default value.
    #[must_use]
    pub fn new(field: FieldRef<R, F>) -> Self
    where
        F::Collection: Default,
    {
        Self {
            field,
            factory: Arc::new(<F::Collection as Default>::default),
            comparer: None,
        }
    }

    #[must_use]
    pub fn with_factory<C>(mut self, factory: C) -> Self
    where
        C: Fn() -> F::Collection + Send + Sync + 'static,
    {
        self.factory = Arc::new(factory);
        self
    }

    #[must_use]
    pub fn with_comparer(mut self, comparer: Equivalence<Element<F>>) -> Self {
        self.comparer = Some(comparer);
        self
    }

    #[must_use]
    pub fn field(&self) -> FieldRef<R, F> {
        self.field
    }
}

/// Conversion into a [`CollectionSide`], so a bare field reference can stand
/// for a side with the default factory and no comparer.
pub trait IntoCollectionSide<R> {
    type Field: CollectionField;

    fn into_side(self) -> CollectionSide<R, Self::Field>;
}

impl<R, F: CollectionField> IntoCollectionSide<R> for CollectionSide<R, F> {
    type Field = F;

    fn into_side(self) -> CollectionSide<R, F> {
        self
    }
}

impl<R, F> IntoCollectionSide<R> for FieldRef<R, F>
where
    F: CollectionField,
    F::Collection: Default,
{
    type Field = F;

    fn into_side(self) -> CollectionSide<R, F> {
        CollectionSide::new(self)
    }
}

/// Binds collection field `F` of `A` to collection field `G` of `B`.
pub struct CollectionBinding<A, B, F: CollectionField, G: CollectionField> {
    left: CollectionSide<A, F>,
    right: CollectionSide<B, G>,
    forward: OnceLock<Compiled<A, B>>,
    reverse: OnceLock<Compiled<B, A>>,
}

impl<A, B, F, G> CollectionBinding<A, B, F, G>
where
    A: Record,
    B: Record,
    F: CollectionField,
    G: CollectionField,
{
    #[must_use]
    pub fn new(left: CollectionSide<A, F>, right: CollectionSide<B, G>) -> Self {
        Self {
            left,
            right,
            forward: OnceLock::new(),
            reverse: OnceLock::new(),
        }
    }
}

impl<A, B, F, G> Binding<A, B> for CollectionBinding<A, B, F, G>
where
    A: Record,
    B: Record,
    F: CollectionField,
    G: CollectionField,
{
    fn map_forward(&self, context: &MapContext, source: &A, destination: &mut B) -> Result<()> {
        let compiled = self
            .forward
            .get_or_init(|| compile_collection(&self.left, &self.right));
        compiled(context, source, destination)
    }

    fn map_reverse(&self, context: &MapContext, source: &B, destination: &mut A) -> Result<()> {
        let compiled = self
            .reverse
            .get_or_init(|| compile_collection(&self.right, &self.left));
        compiled(context, source, destination)
    }

    fn describe(&self) -> BindingInfo {
        BindingInfo {
            kind: BindingKind::Collection,
            left: self.left.field.name(),
            right: self.right.field.name(),
            forward: select_strategy::<Element<F>, Element<G>>().to_string(),
            reverse: select_strategy::<Element<G>, Element<F>>().to_string(),
        }
    }
}

impl<A, B, F: CollectionField, G: CollectionField> fmt::Debug for CollectionBinding<A, B, F, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionBinding")
            .field("left", &self.left.field)
            .field("right", &self.right.field)
            .field("forward_compiled", &self.forward.get().is_some())
            .field("reverse_compiled", &self.reverse.get().is_some())
            .finish()
    }
}

fn compile_collection<S, D, F, G>(
    from: &CollectionSide<S, F>,
    to: &CollectionSide<D, G>,
) -> Compiled<S, D>
where
    S: Record,
    D: Record,
    F: CollectionField,
    G: CollectionField,
{
    let strategy = select_strategy::<Element<F>, Element<G>>();
    log_strategy::<S, D>(strategy, from.field.name(), to.field.name());
    if let Strategy::Convert { from: kind, to: target } = strategy
        && !kind.converts_to(target)
    {
        return unsupported(kind, target);
    }

    let source_field = from.field;
    let target_field = to.field;
    let factory = Arc::clone(&to.factory);
    let equivalence = to.comparer.clone().unwrap_or_else(Equivalence::identity);

    Box::new(move |context: &MapContext, source: &S, destination: &mut D| {
        let transformed = match source_field.get(source).collection() {
            Some(items) => items
                .items()
                .map(|item| transform_element(context, strategy, item))
                .collect::<Result<Vec<Element<G>>>>()?,
            None => match context.options().absent_source_collection {
                AbsentCollection::Skip => return Ok(()),
                AbsentCollection::TreatAsEmpty => Vec::new(),
            },
        };

        let slot = target_field.get_mut(destination);
        if slot.collection().is_none() {
            slot.install(factory());
        }
        if let Some(target) = slot.collection_mut() {
            reconcile(target, transformed, &equivalence);
        }
        Ok(())
    })
}

fn transform_element<S: Member, D: Member>(
    context: &MapContext,
    strategy: Strategy,
    item: &S,
) -> Result<D> {
    match strategy {
        Strategy::Copy => coerce::transfer(item),
        Strategy::Convert { .. } => coerce::convert_value(item, context.options().null_policy),
        Strategy::Recurse => {
            let mut element = D::default();
            context.map_member(item, &mut element)?;
            Ok(element)
        }
    }
}
