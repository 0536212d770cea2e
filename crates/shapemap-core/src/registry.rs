//! The type-pair registry.
//!
//! # Thread Safety
//!
//! The table sits behind one mutex held only for lookups and updates; mapping
//! runs outside it. A [`Registry`] is a cheap handle and can be cloned and
//! shared across threads.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use tracing::debug;

use crate::classify::{Member, lookup_identity};
use crate::error::{MapError, Result};
use crate::mapper::{Direction, ErasedMapper, InverseMapper, Mapper, ResolvedMapper, TypeMapper};
use crate::options::MapOptions;
use crate::record::Record;

type PairKey = (TypeId, TypeId);

struct Entry {
    mapper: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn ErasedMapper>,
}

pub(crate) struct Shared {
    table: Mutex<HashMap<PairKey, Entry>>,
    options: MapOptions,
}

/// Table of mappers keyed by type pair.
///
/// At most one mapper exists per unordered pair: registering `(A, B)` makes
/// `(B, A)` resolvable as an inverse view and rejects its registration.
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with default options.
    pub fn new() -> Self {
        Self::with_options(MapOptions::default())
    }

    pub fn with_options(options: MapOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: Mutex::new(HashMap::new()),
                options,
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn options(&self) -> MapOptions {
        self.shared.options
    }

    fn table(&self) -> MutexGuard<'_, HashMap<PairKey, Entry>> {
        self.shared
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new, empty mapper for `(A, B)`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::AlreadyRegistered`] when `(A, B)` or `(B, A)` is
    /// already registered.
    pub fn create_mapper<A: Record, B: Record>(&self) -> Result<Arc<TypeMapper<A, B>>> {
        let forward = (TypeId::of::<A>(), TypeId::of::<B>());
        let reverse = (forward.1, forward.0);

        let mut table = self.table();
        if table.contains_key(&forward) || table.contains_key(&reverse) {
            return Err(MapError::AlreadyRegistered {
                first: type_name::<A>(),
                second: type_name::<B>(),
            });
        }
        let context = MapContext::new(self.shared.options, Arc::downgrade(&self.shared));
        let mapper = Arc::new(TypeMapper::<A, B>::new(context));
        table.insert(
            forward,
            Entry {
                mapper: Arc::clone(&mapper) as Arc<dyn Any + Send + Sync>,
                erased: Arc::clone(&mapper) as Arc<dyn ErasedMapper>,
            },
        );
        drop(table);

        debug!(
            left = type_name::<A>(),
            right = type_name::<B>(),
            "registered mapper"
        );
        Ok(mapper)
    }

    /// Looks up the mapper for `(A, B)`, or an inverse view of `(B, A)`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotRegistered`] when neither order is registered.
    pub fn get_mapper<A: Record, B: Record>(&self) -> Result<ResolvedMapper<A, B>> {
        let forward = (TypeId::of::<A>(), TypeId::of::<B>());
        let reverse = (forward.1, forward.0);

        let table = self.table();
        if let Some(entry) = table.get(&forward)
            && let Ok(mapper) = Arc::clone(&entry.mapper).downcast::<TypeMapper<A, B>>()
        {
            return Ok(ResolvedMapper::Forward(mapper));
        }
        if let Some(entry) = table.get(&reverse)
            && let Ok(mapper) = Arc::clone(&entry.mapper).downcast::<TypeMapper<B, A>>()
        {
            return Ok(ResolvedMapper::Inverse(InverseMapper::new(mapper)));
        }
        Err(MapError::NotRegistered {
            from: type_name::<A>(),
            to: type_name::<B>(),
        })
    }

    /// Drops every registration.
    ///
    /// Handles obtained earlier keep working on their own, but nested
    /// records can no longer be resolved through this registry until their
    /// pairs are registered again.
    pub fn reset(&self) {
        let mut table = self.table();
        let count = table.len();
        table.clear();
        drop(table);
        debug!(count, "reset mapper registry");
    }

    /// Number of registered pairs.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Maps `source` into a new `B`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotRegistered`] when no mapper exists for the pair
    /// in either order, or the first error raised by a binding.
    pub fn map<A: Record, B: Record>(&self, source: &A) -> Result<B> {
        self.get_mapper::<A, B>()?.forward(source)
    }

    /// Maps `source` into the existing `destination`.
    ///
    /// # Errors
    ///
    /// See [`map`](Self::map).
    pub fn map_into<A: Record, B: Record>(&self, source: &A, destination: &mut B) -> Result<()> {
        self.get_mapper::<A, B>()?.apply_forward(source, destination)
    }

    /// Maps an optional `source` into the caller's `destination` slot.
    ///
    /// The pair is resolved first, so an unregistered pair fails even for a
    /// `None` source.
    ///
    /// # Errors
    ///
    /// See [`map`](Self::map).
    pub fn map_option<A: Record, B: Record>(
        &self,
        source: Option<&A>,
        destination: &mut Option<B>,
    ) -> Result<()> {
        self.get_mapper::<A, B>()?.map_forward(source, destination)
    }

    /// Maps a nested member through the mapper registered for its records.
    ///
    /// An absent source resets the destination member.
    pub(crate) fn map_member<S: Member, D: Member>(
        &self,
        source: &S,
        destination: &mut D,
    ) -> Result<()> {
        let (from, from_name) = lookup_identity::<S>();
        let (to, to_name) = lookup_identity::<D>();
        let not_registered = MapError::NotRegistered {
            from: from_name,
            to: to_name,
        };

        let resolved = {
            let table = self.table();
            table
                .get(&(from, to))
                .map(|entry| (Arc::clone(&entry.erased), Direction::Forward))
                .or_else(|| {
                    table
                        .get(&(to, from))
                        .map(|entry| (Arc::clone(&entry.erased), Direction::Reverse))
                })
        };
        let Some((mapper, direction)) = resolved else {
            return Err(not_registered);
        };

        let Some(record) = source.record() else {
            destination.reset();
            return Ok(());
        };
        let Some(target) = destination.record_mut() else {
            return Err(not_registered);
        };
        mapper.apply_erased(direction, record, target)
    }
}

/// What a running binding sees of the registry that created its mapper.
///
/// Options are fixed when the mapper is created. The registry itself is held
/// weakly and only reached to map nested records, so flat pairs keep working
/// after every [`Registry`] handle is gone.
#[derive(Clone)]
pub struct MapContext {
    options: MapOptions,
    registry: Weak<Shared>,
}

impl MapContext {
    pub(crate) fn new(options: MapOptions, registry: Weak<Shared>) -> Self {
        Self { options, registry }
    }

    #[must_use]
    pub fn options(&self) -> MapOptions {
        self.options
    }

    /// Maps a nested member through the owning registry.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::RegistryDropped`] when the registry no longer
    /// exists, otherwise see [`Registry::map_member`].
    pub(crate) fn map_member<S: Member, D: Member>(
        &self,
        source: &S,
        destination: &mut D,
    ) -> Result<()> {
        let Some(shared) = self.registry.upgrade() else {
            return Err(MapError::RegistryDropped {
                from: lookup_identity::<S>().1,
                to: lookup_identity::<D>().1,
            });
        };
        Registry::from_shared(shared).map_member(source, destination)
    }
}

impl fmt::Debug for MapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapContext")
            .field("options", &self.options)
            .field("registry_alive", &(self.registry.strong_count() > 0))
            .finish()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("mappers", &self.len())
            .field("options", &self.shared.options)
            .finish()
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// Returns the process-wide registry, created on first access with
    /// default options.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }
}

/// Registers `(A, B)` in the global registry.
///
/// # Errors
///
/// See [`Registry::create_mapper`].
pub fn create_mapper<A: Record, B: Record>() -> Result<Arc<TypeMapper<A, B>>> {
    Registry::global().create_mapper()
}

/// Looks up `(A, B)` in the global registry.
///
/// # Errors
///
/// See [`Registry::get_mapper`].
pub fn get_mapper<A: Record, B: Record>() -> Result<ResolvedMapper<A, B>> {
    Registry::global().get_mapper()
}

/// Maps through the global registry.
///
/// # Errors
///
/// See [`Registry::map`].
pub fn map<A: Record, B: Record>(source: &A) -> Result<B> {
    Registry::global().map(source)
}

/// Maps into an existing instance through the global registry.
///
/// # Errors
///
/// See [`Registry::map_into`].
pub fn map_into<A: Record, B: Record>(source: &A, destination: &mut B) -> Result<()> {
    Registry::global().map_into(source, destination)
}
