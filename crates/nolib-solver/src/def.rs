//! Definition ids and the definition store.
//!
//! A definition is a named, possibly generic type: a type alias or an
//! interface. The store hands out stable [`DefId`]s and owns the metadata
//! needed to apply a definition to type arguments — its type parameters
//! (with constraints and defaults) and its body.
//!
//! `TypeData::Lazy(def_id)` references a definition without expanding it.
//! Alias references expand during evaluation; interface references stay
//! opaque until a rule needs the underlying shape, which keeps recursive
//! interfaces representable.

use crate::types::{TypeId, TypeParamInfo};
use dashmap::DashMap;
use indexmap::IndexMap;
use nolib_common::interner::Atom;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::trace;

/// Identifier for a registered definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel for "no definition". Never handed out by the store.
    pub const INVALID: DefId = DefId(0);
    /// First id the store hands out.
    pub const FIRST_VALID: DefId = DefId(1);

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

/// What kind of declaration a definition came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    /// `type Name<...> = Body;` — transparent, expands during evaluation.
    TypeAlias,
    /// `interface Name { ... }` — nominal for display, structural for
    /// relations; expanded on demand.
    Interface,
}

/// Metadata for one definition.
#[derive(Clone, Debug)]
pub struct DefinitionInfo {
    pub kind: DefKind,
    pub name: Atom,
    pub type_params: Vec<TypeParamInfo>,
    pub body: TypeId,
}

impl DefinitionInfo {
    pub fn type_alias(name: Atom, type_params: Vec<TypeParamInfo>, body: TypeId) -> Self {
        DefinitionInfo {
            kind: DefKind::TypeAlias,
            name,
            type_params,
            body,
        }
    }

    /// `body` is the interface's structural shape (an object type).
    pub fn interface(name: Atom, type_params: Vec<TypeParamInfo>, body: TypeId) -> Self {
        DefinitionInfo {
            kind: DefKind::Interface,
            name,
            type_params,
            body,
        }
    }
}

/// Thread-safe registry of definitions.
pub struct DefinitionStore {
    definitions: DashMap<DefId, DefinitionInfo, FxBuildHasher>,
    /// Name index in registration order.
    names: RwLock<IndexMap<Atom, DefId, FxBuildHasher>>,
    next_id: AtomicU32,
}

impl DefinitionStore {
    pub fn new() -> Self {
        DefinitionStore {
            definitions: DashMap::with_hasher(FxBuildHasher),
            names: RwLock::new(IndexMap::with_hasher(FxBuildHasher)),
            next_id: AtomicU32::new(DefId::FIRST_VALID.0),
        }
    }

    /// Register a definition and return its id. A later registration under
    /// the same name shadows the earlier one in the name index.
    pub fn register(&self, info: DefinitionInfo) -> DefId {
        let id = DefId(self.next_id.fetch_add(1, Ordering::Relaxed));
        trace!(def_id = id.0, name = ?info.name, kind = ?info.kind, "register definition");
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(info.name, id);
        self.definitions.insert(id, info);
        id
    }

    pub fn get(&self, id: DefId) -> Option<DefinitionInfo> {
        self.definitions.get(&id).map(|entry| entry.clone())
    }

    pub fn get_kind(&self, id: DefId) -> Option<DefKind> {
        self.definitions.get(&id).map(|entry| entry.kind)
    }

    pub fn get_name(&self, id: DefId) -> Option<Atom> {
        self.definitions.get(&id).map(|entry| entry.name)
    }

    pub fn get_body(&self, id: DefId) -> Option<TypeId> {
        self.definitions.get(&id).map(|entry| entry.body)
    }

    pub fn get_type_params(&self, id: DefId) -> Option<Vec<TypeParamInfo>> {
        self.definitions.get(&id).map(|entry| entry.type_params.clone())
    }

    /// Replace a definition's body. Recursive definitions are tied this
    /// way: register with a placeholder body, then patch it with a type
    /// that references the freshly minted id.
    pub fn set_body(&self, id: DefId, body: TypeId) -> bool {
        match self.definitions.get_mut(&id) {
            Some(mut entry) => {
                entry.body = body;
                true
            }
            None => false,
        }
    }

    /// Look up a definition by name.
    pub fn lookup_name(&self, name: Atom) -> Option<DefId> {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name)
            .copied()
    }

    /// All definition ids in registration order.
    pub fn all_ids(&self) -> Vec<DefId> {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod def_tests;
