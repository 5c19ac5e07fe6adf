//! String interning.
//!
//! Property names, type-parameter names, and definition names are interned
//! once and referred to by [`Atom`] everywhere else. Name equality becomes an
//! integer comparison, and sorting object properties into canonical order is
//! a sort over `u32`s.

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Handle to an interned string. Equality, ordering, and hashing are all
/// integer operations on the index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(pub u32);

/// Thread-safe deduplicating string interner.
///
/// All methods take `&self` so a single interner can be shared across
/// threads. Concurrent interning of the same string is safe: the entry API
/// serializes insertion per shard, so the first writer wins and later calls
/// observe its atom.
pub struct Interner {
    map: DashMap<Arc<str>, Atom, FxBuildHasher>,
    strings: RwLock<Vec<Arc<str>>>,
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            map: DashMap::with_hasher(FxBuildHasher),
            strings: RwLock::new(Vec::new()),
        }
    }

    /// Intern a string, returning the existing atom if it was seen before.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(existing) = self.map.get(text) {
            return *existing;
        }
        let arc: Arc<str> = Arc::from(text);
        *self.map.entry(arc.clone()).or_insert_with(|| {
            let mut strings = self
                .strings
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let atom = Atom(strings.len() as u32);
            strings.push(arc);
            atom
        })
    }

    /// Resolve an atom back to its string. The atom must have been produced
    /// by this interner.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        let strings = self.read_strings();
        strings[atom.0 as usize].clone()
    }

    /// Number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.read_strings().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_strings(&self) -> RwLockReadGuard<'_, Vec<Arc<str>>> {
        self.strings.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
