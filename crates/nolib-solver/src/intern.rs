//! Type interning.
//!
//! [`TypeInterner`] owns every type in the system. Construction goes through
//! the canonicalizing constructors here, so equal normal forms always
//! receive the same [`TypeId`] and comparing evaluated types is an integer
//! comparison.
//!
//! Canonicalization performed at interning time:
//! - unions are flattened, deduplicated, absorbed (`any`/`unknown`/`error`
//!   dominate, `never` drops out, literals fold into their base primitive),
//!   and sorted
//! - object properties are sorted by name atom
//! - single-member unions collapse to the member, empty unions to `never`
//!
//! All methods take `&self`; the interner is shared freely across threads.

use crate::def::DefId;
use crate::types::{
    ApplicationId, ConditionalType, ConditionalTypeId, FunctionShape, FunctionShapeId,
    IndexSignature, IntrinsicKind, LiteralValue, MappedType, MappedTypeId, ObjectShape,
    ObjectShapeId, OrderedFloat, PropertyInfo, TupleElement, TupleListId, TypeApplication,
    TypeData, TypeId, TypeListId, TypeParamInfo,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use nolib_common::interner::{Atom, Interner};
use nolib_common::limits::{PROPERTY_MAP_THRESHOLD, TYPE_LIST_INLINE};
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

/// One interning table: a hash map from payload to id plus an id-indexed
/// store of the payloads.
struct Table<T: Eq + Hash + Clone> {
    ids: DashMap<T, u32, FxBuildHasher>,
    items: RwLock<Vec<T>>,
}

impl<T: Eq + Hash + Clone> Table<T> {
    fn new() -> Self {
        Table {
            ids: DashMap::with_hasher(FxBuildHasher),
            items: RwLock::new(Vec::new()),
        }
    }

    fn intern(&self, item: T) -> u32 {
        if let Some(existing) = self.ids.get(&item) {
            return *existing;
        }
        let payload = item.clone();
        match self.ids.entry(item) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
                let id = items.len() as u32;
                items.push(payload);
                entry.insert(id);
                id
            }
        }
    }

    fn get(&self, id: u32) -> T {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items[id as usize].clone()
    }

    fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Result of a cached property lookup on an object shape.
///
/// Shapes below [`PROPERTY_MAP_THRESHOLD`] properties are never promoted to
/// a lookup map; callers fall back to scanning the (sorted) property array.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyLookup {
    Found(usize),
    NotFound,
    Uncached,
}

/// The shared type store.
pub struct TypeInterner {
    strings: Interner,
    types: Table<TypeData>,
    type_lists: Table<Arc<[TypeId]>>,
    object_shapes: Table<Arc<ObjectShape>>,
    function_shapes: Table<Arc<FunctionShape>>,
    tuple_lists: Table<Arc<[TupleElement]>>,
    conditionals: Table<ConditionalType>,
    mapped_types: Table<MappedType>,
    applications: Table<Arc<TypeApplication>>,
    /// Name-to-index maps for wide object shapes, built on first lookup.
    property_maps: DashMap<ObjectShapeId, Arc<FxHashMap<Atom, usize>>, FxBuildHasher>,
}

impl TypeInterner {
    pub fn new() -> Self {
        let interner = TypeInterner {
            strings: Interner::new(),
            types: Table::new(),
            type_lists: Table::new(),
            object_shapes: Table::new(),
            function_shapes: Table::new(),
            tuple_lists: Table::new(),
            conditionals: Table::new(),
            mapped_types: Table::new(),
            applications: Table::new(),
            property_maps: DashMap::with_hasher(FxBuildHasher),
        };
        // Pre-intern the well-known types in the order of the TypeId
        // constants. This order is load-bearing: union members sort by id.
        let fixed = [
            TypeData::Error,
            TypeData::Intrinsic(IntrinsicKind::Any),
            TypeData::Intrinsic(IntrinsicKind::Unknown),
            TypeData::Intrinsic(IntrinsicKind::Never),
            TypeData::Intrinsic(IntrinsicKind::Void),
            TypeData::Intrinsic(IntrinsicKind::String),
            TypeData::Intrinsic(IntrinsicKind::Number),
            TypeData::Intrinsic(IntrinsicKind::Boolean),
            TypeData::Intrinsic(IntrinsicKind::Symbol),
            TypeData::Intrinsic(IntrinsicKind::Null),
            TypeData::Intrinsic(IntrinsicKind::Undefined),
            TypeData::Literal(LiteralValue::Boolean(true)),
            TypeData::Literal(LiteralValue::Boolean(false)),
        ];
        for (index, data) in fixed.into_iter().enumerate() {
            let id = interner.types.intern(data);
            debug_assert_eq!(id, index as u32);
        }
        debug_assert_eq!(TypeId::FIRST_DYNAMIC, fixed.len() as u32);
        interner
    }

    // =========================================================================
    // Strings
    // =========================================================================

    pub fn intern_string(&self, text: &str) -> Atom {
        self.strings.intern(text)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.strings.resolve(atom)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Payload of a type id. `None` only for ids that did not come from this
    /// interner.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if (id.0 as usize) < self.types.len() {
            Some(self.types.get(id.0))
        } else {
            None
        }
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        self.type_lists.get(id.0)
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        self.object_shapes.get(id.0)
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes.get(id.0)
    }

    pub fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]> {
        self.tuple_lists.get(id.0)
    }

    pub fn conditional_type(&self, id: ConditionalTypeId) -> ConditionalType {
        self.conditionals.get(id.0)
    }

    pub fn mapped_type(&self, id: MappedTypeId) -> MappedType {
        self.mapped_types.get(id.0)
    }

    pub fn type_application(&self, id: ApplicationId) -> Arc<TypeApplication> {
        self.applications.get(id.0)
    }

    /// Total number of distinct types interned so far.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // =========================================================================
    // Literals
    // =========================================================================

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.strings.intern(value);
        self.literal_string_atom(atom)
    }

    pub fn literal_string_atom(&self, atom: Atom) -> TypeId {
        TypeId(self.types.intern(TypeData::Literal(LiteralValue::String(atom))))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        TypeId(
            self.types
                .intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value)))),
        )
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        if value { TypeId::TRUE } else { TypeId::FALSE }
    }

    // =========================================================================
    // Unions
    // =========================================================================

    /// Intern a union in canonical form.
    ///
    /// Members are flattened and deduplicated; `never` members drop out;
    /// `error`, `any`, and `unknown` absorb the whole union (in that order
    /// of precedence); literals fold into a present base primitive; and
    /// `true | false` collapses to `boolean`. An empty result is `never`, a
    /// single member is returned unwrapped.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: SmallVec<[TypeId; TYPE_LIST_INLINE]> = SmallVec::new();
        let mut seen = FxHashSet::default();
        let mut has_any = false;
        let mut has_unknown = false;
        let mut has_error = false;
        for member in members {
            self.add_union_member(
                member,
                &mut flat,
                &mut seen,
                &mut has_any,
                &mut has_unknown,
                &mut has_error,
            );
        }
        if has_error {
            return TypeId::ERROR;
        }
        if has_any {
            return TypeId::ANY;
        }
        if has_unknown {
            return TypeId::UNKNOWN;
        }

        let has_string = flat.contains(&TypeId::STRING);
        let has_number = flat.contains(&TypeId::NUMBER);
        let has_boolean = flat.contains(&TypeId::BOOLEAN);
        if has_string || has_number || has_boolean {
            flat.retain(|&mut id| match self.lookup(id) {
                Some(TypeData::Literal(LiteralValue::String(_))) => !has_string,
                Some(TypeData::Literal(LiteralValue::Number(_))) => !has_number,
                Some(TypeData::Literal(LiteralValue::Boolean(_))) => !has_boolean,
                _ => true,
            });
        }
        if flat.contains(&TypeId::TRUE) && flat.contains(&TypeId::FALSE) {
            flat.retain(|&mut id| id != TypeId::TRUE && id != TypeId::FALSE);
            flat.push(TypeId::BOOLEAN);
        }

        flat.sort_unstable();
        flat.dedup();
        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list: Arc<[TypeId]> = Arc::from(flat.as_slice());
                let list_id = TypeListId(self.type_lists.intern(list));
                TypeId(self.types.intern(TypeData::Union(list_id)))
            }
        }
    }

    pub fn union2(&self, a: TypeId, b: TypeId) -> TypeId {
        self.union(vec![a, b])
    }

    pub fn union3(&self, a: TypeId, b: TypeId, c: TypeId) -> TypeId {
        self.union(vec![a, b, c])
    }

    fn add_union_member(
        &self,
        id: TypeId,
        flat: &mut SmallVec<[TypeId; TYPE_LIST_INLINE]>,
        seen: &mut FxHashSet<TypeId>,
        has_any: &mut bool,
        has_unknown: &mut bool,
        has_error: &mut bool,
    ) {
        match id {
            TypeId::NEVER => return,
            TypeId::ANY => {
                *has_any = true;
                return;
            }
            TypeId::UNKNOWN => {
                *has_unknown = true;
                return;
            }
            TypeId::ERROR => {
                *has_error = true;
                return;
            }
            _ => {}
        }
        if let Some(TypeData::Union(list_id)) = self.lookup(id) {
            for &member in self.type_list(list_id).iter() {
                self.add_union_member(member, flat, seen, has_any, has_unknown, has_error);
            }
            return;
        }
        if seen.insert(id) {
            flat.push(id);
        }
    }

    // =========================================================================
    // Objects
    // =========================================================================

    /// Intern an object type. Properties are sorted by name atom; duplicate
    /// names keep the first occurrence.
    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        let shape_id = self.object_shape_id(properties, None, None);
        TypeId(self.types.intern(TypeData::Object(shape_id)))
    }

    /// Intern an object type that carries index signatures.
    pub fn object_with_index(
        &self,
        properties: Vec<PropertyInfo>,
        string_index: Option<IndexSignature>,
        number_index: Option<IndexSignature>,
    ) -> TypeId {
        let shape_id = self.object_shape_id(properties, string_index, number_index);
        TypeId(self.types.intern(TypeData::ObjectWithIndex(shape_id)))
    }

    fn object_shape_id(
        &self,
        mut properties: Vec<PropertyInfo>,
        string_index: Option<IndexSignature>,
        number_index: Option<IndexSignature>,
    ) -> ObjectShapeId {
        properties.sort_by_key(|p| p.name);
        properties.dedup_by_key(|p| p.name);
        let flags = ObjectShape::flags_for(&properties);
        let shape = ObjectShape {
            flags,
            properties,
            string_index,
            number_index,
        };
        ObjectShapeId(self.object_shapes.intern(Arc::new(shape)))
    }

    /// Look up a property by name on a shape, using the cached name map for
    /// wide shapes and a linear scan otherwise.
    pub fn find_property(&self, shape_id: ObjectShapeId, name: Atom) -> Option<PropertyInfo> {
        match self.object_property_index(shape_id, name) {
            PropertyLookup::Found(index) => Some(self.object_shape(shape_id).properties[index]),
            PropertyLookup::NotFound => None,
            PropertyLookup::Uncached => self
                .object_shape(shape_id)
                .properties
                .iter()
                .find(|p| p.name == name)
                .copied(),
        }
    }

    /// Cached property-index lookup. Shapes with fewer than
    /// [`PROPERTY_MAP_THRESHOLD`] properties stay [`PropertyLookup::Uncached`].
    pub fn object_property_index(&self, shape_id: ObjectShapeId, name: Atom) -> PropertyLookup {
        if let Some(map) = self.property_maps.get(&shape_id) {
            return match map.get(&name) {
                Some(&index) => PropertyLookup::Found(index),
                None => PropertyLookup::NotFound,
            };
        }
        let shape = self.object_shape(shape_id);
        if shape.properties.len() < PROPERTY_MAP_THRESHOLD {
            return PropertyLookup::Uncached;
        }
        let map: FxHashMap<Atom, usize> = shape
            .properties
            .iter()
            .enumerate()
            .map(|(index, p)| (p.name, index))
            .collect();
        let result = match map.get(&name) {
            Some(&index) => PropertyLookup::Found(index),
            None => PropertyLookup::NotFound,
        };
        self.property_maps.insert(shape_id, Arc::new(map));
        result
    }

    // =========================================================================
    // Functions and tuples
    // =========================================================================

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let shape_id = FunctionShapeId(self.function_shapes.intern(Arc::new(shape)));
        TypeId(self.types.intern(TypeData::Function(shape_id)))
    }

    pub fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        let list: Arc<[TupleElement]> = Arc::from(elements.as_slice());
        let list_id = TupleListId(self.tuple_lists.intern(list));
        TypeId(self.types.intern(TypeData::Tuple(list_id)))
    }

    // =========================================================================
    // Operator forms
    // =========================================================================

    pub fn keyof(&self, operand: TypeId) -> TypeId {
        TypeId(self.types.intern(TypeData::KeyOf(operand)))
    }

    pub fn index_access(&self, object: TypeId, index: TypeId) -> TypeId {
        TypeId(self.types.intern(TypeData::IndexAccess(object, index)))
    }

    pub fn type_parameter(&self, info: TypeParamInfo) -> TypeId {
        TypeId(self.types.intern(TypeData::TypeParameter(info)))
    }

    pub fn infer(&self, info: TypeParamInfo) -> TypeId {
        TypeId(self.types.intern(TypeData::Infer(info)))
    }

    pub fn conditional(&self, conditional: ConditionalType) -> TypeId {
        let id = ConditionalTypeId(self.conditionals.intern(conditional));
        TypeId(self.types.intern(TypeData::Conditional(id)))
    }

    pub fn mapped(&self, mapped: MappedType) -> TypeId {
        let id = MappedTypeId(self.mapped_types.intern(mapped));
        TypeId(self.types.intern(TypeData::Mapped(id)))
    }

    pub fn lazy(&self, def: DefId) -> TypeId {
        TypeId(self.types.intern(TypeData::Lazy(def)))
    }

    pub fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        let app = TypeApplication { base, args };
        let id = ApplicationId(self.applications.intern(Arc::new(app)));
        TypeId(self.types.intern(TypeData::Application(id)))
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod intern_tests;
