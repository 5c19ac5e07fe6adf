//! Mapped type evaluation: `{ [P in K as N]: T }` with `?`/`readonly`
//! modifiers.
//!
//! The evaluated constraint supplies the key set. String and number literal
//! keys become declared properties, `string` and `number` keys become index
//! signatures, and `symbol` keys contribute no members since the type
//! universe has no symbol-keyed properties. When the template is `S[P]` over
//! the iteration variable, the mapping is homomorphic: each property copies
//! the declared type and modifiers from the resolved source shape, so
//! optional properties keep their declared types instead of widening to
//! `| undefined` through indexed access.

use crate::evaluate::TypeEvaluator;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::types::{
    IndexSignature, IntrinsicKind, LiteralValue, MappedModifier, MappedType, ObjectFlags,
    ObjectShape, ObjectShapeId, PropertyInfo, TypeData, TypeId, number_key_string,
};
use nolib_common::interner::Atom;
use nolib_common::limits::MAX_MAPPED_KEYS;
use std::sync::Arc;

/// Outcome for a single literal key.
enum MappedKey {
    Property(PropertyInfo),
    /// Remapped to `never` by the `as` clause and dropped.
    Skipped,
    Poisoned,
}

/// The source shape of a homomorphic mapping: the evaluated `S` of an
/// `S[P]` template, resolved to its object shape.
type SourceShape = (TypeId, ObjectShapeId, Arc<ObjectShape>);

impl TypeEvaluator<'_> {
    /// Evaluate a mapped type over a concrete key set.
    pub(crate) fn evaluate_mapped(&mut self, original: TypeId, mapped: &MappedType) -> TypeId {
        let constraint = self.evaluate(mapped.constraint);
        if constraint == TypeId::ERROR {
            return TypeId::ERROR;
        }
        // An unresolved key set keeps the whole mapped type deferred until
        // instantiation supplies concrete keys.
        if self.contains_type_parameters(constraint) {
            if constraint == mapped.constraint {
                return original;
            }
            return self.interner.mapped(MappedType {
                constraint,
                ..*mapped
            });
        }

        let source = self.homomorphic_source(mapped);

        // `{ [P in keyof T]: T[P] }` over the full key set with no effective
        // modifier change reproduces the source exactly.
        if mapped.name_type.is_none()
            && let Some((source_ty, _, shape)) = source.as_ref()
        {
            let keyof_source = self.interner.keyof(*source_ty);
            if self.evaluate(keyof_source) == constraint
                && let Some(identity) = identity_result(mapped, *source_ty, shape.as_ref())
            {
                return identity;
            }
        }

        let members: Vec<TypeId> = match self.interner.lookup(constraint) {
            Some(TypeData::Union(list_id)) => self.interner.type_list(list_id).to_vec(),
            _ => vec![constraint],
        };

        let mut properties: Vec<PropertyInfo> = Vec::new();
        let mut string_keys = false;
        let mut number_keys = false;
        for &member in &members {
            match self.interner.lookup(member) {
                Some(TypeData::Literal(LiteralValue::String(atom))) => {
                    match self.mapped_property(mapped, source.as_ref(), atom, member) {
                        MappedKey::Property(property) => properties.push(property),
                        MappedKey::Skipped => {}
                        MappedKey::Poisoned => return TypeId::ERROR,
                    }
                }
                Some(TypeData::Literal(LiteralValue::Number(value))) => {
                    let atom = self.interner.intern_string(&number_key_string(value.0));
                    match self.mapped_property(mapped, source.as_ref(), atom, member) {
                        MappedKey::Property(property) => properties.push(property),
                        MappedKey::Skipped => {}
                        MappedKey::Poisoned => return TypeId::ERROR,
                    }
                }
                Some(TypeData::Intrinsic(IntrinsicKind::String | IntrinsicKind::Number)) => {
                    let remapped = self.remap_key(mapped, member);
                    match self.interner.lookup(remapped) {
                        Some(TypeData::Intrinsic(IntrinsicKind::Never)) => {}
                        Some(TypeData::Intrinsic(IntrinsicKind::String)) => string_keys = true,
                        Some(TypeData::Intrinsic(IntrinsicKind::Number)) => number_keys = true,
                        _ => return TypeId::ERROR,
                    }
                }
                // `any` admits every key, like `keyof any`.
                Some(TypeData::Intrinsic(IntrinsicKind::Any)) => {
                    string_keys = true;
                    number_keys = true;
                }
                // Symbol keys have no representable members.
                Some(TypeData::Intrinsic(IntrinsicKind::Symbol)) => {}
                Some(TypeData::Intrinsic(IntrinsicKind::Never)) => {}
                _ => return TypeId::ERROR,
            }
            if properties.len() > MAX_MAPPED_KEYS {
                return TypeId::ERROR;
            }
        }

        if !string_keys && !number_keys {
            return self.interner.object(properties);
        }

        let declared_string = source.as_ref().and_then(|(_, _, shape)| shape.string_index);
        let declared_number = source.as_ref().and_then(|(_, _, shape)| shape.number_index);
        let string_index = if string_keys {
            match self.mapped_index_signature(mapped, declared_string, TypeId::STRING) {
                Some(signature) => Some(signature),
                None => return TypeId::ERROR,
            }
        } else {
            None
        };
        let number_index = if number_keys {
            match self.mapped_index_signature(mapped, declared_number, TypeId::NUMBER) {
                Some(signature) => Some(signature),
                None => return TypeId::ERROR,
            }
        } else {
            None
        };
        self.interner
            .object_with_index(properties, string_index, number_index)
    }

    /// When the template is `S[P]` with `P` the iteration variable, resolve
    /// the source `S` to an object shape.
    fn homomorphic_source(&mut self, mapped: &MappedType) -> Option<SourceShape> {
        let Some(TypeData::IndexAccess(object, index)) = self.interner.lookup(mapped.template)
        else {
            return None;
        };
        let Some(TypeData::TypeParameter(info)) = self.interner.lookup(index) else {
            return None;
        };
        if info.name != mapped.type_param.name {
            return None;
        }
        let source = self.evaluate(object);
        let (shape_id, shape) = self.object_shape_of(source)?;
        Some((source, shape_id, shape))
    }

    /// Build the property for one literal key.
    fn mapped_property(
        &mut self,
        mapped: &MappedType,
        source: Option<&SourceShape>,
        key_atom: Atom,
        key_type: TypeId,
    ) -> MappedKey {
        let name = match mapped.name_type {
            None => key_atom,
            Some(_) => {
                let remapped = self.remap_key(mapped, key_type);
                match self.interner.lookup(remapped) {
                    Some(TypeData::Literal(LiteralValue::String(atom))) => atom,
                    Some(TypeData::Literal(LiteralValue::Number(value))) => {
                        self.interner.intern_string(&number_key_string(value.0))
                    }
                    Some(TypeData::Intrinsic(IntrinsicKind::Never)) => return MappedKey::Skipped,
                    _ => return MappedKey::Poisoned,
                }
            }
        };

        // Homomorphic: copy the declared property type and modifiers from
        // the source instead of re-deriving them through `S[P]`, which
        // would widen an optional property with `| undefined`.
        if let Some((_, shape_id, _)) = source
            && let Some(property) = self.interner.find_property(*shape_id, key_atom)
        {
            let mut value = self.evaluate(property.type_id);
            // `-?` also strips `undefined` from a formerly optional
            // property, so Required round-trips Partial.
            if mapped.optional_modifier == Some(MappedModifier::Remove) && property.optional {
                value = self.strip_undefined(value);
            }
            if value == TypeId::ERROR {
                return MappedKey::Poisoned;
            }
            return MappedKey::Property(PropertyInfo {
                name,
                type_id: value,
                optional: apply_modifier(mapped.optional_modifier, property.optional),
                readonly: apply_modifier(mapped.readonly_modifier, property.readonly),
            });
        }

        let mut subst = TypeSubstitution::new();
        subst.insert(mapped.type_param.name, key_type);
        let instantiated = instantiate_type(self.interner, mapped.template, &subst);
        let value = self.evaluate(instantiated);
        if value == TypeId::ERROR {
            return MappedKey::Poisoned;
        }
        MappedKey::Property(PropertyInfo {
            name,
            type_id: value,
            optional: apply_modifier(mapped.optional_modifier, false),
            readonly: apply_modifier(mapped.readonly_modifier, false),
        })
    }

    /// Apply the `as` clause for one key. Without a clause the key maps to
    /// itself.
    fn remap_key(&mut self, mapped: &MappedType, key_type: TypeId) -> TypeId {
        let Some(name_type) = mapped.name_type else {
            return key_type;
        };
        let mut subst = TypeSubstitution::new();
        subst.insert(mapped.type_param.name, key_type);
        let instantiated = instantiate_type(self.interner, name_type, &subst);
        self.evaluate(instantiated)
    }

    /// Build an index signature for a `string` or `number` key. `declared`
    /// carries the source signature when the mapping is homomorphic.
    fn mapped_index_signature(
        &mut self,
        mapped: &MappedType,
        declared: Option<IndexSignature>,
        key_type: TypeId,
    ) -> Option<IndexSignature> {
        let (mut value, inherited_readonly) = match declared {
            Some(signature) => (self.evaluate(signature.value_type), signature.readonly),
            None => {
                let mut subst = TypeSubstitution::new();
                subst.insert(mapped.type_param.name, key_type);
                let instantiated = instantiate_type(self.interner, mapped.template, &subst);
                (self.evaluate(instantiated), false)
            }
        };
        // On an index signature the `?` modifier moves into the value type.
        match mapped.optional_modifier {
            Some(MappedModifier::Add) => value = self.interner.union2(value, TypeId::UNDEFINED),
            Some(MappedModifier::Remove) => value = self.strip_undefined(value),
            None => {}
        }
        if value == TypeId::ERROR {
            return None;
        }
        Some(IndexSignature {
            key_type,
            value_type: value,
            readonly: apply_modifier(mapped.readonly_modifier, inherited_readonly),
        })
    }

    fn strip_undefined(&self, ty: TypeId) -> TypeId {
        if ty == TypeId::UNDEFINED {
            return TypeId::NEVER;
        }
        match self.interner.lookup(ty) {
            Some(TypeData::Union(list_id)) => {
                let members = self.interner.type_list(list_id);
                let kept: Vec<TypeId> = members
                    .iter()
                    .copied()
                    .filter(|&member| member != TypeId::UNDEFINED)
                    .collect();
                self.interner.union(kept)
            }
            _ => ty,
        }
    }
}

fn apply_modifier(modifier: Option<MappedModifier>, inherited: bool) -> bool {
    match modifier {
        Some(MappedModifier::Add) => true,
        Some(MappedModifier::Remove) => false,
        None => inherited,
    }
}

/// Identity fast path: over the full key set with no remapping, a modifier
/// pair that cannot change any property reproduces the source type itself.
fn identity_result(mapped: &MappedType, source: TypeId, shape: &ObjectShape) -> Option<TypeId> {
    let has_index = shape.string_index.is_some() || shape.number_index.is_some();
    match (mapped.optional_modifier, mapped.readonly_modifier) {
        (None, None) => Some(source),
        // `?` rewrites index signature value types, so the flag shortcuts
        // below only hold for plain property shapes.
        _ if has_index => None,
        (Some(MappedModifier::Add), None) if shape.flags.contains(ObjectFlags::ALL_OPTIONAL) => {
            Some(source)
        }
        (Some(MappedModifier::Remove), None)
            if !shape.flags.contains(ObjectFlags::HAS_OPTIONAL) =>
        {
            Some(source)
        }
        (None, Some(MappedModifier::Add)) if shape.flags.contains(ObjectFlags::ALL_READONLY) => {
            Some(source)
        }
        (None, Some(MappedModifier::Remove))
            if !shape.flags.contains(ObjectFlags::HAS_READONLY) =>
        {
            Some(source)
        }
        _ => None,
    }
}
