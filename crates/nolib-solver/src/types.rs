//! Type representation.
//!
//! Every type is interned and referred to by [`TypeId`]. Normal forms are
//! canonical, so structural equality of evaluated types is `TypeId`
//! equality. The universe is deliberately small: it covers exactly what the
//! utility-type closure needs when the program is compiled with `noLib` —
//! intrinsics, literals, unions, structural objects with per-property
//! optionality and mutability, single-signature functions, labeled tuples,
//! and the operator forms they are built from (`keyof`, indexed access,
//! mapped types, conditional types with `infer`, generic applications).
//!
//! Variants that carry payloads too large for inline storage (shapes, member
//! lists) hold a secondary id into a side table owned by the interner.

use crate::def::DefId;
use bitflags::bitflags;
use nolib_common::interner::Atom;

/// Interned type identifier. Equality is identity of the canonical form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Poison type produced by failed evaluations. Related to every type in
    /// both directions so one failure does not cascade.
    pub const ERROR: TypeId = TypeId(0);
    pub const ANY: TypeId = TypeId(1);
    pub const UNKNOWN: TypeId = TypeId(2);
    pub const NEVER: TypeId = TypeId(3);
    pub const VOID: TypeId = TypeId(4);
    // Union members sort by id, so primitive ordering here decides union
    // display order: `string | number | symbol`, nullish members last.
    pub const STRING: TypeId = TypeId(5);
    pub const NUMBER: TypeId = TypeId(6);
    pub const BOOLEAN: TypeId = TypeId(7);
    pub const SYMBOL: TypeId = TypeId(8);
    pub const NULL: TypeId = TypeId(9);
    pub const UNDEFINED: TypeId = TypeId(10);
    /// The literal type `true`.
    pub const TRUE: TypeId = TypeId(11);
    /// The literal type `false`.
    pub const FALSE: TypeId = TypeId(12);

    /// First id handed out for dynamically interned types.
    pub(crate) const FIRST_DYNAMIC: u32 = 13;
}

/// Id of an interned member list (union members).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

/// Id of an interned object shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShapeId(pub u32);

/// Id of an interned function shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

/// Id of an interned tuple element list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleListId(pub u32);

/// Id of an interned conditional type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalTypeId(pub u32);

/// Id of an interned mapped type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedTypeId(pub u32);

/// Id of an interned generic application.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApplicationId(pub u32);

/// The built-in non-literal types.
///
/// Under `noLib` these have no apparent members: `keyof string` is `never`
/// because no `String` interface exists to supply methods.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
    String,
    Number,
    Boolean,
    Symbol,
}

impl IntrinsicKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntrinsicKind::Any => "any",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Never => "never",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Undefined => "undefined",
            IntrinsicKind::String => "string",
            IntrinsicKind::Number => "number",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Symbol => "symbol",
        }
    }
}

/// `f64` wrapper with total equality and hashing (bit pattern), so number
/// literal types can be interned.
#[derive(Copy, Clone, Debug)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for OrderedFloat {
    fn from(value: f64) -> Self {
        OrderedFloat(value)
    }
}

/// A literal type: a single string, number, or boolean value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
}

/// A single property of a structural object type.
///
/// `optional` and `readonly` are the two per-property attributes the mapped
/// type modifiers (`?`/`-?`, `readonly`/`-readonly`) edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    pub readonly: bool,
}

impl PropertyInfo {
    /// Required, mutable property.
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        PropertyInfo {
            name,
            type_id,
            optional: false,
            readonly: false,
        }
    }

    /// Optional, mutable property.
    pub fn opt(name: Atom, type_id: TypeId) -> Self {
        PropertyInfo {
            name,
            type_id,
            optional: true,
            readonly: false,
        }
    }
}

bitflags! {
    /// Facts about an object shape, computed once when the shape is interned.
    ///
    /// The mapped-type evaluator consults these for identity fast paths:
    /// adding `?` to a shape whose properties are all optional already is a
    /// no-op, and likewise for the other modifiers.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u8 {
        /// At least one property is optional.
        const HAS_OPTIONAL = 1 << 0;
        /// At least one property is readonly.
        const HAS_READONLY = 1 << 1;
        /// Every property is optional (unset for the empty shape).
        const ALL_OPTIONAL = 1 << 2;
        /// Every property is readonly (unset for the empty shape).
        const ALL_READONLY = 1 << 3;
    }
}

/// An index signature, e.g. `[key: string]: number`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexSignature {
    pub key_type: TypeId,
    pub value_type: TypeId,
    pub readonly: bool,
}

/// Canonical shape of a structural object type.
///
/// Properties are sorted by name atom when the shape is interned, so two
/// objects with the same members in different source order intern to the
/// same shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    pub flags: ObjectFlags,
    pub properties: Vec<PropertyInfo>,
    pub string_index: Option<IndexSignature>,
    pub number_index: Option<IndexSignature>,
}

impl ObjectShape {
    /// Compute the flags for a property list.
    pub fn flags_for(properties: &[PropertyInfo]) -> ObjectFlags {
        let mut flags = ObjectFlags::empty();
        if properties.iter().any(|p| p.optional) {
            flags |= ObjectFlags::HAS_OPTIONAL;
        }
        if properties.iter().any(|p| p.readonly) {
            flags |= ObjectFlags::HAS_READONLY;
        }
        if !properties.is_empty() {
            if properties.iter().all(|p| p.optional) {
                flags |= ObjectFlags::ALL_OPTIONAL;
            }
            if properties.iter().all(|p| p.readonly) {
                flags |= ObjectFlags::ALL_READONLY;
            }
        }
        flags
    }
}

/// A function parameter.
///
/// For a rest parameter, `type_id` is the element type: the declaration
/// `(...args: any)` is represented as a rest parameter whose type is `any`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
}

impl ParamInfo {
    pub fn named(name: Atom, type_id: TypeId) -> Self {
        ParamInfo {
            name: Some(name),
            type_id,
            optional: false,
            rest: false,
        }
    }

    pub fn unnamed(type_id: TypeId) -> Self {
        ParamInfo {
            name: None,
            type_id,
            optional: false,
            rest: false,
        }
    }

    pub fn opt(name: Atom, type_id: TypeId) -> Self {
        ParamInfo {
            name: Some(name),
            type_id,
            optional: true,
            rest: false,
        }
    }

    pub fn rest(name: Atom, type_id: TypeId) -> Self {
        ParamInfo {
            name: Some(name),
            type_id,
            optional: false,
            rest: true,
        }
    }
}

/// A function type with a single call signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

/// One element of a tuple type.
///
/// Tuples produced by parameter-list inference keep the parameter names as
/// labels and parameter optionality as element optionality, which is how
/// `Parameters<typeof parseFloat>` displays `[string: string, radix?: number]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub type_id: TypeId,
    pub name: Option<Atom>,
    pub optional: bool,
    pub rest: bool,
}

impl TupleElement {
    pub fn new(type_id: TypeId) -> Self {
        TupleElement {
            type_id,
            name: None,
            optional: false,
            rest: false,
        }
    }
}

/// A type parameter declaration, also reused for `infer` placeholders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    /// `extends` bound checked at application time.
    pub constraint: Option<TypeId>,
    /// Default used when the argument is omitted.
    pub default: Option<TypeId>,
}

impl TypeParamInfo {
    pub fn new(name: Atom) -> Self {
        TypeParamInfo {
            name,
            constraint: None,
            default: None,
        }
    }

    pub fn with_constraint(name: Atom, constraint: TypeId) -> Self {
        TypeParamInfo {
            name,
            constraint: Some(constraint),
            default: None,
        }
    }
}

/// `C extends E ? T : F`.
///
/// `is_distributive` records whether the check type was written as a naked
/// type parameter, which makes the conditional distribute over union
/// arguments during instantiation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalType {
    pub check_type: TypeId,
    pub extends_type: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
    pub is_distributive: bool,
}

/// Modifier operation in a mapped type: `+?`/`-?`, `+readonly`/`-readonly`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MappedModifier {
    Add,
    Remove,
}

/// `{ [P in K as N]: T }` with optional modifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedType {
    /// The iteration variable `P`. Remains a free type parameter inside
    /// `template` and `name_type`; evaluation binds it per key.
    pub type_param: TypeParamInfo,
    /// The iterated key set `K`, typically `keyof T` or a literal union.
    pub constraint: TypeId,
    /// Key remapping clause (`as N`). A key remapped to `never` is dropped.
    pub name_type: Option<TypeId>,
    /// Per-key property type `T`.
    pub template: TypeId,
    pub optional_modifier: Option<MappedModifier>,
    pub readonly_modifier: Option<MappedModifier>,
}

/// A generic definition applied to arguments, e.g. `Pick<Fruit, "name">`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub base: TypeId,
    pub args: Vec<TypeId>,
}

/// The interned payload of a type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    /// Canonical union; members are flattened, deduplicated, and sorted.
    Union(TypeListId),
    Object(ObjectShapeId),
    /// Object shape that also carries index signatures, produced by mapped
    /// types iterating over `string` or `number` key sets.
    ObjectWithIndex(ObjectShapeId),
    Function(FunctionShapeId),
    Tuple(TupleListId),
    /// `keyof T`, unevaluated.
    KeyOf(TypeId),
    /// `T[K]`, unevaluated.
    IndexAccess(TypeId, TypeId),
    /// A free type parameter. Evaluation defers any operator whose operand
    /// still contains one.
    TypeParameter(TypeParamInfo),
    /// An `infer` placeholder inside a conditional's extends clause.
    Infer(TypeParamInfo),
    Conditional(ConditionalTypeId),
    Mapped(MappedTypeId),
    /// Reference to a registered definition by id. Aliases expand during
    /// evaluation; interface references are kept as opaque normal forms and
    /// resolved on demand.
    Lazy(DefId),
    Application(ApplicationId),
    Error,
}

/// Render a number the way TypeScript renders numeric keys: integral values
/// print without a fractional part, so the property name for key `1.0` is
/// `"1"`.
pub(crate) fn number_key_string(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Parse a string that spells a numeric key in canonical form (`"0"`,
/// `"42"`, `"1.5"`), rejecting strings like `"01"` or `" 1"` that do not
/// round-trip.
pub(crate) fn parse_numeric_key(text: &str) -> Option<f64> {
    let value: f64 = text.parse().ok()?;
    if number_key_string(value) == text {
        Some(value)
    } else {
        None
    }
}
