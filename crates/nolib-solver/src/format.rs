//! Type display.
//!
//! Renders interned types back into TypeScript syntax for diagnostics and
//! tests: `{ name: string; color?: string }`, `"a" | "b"`,
//! `(...args: any) => any`, `[string: string, radix?: number]`. Rendering
//! never evaluates; a type prints as the form it is in.

use crate::def::DefinitionStore;
use crate::intern::TypeInterner;
use crate::types::{
    FunctionShape, LiteralValue, MappedModifier, MappedType, ObjectShape, ParamInfo, TupleElement,
    TypeData, TypeId, number_key_string,
};

/// Formats types against an interner, optionally resolving definition names
/// so `Lazy` references print as `Fruit` rather than `Lazy(5)`.
pub struct TypeFormatter<'a> {
    interner: &'a TypeInterner,
    defs: Option<&'a DefinitionStore>,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        TypeFormatter {
            interner,
            defs: None,
        }
    }

    /// Formatter that prints `Lazy` and `Application` heads by definition
    /// name.
    pub fn with_defs(interner: &'a TypeInterner, defs: &'a DefinitionStore) -> Self {
        TypeFormatter {
            interner,
            defs: Some(defs),
        }
    }

    pub fn format(&self, ty: TypeId) -> String {
        let Some(data) = self.interner.lookup(ty) else {
            return format!("<unknown type {}>", ty.0);
        };
        match data {
            TypeData::Intrinsic(kind) => kind.as_str().to_string(),
            TypeData::Literal(value) => self.format_literal(value),
            TypeData::Union(list_id) => {
                let members = self.interner.type_list(list_id);
                members
                    .iter()
                    .map(|&member| self.format_union_member(member))
                    .collect::<Vec<_>>()
                    .join(" | ")
            }
            TypeData::Object(shape_id) | TypeData::ObjectWithIndex(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                self.format_object(&shape)
            }
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                self.format_function(&shape)
            }
            TypeData::Tuple(list_id) => {
                let elements = self.interner.tuple_list(list_id);
                self.format_tuple(&elements)
            }
            TypeData::KeyOf(operand) => format!("keyof {}", self.format_operand(operand)),
            TypeData::IndexAccess(object, index) => {
                format!("{}[{}]", self.format_operand(object), self.format(index))
            }
            TypeData::TypeParameter(info) => self.interner.resolve_atom(info.name).to_string(),
            TypeData::Infer(info) => {
                format!("infer {}", self.interner.resolve_atom(info.name))
            }
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(cond_id);
                format!(
                    "{} extends {} ? {} : {}",
                    self.format_operand(cond.check_type),
                    self.format(cond.extends_type),
                    self.format(cond.true_type),
                    self.format(cond.false_type)
                )
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                self.format_mapped(&mapped)
            }
            TypeData::Lazy(def_id) => self.definition_name(def_id),
            TypeData::Application(app_id) => {
                let app = self.interner.type_application(app_id);
                let args = app
                    .args
                    .iter()
                    .map(|&arg| self.format(arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}<{}>", self.format(app.base), args)
            }
            TypeData::Error => "error".to_string(),
        }
    }

    fn definition_name(&self, def_id: crate::def::DefId) -> String {
        match self.defs.and_then(|defs| defs.get_name(def_id)) {
            Some(name) => self.interner.resolve_atom(name).to_string(),
            None => format!("Lazy({})", def_id.0),
        }
    }

    fn format_literal(&self, value: LiteralValue) -> String {
        match value {
            LiteralValue::String(atom) => format!("\"{}\"", self.interner.resolve_atom(atom)),
            LiteralValue::Number(value) => number_key_string(value.0),
            LiteralValue::Boolean(true) => "true".to_string(),
            LiteralValue::Boolean(false) => "false".to_string(),
        }
    }

    /// Function and conditional members read ambiguously inside a union.
    fn format_union_member(&self, ty: TypeId) -> String {
        match self.interner.lookup(ty) {
            Some(TypeData::Function(_) | TypeData::Conditional(_)) => {
                format!("({})", self.format(ty))
            }
            _ => self.format(ty),
        }
    }

    /// Operand position of `keyof`/indexed access and the check side of a
    /// conditional bind tighter than unions and arrows.
    fn format_operand(&self, ty: TypeId) -> String {
        match self.interner.lookup(ty) {
            Some(TypeData::Union(_) | TypeData::Function(_) | TypeData::Conditional(_)) => {
                format!("({})", self.format(ty))
            }
            _ => self.format(ty),
        }
    }

    fn format_object(&self, shape: &ObjectShape) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(shape.properties.len() + 2);
        for property in &shape.properties {
            let mut text = String::new();
            if property.readonly {
                text.push_str("readonly ");
            }
            text.push_str(&self.interner.resolve_atom(property.name));
            if property.optional {
                text.push('?');
            }
            text.push_str(": ");
            text.push_str(&self.format(property.type_id));
            parts.push(text);
        }
        for (key, index) in [("string", shape.string_index), ("number", shape.number_index)] {
            if let Some(index) = index {
                let prefix = if index.readonly { "readonly " } else { "" };
                parts.push(format!(
                    "{prefix}[key: {key}]: {}",
                    self.format(index.value_type)
                ));
            }
        }
        if parts.is_empty() {
            return "{}".to_string();
        }
        format!("{{ {} }}", parts.join("; "))
    }

    fn format_function(&self, shape: &FunctionShape) -> String {
        let params = shape
            .params
            .iter()
            .map(|param| self.format_param(param))
            .collect::<Vec<_>>()
            .join(", ");
        format!("({}) => {}", params, self.format(shape.return_type))
    }

    fn format_param(&self, param: &ParamInfo) -> String {
        let mut text = String::new();
        if param.rest {
            text.push_str("...");
        }
        match param.name {
            Some(name) => {
                text.push_str(&self.interner.resolve_atom(name));
                if param.optional {
                    text.push('?');
                }
                text.push_str(": ");
                text.push_str(&self.format(param.type_id));
            }
            None => {
                text.push_str(&self.format(param.type_id));
                if param.optional {
                    text.push('?');
                }
            }
        }
        text
    }

    fn format_tuple(&self, elements: &[TupleElement]) -> String {
        let parts = elements
            .iter()
            .map(|element| {
                let mut text = String::new();
                if element.rest {
                    text.push_str("...");
                }
                match element.name {
                    Some(name) => {
                        text.push_str(&self.interner.resolve_atom(name));
                        if element.optional {
                            text.push('?');
                        }
                        text.push_str(": ");
                        text.push_str(&self.format(element.type_id));
                    }
                    None => {
                        text.push_str(&self.format(element.type_id));
                        if element.optional {
                            text.push('?');
                        }
                    }
                }
                text
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{parts}]")
    }

    fn format_mapped(&self, mapped: &MappedType) -> String {
        let mut text = String::from("{ ");
        match mapped.readonly_modifier {
            Some(MappedModifier::Add) => text.push_str("readonly "),
            Some(MappedModifier::Remove) => text.push_str("-readonly "),
            None => {}
        }
        text.push('[');
        text.push_str(&self.interner.resolve_atom(mapped.type_param.name));
        text.push_str(" in ");
        text.push_str(&self.format(mapped.constraint));
        if let Some(name_type) = mapped.name_type {
            text.push_str(" as ");
            text.push_str(&self.format(name_type));
        }
        text.push(']');
        match mapped.optional_modifier {
            Some(MappedModifier::Add) => text.push('?'),
            Some(MappedModifier::Remove) => text.push_str("-?"),
            None => {}
        }
        text.push_str(": ");
        text.push_str(&self.format(mapped.template));
        text.push_str(" }");
        text
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod format_tests;
