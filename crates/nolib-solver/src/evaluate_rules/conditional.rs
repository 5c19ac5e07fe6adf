//! Conditional type evaluation: `C extends E ? T : F`.
//!
//! Distribution over a naked type-parameter check happens at instantiation
//! time, where the parameter is re-bound per union member so the branches
//! see the member. By the time evaluation runs, a distributive conditional
//! with a union check has constant branches and only the branch choice
//! fans out. `never` short-circuits a distributive check, `infer` patterns
//! bind through structural matching, and everything else picks a branch by
//! assignability.

use crate::evaluate::TypeEvaluator;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::subtype::is_assignable;
use crate::types::{ConditionalType, TypeData, TypeId};
use nolib_common::limits::MAX_DISTRIBUTION_SIZE;
use rustc_hash::FxHashMap;

impl TypeEvaluator<'_> {
    /// Evaluate a conditional type.
    pub(crate) fn evaluate_conditional(
        &mut self,
        original: TypeId,
        cond: &ConditionalType,
    ) -> TypeId {
        let check = self.evaluate(cond.check_type);
        if check == TypeId::ERROR {
            return TypeId::ERROR;
        }
        // An unresolved check type defers the whole conditional.
        if self.contains_type_parameters(check) {
            if check == cond.check_type {
                return original;
            }
            return self.interner.conditional(ConditionalType {
                check_type: check,
                ..*cond
            });
        }
        if cond.is_distributive {
            // Distributing over the empty union yields the empty union.
            if check == TypeId::NEVER {
                return TypeId::NEVER;
            }
            if let Some(TypeData::Union(list_id)) = self.interner.lookup(check) {
                let members = self.interner.type_list(list_id);
                if members.len() > MAX_DISTRIBUTION_SIZE {
                    return TypeId::ERROR;
                }
                let mut arms = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    arms.push(self.conditional_branch(cond, member));
                }
                return self.interner.union(arms);
            }
        }
        self.conditional_branch(cond, check)
    }

    /// Pick and evaluate one branch for a concrete check type.
    fn conditional_branch(&mut self, cond: &ConditionalType, check: TypeId) -> TypeId {
        let extends = self.evaluate(cond.extends_type);
        if extends == TypeId::ERROR {
            return TypeId::ERROR;
        }
        if self.contains_infer(extends) {
            let mut bindings = FxHashMap::default();
            return if self.match_infer_pattern(check, extends, &mut bindings) {
                let mut subst = TypeSubstitution::new();
                for (name, bound) in bindings {
                    subst.insert(name, bound);
                }
                let instantiated = instantiate_type(self.interner, cond.true_type, &subst);
                self.evaluate(instantiated)
            } else {
                self.evaluate(cond.false_type)
            };
        }
        // `any` matches both ways unless the target absorbs it outright.
        if check == TypeId::ANY && extends != TypeId::ANY && extends != TypeId::UNKNOWN {
            let true_arm = self.evaluate(cond.true_type);
            let false_arm = self.evaluate(cond.false_type);
            return self.interner.union2(true_arm, false_arm);
        }
        if is_assignable(self.interner, self.defs, check, extends) {
            self.evaluate(cond.true_type)
        } else {
            self.evaluate(cond.false_type)
        }
    }
}
