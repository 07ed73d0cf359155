//! Substitution directives and their application to expressions.
//!
//! A [`Directive`] describes what to do with one symbol role when a
//! functional form is specialized: leave it symbolic, fill it with the
//! neutral identity value `1`, or fill it with explicit values. Explicit
//! tuples may be partial: each position is an independent [`Slot`] that can
//! carry a value, stay unset (resolved to `1`) or hold the symbol.
//!
//! [`substitute`] validates every directive key against the live registry
//! before touching the expression, so a directive for a foreign symbol never
//! results in a partially substituted expression. Value-shape mismatches
//! (scalar for a family, wrong tuple length) are typed errors that propagate
//! to the caller; they signal a bug at the call site and are never coerced.

use std::collections::HashMap;

use thiserror::Error;

use crate::expr::Expr;
use crate::symbols::{Binding, Registry, Symbol};

/// Error of applying substitution directives.
#[derive(Debug, Error)]
pub enum SubstError {
    /// A directive refers to a symbol that is not part of the registry.
    #[error("symbol `{0}` is not part of the registry")]
    UnknownSymbol(String),
    /// A single scalar value was supplied for an indexed family.
    #[error("scalar value supplied for indexed family `{0}`")]
    ScalarForFamily(String),
    /// A tuple of values was supplied for a scalar symbol.
    #[error("tuple of length {len} supplied for scalar symbol `{name}`")]
    TupleForScalar {
        /// Name of the scalar symbol.
        name: String,
        /// Length of the offending tuple.
        len: usize,
    },
    /// A value tuple does not match the family length.
    #[error("value tuple for `{name}` has length {len}, expected {expected}")]
    LengthMismatch {
        /// Base name of the family.
        name: String,
        /// Expected length (the family length).
        expected: usize,
        /// Length of the offending tuple.
        len: usize,
    },
}

/// One position of an explicit value tuple.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    /// No value given; resolved to the neutral `1`.
    Unset,
    /// Keep the bound symbol at this position.
    Hold,
    /// Substitute the given value.
    Value(Expr),
}

impl Slot {
    /// Builds a tuple of value slots from numbers.
    pub fn values<I>(values: I) -> Vec<Slot>
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        values
            .into_iter()
            .map(|value| Slot::Value(value.into()))
            .collect()
    }
}

/// Substitution instruction for one symbol role.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    /// No substitution; the symbols stay free.
    Symbolic,
    /// Substitute the neutral identity `1` (per member for a family).
    Neutral,
    /// Substitute a scalar symbol with the given value.
    Scalar(Expr),
    /// Substitute a family positionally (or a scalar, with a 1-tuple).
    Tuple(Vec<Slot>),
}

impl Directive {
    /// Builds an explicit-full tuple directive from numbers.
    pub fn values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        Directive::Tuple(Slot::values(values))
    }

    /// Builds a scalar directive from a number or expression.
    pub fn scalar(value: impl Into<Expr>) -> Self {
        Directive::Scalar(value.into())
    }
}

/// An ordered set of `(binding, directive)` pairs keyed by live registry
/// bindings.
#[derive(Clone, Debug, Default)]
pub struct DirectiveSet {
    entries: Vec<(Binding, Directive)>,
}

impl DirectiveSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directive for a binding.
    pub fn insert(&mut self, binding: Binding, directive: Directive) -> &mut Self {
        self.entries.push((binding, directive));
        self
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(Binding, Directive)> {
        self.entries.iter()
    }
}

/// Applies substitution directives to an expression.
///
/// All directive keys are validated against the registry up front; an
/// unknown symbol fails before any substitution happens. On success, every
/// symbol under a `Neutral` or full explicit directive is gone from the
/// result, while `Symbolic` and held symbols stay free. Neither the registry
/// nor the input expression is mutated.
pub fn substitute(
    expr: &Expr,
    directives: &DirectiveSet,
    registry: &Registry,
) -> Result<Expr, SubstError> {
    for (binding, _) in directives.iter() {
        if !registry.contains(binding) {
            return Err(SubstError::UnknownSymbol(binding.name().to_string()));
        }
    }

    let mut map: HashMap<Symbol, Expr> = HashMap::new();

    for (binding, directive) in directives.iter() {
        match (binding, directive) {
            (_, Directive::Symbolic) => {}
            (Binding::Scalar(symbol), Directive::Neutral) => {
                map.insert(symbol.clone(), Expr::Num(1.0));
            }
            (Binding::Family(family), Directive::Neutral) => {
                for member in family.members() {
                    map.insert(member.clone(), Expr::Num(1.0));
                }
            }
            (Binding::Scalar(symbol), Directive::Scalar(value)) => {
                map.insert(symbol.clone(), value.clone());
            }
            (Binding::Family(family), Directive::Scalar(_)) => {
                return Err(SubstError::ScalarForFamily(family.base().to_string()));
            }
            (Binding::Scalar(symbol), Directive::Tuple(slots)) => {
                if slots.len() != 1 {
                    return Err(SubstError::TupleForScalar {
                        name: symbol.name().to_string(),
                        len: slots.len(),
                    });
                }
                apply_slot(&mut map, symbol, &slots[0]);
            }
            (Binding::Family(family), Directive::Tuple(slots)) => {
                if slots.len() != family.len() {
                    return Err(SubstError::LengthMismatch {
                        name: family.base().to_string(),
                        expected: family.len(),
                        len: slots.len(),
                    });
                }
                for (member, slot) in family.members().iter().zip(slots) {
                    apply_slot(&mut map, member, slot);
                }
            }
        }
    }

    Ok(expr.subs(&map))
}

fn apply_slot(map: &mut HashMap<Symbol, Expr>, symbol: &Symbol, slot: &Slot) {
    match slot {
        Slot::Unset => {
            map.insert(symbol.clone(), Expr::Num(1.0));
        }
        Slot::Hold => {}
        Slot::Value(value) => {
            map.insert(symbol.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{ExponentShape, Family, RoleNames, Role};

    fn registry() -> Registry {
        Registry::build(2, &RoleNames::default(), ExponentShape::Indexed)
    }

    fn input_sum(registry: &Registry) -> Expr {
        Expr::add(
            registry
                .inputs()
                .members()
                .iter()
                .map(Expr::sym)
                .collect(),
        )
    }

    #[test]
    fn symbolic_directive_is_a_no_op() {
        let registry = registry();
        let expr = input_sum(&registry);

        let mut directives = DirectiveSet::new();
        directives.insert(registry.binding(Role::Input), Directive::Symbolic);

        let result = substitute(&expr, &directives, &registry).unwrap();
        assert_eq!(result, expr);
    }

    #[test]
    fn neutral_family_substitutes_ones() {
        let registry = registry();
        let expr = input_sum(&registry);

        let mut directives = DirectiveSet::new();
        directives.insert(registry.binding(Role::Input), Directive::Neutral);

        let result = substitute(&expr, &directives, &registry).unwrap();
        assert_eq!(result.as_number(), Some(2.0));
    }

    #[test]
    fn explicit_tuple_substitutes_positionally() {
        let registry = registry();
        let expr = input_sum(&registry);

        let mut directives = DirectiveSet::new();
        directives.insert(
            registry.binding(Role::Input),
            Directive::values([3.0, 4.0]),
        );

        let result = substitute(&expr, &directives, &registry).unwrap();
        assert_eq!(result.as_number(), Some(7.0));
    }

    #[test]
    fn partial_tuple_resolves_each_slot_independently() {
        let registry = registry();
        let expr = input_sum(&registry);

        let mut directives = DirectiveSet::new();
        directives.insert(
            registry.binding(Role::Input),
            Directive::Tuple(vec![Slot::Hold, Slot::Unset]),
        );

        let result = substitute(&expr, &directives, &registry).unwrap();

        // x[0] held, x[1] resolved to 1.
        let x0 = registry.input(0).unwrap();
        let x1 = registry.input(1).unwrap();
        assert!(result.contains(x0));
        assert!(!result.contains(x1));
        assert_eq!(result, Expr::add(vec![Expr::Num(1.0), Expr::sym(x0)]));
    }

    #[test]
    fn unknown_symbol_fails_before_substitution() {
        let registry = registry();
        let expr = input_sum(&registry);

        let mut directives = DirectiveSet::new();
        directives.insert(registry.binding(Role::Input), Directive::Neutral);
        directives.insert(
            Binding::Scalar(Symbol::new("z")),
            Directive::Scalar(Expr::Num(1.0)),
        );

        let result = substitute(&expr, &directives, &registry);
        assert!(matches!(result, Err(SubstError::UnknownSymbol(name)) if name == "z"));
    }

    #[test]
    fn scalar_for_family_is_a_shape_error() {
        let registry = registry();
        let expr = input_sum(&registry);

        let mut directives = DirectiveSet::new();
        directives.insert(
            registry.binding(Role::Coefficient),
            Directive::Scalar(Expr::Num(2.0)),
        );

        let result = substitute(&expr, &directives, &registry);
        assert!(matches!(result, Err(SubstError::ScalarForFamily(_))));
    }

    #[test]
    fn empty_tuple_for_family_is_a_shape_error() {
        let registry = registry();
        let expr = input_sum(&registry);

        let mut directives = DirectiveSet::new();
        directives.insert(registry.binding(Role::Input), Directive::Tuple(Vec::new()));

        let result = substitute(&expr, &directives, &registry);
        assert!(matches!(
            result,
            Err(SubstError::LengthMismatch {
                expected: 2,
                len: 0,
                ..
            })
        ));
    }

    #[test]
    fn wrong_length_tuple_for_scalar_is_a_shape_error() {
        let registry = registry();
        let expr = Expr::sym(registry.constant());

        let mut directives = DirectiveSet::new();
        directives.insert(
            registry.binding(Role::Constant),
            Directive::values([1.0, 2.0]),
        );

        let result = substitute(&expr, &directives, &registry);
        assert!(matches!(
            result,
            Err(SubstError::TupleForScalar { len: 2, .. })
        ));
    }

    #[test]
    fn one_tuple_is_accepted_for_a_scalar() {
        let registry = registry();
        let expr = Expr::sym(registry.constant());

        let mut directives = DirectiveSet::new();
        directives.insert(registry.binding(Role::Constant), Directive::values([5.0]));

        let result = substitute(&expr, &directives, &registry).unwrap();
        assert_eq!(result.as_number(), Some(5.0));
    }

    #[test]
    fn foreign_family_of_same_base_name_is_rejected() {
        let registry = registry();
        let expr = input_sum(&registry);

        // Same base name but a different length is not the registry's family.
        let mut directives = DirectiveSet::new();
        directives.insert(
            Binding::Family(Family::new("x", 3)),
            Directive::Neutral,
        );

        let result = substitute(&expr, &directives, &registry);
        assert!(matches!(result, Err(SubstError::UnknownSymbol(_))));
    }
}
