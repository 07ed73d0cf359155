//! Symbol registry: named real-valued unknowns and indexed families.
//!
//! Every functional form is built over a fixed set of *roles*: the indexed
//! inputs, their coefficients and exponents, a constant, the dependent
//! variable and the summation index. The [`Registry`] binds each role to
//! either a single [`Symbol`] or an indexed [`Family`] of symbols, so that
//! substitution directives can be validated against the live symbols instead
//! of display-name strings.
//!
//! Symbols are identified by name (two symbols with the same name are the
//! same mathematical unknown), are always real-valued and can additionally be
//! tagged non-negative, which is how the Lagrange multiplier carries its sign
//! constraint.

use std::fmt;
use std::sync::Arc;

/// A named real-valued mathematical unknown.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    name: Arc<str>,
    nonnegative: bool,
}

impl Symbol {
    /// Creates a real-valued symbol.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            nonnegative: false,
        }
    }

    /// Creates a real-valued symbol constrained to be non-negative.
    pub fn nonnegative(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            nonnegative: true,
        }
    }

    /// Gets the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the symbol is constrained to be non-negative.
    pub fn is_nonnegative(&self) -> bool {
        self.nonnegative
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An indexed family of symbols `name[0], name[1], ..., name[n-1]`.
///
/// A family of length zero is legal; sums and products over it reduce to
/// their respective identities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Family {
    base: String,
    members: Vec<Symbol>,
}

impl Family {
    /// Creates a family of `len` indexed symbols sharing a base name.
    pub fn new(base: impl AsRef<str>, len: usize) -> Self {
        let base = base.as_ref().to_string();
        let members = (0..len)
            .map(|i| Symbol::new(format!("{}[{}]", base, i)))
            .collect();

        Self { base, members }
    }

    /// Gets the base name (without an index).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Gets the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the family has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Gets the member at the given index, if any.
    pub fn member(&self, index: usize) -> Option<&Symbol> {
        self.members.get(index)
    }

    /// Gets all members in index order.
    pub fn members(&self) -> &[Symbol] {
        &self.members
    }
}

/// Role of a symbol within a functional form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Indexed inputs (goods, factors).
    Input,
    /// Indexed linear coefficients.
    Coefficient,
    /// Exponents. Indexed for most forms, a single shared scalar for CES.
    Exponent,
    /// The additive constant.
    Constant,
    /// The dependent variable of the homogeneous equation.
    Dependent,
    /// The summation index variable.
    Index,
}

/// What a role is bound to: a single symbol or an indexed family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// A single scalar symbol.
    Scalar(Symbol),
    /// An indexed family of symbols.
    Family(Family),
}

impl Binding {
    /// Gets the display name of the bound symbol or family.
    pub fn name(&self) -> &str {
        match self {
            Binding::Scalar(symbol) => symbol.name(),
            Binding::Family(family) => family.base(),
        }
    }
}

/// Display names for the symbol roles of one functional form.
#[derive(Clone, Debug)]
pub struct RoleNames {
    /// Base name for the indexed inputs.
    pub input: String,
    /// Base name for the indexed coefficients.
    pub coefficient: String,
    /// Name for the exponent role (base name when indexed).
    pub exponent: String,
    /// Name for the additive constant.
    pub constant: String,
    /// Name for the dependent variable.
    pub dependent: String,
}

impl Default for RoleNames {
    fn default() -> Self {
        Self {
            input: "x".to_string(),
            coefficient: "beta".to_string(),
            exponent: "alpha".to_string(),
            constant: "C".to_string(),
            dependent: "Y".to_string(),
        }
    }
}

/// Shape of the exponent role.
///
/// Most forms index exponents per input. CES instead carries a single shared
/// exponent, which is bound as a scalar from the start so that no role is
/// ever rebound mid-construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExponentShape {
    /// One exponent symbol per input.
    Indexed,
    /// A single exponent symbol shared by all inputs.
    Shared,
}

/// The symbol table of one functional form: one binding per role.
#[derive(Clone, Debug)]
pub struct Registry {
    num_inputs: usize,
    inputs: Family,
    coefficients: Family,
    exponent: Binding,
    constant: Symbol,
    dependent: Symbol,
    index: Symbol,
}

impl Registry {
    /// Builds the registry for a form over `num_inputs` inputs.
    ///
    /// Exactly one binding is created per role. The index variable is always
    /// named `i`. A registry over zero inputs is legal; its families are
    /// simply empty.
    pub fn build(num_inputs: usize, names: &RoleNames, exponent_shape: ExponentShape) -> Self {
        let exponent = match exponent_shape {
            ExponentShape::Indexed => Binding::Family(Family::new(&names.exponent, num_inputs)),
            ExponentShape::Shared => Binding::Scalar(Symbol::new(&names.exponent)),
        };

        Self {
            num_inputs,
            inputs: Family::new(&names.input, num_inputs),
            coefficients: Family::new(&names.coefficient, num_inputs),
            exponent,
            constant: Symbol::new(&names.constant),
            dependent: Symbol::new(&names.dependent),
            index: Symbol::new("i"),
        }
    }

    /// Gets the number of inputs the registry was built for.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Gets the input family.
    pub fn inputs(&self) -> &Family {
        &self.inputs
    }

    /// Gets the input symbol at the given index, if any.
    pub fn input(&self, index: usize) -> Option<&Symbol> {
        self.inputs.member(index)
    }

    /// Gets the coefficient family.
    pub fn coefficients(&self) -> &Family {
        &self.coefficients
    }

    /// Gets the exponent binding (family or shared scalar).
    pub fn exponent(&self) -> &Binding {
        &self.exponent
    }

    /// Gets the constant symbol.
    pub fn constant(&self) -> &Symbol {
        &self.constant
    }

    /// Gets the dependent variable symbol.
    pub fn dependent(&self) -> &Symbol {
        &self.dependent
    }

    /// Gets the index variable symbol.
    pub fn index(&self) -> &Symbol {
        &self.index
    }

    /// Gets the binding for a role.
    pub fn binding(&self, role: Role) -> Binding {
        match role {
            Role::Input => Binding::Family(self.inputs.clone()),
            Role::Coefficient => Binding::Family(self.coefficients.clone()),
            Role::Exponent => self.exponent.clone(),
            Role::Constant => Binding::Scalar(self.constant.clone()),
            Role::Dependent => Binding::Scalar(self.dependent.clone()),
            Role::Index => Binding::Scalar(self.index.clone()),
        }
    }

    /// Whether the given symbol is a member of the registry.
    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        if symbol == &self.constant || symbol == &self.dependent || symbol == &self.index {
            return true;
        }

        if self.inputs.members().contains(symbol) || self.coefficients.members().contains(symbol) {
            return true;
        }

        match &self.exponent {
            Binding::Scalar(exponent) => symbol == exponent,
            Binding::Family(family) => family.members().contains(symbol),
        }
    }

    /// Whether the given binding refers to symbols of the registry.
    pub fn contains(&self, binding: &Binding) -> bool {
        match binding {
            Binding::Scalar(symbol) => self.contains_symbol(symbol),
            Binding::Family(family) => {
                family == &self.inputs
                    || family == &self.coefficients
                    || matches!(&self.exponent, Binding::Family(exponent) if family == exponent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_identified_by_name() {
        assert_eq!(Symbol::new("x"), Symbol::new("x"));
        assert_ne!(Symbol::new("x"), Symbol::new("y"));
        // The non-negativity tag is part of the identity.
        assert_ne!(Symbol::new("lambda"), Symbol::nonnegative("lambda"));
    }

    #[test]
    fn family_members_are_index_suffixed() {
        let family = Family::new("x", 3);

        assert_eq!(family.len(), 3);
        assert_eq!(family.member(0).map(Symbol::name), Some("x[0]"));
        assert_eq!(family.member(2).map(Symbol::name), Some("x[2]"));
        assert_eq!(family.member(3), None);
    }

    #[test]
    fn registry_binds_every_role() {
        let registry = Registry::build(2, &RoleNames::default(), ExponentShape::Indexed);

        assert_eq!(registry.num_inputs(), 2);
        assert_eq!(registry.inputs().len(), 2);
        assert_eq!(registry.coefficients().base(), "beta");
        assert_eq!(registry.constant().name(), "C");
        assert_eq!(registry.dependent().name(), "Y");
        assert_eq!(registry.index().name(), "i");

        match registry.binding(Role::Exponent) {
            Binding::Family(family) => assert_eq!(family.base(), "alpha"),
            Binding::Scalar(_) => panic!("indexed registry must bind exponents as a family"),
        }
    }

    #[test]
    fn shared_exponent_is_a_scalar_binding() {
        let registry = Registry::build(2, &RoleNames::default(), ExponentShape::Shared);

        match registry.exponent() {
            Binding::Scalar(symbol) => assert_eq!(symbol.name(), "alpha"),
            Binding::Family(_) => panic!("shared exponent must be a scalar"),
        }
    }

    #[test]
    fn membership_covers_all_roles() {
        let registry = Registry::build(2, &RoleNames::default(), ExponentShape::Indexed);

        assert!(registry.contains_symbol(&Symbol::new("x[1]")));
        assert!(registry.contains_symbol(&Symbol::new("beta[0]")));
        assert!(registry.contains_symbol(&Symbol::new("C")));
        assert!(!registry.contains_symbol(&Symbol::new("z")));
        assert!(!registry.contains_symbol(&Symbol::new("x[2]")));

        assert!(registry.contains(&Binding::Family(Family::new("x", 2))));
        assert!(!registry.contains(&Binding::Family(Family::new("x", 3))));
    }

    #[test]
    fn zero_input_registry_is_legal() {
        let registry = Registry::build(0, &RoleNames::default(), ExponentShape::Indexed);

        assert_eq!(registry.num_inputs(), 0);
        assert!(registry.inputs().is_empty());
    }
}
