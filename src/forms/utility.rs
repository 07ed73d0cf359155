//! Utility functions over consumption goods.

use crate::expr::Expr;
use crate::subst::{DirectiveSet, Slot};
use crate::symbols::Registry;

use super::{FormConfig, FormError, FormKind, FunctionalForm};

/// The combination shapes a utility function may take.
const SUPPORTED: &[FormKind] = &[
    FormKind::Additive,
    FormKind::Multiplicative,
    FormKind::Minimum,
    FormKind::Ces,
];

/// A utility function: a functional form whose dependent variable is the
/// utility level `U`.
#[derive(Clone, Debug)]
pub struct Utility {
    form: FunctionalForm,
}

impl Utility {
    /// The default configuration of a utility function: two goods, all
    /// values symbolic and the dependent variable named `U`.
    pub fn config() -> FormConfig {
        let mut config = FormConfig::default();
        config.set_dependent_name("U".to_string());
        config
    }

    /// Builds a utility function of the given combination shape.
    pub fn new(kind: FormKind, config: &FormConfig) -> Result<Self, FormError> {
        if !SUPPORTED.contains(&kind) {
            return Err(FormError::UnsupportedForm(kind.to_string()));
        }

        Ok(Self {
            form: FunctionalForm::new(kind, config)?,
        })
    }

    /// Builds a utility function from a form name or one of its aliases.
    pub fn from_name(name: &str, config: &FormConfig) -> Result<Self, FormError> {
        Self::new(name.parse()?, config)
    }

    /// Gets the underlying functional form.
    pub fn form(&self) -> &FunctionalForm {
        &self.form
    }

    /// Gets the symbol registry of the utility function.
    pub fn registry(&self) -> &Registry {
        self.form.registry()
    }

    /// Solves the homogeneous equation for the utility level.
    pub fn utility(&self) -> Result<Expr, FormError> {
        self.form.solve_dependent()
    }

    /// Evaluates the utility level at the given quantities and constant.
    pub fn level(
        &self,
        input_values: &[Slot],
        constant: impl Into<Expr>,
    ) -> Result<Expr, FormError> {
        self.form.evaluate(input_values, constant)
    }

    /// Computes the indifference curve at the given utility level: the
    /// quantity of good `held_index` as a function of the other goods.
    pub fn indifference_curve(
        &self,
        held_index: usize,
        constant: impl Into<Expr>,
        level: impl Into<Expr>,
    ) -> Result<Expr, FormError> {
        self.form.level_curve(held_index, constant, level)
    }

    /// Computes the marginal utility of good `index` after applying the
    /// given substitutions.
    pub fn marginal_utility(&self, index: usize, subs: &DirectiveSet) -> Result<Expr, FormError> {
        self.form.marginal(index, subs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subst::Directive;

    #[test]
    fn dependent_variable_is_named_u() {
        let utility = Utility::new(FormKind::Multiplicative, &Utility::config()).unwrap();
        assert_eq!(utility.registry().dependent().name(), "U");
    }

    #[test]
    fn utility_solves_the_equation_for_the_level() {
        let mut config = Utility::config();
        config
            .set_coeff_values(Directive::Neutral)
            .set_exponent_values(Directive::Neutral)
            .set_constant_value(Directive::scalar(0.0));

        let utility = Utility::new(FormKind::Additive, &config).unwrap();
        let solved = utility.utility().unwrap();

        let registry = utility.registry();
        let expected = Expr::sym(registry.input(0).unwrap()) + Expr::sym(registry.input(1).unwrap());
        assert_eq!(solved, expected);
    }

    #[test]
    fn marginal_utility_of_perfect_substitutes_is_the_coefficient() {
        let mut config = Utility::config();
        config.set_exponent_values(Directive::Neutral);

        let utility = Utility::new(FormKind::Additive, &config).unwrap();
        let marginal = utility.marginal_utility(1, &DirectiveSet::new()).unwrap();

        let beta1 = &utility.registry().coefficients().members()[1];
        assert_eq!(marginal, Expr::sym(beta1));
    }

    #[test]
    fn level_evaluates_at_given_quantities() {
        let mut config = Utility::config();
        config
            .set_coeff_values(Directive::Neutral)
            .set_exponent_values(Directive::Neutral);

        let utility = Utility::new(FormKind::Additive, &config).unwrap();
        let level = utility.level(&Slot::values([3.0, 4.0]), 0.0).unwrap();

        assert_eq!(level.as_number(), Some(7.0));
    }

    #[test]
    fn quasi_linear_utility_is_not_available() {
        let result = Utility::new(FormKind::QuasiLinear, &Utility::config());
        assert!(matches!(result, Err(FormError::UnsupportedForm(_))));
    }

    #[test]
    fn from_name_accepts_aliases() {
        let utility = Utility::from_name("cobb-douglas", &Utility::config()).unwrap();
        assert_eq!(utility.form().kind(), FormKind::Multiplicative);
    }
}
