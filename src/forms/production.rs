//! Production functions over production factors.

use crate::expr::Expr;
use crate::subst::DirectiveSet;
use crate::symbols::Registry;

use super::{FormConfig, FormError, FormKind, FunctionalForm};

/// The combination shapes a production function may take. Quasi-linear
/// technology is declared here but its construction is not implemented.
const SUPPORTED: &[FormKind] = &[
    FormKind::Additive,
    FormKind::Multiplicative,
    FormKind::Minimum,
    FormKind::Ces,
    FormKind::QuasiLinear,
];

/// A production function: a functional form mapping factor quantities to an
/// output level `Y`.
#[derive(Clone, Debug)]
pub struct Production {
    form: FunctionalForm,
}

impl Production {
    /// The default configuration of a production function: two factors, all
    /// values symbolic and the output named `Y`.
    pub fn config() -> FormConfig {
        FormConfig::default()
    }

    /// Builds a production function of the given combination shape.
    pub fn new(kind: FormKind, config: &FormConfig) -> Result<Self, FormError> {
        if !SUPPORTED.contains(&kind) {
            return Err(FormError::UnsupportedForm(kind.to_string()));
        }

        Ok(Self {
            form: FunctionalForm::new(kind, config)?,
        })
    }

    /// Builds a production function from a form name or one of its aliases.
    pub fn from_name(name: &str, config: &FormConfig) -> Result<Self, FormError> {
        Self::new(name.parse()?, config)
    }

    /// Gets the underlying functional form.
    pub fn form(&self) -> &FunctionalForm {
        &self.form
    }

    /// Gets the symbol registry of the production function.
    pub fn registry(&self) -> &Registry {
        self.form.registry()
    }

    /// Solves the homogeneous equation for the output level.
    pub fn output(&self) -> Result<Expr, FormError> {
        self.form.solve_dependent()
    }

    /// Computes the isoquant at the given output level: the quantity of
    /// factor `held_index` as a function of the other factors.
    pub fn isoquant(
        &self,
        held_index: usize,
        constant: impl Into<Expr>,
        level: impl Into<Expr>,
    ) -> Result<Expr, FormError> {
        self.form.level_curve(held_index, constant, level)
    }

    /// Computes the marginal product of factor `index` after applying the
    /// given substitutions.
    pub fn marginal_product(&self, index: usize, subs: &DirectiveSet) -> Result<Expr, FormError> {
        self.form.marginal(index, subs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subst::Directive;

    #[test]
    fn quasi_linear_is_declared_but_fails_to_build() {
        let result = Production::new(FormKind::QuasiLinear, &Production::config());
        assert!(matches!(
            result,
            Err(FormError::Unimplemented(FormKind::QuasiLinear))
        ));
    }

    #[test]
    fn cobb_douglas_marginal_product() {
        // Y = x[0]^a*x[1]^b with neutral coefficients: dY/dx[0] is
        // a*x[0]^(a - 1)*x[1]^b.
        let mut config = Production::config();
        config.set_coeff_values(Directive::Neutral);

        let production = Production::new(FormKind::Multiplicative, &config).unwrap();
        let marginal = production.marginal_product(0, &DirectiveSet::new()).unwrap();

        let registry = production.registry();
        let exponents = match registry.exponent() {
            crate::symbols::Binding::Family(family) => family.members(),
            crate::symbols::Binding::Scalar(_) => panic!("indexed exponents expected"),
        };
        let x0 = Expr::sym(registry.input(0).unwrap());
        let x1 = Expr::sym(registry.input(1).unwrap());
        let a0 = Expr::sym(&exponents[0]);
        let a1 = Expr::sym(&exponents[1]);

        let expected = Expr::mul(vec![
            a0.clone(),
            Expr::pow(x0, a0 - Expr::Num(1.0)),
            Expr::pow(x1, a1),
        ]);
        assert_eq!(marginal, expected);
    }

    #[test]
    fn isoquant_of_linear_technology() {
        // Y = 2*x[0] + 3*x[1] at level y0: x[0] = y0/2 - 3*x[1]/2.
        let mut config = Production::config();
        config
            .set_coeff_values(Directive::values([2.0, 3.0]))
            .set_exponent_values(Directive::Neutral);

        let production = Production::new(FormKind::Additive, &config).unwrap();
        let level = crate::symbols::Symbol::new("y0");
        let curve = production.isoquant(0, 0.0, Expr::sym(&level)).unwrap();

        let x1 = production.registry().input(1).unwrap().clone();
        let at_point = curve
            .subs_single(&x1, Expr::Num(2.0))
            .subs_single(&level, Expr::Num(10.0));
        assert_eq!(at_point.as_number(), Some(2.0));
    }
}
