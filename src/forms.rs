//! Functional forms: parameterized symbolic equation templates.
//!
//! A functional form is a homogeneous equation `combination(x; beta, alpha)
//! + C - Y = 0` describing how indexed inputs combine into an economic
//! output. Solving the equation for the dependent variable recovers the
//! standard function. Four combinations are supported:
//!
//! * [additive](FunctionalForm::additive) -- `sum_i beta[i]*x[i]^alpha[i]`
//!   (perfect substitutes when exponents are neutral),
//! * [multiplicative](FunctionalForm::multiplicative) -- `prod_i
//!   beta[i]*x[i]^alpha[i]` (Cobb-Douglas),
//! * [minimum](FunctionalForm::minimum) -- `min_i beta[i]*x[i]` (perfect
//!   complements),
//! * [CES](FunctionalForm::ces) -- `(sum_i beta[i]*x[i]^rho)^(1/rho)` with a
//!   single shared exponent.
//!
//! A form is built once from a [`FormConfig`]: the raw template is
//! constructed over a fresh [`Registry`] and the configured value
//! [`Directive`]s are applied through the substitution engine. The resulting
//! expression is immutable; queries derive new expressions from it.

mod constraint;
mod production;
mod utility;

pub use constraint::BudgetConstraint;
pub use production::Production;
pub use utility::Utility;

use std::fmt;
use std::str::FromStr;

use getset::{Getters, Setters};
use thiserror::Error;

use crate::expr::{DiffError, Expr};
use crate::subst::{substitute, Directive, DirectiveSet, Slot, SubstError};
use crate::symbols::{Binding, ExponentShape, Registry, RoleNames};

/// Error of building or querying a functional form.
#[derive(Debug, Error)]
pub enum FormError {
    /// The requested functional form name is not in the supported set.
    #[error("unsupported functional form `{0}`")]
    UnsupportedForm(String),
    /// The functional form is declared but has no implementation.
    #[error("functional form `{0}` is not implemented")]
    Unimplemented(FormKind),
    /// An input index outside the form's range.
    #[error("input index {index} out of range for a form with {num_inputs} inputs")]
    BadIndex {
        /// The requested index.
        index: usize,
        /// The number of inputs of the form.
        num_inputs: usize,
    },
    /// No closed-form solution for the requested symbol.
    #[error("cannot solve for `{0}` in closed form")]
    NoClosedForm(String),
    /// A substitution directive failed.
    #[error(transparent)]
    Subst(#[from] SubstError),
    /// A derivative could not be taken in closed form.
    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// The supported combination shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormKind {
    /// Sum of coefficient-scaled powered inputs.
    Additive,
    /// Product of coefficient-scaled powered inputs.
    Multiplicative,
    /// Minimum of coefficient-scaled inputs.
    Minimum,
    /// Constant elasticity of substitution with one shared exponent.
    Ces,
    /// Quasi-linear form; declared but not implemented.
    QuasiLinear,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormKind::Additive => "additive",
            FormKind::Multiplicative => "multiplicative",
            FormKind::Minimum => "minimum",
            FormKind::Ces => "ces",
            FormKind::QuasiLinear => "quasi-linear",
        })
    }
}

impl FromStr for FormKind {
    type Err = FormError;

    /// Parses a functional form name, accepting the economic aliases
    /// (`substitutes`, `polynomial`, `cobb-douglas`, `complements`).
    fn from_str(name: &str) -> Result<Self, FormError> {
        match name {
            "additive" | "substitutes" | "polynomial" => Ok(FormKind::Additive),
            "multiplicative" | "cobb-douglas" => Ok(FormKind::Multiplicative),
            "minimum" | "complements" => Ok(FormKind::Minimum),
            "ces" => Ok(FormKind::Ces),
            "quasi-linear" => Ok(FormKind::QuasiLinear),
            other => Err(FormError::UnsupportedForm(other.to_string())),
        }
    }
}

/// Configuration of a functional form: the number of inputs, the display
/// name per symbol role and the value directive per value role.
#[derive(Clone, Debug, Getters, Setters)]
#[getset(get = "pub", set = "pub")]
pub struct FormConfig {
    /// The number of indexed inputs.
    num_inputs: usize,
    /// Base name for the indexed inputs.
    input_name: String,
    /// Base name for the indexed coefficients.
    coeff_name: String,
    /// Name for the exponent role.
    exponent_name: String,
    /// Name for the dependent variable.
    dependent_name: String,
    /// Name for the additive constant.
    constant_name: String,
    /// Values for the coefficients.
    coeff_values: Directive,
    /// Values for the exponents.
    exponent_values: Directive,
    /// Value for the dependent variable.
    dependent_value: Directive,
    /// Value for the constant.
    constant_value: Directive,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            num_inputs: 2,
            input_name: "x".to_string(),
            coeff_name: "beta".to_string(),
            exponent_name: "alpha".to_string(),
            dependent_name: "Y".to_string(),
            constant_name: "C".to_string(),
            coeff_values: Directive::Symbolic,
            exponent_values: Directive::Symbolic,
            dependent_value: Directive::Symbolic,
            constant_value: Directive::Symbolic,
        }
    }
}

impl FormConfig {
    fn role_names(&self) -> RoleNames {
        RoleNames {
            input: self.input_name.clone(),
            coefficient: self.coeff_name.clone(),
            exponent: self.exponent_name.clone(),
            constant: self.constant_name.clone(),
            dependent: self.dependent_name.clone(),
        }
    }
}

/// A constructed functional form: its registry, its raw template and the
/// template with the configured directives applied.
#[derive(Clone, Debug)]
pub struct FunctionalForm {
    kind: FormKind,
    num_inputs: usize,
    registry: Registry,
    raw: Expr,
    expr: Expr,
}

impl FunctionalForm {
    /// Builds the form of the given kind.
    ///
    /// Fails for [`FormKind::QuasiLinear`], which is declared but not
    /// implemented.
    pub fn new(kind: FormKind, config: &FormConfig) -> Result<Self, FormError> {
        match kind {
            FormKind::Additive => Self::additive(config),
            FormKind::Multiplicative => Self::multiplicative(config),
            FormKind::Minimum => Self::minimum(config),
            FormKind::Ces => Self::ces(config),
            FormKind::QuasiLinear => Err(FormError::Unimplemented(FormKind::QuasiLinear)),
        }
    }

    /// Builds `sum_i beta[i]*x[i]^alpha[i] + C - Y`.
    ///
    /// Over zero inputs the sum is `0` and the form reduces to `C - Y`.
    pub fn additive(config: &FormConfig) -> Result<Self, FormError> {
        let registry = Registry::build(
            config.num_inputs,
            &config.role_names(),
            ExponentShape::Indexed,
        );

        let combination = Expr::add(
            (0..config.num_inputs)
                .map(|i| monomial(&registry, i))
                .collect(),
        );
        let raw = combination + Expr::sym(registry.constant()) - Expr::sym(registry.dependent());

        Self::finish(FormKind::Additive, registry, raw, config)
    }

    /// Builds `prod_i beta[i]*x[i]^alpha[i] + C - Y`.
    ///
    /// Over zero inputs the product is `1` and the form reduces to
    /// `C - Y + 1`.
    pub fn multiplicative(config: &FormConfig) -> Result<Self, FormError> {
        let registry = Registry::build(
            config.num_inputs,
            &config.role_names(),
            ExponentShape::Indexed,
        );

        let combination = Expr::mul(
            (0..config.num_inputs)
                .map(|i| monomial(&registry, i))
                .collect(),
        );
        let raw = combination + Expr::sym(registry.constant()) - Expr::sym(registry.dependent());

        Self::finish(FormKind::Multiplicative, registry, raw, config)
    }

    /// Builds `min_i(beta[i]*x[i]) - Y`.
    ///
    /// The constant term is dropped in this form by convention. Over zero
    /// inputs the minimum of the empty set is `+inf` (an engine convention,
    /// not an economic rule).
    pub fn minimum(config: &FormConfig) -> Result<Self, FormError> {
        let registry = Registry::build(
            config.num_inputs,
            &config.role_names(),
            ExponentShape::Indexed,
        );

        let combination = Expr::min_of(
            (0..config.num_inputs)
                .map(|i| {
                    Expr::mul(vec![
                        Expr::sym(&registry.coefficients().members()[i]),
                        Expr::sym(&registry.inputs().members()[i]),
                    ])
                })
                .collect(),
        );
        let raw = combination - Expr::sym(registry.dependent());

        Self::finish(FormKind::Minimum, registry, raw, config)
    }

    /// Builds `(sum_i beta[i]*x[i]^rho)^(1/rho) + C - Y`.
    ///
    /// The exponent is a single shared scalar, bound as such in the
    /// registry from the start; a tuple exponent directive of length other
    /// than one is a shape error.
    pub fn ces(config: &FormConfig) -> Result<Self, FormError> {
        let registry = Registry::build(
            config.num_inputs,
            &config.role_names(),
            ExponentShape::Shared,
        );

        let rho = match registry.exponent() {
            Binding::Scalar(symbol) => Expr::sym(symbol),
            Binding::Family(_) => unreachable!("shared exponent is bound as a scalar"),
        };
        let combination = Expr::pow(
            Expr::add(
                (0..config.num_inputs)
                    .map(|i| monomial(&registry, i))
                    .collect(),
            ),
            Expr::div(Expr::Num(1.0), rho),
        );
        let raw = combination + Expr::sym(registry.constant()) - Expr::sym(registry.dependent());

        Self::finish(FormKind::Ces, registry, raw, config)
    }

    fn finish(
        kind: FormKind,
        registry: Registry,
        raw: Expr,
        config: &FormConfig,
    ) -> Result<Self, FormError> {
        let mut directives = DirectiveSet::new();
        directives.insert(
            Binding::Family(registry.coefficients().clone()),
            config.coeff_values().clone(),
        );
        directives.insert(registry.exponent().clone(), config.exponent_values().clone());
        directives.insert(
            Binding::Scalar(registry.constant().clone()),
            config.constant_value().clone(),
        );
        directives.insert(
            Binding::Scalar(registry.dependent().clone()),
            config.dependent_value().clone(),
        );

        let expr = substitute(&raw, &directives, &registry)?;

        Ok(Self {
            kind,
            num_inputs: registry.num_inputs(),
            registry,
            raw,
            expr,
        })
    }

    /// Gets the combination shape of the form.
    pub fn kind(&self) -> FormKind {
        self.kind
    }

    /// Gets the number of inputs the form was built for.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Gets the symbol registry of the form.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Gets the raw template, before value directives were applied.
    pub fn raw(&self) -> &Expr {
        &self.raw
    }

    /// Gets the homogeneous equation with the configured values applied.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Solves the homogeneous equation for the dependent variable.
    pub fn solve_dependent(&self) -> Result<Expr, FormError> {
        let dependent = self.registry.dependent();
        self.expr
            .solve_for(dependent)
            .ok_or_else(|| FormError::NoClosedForm(dependent.name().to_string()))
    }

    /// Evaluates the form at the given input values and constant.
    ///
    /// The equation is solved for the dependent variable first, then the
    /// inputs and constant are substituted. Input slots may hold symbols to
    /// evaluate at a partially symbolic point.
    pub fn evaluate(
        &self,
        input_values: &[Slot],
        constant: impl Into<Expr>,
    ) -> Result<Expr, FormError> {
        let solved = self.solve_dependent()?;

        let mut directives = DirectiveSet::new();
        directives.insert(
            Binding::Family(self.registry.inputs().clone()),
            Directive::Tuple(input_values.to_vec()),
        );
        directives.insert(
            Binding::Scalar(self.registry.constant().clone()),
            Directive::Scalar(constant.into()),
        );

        Ok(substitute(&solved, &directives, &self.registry)?)
    }

    /// Computes the level curve of the form: fixes the constant and the
    /// dependent variable, then solves for the input at `held_index` in
    /// terms of the remaining inputs.
    pub fn level_curve(
        &self,
        held_index: usize,
        constant: impl Into<Expr>,
        level: impl Into<Expr>,
    ) -> Result<Expr, FormError> {
        let held = self
            .registry
            .input(held_index)
            .ok_or(FormError::BadIndex {
                index: held_index,
                num_inputs: self.num_inputs,
            })?
            .clone();

        let mut directives = DirectiveSet::new();
        directives.insert(
            Binding::Scalar(self.registry.constant().clone()),
            Directive::Scalar(constant.into()),
        );
        directives.insert(
            Binding::Scalar(self.registry.dependent().clone()),
            Directive::Scalar(level.into()),
        );

        let curve = substitute(&self.expr, &directives, &self.registry)?;
        curve
            .solve_for(&held)
            .ok_or_else(|| FormError::NoClosedForm(held.name().to_string()))
    }

    /// Computes the first derivative of the solved form with respect to the
    /// input at `index`, after applying the given substitutions.
    pub fn marginal(&self, index: usize, subs: &DirectiveSet) -> Result<Expr, FormError> {
        let input = self
            .registry
            .input(index)
            .ok_or(FormError::BadIndex {
                index,
                num_inputs: self.num_inputs,
            })?
            .clone();

        let substituted = substitute(&self.expr, subs, &self.registry)?;
        let dependent = self.registry.dependent();
        let solved = substituted
            .solve_for(dependent)
            .ok_or_else(|| FormError::NoClosedForm(dependent.name().to_string()))?;

        Ok(solved.diff(&input)?)
    }
}

/// The `beta[i]*x[i]^alpha` building block of the combinations.
fn monomial(registry: &Registry, i: usize) -> Expr {
    let coeff = Expr::sym(&registry.coefficients().members()[i]);
    let input = Expr::sym(&registry.inputs().members()[i]);
    let exponent = match registry.exponent() {
        Binding::Family(family) => Expr::sym(&family.members()[i]),
        Binding::Scalar(symbol) => Expr::sym(symbol),
    };

    Expr::mul(vec![coeff, Expr::pow(input, exponent)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Symbol;

    fn symbolic_form(kind: FormKind, num_inputs: usize) -> FunctionalForm {
        let mut config = FormConfig::default();
        config.set_num_inputs(num_inputs);
        FunctionalForm::new(kind, &config).unwrap()
    }

    fn neutral_form(kind: FormKind, num_inputs: usize) -> FunctionalForm {
        let mut config = FormConfig::default();
        config
            .set_num_inputs(num_inputs)
            .set_coeff_values(Directive::Neutral)
            .set_exponent_values(Directive::Neutral);
        FunctionalForm::new(kind, &config).unwrap()
    }

    fn plain_sum(form: &FunctionalForm) -> Expr {
        let registry = form.registry();
        let mut terms: Vec<Expr> = registry.inputs().members().iter().map(Expr::sym).collect();
        terms.push(Expr::sym(registry.constant()));
        terms.push(Expr::neg(Expr::sym(registry.dependent())));
        Expr::add(terms)
    }

    #[test]
    fn neutral_additive_reduces_to_plain_sum() {
        for num_inputs in 1..=3 {
            let form = neutral_form(FormKind::Additive, num_inputs);
            assert_eq!(form.expr(), &plain_sum(&form));
        }
    }

    #[test]
    fn neutral_multiplicative_reduces_to_plain_product() {
        for num_inputs in 1..=3 {
            let form = neutral_form(FormKind::Multiplicative, num_inputs);

            let registry = form.registry();
            let product =
                Expr::mul(registry.inputs().members().iter().map(Expr::sym).collect());
            let expected = product + Expr::sym(registry.constant())
                - Expr::sym(registry.dependent());

            assert_eq!(form.expr(), &expected);
        }
    }

    #[test]
    fn neutral_minimum_reduces_to_plain_minimum() {
        let form = neutral_form(FormKind::Minimum, 2);

        let registry = form.registry();
        let expected = Expr::min_of(registry.inputs().members().iter().map(Expr::sym).collect())
            - Expr::sym(registry.dependent());

        assert_eq!(form.expr(), &expected);
    }

    #[test]
    fn neutral_ces_reduces_to_plain_sum() {
        // With rho = 1 the outer power collapses.
        let form = neutral_form(FormKind::Ces, 2);
        assert_eq!(form.expr(), &plain_sum(&form));
    }

    #[test]
    fn zero_input_additive_is_constant_minus_dependent() {
        let form = symbolic_form(FormKind::Additive, 0);

        let registry = form.registry();
        let expected =
            Expr::sym(registry.constant()) - Expr::sym(registry.dependent());

        assert_eq!(form.expr(), &expected);
    }

    #[test]
    fn zero_input_multiplicative_keeps_the_unit_product() {
        let form = symbolic_form(FormKind::Multiplicative, 0);

        let registry = form.registry();
        let expected = Expr::sym(registry.constant()) - Expr::sym(registry.dependent())
            + Expr::Num(1.0);

        assert_eq!(form.expr(), &expected);
    }

    #[test]
    fn zero_input_minimum_is_infinite() {
        let form = symbolic_form(FormKind::Minimum, 0);

        let registry = form.registry();
        let expected = Expr::Num(f64::INFINITY) - Expr::sym(registry.dependent());

        assert_eq!(form.expr(), &expected);
    }

    #[test]
    fn multiplicative_regression_case() {
        // coefficients (2, 3), exponents (1, 2), dependent 1, constant `c`:
        // the form is c + 6*x[0]*x[1]^2 - 1.
        let mut config = FormConfig::default();
        config
            .set_constant_name("c".to_string())
            .set_coeff_values(Directive::values([2.0, 3.0]))
            .set_exponent_values(Directive::values([1.0, 2.0]))
            .set_dependent_value(Directive::scalar(1.0));

        let form = FunctionalForm::multiplicative(&config).unwrap();

        let registry = form.registry();
        let x0 = Expr::sym(registry.input(0).unwrap());
        let x1 = Expr::sym(registry.input(1).unwrap());
        let expected = Expr::add(vec![
            Expr::Num(-1.0),
            Expr::sym(registry.constant()),
            Expr::mul(vec![Expr::Num(6.0), x0, Expr::pow(x1, Expr::Num(2.0))]),
        ]);

        assert_eq!(form.expr(), &expected);
        assert_eq!(form.expr().to_string(), "-1 + c + 6*x[0]*x[1]^2");
    }

    #[test]
    fn evaluate_substitutes_inputs_and_constant() {
        // Cobb-Douglas with coefficients (2, 2) and exponents (2, 2) at
        // x = (1, 1), C = 1 evaluates to 5.
        let mut config = FormConfig::default();
        config
            .set_coeff_values(Directive::values([2.0, 2.0]))
            .set_exponent_values(Directive::values([2.0, 2.0]));

        let form = FunctionalForm::multiplicative(&config).unwrap();
        let value = form.evaluate(&Slot::values([1.0, 1.0]), 1.0).unwrap();

        assert_eq!(value.as_number(), Some(5.0));
    }

    #[test]
    fn evaluate_accepts_held_slots() {
        let mut config = FormConfig::default();
        config
            .set_coeff_values(Directive::Neutral)
            .set_exponent_values(Directive::Neutral);

        let form = FunctionalForm::additive(&config).unwrap();
        let value = form
            .evaluate(&[Slot::Hold, Slot::Value(Expr::Num(3.0))], 0.0)
            .unwrap();

        let x0 = form.registry().input(0).unwrap();
        assert_eq!(value, Expr::add(vec![Expr::Num(3.0), Expr::sym(x0)]));
    }

    #[test]
    fn marginal_of_cobb_douglas() {
        // U = beta[0]*beta[1]*x[0]^2*x[1]^2, so dU/dx[0] is
        // 2*beta[0]*beta[1]*x[0]*x[1]^2.
        let mut config = FormConfig::default();
        config
            .set_dependent_name("U".to_string())
            .set_exponent_values(Directive::values([2.0, 2.0]));

        let form = FunctionalForm::multiplicative(&config).unwrap();
        let marginal = form.marginal(0, &DirectiveSet::new()).unwrap();

        let registry = form.registry();
        let expected = Expr::mul(vec![
            Expr::Num(2.0),
            Expr::sym(&registry.coefficients().members()[0]),
            Expr::sym(&registry.coefficients().members()[1]),
            Expr::sym(registry.input(0).unwrap()),
            Expr::pow(Expr::sym(registry.input(1).unwrap()), Expr::Num(2.0)),
        ]);

        assert_eq!(marginal, expected);
    }

    #[test]
    fn ratio_of_marginals_is_the_input_ratio() {
        let mut config = FormConfig::default();
        config.set_exponent_values(Directive::values([2.0, 2.0]));

        let form = FunctionalForm::multiplicative(&config).unwrap();
        let m0 = form.marginal(0, &DirectiveSet::new()).unwrap();
        let m1 = form.marginal(1, &DirectiveSet::new()).unwrap();

        let registry = form.registry();
        let x0 = Expr::sym(registry.input(0).unwrap());
        let x1 = Expr::sym(registry.input(1).unwrap());

        assert_eq!(Expr::div(m0, m1), Expr::div(x1, x0));
    }

    #[test]
    fn level_curve_solves_for_the_held_input() {
        // x[0] + x[1] = level with C = 0: x[0] = level - x[1].
        let mut config = FormConfig::default();
        config
            .set_coeff_values(Directive::Neutral)
            .set_exponent_values(Directive::Neutral);

        let form = FunctionalForm::additive(&config).unwrap();
        let level = Symbol::new("u0");
        let curve = form.level_curve(0, 0.0, Expr::sym(&level)).unwrap();

        let x1 = form.registry().input(1).unwrap().clone();
        assert!(curve.contains(&level));
        let at_point = curve
            .subs_single(&x1, Expr::Num(3.0))
            .subs_single(&level, Expr::Num(10.0));
        assert_eq!(at_point.as_number(), Some(7.0));
    }

    #[test]
    fn ces_exponent_is_shared_and_scalar() {
        let form = symbolic_form(FormKind::Ces, 2);

        match form.registry().exponent() {
            Binding::Scalar(symbol) => assert_eq!(symbol.name(), "alpha"),
            Binding::Family(_) => panic!("CES exponent must be scalar"),
        }
    }

    #[test]
    fn ces_rejects_tuple_exponent_loudly() {
        // An empty-tuple exponent directive is a shape error even with zero
        // inputs; rho is a scalar, not a family.
        let mut config = FormConfig::default();
        config
            .set_num_inputs(0)
            .set_exponent_values(Directive::Tuple(Vec::new()));

        let result = FunctionalForm::ces(&config);
        assert!(matches!(
            result,
            Err(FormError::Subst(SubstError::TupleForScalar { len: 0, .. }))
        ));
    }

    #[test]
    fn unknown_form_name_is_a_configuration_error() {
        let result = "translog".parse::<FormKind>();
        assert!(matches!(result, Err(FormError::UnsupportedForm(name)) if name == "translog"));
    }

    #[test]
    fn aliases_parse_to_their_kinds() {
        assert_eq!("cobb-douglas".parse::<FormKind>().unwrap(), FormKind::Multiplicative);
        assert_eq!("substitutes".parse::<FormKind>().unwrap(), FormKind::Additive);
        assert_eq!("complements".parse::<FormKind>().unwrap(), FormKind::Minimum);
        assert_eq!("ces".parse::<FormKind>().unwrap(), FormKind::Ces);
    }

    #[test]
    fn quasi_linear_is_declared_but_unimplemented() {
        let config = FormConfig::default();
        let result = FunctionalForm::new(FormKind::QuasiLinear, &config);

        assert!(matches!(
            result,
            Err(FormError::Unimplemented(FormKind::QuasiLinear))
        ));
    }

    #[test]
    fn raw_template_is_retained() {
        let mut config = FormConfig::default();
        config.set_coeff_values(Directive::Neutral);

        let form = FunctionalForm::additive(&config).unwrap();

        // The raw template still mentions the coefficients; the substituted
        // expression does not.
        let beta0 = &form.registry().coefficients().members()[0];
        assert!(form.raw().contains(beta0));
        assert!(!form.expr().contains(beta0));
    }
}
