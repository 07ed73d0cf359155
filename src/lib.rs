#![warn(missing_docs)]

//! # Econsym
//!
//! A pure Rust symbolic-mathematics toolkit for microeconomic theory.
//!
//! This library builds the standard objects of consumer and producer theory
//! as symbolic expressions: parameterized functional forms (additive,
//! multiplicative/Cobb-Douglas, minimum/perfect complements, CES), utility
//! and production functions, budget constraints, and a Lagrangian solver
//! that derives closed-form optimal allocations. Everything stays symbolic
//! until values are substituted in; there is no numerical optimization
//! anywhere.
//!
//! ## Functional forms
//!
//! A [functional form](FunctionalForm) is a homogeneous equation
//! `combination(x; beta, alpha) + C - Y = 0` over indexed input symbols. The
//! shape of the combination is chosen by [`FormKind`]:
//!
//! * [Additive](FormKind::Additive) -- `sum_i beta[i]*x[i]^alpha[i]`, the
//!   perfect-substitutes family.
//! * [Multiplicative](FormKind::Multiplicative) -- `prod_i
//!   beta[i]*x[i]^alpha[i]`, the Cobb-Douglas family.
//! * [Minimum](FormKind::Minimum) -- `min_i beta[i]*x[i]`, the
//!   perfect-complements (Leontief) family.
//! * [CES](FormKind::Ces) -- `(sum_i beta[i]*x[i]^rho)^(1/rho)` with a
//!   single shared exponent.
//!
//! Every parameter is a symbol first. A [`FormConfig`] decides, through
//! value [directives](Directive), which parameters keep their symbols and
//! which are replaced by values at construction:
//!
//! ```rust
//! use econsym::{Directive, FormConfig, FunctionalForm, Slot};
//!
//! let mut config = FormConfig::default();
//! config
//!     .set_coeff_values(Directive::values([2.0, 2.0]))
//!     .set_exponent_values(Directive::values([2.0, 2.0]));
//!
//! // 4*x[0]^2*x[1]^2 + C - Y = 0
//! let form = FunctionalForm::multiplicative(&config).unwrap();
//!
//! // Solve for Y and evaluate at x = (1, 1) with C = 1.
//! let value = form.evaluate(&Slot::values([1.0, 1.0]), 1.0).unwrap();
//! assert_eq!(value.as_number(), Some(5.0));
//! ```
//!
//! The [`Utility`], [`Production`] and [`BudgetConstraint`] types specialize
//! forms with the conventional economic names and expose domain queries such
//! as [`marginal_utility`](Utility::marginal_utility) and
//! [`indifference_curve`](Utility::indifference_curve).
//!
//! ## Constrained optimization
//!
//! [`maximize`] solves the utility maximization problem with the Lagrangian
//! method, in closed form. The [`Consumer`] agent wraps the whole lifecycle:
//!
//! ```rust
//! use econsym::{BudgetConstraint, Consumer, Directive, FormKind, Utility};
//!
//! // U = x[0]*x[1]
//! let mut utility_config = Utility::config();
//! utility_config
//!     .set_coeff_values(Directive::Neutral)
//!     .set_exponent_values(Directive::Neutral)
//!     .set_constant_value(Directive::scalar(0.0));
//! let utility = Utility::new(FormKind::Multiplicative, &utility_config).unwrap();
//!
//! // 2*x[0] + 4*x[1] = 64
//! let mut constraint_config = BudgetConstraint::config();
//! constraint_config
//!     .set_coeff_values(Directive::values([2.0, 4.0]))
//!     .set_dependent_value(Directive::scalar(64.0))
//!     .set_constant_value(Directive::scalar(0.0));
//! let constraint = BudgetConstraint::new(&constraint_config).unwrap();
//!
//! let mut consumer = Consumer::with_functions(utility, constraint);
//! consumer.maximize_utility().unwrap();
//!
//! // Equal exponents split the budget equally across the goods.
//! assert_eq!(consumer.demand_quantity(0).unwrap().as_number(), Some(16.0));
//! assert_eq!(consumer.demand_quantity(1).unwrap().as_number(), Some(8.0));
//! ```
//!
//! Linear objectives are handled by the corner path: with numeric
//! parameters, all spending goes to the good with the strictly highest
//! utility per dollar; with symbolic parameters or ties, the allocation is
//! encoded as a piecewise expression over the candidate corners. Problems
//! whose first-order conditions cannot be inverted in closed form report
//! [`SolveError::TooComplex`] instead of silently approximating.
//!
//! ## Symbols and substitution
//!
//! Symbols are identified by name: two registries built with the same role
//! names produce interchangeable symbols, which is what lets an objective
//! and a constraint share their inputs. See [`Registry`] for the role layout
//! and [`substitute`] for the directive-driven substitution engine.

pub mod agent;
pub mod expr;
pub mod forms;
pub mod optimize;
pub mod subst;
pub mod symbols;

pub use agent::{AgentError, Consumer};
pub use expr::{Cond, DiffError, Expr};
pub use forms::{
    BudgetConstraint, FormConfig, FormError, FormKind, FunctionalForm, Production, Utility,
};
pub use optimize::{is_linear, is_quasilinear, maximize, Allocation, SolveError};
pub use subst::{substitute, Directive, DirectiveSet, Slot, SubstError};
pub use symbols::{Binding, ExponentShape, Family, Registry, Role, RoleNames, Symbol};
