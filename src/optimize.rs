//! Constrained optimization of functional forms by the Lagrangian method.
//!
//! [`maximize`] takes an objective form and a constraint form over the same
//! inputs, builds `L = U - lambda*B` from the solved objective `U` and the
//! homogeneous constraint `B`, and solves the first-order conditions in
//! closed form. Linear objectives take the corner path (all spending goes to
//! the good with the highest utility per dollar); non-linear objectives take
//! the interior path (the multiplier is eliminated through marginal-utility
//! ratios). Problems without a reachable closed form report
//! [`SolveError::TooComplex`] rather than an approximation.

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::expr::{Cond, DiffError, Expr};
use crate::forms::{FormError, FunctionalForm};
use crate::symbols::Symbol;

/// Error of the Lagrangian solver.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The objective and the constraint have different numbers of inputs.
    #[error("objective has {objective} inputs but constraint has {constraint}")]
    DimensionMismatch {
        /// Number of inputs of the objective.
        objective: usize,
        /// Number of inputs of the constraint.
        constraint: usize,
    },
    /// The objective and the constraint do not share their input symbols.
    #[error("objective and constraint inputs are distinct symbols")]
    InputMismatch,
    /// No closed-form solution was reached. The problem may still have one
    /// outside the implemented elimination steps.
    #[error("no closed-form solution found")]
    TooComplex,
    /// Querying one of the forms failed.
    #[error(transparent)]
    Form(#[from] FormError),
}

/// The solved allocation: a closed-form value per input symbol plus the
/// value of the multiplier.
#[derive(Clone, Debug)]
pub struct Allocation {
    quantities: Vec<(Symbol, Expr)>,
    multiplier_symbol: Symbol,
    multiplier: Expr,
}

impl Allocation {
    /// Gets the number of allocated inputs.
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Checks whether the allocation covers no inputs.
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Gets the value allocated to the input at `index`.
    pub fn quantity(&self, index: usize) -> Option<&Expr> {
        self.quantities.get(index).map(|(_, value)| value)
    }

    /// Gets the input symbol at `index`.
    pub fn symbol(&self, index: usize) -> Option<&Symbol> {
        self.quantities.get(index).map(|(symbol, _)| symbol)
    }

    /// Gets the value allocated to the given input symbol.
    pub fn get(&self, symbol: &Symbol) -> Option<&Expr> {
        self.quantities
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, value)| value)
    }

    /// Iterates over the input symbols and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Expr)> {
        self.quantities.iter().map(|(symbol, value)| (symbol, value))
    }

    /// Gets the value of the multiplier at the optimum.
    pub fn multiplier(&self) -> &Expr {
        &self.multiplier
    }

    /// Gets the symbol the multiplier was introduced under.
    pub fn multiplier_symbol(&self) -> &Symbol {
        &self.multiplier_symbol
    }
}

/// Checks whether the expression is linear in all of the given symbols:
/// every second partial derivative over them, cross pairs included, is
/// identically zero.
pub fn is_linear(expr: &Expr, symbols: &[Symbol]) -> Result<bool, DiffError> {
    for (i, first) in symbols.iter().enumerate() {
        for second in &symbols[i..] {
            if !expr.diff(first)?.diff(second)?.is_zero() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Checks whether the expression is quasi-linear over the given symbols:
/// non-linear overall but linear in at least one symbol, with no interaction
/// between that symbol and the others.
pub fn is_quasilinear(expr: &Expr, symbols: &[Symbol]) -> Result<bool, DiffError> {
    if is_linear(expr, symbols)? {
        return Ok(false);
    }

    for symbol in symbols {
        let own = expr.diff(symbol)?;
        if !own.diff(symbol)?.is_zero() {
            continue;
        }
        let interacts = symbols
            .iter()
            .filter(|other| *other != symbol)
            .any(|other| own.contains(other));
        if !interacts {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Maximizes the objective form subject to the constraint form.
///
/// The objective is solved for its dependent variable; the constraint is
/// used in its homogeneous `spending + C - M` shape. Both forms must be
/// built over the same number of inputs with identical input symbols.
pub fn maximize(
    objective: &FunctionalForm,
    constraint: &FunctionalForm,
) -> Result<Allocation, SolveError> {
    let num_inputs = objective.num_inputs();
    if num_inputs != constraint.num_inputs() {
        return Err(SolveError::DimensionMismatch {
            objective: num_inputs,
            constraint: constraint.num_inputs(),
        });
    }
    if objective.registry().inputs() != constraint.registry().inputs() {
        return Err(SolveError::InputMismatch);
    }
    if num_inputs == 0 {
        return Err(SolveError::TooComplex);
    }

    let inputs: Vec<Symbol> = objective.registry().inputs().members().to_vec();
    let utility = objective.solve_dependent()?;
    let budget = constraint.expr().clone();
    let multiplier = Symbol::nonnegative("lambda");

    debug!("maximizing over {} inputs", num_inputs);

    let linear = is_linear(&utility, &inputs).map_err(|_| SolveError::TooComplex)?;
    if linear {
        corner_solution(&utility, &budget, &inputs, multiplier)
    } else {
        interior_solution(&utility, &budget, &inputs, multiplier)
    }
}

/// Corner path for objectives linear in every input.
///
/// The first-order condition of good `i` gives its utility per dollar
/// `upd_i = U_i / B_i`. When every `upd_i` is numeric and one of them is a
/// strict maximum, all available funds go to that good. Ties and symbolic
/// ratios fall back to a two-branch piecewise value per good, keyed on that
/// good attaining the maximum.
fn corner_solution(
    utility: &Expr,
    budget: &Expr,
    inputs: &[Symbol],
    multiplier: Symbol,
) -> Result<Allocation, SolveError> {
    let mut per_dollar = Vec::with_capacity(inputs.len());
    let mut prices = Vec::with_capacity(inputs.len());

    for input in inputs {
        let marginal = utility.diff(input).map_err(|_| SolveError::TooComplex)?;
        let price = budget.diff(input).map_err(|_| SolveError::TooComplex)?;
        let foc = marginal - Expr::sym(&multiplier) * price.clone();
        let upd = foc
            .solve_linear(&multiplier)
            .ok_or(SolveError::TooComplex)?;

        debug!("utility per dollar of {}: {}", input, upd);
        per_dollar.push(upd);
        prices.push(price);
    }

    // Funds left when nothing is bought.
    let zeros: HashMap<Symbol, Expr> = inputs
        .iter()
        .map(|input| (input.clone(), Expr::Num(0.0)))
        .collect();
    let available = Expr::neg(budget.subs(&zeros));

    let numeric: Vec<Option<f64>> = per_dollar.iter().map(Expr::as_number).collect();
    if let Some(values) = numeric.into_iter().collect::<Option<Vec<f64>>>() {
        let best = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let winners: Vec<usize> = (0..values.len())
            .filter(|&i| values[i] == best)
            .collect();

        if let [winner] = winners[..] {
            debug!("strict winner: {}", inputs[winner]);
            let quantities = inputs
                .iter()
                .enumerate()
                .map(|(i, input)| {
                    let value = if i == winner {
                        Expr::div(available.clone(), prices[i].clone())
                    } else {
                        Expr::Num(0.0)
                    };
                    (input.clone(), value)
                })
                .collect();

            return Ok(Allocation {
                quantities,
                multiplier_symbol: multiplier,
                multiplier: per_dollar.swap_remove(winner),
            });
        }
    }

    // Symbolic ratios or a tie: encode each quantity as a piecewise value
    // conditional on its good attaining the best utility per dollar.
    debug!("no strict numeric winner, encoding piecewise");
    let best = Expr::max_of(per_dollar.clone());
    let quantities = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let value = Expr::piecewise(vec![
                (
                    Expr::div(available.clone(), prices[i].clone()),
                    Cond::ge(per_dollar[i].clone(), best.clone()),
                ),
                (Expr::Num(0.0), Cond::True),
            ]);
            (input.clone(), value)
        })
        .collect();

    Ok(Allocation {
        quantities,
        multiplier_symbol: multiplier,
        multiplier: best,
    })
}

/// Interior path for non-linear objectives.
///
/// The multiplier is eliminated by equating marginal-utility ratios to
/// price ratios, each `x_i` is isolated in terms of `x_0`, the results are
/// substituted into the budget and the budget is solved for `x_0`.
fn interior_solution(
    utility: &Expr,
    budget: &Expr,
    inputs: &[Symbol],
    multiplier: Symbol,
) -> Result<Allocation, SolveError> {
    let first = &inputs[0];
    let mu_first = utility.diff(first).map_err(|_| SolveError::TooComplex)?;
    let price_first = budget.diff(first).map_err(|_| SolveError::TooComplex)?;

    // x_i as a function of x_0, from MU_i/MU_0 = B_i/B_0.
    let mut in_terms_of_first = Vec::with_capacity(inputs.len() - 1);
    for input in &inputs[1..] {
        let mu = utility.diff(input).map_err(|_| SolveError::TooComplex)?;
        let price = budget.diff(input).map_err(|_| SolveError::TooComplex)?;

        let ratios = Expr::div(mu, mu_first.clone())
            - Expr::div(price, price_first.clone());
        let solution = ratios.solve_for(input).ok_or(SolveError::TooComplex)?;

        debug!("eliminated {}: {}", input, solution);
        in_terms_of_first.push((input.clone(), solution));
    }

    let reduced_map: HashMap<Symbol, Expr> = in_terms_of_first.iter().cloned().collect();
    let reduced_budget = budget.subs(&reduced_map);
    let first_value = reduced_budget
        .solve_for(first)
        .ok_or(SolveError::TooComplex)?;

    debug!("budget solved for {}: {}", first, first_value);

    let mut values = Vec::with_capacity(inputs.len());
    values.push((first.clone(), first_value.clone()));
    for (input, solution) in in_terms_of_first {
        values.push((input, solution.subs_single(first, first_value.clone())));
    }

    let optimum: HashMap<Symbol, Expr> = values.iter().cloned().collect();
    let multiplier_value = Expr::div(mu_first, price_first).subs(&optimum);

    // The closed forms must not mention the inputs or the multiplier.
    let leftover = values
        .iter()
        .map(|(_, value)| value)
        .chain([&multiplier_value])
        .any(|value| value.contains(&multiplier) || value.contains_any(inputs));
    if leftover {
        return Err(SolveError::TooComplex);
    }

    Ok(Allocation {
        quantities: values,
        multiplier_symbol: multiplier,
        multiplier: multiplier_value,
    })
}
