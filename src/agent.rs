//! Economic agents built on top of the form library.
//!
//! [`Consumer`] ties a utility function to a budget constraint and exposes
//! the standard consumer-theory queries. The optimal allocation is computed
//! on first demand and cached; replacing either side of the problem discards
//! the cache.

use thiserror::Error;

use crate::expr::{DiffError, Expr};
use crate::forms::{BudgetConstraint, FormError, FormKind, Utility};
use crate::optimize::{maximize, Allocation, SolveError};
use crate::symbols::Symbol;

/// Error of an agent query.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A query that needs the optimal allocation was made before
    /// `maximize_utility`.
    #[error("the utility maximization problem has not been solved yet")]
    NotSolved,
    /// Building or querying one of the agent's forms failed.
    #[error(transparent)]
    Form(#[from] FormError),
    /// The maximization problem could not be solved.
    #[error(transparent)]
    Solve(#[from] SolveError),
    /// A derivative could not be taken in closed form.
    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// A consumer: a utility function over goods, a budget constraint over the
/// same goods, and the lazily computed optimal allocation.
#[derive(Clone, Debug)]
pub struct Consumer {
    utility: Utility,
    constraint: BudgetConstraint,
    allocation: Option<Allocation>,
}

impl Consumer {
    /// Creates a consumer with fully symbolic utility of the given shape and
    /// a symbolic budget constraint over `num_goods` goods.
    pub fn new(num_goods: usize, kind: FormKind) -> Result<Self, AgentError> {
        let mut utility_config = Utility::config();
        utility_config.set_num_inputs(num_goods);
        let utility = Utility::new(kind, &utility_config)?;

        let mut constraint_config = BudgetConstraint::config();
        constraint_config.set_num_inputs(num_goods);
        let constraint = BudgetConstraint::new(&constraint_config)?;

        Ok(Self {
            utility,
            constraint,
            allocation: None,
        })
    }

    /// Creates a consumer from already configured functions.
    pub fn with_functions(utility: Utility, constraint: BudgetConstraint) -> Self {
        Self {
            utility,
            constraint,
            allocation: None,
        }
    }

    /// Gets the consumer's utility function.
    pub fn utility(&self) -> &Utility {
        &self.utility
    }

    /// Gets the consumer's budget constraint.
    pub fn constraint(&self) -> &BudgetConstraint {
        &self.constraint
    }

    /// Replaces the utility function, discarding any cached allocation.
    pub fn set_utility(&mut self, utility: Utility) {
        self.utility = utility;
        self.allocation = None;
    }

    /// Replaces the budget constraint, discarding any cached allocation.
    pub fn set_constraint(&mut self, constraint: BudgetConstraint) {
        self.constraint = constraint;
        self.allocation = None;
    }

    /// Gets the cached optimal allocation, if one has been computed.
    pub fn allocation(&self) -> Option<&Allocation> {
        self.allocation.as_ref()
    }

    /// Solves the utility maximization problem, caching the allocation.
    /// Subsequent calls return the cached result.
    pub fn maximize_utility(&mut self) -> Result<&Allocation, AgentError> {
        if self.allocation.is_none() {
            let allocation = maximize(self.utility.form(), self.constraint.form())?;
            self.allocation = Some(allocation);
        }
        self.allocation.as_ref().ok_or(AgentError::NotSolved)
    }

    /// Gets the demand for good `index` in homogeneous form: an expression
    /// that is zero when the good's quantity equals its optimal value.
    pub fn demand(&self, index: usize) -> Result<Expr, AgentError> {
        let allocation = self.allocation.as_ref().ok_or(AgentError::NotSolved)?;
        let (symbol, value) = self.good(allocation, index)?;
        Ok(Expr::sym(symbol) - value.clone())
    }

    /// Gets the optimal quantity of good `index`.
    pub fn demand_quantity(&self, index: usize) -> Result<Expr, AgentError> {
        let allocation = self.allocation.as_ref().ok_or(AgentError::NotSolved)?;
        let (_, value) = self.good(allocation, index)?;
        Ok(value.clone())
    }

    /// Computes the elasticity of the demand for good `index` with respect
    /// to `variable`, as `(dq/dv) * v/q`.
    ///
    /// With `point = Some((quantity, value))` the elasticity is evaluated at
    /// that quantity and variable value; with `None` it stays symbolic, with
    /// the optimal quantity itself in the denominator.
    pub fn elasticity(
        &self,
        index: usize,
        variable: &Symbol,
        point: Option<(Expr, Expr)>,
    ) -> Result<Expr, AgentError> {
        let allocation = self.allocation.as_ref().ok_or(AgentError::NotSolved)?;
        let (_, quantity) = self.good(allocation, index)?;

        let slope = quantity.diff(variable)?;
        let (at_quantity, at_value) = match point {
            Some(point) => point,
            None => (quantity.clone(), Expr::sym(variable)),
        };

        Ok(Expr::div(slope * at_value, at_quantity))
    }

    fn good<'a>(
        &self,
        allocation: &'a Allocation,
        index: usize,
    ) -> Result<(&'a Symbol, &'a Expr), AgentError> {
        match (allocation.symbol(index), allocation.quantity(index)) {
            (Some(symbol), Some(value)) => Ok((symbol, value)),
            _ => Err(AgentError::Form(FormError::BadIndex {
                index,
                num_inputs: allocation.len(),
            })),
        }
    }
}
