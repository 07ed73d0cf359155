//! Symbolic differentiation.

use thiserror::Error;

use crate::expr::Expr;
use crate::symbols::Symbol;

/// Error when an expression has no closed-form derivative.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The expression is not differentiable with the supported rules, for
    /// example a `min` of the differentiation symbol or a power whose
    /// exponent depends on it.
    #[error("`{0}` has no closed-form derivative")]
    Unsupported(Expr),
}

impl Expr {
    /// Differentiates the expression with respect to the given symbol.
    ///
    /// Sums, products and powers with exponents free of `symbol` are
    /// supported. `min`/`max` and piecewise expressions that mention
    /// `symbol` have no closed-form derivative and fail with
    /// [`DiffError::Unsupported`].
    pub fn diff(&self, symbol: &Symbol) -> Result<Expr, DiffError> {
        if !self.contains(symbol) {
            return Ok(Expr::Num(0.0));
        }

        match self {
            Expr::Num(_) => Ok(Expr::Num(0.0)),
            Expr::Sym(_) => Ok(Expr::Num(1.0)),
            Expr::Add(terms) => {
                let derived = terms
                    .iter()
                    .map(|term| term.diff(symbol))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::add(derived))
            }
            Expr::Mul(factors) => {
                // Product rule over all factors that mention the symbol.
                let mut terms = Vec::new();
                for (i, factor) in factors.iter().enumerate() {
                    if !factor.contains(symbol) {
                        continue;
                    }
                    let mut parts = factors.clone();
                    parts[i] = factor.diff(symbol)?;
                    terms.push(Expr::mul(parts));
                }
                Ok(Expr::add(terms))
            }
            Expr::Pow(base, exponent) => {
                if exponent.contains(symbol) {
                    return Err(DiffError::Unsupported(self.clone()));
                }
                // d/dx b^e = e * b^(e-1) * db/dx for e free of x.
                let e = (**exponent).clone();
                let lowered = Expr::pow((**base).clone(), Expr::sub(e.clone(), Expr::Num(1.0)));
                Ok(Expr::mul(vec![e, lowered, base.diff(symbol)?]))
            }
            Expr::Min(_) | Expr::Max(_) | Expr::Piecewise(_) => {
                Err(DiffError::Unsupported(self.clone()))
            }
        }
    }
}
