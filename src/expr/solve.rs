//! Equation solving by linear inversion and isolation.

use crate::expr::Expr;
use crate::symbols::Symbol;

impl Expr {
    /// Solves `self == 0` for `symbol` when the equation is linear in it.
    ///
    /// Returns `None` when the symbol is absent or enters non-linearly.
    pub(crate) fn solve_linear(&self, symbol: &Symbol) -> Option<Expr> {
        let slope = self.diff(symbol).ok()?;
        if slope.is_zero() || slope.contains(symbol) {
            return None;
        }

        // a*x + b == 0  =>  x = -b/a
        let intercept = self.subs_single(symbol, Expr::Num(0.0));
        Some(Expr::neg(Expr::div(intercept, slope)))
    }

    /// Solves `self == 0` for `symbol`, returning a closed form if one is
    /// found.
    ///
    /// The linear case is inverted directly; otherwise the symbol is isolated
    /// structurally: free summands are moved across, free factors divided
    /// out, and powers inverted (exponents must be free of the symbol).
    /// Returns `None` when the symbol occurs in more than one summand or
    /// factor after canonicalization.
    pub fn solve_for(&self, symbol: &Symbol) -> Option<Expr> {
        if let Some(solution) = self.solve_linear(symbol) {
            return Some(solution);
        }
        isolate(self.clone(), Expr::Num(0.0), symbol)
    }
}

fn isolate(lhs: Expr, rhs: Expr, symbol: &Symbol) -> Option<Expr> {
    match lhs {
        Expr::Sym(s) if &s == symbol => Some(rhs),
        Expr::Add(terms) => {
            let (dependent, free): (Vec<_>, Vec<_>) =
                terms.into_iter().partition(|term| term.contains(symbol));
            if dependent.len() != 1 {
                return None;
            }
            let moved = Expr::sub(rhs, Expr::add(free));
            isolate(dependent.into_iter().next()?, moved, symbol)
        }
        Expr::Mul(factors) => {
            let (dependent, free): (Vec<_>, Vec<_>) =
                factors.into_iter().partition(|factor| factor.contains(symbol));
            if dependent.len() != 1 {
                return None;
            }
            let divided = Expr::div(rhs, Expr::mul(free));
            isolate(dependent.into_iter().next()?, divided, symbol)
        }
        Expr::Pow(base, exponent) => {
            if exponent.contains(symbol) {
                return None;
            }
            let inverted = Expr::pow(rhs, Expr::div(Expr::Num(1.0), *exponent));
            isolate(*base, inverted, symbol)
        }
        _ => None,
    }
}
