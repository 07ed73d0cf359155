//! Symbolic expressions with canonicalizing constructors.
//!
//! [`Expr`] is the algebraic substrate of the functional forms: an n-ary
//! expression tree with smart constructors that keep every expression in a
//! canonical shape. Canonicalization does the algebra that the economic
//! queries rely on, without a separate "simplify" pass:
//!
//! * [`Expr::add`] flattens nested sums, folds numeric terms, distributes
//!   numeric coefficients over nested sums and collects like terms by their
//!   symbolic part;
//! * [`Expr::mul`] flattens nested products, folds numeric factors and sums
//!   exponents per base, which is what cancels the shared factors in
//!   marginal-utility ratios;
//! * [`Expr::pow`] collapses nested powers and distributes over products.
//!
//! All symbols are real-valued, and bases of symbolic powers are treated as
//! positive reals (quantities, prices, shares), which licenses
//! `(a*b)^e = a^e * b^e` and `(a^e)^f = a^(e*f)`.
//!
//! Equality is structural, and because construction is canonical, two
//! expressions built from the same algebra in different orders compare equal.

mod diff;
mod display;
mod solve;

pub use diff::DiffError;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops;

use num_traits::{One, Zero};

use crate::symbols::Symbol;

/// A symbolic expression in canonical form.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A numeric constant.
    Num(f64),
    /// A free symbol.
    Sym(Symbol),
    /// An n-ary sum.
    Add(Vec<Expr>),
    /// An n-ary product.
    Mul(Vec<Expr>),
    /// A power `base^exponent`.
    Pow(Box<Expr>, Box<Expr>),
    /// The minimum of the arguments.
    Min(Vec<Expr>),
    /// The maximum of the arguments.
    Max(Vec<Expr>),
    /// A piecewise expression: the first branch whose condition holds.
    Piecewise(Vec<(Expr, Cond)>),
}

/// A branch condition of a piecewise expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Cond {
    /// Always holds (the fallback branch).
    True,
    /// Holds when the left side is greater than or equal to the right side.
    Ge(Box<Expr>, Box<Expr>),
}

impl Cond {
    /// Creates a `lhs >= rhs` condition.
    pub fn ge(lhs: Expr, rhs: Expr) -> Self {
        Cond::Ge(Box::new(lhs), Box::new(rhs))
    }

    /// Whether the condition mentions the given symbol.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        match self {
            Cond::True => false,
            Cond::Ge(lhs, rhs) => lhs.contains(symbol) || rhs.contains(symbol),
        }
    }

    fn subs(&self, map: &HashMap<Symbol, Expr>) -> Self {
        match self {
            Cond::True => Cond::True,
            Cond::Ge(lhs, rhs) => Cond::ge(lhs.subs(map), rhs.subs(map)),
        }
    }
}

impl Expr {
    /// Creates a numeric constant.
    pub fn num(value: f64) -> Self {
        Expr::Num(value)
    }

    /// Creates a numeric constant from an integer.
    pub fn int(value: i64) -> Self {
        Expr::Num(value as f64)
    }

    /// Creates a free symbol expression.
    pub fn sym(symbol: &Symbol) -> Self {
        Expr::Sym(symbol.clone())
    }

    /// Creates a canonical sum of the given terms.
    ///
    /// An empty sum is `0`. A numeric coefficient over a nested sum is
    /// distributed before like terms are collected, so `a - (a - 1)` is `1`.
    pub fn add(terms: Vec<Expr>) -> Self {
        let mut constant = 0.0;
        let mut collected: Vec<(Expr, f64)> = Vec::new();
        let mut pending: Vec<(f64, Expr)> =
            terms.into_iter().map(|term| (1.0, term)).collect();

        while let Some((outer, term)) = pending.pop() {
            match term {
                Expr::Num(n) => constant += outer * n,
                Expr::Add(inner) => {
                    pending.extend(inner.into_iter().map(|term| (outer, term)));
                }
                other => {
                    let (coeff, rest) = split_coeff(other);
                    let coeff = outer * coeff;
                    if let Expr::Add(inner) = rest {
                        pending.extend(inner.into_iter().map(|term| (coeff, term)));
                    } else {
                        match collected.iter_mut().find(|entry| entry.0 == rest) {
                            Some(entry) => entry.1 += coeff,
                            None => collected.push((rest, coeff)),
                        }
                    }
                }
            }
        }

        let mut out = Vec::new();
        if !constant.is_zero() {
            out.push(Expr::Num(constant));
        }
        for (rest, coeff) in collected {
            if coeff.is_zero() {
                continue;
            }
            out.push(with_coeff(coeff, rest));
        }

        match out.len() {
            0 => Expr::Num(0.0),
            1 => out.swap_remove(0),
            _ => {
                out.sort_by(cmp_expr);
                Expr::Add(out)
            }
        }
    }

    /// Creates a canonical product of the given factors.
    ///
    /// An empty product is `1`. Factors with a common base have their
    /// exponents summed, so `x * x^-1` cancels to `1`.
    pub fn mul(factors: Vec<Expr>) -> Self {
        let mut flat = Vec::with_capacity(factors.len());
        for factor in factors {
            match factor {
                Expr::Mul(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }

        let mut coeff = 1.0;
        let mut bases: Vec<(Expr, Vec<Expr>)> = Vec::new();

        for factor in flat {
            match factor {
                Expr::Num(n) => coeff *= n,
                Expr::Pow(base, exponent) => add_power(&mut bases, *base, *exponent),
                other => add_power(&mut bases, other, Expr::Num(1.0)),
            }
        }

        if coeff.is_zero() {
            return Expr::Num(0.0);
        }

        let mut out = Vec::new();
        for (base, exponents) in bases {
            match Expr::pow(base, Expr::add(exponents)) {
                Expr::Num(n) => coeff *= n,
                Expr::Mul(inner) => out.extend(inner),
                other => out.push(other),
            }
        }

        if out.is_empty() {
            return Expr::Num(coeff);
        }
        if !coeff.is_one() {
            out.push(Expr::Num(coeff));
        }

        match out.len() {
            1 => out.swap_remove(0),
            _ => {
                out.sort_by(cmp_expr);
                Expr::Mul(out)
            }
        }
    }

    /// Creates a canonical power `base^exponent`.
    ///
    /// Bases are treated as positive reals, so nested powers collapse to a
    /// single power and powers of products distribute over the factors.
    /// `base^0` is `1` (including `0^0`).
    pub fn pow(base: Expr, exponent: Expr) -> Self {
        if exponent.is_zero() {
            return Expr::Num(1.0);
        }
        if exponent.is_one() {
            return base;
        }
        if base.is_one() {
            return Expr::Num(1.0);
        }

        if let (Some(b), Some(e)) = (base.as_number(), exponent.as_number()) {
            let value = b.powf(e);
            if value.is_finite() {
                return Expr::Num(value);
            }
        }

        match base {
            Expr::Pow(inner_base, inner_exponent) => {
                Expr::pow(*inner_base, Expr::mul(vec![*inner_exponent, exponent]))
            }
            Expr::Mul(factors) => Expr::mul(
                factors
                    .into_iter()
                    .map(|factor| Expr::pow(factor, exponent.clone()))
                    .collect(),
            ),
            base => Expr::Pow(Box::new(base), Box::new(exponent)),
        }
    }

    /// Creates the minimum of the given arguments.
    ///
    /// The minimum of no arguments is `+inf`. This is the underlying
    /// convention for an empty extremum, not an economic rule.
    pub fn min_of(args: Vec<Expr>) -> Self {
        Expr::extremum(args, true)
    }

    /// Creates the maximum of the given arguments.
    ///
    /// The maximum of no arguments is `-inf`.
    pub fn max_of(args: Vec<Expr>) -> Self {
        Expr::extremum(args, false)
    }

    fn extremum(args: Vec<Expr>, minimum: bool) -> Self {
        let mut flat = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Expr::Min(inner) if minimum => flat.extend(inner),
                Expr::Max(inner) if !minimum => flat.extend(inner),
                other => flat.push(other),
            }
        }

        let mut numeric: Option<f64> = None;
        let mut rest: Vec<Expr> = Vec::new();

        for arg in flat {
            match arg {
                Expr::Num(n) => {
                    numeric = Some(match numeric {
                        Some(m) if minimum => m.min(n),
                        Some(m) => m.max(n),
                        None => n,
                    });
                }
                other => {
                    if !rest.contains(&other) {
                        rest.push(other);
                    }
                }
            }
        }

        if rest.is_empty() {
            let empty = if minimum {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
            return Expr::Num(numeric.unwrap_or(empty));
        }

        if let Some(n) = numeric {
            rest.push(Expr::Num(n));
        }
        if rest.len() == 1 {
            return rest.swap_remove(0);
        }

        rest.sort_by(cmp_expr);
        if minimum {
            Expr::Min(rest)
        } else {
            Expr::Max(rest)
        }
    }

    /// Creates a piecewise expression from the given branches.
    pub fn piecewise(branches: Vec<(Expr, Cond)>) -> Self {
        Expr::Piecewise(branches)
    }

    /// Creates the negation `-expr`.
    pub fn neg(expr: Expr) -> Self {
        Expr::mul(vec![Expr::Num(-1.0), expr])
    }

    /// Creates the difference `lhs - rhs`.
    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Expr::add(vec![lhs, Expr::neg(rhs)])
    }

    /// Creates the quotient `lhs / rhs`.
    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Expr::mul(vec![lhs, Expr::pow(rhs, Expr::Num(-1.0))])
    }

    /// Whether the expression is the numeric constant `0`.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_zero())
    }

    /// Whether the expression is the numeric constant `1`.
    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_one())
    }

    /// Gets the numeric value if the expression is a constant.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the expression mentions the given symbol.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Sym(s) => s == symbol,
            Expr::Add(items) | Expr::Mul(items) | Expr::Min(items) | Expr::Max(items) => {
                items.iter().any(|item| item.contains(symbol))
            }
            Expr::Pow(base, exponent) => base.contains(symbol) || exponent.contains(symbol),
            Expr::Piecewise(branches) => branches
                .iter()
                .any(|(value, cond)| value.contains(symbol) || cond.contains(symbol)),
        }
    }

    /// Whether the expression mentions any of the given symbols.
    pub fn contains_any<'a, I>(&self, symbols: I) -> bool
    where
        I: IntoIterator<Item = &'a Symbol>,
    {
        symbols.into_iter().any(|symbol| self.contains(symbol))
    }

    /// Substitutes all mapped symbols simultaneously, rebuilding the
    /// expression through the canonicalizing constructors.
    ///
    /// The receiver is not mutated.
    pub fn subs(&self, map: &HashMap<Symbol, Expr>) -> Expr {
        match self {
            Expr::Num(_) => self.clone(),
            Expr::Sym(s) => map.get(s).cloned().unwrap_or_else(|| self.clone()),
            Expr::Add(items) => Expr::add(items.iter().map(|item| item.subs(map)).collect()),
            Expr::Mul(items) => Expr::mul(items.iter().map(|item| item.subs(map)).collect()),
            Expr::Pow(base, exponent) => Expr::pow(base.subs(map), exponent.subs(map)),
            Expr::Min(items) => Expr::min_of(items.iter().map(|item| item.subs(map)).collect()),
            Expr::Max(items) => Expr::max_of(items.iter().map(|item| item.subs(map)).collect()),
            Expr::Piecewise(branches) => Expr::Piecewise(
                branches
                    .iter()
                    .map(|(value, cond)| (value.subs(map), cond.subs(map)))
                    .collect(),
            ),
        }
    }

    /// Substitutes a single symbol.
    pub fn subs_single(&self, symbol: &Symbol, value: Expr) -> Expr {
        let mut map = HashMap::with_capacity(1);
        map.insert(symbol.clone(), value);
        self.subs(&map)
    }
}

/// Splits a canonical term into its numeric coefficient and symbolic part.
fn split_coeff(term: Expr) -> (f64, Expr) {
    match term {
        Expr::Num(n) => (n, Expr::Num(1.0)),
        Expr::Mul(factors) => {
            let mut coeff = 1.0;
            let mut rest = Vec::with_capacity(factors.len());
            for factor in factors {
                match factor {
                    Expr::Num(n) => coeff *= n,
                    other => rest.push(other),
                }
            }
            let rest = match rest.len() {
                0 => Expr::Num(1.0),
                1 => rest.swap_remove(0),
                _ => Expr::Mul(rest),
            };
            (coeff, rest)
        }
        other => (1.0, other),
    }
}

/// Rebuilds a term from a coefficient and its symbolic part.
fn with_coeff(coeff: f64, rest: Expr) -> Expr {
    if coeff.is_one() {
        return rest;
    }
    match rest {
        Expr::Num(n) => Expr::Num(coeff * n),
        Expr::Mul(factors) => {
            let mut out = Vec::with_capacity(factors.len() + 1);
            out.push(Expr::Num(coeff));
            out.extend(factors);
            Expr::Mul(out)
        }
        other => Expr::Mul(vec![Expr::Num(coeff), other]),
    }
}

/// Accumulates `base^exponent` into the per-base exponent table, flattening
/// product and power bases first.
fn add_power(bases: &mut Vec<(Expr, Vec<Expr>)>, base: Expr, exponent: Expr) {
    match base {
        Expr::Mul(inner) => {
            for factor in inner {
                match factor {
                    Expr::Pow(b, e) => {
                        add_power(bases, *b, Expr::mul(vec![*e, exponent.clone()]));
                    }
                    other => add_power(bases, other, exponent.clone()),
                }
            }
        }
        Expr::Pow(b, e) => add_power(bases, *b, Expr::mul(vec![*e, exponent])),
        other => match bases.iter_mut().find(|entry| entry.0 == other) {
            Some(entry) => entry.1.push(exponent),
            None => bases.push((other, vec![exponent])),
        },
    }
}

fn rank(expr: &Expr) -> u8 {
    match expr {
        Expr::Num(_) => 0,
        Expr::Sym(_) => 1,
        Expr::Pow(_, _) => 2,
        Expr::Mul(_) => 3,
        Expr::Add(_) => 4,
        Expr::Min(_) => 5,
        Expr::Max(_) => 6,
        Expr::Piecewise(_) => 7,
    }
}

/// Total order used for the canonical argument order of `Add` and `Mul`.
pub(crate) fn cmp_expr(a: &Expr, b: &Expr) -> Ordering {
    match (a, b) {
        (Expr::Num(x), Expr::Num(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Expr::Sym(x), Expr::Sym(y)) => x.cmp(y),
        (Expr::Pow(b1, e1), Expr::Pow(b2, e2)) => cmp_expr(b1, b2).then_with(|| cmp_expr(e1, e2)),
        (Expr::Add(x), Expr::Add(y))
        | (Expr::Mul(x), Expr::Mul(y))
        | (Expr::Min(x), Expr::Min(y))
        | (Expr::Max(x), Expr::Max(y)) => cmp_slices(x, y),
        (Expr::Piecewise(x), Expr::Piecewise(y)) => {
            for ((xv, xc), (yv, yc)) in x.iter().zip(y.iter()) {
                let ordering = cmp_expr(xv, yv).then_with(|| cmp_conds(xc, yc));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

fn cmp_slices(x: &[Expr], y: &[Expr]) -> Ordering {
    for (a, b) in x.iter().zip(y.iter()) {
        let ordering = cmp_expr(a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    x.len().cmp(&y.len())
}

fn cmp_conds(a: &Cond, b: &Cond) -> Ordering {
    match (a, b) {
        (Cond::True, Cond::True) => Ordering::Equal,
        (Cond::True, Cond::Ge(_, _)) => Ordering::Less,
        (Cond::Ge(_, _), Cond::True) => Ordering::Greater,
        (Cond::Ge(l1, r1), Cond::Ge(l2, r2)) => {
            cmp_expr(l1, l2).then_with(|| cmp_expr(r1, r2))
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Num(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Num(value as f64)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Sym(symbol.clone())
    }
}

impl ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::add(vec![self, rhs])
    }
}

impl ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::sub(self, rhs)
    }
}

impl ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul(vec![self, rhs])
    }
}

impl ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::div(self, rhs)
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::neg(self)
    }
}
