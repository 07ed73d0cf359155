//! Infix pretty-printing for expressions.

use std::fmt;

use super::{split_coeff, with_coeff, Cond, Expr};

fn write_num(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_infinite() {
        return f.write_str(if n > 0.0 { "inf" } else { "-inf" });
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

fn write_factor(f: &mut fmt::Formatter<'_>, factor: &Expr) -> fmt::Result {
    match factor {
        Expr::Add(_) => write!(f, "({})", factor),
        Expr::Num(n) if *n < 0.0 => write!(f, "({})", factor),
        _ => write!(f, "{}", factor),
    }
}

fn write_product(f: &mut fmt::Formatter<'_>, product: &Expr) -> fmt::Result {
    let (coeff, rest) = split_coeff(product.clone());

    let mut leading = coeff;
    if coeff < 0.0 {
        f.write_str("-")?;
        leading = -coeff;
    }

    let factors: Vec<Expr> = match rest {
        Expr::Mul(factors) => factors,
        other => vec![other],
    };

    let mut separate = false;
    if leading != 1.0 || factors.is_empty() {
        write_num(f, leading)?;
        separate = true;
    }

    for factor in &factors {
        if separate {
            f.write_str("*")?;
        }
        write_factor(f, factor)?;
        separate = true;
    }

    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => write_num(f, *n),
            Expr::Sym(symbol) => write!(f, "{}", symbol),
            Expr::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i == 0 {
                        write!(f, "{}", term)?;
                        continue;
                    }
                    let (coeff, rest) = split_coeff(term.clone());
                    if coeff < 0.0 {
                        f.write_str(" - ")?;
                        write_factor(f, &with_coeff(-coeff, rest))?;
                    } else {
                        write!(f, " + {}", term)?;
                    }
                }
                Ok(())
            }
            Expr::Mul(_) => write_product(f, self),
            Expr::Pow(base, exponent) => {
                match **base {
                    Expr::Add(_) | Expr::Mul(_) | Expr::Pow(_, _) => write!(f, "({})", base)?,
                    Expr::Num(n) if n < 0.0 => write!(f, "({})", base)?,
                    _ => write!(f, "{}", base)?,
                }
                f.write_str("^")?;
                match **exponent {
                    Expr::Sym(_) => write!(f, "{}", exponent),
                    Expr::Num(n) if n >= 0.0 && n.fract() == 0.0 => write!(f, "{}", exponent),
                    _ => write!(f, "({})", exponent),
                }
            }
            Expr::Min(args) | Expr::Max(args) => {
                f.write_str(if matches!(self, Expr::Min(_)) {
                    "min("
                } else {
                    "max("
                })?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Piecewise(branches) => {
                f.write_str("piecewise(")?;
                for (i, (value, cond)) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match cond {
                        Cond::True => write!(f, "{} otherwise", value)?,
                        Cond::Ge(_, _) => write!(f, "{} if {}", value, cond)?,
                    }
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::True => f.write_str("true"),
            Cond::Ge(lhs, rhs) => write!(f, "{} >= {}", lhs, rhs),
        }
    }
}
