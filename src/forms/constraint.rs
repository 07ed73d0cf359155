//! Budget constraints over purchased goods.

use crate::expr::Expr;
use crate::subst::Directive;
use crate::symbols::Registry;

use super::{FormConfig, FormError, FunctionalForm};

/// A budget constraint: an additive form `sum_i p[i]*x[i] + C - M` relating
/// prices, quantities and income. The combination shape is fixed and the
/// exponents are always neutral; prices enter linearly.
#[derive(Clone, Debug)]
pub struct BudgetConstraint {
    form: FunctionalForm,
}

impl BudgetConstraint {
    /// The default configuration of a budget constraint: two goods, prices
    /// `p`, income `M`, all values symbolic.
    pub fn config() -> FormConfig {
        let mut config = FormConfig::default();
        config
            .set_coeff_name("p".to_string())
            .set_dependent_name("M".to_string());
        config
    }

    /// Builds a budget constraint. The exponent directive of the given
    /// configuration is ignored; exponents are forced neutral.
    pub fn new(config: &FormConfig) -> Result<Self, FormError> {
        let mut config = config.clone();
        config.set_exponent_values(Directive::Neutral);

        Ok(Self {
            form: FunctionalForm::additive(&config)?,
        })
    }

    /// Gets the underlying functional form.
    pub fn form(&self) -> &FunctionalForm {
        &self.form
    }

    /// Gets the symbol registry of the constraint.
    pub fn registry(&self) -> &Registry {
        self.form.registry()
    }

    /// Solves the constraint for income: the spending needed to afford the
    /// given bundle.
    pub fn income(&self) -> Result<Expr, FormError> {
        self.form.solve_dependent()
    }
}
