use serde::{Deserialize, Serialize};

const MONTHS_PER_YEAR: f64 = 12.0;

/// Financial inputs for one projection. Transient; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RoiInput {
    pub purchase_price: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
}

impl RoiInput {
    /// Caller-side input constraints. The calculator itself stays unguarded,
    /// so every boundary (HTTP, CLI) runs this before projecting.
    pub fn validate(&self) -> Result<(), RoiInputError> {
        if !self.purchase_price.is_finite() || self.purchase_price <= 0.0 {
            return Err(RoiInputError::NonPositivePurchasePrice);
        }
        if !self.monthly_income.is_finite() || self.monthly_income < 0.0 {
            return Err(RoiInputError::NegativeMonthlyIncome);
        }
        if !self.monthly_expenses.is_finite() || self.monthly_expenses < 0.0 {
            return Err(RoiInputError::NegativeMonthlyExpenses);
        }
        Ok(())
    }
}

/// Annualized projection derived from a [`RoiInput`]. Values are unrounded;
/// rounding to two decimals is a display concern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoiProjection {
    pub annual_income: f64,
    pub annual_expenses: f64,
    pub annual_net: f64,
    pub roi_percent: f64,
}

/// Annual return on investment as a signed percentage of the purchase price.
pub fn annual_roi(purchase_price: f64, monthly_income: f64, monthly_expenses: f64) -> f64 {
    let annual_income = monthly_income * MONTHS_PER_YEAR;
    let annual_expenses = monthly_expenses * MONTHS_PER_YEAR;
    ((annual_income - annual_expenses) / purchase_price) * 100.0
}

/// Full projection for display alongside the headline percentage.
pub fn project(input: RoiInput) -> RoiProjection {
    let annual_income = input.monthly_income * MONTHS_PER_YEAR;
    let annual_expenses = input.monthly_expenses * MONTHS_PER_YEAR;
    RoiProjection {
        annual_income,
        annual_expenses,
        annual_net: annual_income - annual_expenses,
        roi_percent: annual_roi(
            input.purchase_price,
            input.monthly_income,
            input.monthly_expenses,
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoiInputError {
    #[error("purchase price must be greater than zero")]
    NonPositivePurchasePrice,
    #[error("monthly income must not be negative")]
    NegativeMonthlyIncome,
    #[error("monthly expenses must not be negative")]
    NegativeMonthlyExpenses,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_worked_example() {
        // price 200000, income 1500/mo, expenses 400/mo -> 13200/200000 -> 6.6%
        let roi = annual_roi(200000.0, 1500.0, 400.0);
        assert_eq!(roi, ((1500.0 * 12.0 - 400.0 * 12.0) / 200000.0) * 100.0);
        assert!((roi - 6.6).abs() < 1e-9);
    }

    #[test]
    fn sign_follows_annual_net() {
        assert!(annual_roi(100000.0, 1000.0, 400.0) > 0.0);
        assert!(annual_roi(100000.0, 400.0, 1000.0) < 0.0);
        assert_eq!(annual_roi(100000.0, 500.0, 500.0), 0.0);
    }

    #[test]
    fn projection_exposes_unrounded_components() {
        let projection = project(RoiInput {
            purchase_price: 200000.0,
            monthly_income: 1500.0,
            monthly_expenses: 400.0,
        });
        assert_eq!(projection.annual_income, 18000.0);
        assert_eq!(projection.annual_expenses, 4800.0);
        assert_eq!(projection.annual_net, 13200.0);
        assert!((projection.roi_percent - 6.6).abs() < 1e-9);
    }

    #[test]
    fn validation_rejects_out_of_domain_inputs() {
        let base = RoiInput {
            purchase_price: 150000.0,
            monthly_income: 1200.0,
            monthly_expenses: 300.0,
        };
        base.validate().expect("valid input");

        let zero_price = RoiInput {
            purchase_price: 0.0,
            ..base
        };
        assert_eq!(
            zero_price.validate(),
            Err(RoiInputError::NonPositivePurchasePrice)
        );

        let negative_income = RoiInput {
            monthly_income: -1.0,
            ..base
        };
        assert_eq!(
            negative_income.validate(),
            Err(RoiInputError::NegativeMonthlyIncome)
        );

        let negative_expenses = RoiInput {
            monthly_expenses: -0.01,
            ..base
        };
        assert_eq!(
            negative_expenses.validate(),
            Err(RoiInputError::NegativeMonthlyExpenses)
        );

        let nan_price = RoiInput {
            purchase_price: f64::NAN,
            ..base
        };
        assert_eq!(
            nan_price.validate(),
            Err(RoiInputError::NonPositivePurchasePrice)
        );
    }
}
