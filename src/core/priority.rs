use super::engine::validate_debts;
use super::error::SimulationError;
use super::types::{DebtSnapshot, PriorityScore};

const APR_WEIGHT: f64 = 0.7;
const BALANCE_WEIGHT: f64 = 0.3;

/// Scores each debt from 1 to 10 relative to the rest of the list.
///
/// Higher APR and smaller balance both push a debt up. The score is a
/// quick-glance ranking for cards and lists; it is independent of the
/// ordering the payoff simulator uses, so the two can disagree.
pub fn priority_scores(debts: &[DebtSnapshot]) -> Result<Vec<PriorityScore>, SimulationError> {
    validate_debts(debts)?;

    let open = || debts.iter().filter(|debt| debt.balance > 0.0);
    let max_apr = open().map(|debt| debt.apr.max(0.0)).fold(0.0, f64::max);
    let max_balance = open().map(|debt| debt.balance).fold(0.0, f64::max);

    Ok(debts
        .iter()
        .enumerate()
        .map(|(index, debt)| PriorityScore {
            index,
            score: score_debt(debt, max_apr, max_balance),
        })
        .collect())
}

fn score_debt(debt: &DebtSnapshot, max_apr: f64, max_balance: f64) -> u8 {
    if debt.balance <= 0.0 {
        return 1;
    }

    let apr_component = if max_apr > 0.0 {
        (debt.apr / max_apr).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let balance_component = if max_balance > 0.0 {
        1.0 - (debt.balance / max_balance).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let raw = APR_WEIGHT * apr_component + BALANCE_WEIGHT * balance_component;
    (1.0 + (raw * 9.0).round()).clamp(1.0, 10.0) as u8
}
