use serde::Serialize;

use super::engine::{simulate, validate_inputs};
use super::error::SimulationError;
use super::types::{DebtSnapshot, SimulationConfig, SimulationResult, Strategy};

/// Upper bound on bisection steps a caller may request.
pub const MAX_SOLVE_ITERATIONS: u32 = 200;

#[derive(Debug, Clone, Copy)]
pub struct ExtraPaymentGoal {
    pub target_months: u32,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl ExtraPaymentGoal {
    pub fn within_months(target_months: u32) -> Self {
        Self {
            target_months,
            search_min: 0.0,
            search_max: 10_000.0,
            tolerance: 0.01,
            max_iterations: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub months_simulated: u32,
    pub meets_target: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPaymentSolveResult {
    pub target_months: u32,
    pub search_min: f64,
    pub search_max: f64,
    pub solved_extra_payment: Option<f64>,
    pub simulation: Option<SimulationResult>,
    pub iterations: Vec<SolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Finds the smallest extra monthly payment that clears every debt within
/// `goal.target_months`, by bisection over `[search_min, search_max]`.
pub fn solve_extra_payment(
    debts: &[DebtSnapshot],
    strategy: Strategy,
    config: &SimulationConfig,
    goal: ExtraPaymentGoal,
) -> Result<ExtraPaymentSolveResult, SimulationError> {
    validate_goal(config, goal)?;
    validate_inputs(debts, goal.search_min, config)?;

    let mut iterations = Vec::new();
    let low_eval = evaluate_candidate(debts, strategy, config, goal, goal.search_min)?;
    let high_eval = evaluate_candidate(debts, strategy, config, goal, goal.search_max)?;

    let mut solved_extra_payment = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_eval.meets_target {
        solved_extra_payment = Some(goal.search_min);
        converged = true;
        feasible = true;
        message = "Already meets target at lower extra payment bound.".to_string();
    } else if !high_eval.meets_target {
        feasible = false;
        message = "No feasible extra payment found within the search bounds.".to_string();
    } else {
        let mut lo = goal.search_min;
        let mut hi = goal.search_max;
        let mut it = 0;
        while it < goal.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            if mid <= lo || mid >= hi {
                // Bounds are adjacent floats; no further progress is possible.
                converged = true;
                break;
            }
            let eval = evaluate_candidate(debts, strategy, config, goal, mid)?;
            iterations.push(SolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                months_simulated: eval.months_simulated,
                meets_target: eval.meets_target,
            });
            log::debug!(
                "solve iteration {it}: extra {mid:.2} -> {} months (target {})",
                eval.months_simulated,
                goal.target_months
            );

            if eval.meets_target {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= goal.tolerance {
                converged = true;
                break;
            }
        }
        solved_extra_payment = Some(hi);
        feasible = true;
        message = if converged {
            "Solved required extra payment.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate.".to_string()
        };
    }

    let simulation = match solved_extra_payment {
        Some(value) => Some(simulate(debts, value, strategy, config)?),
        None => None,
    };

    Ok(ExtraPaymentSolveResult {
        target_months: goal.target_months,
        search_min: goal.search_min,
        search_max: goal.search_max,
        solved_extra_payment,
        simulation,
        iterations,
        converged,
        feasible,
        message,
    })
}

#[derive(Debug, Clone, Copy)]
struct CandidateEval {
    months_simulated: u32,
    meets_target: bool,
}

fn evaluate_candidate(
    debts: &[DebtSnapshot],
    strategy: Strategy,
    config: &SimulationConfig,
    goal: ExtraPaymentGoal,
    candidate_value: f64,
) -> Result<CandidateEval, SimulationError> {
    // The goal never needs to look past the target, so cap the horizon there.
    let bounded = config.with_month_cap(goal.target_months.min(config.month_cap));
    let result = simulate(debts, candidate_value.max(0.0), strategy, &bounded)?;
    Ok(CandidateEval {
        months_simulated: result.months_simulated,
        meets_target: result.outcome.is_paid_off(),
    })
}

fn validate_goal(config: &SimulationConfig, goal: ExtraPaymentGoal) -> Result<(), SimulationError> {
    if goal.target_months == 0 {
        return Err(SimulationError::InvalidGoal(
            "target_months must be > 0".to_string(),
        ));
    }
    if goal.target_months > config.month_cap {
        return Err(SimulationError::InvalidGoal(
            "target_months must be <= month_cap".to_string(),
        ));
    }
    if !goal.search_min.is_finite() || !goal.search_max.is_finite() {
        return Err(SimulationError::InvalidGoal(
            "search bounds must be finite".to_string(),
        ));
    }
    if goal.search_min < 0.0 {
        return Err(SimulationError::InvalidGoal(
            "search_min must be >= 0".to_string(),
        ));
    }
    if goal.search_max <= goal.search_min {
        return Err(SimulationError::InvalidGoal(
            "search_max must be greater than search_min".to_string(),
        ));
    }
    if !goal.tolerance.is_finite() || goal.tolerance <= 0.0 {
        return Err(SimulationError::InvalidGoal(
            "tolerance must be > 0".to_string(),
        ));
    }
    if goal.max_iterations == 0 || goal.max_iterations > MAX_SOLVE_ITERATIONS {
        return Err(SimulationError::InvalidGoal(format!(
            "max_iterations must be between 1 and {MAX_SOLVE_ITERATIONS}"
        )));
    }
    Ok(())
}
