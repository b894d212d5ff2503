use chrono::{Months, NaiveDate};

use super::error::SimulationError;
use super::types::{
    BaselineResult, DebtPayoff, DebtSnapshot, MonthTraceRow, PayoffOutcome, SimulationConfig,
    SimulationResult, Strategy,
};

#[derive(Debug, Clone)]
struct WorkingDebt {
    balance: f64,
    apr: f64,
    minimum_payment: f64,
    promotional_apr: Option<f64>,
    promotional_months_remaining: u32,
    interest_paid: f64,
    payoff_month: Option<u32>,
}

impl WorkingDebt {
    fn from_snapshot(debt: &DebtSnapshot) -> Self {
        let balance = debt.balance.max(0.0);
        Self {
            balance,
            apr: debt.apr,
            minimum_payment: debt.minimum_payment,
            promotional_apr: debt.promotional_apr,
            promotional_months_remaining: debt.promotional_months_remaining.unwrap_or(0),
            interest_paid: 0.0,
            payoff_month: if balance > 0.0 { None } else { Some(0) },
        }
    }

    fn is_open(&self) -> bool {
        self.balance > 0.0
    }

    fn effective_apr(&self) -> f64 {
        match self.promotional_apr {
            Some(apr) if self.promotional_months_remaining > 0 => apr,
            _ => self.apr,
        }
    }

    fn monthly_rate(&self) -> f64 {
        self.effective_apr() / 100.0 / 12.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MonthFlows {
    interest: f64,
    minimum_paid: f64,
    extra_paid: f64,
}

#[derive(Debug, Clone)]
struct MonthTracePoint {
    month: u32,
    flows: MonthFlows,
    balances: Vec<f64>,
}

#[derive(Debug)]
struct ScenarioResult {
    months: u32,
    paid_off: bool,
    total_interest: f64,
    debts: Vec<WorkingDebt>,
}

/// Runs the payoff simulation for `extra_payment` and, when it is positive,
/// a minimum-payments-only baseline with the same strategy and horizon.
pub fn simulate(
    debts: &[DebtSnapshot],
    extra_payment: f64,
    strategy: Strategy,
    config: &SimulationConfig,
) -> Result<SimulationResult, SimulationError> {
    validate_inputs(debts, extra_payment, config)?;

    let scenario = simulate_scenario(debts, extra_payment, strategy, config.month_cap, None);
    let outcome = payoff_outcome(&scenario, config)?;

    let baseline = if extra_payment > 0.0 {
        let base = simulate_scenario(debts, 0.0, strategy, config.month_cap, None);
        Some(BaselineResult {
            months_simulated: base.months,
            outcome: payoff_outcome(&base, config)?,
            total_interest_paid: base.total_interest,
        })
    } else {
        None
    };
    let interest_saved =
        baseline.map(|base| (base.total_interest_paid - scenario.total_interest).max(0.0));

    let per_debt = scenario
        .debts
        .iter()
        .zip(debts)
        .enumerate()
        .map(|(index, (working, snapshot))| DebtPayoff {
            index,
            label: snapshot.label.clone(),
            payoff_month: working.payoff_month,
            interest_paid: working.interest_paid,
        })
        .collect();

    Ok(SimulationResult {
        strategy,
        extra_payment,
        months_simulated: scenario.months,
        outcome,
        total_interest_paid: scenario.total_interest,
        interest_saved,
        baseline,
        debts: per_debt,
    })
}

/// Month-by-month balances for charting. Uses the same loop as [`simulate`].
pub fn run_monthly_trace(
    debts: &[DebtSnapshot],
    extra_payment: f64,
    strategy: Strategy,
    config: &SimulationConfig,
) -> Result<Vec<MonthTraceRow>, SimulationError> {
    validate_inputs(debts, extra_payment, config)?;

    let mut points = Vec::new();
    simulate_scenario(
        debts,
        extra_payment,
        strategy,
        config.month_cap,
        Some(&mut points),
    );

    points
        .into_iter()
        .map(|point| -> Result<MonthTraceRow, SimulationError> {
            let total_balance: f64 = point.balances.iter().sum();
            Ok(MonthTraceRow {
                month: point.month,
                date: add_months(config.start_date, point.month)?,
                interest: point.flows.interest,
                minimum_paid: point.flows.minimum_paid,
                extra_paid: point.flows.extra_paid,
                balances: point.balances,
                total_balance,
            })
        })
        .collect()
}

fn simulate_scenario(
    debts: &[DebtSnapshot],
    extra_payment: f64,
    strategy: Strategy,
    month_cap: u32,
    mut trace: Option<&mut Vec<MonthTracePoint>>,
) -> ScenarioResult {
    // Working copies stay in input order; `order` holds the priority for extra money.
    let mut working: Vec<WorkingDebt> = debts.iter().map(WorkingDebt::from_snapshot).collect();
    let mut order: Vec<usize> = (0..working.len()).collect();
    let mut month = 0;
    let mut total_interest = 0.0;

    while month < month_cap && working.iter().any(WorkingDebt::is_open) {
        prioritize(&working, &mut order, strategy);

        let mut flows = apply_interest_and_minimums(&mut working);
        flows.extra_paid = apply_extra_payment(&mut working, &order, extra_payment);

        month += 1;
        total_interest += flows.interest;
        for debt in working.iter_mut() {
            if !debt.is_open() && debt.payoff_month.is_none() {
                debt.payoff_month = Some(month);
            }
        }

        if let Some(points) = trace.as_deref_mut() {
            points.push(MonthTracePoint {
                month,
                flows,
                balances: working.iter().map(|debt| debt.balance).collect(),
            });
        }
    }

    ScenarioResult {
        months: month,
        paid_off: !working.iter().any(WorkingDebt::is_open),
        total_interest,
        debts: working,
    }
}

fn prioritize(debts: &[WorkingDebt], order: &mut [usize], strategy: Strategy) {
    order.sort_by(|&a, &b| {
        let primary = match strategy {
            Strategy::Avalanche => debts[b]
                .effective_apr()
                .total_cmp(&debts[a].effective_apr()),
            Strategy::Snowball => debts[a].balance.total_cmp(&debts[b].balance),
        };
        primary.then(a.cmp(&b))
    });
}

fn apply_interest_and_minimums(debts: &mut [WorkingDebt]) -> MonthFlows {
    let mut flows = MonthFlows::default();
    for debt in debts.iter_mut().filter(|debt| debt.is_open()) {
        let interest = debt.balance * debt.monthly_rate();
        let payment = debt.minimum_payment.min(debt.balance + interest);
        debt.balance = debt.balance + interest - payment;
        debt.interest_paid += interest;
        if debt.promotional_months_remaining > 0 {
            debt.promotional_months_remaining -= 1;
        }

        flows.interest += interest;
        flows.minimum_paid += payment;
    }
    flows
}

fn apply_extra_payment(debts: &mut [WorkingDebt], order: &[usize], extra_payment: f64) -> f64 {
    let mut available = extra_payment;
    for &index in order {
        if available <= 0.0 {
            break;
        }
        let debt = &mut debts[index];
        if !debt.is_open() {
            continue;
        }
        let applied = available.min(debt.balance);
        debt.balance -= applied;
        available -= applied;
    }
    extra_payment - available
}

fn payoff_outcome(
    scenario: &ScenarioResult,
    config: &SimulationConfig,
) -> Result<PayoffOutcome, SimulationError> {
    if scenario.paid_off {
        Ok(PayoffOutcome::PaidOff {
            months: scenario.months,
            date: add_months(config.start_date, scenario.months)?,
        })
    } else {
        Ok(PayoffOutcome::NonConvergent {
            month_cap: config.month_cap,
        })
    }
}

fn add_months(start: NaiveDate, months: u32) -> Result<NaiveDate, SimulationError> {
    start.checked_add_months(Months::new(months)).ok_or_else(|| {
        SimulationError::InvalidInput(format!(
            "start_date {start} plus {months} months is out of range"
        ))
    })
}

pub(crate) fn validate_inputs(
    debts: &[DebtSnapshot],
    extra_payment: f64,
    config: &SimulationConfig,
) -> Result<(), SimulationError> {
    if config.month_cap == 0 {
        return Err(SimulationError::InvalidInput(
            "month_cap must be > 0".to_string(),
        ));
    }

    if !extra_payment.is_finite() || extra_payment < 0.0 {
        return Err(SimulationError::InvalidInput(
            "extra_payment must be >= 0".to_string(),
        ));
    }

    validate_debts(debts)
}

/// Every numeric debt field must be finite and non-negative.
pub(crate) fn validate_debts(debts: &[DebtSnapshot]) -> Result<(), SimulationError> {
    for (index, debt) in debts.iter().enumerate() {
        for (name, value) in [
            ("balance", Some(debt.balance)),
            ("apr", Some(debt.apr)),
            ("minimum_payment", Some(debt.minimum_payment)),
            ("promotional_apr", debt.promotional_apr),
        ] {
            let Some(value) = value else {
                continue;
            };
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidInput(format!(
                    "debts[{index}].{name} must be >= 0"
                )));
            }
        }
    }

    Ok(())
}
