mod engine;
mod error;
mod priority;
mod solver;
mod summary;
mod types;

pub use engine::{run_monthly_trace, simulate};
pub use error::SimulationError;
pub use priority::priority_scores;
pub use solver::{
    ExtraPaymentGoal, ExtraPaymentSolveResult, MAX_SOLVE_ITERATIONS, SolveIteration,
    solve_extra_payment,
};
pub use summary::{PayoffSummary, UNDETERMINED_LABEL, format_money, round_cents};
pub use types::{
    BaselineResult, DEFAULT_MONTH_CAP, DebtPayoff, DebtSnapshot, MonthTraceRow, PayoffOutcome,
    PriorityScore, SimulationConfig, SimulationResult, Strategy,
};
