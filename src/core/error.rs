#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// Debts, extra payment or horizon failed validation before simulating.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Search bounds or tolerances for the extra-payment solver are unusable.
    #[error("invalid goal: {0}")]
    InvalidGoal(String),
}
