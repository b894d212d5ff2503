use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MONTH_CAP: u32 = 600;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Extra money goes to the highest effective APR first.
    Avalanche,
    /// Extra money goes to the smallest remaining balance first.
    Snowball,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSnapshot {
    pub balance: f64,
    /// Annual rate in percent, e.g. 19.99.
    pub apr: f64,
    pub minimum_payment: f64,
    #[serde(default)]
    pub promotional_apr: Option<f64>,
    #[serde(default)]
    pub promotional_months_remaining: Option<u32>,
    #[serde(default)]
    pub label: Option<String>,
}

impl DebtSnapshot {
    pub fn new(balance: f64, apr: f64, minimum_payment: f64) -> Self {
        Self {
            balance,
            apr,
            minimum_payment,
            promotional_apr: None,
            promotional_months_remaining: None,
            label: None,
        }
    }

    pub fn with_promotion(mut self, apr: f64, months: u32) -> Self {
        self.promotional_apr = Some(apr);
        self.promotional_months_remaining = Some(months);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub month_cap: u32,
    pub start_date: NaiveDate,
}

impl SimulationConfig {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            month_cap: DEFAULT_MONTH_CAP,
            start_date,
        }
    }

    pub fn with_month_cap(self, month_cap: u32) -> Self {
        Self { month_cap, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PayoffOutcome {
    #[serde(rename_all = "camelCase")]
    PaidOff { months: u32, date: NaiveDate },
    #[serde(rename_all = "camelCase")]
    NonConvergent { month_cap: u32 },
}

impl PayoffOutcome {
    pub fn months_to_payoff(&self) -> Option<u32> {
        match self {
            PayoffOutcome::PaidOff { months, .. } => Some(*months),
            PayoffOutcome::NonConvergent { .. } => None,
        }
    }

    pub fn payoff_date(&self) -> Option<NaiveDate> {
        match self {
            PayoffOutcome::PaidOff { date, .. } => Some(*date),
            PayoffOutcome::NonConvergent { .. } => None,
        }
    }

    pub fn is_paid_off(&self) -> bool {
        matches!(self, PayoffOutcome::PaidOff { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoff {
    pub index: usize,
    pub label: Option<String>,
    /// Month (1-based) in which the balance reached zero; `None` if it never did.
    pub payoff_month: Option<u32>,
    pub interest_paid: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineResult {
    pub months_simulated: u32,
    pub outcome: PayoffOutcome,
    pub total_interest_paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub strategy: Strategy,
    pub extra_payment: f64,
    pub months_simulated: u32,
    pub outcome: PayoffOutcome,
    pub total_interest_paid: f64,
    pub interest_saved: Option<f64>,
    pub baseline: Option<BaselineResult>,
    pub debts: Vec<DebtPayoff>,
}

impl SimulationResult {
    pub fn months_to_payoff(&self) -> Option<u32> {
        self.outcome.months_to_payoff()
    }

    pub fn projected_payoff_date(&self) -> Option<NaiveDate> {
        self.outcome.payoff_date()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTraceRow {
    pub month: u32,
    pub date: NaiveDate,
    pub interest: f64,
    pub minimum_paid: f64,
    pub extra_paid: f64,
    pub balances: Vec<f64>,
    pub total_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityScore {
    pub index: usize,
    /// 1 (lowest priority) to 10 (pay this first).
    pub score: u8,
}
