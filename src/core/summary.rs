use serde::Serialize;

use super::types::{PayoffOutcome, SimulationResult};

pub const UNDETERMINED_LABEL: &str = "Payoff undetermined";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSummary {
    pub paid_off: bool,
    /// e.g. "March 2031", or [`UNDETERMINED_LABEL`] when the horizon ran out.
    pub payoff_label: String,
    pub duration_years: Option<u32>,
    pub duration_months: Option<u32>,
    pub total_interest_paid: f64,
    pub interest_saved: Option<f64>,
    pub months_saved: Option<u32>,
}

impl PayoffSummary {
    pub fn from_result(result: &SimulationResult) -> Self {
        let (paid_off, payoff_label, duration_years, duration_months) = match result.outcome {
            PayoffOutcome::PaidOff { months, date } => (
                true,
                date.format("%B %Y").to_string(),
                Some(months / 12),
                Some(months % 12),
            ),
            PayoffOutcome::NonConvergent { .. } => {
                (false, UNDETERMINED_LABEL.to_string(), None, None)
            }
        };

        let months_saved = match (
            result.months_to_payoff(),
            result
                .baseline
                .as_ref()
                .and_then(|base| base.outcome.months_to_payoff()),
        ) {
            (Some(months), Some(baseline_months)) => Some(baseline_months.saturating_sub(months)),
            _ => None,
        };

        Self {
            paid_off,
            payoff_label,
            duration_years,
            duration_months,
            total_interest_paid: round_cents(result.total_interest_paid),
            interest_saved: result.interest_saved.map(round_cents),
            months_saved,
        }
    }

    pub fn duration_label(&self) -> String {
        match (self.duration_years, self.duration_months) {
            (Some(0), Some(months)) => plural(months, "month"),
            (Some(years), Some(0)) => plural(years, "year"),
            (Some(years), Some(months)) => {
                format!("{}, {}", plural(years, "year"), plural(months, "month"))
            }
            _ => UNDETERMINED_LABEL.to_string(),
        }
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Formats with two decimals and comma thousands separators, e.g. `$12,345.60`.
pub fn format_money(amount: f64, symbol: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DebtSnapshot, SimulationConfig, Strategy, simulate};
    use chrono::NaiveDate;

    fn config() -> SimulationConfig {
        SimulationConfig::new(NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"))
    }

    #[test]
    fn paid_off_summary_splits_years_and_months() {
        let debts = [DebtSnapshot::new(2_800.0, 0.0, 100.0)];
        let result = simulate(&debts, 0.0, Strategy::Avalanche, &config()).expect("valid inputs");
        let summary = PayoffSummary::from_result(&result);

        assert!(summary.paid_off);
        assert_eq!(summary.payoff_label, "July 2028");
        assert_eq!(summary.duration_years, Some(2));
        assert_eq!(summary.duration_months, Some(4));
        assert_eq!(summary.duration_label(), "2 years, 4 months");
        assert_eq!(summary.months_saved, None);
    }

    #[test]
    fn non_convergent_summary_has_no_date() {
        let debts = [DebtSnapshot::new(2_800.0, 30.0, 10.0)];
        let result = simulate(&debts, 0.0, Strategy::Avalanche, &config()).expect("valid inputs");
        let summary = PayoffSummary::from_result(&result);

        assert!(!summary.paid_off);
        assert_eq!(summary.payoff_label, UNDETERMINED_LABEL);
        assert_eq!(summary.duration_years, None);
        assert_eq!(summary.duration_label(), UNDETERMINED_LABEL);
    }

    #[test]
    fn summary_reports_months_saved_against_baseline() {
        let debts = [DebtSnapshot::new(1_200.0, 0.0, 100.0)];
        let result =
            simulate(&debts, 100.0, Strategy::Snowball, &config()).expect("valid inputs");
        let summary = PayoffSummary::from_result(&result);

        assert_eq!(summary.duration_label(), "6 months");
        assert_eq!(summary.months_saved, Some(6));
        assert_eq!(summary.interest_saved, Some(0.0));
    }

    #[test]
    fn round_cents_rounds_half_away_from_zero() {
        assert_eq!(round_cents(20.404999), 20.4);
        assert_eq!(round_cents(1.005_1), 1.01);
        assert_eq!(round_cents(0.0), 0.0);
    }

    #[test]
    fn format_money_groups_thousands() {
        assert_eq!(format_money(0.0, "$"), "$0.00");
        assert_eq!(format_money(999.999, "$"), "$1,000.00");
        assert_eq!(format_money(12_345.6, "£"), "£12,345.60");
        assert_eq!(format_money(-1_234_567.891, "€"), "-€1,234,567.89");
    }
}
