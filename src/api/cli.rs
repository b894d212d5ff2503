use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use std::fmt::Write as _;

use super::{MONTH_CAP_ENV, build_simulate_response, check_month_cap, parse_debt_spec};
use crate::core::{
    DEFAULT_MONTH_CAP, DebtSnapshot, ExtraPaymentGoal, ExtraPaymentSolveResult, PayoffSummary,
    SimulationConfig, SimulationResult, Strategy, format_money, simulate, solve_extra_payment,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Avalanche,
    Snowball,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Avalanche => Strategy::Avalanche,
            CliStrategy::Snowball => Strategy::Snowball,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "debtplan",
    about = "Debt payoff simulator (avalanche / snowball with an extra monthly payment)",
    after_help = "Run `debtplan serve [port]` to start the HTTP API instead."
)]
pub struct Cli {
    #[arg(
        long = "debt",
        required = true,
        value_parser = parse_debt_spec,
        help = "balance:apr:minimum[:promoApr:promoMonths]; repeat per debt"
    )]
    debts: Vec<DebtSnapshot>,
    #[arg(long, default_value_t = 0.0, help = "Extra amount paid each month")]
    extra_payment: f64,
    #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
    strategy: CliStrategy,
    #[arg(
        long,
        env = MONTH_CAP_ENV,
        default_value_t = DEFAULT_MONTH_CAP,
        help = "Months to simulate before reporting payoff as undetermined"
    )]
    month_cap: u32,
    #[arg(long, help = "Simulation start date (YYYY-MM-DD); defaults to today")]
    start_date: Option<NaiveDate>,
    #[arg(
        long,
        help = "Solve for the extra payment needed to be debt-free within this many months"
    )]
    target_months: Option<u32>,
    #[arg(long, default_value = "$")]
    currency_symbol: String,
    #[arg(long, help = "Print the JSON response instead of a text summary")]
    json: bool,
}

/// Parses process arguments; prints usage and exits on `--help` or bad flags.
pub fn parse_args<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(args)
}

pub fn run(cli: Cli) -> Result<String, String> {
    let month_cap = check_month_cap(cli.month_cap)?;
    let config = SimulationConfig {
        month_cap,
        start_date: cli
            .start_date
            .unwrap_or_else(|| Local::now().date_naive()),
    };
    let strategy = Strategy::from(cli.strategy);
    log::info!(
        "cli: {} debts, extra {:.2}, {:?}, cap {}",
        cli.debts.len(),
        cli.extra_payment,
        strategy,
        month_cap
    );

    if let Some(target_months) = cli.target_months {
        let solved = solve_extra_payment(
            &cli.debts,
            strategy,
            &config,
            ExtraPaymentGoal::within_months(target_months),
        )
        .map_err(|e| e.to_string())?;
        return if cli.json {
            serde_json::to_string_pretty(&solved).map_err(|e| e.to_string())
        } else {
            Ok(render_solve_text(&solved, &cli.currency_symbol))
        };
    }

    let result = simulate(&cli.debts, cli.extra_payment, strategy, &config)
        .map_err(|e| e.to_string())?;
    if cli.json {
        serde_json::to_string_pretty(&build_simulate_response(result)).map_err(|e| e.to_string())
    } else {
        Ok(render_text(&result, &cli.currency_symbol))
    }
}

fn render_text(result: &SimulationResult, symbol: &str) -> String {
    let summary = PayoffSummary::from_result(result);
    let mut out = String::new();

    let strategy = match result.strategy {
        Strategy::Avalanche => "avalanche",
        Strategy::Snowball => "snowball",
    };
    let _ = writeln!(out, "Strategy:        {strategy}");
    let _ = writeln!(
        out,
        "Extra payment:   {}",
        format_money(result.extra_payment, symbol)
    );
    if summary.paid_off {
        let _ = writeln!(
            out,
            "Debt-free:       {} ({})",
            summary.payoff_label,
            summary.duration_label()
        );
    } else {
        let _ = writeln!(
            out,
            "Debt-free:       {} (not cleared within {} months)",
            summary.payoff_label, result.months_simulated
        );
    }
    let _ = writeln!(
        out,
        "Total interest:  {}",
        format_money(summary.total_interest_paid, symbol)
    );
    if let Some(saved) = summary.interest_saved {
        let _ = write!(
            out,
            "Interest saved:  {}",
            format_money(saved, symbol)
        );
        if let Some(months) = summary.months_saved {
            let _ = write!(out, " ({months} months sooner)");
        }
        let _ = writeln!(out);
    }

    let mut order: Vec<_> = result.debts.iter().collect();
    order.sort_by_key(|debt| (debt.payoff_month.is_none(), debt.payoff_month, debt.index));
    let _ = writeln!(out, "Payoff order:");
    for (position, debt) in order.iter().enumerate() {
        let name = debt
            .label
            .clone()
            .unwrap_or_else(|| format!("Debt {}", debt.index + 1));
        let when = match debt.payoff_month {
            Some(0) => "already settled".to_string(),
            Some(month) => format!("month {month}"),
            None => "not cleared".to_string(),
        };
        let _ = writeln!(out, "  {}. {name}: {when}", position + 1);
    }

    out.trim_end().to_string()
}

fn render_solve_text(solved: &ExtraPaymentSolveResult, symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", solved.message);
    if let Some(extra) = solved.solved_extra_payment {
        let _ = writeln!(
            out,
            "Extra needed to clear debts within {} months: {}",
            solved.target_months,
            format_money(extra, symbol)
        );
    }
    if let Some(simulation) = &solved.simulation {
        out.push_str(&render_text(simulation, symbol));
    }
    out.trim_end().to_string()
}
