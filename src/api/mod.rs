use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    DEFAULT_MONTH_CAP, DebtSnapshot, ExtraPaymentGoal, ExtraPaymentSolveResult, MonthTraceRow,
    PayoffSummary, PriorityScore, SimulationConfig, SimulationResult, Strategy, priority_scores,
    run_monthly_trace, simulate, solve_extra_payment,
};

pub mod cli;

pub const MONTH_CAP_ENV: &str = "DEBTPLAN_MONTH_CAP";
const MAX_MONTH_CAP: u32 = 2_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub month_cap: u32,
}

impl ServerConfig {
    /// Reads the default horizon from `DEBTPLAN_MONTH_CAP`, falling back to 600 months.
    pub fn from_env(port: u16) -> Result<Self, String> {
        let month_cap = match std::env::var(MONTH_CAP_ENV) {
            Ok(raw) => parse_month_cap(&raw)?,
            Err(_) => DEFAULT_MONTH_CAP,
        };
        Ok(Self { port, month_cap })
    }
}

fn parse_month_cap(raw: &str) -> Result<u32, String> {
    let cap = raw
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("{MONTH_CAP_ENV} must be a positive integer: {e}"))?;
    check_month_cap(cap)
}

fn check_month_cap(cap: u32) -> Result<u32, String> {
    if cap == 0 || cap > MAX_MONTH_CAP {
        return Err(format!("monthCap must be between 1 and {MAX_MONTH_CAP}"));
    }
    Ok(cap)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    #[serde(alias = "highest-interest", alias = "highestInterest", alias = "highest_interest")]
    Avalanche,
    #[serde(alias = "smallest-balance", alias = "smallestBalance", alias = "smallest_balance")]
    Snowball,
}

impl From<ApiStrategy> for Strategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Avalanche => Strategy::Avalanche,
            ApiStrategy::Snowball => Strategy::Snowball,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    debts: Vec<DebtSnapshot>,
    extra_payment: Option<f64>,
    strategy: Option<ApiStrategy>,
    month_cap: Option<u32>,
    start_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulateQuery {
    /// `balance:apr:minimum[:promoApr:promoMonths]` entries separated by `;`.
    debts: Option<String>,
    extra_payment: Option<f64>,
    strategy: Option<ApiStrategy>,
    month_cap: Option<u32>,
    start_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PriorityPayload {
    debts: Vec<DebtSnapshot>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SolvePayload {
    debts: Vec<DebtSnapshot>,
    strategy: Option<ApiStrategy>,
    month_cap: Option<u32>,
    start_date: Option<NaiveDate>,
    target_months: Option<u32>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Debug)]
struct ApiRequest {
    debts: Vec<DebtSnapshot>,
    extra_payment: f64,
    strategy: Strategy,
    config: SimulationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SimulateResponse {
    result: SimulationResult,
    summary: PayoffSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceResponse {
    strategy: Strategy,
    rows: Vec<MonthTraceRow>,
}

#[derive(Debug, Serialize)]
struct PriorityResponse {
    scores: Vec<PriorityScore>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("debtplan HTTP API listening on http://{addr}");
    log::info!("default month cap: {}", config.month_cap);

    axum::serve(listener, router(config)).await
}

fn router(config: ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/trace", post(trace_handler))
        .route("/api/priority", post(priority_handler))
        .route("/api/solve", post(solve_handler))
        .fallback(not_found_handler)
        .with_state(config)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(
    State(config): State<ServerConfig>,
    Query(query): Query<SimulateQuery>,
) -> Response {
    match payload_from_query(query) {
        Ok(payload) => simulate_handler_impl(config, payload),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn simulate_post_handler(
    State(config): State<ServerConfig>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    simulate_handler_impl(config, payload)
}

fn simulate_handler_impl(config: ServerConfig, payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload, &config, today()) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    log::info!(
        "simulate: {} debts, extra {:.2}, {:?}, cap {}",
        request.debts.len(),
        request.extra_payment,
        request.strategy,
        request.config.month_cap
    );

    match simulate(
        &request.debts,
        request.extra_payment,
        request.strategy,
        &request.config,
    ) {
        Ok(result) => {
            if !result.outcome.is_paid_off() {
                log::warn!(
                    "simulate: balances not cleared within {} months",
                    request.config.month_cap
                );
            }
            json_response(StatusCode::OK, build_simulate_response(result))
        }
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn trace_handler(
    State(config): State<ServerConfig>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    let request = match api_request_from_payload(payload, &config, today()) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    log::info!(
        "trace: {} debts, extra {:.2}, {:?}",
        request.debts.len(),
        request.extra_payment,
        request.strategy
    );

    match run_monthly_trace(
        &request.debts,
        request.extra_payment,
        request.strategy,
        &request.config,
    ) {
        Ok(rows) => json_response(
            StatusCode::OK,
            TraceResponse {
                strategy: request.strategy,
                rows,
            },
        ),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn priority_handler(Json(payload): Json<PriorityPayload>) -> Response {
    log::info!("priority: {} debts", payload.debts.len());
    match priority_scores(&payload.debts) {
        Ok(scores) => json_response(StatusCode::OK, PriorityResponse { scores }),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn solve_handler(
    State(config): State<ServerConfig>,
    Json(payload): Json<SolvePayload>,
) -> Response {
    match solve_from_payload(payload, &config, today()) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn solve_from_payload(
    payload: SolvePayload,
    defaults: &ServerConfig,
    today: NaiveDate,
) -> Result<ExtraPaymentSolveResult, String> {
    let Some(target_months) = payload.target_months else {
        return Err("targetMonths is required".to_string());
    };
    let month_cap = check_month_cap(payload.month_cap.unwrap_or(defaults.month_cap))?;
    let config = SimulationConfig {
        month_cap,
        start_date: payload.start_date.unwrap_or(today),
    };
    let strategy = payload
        .strategy
        .map(Strategy::from)
        .unwrap_or(Strategy::Avalanche);

    let mut goal = ExtraPaymentGoal::within_months(target_months);
    if let Some(v) = payload.search_max {
        goal.search_max = v;
    }
    if let Some(v) = payload.tolerance {
        goal.tolerance = v;
    }
    if let Some(v) = payload.max_iterations {
        goal.max_iterations = v;
    }

    log::info!(
        "solve: {} debts, target {} months, {:?}",
        payload.debts.len(),
        target_months,
        strategy
    );
    solve_extra_payment(&payload.debts, strategy, &config, goal).map_err(|e| e.to_string())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn with_cache_control(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)).into_response())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str, defaults: &ServerConfig) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    let today = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    api_request_from_payload(payload, defaults, today)
}

fn api_request_from_payload(
    payload: SimulatePayload,
    defaults: &ServerConfig,
    today: NaiveDate,
) -> Result<ApiRequest, String> {
    let extra_payment = payload.extra_payment.unwrap_or(0.0);
    if !extra_payment.is_finite() || extra_payment < 0.0 {
        return Err("extraPayment must be >= 0".to_string());
    }
    let month_cap = check_month_cap(payload.month_cap.unwrap_or(defaults.month_cap))?;

    Ok(ApiRequest {
        debts: payload.debts,
        extra_payment,
        strategy: payload
            .strategy
            .map(Strategy::from)
            .unwrap_or(Strategy::Avalanche),
        config: SimulationConfig {
            month_cap,
            start_date: payload.start_date.unwrap_or(today),
        },
    })
}

fn payload_from_query(query: SimulateQuery) -> Result<SimulatePayload, String> {
    let debts = match query.debts.as_deref() {
        Some(raw) => parse_debt_list(raw)?,
        None => Vec::new(),
    };
    Ok(SimulatePayload {
        debts,
        extra_payment: query.extra_payment,
        strategy: query.strategy,
        month_cap: query.month_cap,
        start_date: query.start_date,
    })
}

fn parse_debt_list(raw: &str) -> Result<Vec<DebtSnapshot>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_debt_spec)
        .collect()
}

/// Parses `balance:apr:minimum` with an optional `:promoApr:promoMonths` suffix.
pub fn parse_debt_spec(raw: &str) -> Result<DebtSnapshot, String> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 5 {
        return Err(format!(
            "debt '{raw}' must be balance:apr:minimum or balance:apr:minimum:promoApr:promoMonths"
        ));
    }

    let number = |index: usize, name: &str| -> Result<f64, String> {
        parts[index]
            .parse::<f64>()
            .map_err(|e| format!("debt '{raw}': invalid {name}: {e}"))
    };

    let mut debt = DebtSnapshot::new(
        number(0, "balance")?,
        number(1, "apr")?,
        number(2, "minimum")?,
    );
    if parts.len() == 5 {
        let months = parts[4]
            .parse::<u32>()
            .map_err(|e| format!("debt '{raw}': invalid promoMonths: {e}"))?;
        debt = debt.with_promotion(number(3, "promoApr")?, months);
    }
    Ok(debt)
}

pub(crate) fn build_simulate_response(result: SimulationResult) -> SimulateResponse {
    let summary = PayoffSummary::from_result(&result);
    SimulateResponse { result, summary }
}
