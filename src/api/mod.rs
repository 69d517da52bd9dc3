use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    AggregateReport, DEFAULT_HORIZON_YEARS, DEFAULT_NUM_RUNS, DEFAULT_SEED, Outlook,
    Recommendation, RiskFactor, SamplingBand, Scenario, ScenarioComparison, ScenarioOverrides, SimulationConfig,
    StateSnapshot, Verdict, compare_scenarios, run_monte_carlo, run_yearly_trace,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenario {
    Default,
    Pessimistic,
    Realistic,
    Optimistic,
}

impl From<CliScenario> for Scenario {
    fn from(value: CliScenario) -> Self {
        match value {
            CliScenario::Default => Scenario::Default,
            CliScenario::Pessimistic => Scenario::Pessimistic,
            CliScenario::Realistic => Scenario::Realistic,
            CliScenario::Optimistic => Scenario::Optimistic,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiScenario {
    #[serde(alias = "Default", alias = "base")]
    Default,
    #[serde(alias = "Pessimistic", alias = "bear")]
    Pessimistic,
    #[serde(alias = "Realistic", alias = "base-case")]
    Realistic,
    #[serde(alias = "Optimistic", alias = "bull")]
    Optimistic,
}

impl From<ApiScenario> for CliScenario {
    fn from(value: ApiScenario) -> Self {
        match value {
            ApiScenario::Default => CliScenario::Default,
            ApiScenario::Pessimistic => CliScenario::Pessimistic,
            ApiScenario::Realistic => CliScenario::Realistic,
            ApiScenario::Optimistic => CliScenario::Optimistic,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    scenario: Option<ApiScenario>,
    #[serde(alias = "runs", alias = "numRuns")]
    simulations: Option<u32>,
    #[serde(alias = "horizonYears")]
    years: Option<u32>,
    seed: Option<u64>,

    initial_accounts: Option<u64>,
    initial_validators: Option<u32>,
    adoption_min: Option<f64>,
    adoption_max: Option<f64>,
    competition_min: Option<f64>,
    competition_max: Option<f64>,

    trace_run: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "kratos-sim",
    about = "Monte Carlo viability estimator for a proof-of-stake network (economics, validators, governance, security)"
)]
struct Cli {
    #[arg(long, value_enum, default_value_t = CliScenario::Default)]
    scenario: CliScenario,
    #[arg(long, default_value_t = DEFAULT_NUM_RUNS)]
    simulations: u32,
    #[arg(long, default_value_t = DEFAULT_HORIZON_YEARS, help = "Simulated horizon in years")]
    years: u32,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    #[arg(long, help = "Starting active account count")]
    initial_accounts: Option<u64>,
    #[arg(
        long,
        help = "Starting validator count; also resets the starting stake to 10,000 per validator"
    )]
    initial_validators: Option<u32>,
    #[arg(long, requires = "adoption_max")]
    adoption_min: Option<f64>,
    #[arg(long, requires = "adoption_min")]
    adoption_max: Option<f64>,
    #[arg(long, requires = "competition_max")]
    competition_min: Option<f64>,
    #[arg(long, requires = "competition_min")]
    competition_max: Option<f64>,
    #[arg(long, help = "Include the year-by-year history of this run id")]
    trace_run: Option<u32>,
    #[arg(
        long,
        default_value_t = false,
        help = "Run pessimistic, realistic and optimistic batches and blend them"
    )]
    compare: bool,
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Debug)]
struct ApiRequest {
    config: SimulationConfig,
    trace_run: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    scenario: Scenario,
    success_rate_percent: f64,
    verdict: Verdict,
    outlook: Outlook,
    risk_factors: Vec<RiskFactor>,
    recommendations: Vec<RecommendationEntry>,
    report: AggregateReport,
    trace_run_id: Option<u32>,
    trace: Vec<StateSnapshot>,
}

#[derive(Debug, Serialize)]
struct RecommendationEntry {
    code: Recommendation,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_config(cli: &Cli) -> Result<SimulationConfig, String> {
    if cli.simulations == 0 {
        return Err("--simulations must be > 0".to_string());
    }

    if cli.years == 0 {
        return Err("--years must be > 0".to_string());
    }

    if let Some(run) = cli.trace_run {
        if run >= cli.simulations {
            return Err("--trace-run must be < --simulations".to_string());
        }
    }

    let overrides = ScenarioOverrides {
        initial_accounts: cli.initial_accounts,
        initial_validators: cli.initial_validators,
        adoption_range: band_from_flags("adoption", cli.adoption_min, cli.adoption_max)?,
        competition_range: band_from_flags("competition", cli.competition_min, cli.competition_max)?,
    };

    SimulationConfig::new(cli.scenario.into(), cli.simulations, cli.years, cli.seed)
        .and_then(|config| config.with_overrides(overrides))
        .map_err(|e| e.to_string())
}

fn band_from_flags(
    field: &'static str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<Option<SamplingBand>, String> {
    match (min, max) {
        (None, None) => Ok(None),
        (Some(low), Some(high)) => SamplingBand::new(field, low, high)
            .map(Some)
            .map_err(|e| format!("--{field}-min/--{field}-max: {e}")),
        _ => Err(format!("--{field}-min and --{field}-max must be given together")),
    }
}

pub fn run_cli(args: Vec<String>) -> Result<(), String> {
    let cli = Cli::parse_from(args);
    let config = build_config(&cli)?;

    let json = if cli.compare {
        let comparison = compare_scenarios(&config).map_err(|e| e.to_string())?;
        to_json(&comparison, cli.pretty)?
    } else {
        let response = build_simulate_response(&config, cli.trace_run)?;
        to_json(&response, cli.pretty)?
    };

    println!("{json}");
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(|e| format!("failed to serialize report: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "kratos-sim HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match build_simulate_response(&request.config, request.trace_run) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn compare_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match compare_scenarios(&request.config) {
        Ok(comparison) => json_response::<ScenarioComparison>(StatusCode::OK, comparison),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
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
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.scenario {
        cli.scenario = v.into();
    }
    if let Some(v) = payload.simulations {
        cli.simulations = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }

    cli.initial_accounts = payload.initial_accounts;
    cli.initial_validators = payload.initial_validators;
    cli.adoption_min = payload.adoption_min;
    cli.adoption_max = payload.adoption_max;
    cli.competition_min = payload.competition_min;
    cli.competition_max = payload.competition_max;
    cli.trace_run = payload.trace_run;

    let config = build_config(&cli).map_err(|msg| api_error_message(&msg))?;
    Ok(ApiRequest {
        config,
        trace_run: cli.trace_run,
    })
}

// Rewrites CLI flag names into the JSON keys the API caller used.
fn api_error_message(msg: &str) -> String {
    [
        ("--simulations", "simulations"),
        ("--years", "years"),
        ("--trace-run", "traceRun"),
        ("--adoption-min", "adoptionMin"),
        ("--adoption-max", "adoptionMax"),
        ("--competition-min", "competitionMin"),
        ("--competition-max", "competitionMax"),
    ]
    .iter()
    .fold(msg.to_string(), |acc, (flag, key)| acc.replace(flag, key))
}

fn default_cli_for_api() -> Cli {
    Cli {
        scenario: CliScenario::Default,
        simulations: DEFAULT_NUM_RUNS,
        years: DEFAULT_HORIZON_YEARS,
        seed: DEFAULT_SEED,
        initial_accounts: None,
        initial_validators: None,
        adoption_min: None,
        adoption_max: None,
        competition_min: None,
        competition_max: None,
        trace_run: None,
        compare: false,
        pretty: false,
    }
}

fn build_simulate_response(
    config: &SimulationConfig,
    trace_run: Option<u32>,
) -> Result<SimulateResponse, String> {
    let report = run_monte_carlo(config).map_err(|e| e.to_string())?;
    let trace = trace_run
        .map(|run_id| run_yearly_trace(config, run_id))
        .unwrap_or_default();

    Ok(SimulateResponse {
        scenario: report.scenario,
        success_rate_percent: report.success_rate_percent(),
        verdict: report.verdict(),
        outlook: report.outlook(),
        risk_factors: report.risk_factors(),
        recommendations: report
            .recommendations()
            .into_iter()
            .map(|code| RecommendationEntry {
                code,
                message: code.message(),
            })
            .collect(),
        trace_run_id: trace_run,
        trace,
        report,
    })
}
