use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use argus_analysis::error::AnalyzerError;
use argus_analysis::event_store::{CountFilter, EventStore, DEFAULT_QUERY_LIMIT};
use argus_analysis::traffic_stats::{self, AttackStats, IpActivity, PayloadActivity, DEFAULT_TOP_N};
use argus_analysis::types::{EventInput, HttpEventRecord};

mod capture;

// ── Configuration ────────────────────────────────────────────────────────────

#[derive(Clone)]
struct AppConfig {
    port: u16,
    /// Most-recent records fed to the aggregate endpoints — a bounded
    /// sample, not a full-table scan.
    stats_sample_limit: i64,
}

impl AppConfig {
    fn from_env() -> Self {
        AppConfig {
            port: env_or("PORT", "5000").parse().unwrap_or(5000),
            stats_sample_limit: env_or("STATS_SAMPLE_LIMIT", "1000").parse().unwrap_or(1000),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

// ── Server State ─────────────────────────────────────────────────────────────

struct ServerState {
    config: AppConfig,
    store: EventStore,
}

// ── Request / Response Types ─────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(err: AnalyzerError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        AnalyzerError::NotFound(_) => StatusCode::NOT_FOUND,
        AnalyzerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AnalyzerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

#[derive(Deserialize)]
struct IngestRequest {
    entries: Vec<EventInput>,
}

#[derive(Serialize)]
struct IngestResponse {
    count: usize,
}

#[derive(Serialize)]
struct CaptureResponse {
    events: Vec<HttpEventRecord>,
    count: usize,
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<i64>,
}

#[derive(Serialize)]
struct ListResponse {
    items: Vec<HttpEventRecord>,
}

#[derive(Serialize)]
struct ItemResponse {
    item: HttpEventRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    total: usize,
    attack_count: usize,
    successful_count: usize,
}

#[derive(Deserialize)]
struct SampleQuery {
    sample: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportResponse {
    top_ips: Vec<IpActivity>,
    top_payloads: Vec<PayloadActivity>,
    unique_ips: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn root() -> &'static str {
    "HTTP Traffic Attack Analyzer API running"
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Classify and store a batch of raw events. All-or-nothing: a malformed
/// batch stores nothing.
async fn ingest(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(req) = payload
        .map_err(|rejection| error_response(AnalyzerError::InvalidInput(rejection.body_text())))?;
    let stored = state.store.insert_many(req.entries);
    Ok(Json(IngestResponse { count: stored.len() }))
}

/// Accept an uploaded capture artifact, hand it to the capture ingester,
/// and store the resulting batch.
async fn upload_capture(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<CaptureResponse>, (StatusCode, Json<ErrorResponse>)> {
    if body.is_empty() {
        return Err(error_response(AnalyzerError::InvalidInput(
            "no capture data uploaded".into(),
        )));
    }
    let inputs = capture::synthesize_events(body.len(), chrono::Utc::now(), state.store.engine());
    let events = state.store.insert_many(inputs);
    let count = events.len();
    tracing::info!(bytes = body.len(), count, "capture artifact ingested");
    Ok(Json(CaptureResponse { events, count }))
}

async fn list_logs(
    State(state): State<Arc<ServerState>>,
    Query(q): Query<ListQuery>,
) -> Json<ListResponse> {
    let limit = q.limit.unwrap_or(DEFAULT_QUERY_LIMIT as i64);
    Json(ListResponse { items: state.store.find_sorted_limited(limit) })
}

async fn get_log(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.store.find_by_id(&id) {
        Some(item) => Ok(Json(ItemResponse { item })),
        None => Err(error_response(AnalyzerError::NotFound(id))),
    }
}

async fn stats_summary(State(state): State<Arc<ServerState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        total: state.store.count_matching(CountFilter::all()),
        attack_count: state.store.count_matching(CountFilter::attacks()),
        successful_count: state.store.count_matching(CountFilter::successful()),
    })
}

async fn stats_attacks(
    State(state): State<Arc<ServerState>>,
    Query(q): Query<SampleQuery>,
) -> Json<AttackStats> {
    let sample = q.sample.unwrap_or(state.config.stats_sample_limit);
    let items = state.store.find_sorted_limited(sample);
    Json(traffic_stats::aggregate(&items))
}

async fn stats_report(
    State(state): State<Arc<ServerState>>,
    Query(q): Query<SampleQuery>,
) -> Json<ReportResponse> {
    let sample = q.sample.unwrap_or(state.config.stats_sample_limit);
    let items = state.store.find_sorted_limited(sample);
    Json(ReportResponse {
        top_ips: traffic_stats::top_source_ips(&items, DEFAULT_TOP_N),
        top_payloads: traffic_stats::top_payloads(&items, DEFAULT_TOP_N),
        unique_ips: traffic_stats::unique_source_ips(&items),
    })
}

// ── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("argus_server=info".parse().unwrap())
                .add_directive("argus_analysis=info".parse().unwrap()),
        )
        .init();

    let config = AppConfig::from_env();
    let port = config.port;
    let state = Arc::new(ServerState { config, store: EventStore::new() });

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/logs", get(list_logs))
        .route("/api/logs/ingest", post(ingest))
        .route("/api/logs/capture", post(upload_capture))
        .route("/api/logs/stats/summary", get(stats_summary))
        .route("/api/logs/stats/attacks", get(stats_attacks))
        .route("/api/logs/stats/report", get(stats_report))
        .route("/api/logs/:id", get(get_log))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Traffic analyzer API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
