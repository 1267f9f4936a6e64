//! In-memory stand-in for the evaluation backend.
//!
//! Every endpoint answers HTTP 200 with a `{code, message, data}` envelope,
//! failures included, the way the real backend does. Table contents are
//! fixtures; AHP weights use the rank-difference judgement matrix with
//! geometric-mean weights.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub const DIMENSIONS: [&str; 8] = ["RL", "SC", "AJ", "EF", "PO", "NC", "HO", "RS"];

/// Random consistency index by matrix order.
const RANDOM_INDEX: [f64; 11] = [0.0, 0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            code: 200,
            message: message.to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub column_comment: String,
    pub column_length: Option<i64>,
    pub nullable: bool,
    pub column_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub records: Vec<Map<String, Value>>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AhpResult {
    pub matrix: Vec<Vec<f64>>,
    pub weights: BTreeMap<String, f64>,
    pub cr: f64,
    pub consistent: bool,
    pub dimensions: Vec<String>,
}

#[derive(Deserialize)]
pub struct PriorityRequest {
    #[serde(default)]
    pub priorities: Option<BTreeMap<String, i32>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveRequest {
    #[serde(default)]
    pub ahp_weights: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    20
}

#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Delay applied before every response.
    pub latency: Duration,
}

struct Table {
    columns: Vec<ColumnInfo>,
    rows: Vec<Map<String, Value>>,
}

#[derive(Clone)]
struct AppState {
    tables: Arc<BTreeMap<&'static str, Table>>,
    latency: Duration,
}

pub fn app() -> Router {
    app_with(MockOptions::default())
}

pub fn app_with(options: MockOptions) -> Router {
    let state = AppState {
        tables: Arc::new(fixture_tables()),
        latency: options.latency,
    };
    Router::new()
        .route("/api", get(system_info))
        .route("/api/", get(system_info))
        .route("/api/health", get(health))
        .route("/api/table/allowed", get(allowed_tables))
        .route("/api/table/structure/{table_name}", get(table_structure))
        .route("/api/table/data/{table_name}", get(table_data))
        .route("/api/evaluation/ahp/calculate", post(calculate_ahp))
        .route(
            "/api/evaluation/comprehensive/calculate",
            post(calculate_comprehensive),
        )
        .route("/api/python-evaluation/calculate", post(python_evaluation))
        .route(
            "/api/python-evaluation/test-environment",
            get(test_environment),
        )
        .layer(middleware::from_fn_with_state(state.clone(), simulate_latency))
        .with_state(state)
}

pub async fn run(listener: TcpListener, options: MockOptions) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

async fn simulate_latency(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }
    next.run(request).await
}

// --- system ---

async fn system_info() -> ApiResponse<Value> {
    ApiResponse::success(
        "system running",
        json!({
            "system": "Military communication effectiveness evaluation",
            "version": "1.0.0",
            "status": "running",
            "apiDoc": "/swagger-ui.html",
        }),
    )
}

async fn health() -> ApiResponse<&'static str> {
    ApiResponse::success("healthy", "OK")
}

// --- tables ---

async fn allowed_tables(State(state): State<AppState>) -> ApiResponse<Vec<&'static str>> {
    info!("allowed tables requested");
    ApiResponse::success("ok", state.tables.keys().copied().collect())
}

async fn table_structure(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
) -> ApiResponse<Vec<ColumnInfo>> {
    info!("table structure requested: {table_name}");
    match state.tables.get(table_name.as_str()) {
        Some(table) => ApiResponse::success("ok", table.columns.clone()),
        None => not_allowed(&table_name),
    }
}

async fn table_data(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResponse<PageResult> {
    info!(
        "table data requested: {table_name} (page={}, size={})",
        params.page, params.size
    );
    let Some(table) = state.tables.get(table_name.as_str()) else {
        return not_allowed(&table_name);
    };
    if params.page == 0 || params.size == 0 {
        return ApiResponse::error(400, "page and size must be positive");
    }

    let total = table.rows.len();
    let offset = (params.page as usize - 1).saturating_mul(params.size as usize);
    let records = table
        .rows
        .iter()
        .skip(offset)
        .take(params.size as usize)
        .cloned()
        .collect();
    ApiResponse::success(
        "ok",
        PageResult {
            records,
            total: total as u64,
            page: params.page,
            size: params.size,
            total_pages: total.div_ceil(params.size as usize) as u32,
        },
    )
}

fn not_allowed<T>(table_name: &str) -> ApiResponse<T> {
    warn!("rejected table: {table_name}");
    ApiResponse::error(400, format!("table not allowed: {table_name}"))
}

// --- evaluation ---

async fn calculate_ahp(Json(request): Json<PriorityRequest>) -> ApiResponse<AhpResult> {
    info!("AHP calculation requested: {:?}", request.priorities);
    let priorities = request.priorities.unwrap_or_default();
    match ahp(&priorities) {
        Ok(result) => ApiResponse::success("calculation succeeded", result),
        Err(msg) => ApiResponse::error(500, format!("calculation failed: {msg}")),
    }
}

async fn calculate_comprehensive(Json(request): Json<ComprehensiveRequest>) -> ApiResponse<Value> {
    if request.ahp_weights.is_empty() {
        return ApiResponse::error(500, "missing ahpWeights");
    }
    let mut dimension_scores = Map::new();
    let mut total = 0.0;
    for (dim, weight) in &request.ahp_weights {
        let score = fixture_score(dim);
        total += weight * score;
        dimension_scores.insert(dim.clone(), json!(score));
    }
    ApiResponse::success(
        "calculation succeeded",
        json!({
            "totalScore": total,
            "grade": grade(total),
            "dimensionScores": dimension_scores,
        }),
    )
}

async fn python_evaluation(Json(request): Json<PriorityRequest>) -> ApiResponse<Value> {
    let priorities = match request.priorities {
        Some(p) if !p.is_empty() => p,
        _ => return ApiResponse::error(500, "missing priorities"),
    };
    if let Some(dim) = DIMENSIONS.iter().find(|d| !priorities.contains_key(**d)) {
        return ApiResponse::error(500, format!("missing dimension: {dim}"));
    }
    match ahp(&priorities) {
        Ok(result) => {
            let total: f64 = result
                .weights
                .iter()
                .map(|(dim, w)| w * fixture_score(dim))
                .sum();
            ApiResponse::success(
                "evaluation succeeded",
                json!({
                    "success": true,
                    "weights": result.weights,
                    "cr": result.cr,
                    "totalScore": total,
                    "grade": grade(total),
                }),
            )
        }
        Err(msg) => ApiResponse::error(500, format!("evaluation failed: {msg}")),
    }
}

async fn test_environment() -> ApiResponse<Value> {
    ApiResponse::success(
        "python environment ok",
        json!({
            "success": true,
            "pythonVersion": "Python 3.11.0",
            "pythonExecutable": "python3",
            "scriptPath": "python_service/evaluation_service.py",
        }),
    )
}

/// Judgement matrix from rank differences: a rank gap of `d` in favour of
/// row `i` scores `d + 1`, the mirror cell its reciprocal.
pub fn ahp(priorities: &BTreeMap<String, i32>) -> Result<AhpResult, String> {
    let dims: Vec<&str> = DIMENSIONS
        .iter()
        .copied()
        .filter(|d| priorities.contains_key(*d))
        .collect();
    if dims.is_empty() {
        return Err("no known dimensions".to_string());
    }
    let ranks: Vec<i64> = dims.iter().map(|d| i64::from(priorities[*d])).collect();
    let n = dims.len();

    let matrix: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    let diff = ranks[j] - ranks[i];
                    if diff > 0 {
                        (diff + 1) as f64
                    } else if diff < 0 {
                        1.0 / (1 - diff) as f64
                    } else {
                        1.0
                    }
                })
                .collect()
        })
        .collect();

    let means: Vec<f64> = matrix
        .iter()
        .map(|row| row.iter().product::<f64>().powf(1.0 / n as f64))
        .collect();
    let sum: f64 = means.iter().sum();
    let weights: Vec<f64> = means.iter().map(|g| g / sum).collect();

    let lambda_max = matrix
        .iter()
        .zip(&weights)
        .map(|(row, w)| row.iter().zip(&weights).map(|(a, wj)| a * wj).sum::<f64>() / w)
        .sum::<f64>()
        / n as f64;
    let cr = if n < 3 {
        0.0
    } else {
        let ci = (lambda_max - n as f64) / (n as f64 - 1.0);
        let ri = RANDOM_INDEX.get(n).copied().unwrap_or(1.49);
        (ci / ri).max(0.0)
    };

    Ok(AhpResult {
        matrix,
        weights: dims
            .iter()
            .zip(&weights)
            .map(|(d, w)| (d.to_string(), *w))
            .collect(),
        cr,
        consistent: cr < 0.1,
        dimensions: dims.iter().map(|d| d.to_string()).collect(),
    })
}

fn fixture_score(dimension: &str) -> f64 {
    match dimension {
        "RL" => 88.0,
        "SC" => 92.0,
        "AJ" => 76.0,
        "EF" => 81.0,
        "PO" => 85.0,
        "NC" => 79.0,
        "HO" => 70.0,
        "RS" => 90.0,
        _ => 0.0,
    }
}

fn grade(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "excellent",
        s if s >= 80.0 => "good",
        s if s >= 70.0 => "medium",
        s if s >= 60.0 => "pass",
        _ => "poor",
    }
}

// --- fixtures ---

fn column(name: &str, data_type: &str, comment: &str, key: &str) -> ColumnInfo {
    ColumnInfo {
        column_name: name.to_string(),
        data_type: data_type.to_string(),
        column_comment: comment.to_string(),
        column_length: (data_type == "varchar").then_some(64),
        nullable: key != "PRI",
        column_key: key.to_string(),
    }
}

fn fixture_tables() -> BTreeMap<&'static str, Table> {
    let mut tables = BTreeMap::new();

    tables.insert(
        "during_battle_communications",
        Table {
            columns: vec![
                column("id", "bigint", "primary key", "PRI"),
                column("test_id", "varchar", "test batch", "MUL"),
                column("scenario_id", "int", "scenario", ""),
                column("success", "tinyint", "communication succeeded", ""),
                column("latency_ms", "int", "end-to-end latency", ""),
            ],
            rows: (1..=45)
                .map(|i| row(json!({
                    "id": i,
                    "test_id": format!("T{:03}", (i - 1) / 15 + 1),
                    "scenario_id": (i - 1) % 5 + 1,
                    "success": i % 7 != 0,
                    "latency_ms": 40 + (i * 13) % 90,
                })))
                .collect(),
        },
    );

    tables.insert(
        "communication_network_lifecycle",
        Table {
            columns: vec![
                column("id", "bigint", "primary key", "PRI"),
                column("network_id", "varchar", "network", "UNI"),
                column("setup_seconds", "int", "time to establish", ""),
                column("crashes", "int", "network crashes", ""),
            ],
            rows: (1..=12)
                .map(|i| row(json!({
                    "id": i,
                    "network_id": format!("NET-{i:02}"),
                    "setup_seconds": 30 + i * 4,
                    "crashes": i % 3,
                })))
                .collect(),
        },
    );

    tables.insert(
        "military_effectiveness_evaluation",
        Table {
            columns: vec![
                column("id", "bigint", "primary key", "PRI"),
                column("test_id", "varchar", "test batch", "MUL"),
                column("total_score", "decimal", "composite score", ""),
                column("grade", "varchar", "grade", ""),
            ],
            rows: (1..=3)
                .map(|i| {
                    let score = 95.0 - f64::from(i) * 9.5;
                    row(json!({
                        "id": i,
                        "test_id": format!("T{i:03}"),
                        "total_score": score,
                        "grade": grade(score),
                    }))
                })
                .collect(),
        },
    );

    tables
}

fn row(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
