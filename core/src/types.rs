//! Payload DTOs for the evaluation API.
//!
//! # Design
//! Field names follow the backend's camelCase JSON. The types are defined
//! independently of the mock server's; integration tests catch schema drift.
//! Opaque results (comprehensive score, Python evaluation) stay as
//! `serde_json::Value` because the backend does not fix their shape.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One of the eight evaluation dimensions the backend ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Reliability.
    RL,
    /// Security.
    SC,
    /// Anti-jamming.
    AJ,
    /// Effectiveness.
    EF,
    /// Processing.
    PO,
    /// Networking.
    NC,
    /// Human operation.
    HO,
    /// Response speed.
    RS,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::RL,
        Dimension::SC,
        Dimension::AJ,
        Dimension::EF,
        Dimension::PO,
        Dimension::NC,
        Dimension::HO,
        Dimension::RS,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Dimension::RL => "RL",
            Dimension::SC => "SC",
            Dimension::AJ => "AJ",
            Dimension::EF => "EF",
            Dimension::PO => "PO",
            Dimension::NC => "NC",
            Dimension::HO => "HO",
            Dimension::RS => "RS",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.code() == s)
            .ok_or_else(|| format!("unknown dimension: {s}"))
    }
}

/// Dimension ranks keyed by dimension code, e.g. `{"RL": 1, "SC": 2}`.
///
/// Keys are free-form strings: the client forwards whatever it is given.
pub type Priorities = BTreeMap<String, i32>;

/// Weights keyed by dimension code.
pub type Weights = BTreeMap<String, f64>;

/// Convenience constructor for the common case of ranking every dimension
/// in the given order (first = rank 1).
pub fn priorities_in_order(order: &[Dimension]) -> Priorities {
    order
        .iter()
        .zip(1..)
        .map(|(d, rank)| (d.code().to_string(), rank))
        .collect()
}

/// A single column of a browsable table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    #[serde(default)]
    pub column_comment: Option<String>,
    #[serde(default)]
    pub column_length: Option<i64>,
    #[serde(default)]
    pub nullable: Option<bool>,
    /// `PRI`, `UNI`, `MUL` or empty.
    #[serde(default)]
    pub column_key: Option<String>,
}

/// One page of table rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub records: Vec<Map<String, Value>>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u32,
}

/// Request body for `POST /evaluation/ahp/calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AhpRequest {
    pub priorities: Priorities,
}

/// Pairwise-comparison matrix and derived weights computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AhpResult {
    pub matrix: Vec<Vec<f64>>,
    pub weights: Weights,
    /// Consistency ratio.
    pub cr: f64,
    /// Whether `cr < 0.1`.
    pub consistent: bool,
    pub dimensions: Vec<String>,
}

/// Request body for `POST /evaluation/comprehensive/calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveRequest {
    pub ahp_weights: Weights,
}

/// Request body for `POST /python-evaluation/calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PythonEvaluationRequest {
    pub priorities: Priorities,
}

/// Result of `GET /python-evaluation/test-environment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentStatus {
    pub success: bool,
    #[serde(default)]
    pub python_version: Option<String>,
    #[serde(default)]
    pub python_executable: Option<String>,
    #[serde(default)]
    pub script_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub system: String,
    pub version: String,
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub api_doc: Option<String>,
}
