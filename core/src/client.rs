//! Stateless HTTP request builder and response parser for the evaluation API.
//!
//! # Design
//! `EvalClient` holds only the API root (`base_url` + `/api`) and the call
//! timeout, and carries no mutable state between calls. Each backend operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. Every `parse_*` goes through
//! [`unwrap_envelope`], so success and failure handling is identical across
//! operations and only the payload type differs.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::envelope::unwrap_envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AhpRequest, AhpResult, ColumnInfo, ComprehensiveRequest, EnvironmentStatus, PageResult,
    Priorities, PythonEvaluationRequest, SystemInfo, Weights,
};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Page selector for table data. Missing values default to page 1, size 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    pub fn new(page: Option<u32>, size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

/// Synchronous, stateless client for the evaluation API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct EvalClient {
    api_root: String,
    timeout: Duration,
}

impl EvalClient {
    /// Client rooted at `{base_url}/api`.
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            api_root: config.api_root(),
            timeout: config.timeout,
        }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Bound stamped on every built request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{path}", self.api_root),
            headers: Vec::new(),
            body: None,
            timeout: self.timeout,
        }
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{path}", self.api_root),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
            timeout: self.timeout,
        })
    }

    // --- tables ---

    pub fn build_allowed_tables(&self) -> HttpRequest {
        self.get("/table/allowed")
    }

    pub fn build_table_structure(&self, table_name: &str) -> HttpRequest {
        self.get(&format!("/table/structure/{}", urlencoding::encode(table_name)))
    }

    pub fn build_table_data(&self, table_name: &str, query: PageQuery) -> HttpRequest {
        self.get(&format!(
            "/table/data/{}?page={}&size={}",
            urlencoding::encode(table_name),
            query.page,
            query.size
        ))
    }

    pub fn parse_allowed_tables(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_table_structure(&self, response: HttpResponse) -> Result<Vec<ColumnInfo>, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_table_data(&self, response: HttpResponse) -> Result<PageResult, ApiError> {
        unwrap_envelope(response)
    }

    // --- evaluation ---

    pub fn build_calculate_ahp(&self, priorities: &Priorities) -> Result<HttpRequest, ApiError> {
        self.post_json(
            "/evaluation/ahp/calculate",
            &AhpRequest {
                priorities: priorities.clone(),
            },
        )
    }

    pub fn build_calculate_comprehensive(&self, ahp_weights: &Weights) -> Result<HttpRequest, ApiError> {
        self.post_json(
            "/evaluation/comprehensive/calculate",
            &ComprehensiveRequest {
                ahp_weights: ahp_weights.clone(),
            },
        )
    }

    pub fn parse_calculate_ahp(&self, response: HttpResponse) -> Result<AhpResult, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_calculate_comprehensive(&self, response: HttpResponse) -> Result<Value, ApiError> {
        unwrap_envelope(response)
    }

    // --- python evaluation service ---

    pub fn build_python_evaluation(&self, priorities: &Priorities) -> Result<HttpRequest, ApiError> {
        self.post_json(
            "/python-evaluation/calculate",
            &PythonEvaluationRequest {
                priorities: priorities.clone(),
            },
        )
    }

    pub fn build_test_python_environment(&self) -> HttpRequest {
        self.get("/python-evaluation/test-environment")
    }

    pub fn parse_python_evaluation(&self, response: HttpResponse) -> Result<Map<String, Value>, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_test_python_environment(&self, response: HttpResponse) -> Result<EnvironmentStatus, ApiError> {
        unwrap_envelope(response)
    }

    // --- system ---

    pub fn build_health(&self) -> HttpRequest {
        self.get("/health")
    }

    pub fn build_system_info(&self) -> HttpRequest {
        self.get("/")
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<String, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_system_info(&self, response: HttpResponse) -> Result<SystemInfo, ApiError> {
        unwrap_envelope(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{priorities_in_order, Dimension};

    fn client() -> EvalClient {
        EvalClient::new("http://localhost:3000")
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_allowed_tables_produces_correct_request() {
        let req = client().build_allowed_tables();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/table/allowed");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_table_structure_encodes_name() {
        let req = client().build_table_structure("during_battle_communications");
        assert_eq!(
            req.path,
            "http://localhost:3000/api/table/structure/during_battle_communications"
        );

        let req = client().build_table_structure("a b/c");
        assert_eq!(req.path, "http://localhost:3000/api/table/structure/a%20b%2Fc");
    }

    #[test]
    fn build_table_data_defaults_to_first_page_of_twenty() {
        let req = client().build_table_data("t", PageQuery::new(None, None));
        assert_eq!(req.path, "http://localhost:3000/api/table/data/t?page=1&size=20");
    }

    #[test]
    fn build_table_data_passes_explicit_paging() {
        let req = client().build_table_data("t", PageQuery::new(Some(3), Some(50)));
        assert_eq!(req.path, "http://localhost:3000/api/table/data/t?page=3&size=50");

        let req = client().build_table_data("t", PageQuery::new(Some(2), None));
        assert_eq!(req.path, "http://localhost:3000/api/table/data/t?page=2&size=20");
    }

    #[test]
    fn build_calculate_ahp_wraps_priorities() {
        let priorities = priorities_in_order(&Dimension::ALL);
        let req = client().build_calculate_ahp(&priorities).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/evaluation/ahp/calculate");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["priorities"]["RL"], 1);
        assert_eq!(body["priorities"]["RS"], 8);
    }

    #[test]
    fn build_calculate_comprehensive_uses_ahp_weights_key() {
        let weights = Weights::from([("RL".to_string(), 0.25), ("SC".to_string(), 0.75)]);
        let req = client().build_calculate_comprehensive(&weights).unwrap();
        assert_eq!(
            req.path,
            "http://localhost:3000/api/evaluation/comprehensive/calculate"
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["ahpWeights"]["SC"], 0.75);
    }

    #[test]
    fn build_python_evaluation_does_not_validate() {
        let priorities = Priorities::from([("ZZ".to_string(), 99)]);
        let req = client().build_python_evaluation(&priorities).unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/python-evaluation/calculate");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"priorities":{"ZZ":99}}));
    }

    #[test]
    fn build_get_endpoints() {
        let c = client();
        assert_eq!(
            c.build_test_python_environment().path,
            "http://localhost:3000/api/python-evaluation/test-environment"
        );
        assert_eq!(c.build_health().path, "http://localhost:3000/api/health");
        assert_eq!(c.build_system_info().path, "http://localhost:3000/api/");
    }

    #[test]
    fn parse_table_data_success() {
        let body = r#"{"code":200,"message":"ok","data":{"records":[{"id":1}],"total":41,"page":1,"size":20,"totalPages":3}}"#;
        let page = client().parse_table_data(ok(body)).unwrap();
        assert_eq!(page.total, 41);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.records[0]["id"], 1);
    }

    #[test]
    fn parse_table_structure_application_error() {
        let body = r#"{"code":400,"message":"table not allowed: users"}"#;
        let err = client().parse_table_structure(ok(body)).unwrap_err();
        assert!(matches!(err, ApiError::Application { code: 400, .. }));
        assert_eq!(err.to_string(), "table not allowed: users");
    }

    #[test]
    fn parse_calculate_ahp_success() {
        let body = r#"{"code":200,"data":{"matrix":[[1.0]],"weights":{"RL":1.0},"cr":0.0,"consistent":true,"dimensions":["RL"]}}"#;
        let result = client().parse_calculate_ahp(ok(body)).unwrap();
        assert!(result.consistent);
        assert_eq!(result.weights["RL"], 1.0);
    }

    #[test]
    fn parse_test_python_environment_success() {
        let body = r#"{"code":200,"data":{"success":true,"pythonVersion":"Python 3.11.4"}}"#;
        let status = client().parse_test_python_environment(ok(body)).unwrap();
        assert!(status.success);
        assert_eq!(status.python_version.as_deref(), Some("Python 3.11.4"));
    }

    #[test]
    fn parse_python_evaluation_keeps_object() {
        let body = r#"{"code":200,"data":{"success":true,"results":[1,2]}}"#;
        let result = client().parse_python_evaluation(ok(body)).unwrap();
        assert_eq!(result["results"], serde_json::json!([1, 2]));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = EvalClient::new("http://localhost:3000/");
        let req = client.build_allowed_tables();
        assert_eq!(req.path, "http://localhost:3000/api/table/allowed");
    }

    #[test]
    fn built_requests_carry_configured_timeout() {
        assert_eq!(client().build_health().timeout, Duration::from_secs(30));

        let fast = EvalClient::from_config(&ClientConfig::new("http://h").with_timeout(Duration::from_secs(1)));
        let slow = EvalClient::from_config(&ClientConfig::new("http://h").with_timeout(Duration::from_secs(300)));
        assert_eq!(fast.build_health().timeout, Duration::from_secs(1));
        assert_ne!(fast.build_health(), slow.build_health());

        let priorities = Priorities::from([("RL".to_string(), 1)]);
        assert_eq!(
            slow.build_calculate_ahp(&priorities).unwrap().timeout,
            Duration::from_secs(300)
        );
    }

    #[test]
    fn from_config_honours_prefix() {
        let config = ClientConfig::new("http://h").with_api_prefix("/v2");
        let client = EvalClient::from_config(&config);
        assert_eq!(client.build_health().path, "http://h/v2/health");
    }
}
