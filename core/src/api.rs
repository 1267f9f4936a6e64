//! One call per backend operation, wired through a single transport.
//!
//! # Design
//! `EvaluationApi` is constructed once at startup and passed to whatever
//! needs to talk to the backend. It owns the request builder, an optional
//! [`RequestInterceptor`] and a [`Transport`]. A call runs
//! build → intercept → execute → unwrap, and each failure is logged exactly
//! once: transport failures here, everything else inside `unwrap_envelope`.

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::client::{EvalClient, PageQuery};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{AhpResult, ColumnInfo, EnvironmentStatus, PageResult, Priorities, SystemInfo, Weights};

/// Hook applied to every outgoing request before it reaches the transport.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: HttpRequest) -> HttpRequest;
}

/// Leaves requests untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl RequestInterceptor for PassThrough {
    fn intercept(&self, request: HttpRequest) -> HttpRequest {
        request
    }
}

/// Adds fixed headers to every request, e.g. an `Authorization` token.
#[derive(Debug, Default, Clone)]
pub struct StaticHeaders {
    headers: Vec<(String, String)>,
}

impl StaticHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

impl RequestInterceptor for StaticHeaders {
    fn intercept(&self, mut request: HttpRequest) -> HttpRequest {
        for (name, value) in &self.headers {
            request.set_header(name, value);
        }
        request
    }
}

pub struct EvaluationApi<T = UreqTransport> {
    client: EvalClient,
    transport: T,
    interceptor: Box<dyn RequestInterceptor>,
}

impl EvaluationApi<UreqTransport> {
    /// Blocking transport; every request carries `config.timeout`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(EvalClient::from_config(config), UreqTransport::new())
    }

    /// See [`ClientConfig::from_env`].
    pub fn from_env() -> Self {
        Self::from_config(&ClientConfig::from_env())
    }
}

impl<T: Transport> EvaluationApi<T> {
    pub fn new(client: EvalClient, transport: T) -> Self {
        Self {
            client,
            transport,
            interceptor: Box::new(PassThrough),
        }
    }

    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptor = Box::new(interceptor);
        self
    }

    pub fn client(&self) -> &EvalClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call<R>(
        &self,
        request: HttpRequest,
        parse: impl FnOnce(&EvalClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let request = self.interceptor.intercept(request);
        debug!(method = %request.method, path = %request.path, "dispatching request");
        let response = self.transport.execute(request).map_err(|e| {
            error!(error = %e, "Request Error");
            ApiError::Transport(e)
        })?;
        parse(&self.client, response)
    }

    pub fn allowed_tables(&self) -> Result<Vec<String>, ApiError> {
        self.call(self.client.build_allowed_tables(), EvalClient::parse_allowed_tables)
    }

    pub fn table_structure(&self, table_name: &str) -> Result<Vec<ColumnInfo>, ApiError> {
        self.call(
            self.client.build_table_structure(table_name),
            EvalClient::parse_table_structure,
        )
    }

    /// `page` and `size` default to 1 and 20.
    pub fn table_data(
        &self,
        table_name: &str,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<PageResult, ApiError> {
        self.call(
            self.client.build_table_data(table_name, PageQuery::new(page, size)),
            EvalClient::parse_table_data,
        )
    }

    pub fn calculate_ahp(&self, priorities: &Priorities) -> Result<AhpResult, ApiError> {
        let request = self.client.build_calculate_ahp(priorities).map_err(logged)?;
        self.call(request, EvalClient::parse_calculate_ahp)
    }

    pub fn calculate_comprehensive(&self, ahp_weights: &Weights) -> Result<Value, ApiError> {
        let request = self
            .client
            .build_calculate_comprehensive(ahp_weights)
            .map_err(logged)?;
        self.call(request, EvalClient::parse_calculate_comprehensive)
    }

    pub fn calculate_python_evaluation(&self, priorities: &Priorities) -> Result<Map<String, Value>, ApiError> {
        let request = self.client.build_python_evaluation(priorities).map_err(logged)?;
        self.call(request, EvalClient::parse_python_evaluation)
    }

    pub fn test_python_environment(&self) -> Result<EnvironmentStatus, ApiError> {
        self.call(
            self.client.build_test_python_environment(),
            EvalClient::parse_test_python_environment,
        )
    }

    pub fn health(&self) -> Result<String, ApiError> {
        self.call(self.client.build_health(), EvalClient::parse_health)
    }

    pub fn system_info(&self) -> Result<SystemInfo, ApiError> {
        self.call(self.client.build_system_info(), EvalClient::parse_system_info)
    }
}

fn logged(err: ApiError) -> ApiError {
    error!(error = %err, "Request Error");
    err
}
