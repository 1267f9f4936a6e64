//! API client core for the communication-effectiveness evaluation backend.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Every backend response is a
//! `{code, message, data}` envelope; `code == 200` yields `data`, anything
//! else becomes an [`ApiError::Application`] carrying the backend message.
//!
//! # Design
//! - `EvalClient` is stateless and holds only the API root (`base_url` + `/api`)
//!   and the timeout it stamps on every request (30 s by default).
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the C ABI can drive the same code.
//! - `EvaluationApi` joins builder, interceptor and a [`Transport`] for
//!   Rust callers; `UreqTransport` bounds every call by the request's timeout.
//! - [`routes`] holds the UI's static path table.

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod routes;
pub mod transport;
pub mod types;

pub use api::{EvaluationApi, PassThrough, RequestInterceptor, StaticHeaders};
pub use client::{EvalClient, PageQuery};
pub use config::ClientConfig;
pub use envelope::{unwrap_envelope, Envelope, SUCCESS_CODE};
pub use error::{ApiError, ErrorKind, TransportError, FALLBACK_MESSAGE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use routes::{resolve, Route, RouteTarget, View};
pub use transport::{Transport, UreqTransport};
pub use types::{
    AhpResult, ColumnInfo, Dimension, EnvironmentStatus, PageResult, Priorities, SystemInfo, Weights,
};
