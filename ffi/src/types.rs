//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests mirror the core `HttpRequest` with C strings and a raw header
//! array. Results carry the unwrapped envelope `data` as a JSON string: the
//! payload shape differs per operation and the host decodes it with its own
//! JSON library.

use std::ffi::CString;
use std::os::raw::c_char;

use eval_client_core::{ApiError, EvalClient, HttpMethod, HttpRequest};
use serde_json::Value;

/// Opaque handle to an `EvalClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiEvalClient {
    pub(crate) inner: EvalClient,
}

/// Converts to a heap C string. Interior NULs are dropped so backend text
/// such as an error message is never lost to a null pointer.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    let mut bytes = s.into();
    bytes.retain(|&b| b != 0);
    CString::new(bytes)
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Frees a string produced by [`c_string`]. Null is ignored.
pub(crate) unsafe fn drop_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `path` is the absolute URL. The host executes the request, aborting it
/// after `timeout_ms` milliseconds, and passes the response to
/// `eval_parse_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_ms: u64,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let timeout_ms = u64::try_from(req.timeout.as_millis()).unwrap_or(u64::MAX);
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
            body,
            timeout_ms,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// The host's view of an HTTP response. Read but never freed by this crate.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    /// Envelope `code != 200`; see `app_code` and `error_message`.
    Application = 1,
    /// Non-2xx HTTP status; see `http_status`.
    Http = 2,
    Transport = 3,
    Deserialization = 4,
    Serialization = 5,
    Panic = 6,
    NullArg = 7,
}

/// Outcome of `eval_parse_response`.
///
/// On success `data_json` holds the envelope's `data` (the literal `null`
/// when absent) and `error_message` is null. On failure `data_json` is null.
#[repr(C)]
pub struct FfiEvalResult {
    pub error_code: FfiErrorCode,
    pub app_code: i64,
    pub http_status: u16,
    pub error_message: *mut c_char,
    pub data_json: *mut c_char,
}

impl FfiEvalResult {
    fn boxed(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    fn failure(error_code: FfiErrorCode, message: String) -> *mut Self {
        FfiEvalResult {
            error_code,
            app_code: 0,
            http_status: 0,
            error_message: c_string(message),
            data_json: std::ptr::null_mut(),
        }
        .boxed()
    }

    pub(crate) fn ok(data: Value) -> *mut Self {
        FfiEvalResult {
            error_code: FfiErrorCode::Ok,
            app_code: 200,
            http_status: 0,
            error_message: std::ptr::null_mut(),
            data_json: c_string(data.to_string()),
        }
        .boxed()
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let message = err.to_string();
        match err {
            ApiError::Application { code, .. } => FfiEvalResult {
                error_code: FfiErrorCode::Application,
                app_code: code,
                http_status: 0,
                error_message: c_string(message),
                data_json: std::ptr::null_mut(),
            }
            .boxed(),
            ApiError::Http { status, .. } => FfiEvalResult {
                error_code: FfiErrorCode::Http,
                app_code: 0,
                http_status: status,
                error_message: c_string(message),
                data_json: std::ptr::null_mut(),
            }
            .boxed(),
            ApiError::Transport(_) => Self::failure(FfiErrorCode::Transport, message),
            ApiError::Deserialization(_) => Self::failure(FfiErrorCode::Deserialization, message),
            ApiError::Serialization(_) => Self::failure(FfiErrorCode::Serialization, message),
        }
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(context: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, context.to_string())
    }
}
