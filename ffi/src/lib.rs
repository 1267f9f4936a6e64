//! C-ABI wrapper around `eval-client-core`.
//!
//! # Overview
//! Lets a non-Rust UI host build backend requests, unwrap `{code, message,
//! data}` envelopes and resolve client routes, without linking an HTTP stack
//! or a JSON library into Rust's side of the boundary.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `eval_build_*` per backend operation; POST payloads are accepted as
//!   JSON text and forwarded without validation.
//! - A single `eval_parse_response` unwraps any envelope and hands `data`
//!   back as JSON text, since payload shapes differ per operation.
//! - The C caller owns all returned pointers and must release them with the
//!   matching `eval_free_*` function.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::time::Duration;

use eval_client_core::{
    routes, unwrap_envelope, ClientConfig, EvalClient, HttpResponse, PageQuery, Priorities, Weights,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use types::*;

/// Borrows a C string as UTF-8. Returns `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

unsafe fn read_json<T: DeserializeOwned>(ptr: *const c_char) -> Option<T> {
    let raw = unsafe { read_str(ptr) }?;
    serde_json::from_str(raw).ok()
}

/// Runs `f` against a non-null client, returning null on null input or panic.
fn with_client(
    client: *const FfiEvalClient,
    f: impl FnOnce(&EvalClient) -> *mut FfiHttpRequest + std::panic::UnwindSafe,
) -> *mut FfiHttpRequest {
    if client.is_null() {
        return std::ptr::null_mut();
    }
    let client = unsafe { &*client };
    let inner = std::panic::AssertUnwindSafe(&client.inner);
    catch_unwind(move || f(*inner)).unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client rooted at `{base_url}/api`.
///
/// Returns null if `base_url` is null or not UTF-8.
/// The caller must free the returned pointer with `eval_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn eval_client_new(base_url: *const c_char) -> *mut FfiEvalClient {
    catch_unwind(|| match unsafe { read_str(base_url) } {
        Some(url) => Box::into_raw(Box::new(FfiEvalClient {
            inner: EvalClient::new(url),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Like `eval_client_new`, but every built request carries `timeout_ms`
/// instead of the 30 s default. A `timeout_ms` of 0 keeps the default.
#[unsafe(no_mangle)]
pub extern "C" fn eval_client_new_with_timeout(base_url: *const c_char, timeout_ms: u64) -> *mut FfiEvalClient {
    catch_unwind(|| match unsafe { read_str(base_url) } {
        Some(url) => {
            let mut config = ClientConfig::new(url);
            if timeout_ms > 0 {
                config = config.with_timeout(Duration::from_millis(timeout_ms));
            }
            Box::into_raw(Box::new(FfiEvalClient {
                inner: EvalClient::from_config(&config),
            }))
        }
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `eval_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn eval_client_free(client: *mut FfiEvalClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// `GET /table/allowed`. Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn eval_build_allowed_tables(client: *const FfiEvalClient) -> *mut FfiHttpRequest {
    with_client(client, |c| FfiHttpRequest::from_core(c.build_allowed_tables()))
}

/// `GET /table/structure/{table_name}`. Returns null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn eval_build_table_structure(
    client: *const FfiEvalClient,
    table_name: *const c_char,
) -> *mut FfiHttpRequest {
    let Some(table) = (unsafe { read_str(table_name) }) else {
        return std::ptr::null_mut();
    };
    with_client(client, move |c| {
        FfiHttpRequest::from_core(c.build_table_structure(table))
    })
}

/// `GET /table/data/{table_name}?page&size`. A `page` or `size` of 0 selects
/// the default (1 and 20 respectively).
#[unsafe(no_mangle)]
pub extern "C" fn eval_build_table_data(
    client: *const FfiEvalClient,
    table_name: *const c_char,
    page: u32,
    size: u32,
) -> *mut FfiHttpRequest {
    let Some(table) = (unsafe { read_str(table_name) }) else {
        return std::ptr::null_mut();
    };
    let query = PageQuery::new((page > 0).then_some(page), (size > 0).then_some(size));
    with_client(client, move |c| {
        FfiHttpRequest::from_core(c.build_table_data(table, query))
    })
}

/// `POST /evaluation/ahp/calculate`. `priorities_json` is an object of
/// dimension code to rank, e.g. `{"RL":1,"SC":2}`.
///
/// Returns null if any argument is null or the JSON is not such an object.
#[unsafe(no_mangle)]
pub extern "C" fn eval_build_calculate_ahp(
    client: *const FfiEvalClient,
    priorities_json: *const c_char,
) -> *mut FfiHttpRequest {
    let Some(priorities) = (unsafe { read_json::<Priorities>(priorities_json) }) else {
        return std::ptr::null_mut();
    };
    with_client(client, move |c| match c.build_calculate_ahp(&priorities) {
        Ok(req) => FfiHttpRequest::from_core(req),
        Err(_) => std::ptr::null_mut(),
    })
}

/// `POST /evaluation/comprehensive/calculate`. `ahp_weights_json` is an
/// object of dimension code to weight.
#[unsafe(no_mangle)]
pub extern "C" fn eval_build_calculate_comprehensive(
    client: *const FfiEvalClient,
    ahp_weights_json: *const c_char,
) -> *mut FfiHttpRequest {
    let Some(weights) = (unsafe { read_json::<Weights>(ahp_weights_json) }) else {
        return std::ptr::null_mut();
    };
    with_client(client, move |c| match c.build_calculate_comprehensive(&weights) {
        Ok(req) => FfiHttpRequest::from_core(req),
        Err(_) => std::ptr::null_mut(),
    })
}

/// `POST /python-evaluation/calculate`, same payload as the AHP call.
#[unsafe(no_mangle)]
pub extern "C" fn eval_build_python_evaluation(
    client: *const FfiEvalClient,
    priorities_json: *const c_char,
) -> *mut FfiHttpRequest {
    let Some(priorities) = (unsafe { read_json::<Priorities>(priorities_json) }) else {
        return std::ptr::null_mut();
    };
    with_client(client, move |c| match c.build_python_evaluation(&priorities) {
        Ok(req) => FfiHttpRequest::from_core(req),
        Err(_) => std::ptr::null_mut(),
    })
}

/// `GET /python-evaluation/test-environment`.
#[unsafe(no_mangle)]
pub extern "C" fn eval_build_test_python_environment(
    client: *const FfiEvalClient,
) -> *mut FfiHttpRequest {
    with_client(client, |c| FfiHttpRequest::from_core(c.build_test_python_environment()))
}

/// `GET /health`.
#[unsafe(no_mangle)]
pub extern "C" fn eval_build_health(client: *const FfiEvalClient) -> *mut FfiHttpRequest {
    with_client(client, |c| FfiHttpRequest::from_core(c.build_health()))
}

/// `GET /`.
#[unsafe(no_mangle)]
pub extern "C" fn eval_build_system_info(client: *const FfiEvalClient) -> *mut FfiHttpRequest {
    with_client(client, |c| FfiHttpRequest::from_core(c.build_system_info()))
}

// ---------------------------------------------------------------------------
// Parse response
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: unsafe { read_str(resp.body) }.unwrap_or("").to_string(),
    }
}

/// Unwrap the envelope of any response produced for an `eval_build_*`
/// request. Never returns null.
#[unsafe(no_mangle)]
pub extern "C" fn eval_parse_response(
    client: *const FfiEvalClient,
    response: *const FfiHttpResponse,
) -> *mut FfiEvalResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiEvalResult::null_arg("client");
        }
        if response.is_null() {
            return FfiEvalResult::null_arg("response");
        }
        let resp = unsafe { &*response };
        match unwrap_envelope::<Value>(ffi_response_to_core(resp)) {
            Ok(data) => FfiEvalResult::ok(data),
            Err(e) => FfiEvalResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiEvalResult::panic("panic in eval_parse_response"))
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// Resolve a UI path to its view name (`"Data"` or `"Evaluation"`),
/// following redirects. Returns null for unknown paths. Free the result with
/// `eval_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn eval_resolve_route(path: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        unsafe { read_str(path) }
            .and_then(routes::resolve)
            .map(|view| c_string(view.name()))
            .unwrap_or(std::ptr::null_mut())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by any `eval_build_*` function. Safe with null.
#[unsafe(no_mangle)]
pub extern "C" fn eval_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            drop_c_string(req.path);
            drop_c_string(req.body);
        }
        if !req.headers.is_null() {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                unsafe {
                    drop_c_string(h.key);
                    drop_c_string(h.value);
                }
            }
        }
    });
}

/// Free a result returned by `eval_parse_response`. Safe with null.
#[unsafe(no_mangle)]
pub extern "C" fn eval_free_result(result: *mut FfiEvalResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe {
            drop_c_string(result.error_message);
            drop_c_string(result.data_json);
        }
    });
}

/// Free a string returned by `eval_resolve_route`. Safe with null.
#[unsafe(no_mangle)]
pub extern "C" fn eval_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| unsafe { drop_c_string(s) });
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;

    fn client() -> *mut FfiEvalClient {
        let url = CString::new("http://localhost:3000").unwrap();
        eval_client_new(url.as_ptr())
    }

    fn owned(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    fn parse(client: *const FfiEvalClient, status: u16, body: &str) -> *mut FfiEvalResult {
        let body = CString::new(body).unwrap();
        let resp = FfiHttpResponse {
            status,
            body: body.as_ptr(),
        };
        eval_parse_response(client, &resp)
    }

    #[test]
    fn null_base_url_gives_null_client() {
        assert!(eval_client_new(std::ptr::null()).is_null());
        eval_client_free(std::ptr::null_mut());
    }

    #[test]
    fn table_data_zero_selects_defaults() {
        let c = client();
        let table = CString::new("during_battle_communications").unwrap();
        let req = eval_build_table_data(c, table.as_ptr(), 0, 0);
        assert!(!req.is_null());
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Get);
        assert_eq!(
            owned(r.path),
            "http://localhost:3000/api/table/data/during_battle_communications?page=1&size=20"
        );
        assert!(r.body.is_null());
        assert_eq!(r.headers_len, 0);
        eval_free_request(req);
        eval_client_free(c);
    }

    #[test]
    fn built_requests_carry_timeout() {
        let c = client();
        let req = eval_build_health(c);
        assert_eq!(unsafe { &*req }.timeout_ms, 30_000);
        eval_free_request(req);
        eval_client_free(c);

        let url = CString::new("http://localhost:3000").unwrap();
        let c = eval_client_new_with_timeout(url.as_ptr(), 1_500);
        let req = eval_build_allowed_tables(c);
        assert_eq!(unsafe { &*req }.timeout_ms, 1_500);
        eval_free_request(req);
        eval_client_free(c);

        let c = eval_client_new_with_timeout(url.as_ptr(), 0);
        let req = eval_build_system_info(c);
        assert_eq!(unsafe { &*req }.timeout_ms, 30_000);
        eval_free_request(req);
        eval_client_free(c);
    }

    #[test]
    fn nul_in_backend_message_keeps_error_text() {
        let c = client();
        let result = parse(c, 200, r#"{"code":500,"message":"bad\u0000table"}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Application);
        assert!(!r.error_message.is_null());
        assert_eq!(owned(r.error_message), "badtable");
        eval_free_result(result);
        eval_client_free(c);
    }

    #[test]
    fn ahp_request_carries_json_body_and_header() {
        let c = client();
        let priorities = CString::new(r#"{"RL":1,"SC":2}"#).unwrap();
        let req = eval_build_calculate_ahp(c, priorities.as_ptr());
        assert!(!req.is_null());
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Post);
        let body: Value = serde_json::from_str(&owned(r.body)).unwrap();
        assert_eq!(body, serde_json::json!({"priorities":{"RL":1,"SC":2}}));
        assert_eq!(r.headers_len, 1);
        let header = unsafe { &*r.headers };
        assert_eq!(owned(header.key), "content-type");
        assert_eq!(owned(header.value), "application/json");
        eval_free_request(req);
        eval_client_free(c);
    }

    #[test]
    fn invalid_json_payload_gives_null_request() {
        let c = client();
        let bad = CString::new("[1,2]").unwrap();
        assert!(eval_build_python_evaluation(c, bad.as_ptr()).is_null());
        assert!(eval_build_calculate_comprehensive(c, std::ptr::null()).is_null());
        assert!(eval_build_health(std::ptr::null()).is_null());
        eval_client_free(c);
    }

    #[test]
    fn parse_success_returns_data_json() {
        let c = client();
        let result = parse(c, 200, r#"{"code":200,"message":"","data":{"rows":[1,2]}}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        let data: Value = serde_json::from_str(&owned(r.data_json)).unwrap();
        assert_eq!(data, serde_json::json!({"rows":[1,2]}));
        eval_free_result(result);
        eval_client_free(c);
    }

    #[test]
    fn parse_application_error_and_fallback() {
        let c = client();
        let result = parse(c, 200, r#"{"code":500,"message":"table not found"}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Application);
        assert_eq!(r.app_code, 500);
        assert_eq!(owned(r.error_message), "table not found");
        assert!(r.data_json.is_null());
        eval_free_result(result);

        let result = parse(c, 200, r#"{"code":401}"#);
        let r = unsafe { &*result };
        assert_eq!(owned(r.error_message), eval_client_core::FALLBACK_MESSAGE);
        eval_free_result(result);
        eval_client_free(c);
    }

    #[test]
    fn parse_http_error_reports_status() {
        let c = client();
        let result = parse(c, 503, "unavailable");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(r.http_status, 503);
        eval_free_result(result);
        eval_client_free(c);
    }

    #[test]
    fn parse_null_arguments() {
        let result = eval_parse_response(std::ptr::null(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        eval_free_result(result);
    }

    #[test]
    fn routes_resolve_through_redirect() {
        let root = CString::new("/").unwrap();
        let name = eval_resolve_route(root.as_ptr());
        assert_eq!(owned(name), "Data");
        eval_free_string(name);

        let unknown = CString::new("/nowhere").unwrap();
        assert!(eval_resolve_route(unknown.as_ptr()).is_null());
    }
}
