//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names an operation, its input, the request it must build, a
//! simulated response and either the expected payload or the expected error.
//! Payloads are compared as parsed JSON so field order does not matter.

use eval_client_core::{
    ApiError, EvalClient, HttpMethod, HttpRequest, HttpResponse, PageQuery, Priorities, Weights,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> EvalClient {
    EvalClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn build(c: &EvalClient, operation: &str, input: &Value) -> HttpRequest {
    let table = move || input["table"].as_str().unwrap();
    let priorities = move || -> Priorities { serde_json::from_value(input["priorities"].clone()).unwrap() };
    match operation {
        "allowed_tables" => c.build_allowed_tables(),
        "table_structure" => c.build_table_structure(table()),
        "table_data" => {
            let page = input.get("page").and_then(Value::as_u64).map(|v| v as u32);
            let size = input.get("size").and_then(Value::as_u64).map(|v| v as u32);
            c.build_table_data(table(), PageQuery::new(page, size))
        }
        "calculate_ahp" => c.build_calculate_ahp(&priorities()).unwrap(),
        "calculate_comprehensive" => {
            let weights: Weights = serde_json::from_value(input["ahpWeights"].clone()).unwrap();
            c.build_calculate_comprehensive(&weights).unwrap()
        }
        "python_evaluation" => c.build_python_evaluation(&priorities()).unwrap(),
        "test_python_environment" => c.build_test_python_environment(),
        "health" => c.build_health(),
        other => panic!("unknown operation: {other}"),
    }
}

/// Parse with the operation's typed parser, then re-encode to JSON for comparison.
fn parse(c: &EvalClient, operation: &str, response: HttpResponse) -> Result<Value, ApiError> {
    fn json<T: serde::Serialize>(r: Result<T, ApiError>) -> Result<Value, ApiError> {
        r.map(|v| serde_json::to_value(v).unwrap())
    }
    match operation {
        "allowed_tables" => json(c.parse_allowed_tables(response)),
        "table_structure" => json(c.parse_table_structure(response)),
        "table_data" => json(c.parse_table_data(response)),
        "calculate_ahp" => json(c.parse_calculate_ahp(response)),
        "calculate_comprehensive" => c.parse_calculate_comprehensive(response),
        "python_evaluation" => json(c.parse_python_evaluation(response)),
        "test_python_environment" => json(c.parse_test_python_environment(response)),
        "health" => json(c.parse_health(response)),
        other => panic!("unknown operation: {other}"),
    }
}

fn assert_error(name: &str, err: ApiError, expected: &Value) {
    match (expected["kind"].as_str().unwrap(), err) {
        ("Application", ApiError::Application { code, message }) => {
            assert_eq!(code, expected["code"].as_i64().unwrap(), "{name}: code");
            assert_eq!(message, expected["message"].as_str().unwrap(), "{name}: message");
        }
        ("Http", ApiError::Http { status, .. }) => {
            assert_eq!(u64::from(status), expected["status"].as_u64().unwrap(), "{name}: status");
        }
        (kind, err) => panic!("{name}: expected {kind}, got {err:?}"),
    }
}

#[test]
fn operation_test_vectors() {
    let raw = include_str!("../../test-vectors/operations.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let operation = case["operation"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = build(&c, operation, &case["input"]);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.path, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: path");
        match expected_req.get("body") {
            Some(expected_body) => {
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected_body, "{name}: body");
                assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content-type");
            }
            None => assert!(req.body.is_none(), "{name}: body should be None"),
        }

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = parse(&c, operation, response);

        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
