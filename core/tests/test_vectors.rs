//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use branch_core::{
    partition_branches, ApiClient, ApiConfig, BranchForm, HttpMethod, HttpRequest, HttpResponse,
    RequestBody,
};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> ApiClient {
    ApiClient::new(&ApiConfig::new(BASE_URL))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "PUT" => HttpMethod::Put,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_headers(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn simulated_response(sim: &serde_json::Value) -> HttpResponse {
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        status_text: sim["status_text"].as_str().unwrap().to_string(),
        headers: vec![(
            "content-type".to_string(),
            sim["content_type"].as_str().unwrap().to_string(),
        )],
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");
    assert_eq!(req.headers, parse_headers(&expected["headers"]), "{name}: headers");

    match (&req.body, expected.get("body")) {
        (None, None) => {}
        (Some(RequestBody::Json(body)), Some(expected_body)) => {
            let body: serde_json::Value = serde_json::from_str(body).unwrap();
            assert_eq!(&body, expected_body, "{name}: body");
        }
        (body, expected_body) => panic!("{name}: body mismatch: {body:?} vs {expected_body:?}"),
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_branches_test_vectors() {
    let raw = include_str!("../../test-vectors/list_branches.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        // Verify build
        let req = c.build_list_branches();
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_list_branches(simulated_response(&case["simulated_response"]));

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.to_string(), expected_error.as_str().unwrap(), "{name}: error");
            continue;
        }

        let page = result.unwrap();
        let (enabled, disabled) = partition_branches(page.data);
        let expected = &case["expected_result"];

        let expected_enabled = expected["enabled"].as_array().unwrap();
        assert_eq!(enabled.len(), expected_enabled.len(), "{name}: enabled count");
        for (branch, want) in enabled.iter().zip(expected_enabled) {
            assert_eq!(branch.id, want["id"].as_str().unwrap(), "{name}: enabled id");
            assert_eq!(
                branch.number_of_tables,
                Some(want["number_of_tables"].as_u64().unwrap() as usize),
                "{name}: number_of_tables"
            );
        }

        let disabled_ids: Vec<&str> = disabled.iter().map(|b| b.id.as_str()).collect();
        let expected_disabled: Vec<&str> = expected["disabled"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(disabled_ids, expected_disabled, "{name}: disabled ids");
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_branch_test_vectors() {
    let raw = include_str!("../../test-vectors/update_branch.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();
        let input = &case["input"];

        // Verify build
        let req = match input.get("accepts_reservations") {
            Some(accepts) => c
                .build_update_reservation_status(id, accepts.as_bool().unwrap())
                .unwrap(),
            None => {
                let form: BranchForm = serde_json::from_value(input.clone()).unwrap();
                c.build_update_branch(id, &form).unwrap()
            }
        };
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_update_branch(simulated_response(&case["simulated_response"]));

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.to_string(), expected_error.as_str().unwrap(), "{name}: error");
            continue;
        }

        let branch = result.unwrap();
        let expected = &case["expected_result"];
        assert_eq!(branch.id, expected["id"].as_str().unwrap(), "{name}: id");
        assert_eq!(
            branch.accepts_reservations,
            expected["accepts_reservations"].as_bool().unwrap(),
            "{name}: accepts_reservations"
        );
        assert_eq!(
            branch.reservation_duration as u64,
            expected["reservation_duration"].as_u64().unwrap(),
            "{name}: reservation_duration"
        );
    }
}
