//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names an operation, its UI-side input, the exact request the
//! client must build, a simulated wire response, and either the expected
//! UI-side result or the expected HTTP error. Comparisons go through parsed
//! values so key order never matters.

use rental_core::case::{keys_to_ui, keys_to_wire};
use rental_core::normalize::{normalize_incoming, normalize_outgoing};
use rental_core::{
    ApiError, Contract, ContractVersion, CreateContractVersion, CreateUser, HttpMethod, HttpRequest, HttpResponse,
    RentalClient, User, UserType,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> RentalClient {
    RentalClient::new(BASE_URL)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn headers(value: &Value) -> Vec<(String, String)> {
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

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");
    assert_eq!(req.headers, headers(&expected["headers"]), "{name}: headers");
    match req.body.as_deref() {
        Some(body) => {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body, expected["body"], "{name}: body");
        }
        None => assert!(expected["body"].is_null(), "{name}: expected a body"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: headers(&sim["headers"]),
        body: sim["body"].as_str().unwrap().as_bytes().to_vec(),
    }
}

/// Compare a parse outcome with `expected_result` or `expected_error`.
fn assert_outcome<T>(name: &str, case: &Value, outcome: Result<T, ApiError>)
where
    T: serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    if let Some(expected) = case.get("expected_error") {
        let err = match outcome {
            Err(err) => err,
            Ok(v) => panic!("{name}: expected an error, got {v:?}"),
        };
        assert_eq!(
            err,
            ApiError::Http {
                status: expected["status"].as_u64().unwrap() as u16,
                body: expected["body"].as_str().unwrap().to_string(),
            },
            "{name}: error"
        );
        return;
    }
    let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
    assert_eq!(outcome.unwrap(), expected, "{name}: parsed result");
}

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[test]
fn user_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/users.json")) {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        match case["operation"].as_str().unwrap() {
            "list_users" => {
                let filter: Option<UserType> = input
                    .get("type")
                    .map(|t| serde_json::from_value(t.clone()).unwrap());
                let req = c.build_list_users(filter);
                assert_request(name, &req, &case["expected_request"]);
                assert_outcome::<Vec<User>>(name, &case, c.parse_users(simulated(&case)));
            }
            "create_user" => {
                let input: CreateUser = serde_json::from_value(input.clone()).unwrap();
                let req = c.build_create_user(&input).unwrap();
                assert_request(name, &req, &case["expected_request"]);
                assert_outcome::<Option<User>>(name, &case, c.parse_user(simulated(&case)));
            }
            "get_user" => {
                let req = c.build_get_user(input["id"].as_str().unwrap());
                assert_request(name, &req, &case["expected_request"]);
                assert_outcome::<Option<User>>(name, &case, c.parse_user(simulated(&case)));
            }
            other => panic!("{name}: unknown operation {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

#[test]
fn contract_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/contracts.json")) {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        match case["operation"].as_str().unwrap() {
            "list_contracts" => {
                let tenant = input["tenantId"].as_str();
                let req = c.build_list_contracts(tenant);
                assert_request(name, &req, &case["expected_request"]);
                assert_outcome::<Vec<Contract>>(name, &case, c.parse_contracts(simulated(&case)));
            }
            "create_contract_version" => {
                let input: CreateContractVersion = serde_json::from_value(input.clone()).unwrap();
                let req = c.build_create_contract_version(&input).unwrap();
                assert_request(name, &req, &case["expected_request"]);
                assert_outcome::<Option<ContractVersion>>(name, &case, c.parse_contract_version(simulated(&case)));
            }
            "delete_contract" => {
                let req = c.build_delete_contract(input["id"].as_str().unwrap());
                assert_request(name, &req, &case["expected_request"]);
                let payload = c.parse_payload(simulated(&case)).map(|p| p.as_value().cloned());
                assert_outcome::<Option<Value>>(name, &case, payload);
            }
            other => panic!("{name}: unknown operation {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion pipeline
// ---------------------------------------------------------------------------

#[test]
fn convention_test_vectors() {
    let vectors: Value = serde_json::from_str(include_str!("../../test-vectors/conventions.json")).unwrap();

    for case in vectors["outgoing"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let wire = keys_to_wire(normalize_outgoing(case["ui"].clone()));
        assert_eq!(wire, case["wire"], "{name}: outgoing");
    }

    for case in vectors["incoming"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let ui = keys_to_ui(normalize_incoming(case["wire"].clone()));
        assert_eq!(ui, case["ui"], "{name}: incoming");
    }
}
