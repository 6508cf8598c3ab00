//! Verify endpoint operations against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes an operation, its inputs, the expected outgoing
//! request, a simulated response and the expected result or error kind.
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use std::sync::Arc;

use activiti_core::{
    Client, ClientConfig, ClientError, HttpMethod, HttpRequest, HttpResponse, TaskAction, Transport, TransportError,
    User,
};
use parking_lot::Mutex;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";

/// Answers every request with one simulated response and keeps what it saw.
struct Canned {
    response: Option<(u16, String)>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl Transport for Canned {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().push(request.clone());
        let (status, body) = self
            .response
            .clone()
            .unwrap_or_else(|| panic!("unexpected request to {}", request.url));
        Ok(HttpResponse::from_bytes(status, Vec::new(), body))
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap()
}

/// Invoke the named operation; operations without a result yield `null`.
fn invoke(c: &Client, operation: &str, input: &Value) -> Result<Value, ClientError> {
    let s = |key: &str| input[key].as_str().unwrap_or_default().to_string();
    let value = match operation {
        "get_task" => to_json(c.get_task(&s("id"))?),
        "get_tasks" => to_json(c.get_tasks()?),
        "task_action" => {
            let action: TaskAction = serde_json::from_value(input["action"].clone()).unwrap();
            c.task_action(&s("id"), action, &s("assignee"))?;
            Value::Null
        }
        "get_process_definition" => to_json(c.get_process_definition(&s("value"))?),
        "get_process_instance" => to_json(c.get_process_instance(&s("value"))?),
        "start_process_instance_by_id" => to_json(c.start_process_instance_by_id(&s("value"))?),
        "start_process_instance_by_key" => to_json(c.start_process_instance_by_key(&s("value"))?),
        "start_process_instance_by_message" => to_json(c.start_process_instance_by_message(&s("value"))?),
        "get_users" => to_json(c.get_users()?),
        "create_user" => {
            let user: User = serde_json::from_value(input.clone()).unwrap();
            to_json(c.create_user(&user)?)
        }
        "update_user" => {
            let user: User = serde_json::from_value(input.clone()).unwrap();
            to_json(c.update_user(&user)?)
        }
        "delete_user" => {
            c.delete_user(&s("value"))?;
            Value::Null
        }
        other => panic!("unknown operation: {other}"),
    };
    Ok(value)
}

fn run_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let transport = Arc::new(Canned {
            response: sim
                .get("status")
                .map(|status| (status.as_u64().unwrap() as u16, sim["body"].as_str().unwrap().to_string())),
            seen: Mutex::new(Vec::new()),
        });
        let c = Client::with_transport(ClientConfig::new("kermit", "kermit", BASE_URL), Arc::clone(&transport)).unwrap();

        let result = invoke(&c, case["operation"].as_str().unwrap(), &case["input"]);

        // Verify request
        let seen = transport.seen.lock().clone();
        let expected_req = &case["expected_request"];
        if expected_req.is_null() {
            assert!(seen.is_empty(), "{name}: no request expected");
        } else {
            assert_eq!(seen.len(), 1, "{name}: exactly one request");
            let req = &seen[0];
            assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
            assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: path");
            assert_eq!(req.header("Authorization"), Some("Basic a2VybWl0Omtlcm1pdA=="), "{name}: auth");
            assert_eq!(req.header("Content-Type"), Some("application/json"), "{name}: content type");

            match &expected_req["body"] {
                Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
                expected => {
                    let body: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
                    assert_eq!(&body, expected, "{name}: body");
                }
            }
        }

        // Verify result
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Api" => assert!(matches!(err, ClientError::Api(_)), "{name}: expected Api, got {err:?}"),
                "Validation" => assert!(matches!(err, ClientError::Validation(_)), "{name}: expected Validation, got {err:?}"),
                "Decoding" => assert!(matches!(err, ClientError::Decoding(_)), "{name}: expected Decoding, got {err:?}"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
            if let Some(message) = case.get("expected_message") {
                assert_eq!(err.to_string(), message.as_str().unwrap(), "{name}: message");
            }
        } else {
            let value = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
            assert_eq!(value, case["expected_result"], "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[test]
fn task_test_vectors() {
    run_vectors(include_str!("../../test-vectors/tasks.json"));
}

// ---------------------------------------------------------------------------
// Process definitions and instances
// ---------------------------------------------------------------------------

#[test]
fn process_instance_test_vectors() {
    run_vectors(include_str!("../../test-vectors/process_instances.json"));
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[test]
fn user_test_vectors() {
    run_vectors(include_str!("../../test-vectors/users.json"));
}
