//! Verify classification and target URL derivation against JSON test vectors
//! stored in `test-vectors/`.

use intercom_core::{
    classify, ApiErrorKind, ClientConfig, ConfigError, HttpResponse, IntercomClient, IntercomError,
};

/// Parse the kind string from test vectors into `ApiErrorKind`.
fn parse_kind(s: &str) -> ApiErrorKind {
    match s {
        "BadRequest" => ApiErrorKind::BadRequest,
        "Unauthorized" => ApiErrorKind::Unauthorized,
        "ResourceNotFound" => ApiErrorKind::ResourceNotFound,
        "MultipleMatchingUsers" => ApiErrorKind::MultipleMatchingUsers,
        "RateLimitExceeded" => ApiErrorKind::RateLimitExceeded,
        "ServerError" => ApiErrorKind::ServerError,
        "ServiceUnavailable" => ApiErrorKind::ServiceUnavailable,
        "AuthenticationError" => ApiErrorKind::AuthenticationError,
        "Generic" => ApiErrorKind::Generic,
        other => panic!("unknown kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn classification_test_vectors() {
    let raw = include_str!("../../test-vectors/classification.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();

        let err = classify(status, body);
        assert_eq!(err.kind, parse_kind(case["expected_kind"].as_str().unwrap()), "{name}: kind");
        assert_eq!(err.status, status, "{name}: status");
        assert_eq!(err.code.as_deref(), case["expected_code"].as_str(), "{name}: code");
        assert_eq!(err.message, case["expected_message"].as_str().unwrap(), "{name}: message");
        assert_eq!(err.is_retryable(), case["retryable"].as_bool().unwrap(), "{name}: retryable");
    }
}

#[test]
fn classification_through_client_parse() {
    let raw = include_str!("../../test-vectors/classification.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let client = IntercomClient::new(ClientConfig::new().with_credentials("abc123", "super-secret-key")).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = HttpResponse {
            status: case["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: case["body"].as_str().unwrap().to_string(),
        };
        let err = client.parse_response(response).unwrap_err();
        let api = err.as_api_error().unwrap_or_else(|| panic!("{name}: expected api error, got {err:?}"));
        assert_eq!(api.kind, parse_kind(case["expected_kind"].as_str().unwrap()), "{name}: kind");
        assert_eq!(err.is_retryable(), case["retryable"].as_bool().unwrap(), "{name}: retryable");
    }
}

// ---------------------------------------------------------------------------
// Target URL
// ---------------------------------------------------------------------------

#[test]
fn target_url_test_vectors() {
    let raw = include_str!("../../test-vectors/target_url.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let config: ClientConfig = serde_json::from_value(case["config"].clone()).unwrap();
        let client = IntercomClient::new(config).unwrap();
        let result = client.target_base_url();

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "MissingCredentials" => assert!(
                    matches!(err, IntercomError::Configuration(ConfigError::MissingCredentials)),
                    "{name}: expected MissingCredentials"
                ),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let url = result.unwrap();
            assert_eq!(url, case["expected_url"].as_str().unwrap(), "{name}: url");
        }
    }
}
