//! Verify decoding and envelope handling against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each case gives a request path, a response content type and body, and the
//! expected outcome. Expected XML results are compared as parsed JSON so key
//! order never matters.

use gocanvas_core::decode::decode_response;
use gocanvas_core::envelope::unwrap_service_error;
use gocanvas_core::{ApiError, Decoded, HttpResponse};

#[test]
fn decode_test_vectors() {
    let raw = include_str!("../../test-vectors/decode.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = case["body"].as_str().unwrap().as_bytes().to_vec();
        let response = HttpResponse {
            status: 200,
            headers: vec![(
                "content-type".to_string(),
                case["content_type"].as_str().unwrap().to_string(),
            )],
            body: body.clone(),
        };
        let result = decode_response(case["path"].as_str().unwrap(), response).and_then(unwrap_service_error);
        let expected = &case["expected"];

        if let Some(xml) = expected.get("xml") {
            assert_eq!(result.unwrap(), Decoded::Xml(xml.clone()), "{name}");
        } else if expected.get("raw").is_some() {
            assert_eq!(result.unwrap(), Decoded::Raw(body), "{name}");
        } else if let Some(service) = expected.get("service_error") {
            match result {
                Err(ApiError::Service { description, code }) => {
                    assert_eq!(description, service["description"], "{name}: description");
                    assert_eq!(code, service["code"], "{name}: code");
                }
                other => panic!("{name}: expected service error, got {other:?}"),
            }
        } else if expected.get("parse_error").is_some() {
            assert!(matches!(result, Err(ApiError::Parse(_))), "{name}: {result:?}");
        } else {
            panic!("{name}: unknown expectation {expected}");
        }
    }
}
