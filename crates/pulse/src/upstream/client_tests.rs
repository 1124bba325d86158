// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

// ── parse_id ──────────────────────────────────────────────────────────

#[test]
fn parse_id_accepts_json_number() {
    let value = serde_json::json!({"id": 42});
    assert_eq!(parse_id(&value), Some(42));
}

#[test]
fn parse_id_accepts_numeric_string() {
    let value = serde_json::json!({"id": "123456789012345"});
    assert_eq!(parse_id(&value), Some(123456789012345));
}

#[test]
fn parse_id_rejects_missing_or_garbage() {
    assert_eq!(parse_id(&serde_json::json!({})), None);
    assert_eq!(parse_id(&serde_json::json!({"id": null})), None);
    assert_eq!(parse_id(&serde_json::json!({"id": "not-a-number"})), None);
    assert_eq!(parse_id(&serde_json::json!({"id": -5})), None);
}

// ── extract_access_token ──────────────────────────────────────────────

#[test]
fn token_extracted_from_page_body() {
    let body = r#"<script>window.__d={"accessToken":"EAAG-abc123"};</script>"#;
    assert_eq!(extract_access_token(body), Some("EAAG-abc123".to_owned()));
}

#[test]
fn token_extracted_with_whitespace_after_colon() {
    let body = r#"{"accessToken":   "tok-xyz"}"#;
    assert_eq!(extract_access_token(body), Some("tok-xyz".to_owned()));
}

#[test]
fn first_token_wins_when_repeated() {
    let body = r#""accessToken":"first" ... "accessToken":"second""#;
    assert_eq!(extract_access_token(body), Some("first".to_owned()));
}

#[test]
fn no_token_in_body_is_none() {
    assert_eq!(extract_access_token("<html>login required</html>"), None);
    assert_eq!(extract_access_token(r#""accessToken":"""#), None);
}
