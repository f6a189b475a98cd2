//! Console rendering of captured exchanges.
//!
//! The layout is meant for reading in a terminal while a scenario runs, so it
//! favours stable, line-oriented output over compactness. Authorization
//! values never appear in full.

use serde_json::Value;
use std::fmt::Write;

use crate::exchange::{Exchange, RequestRecord, ResponseRecord};

const HEADER_VALUE_LIMIT: usize = 50;
const TOKEN_TAIL: usize = 20;
pub const RULE_WIDTH: usize = 50;

/// Header value as it may be shown: bearer credentials reduced to their tail,
/// long values truncated.
pub fn display_header_value(name: &str, value: &str) -> String {
    if name.to_ascii_lowercase().contains("authorization") {
        return format!("Bearer ***{}***", tail(value, TOKEN_TAIL));
    }
    if value.chars().count() > HEADER_VALUE_LIMIT {
        let head: String = value.chars().take(HEADER_VALUE_LIMIT).collect();
        return format!("{head}...");
    }
    value.to_string()
}

/// Leading part of a token for log lines such as `Token: <prefix>...`.
pub fn token_preview(token: &str) -> String {
    token.chars().take(HEADER_VALUE_LIMIT).collect()
}

fn tail(value: &str, n: usize) -> &str {
    let count = value.chars().count();
    if count <= n {
        return value;
    }
    match value.char_indices().nth(count - n) {
        Some((idx, _)) => &value[idx..],
        None => value,
    }
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn render_request(request: &RequestRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- {} {} ---", request.method, request.url);
    if !request.headers.is_empty() {
        out.push_str("Headers:\n");
        for (name, value) in &request.headers {
            let _ = writeln!(out, "  {}: {}", name, display_header_value(name, value));
        }
    }
    if let Some(body) = &request.body {
        out.push_str("Body:\n");
        let _ = writeln!(out, "{}", pretty(body));
    }
    out.push('\n');
    out
}

pub fn render_response(response: &ResponseRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Response Status: {}", response.status);
    out.push_str("Response Headers:\n");
    for (name, value) in &response.headers {
        let _ = writeln!(out, "  {name}: {value}");
    }
    match &response.json {
        Some(body) => {
            out.push_str("Response Body:\n");
            let _ = writeln!(out, "{}", pretty(body));
        }
        None => {
            out.push_str("Response Body (raw):\n");
            let _ = writeln!(out, "{}", response.text);
        }
    }
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    out.push('\n');
    out
}

pub fn render_exchange(exchange: &Exchange) -> String {
    let mut out = render_request(&exchange.request);
    out.push_str(&render_response(&exchange.response));
    out
}

/// Two-line form used where only the outcome matters.
pub fn render_compact(exchange: &Exchange) -> String {
    format!(
        "Status: {}\nResponse: {}\n",
        exchange.status(),
        exchange.response.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::fixtures::exchange;

    #[test]
    fn test_authorization_shows_only_tail() {
        let token = format!("Bearer {}", "x".repeat(40) + "ABCDEFGHIJKLMNOPQRST");
        let shown = display_header_value("Authorization", &token);
        assert_eq!(shown, "Bearer ***ABCDEFGHIJKLMNOPQRST***");
    }

    #[test]
    fn test_short_authorization_kept_between_stars() {
        let shown = display_header_value("authorization", "Bearer abc");
        assert_eq!(shown, "Bearer ***Bearer abc***");
    }

    #[test]
    fn test_long_header_truncated_by_chars() {
        let value = "é".repeat(60);
        let shown = display_header_value("X-Trace", &value);
        assert_eq!(shown.chars().count(), 53);
        assert!(shown.ends_with("..."));
        assert_eq!(display_header_value("Content-Type", "application/json"), "application/json");
    }

    #[test]
    fn test_token_preview_is_char_safe() {
        let token = "ü".repeat(80);
        assert_eq!(token_preview(&token).chars().count(), 50);
        assert_eq!(token_preview("short"), "short");
    }

    #[test]
    fn test_render_request_layout() {
        let ex = exchange(201, r#"{"id": 3}"#);
        let text = render_request(&ex.request);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "--- POST http://localhost:8080/api/boards ---");
        assert_eq!(lines[1], "Headers:");
        assert_eq!(lines[2], "  content-type: application/json");
        assert!(lines[3].starts_with("  authorization: Bearer ***"));
        assert_eq!(lines[4], "Body:");
        assert_eq!(lines[5], "{");
        assert_eq!(lines[6], "  \"title\": \"My Test Board\"");
        assert!(text.ends_with("}\n\n"));
    }

    #[test]
    fn test_render_response_json_and_raw() {
        let ex = exchange(201, r#"{"id": 3}"#);
        let text = render_response(&ex.response);
        assert!(text.starts_with("Response Status: 201\nResponse Headers:\n"));
        assert!(text.contains("Response Body:\n{\n  \"id\": 3\n}\n"));
        assert!(text.ends_with(&format!("{}\n\n", "-".repeat(50))));

        let raw = exchange(500, "upstream exploded");
        let text = render_response(&raw.response);
        assert!(text.contains("Response Body (raw):\nupstream exploded\n"));
    }

    #[test]
    fn test_render_compact() {
        let ex = exchange(400, r#"{"message":"Validation error"}"#);
        assert_eq!(
            render_compact(&ex),
            "Status: 400\nResponse: {\"message\":\"Validation error\"}\n"
        );
    }
}
