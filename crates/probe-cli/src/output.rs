use serde::Serialize;

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn output_success<T: Serialize>(data: T) {
    let response = CliResponse {
        success: true,
        api_version: env!("CARGO_PKG_VERSION"),
        data: Some(data),
        error: None,
    };
    println!("{}", to_json(&response));
}

/// Prints a failed envelope that still carries data, then exits with code 1.
pub fn output_failure<T: Serialize>(data: T, message: &str) -> ! {
    let response = CliResponse {
        success: false,
        api_version: env!("CARGO_PKG_VERSION"),
        data: Some(data),
        error: Some(message.to_string()),
    };
    println!("{}", to_json(&response));
    std::process::exit(1);
}

/// Outputs an error response to stderr and terminates the process with code 1.
pub fn output_error(message: &str) -> ! {
    let response: CliResponse<()> = CliResponse {
        success: false,
        api_version: env!("CARGO_PKG_VERSION"),
        data: None,
        error: Some(message.to_string()),
    };
    eprintln!("{}", to_json(&response));
    std::process::exit(1);
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        serde_json::json!({ "success": false, "error": format!("serialization failed: {e}") })
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_absent_fields() {
        let response: CliResponse<()> = CliResponse {
            success: false,
            api_version: "0.1.0",
            data: None,
            error: Some("boom".into()),
        };
        let json: serde_json::Value = serde_json::from_str(&to_json(&response)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }
}
