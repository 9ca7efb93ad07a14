use serde::Serialize;

/// JSON envelope used for error bodies and simple informational endpoints.
/// Endpoints with a contractual success shape serialize their own structs.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiResponse;

    #[test]
    fn success_envelope_carries_data_and_no_message() {
        let response = ApiResponse::success("OK");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(json.get("data").and_then(|v| v.as_str()), Some("OK"));
        assert!(json.get("message").is_none());
    }

    #[test]
    fn error_envelope_carries_message_and_no_data() {
        let response = ApiResponse::<()>::error("Unauthorized");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            json.get("message").and_then(|v| v.as_str()),
            Some("Unauthorized")
        );
        assert!(json.get("data").is_none());
    }
}
