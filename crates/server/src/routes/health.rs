use axum::response::Json as ResponseJson;
use utils::response::ApiResponse;

pub async fn health_check() -> ResponseJson<ApiResponse<String>> {
    ResponseJson(ApiResponse::success("OK".to_string()))
}

pub async fn banner() -> &'static str {
    "TaskForge backend is running"
}
