use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::pagination::PaginationInfo;

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T> {
    pub(crate) status: u16,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) info: Option<PaginationInfoDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<T>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PaginationInfoDto {
    pub(crate) next: Option<String>,
    pub(crate) prev: Option<String>,
    pub(crate) pages: i64,
    pub(crate) count: i64,
}

impl From<PaginationInfo> for PaginationInfoDto {
    fn from(info: PaginationInfo) -> Self {
        Self {
            next: info.next,
            prev: info.prev,
            pages: info.pages,
            count: info.count,
        }
    }
}

impl<T> ApiResponse<T> {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            info: None,
            data: None,
        }
    }

    pub(crate) fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub(crate) fn with_info(mut self, info: PaginationInfo) -> Self {
        self.info = Some(info.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Payload type for envelopes that only carry a message.
#[derive(Debug, Serialize)]
pub(crate) struct Empty {}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{ApiResponse, Empty};
    use crate::domain::pagination::PaginationInfo;

    #[test]
    fn empty_fields_are_omitted() {
        let body = ApiResponse::<Empty>::new(StatusCode::OK, "Post deleted successfully");
        let json = serde_json::to_value(&body).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({"status": 200, "message": "Post deleted successfully"})
        );
    }

    #[test]
    fn listing_carries_pagination_info() {
        let body = ApiResponse::new(StatusCode::OK, "Posts retrieved successfully")
            .with_data(vec![1, 2])
            .with_info(PaginationInfo {
                next: Some("/post/all?page=2".to_string()),
                prev: None,
                pages: 2,
                count: 12,
            });
        let json = serde_json::to_value(&body).expect("serializable");
        assert_eq!(json["info"]["next"], "/post/all?page=2");
        assert!(json["info"]["prev"].is_null());
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }
}
