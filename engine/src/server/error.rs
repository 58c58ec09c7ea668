//! API error type and JSON error responses.
//!
//! Every failure leaves the server as `{"error": "<message>"}` with a status
//! chosen from the error variant.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sdk::types::ErrorResponse;

use crate::conversation::ConversationError;

#[derive(Debug)]
pub enum ApiError {
    /// 401 - no valid session
    Unauthorized,
    /// 400 - invalid request for the current state
    BadRequest(String),
    /// 404 - page missing from the static root
    NotFound(String),
    /// 502 - search or completion service failed
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::Unauthorized => "Non authentifié".to_string(),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Upstream(msg) => msg,
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Unreadable or mistyped request bodies answer 400 in the JSON error shape
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body");
        ApiError::BadRequest(format!("Requête invalide : {}", rejection.body_text()))
    }
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        if err.is_precondition_failure() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Upstream(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMError;

    #[test]
    fn test_conversation_error_mapping() {
        let err: ApiError = ConversationError::NoHistory {
            user_id: "u".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = ConversationError::EmptyQuestion.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = ConversationError::Generation(LLMError::Timeout).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_json_rejection_becomes_bad_request() {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::{header, Request};
        use sdk::types::AskRequest;

        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let rejection = Json::<AskRequest>::from_request(request, &())
            .await
            .unwrap_err();

        let err = ApiError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.starts_with("Requête invalide : ")));
    }

    #[test]
    fn test_unauthorized_status() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
