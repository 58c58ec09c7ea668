//! HTTP handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use sdk::types::{AnswerResponse, AskRequest, HealthResponse, LoginRejected, LoginResponse};
use serde::Deserialize;

use super::error::ApiError;
use super::session::{clear_cookie, session_cookie};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

async fn page(state: &AppState, name: &str) -> Result<Html<String>, ApiError> {
    let path = state.settings.static_root.join(name);
    tokio::fs::read_to_string(&path)
        .await
        .map(Html)
        .map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Page unavailable");
            ApiError::NotFound(format!("Page {} introuvable", name))
        })
}

/// GET /login
pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    page(&state, "login.html").await
}

/// POST /login
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !state.password.matches(&form.password) {
        tracing::warn!("Rejected login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginRejected {
                detail: "Mot de passe incorrect.".to_string(),
            }),
        )
            .into_response();
    }

    let token = state.sessions.create();
    tracing::info!("Session opened");

    (
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            session_cookie(
                &state.settings.session_cookie,
                &token,
                state.sessions.ttl(),
            ),
        )],
        Json(LoginResponse { success: true }),
    )
        .into_response()
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = state.session(&headers) {
        state.sessions.revoke(&token);
        tracing::info!("Session closed");
    }

    (
        [(
            header::SET_COOKIE,
            clear_cookie(&state.settings.session_cookie),
        )],
        Redirect::to("/login"),
    )
        .into_response()
}

/// GET /
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if state.session(&headers).is_none() {
        return Redirect::to("/login").into_response();
    }

    match page(&state, "index.html").await {
        Ok(html) => html.into_response(),
        Err(err) => err.into_response(),
    }
}

/// POST /ask-rag: first question, searches then answers
pub async fn ask_rag(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    state.require_session(&headers)?;
    let Json(request) = body?;
    let user_id = state.user_id(request.user_id.as_deref());

    let answer = state
        .orchestrator
        .start_conversation(user_id, &request.question)
        .await?;

    Ok(Json(AnswerResponse { answer }))
}

/// POST /chat-continue: follow-up question on the stored transcript
pub async fn chat_continue(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    state.require_session(&headers)?;
    let Json(request) = body?;
    let user_id = state.user_id(request.user_id.as_deref());

    let answer = state
        .orchestrator
        .continue_conversation(user_id, &request.question)
        .await?;

    Ok(Json(AnswerResponse { answer }))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        conversations: state.orchestrator.active_conversations(),
    })
}
