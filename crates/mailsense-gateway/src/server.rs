//! Axum router and handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use mailsense_core::{AssistError, Assistant, ReplyTone};
use mailsense_mail::{EmailMessage, Mailbox, OutgoingReply};
use mailsense_store::Priority;

use crate::protocol::{
    ApiError, InboxQuery, PrioritizeRequest, ReplyRequest, ReplyResponse, SendRequest,
    SendResponse,
};

/// Shared state every handler receives
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub mailbox: Arc<dyn Mailbox>,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError::new(message)))
}

/// Build the JSON API router over shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/inbox", get(inbox))
        .route("/api/message/{id}", get(message_detail))
        .route("/api/message/{id}/reply", post(draft_reply))
        .route("/api/message/{id}/send", post(send_reply))
        .route("/api/prioritize", post(prioritize))
        .route("/api/analytics", get(analytics))
        .route("/api/cache/reset", post(reset_cache))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve the API until ctrl-c
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("mailsense API listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
}

async fn fetch_message(state: &AppState, id: &str) -> ApiResult<EmailMessage> {
    match state.mailbox.get(id).await {
        Ok(Some(message)) => Ok(message),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("No message with id {id}"),
        )),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))),
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn inbox(
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
) -> ApiResult<impl IntoResponse> {
    let summaries = state
        .mailbox
        .list_recent(query.limit)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    Ok(Json(summaries))
}

async fn message_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let message = fetch_message(&state, &id).await?;
    let record = state
        .assistant
        .analyze(&message)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(record))
}

async fn draft_reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReplyRequest>,
) -> ApiResult<impl IntoResponse> {
    let tone = match &request.tone {
        Some(label) => ReplyTone::from_label(label).ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, format!("Unknown tone: {label}"))
        })?,
        None => ReplyTone::default(),
    };

    let message = fetch_message(&state, &id).await?;
    let reply = state
        .assistant
        .compose_reply(&message, tone, request.instructions.as_deref())
        .await;
    Ok(Json(ReplyResponse { reply }))
}

async fn send_reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SendRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.reply_text.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Reply text is required"));
    }

    let message = fetch_message(&state, &id).await?;
    let outgoing = OutgoingReply::for_message(&message, request.reply_text);

    // A rejected send maps to 502 so the client keeps the draft for retry.
    let receipt = state.mailbox.send(outgoing).await.map_err(|e| {
        let failure = AssistError::SendFailure(format!("{e:#}"));
        warn!("Send failed for message {id}: {failure}");
        api_error(StatusCode::BAD_GATEWAY, failure.to_string())
    })?;

    Ok(Json(SendResponse {
        sent: true,
        receipt_id: receipt.receipt_id,
    }))
}

async fn prioritize(
    State(state): State<AppState>,
    Json(request): Json<PrioritizeRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut results: BTreeMap<String, Priority> = BTreeMap::new();
    for id in &request.ids {
        match state.mailbox.get(id).await {
            Ok(Some(message)) => {
                results.insert(id.clone(), state.assistant.prioritize(&message).await);
            }
            Ok(None) => warn!("Skipping unknown message id {id} in prioritize"),
            Err(e) => {
                return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")));
            }
        }
    }
    Ok(Json(results))
}

async fn analytics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state
        .assistant
        .stats()
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    Ok(Json(stats))
}

async fn reset_cache(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state
        .assistant
        .reset_cache()
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    Ok(Json(json!({"reset": true})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use mailsense_core::{CompletionProvider, CompletionRequest, ModelGateway};
    use mailsense_mail::DemoMailbox;
    use mailsense_store::AnalysisDb;
    use serde_json::Value;
    use std::env;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FixedProvider {
        reply: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for FixedProvider {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed-model"
        }

        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    fn test_state(name: &str, reply: &'static str) -> (AppState, Arc<FixedProvider>) {
        let path = env::temp_dir().join(format!("mailsense_gateway_{}.db", name));
        let _ = std::fs::remove_file(&path);
        let db = Arc::new(AnalysisDb::new(&path).unwrap());
        let provider = Arc::new(FixedProvider { reply, calls: AtomicUsize::new(0) });
        let assistant = Assistant::new(ModelGateway::single(provider.clone()), db);
        let state = AppState {
            assistant: Arc::new(assistant),
            mailbox: Arc::new(DemoMailbox::new().unwrap()),
        };
        (state, provider)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = test_state("health", "ok");
        let response = router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_inbox_respects_limit() {
        let (state, _) = test_state("inbox", "ok");
        let (status, body) = get_json(router(state), "/api/inbox?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], "msg-1007");
    }

    #[tokio::test]
    async fn test_message_detail_analyzes_and_caches() {
        let (state, provider) = test_state("detail", "MEDIUM");
        let app = router(state.clone());

        let (status, body) = get_json(app.clone(), "/api/message/msg-1005").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message_id"], "msg-1005");
        assert_eq!(body["priority"], "MEDIUM");
        let first_calls = provider.calls.load(Ordering::SeqCst);
        assert!(first_calls <= 5);

        let (status, _) = get_json(app, "/api/message/msg-1005").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(provider.calls.load(Ordering::SeqCst), first_calls);
    }

    #[tokio::test]
    async fn test_message_detail_unknown_id_is_404() {
        let (state, _) = test_state("missing", "ok");
        let (status, body) = get_json(router(state), "/api/message/msg-9999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("msg-9999"));
    }

    #[tokio::test]
    async fn test_draft_reply_and_invalid_tone() {
        let (state, _) = test_state("reply", "Sounds good, see you then.");
        let app = router(state);

        let (status, body) = post_json(
            app.clone(),
            "/api/message/msg-1005/reply",
            json!({"tone": "casual"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Sounds good, see you then.");

        let (status, body) = post_json(
            app,
            "/api/message/msg-1005/reply",
            json!({"tone": "sarcastic"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("sarcastic"));
    }

    #[tokio::test]
    async fn test_send_reply_validation_and_success() {
        let (state, _) = test_state("send", "ok");
        let app = router(state);

        let (status, _) = post_json(
            app.clone(),
            "/api/message/msg-1005/send",
            json!({"reply_text": "  "}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post_json(
            app,
            "/api/message/msg-1005/send",
            json!({"reply_text": "Confirmed, thanks."}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sent"], true);
        assert!(!body["receipt_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prioritize_skips_unknown_ids() {
        let (state, _) = test_state("prioritize", "HIGH");
        let (status, body) = post_json(
            router(state),
            "/api/prioritize",
            json!({"ids": ["msg-1005", "msg-9999"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let map = body.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("msg-1005"));
    }

    #[tokio::test]
    async fn test_analytics_and_reset() {
        let (state, _) = test_state("analytics", "MEDIUM");
        let app = router(state);

        let (_, _) = get_json(app.clone(), "/api/message/msg-1005").await;
        let (status, body) = get_json(app.clone(), "/api/analytics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);

        let (status, body) = post_json(app.clone(), "/api/cache/reset", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reset"], true);

        let (_, body) = get_json(app, "/api/analytics").await;
        assert_eq!(body["total"], 0);
    }
}
