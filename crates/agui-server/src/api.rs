use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt as _};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use agui_relay::{ChatRequest, ProviderAdapter, stream_chat};

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Upstream provider, absent when no credential was configured at
    /// startup. Requests fail fast with a 500 in that case, before any
    /// event channel is opened.
    pub provider: Option<Arc<dyn ProviderAdapter>>,
}

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

/// Builds the application router with permissive CORS applied.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(cors)
        .with_state(state)
}

/// POST /api/chat: relays one turn as an SSE stream of chat events.
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<
    Sse<impl Stream<Item = Result<Event, Infallible>>>,
    (StatusCode, Json<serde_json::Value>),
> {
    let Some(provider) = state.provider else {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Server is missing OpenAI API Key"})),
        ));
    };

    let events = stream_chat(provider, request).map(|event| {
        let frame = Event::default().json_data(&event).unwrap_or_else(|err| {
            warn!(error = %err, "failed to encode relay event");
            Event::default().data(r#"{"type":"error","data":"event encoding failed"}"#)
        });
        Ok::<_, Infallible>(frame)
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
