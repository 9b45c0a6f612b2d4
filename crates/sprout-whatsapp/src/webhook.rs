use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use sprout_core::error::{Result, SproutError};

use crate::twiml;
use crate::ConversationHandler;

const RETRY_REPLY: &str = "Hmm, I didn't quite get that. Try again!";
const NO_QUIZ: &str = "No quiz today.";
const NO_CHECK: &str = "No check today.";

#[derive(serde::Deserialize)]
struct IncomingMessage {
    #[serde(rename = "Body", default)]
    body: String,
    #[serde(rename = "From", default)]
    from: String,
}

#[derive(serde::Deserialize)]
struct RoutineQuery {
    #[serde(default)]
    from: String,
}

struct AppState {
    handler: Arc<dyn ConversationHandler>,
}

fn xml(messages: &[String]) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/xml")], twiml::render(messages))
}

async fn reply_whatsapp(
    State(state): State<Arc<AppState>>,
    Form(msg): Form<IncomingMessage>,
) -> impl IntoResponse {
    let text = msg.body.trim();
    tracing::info!(from = %msg.from, "incoming message");

    let replies = match state.handler.handle_message(&msg.from, text).await {
        Ok(replies) if !replies.is_empty() => replies,
        Ok(_) => vec![RETRY_REPLY.to_string()],
        Err(e) => {
            tracing::warn!(from = %msg.from, error = %e, "message handling failed");
            vec![RETRY_REPLY.to_string()]
        }
    };
    xml(&replies)
}

async fn daily_quiz(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RoutineQuery>,
) -> impl IntoResponse {
    let reply = match state.handler.daily_quiz(&q.from).await {
        Ok(Some(quiz)) => quiz,
        Ok(None) => NO_QUIZ.to_string(),
        Err(e) => {
            tracing::warn!(from = %q.from, error = %e, "daily quiz failed");
            NO_QUIZ.to_string()
        }
    };
    xml(&[reply])
}

async fn daily_check(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RoutineQuery>,
) -> impl IntoResponse {
    let reply = match state.handler.daily_check(&q.from).await {
        Ok(Some(check)) => check,
        Ok(None) => NO_CHECK.to_string(),
        Err(e) => {
            tracing::warn!(from = %q.from, error = %e, "daily check failed");
            NO_CHECK.to_string()
        }
    };
    xml(&[reply])
}

pub fn router(handler: Arc<dyn ConversationHandler>) -> Router {
    let state = Arc::new(AppState { handler });
    Router::new()
        .route("/reply_whatsapp", post(reply_whatsapp))
        .route("/daily_quiz", get(daily_quiz))
        .route("/daily_check", get(daily_check))
        .with_state(state)
}

/// Serve the webhook until the process stops.
pub async fn serve(port: u16, handler: Arc<dyn ConversationHandler>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| SproutError::Channel(format!("failed to bind port {port}: {e}")))?;
    tracing::info!(port, "whatsapp webhook listening");

    axum::serve(listener, router(handler))
        .await
        .map_err(|e| SproutError::Channel(format!("webhook server error: {e}")))?;

    Ok(())
}
