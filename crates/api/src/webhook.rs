//! Inbound messaging webhook.
//!
//! Accepts Twilio-style WhatsApp form posts, analyzes the message, appends the
//! result to the shared state and answers with a TwiML reply.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::post,
    Form, Router,
};
use reframe_core::{now_timestamp, Analysis, MessageRecord};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{ApiError, ApiResult, AppState};

/// Webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/whatsapp", post(whatsapp_reply))
}

/// Form fields of an inbound message. Other provider fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "From", default)]
    pub from: String,
}

/// Text sent back to the sender.
pub fn reply_text(analysis: &Analysis) -> String {
    format!(
        "✨ Reframed: {}\n\n🌡️ Conflict Level: {}/100",
        analysis.reframed_text, analysis.conflict_score
    )
}

/// Wrap `text` in a single-message TwiML document.
pub fn twiml_message(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(text)
    )
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Analyze, persist and reply.
pub async fn handle_inbound(state: &AppState, inbound: InboundMessage) -> ApiResult<Analysis> {
    let text = inbound.body.trim().to_string();
    info!("Received message from {}: {}", inbound.from, text);

    let store = Arc::clone(&state.store);
    let love_language = tokio::task::spawn_blocking(move || store.read().love_language())
        .await
        .map_err(|e| ApiError::Internal(format!("join state read task failed: {}", e)))?;

    let analysis = state.analyzer.analyze_text(&text, love_language).await;

    let record = MessageRecord::from_analysis(now_timestamp(), text, inbound.from, analysis.clone());
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || store.append(record))
        .await
        .map_err(|e| ApiError::Internal(format!("join state append task failed: {}", e)))??;

    Ok(analysis)
}

#[instrument(skip_all)]
async fn whatsapp_reply(
    State(state): State<AppState>,
    Form(inbound): Form<InboundMessage>,
) -> ApiResult<impl IntoResponse> {
    let analysis = handle_inbound(&state, inbound).await?;
    let body = twiml_message(&reply_text(&analysis));
    Ok(([(header::CONTENT_TYPE, "application/xml")], body))
}
