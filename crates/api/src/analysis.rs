//! Message analysis: reframing, conflict scoring and micro-date suggestions.
//!
//! Failures never reach the caller. Without a credential the analyzer runs in
//! degraded mode and returns fixed mock output; with one, any generation or
//! parse failure is replaced by a fixed fallback.

use reframe_core::config::LlmConfig;
use reframe_core::{Analysis, LoveLanguage, MAX_CONFLICT_SCORE};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};

use crate::llm::{GenerationRequest, GroqClient, TextGenerator};
use crate::{ApiError, ApiResult};

/// Score reported by the degraded-mode mock.
pub const MOCK_CONFLICT_SCORE: u8 = 50;
/// Score reported when the service call or parse fails.
pub const FALLBACK_CONFLICT_SCORE: u8 = 75;

pub const MICRO_DATE_UNCONFIGURED: &str = "Configure Groq API Key to generate real ideas.";
pub const MICRO_DATE_FAILED: &str = "Could not generate idea. (API Error)";

/// Degraded-mode output for `text`.
pub fn mock_analysis(text: &str) -> Analysis {
    Analysis {
        reframed_text: format!("[Mock Reframed]: {}", text),
        conflict_score: MOCK_CONFLICT_SCORE,
        hidden_need: "To be heard".to_string(),
        peace_offering: "Share a quiet moment together.".to_string(),
    }
}

/// Output used when the service cannot produce a usable analysis.
pub fn fallback_analysis() -> Analysis {
    Analysis {
        reframed_text: "I'm feeling overwhelmed and need a moment.".to_string(),
        conflict_score: FALLBACK_CONFLICT_SCORE,
        hidden_need: "Emotional safety".to_string(),
        peace_offering: "Take a deep breath and ask for a hug.".to_string(),
    }
}

/// System instruction for the reframing call.
pub fn reframe_instruction(love_language: LoveLanguage) -> String {
    format!(
        r#"You are an expert Relationship Psychologist. Your goal is to de-escalate conflict and uncover hidden emotional needs.
Analyze the submitted message from a partner in a conflict.

Reframing Constraint: The user's partner responds best to the Love Language: "{lang}".
Ensure the 'reframed_text' and 'peace_offering' align with this value.

Tasks:
1. Reframe the message: Convert "You" statements to "I" statements. Remove insults. Preserve the core emotional truth.
   - If "{lang}" is Acts of Service, suggest helping or doing.
   - If "{lang}" is Words of Affirmation, use validating and appreciative language.
   - If "{lang}" is Quality Time, suggest time together.
2. Estimate a 'conflict_score' from 0 (peaceful) to 100 (high conflict).
3. Identify the 'hidden_need' (e.g., validation, safety, connection).
4. Suggest a 'peace_offering' (a micro-date or connection act).

Output strictly valid JSON with keys: 'reframed_text', 'conflict_score', 'hidden_need', 'peace_offering'."#,
        lang = love_language.as_str()
    )
}

/// Prompt for the dashboard's micro-date suggestion.
pub fn micro_date_prompt(love_language: LoveLanguage, conflict_context: &str) -> String {
    format!(
        r#"Suggest a unique 'Micro-Date' (under 30 mins) for a couple to reconnect after a conflict.

Constraint: One partner's Love Language is "{}".
Context of conflict: "{}"

The idea should be specific, actionable, and low-pressure.
Output ONLY the idea in one sentence."#,
        love_language.as_str(),
        conflict_context
    )
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    reframed_text: String,
    conflict_score: f64,
    hidden_need: String,
    peace_offering: String,
}

/// Parse the model's JSON reply into an [`Analysis`].
pub fn parse_analysis(raw: &str) -> ApiResult<Analysis> {
    let parsed: RawAnalysis = serde_json::from_str(raw.trim())?;
    if !parsed.conflict_score.is_finite() {
        return Err(ApiError::InvalidResponse(
            "conflict_score is not a finite number".to_string(),
        ));
    }
    let score = parsed
        .conflict_score
        .round()
        .clamp(0.0, f64::from(MAX_CONFLICT_SCORE)) as u8;

    Ok(Analysis {
        reframed_text: parsed.reframed_text,
        conflict_score: score,
        hidden_need: parsed.hidden_need,
        peace_offering: parsed.peace_offering,
    })
}

/// Analysis adapter over an optional text generator.
#[derive(Clone, Default)]
pub struct Analyzer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Analyzer {
    /// Analyzer backed by `generator`.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// Analyzer that always answers with mock output.
    pub fn degraded() -> Self {
        Self { generator: None }
    }

    /// Build from configuration. A missing credential selects degraded mode.
    pub fn from_config(config: &LlmConfig) -> ApiResult<Self> {
        match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                let client = GroqClient::new(key, config)?;
                Ok(Self::new(Arc::new(client)))
            }
            _ => {
                warn!("GROQ_API_KEY not set. AI features will mock responses.");
                Ok(Self::degraded())
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.generator.is_none()
    }

    /// Reframe `text` for a partner whose preference is `love_language`.
    pub async fn analyze_text(&self, text: &str, love_language: LoveLanguage) -> Analysis {
        let Some(generator) = self.generator.as_ref() else {
            return mock_analysis(text);
        };

        let request = GenerationRequest::json(reframe_instruction(love_language), text);
        let result = match generator.generate(request).await {
            Ok(raw) => parse_analysis(&raw),
            Err(err) => Err(err),
        };

        result.unwrap_or_else(|err| {
            error!("analysis failed: {}", err);
            fallback_analysis()
        })
    }

    /// One-sentence reconnection idea. Never fails.
    pub async fn micro_date(&self, love_language: LoveLanguage, conflict_context: &str) -> String {
        let Some(generator) = self.generator.as_ref() else {
            return MICRO_DATE_UNCONFIGURED.to_string();
        };

        let request = GenerationRequest::text(micro_date_prompt(love_language, conflict_context));
        match generator.generate(request).await {
            Ok(idea) => idea.trim().to_string(),
            Err(err) => {
                error!("micro-date generation failed: {}", err);
                MICRO_DATE_FAILED.to_string()
            }
        }
    }
}
