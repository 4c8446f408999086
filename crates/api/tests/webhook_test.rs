use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use reframe_api::llm::{GenerationRequest, TextGenerator};
use reframe_api::{build_router, ApiError, ApiResult, AppState, Analyzer};
use reframe_core::{JsonFileStore, LoveLanguage, Settings, StateStore};
use tower::util::ServiceExt;

struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _request: GenerationRequest) -> ApiResult<String> {
        Err(ApiError::InvalidResponse("simulated outage".to_string()))
    }
}

fn test_app(
    analyzer: Analyzer,
) -> Result<(axum::Router, Arc<JsonFileStore>, tempfile::TempDir), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(JsonFileStore::new(dir.path().join("state.json")));
    let app = build_router(AppState::new(store.clone(), analyzer));
    Ok((app, store, dir))
}

async fn post_form(
    app: &axum::Router,
    path: &str,
    form: &str,
) -> Result<(StatusCode, Option<String>, String), Box<dyn std::error::Error>> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))?;
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body_bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, content_type, String::from_utf8(body_bytes.to_vec())?))
}

#[tokio::test]
async fn test_mock_mode_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let (app, store, _dir) = test_app(Analyzer::degraded())?;

    let (status, content_type, body) = post_form(
        &app,
        "/whatsapp",
        "Body=You+never+listen%21&From=whatsapp%3A%2B1",
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/xml"));
    assert!(body.contains("[Mock Reframed]: You never listen!"));
    assert!(body.contains("50/100"));
    assert!(body.starts_with("<?xml"));

    let doc = store.read();
    let last = doc.latest().ok_or("no message stored")?;
    assert_eq!(last.conflict_score, 50);
    assert_eq!(last.original_text, "You never listen!");
    assert_eq!(last.sender, "whatsapp:+1");
    assert!(doc.settings.is_none());

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path())?)?;
    assert_eq!(raw["messages"][0]["conflict_score"], 50);
    Ok(())
}

#[tokio::test]
async fn test_body_is_trimmed_and_empty_body_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let (app, store, _dir) = test_app(Analyzer::degraded())?;

    let (status, _, _) = post_form(&app, "/whatsapp", "Body=++hello+there++&From=a").await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _, body) = post_form(&app, "/whatsapp", "From=b").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("[Mock Reframed]: \n"));

    let doc = store.read();
    assert_eq!(doc.messages.len(), 2);
    assert_eq!(doc.messages[0].original_text, "hello there");
    assert_eq!(doc.messages[1].original_text, "");
    assert_eq!(doc.messages[1].sender, "b");
    Ok(())
}

#[tokio::test]
async fn test_messages_append_in_submission_order() -> Result<(), Box<dyn std::error::Error>> {
    let (app, store, _dir) = test_app(Analyzer::degraded())?;

    for i in 0..4 {
        let form = format!("Body=message+{}&From=whatsapp%3A%2B{}", i, i);
        let (status, _, _) = post_form(&app, "/whatsapp", &form).await?;
        assert_eq!(status, StatusCode::OK);
    }

    let doc = store.read();
    assert_eq!(doc.messages.len(), 4);
    for (i, record) in doc.messages.iter().enumerate() {
        assert_eq!(record.original_text, format!("message {}", i));
        assert_eq!(record.sender, format!("whatsapp:+{}", i));
    }
    Ok(())
}

#[tokio::test]
async fn test_upstream_failure_replies_with_fallback() -> Result<(), Box<dyn std::error::Error>> {
    let (app, store, _dir) = test_app(Analyzer::new(Arc::new(FailingGenerator)))?;
    store.update_settings(Settings {
        love_language: LoveLanguage::PhysicalTouch,
    })?;

    let (status, _, body) = post_form(&app, "/whatsapp", "Body=whatever&From=x").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("I&apos;m feeling overwhelmed and need a moment."));
    assert!(body.contains("75/100"));

    let doc = store.read();
    assert_eq!(doc.messages.len(), 1);
    assert_eq!(doc.messages[0].conflict_score, 75);
    assert_eq!(doc.love_language(), LoveLanguage::PhysicalTouch);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_state_is_replaced_on_next_append() -> Result<(), Box<dyn std::error::Error>> {
    let (app, store, _dir) = test_app(Analyzer::degraded())?;
    fs::write(store.path(), "{{{ definitely not json")?;

    let (status, _, _) = post_form(&app, "/whatsapp", "Body=hi&From=x").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.read().messages.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_health_check() -> Result<(), Box<dyn std::error::Error>> {
    let (app, _store, _dir) = test_app(Analyzer::degraded())?;
    let request = Request::builder().uri("/health").body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"OK");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_posts_keep_full_history() -> Result<(), Box<dyn std::error::Error>> {
    let (app, store, _dir) = test_app(Analyzer::degraded())?;
    for i in 0..100 {
        store.append(reframe_core::MessageRecord::from_analysis(
            reframe_core::now_timestamp(),
            format!("seed {}", i),
            "whatsapp:+0",
            reframe_api::analysis::mock_analysis("seed"),
        ))?;
    }

    let mut tasks = Vec::new();
    for i in 0..64 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri("/whatsapp")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(format!("Body=burst+{}&From=whatsapp%3A%2B1", i)))
                .map_err(|e| e.to_string())?;
            let response = app.oneshot(request).await.map_err(|e| e.to_string())?;
            Ok::<StatusCode, String>(response.status())
        }));
    }
    for task in tasks {
        assert_eq!(task.await??, StatusCode::OK);
    }

    let doc = store.read();
    assert_eq!(doc.messages.len(), 100 + 64);
    assert_eq!(doc.messages[0].original_text, "seed 0");
    for i in 0..64 {
        let text = format!("burst {}", i);
        assert!(doc.messages.iter().any(|m| m.original_text == text), "lost {}", text);
    }
    Ok(())
}
