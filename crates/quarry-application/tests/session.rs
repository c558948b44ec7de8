mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use quarry_application::{ReportSessionUsecase, prompts};
use quarry_core::{PipelineMode, PipelineStage, QuarryError};
use tempfile::TempDir;

fn usecase_with(completion: Arc<ScriptedCompletion>) -> ReportSessionUsecase {
    ReportSessionUsecase::new(completion, ScriptedSearch::with_results(2), &test_config())
}

#[tokio::test]
async fn test_generation_history_is_append_only() {
    let usecase = usecase_with(ScriptedCompletion::new(happy_script));
    let session = usecase.create_session().await;

    let topics = ["renewable energy", "battery recycling", "green hydrogen"];
    let mut snapshots = Vec::new();
    for topic in topics {
        usecase
            .generate(&session, topic, PipelineMode::MultiAgent)
            .await
            .unwrap();
        snapshots.push(usecase.snapshot(&session).await.unwrap());
    }

    let state = usecase.snapshot(&session).await.unwrap();
    assert_eq!(state.history().len(), topics.len());
    for (n, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(&state.history()[..=n], snapshot.history());
    }
    assert_eq!(state.entry(2).unwrap().topic, "battery recycling");
    assert_eq!(
        state.current_report(),
        Some(state.history()[2].report.as_str())
    );
}

#[tokio::test]
async fn test_refinement_updates_current_report_and_chat() {
    let usecase = usecase_with(ScriptedCompletion::new(happy_script));
    let session = usecase.create_session().await;
    usecase
        .generate(&session, "renewable energy", PipelineMode::Sectioned)
        .await
        .unwrap();

    let revised = usecase.refine(&session, "Make it shorter").await.unwrap();

    assert_eq!(revised, "Refined report.");
    let state = usecase.snapshot(&session).await.unwrap();
    assert_eq!(state.current_report(), Some("Refined report."));
    assert_eq!(state.chat_history().len(), 1);
    assert_eq!(state.chat_history()[0].question, "Make it shorter");
    assert_eq!(state.history().len(), 1);
    assert_ne!(state.history()[0].report, "Refined report.");
}

#[tokio::test]
async fn test_failed_refinement_leaves_state_untouched() {
    let refine_calls = Arc::new(AtomicUsize::new(0));
    let calls = refine_calls.clone();
    let completion = ScriptedCompletion::new(move |request| {
        if system_prompt(request) == prompts::REFINER_SYSTEM {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(QuarryError::completion_unavailable("HTTP 429", Some(429), true))
        } else {
            happy_script(request)
        }
    });
    let usecase = usecase_with(completion);
    let session = usecase.create_session().await;
    usecase
        .generate(&session, "renewable energy", PipelineMode::MultiAgent)
        .await
        .unwrap();
    let before = usecase.snapshot(&session).await.unwrap();

    let err = usecase.refine(&session, "Add a table").await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(refine_calls.load(Ordering::SeqCst), 1);
    assert_eq!(usecase.snapshot(&session).await.unwrap(), before);
}

#[tokio::test]
async fn test_refine_without_report_is_invalid_input() {
    let completion = ScriptedCompletion::new(happy_script);
    let usecase = usecase_with(completion.clone());
    let session = usecase.create_session().await;

    let err = usecase.refine(&session, "Shorter").await.unwrap_err();

    assert!(matches!(err, QuarryError::InvalidInput(_)));
    assert!(completion.requests().is_empty());
}

#[tokio::test]
async fn test_empty_instruction_is_invalid_input() {
    let completion = ScriptedCompletion::new(happy_script);
    let usecase = usecase_with(completion.clone());
    let session = usecase.create_session().await;
    usecase
        .generate(&session, "renewable energy", PipelineMode::Sectioned)
        .await
        .unwrap();
    let before = usecase.snapshot(&session).await.unwrap();

    let err = usecase.refine(&session, "   ").await.unwrap_err();

    assert!(matches!(err, QuarryError::InvalidInput(_)));
    assert_eq!(completion.calls_with_system(prompts::REFINER_SYSTEM), 0);
    assert_eq!(usecase.snapshot(&session).await.unwrap(), before);
}

#[tokio::test]
async fn test_failed_generation_does_not_touch_session() {
    let completion = ScriptedCompletion::new(|request| {
        if system_prompt(request) == prompts::SECTION_WRITER_SYSTEM {
            Err(QuarryError::completion_unavailable("timeout", None, true))
        } else {
            happy_script(request)
        }
    });
    let usecase = usecase_with(completion);
    let session = usecase.create_session().await;

    let failure = usecase
        .generate(&session, "renewable energy", PipelineMode::Sectioned)
        .await
        .unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Writer);
    assert!(failure.partial.plan.is_some());
    let state = usecase.snapshot(&session).await.unwrap();
    assert!(state.history().is_empty());
    assert!(state.current_report().is_none());
}

#[tokio::test]
async fn test_sessions_do_not_share_state() {
    let usecase = usecase_with(ScriptedCompletion::new(happy_script));
    let alice = usecase.create_session().await;
    let bob = usecase.create_session().await;
    assert_ne!(alice, bob);

    usecase
        .generate(&alice, "renewable energy", PipelineMode::MultiAgent)
        .await
        .unwrap();

    let bob_state = usecase.snapshot(&bob).await.unwrap();
    assert!(bob_state.history().is_empty());
    assert!(usecase.refine(&bob, "Shorter").await.is_err());
}

#[tokio::test]
async fn test_unknown_session_is_rejected() {
    let usecase = usecase_with(ScriptedCompletion::new(happy_script));
    let err = usecase.snapshot("missing").await.unwrap_err();
    assert!(matches!(err, QuarryError::InvalidInput(_)));
}

#[tokio::test]
async fn test_export_writes_pdf_of_current_report() {
    let usecase = usecase_with(ScriptedCompletion::new(happy_script));
    let session = usecase.create_session().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("research_report.pdf");

    let err = usecase.export_pdf(&session, &path).await.unwrap_err();
    assert!(matches!(err, QuarryError::InvalidInput(_)));

    usecase
        .generate(&session, "renewable energy", PipelineMode::MultiAgent)
        .await
        .unwrap();
    let written = usecase.export_pdf(&session, &path).await.unwrap();

    let bytes = std::fs::read(&written).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(usecase.render_pdf(&session).await.unwrap().starts_with(b"%PDF"));
}

#[tokio::test(flavor = "current_thread")]
async fn test_export_runs_off_runtime_and_reports_write_errors() {
    let usecase = usecase_with(ScriptedCompletion::new(happy_script));
    let session = usecase.create_session().await;
    usecase
        .generate(&session, "renewable energy", PipelineMode::MultiAgent)
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let err = usecase.export_pdf(&session, dir.path()).await.unwrap_err();
    assert!(matches!(err, QuarryError::Io { .. }));

    let path = dir.path().join("research_report.pdf");
    let (written, rendered) =
        tokio::join!(usecase.export_pdf(&session, &path), usecase.render_pdf(&session));
    assert!(written.unwrap().exists());
    assert!(rendered.unwrap().starts_with(b"%PDF"));
}
