use shared::domain::{Feature, FeatureReview};

use super::*;
use crate::preview::InMemoryPreviews;

fn photo(name: &str) -> SelectedFile {
    SelectedFile::new(name, name.as_bytes().to_vec())
}

fn result_with_score(score: f64) -> AnalysisResult {
    AnalysisResult {
        score,
        review: FeatureReview {
            jawline: Some("strong".to_string()),
            ..FeatureReview::default()
        },
        tips: vec!["Tip A".to_string()],
    }
}

#[test]
fn starts_idle_without_file_or_preview() {
    let session = Session::new(InMemoryPreviews::new());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(snapshot.file_name.is_none());
    assert!(snapshot.preview_url.is_none());
}

#[test]
fn absent_selection_is_ignored() {
    let previews = InMemoryPreviews::new();
    let mut session = Session::new(previews.clone());
    assert!(!session.select_file(None));
    assert_eq!(session.state(), &SessionState::Idle);
    assert_eq!(previews.acquired_count(), 0);
}

#[test]
fn repeated_selection_keeps_exactly_the_latest_preview() {
    let previews = InMemoryPreviews::new();
    let mut session = Session::new(previews.clone());

    for name in ["a.png", "b.png", "c.png", "d.png"] {
        assert!(session.select_file(Some(photo(name))));
    }

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SessionState::Selected);
    assert_eq!(snapshot.file_name.as_deref(), Some("d.png"));
    assert_eq!(previews.live_urls(), vec![snapshot.preview_url.clone().expect("preview")]);
    assert_eq!(previews.acquired_count(), 4);
    assert_eq!(previews.released_count(), 3);
    assert_eq!(previews.release_calls(), previews.acquired_count() - 1);
    assert_eq!(
        previews
            .resolve(snapshot.preview_url.as_deref().expect("preview"))
            .as_deref(),
        Some(&b"d.png"[..])
    );
}

#[test]
fn begin_analysis_without_file_is_a_noop() {
    let mut session = Session::new(InMemoryPreviews::new());
    assert!(session.begin_analysis().is_none());
    assert_eq!(session.state(), &SessionState::Idle);
    assert!(!session.is_uploading());
}

#[test]
fn only_one_request_may_be_in_flight() {
    let previews = InMemoryPreviews::new();
    let mut session = Session::new(previews.clone());
    session.select_file(Some(photo("a.png")));

    let pending = session.begin_analysis().expect("pending");
    assert_eq!(pending.file().file_name(), "a.png");
    assert_eq!(session.state(), &SessionState::Uploading);
    assert!(session.begin_analysis().is_none());

    assert!(!session.select_file(Some(photo("b.png"))));
    assert_eq!(session.selected_file().map(SelectedFile::file_name), Some("a.png"));
    assert_eq!(previews.acquired_count(), 1);
}

#[test]
fn success_stores_result() {
    let mut session = Session::new(InMemoryPreviews::new());
    session.select_file(Some(photo("a.png")));
    let pending = session.begin_analysis().expect("pending");

    assert!(session.complete(pending.request_id(), Ok(result_with_score(7.0))));

    let snapshot = session.snapshot();
    let result = snapshot.result().expect("result");
    assert_eq!(result.score, 7.0);
    assert_eq!(result.review.note(Feature::Jawline), Some("strong"));
    assert!(snapshot.error().is_none());
    assert!(!snapshot.is_loading());
}

#[test]
fn failure_stores_collapsed_message() {
    let mut session = Session::new(InMemoryPreviews::new());
    session.select_file(Some(photo("a.png")));
    let pending = session.begin_analysis().expect("pending");

    session.complete(
        pending.request_id(),
        Err(AnalysisError::Rejected {
            status: 400,
            body: String::new(),
        }),
    );

    assert_eq!(
        session.state(),
        &SessionState::Failed {
            error: "Upload failed".to_string()
        }
    );
    assert!(session.snapshot().result().is_none());
}

#[test]
fn outcome_for_unknown_request_is_dropped() {
    let mut session = Session::new(InMemoryPreviews::new());
    session.select_file(Some(photo("a.png")));
    let _pending = session.begin_analysis().expect("pending");

    assert!(!session.complete(Uuid::new_v4(), Ok(result_with_score(3.0))));
    assert_eq!(session.state(), &SessionState::Uploading);
}

#[test]
fn new_selection_clears_terminal_state() {
    let mut session = Session::new(InMemoryPreviews::new());
    session.select_file(Some(photo("a.png")));
    let pending = session.begin_analysis().expect("pending");
    session.complete(
        pending.request_id(),
        Err(AnalysisError::Transport {
            message: "connection refused".to_string(),
        }),
    );
    assert_eq!(session.snapshot().error(), Some("connection refused"));

    assert!(session.select_file(Some(photo("b.png"))));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SessionState::Selected);
    assert!(snapshot.error().is_none());
    assert!(snapshot.result().is_none());
}

#[test]
fn terminal_state_can_be_analyzed_again() {
    let mut session = Session::new(InMemoryPreviews::new());
    session.select_file(Some(photo("a.png")));
    let first = session.begin_analysis().expect("pending");
    session.complete(first.request_id(), Ok(result_with_score(5.0)));

    let second = session.begin_analysis().expect("pending");
    assert_ne!(first.request_id(), second.request_id());
    assert_eq!(session.state(), &SessionState::Uploading);
    assert!(session.snapshot().result().is_none());
}

#[test]
fn reset_and_drop_release_the_preview() {
    let previews = InMemoryPreviews::new();
    let mut session = Session::new(previews.clone());
    session.select_file(Some(photo("a.png")));
    session.reset();
    assert_eq!(previews.live_count(), 0);
    assert_eq!(session.state(), &SessionState::Idle);

    session.select_file(Some(photo("b.png")));
    drop(session);
    assert_eq!(previews.live_count(), 0);
    assert_eq!(previews.released_count(), 2);
    assert_eq!(previews.release_calls(), 2);
}

#[test]
fn snapshot_serializes_with_state_tag() {
    let mut session = Session::new(InMemoryPreviews::new());
    session.select_file(Some(photo("a.png")));
    let json = serde_json::to_value(session.snapshot()).expect("json");
    assert_eq!(json["state"], "selected");
    assert_eq!(json["file_name"], "a.png");
}

#[tokio::test]
async fn reset_aborts_the_attached_task() {
    let mut session = Session::new(InMemoryPreviews::new());
    session.select_file(Some(photo("a.png")));
    let pending = session.begin_analysis().expect("pending");

    let task = tokio::spawn(std::future::pending::<()>());
    session.attach_task(pending.request_id(), task.abort_handle());
    session.reset();

    assert!(task.await.expect_err("aborted").is_cancelled());
    assert!(!session.is_uploading());
}

#[tokio::test]
async fn task_for_unknown_request_is_aborted_on_attach() {
    let mut session = Session::new(InMemoryPreviews::new());
    session.select_file(Some(photo("a.png")));
    let _pending = session.begin_analysis().expect("pending");

    let task = tokio::spawn(std::future::pending::<()>());
    session.attach_task(Uuid::new_v4(), task.abort_handle());

    assert!(task.await.expect_err("aborted").is_cancelled());
    assert_eq!(session.state(), &SessionState::Uploading);
}

#[tokio::test]
async fn completion_detaches_the_task() {
    let mut session = Session::new(InMemoryPreviews::new());
    session.select_file(Some(photo("a.png")));
    let pending = session.begin_analysis().expect("pending");

    let task = tokio::spawn(async {});
    session.attach_task(pending.request_id(), task.abort_handle());
    session.complete(pending.request_id(), Ok(result_with_score(6.0)));
    session.reset();

    assert!(task.await.is_ok());
}
