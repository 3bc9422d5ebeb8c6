use super::*;
use crate::{fake_api::FakeApi, FetchOutcome};

fn setup() -> (Arc<FakeApi>, Arc<DecisionQueryCache>, UploadController) {
    let api = Arc::new(FakeApi::new());
    let cache = Arc::new(DecisionQueryCache::new(api.clone()));
    let uploads = UploadController::new(api.clone(), cache.clone());
    (api, cache, uploads)
}

fn pdf(name: &str) -> EvidenceDocument {
    EvidenceDocument::new(name, "application/pdf", b"%PDF-1.7 test".to_vec())
}

#[tokio::test]
async fn non_pdf_is_rejected_locally() {
    let (api, _cache, uploads) = setup();
    let notes = EvidenceDocument::new("notes.txt", "text/plain", b"hello".to_vec());

    let err = uploads
        .upload(DecisionId(1), notes)
        .await
        .expect_err("text/plain must be rejected");

    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::UnsupportedMediaType { .. })
    ));
    assert_eq!(api.uploads(), 0);
    assert_eq!(uploads.state().await, UploadState::Idle);
}

#[tokio::test]
async fn pdf_media_type_parameters_are_accepted() {
    let (api, _cache, uploads) = setup();
    let doc = EvidenceDocument::new("a.pdf", "Application/PDF; charset=binary", b"%PDF".to_vec());

    uploads.upload(DecisionId(1), doc).await.expect("upload");
    assert_eq!(api.uploads(), 1);
}

#[tokio::test]
async fn success_invalidates_cached_result() {
    let (_api, cache, uploads) = setup();
    let id = DecisionId(2);
    cache.run_analysis(id).await.expect("run");
    assert!(cache.cached(id).await.is_some());

    let ack = uploads.upload(id, pdf("report.pdf")).await.expect("upload");

    assert_eq!(ack.linked_to_decision, id);
    assert_eq!(uploads.state().await, UploadState::Success(ack));
    assert!(cache.cached(id).await.is_none());
}

#[tokio::test]
async fn failure_keeps_cache_and_is_reenterable() {
    let (api, cache, uploads) = setup();
    let id = DecisionId(3);
    cache.run_analysis(id).await.expect("run");
    *api.fail_upload.lock().await = true;

    let err = uploads.upload(id, pdf("a.pdf")).await.expect_err("fails");
    assert!(!err.is_validation());
    assert!(matches!(uploads.state().await, UploadState::Error(_)));
    assert!(cache.cached(id).await.is_some(), "failed upload keeps the result");

    *api.fail_upload.lock().await = false;
    uploads.upload(id, pdf("b.pdf")).await.expect("retry by user");
    assert!(matches!(uploads.state().await, UploadState::Success(_)));
    assert_eq!(api.uploads(), 2);
}

#[tokio::test]
async fn state_is_pending_while_request_is_in_flight() {
    let (api, _cache, uploads) = setup();
    let release = api.gate_next_upload().await;

    let upload = uploads.upload(DecisionId(4), pdf("slow.pdf"));
    let observe = async {
        api.upload_started.notified().await;
        let state = uploads.state().await;
        release.send(()).expect("release");
        state
    };
    let (result, observed) = tokio::join!(upload, observe);

    result.expect("upload");
    assert_eq!(
        observed,
        UploadState::Pending {
            filename: "slow.pdf".into()
        }
    );
}

#[tokio::test]
async fn older_upload_completion_does_not_overwrite_newer_state() {
    let (api, cache, uploads) = setup();
    let id = DecisionId(6);
    let release_older = api.gate_next_upload().await;

    let older = uploads.upload(id, pdf("older.pdf"));
    let newer_then_release = async {
        api.upload_started.notified().await;
        *api.fail_upload.lock().await = true;
        let newer = uploads.upload(id, pdf("newer.pdf")).await;
        *api.fail_upload.lock().await = false;
        cache.run_analysis(id).await.expect("run after failed upload");
        release_older.send(()).expect("release");
        newer
    };
    let (older, newer) = tokio::join!(older, newer_then_release);

    older.expect("older upload succeeds");
    newer.expect_err("newer upload fails");
    assert!(matches!(uploads.state().await, UploadState::Error(_)));
    // the older success still evicts the result fetched in between
    assert!(cache.cached(id).await.is_none());
    assert!(matches!(
        cache.run_analysis(id).await.expect("refetch"),
        FetchOutcome::Applied(_)
    ));
}
