use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shared::{
    domain::{Decision, DecisionId, EvidenceDocument, OptionId},
    protocol::{DecisionResult, OptionOutcome, UploadAck},
};
use tokio::sync::{oneshot, Mutex, Notify};

use crate::{ClientError, DecisionApi};

pub fn sample_result(decision_id: DecisionId, report: Option<&str>) -> DecisionResult {
    DecisionResult {
        decision_id,
        ranked_options: vec![
            OptionOutcome {
                option_id: OptionId(7),
                score: 0.91,
                reasons: vec!["SUPPORTS: cheaper".into(), "GEMINI: lower risk".into()],
            },
            OptionOutcome {
                option_id: OptionId(3),
                score: 0.42,
                reasons: vec!["SUPPORTS: familiar".into()],
            },
        ],
        consultant_report: report.map(str::to_string),
    }
}

fn unavailable() -> ClientError {
    ClientError::Status {
        url: "http://fake.invalid".into(),
        status: 503,
        message: "backend unavailable".into(),
    }
}

/// In-memory backend. Gates let a test hold one call open while it drives
/// other operations; `*_started` fires once the gated call is waiting.
pub struct FakeApi {
    pub report: Mutex<Option<String>>,
    pub fail_fetch: Mutex<bool>,
    pub fail_upload: Mutex<bool>,
    pub create_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub fetch_gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub upload_gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub fetch_started: Notify,
    pub upload_started: Notify,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            report: Mutex::new(Some("# Directive\n\nPick option 7.".into())),
            fail_fetch: Mutex::new(false),
            fail_upload: Mutex::new(false),
            create_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            fetch_gate: Mutex::new(None),
            upload_gate: Mutex::new(None),
            fetch_started: Notify::new(),
            upload_started: Notify::new(),
        }
    }

    pub async fn gate_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.fetch_gate.lock().await = Some(rx);
        tx
    }

    pub async fn gate_next_upload(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.upload_gate.lock().await = Some(rx);
        tx
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecisionApi for FakeApi {
    async fn create_decision(&self, title: &str) -> Result<Decision, ClientError> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Decision {
            id: DecisionId(100 + call as u64),
            title: title.to_string(),
        })
    }

    async fn upload_document(
        &self,
        decision_id: DecisionId,
        document: EvidenceDocument,
    ) -> Result<UploadAck, ClientError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.upload_gate.lock().await.take();
        self.upload_started.notify_one();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if *self.fail_upload.lock().await {
            return Err(unavailable());
        }
        Ok(UploadAck {
            filename: document.filename,
            status: "processed".into(),
            linked_to_decision: decision_id,
        })
    }

    async fn fetch_result(&self, decision_id: DecisionId) -> Result<DecisionResult, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.fetch_gate.lock().await.take();
        self.fetch_started.notify_one();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if *self.fail_fetch.lock().await {
            return Err(unavailable());
        }
        let report = self.report.lock().await.clone();
        Ok(sample_result(decision_id, report.as_deref()))
    }
}
