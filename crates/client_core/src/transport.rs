//! HTTP binding for the decision backend.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    multipart, Client, Response, StatusCode,
};
use shared::{
    domain::{Decision, DecisionId, EvidenceDocument},
    error::ApiErrorBody,
    protocol::{CreateDecisionRequest, DecisionResult, UploadAck},
};
use tracing::info;
use url::Url;

use crate::{ClientError, DecisionApi};

pub struct HttpDecisionApi {
    http: Client,
    base_url: String,
}

impl HttpDecisionApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_headers(base_url, std::iter::empty::<(&str, &str)>())
    }

    /// Builds a client that sends `headers` on every request.
    pub fn with_headers<K, V>(
        base_url: &str,
        headers: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, ClientError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let parsed = Url::parse(base_url).map_err(|source| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in headers {
            let name = name.as_ref();
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::InvalidHeader(name.to_string()))?;
            let header_value = HeaderValue::from_str(value.as_ref())
                .map_err(|_| ClientError::InvalidHeader(name.to_string()))?;
            default_headers.insert(header_name, header_value);
        }

        let http = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

async fn check_status(
    response: Response,
    decision_id: Option<DecisionId>,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(decision_id) = decision_id {
            return Err(ClientError::NotFound(decision_id));
        }
    }

    let url = response.url().to_string();
    let body: ApiErrorBody = response.json().await.unwrap_or_default();
    let message = body.message().unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    });
    Err(ClientError::Status {
        url,
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DecisionApi for HttpDecisionApi {
    async fn create_decision(&self, title: &str) -> Result<Decision, ClientError> {
        let response = self
            .http
            .post(format!("{}/decisions", self.base_url))
            .json(&CreateDecisionRequest {
                title: title.to_string(),
            })
            .send()
            .await?;
        let mut decision: Decision = check_status(response, None).await?.json().await?;
        if decision.title.is_empty() {
            decision.title = title.to_string();
        }
        info!(decision_id = %decision.id, "decision created");
        Ok(decision)
    }

    async fn upload_document(
        &self,
        decision_id: DecisionId,
        document: EvidenceDocument,
    ) -> Result<UploadAck, ClientError> {
        let size_bytes = document.bytes.len();
        let part = multipart::Part::bytes(document.bytes)
            .file_name(document.filename.clone())
            .mime_str(&document.media_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/documents/upload", self.base_url))
            .query(&[("decision_id", decision_id.0)])
            .multipart(form)
            .send()
            .await?;
        let ack: UploadAck = check_status(response, Some(decision_id))
            .await?
            .json()
            .await?;

        if ack.linked_to_decision != decision_id {
            return Err(ClientError::UnexpectedResponse(format!(
                "upload of '{}' linked to decision {} instead of {decision_id}",
                document.filename, ack.linked_to_decision
            )));
        }
        info!(
            decision_id = %decision_id,
            filename = %ack.filename,
            size_bytes,
            status = %ack.status,
            "evidence uploaded"
        );
        Ok(ack)
    }

    async fn fetch_result(&self, decision_id: DecisionId) -> Result<DecisionResult, ClientError> {
        let response = self
            .http
            .get(format!("{}/decisions/{}/evaluate", self.base_url, decision_id.0))
            .send()
            .await?;
        let result: DecisionResult = check_status(response, Some(decision_id))
            .await?
            .json()
            .await?;

        if result.decision_id != decision_id {
            return Err(ClientError::UnexpectedResponse(format!(
                "requested decision {decision_id} but received result for {}",
                result.decision_id
            )));
        }
        info!(
            decision_id = %decision_id,
            options = result.ranked_options.len(),
            pending = result.is_pending(),
            "decision result fetched"
        );
        Ok(result)
    }
}
