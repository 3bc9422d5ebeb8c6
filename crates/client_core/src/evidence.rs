use std::path::Path;

use shared::domain::EvidenceDocument;
use tracing::warn;

use crate::ClientError;

/// Loads a file from disk, inferring its media type from the extension.
pub async fn read_evidence(path: &Path) -> Result<EvidenceDocument, ClientError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ClientError::ReadEvidence {
            path: path.display().to_string(),
            source,
        })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "evidence".to_string());
    let media_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    let document = EvidenceDocument::new(filename, media_type, bytes);
    if document.exceeds_size_guidance() {
        warn!(
            filename = %document.filename,
            size_bytes = document.bytes.len(),
            "evidence exceeds the 10MB size guidance"
        );
    }
    Ok(document)
}
