use crate::error::PipelineError;
use crate::results::OutputRecordSet;
use std::path::Path;

/// Overwrites `path` with the links joined by newlines
pub async fn write_records(path: &Path, records: &OutputRecordSet) -> Result<(), PipelineError> {
    tokio::fs::write(path, records.to_text())
        .await
        .map_err(|source| PipelineError::Output {
            path: path.to_path_buf(),
            source,
        })?;
    ::log::info!("Wrote {} links to {}", records.len(), path.display());
    Ok(())
}
