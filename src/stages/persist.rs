use std::sync::Arc;

use tracing::info;

use crate::error::StoreError;
use crate::models::{AnalysisRecord, AnalysisResult};
use crate::store::RecordStore;

/// Execute the persist stage
///
/// The append runs on the blocking pool and is not cancelled if the caller
/// goes away, so a row is either written whole or rolled back by the store.
pub async fn execute_persist(
    store: Arc<dyn RecordStore>,
    result: &AnalysisResult,
) -> Result<(), StoreError> {
    let record = AnalysisRecord::from(result);

    tokio::task::spawn_blocking(move || store.append(&record))
        .await
        .map_err(|e| StoreError::Unavailable(format!("append task failed: {}", e)))??;

    info!("Results saved to record store");
    Ok(())
}
