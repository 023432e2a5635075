pub mod csv_store;

pub use csv_store::*;

use crate::error::StoreError;
use crate::models::AnalysisRecord;

/// Lazy pass over stored records, in append order
pub type RecordIter = Box<dyn Iterator<Item = Result<AnalysisRecord, StoreError>> + Send>;

/// Append-only storage for completed analyses
///
/// There is no update or delete. Each `read_all` call starts a fresh pass, so
/// re-reading yields the same records unless new ones were appended.
pub trait RecordStore: Send + Sync {
    /// Add one record at the end of the store
    fn append(&self, record: &AnalysisRecord) -> Result<(), StoreError>;

    /// Iterate over every record written so far
    fn read_all(&self) -> Result<RecordIter, StoreError>;
}

/// Collect every record, stopping at the first unreadable row
pub fn load_records(store: &dyn RecordStore) -> Result<Vec<AnalysisRecord>, StoreError> {
    store.read_all()?.collect()
}

/// Render records as CSV text with the standard header row
pub fn records_to_csv<'a, I>(records: I) -> Result<String, StoreError>
where
    I: IntoIterator<Item = &'a AnalysisRecord>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(AnalysisRecord::HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::Unavailable(format!("failed to flush CSV buffer: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|e| StoreError::Unavailable(format!("CSV output is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_to_csv_header_only() {
        let records: Vec<AnalysisRecord> = Vec::new();
        let csv = records_to_csv(&records).unwrap();
        assert_eq!(csv, "Transcript,Summary,Sentiment\n");
    }

    #[test]
    fn test_records_to_csv_quotes_fields() {
        let records = vec![AnalysisRecord {
            transcript: "I said \"hello\", twice".to_string(),
            summary: "Greeting".to_string(),
            sentiment: "Neutral".to_string(),
        }];
        let csv = records_to_csv(&records).unwrap();
        assert_eq!(
            csv,
            "Transcript,Summary,Sentiment\n\"I said \"\"hello\"\", twice\",Greeting,Neutral\n"
        );
    }
}
