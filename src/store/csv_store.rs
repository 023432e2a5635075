use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, error, info};

use crate::error::StoreError;
use crate::models::AnalysisRecord;
use crate::store::{RecordIter, RecordStore};

pub const DEFAULT_CSV_PATH: &str = "call_analysis.csv";

/// Record store backed by a single CSV file
///
/// The header row is written together with the first record. Appends are
/// serialized through a mutex and each row goes out in a single write; a
/// failed write is truncated back to the previous file length. A last line
/// left without a terminator is closed before the new row.
pub struct CsvRecordStore {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode one record, with the header when the file is still empty
    fn encode_row(record: &AnalysisRecord, with_header: bool) -> Result<Vec<u8>, StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(with_header)
            .from_writer(Vec::new());
        writer.serialize(record)?;
        writer
            .into_inner()
            .map_err(|e| StoreError::Unavailable(format!("failed to flush CSV buffer: {}", e)))
    }
}

/// Whether a non-empty file is missing its final line terminator
fn lacks_trailing_newline(mut file: &File, len: u64) -> io::Result<bool> {
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Write `row` through `out` and sync `file`
///
/// On any error the file is cut back to `existing_len` so no partial row stays
/// behind.
fn write_row<W: Write>(file: &File, mut out: W, row: &[u8], existing_len: u64) -> io::Result<()> {
    let written = out
        .write_all(row)
        .and_then(|_| out.flush())
        .and_then(|_| file.sync_data());

    if written.is_err() {
        if let Err(e) = file.set_len(existing_len) {
            error!("Failed to roll back partial row: {}", e);
        }
    }
    written
}

impl RecordStore for CsvRecordStore {
    fn append(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        let _guard = self
            .append_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("append lock poisoned".to_string()))?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        let existing_len = file
            .metadata()
            .map_err(|e| StoreError::io(&self.path, e))?
            .len();
        let is_new = existing_len == 0;

        let mut row = Vec::new();
        let unterminated = lacks_trailing_newline(&file, existing_len)
            .map_err(|e| StoreError::io(&self.path, e))?;
        if unterminated {
            debug!("Terminating unfinished last line in {:?}", self.path);
            row.push(b'\n');
        }
        row.extend(Self::encode_row(record, is_new)?);

        if let Err(e) = write_row(&file, &file, &row, existing_len) {
            error!("Error saving to {:?}: {}", self.path, e);
            return Err(StoreError::io(&self.path, e));
        }

        if is_new {
            info!("Created new CSV file: {:?}", self.path);
        }
        debug!("Appended {} bytes to {:?}", row.len(), self.path);

        Ok(())
    }

    fn read_all(&self) -> Result<RecordIter, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Box::new(std::iter::empty())),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        Ok(Box::new(
            reader
                .into_deserialize::<AnalysisRecord>()
                .map(|row| row.map_err(StoreError::from)),
        ))
    }
}
