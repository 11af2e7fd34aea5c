//! Streaming downloaded files to clients

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use super::index::ContentRecord;
use super::range::ServePlan;
use super::ContentError;
use crate::config::ContentConfig;

/// Body stream over the requested slice of a file
pub type ContentStream = ReaderStream<Take<File>>;

/// A response ready to be written: headers decided, file positioned
#[derive(Debug)]
pub struct PreparedContent {
    pub plan: ServePlan,
    pub content_type: String,
    /// `None` for unsatisfiable ranges
    pub body: Option<ContentStream>,
}

/// Serves files out of the download directory
#[derive(Debug, Clone)]
pub struct ContentServer {
    download_dir: PathBuf,
    chunk_size: usize,
}

impl ContentServer {
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            download_dir: config.download_dir.clone(),
            chunk_size: config.chunk_size,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Open the record's file and position it for the given `Range` header.
    ///
    /// Headers are computed from the daemon's claimed size; reads are bounded
    /// by what is actually on disk, so a partially downloaded file yields a
    /// body shorter than the declared length.
    pub async fn prepare(
        &self,
        record: &ContentRecord,
        range_header: Option<&str>,
    ) -> Result<PreparedContent, ContentError> {
        let path = record.physical_path(&self.download_dir);
        let actual_size = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContentError::NotFound(format!(
                    "{} is not on local storage",
                    record.file_name
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let claimed_size = record.claimed_size_bytes;
        if claimed_size != actual_size {
            warn!(
                "File mismatch: {} - {} ({} bytes difference) for {} ({})",
                claimed_size,
                actual_size,
                i128::from(claimed_size) - i128::from(actual_size),
                path.display(),
                record.uri
            );
        }

        let plan = ServePlan::decide(range_header, claimed_size, actual_size);
        let content_type = mime_guess::from_path(&record.mime_hint_source)
            .first_or_octet_stream()
            .to_string();

        let body = match plan.read_window() {
            Some((offset, length)) => {
                let mut file = File::open(&path).await?;
                if offset > 0 {
                    file.seek(SeekFrom::Start(offset)).await?;
                }
                debug!(
                    "Streaming {} bytes of {} from offset {}",
                    length, record.file_name, offset
                );
                Some(ReaderStream::with_capacity(file.take(length), self.chunk_size))
            }
            None => None,
        };

        Ok(PreparedContent {
            plan,
            content_type,
            body,
        })
    }
}
