//! Downloaded content: indexing fetch results and serving files with
//! byte-range support

pub mod index;
pub mod range;
pub mod serve;

pub use index::{spawn_indexer, ContentIndex, ContentRecord, UpsertOutcome};
pub use range::{parse_range_header, ByteRange, ServePlan};
pub use serve::{ContentServer, PreparedContent};

use thiserror::Error;

/// Content lookup and serving errors
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fetch event: {0}")]
    InvalidEvent(String),
}
