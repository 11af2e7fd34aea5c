//! HTTP `Range` handling
//!
//! Only a single `bytes=<first>-[<last>]` range is understood. Anything else
//! (suffix ranges, multiple ranges, other units, garbage) is treated as if no
//! header had been sent.

/// Inclusive byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub first: u64,
    pub last: u64,
}

impl ByteRange {
    /// Number of bytes covered; never zero since `first <= last`
    pub fn byte_count(&self) -> u64 {
        self.last - self.first + 1
    }
}

/// Parse a `Range` header against the claimed total size.
///
/// An open end defaults to the last claimed byte and an end past it is
/// clamped. Returns `None` when the header is unusable.
pub fn parse_range_header(header: &str, claimed_size: u64) -> Option<ByteRange> {
    let ranges = header.trim().strip_prefix("bytes=")?;
    let (first, last) = ranges.trim().split_once('-')?;
    let first: u64 = first.trim().parse().ok()?;
    let last_claimed = claimed_size.checked_sub(1)?;

    let last = match last.trim() {
        "" => last_claimed,
        explicit => explicit.parse::<u64>().ok()?.min(last_claimed),
    };
    if first > last {
        return None;
    }
    Some(ByteRange { first, last })
}

/// How a content request will be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServePlan {
    /// 200 with the whole claimed size
    Full { claimed_size: u64 },
    /// 206 with the requested slice
    Partial { range: ByteRange, claimed_size: u64 },
    /// 416, empty body
    NotSatisfiable { claimed_size: u64 },
}

impl ServePlan {
    /// Decide the response from the `Range` header, the claimed size used for
    /// header arithmetic and the size actually present on storage.
    pub fn decide(range_header: Option<&str>, claimed_size: u64, actual_size: u64) -> Self {
        let Some(header) = range_header else {
            return Self::Full { claimed_size };
        };

        match parse_range_header(header, claimed_size) {
            Some(range) if range.first >= actual_size => Self::NotSatisfiable { claimed_size },
            Some(range) => Self::Partial {
                range,
                claimed_size,
            },
            // A well-formed start at or past the claimed end cannot be
            // clamped into range.
            None if starts_past_end(header, claimed_size) => Self::NotSatisfiable { claimed_size },
            None => Self::Full { claimed_size },
        }
    }

    /// Declared `Content-Length`
    pub fn content_length(&self) -> u64 {
        match self {
            Self::Full { claimed_size } => *claimed_size,
            Self::Partial { range, .. } => range.byte_count(),
            Self::NotSatisfiable { .. } => 0,
        }
    }

    /// `Content-Range` header value, if the response carries one
    pub fn content_range(&self) -> Option<String> {
        match self {
            Self::Full { .. } => None,
            Self::Partial {
                range,
                claimed_size,
            } => Some(format!(
                "bytes {}-{}/{}",
                range.first, range.last, claimed_size
            )),
            Self::NotSatisfiable { claimed_size } => Some(format!("bytes */{}", claimed_size)),
        }
    }

    /// File offset and number of bytes to read, if any
    pub fn read_window(&self) -> Option<(u64, u64)> {
        match self {
            Self::Full { claimed_size } => Some((0, *claimed_size)),
            Self::Partial { range, .. } => Some((range.first, range.byte_count())),
            Self::NotSatisfiable { .. } => None,
        }
    }
}

fn starts_past_end(header: &str, claimed_size: u64) -> bool {
    header
        .trim()
        .strip_prefix("bytes=")
        .and_then(|ranges| ranges.split_once('-'))
        .filter(|(_, last)| !last.contains(','))
        .and_then(|(first, _)| first.trim().parse::<u64>().ok())
        .is_some_and(|first| first >= claimed_size)
}
