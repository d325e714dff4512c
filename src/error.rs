use std::backtrace::Backtrace;
use thiserror::Error;

/// [`NevrcapErrorKind`] enumerates the specific failure modes that can occur
/// while ingesting, detecting events in, or encoding/decoding lobby-session
/// telemetry. Each variant carries the context needed to diagnose it without
/// re-deriving state from the caller.
#[derive(Error, Debug)]
pub enum NevrcapErrorKind {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse session JSON: {0}")]
    SessionJson(#[source] serde_json::Error),

    #[error("failed to parse bones JSON: {0}")]
    BonesJson(#[source] serde_json::Error),

    #[error("malformed timestamp {raw:?}: {reason}")]
    Timestamp { raw: String, reason: &'static str },

    #[error("varint length {value} exceeds 64 bits")]
    VarintOverflow { value: u128 },

    #[error("truncated varint: more than 10 continuation bytes")]
    VarintTruncated,

    #[error("zip archive has no entry matching {archive_base:?}")]
    ZipEntryMissing { archive_base: String },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("bincode encode/decode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("writer not configured for this operation (reader-only instance)")]
    WriterNotConfigured,

    #[error("reader not configured for this operation (writer-only instance)")]
    ReaderNotConfigured,

    #[error("stream is exhausted")]
    ExhaustedStream,

    #[error("header already written for this stream")]
    HeaderAlreadyWritten,

    #[error("header must be written before any frame")]
    HeaderNotWritten,

    #[error("header already read for this stream")]
    HeaderAlreadyRead,

    #[error("attempted to read a frame before reading the header")]
    HeaderNotRead,

    #[error("finalize() called after close()")]
    FinalizeAfterClose,

    #[error("frame index out of order: expected {expected}, got {actual}")]
    FrameIndexOutOfOrder { expected: u32, actual: u32 },
}

/// [`NevrcapError`] pairs a [`NevrcapErrorKind`] with a captured backtrace,
/// mirroring the way replay-processing errors elsewhere in this codebase
/// carry their origin alongside the variant that describes it.
#[derive(Debug)]
pub struct NevrcapError {
    pub backtrace: Backtrace,
    pub kind: NevrcapErrorKind,
}

impl NevrcapError {
    pub fn new(kind: NevrcapErrorKind) -> Self {
        Self {
            backtrace: Backtrace::capture(),
            kind,
        }
    }

    pub fn new_result<T>(kind: NevrcapErrorKind) -> NevrcapResult<T> {
        Err(Self::new(kind))
    }
}

impl std::fmt::Display for NevrcapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for NevrcapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl<E> From<E> for NevrcapError
where
    NevrcapErrorKind: From<E>,
{
    fn from(err: E) -> Self {
        Self::new(NevrcapErrorKind::from(err))
    }
}

pub type NevrcapResult<T> = Result<T, NevrcapError>;
