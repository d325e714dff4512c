use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::FrameTimestamp;

/// Written once per `.nevrcap` stream, read once per open. The legacy
/// format carries no equivalent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Header {
    pub capture_id: String,
    pub created_at: FrameTimestamp,
    /// Insertion order is irrelevant; a `BTreeMap` gives deterministic wire
    /// bytes for the same logical metadata, which is convenient for tests.
    pub metadata: BTreeMap<String, String>,
}

impl Header {
    pub fn new(capture_id: impl Into<String>, created_at: FrameTimestamp) -> Self {
        Self {
            capture_id: capture_id.into(),
            created_at,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
