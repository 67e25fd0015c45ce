use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sse;

/// One state change of a generation run, as sent to the client.
///
/// A run emits any number of `Content` and `SlideComplete` events followed by
/// exactly one terminal `Complete` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProgressEvent {
    Content {
        slide: usize,
        content: String,
    },
    SlideComplete {
        slide: usize,
    },
    Complete {
        #[serde(rename = "presentationId")]
        presentation_id: Uuid,
    },
    Error {
        message: String,
    },
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Complete { .. } | ProgressEvent::Error { .. })
    }

    /// The `data: <json>\n\n` frame for this event.
    pub fn to_frame(&self) -> Result<Bytes, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(Bytes::from(sse::frame(&json)))
    }
}
