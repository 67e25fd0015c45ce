//! Incremental framing of `text/event-stream` bodies.
//!
//! Transports hand over arbitrary chunks: a logical line, or even a single
//! UTF-8 sequence, may be split across two reads. [`LineFramer`] keeps the
//! undecoded tail between reads and only yields complete lines.

pub const DATA_PREFIX: &str = "data:";
pub const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
    /// Prefix of `pending` already known to hold no newline.
    scanned: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        LineFramer::default()
    }

    /// Feed one chunk and return every line it completes, without the
    /// trailing `\n` or `\r\n`. Empty lines are returned as empty strings.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut search_from = self.scanned;
        while let Some(offset) = self.pending[search_from..].iter().position(|b| *b == b'\n') {
            let end = search_from + offset;
            let line = &self.pending[start..end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            lines.push(String::from_utf8_lossy(line).into_owned());
            start = end + 1;
            search_from = start;
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();
        lines
    }

    /// Flush whatever is left once the transport has closed.
    pub fn finish(&mut self) -> Option<String> {
        self.scanned = 0;
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        let rest = rest.strip_suffix(b"\r").unwrap_or(&rest);
        Some(String::from_utf8_lossy(rest).into_owned())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Payload of a `data:` line, with the single optional space after the colon
/// removed. Other lines (comments, `event:`, blanks) yield `None`.
pub fn data_payload(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(DATA_PREFIX)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Encode one record as a `data: <payload>` frame.
pub fn frame(payload: &str) -> String {
    format!("{DATA_PREFIX} {payload}\n\n")
}
