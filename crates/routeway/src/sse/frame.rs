use crate::streaming::CompletionChunk;

/// Prefix of a line carrying a JSON payload
pub const DATA_PREFIX: &str = "data: ";

/// Prefix of a comment line (keep-alives)
pub const COMMENT_PREFIX: char = ':';

/// Payload that ends the logical event sequence
pub const DONE_SENTINEL: &str = "[DONE]";

/// Outcome of interpreting one line of the event stream
#[derive(Debug)]
pub enum Frame {
    /// Blank, comment or unrecognized line
    Skip,

    /// `data: [DONE]`
    Done,

    /// A decoded completion chunk
    Event(CompletionChunk),

    /// A data line whose payload is not a valid chunk
    Malformed(serde_json::Error),
}

impl Frame {
    pub fn is_done(&self) -> bool {
        matches!(self, Frame::Done)
    }
}

/// Parser for the simplified `data: ` framing used by chat completion streams
#[derive(Debug, Default, Clone, Copy)]
pub struct EventFrameParser;

impl EventFrameParser {
    pub fn new() -> Self {
        Self
    }

    /// Interpret a single complete line. Never fails hard: bad payloads come
    /// back as `Frame::Malformed` and the caller decides what to do with them.
    pub fn parse(&self, line: &str) -> Frame {
        let line = line.trim();

        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            return Frame::Skip;
        }

        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            return Frame::Skip;
        };

        let data = data.trim();
        if self.is_done_marker(data) {
            return Frame::Done;
        }

        match serde_json::from_str::<CompletionChunk>(data) {
            Ok(chunk) => Frame::Event(chunk),
            Err(e) => Frame::Malformed(e),
        }
    }

    /// Check if this payload signals end of stream
    pub fn is_done_marker(&self, data: &str) -> bool {
        data == DONE_SENTINEL
    }
}
