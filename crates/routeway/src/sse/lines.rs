use super::decoder::Utf8Decoder;

/// Turns raw body segments into complete `\n`-terminated lines
/// The unterminated tail stays buffered until the next segment or `flush`
#[derive(Debug, Default)]
pub struct LineAssembler {
    decoder: Utf8Decoder,
    buffer: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a segment and return every line it completes, without terminators
    pub fn feed(&mut self, segment: &[u8]) -> Vec<String> {
        let text = self.decoder.decode(segment);
        // The pending partial line never contains '\n'
        let Some(last_newline) = text.rfind('\n').map(|i| self.buffer.len() + i) else {
            self.buffer.push_str(&text);
            return Vec::new();
        };
        self.buffer.push_str(&text);

        let partial = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, partial);

        complete[..last_newline]
            .split('\n')
            .map(str::to_owned)
            .collect()
    }

    /// End of stream: emit the trailing unterminated line, if any
    pub fn flush(&mut self) -> Option<String> {
        if let Some(replacement) = self.decoder.finish() {
            self.buffer.push(replacement);
        }

        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    /// Length in bytes of the pending partial line
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.decoder.pending_len() == 0
    }
}
